//! Network construction from records supplied by a builder.
//!
//! Reading source data is left to the builder; this module only turns its
//! records into a `Network`, canonicalizing node pairs on the way.

use crate::network::link::Link;
use crate::network::path::Path;
use crate::network::tons::Category;
use crate::network::Network;
use crate::AppResult;

#[derive(Clone, Debug, PartialEq)]
pub struct LinkRecord {
    pub id: String,
    pub dist: f64,
    pub gauge: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PathRecord {
    pub od: String,
    pub path: String,
    pub gauge: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DemandRecord {
    pub od: String,
    pub category: Category,
    pub tons: f64,
}

pub trait NetworkBuilder {
    fn links(&self) -> &[LinkRecord];
    fn paths(&self) -> &[PathRecord];
    fn demand(&self) -> &[DemandRecord];
}

/// Builder over records already held in memory.
#[derive(Clone, Debug, Default)]
pub struct Records {
    pub links: Vec<LinkRecord>,
    pub paths: Vec<PathRecord>,
    pub demand: Vec<DemandRecord>,
}

impl Records {
    pub fn new() -> Records {
        Default::default()
    }

    pub fn with_link(mut self, id: &str, dist: f64, gauge: &str) -> Records {
        self.links.push(LinkRecord { id: id.to_string(), dist, gauge: gauge.to_string() });
        self
    }

    pub fn with_path(mut self, od: &str, path: &str, gauge: &str) -> Records {
        self.paths.push(PathRecord { od: od.to_string(), path: path.to_string(), gauge: gauge.to_string() });
        self
    }

    pub fn with_demand(mut self, od: &str, category: Category, tons: f64) -> Records {
        self.demand.push(DemandRecord { od: od.to_string(), category, tons });
        self
    }
}

impl NetworkBuilder for Records {
    fn links(&self) -> &[LinkRecord] { &self.links }
    fn paths(&self) -> &[PathRecord] { &self.paths }
    fn demand(&self) -> &[DemandRecord] { &self.demand }
}

/// Links go in first, then paths, then demand, so that every OD pair finds
/// its path and every path finds its links.
pub fn build_network<B: NetworkBuilder + ?Sized>(builder: &B) -> AppResult<Network> {
    let mut network = Network::new();
    for l in builder.links() {
        network.add_link(Link::new(l.id.parse()?, l.dist, &l.gauge));
    }
    for p in builder.paths() {
        network.add_path(Path::new(p.od.parse()?, &p.path, &p.gauge));
    }
    for d in builder.demand() {
        network.add_original_tons(d.od.parse()?, d.category, d.tons)?;
    }
    Ok(network)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_from_records() {
        let records = Records::new()
            .with_link("17-10", 50.0, "wide")
            .with_link("17-25", 80.0, "wide")
            .with_path("25-10", "25-17-10", "wide")
            .with_demand("10-25", 1, 1000.0)
            .with_demand("5-5", 1, 500.0);
        let n = build_network(&records).unwrap();
        assert_eq!(n.links().len(), 2);
        assert_eq!(n.od("10-25".parse().unwrap(), 1).unwrap().get_dist(), 130.0);
        assert_eq!(n.link("10-17".parse().unwrap(), "wide").unwrap().get_ton(), 1000.0);
        assert_eq!(n.total_tons(), 1500.0);
    }

    #[test]
    fn malformed_ids_fail() {
        assert!(build_network(&Records::new().with_link("10-x", 50.0, "wide")).is_err());
        assert!(build_network(&Records::new().with_demand("10", 1, 5.0)).is_err());
    }
}
