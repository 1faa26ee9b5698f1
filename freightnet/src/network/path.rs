use log::warn;
use smallvec::SmallVec;

use super::ids::{self, LinkId, NodeId, OdId};
use super::link::{Gauge, LinkTable};

/// Anything that travels over a sequence of links of one gauge.
pub trait LinkSequence {
    fn od_id(&self) -> OdId;
    fn links(&self) -> &[LinkId];
    fn gauge(&self) -> Option<&str>;

    /// Sums the distance of the links in the network's link table.
    /// Links missing from the table are reported and left out.
    fn calc_distance(&self, table: &LinkTable) -> f64 {
        let gauge = match self.gauge() {
            Some(g) => g,
            None => return 0.0,
        };
        let mut dist = 0.0;
        for link in self.links() {
            match table.get(*link, gauge) {
                Some(l) => dist += l.dist,
                None => warn!("link {} with gauge {} is missing in network links (od pair {})",
                              link, gauge, self.od_id()),
            }
        }
        dist
    }
}

/// A route between the two nodes of an OD pair, as given by the builder.
#[derive(Clone, Debug, PartialEq)]
pub struct Path {
    od: OdId,
    path: String,
    gauge: Gauge,
    nodes: SmallVec<[NodeId; 8]>,
    links: Vec<LinkId>,
}

impl Path {
    pub fn new(od: OdId, path: &str, gauge: &str) -> Path {
        let nodes :SmallVec<[NodeId; 8]> = if od.is_loop() {
            SmallVec::new()
        } else {
            ids::parse_nodes(path).map(SmallVec::from_vec).unwrap_or_default()
        };
        let links = nodes.windows(2)
            .map(|w| LinkId::new(w[0], w[1]))
            .collect();
        Path {
            od,
            path: path.to_string(),
            gauge: gauge.to_string(),
            nodes,
            links,
        }
    }

    pub fn path(&self) -> &str { &self.path }
    pub fn nodes(&self) -> &[NodeId] { &self.nodes }
    pub fn gauge_str(&self) -> &str { &self.gauge }

    /// True when the path has a path string, a gauge and at least one link.
    pub fn is_operable(&self) -> bool {
        !self.path.is_empty() && !self.gauge.is_empty() && !self.links.is_empty()
    }
}

impl LinkSequence for Path {
    fn od_id(&self) -> OdId { self.od }
    fn links(&self) -> &[LinkId] { &self.links }
    fn gauge(&self) -> Option<&str> { Some(&self.gauge) }
}
