//! Modal networks: a network together with what it takes to operate it.

use log::{debug, info};

use crate::cost::{rail, road, CostBreakdown};
use crate::input::builder::{build_network, NetworkBuilder};
use crate::input::parameters::{ParameterStore, RailParams, RoadParams};
use crate::network::ids::LinkId;
use crate::network::link::Gauge;
use crate::network::od::Od;
use crate::network::{Network, NetworkError};
use crate::rollingstock::Fleet;
use crate::AppResult;

/// Last computed cost breakdowns of a modal network.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Costs {
    pub mobility: Option<CostBreakdown>,
    pub infrastructure: Option<CostBreakdown>,
}

/// Outcome of trying to regroup the trains on one link.
#[derive(Clone, Debug, PartialEq)]
pub struct RegroupStep {
    pub link: LinkId,
    pub gauge: Gauge,
    pub idle_locomotives: f64,
    pub accepted: bool,
    pub cost_before: f64,
    pub cost_after: f64,
}

#[derive(Clone, Debug)]
pub struct RailwayNetwork {
    params: RailParams,
    network: Network,
    wagons: Fleet,
    locomotives: Fleet,
    costs: Costs,
}

impl RailwayNetwork {
    pub fn new(params: RailParams, network: Network) -> RailwayNetwork {
        RailwayNetwork {
            wagons: Fleet::new(params.wagons()),
            locomotives: Fleet::new(params.locomotives()),
            params,
            network,
            costs: Costs::default(),
        }
    }

    pub fn build<B, S>(builder: &B, store: &S) -> AppResult<RailwayNetwork>
        where B: NetworkBuilder + ?Sized, S: ParameterStore + ?Sized {
        let params = RailParams::from_store(store)?;
        let network = build_network(builder)?;
        Ok(RailwayNetwork::new(params, network))
    }

    pub fn params(&self) -> &RailParams { &self.params }
    pub fn network(&self) -> &Network { &self.network }
    pub fn network_mut(&mut self) -> &mut Network { &mut self.network }
    pub fn wagons(&self) -> &Fleet { &self.wagons }
    pub fn locomotives(&self) -> &Fleet { &self.locomotives }
    pub fn costs(&self) -> &Costs { &self.costs }

    /// The path table holds a path for the OD pair that trains can run on.
    /// An intrazone path such as `5-5` has no links and does not count,
    /// even though it names a node pair.
    pub fn has_railway_path(&self, od: &Od) -> bool {
        self.network.path(od.id()).map_or(false, |p| p.is_operable())
    }

    fn mobility(&self, total_ton_km: f64) -> CostBreakdown {
        rail::mobility_cost(&self.params, &self.wagons, &self.locomotives, total_ton_km)
    }

    /// Runs a separate service for every OD pair, filling the fleets and
    /// leaving the unused locomotive capacity on the links of each path.
    pub fn assign_services(&mut self) -> Result<(), NetworkError> {
        self.wagons = Fleet::new(self.params.wagons());
        self.locomotives = Fleet::new(self.params.locomotives());
        for link in self.network.links_mut().iter_mut() {
            link.idle_capacity = 0.0;
        }

        let mut services = 0;
        for idx in self.network.od_indices() {
            let od = self.network.od_by_index(idx);
            if !od.has_operable_path() || od.get_ton() <= 0.0 {
                debug!("od pair {} (category {}) has no rail service", od.id(), od.category());
                continue;
            }
            let (tons, dist) = (od.get_ton(), od.get_dist());
            self.wagons.add_freight_service(tons, dist);
            let idle = self.locomotives.add_freight_service(tons, dist);
            self.network.for_each_path_link(idx, |link| {
                link.add_idle_capacity(idle);
                Ok(())
            })?;
            services += 1;
        }
        info!("assigned {} rail services: {} wagons, {} locomotives",
              services, self.wagons.units_needed_by_time(), self.locomotives.units_needed_by_time());
        Ok(())
    }

    /// Mobility cost with every OD pair served by its own trains.
    pub fn calc_simple_mobility_cost(&mut self) -> Result<CostBreakdown, NetworkError> {
        let total_ton_km = self.network.total_ton_km()?;
        self.assign_services()?;
        let cost = self.mobility(total_ton_km);
        info!("simple mobility cost {:.6} per ton-km", cost.total());
        self.costs.mobility = Some(cost.clone());
        Ok(cost)
    }

    /// Regroups trains link by link on the current assignment, keeping each
    /// regroup only if it lowers the mobility cost.
    pub fn calc_optimized_mobility_cost(&mut self) -> Result<CostBreakdown, NetworkError> {
        self.calc_optimized_mobility_cost_with(|_| ())
    }

    /// As `calc_optimized_mobility_cost`, reporting the decision taken on
    /// every link to `observer`.
    pub fn calc_optimized_mobility_cost_with<F>(&mut self, mut observer: F) -> Result<CostBreakdown, NetworkError>
        where F: FnMut(&RegroupStep) {
        let total_ton_km = self.network.total_ton_km()?;
        let initial = self.mobility(total_ton_km).total();
        let loc_capacity = self.params.locomotive_capacity;

        let mut accepted = 0;
        for idx in 0..self.network.links().len() {
            let current = self.mobility(total_ton_km).total();
            let idle_locomotives = (self.network.links().by_index(idx).idle_capacity / loc_capacity).floor();

            let mut step = {
                let link = self.network.links().by_index(idx);
                RegroupStep {
                    link: link.id,
                    gauge: link.gauge.clone(),
                    idle_locomotives,
                    accepted: false,
                    cost_before: current,
                    cost_after: current,
                }
            };

            if idle_locomotives >= 1.0 {
                self.regroup_link(idx, idle_locomotives);
                let new = self.mobility(total_ton_km).total();
                if new < current {
                    step.accepted = true;
                    step.cost_after = new;
                    accepted += 1;
                } else {
                    self.revert_regroup_link(idx, idle_locomotives);
                }
            }
            debug!("link {} ({}): {} idle locomotives, regroup {}", step.link, step.gauge,
                   idle_locomotives, if step.accepted { "kept" } else { "dropped" });
            observer(&step);
        }

        let cost = self.mobility(total_ton_km);
        info!("regrouped {} of {} links, mobility cost {:.6} -> {:.6} per ton-km",
              accepted, self.network.links().len(), initial, cost.total());
        self.costs.mobility = Some(cost.clone());
        Ok(cost)
    }

    /// Runs `locomotives` fewer locomotives over the link at `idx`, moving
    /// their wagons into the remaining trains.
    pub fn regroup_link(&mut self, idx: usize, locomotives: f64) {
        let capacity = locomotives * self.params.locomotive_capacity;
        let wagons = capacity / self.params.wagon_capacity;
        let link = self.network.links_mut().by_index_mut(idx);
        link.regroup(capacity);
        self.locomotives.regroup(locomotives, link.dist);
        self.wagons.add_regroup_time(wagons);
    }

    pub fn revert_regroup_link(&mut self, idx: usize, locomotives: f64) {
        let capacity = locomotives * self.params.locomotive_capacity;
        let wagons = capacity / self.params.wagon_capacity;
        let link = self.network.links_mut().by_index_mut(idx);
        link.revert_regroup(capacity);
        self.locomotives.revert_regroup(locomotives, link.dist);
        self.wagons.subtract_regroup_time(wagons);
    }

    /// Track cost of the loaded links, also written onto each link.
    pub fn calc_infrastructure_cost(&mut self) -> Result<CostBreakdown, NetworkError> {
        let total_ton_km = self.network.total_ton_km()?;
        let mut per_link = Vec::new();
        let cost = rail::infrastructure_cost(&self.params, self.network.links().iter(), total_ton_km,
                                             |link, c| per_link.push((link.key(), c)));

        for link in self.network.links_mut().iter_mut() {
            link.eac_detour = 0.0;
            link.eac_track = 0.0;
            link.maintenance = 0.0;
        }
        for ((id, gauge), c) in per_link {
            if let Some(link) = self.network.links_mut().get_mut(id, &gauge) {
                link.eac_detour = c.eac_detour;
                link.eac_track = c.eac_track;
                link.maintenance = c.maintenance;
            }
        }
        info!("rail infrastructure cost {:.6} per ton-km", cost.total());
        self.costs.infrastructure = Some(cost.clone());
        Ok(cost)
    }
}

#[derive(Clone, Debug)]
pub struct RoadwayNetwork {
    params: RoadParams,
    network: Network,
    costs: Costs,
}

impl RoadwayNetwork {
    pub fn new(params: RoadParams, network: Network) -> RoadwayNetwork {
        RoadwayNetwork { params, network, costs: Costs::default() }
    }

    pub fn build<B, S>(builder: &B, store: &S) -> AppResult<RoadwayNetwork>
        where B: NetworkBuilder + ?Sized, S: ParameterStore + ?Sized {
        let params = RoadParams::from_store(store)?;
        let network = build_network(builder)?;
        Ok(RoadwayNetwork::new(params, network))
    }

    pub fn params(&self) -> &RoadParams { &self.params }
    pub fn network(&self) -> &Network { &self.network }
    pub fn network_mut(&mut self) -> &mut Network { &mut self.network }
    pub fn costs(&self) -> &Costs { &self.costs }

    pub fn calc_mobility_cost(&mut self) -> Result<CostBreakdown, NetworkError> {
        let cost = road::mobility_cost(&self.params, self.network.total_ton_km()?);
        self.costs.mobility = Some(cost.clone());
        Ok(cost)
    }

    pub fn calc_infrastructure_cost(&mut self) -> Result<CostBreakdown, NetworkError> {
        let total_ton_km = self.network.total_ton_km()?;
        let mut per_link = Vec::new();
        let cost = road::infrastructure_cost(&self.params, self.network.links().iter(), total_ton_km,
                                             |link, eac| per_link.push((link.key(), eac)));

        for link in self.network.links_mut().iter_mut() {
            link.eac_track = 0.0;
        }
        for ((id, gauge), eac) in per_link {
            if let Some(link) = self.network.links_mut().get_mut(id, &gauge) {
                link.eac_track = eac;
            }
        }
        info!("road infrastructure cost {:.6} per ton-km", cost.total());
        self.costs.infrastructure = Some(cost.clone());
        Ok(cost)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::builder::Records;
    use crate::input::parameters::tests::{rail_store, road_store};
    use crate::cost::{TOTAL_INFRASTRUCTURE, TOTAL_MOBILITY};

    fn records() -> Records {
        Records::new()
            .with_link("1-2", 1000.0, "wide")
            .with_link("2-3", 10.0, "wide")
            .with_path("1-2", "1-2", "wide")
            .with_path("1-3", "1-2-3", "wide")
            .with_demand("1-2", 1, 100.0)
            .with_demand("1-3", 1, 100.0)
    }

    fn rail_with(changes: &[(&'static str, f64)]) -> RailwayNetwork {
        let mut store = rail_store();
        for &(k, v) in changes {
            store.insert(k, v);
        }
        RailwayNetwork::build(&records(), &store).unwrap()
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-9
    }

    #[test]
    fn idle_capacity_on_links() {
        let mut rn = rail_with(&[]);
        rn.calc_simple_mobility_cost().unwrap();
        let n = rn.network();
        assert!(close(n.link("1-2".parse().unwrap(), "wide").unwrap().idle_capacity, 4600.0));
        assert!(close(n.link("2-3".parse().unwrap(), "wide").unwrap().idle_capacity, 2300.0));
        assert_eq!(rn.locomotives().units_needed_by_time(), 1.0);
        assert!(rn.costs().mobility.is_some());

        // assigning again starts over
        rn.calc_simple_mobility_cost().unwrap();
        assert!(close(rn.network().link("1-2".parse().unwrap(), "wide").unwrap().idle_capacity, 4600.0));
    }

    #[test]
    fn regroup_is_kept_when_cheaper() {
        // without head-stop dwell, regrouping only saves fuel and crew
        let mut rn = rail_with(&[("wagon_head_stop_time", 0.0)]);
        let simple = rn.calc_simple_mobility_cost().unwrap().total();
        let mut steps = Vec::new();
        let optimized = rn.calc_optimized_mobility_cost_with(|s| steps.push(s.clone())).unwrap().total();

        assert_eq!(steps.len(), 2);
        assert!(steps[0].accepted);
        assert_eq!(steps[0].idle_locomotives, 1.0);
        assert!(steps[0].cost_after < steps[0].cost_before);
        assert!(!steps[1].accepted);
        assert_eq!(steps[1].idle_locomotives, 0.0);
        assert!(optimized < simple);
        assert!(close(rn.network().link("1-2".parse().unwrap(), "wide").unwrap().idle_capacity, 2200.0));
        assert_eq!(rn.costs().mobility.as_ref().unwrap().get(TOTAL_MOBILITY), Some(optimized));
    }

    #[test]
    fn ties_are_reverted() {
        // cost moves only with whole units, which do not change here
        let mut rn = rail_with(&[("fuel_cost_by_km", 0.0), ("manpower_cost_by_loc_hour", 0.0)]);
        let simple = rn.calc_simple_mobility_cost().unwrap().total();
        let locomotives = *rn.locomotives();
        let wagons = *rn.wagons();

        let mut steps = Vec::new();
        let optimized = rn.calc_optimized_mobility_cost_with(|s| steps.push(s.clone())).unwrap().total();
        assert!(steps.iter().all(|s| !s.accepted));
        assert_eq!(optimized, simple);
        assert!(close(rn.network().link("1-2".parse().unwrap(), "wide").unwrap().idle_capacity, 4600.0));
        assert!(close(rn.locomotives().running, locomotives.running));
        assert!(close(rn.locomotives().idle_turnout, locomotives.idle_turnout));
        assert!(close(rn.wagons().idle_heads, wagons.idle_heads));
    }

    #[test]
    fn regroup_link_round_trip() {
        let mut rn = rail_with(&[]);
        rn.calc_simple_mobility_cost().unwrap();
        let locomotives = *rn.locomotives();
        let wagons = *rn.wagons();
        for &units in &[0.0, 1.0, 2.5] {
            rn.regroup_link(0, units);
            rn.revert_regroup_link(0, units);
        }
        assert!(close(rn.network().links().by_index(0).idle_capacity, 4600.0));
        assert!(close(rn.locomotives().running, locomotives.running));
        assert!(close(rn.locomotives().unit_km, locomotives.unit_km));
        assert!(close(rn.wagons().idle_heads, wagons.idle_heads));
    }

    #[test]
    fn infrastructure_written_to_links() {
        let mut rn = rail_with(&[("main_min_density", 10.0)]);
        let cost = rn.calc_infrastructure_cost().unwrap();
        let link = rn.network().link("1-2".parse().unwrap(), "wide").unwrap();
        assert!(link.eac_track > 0.0);
        assert!(link.eac_detour > 0.0);
        assert!(link.maintenance > 0.0);
        let tk = rn.network().total_ton_km().unwrap();
        let sum :f64 = rn.network().iter_links().map(|l| l.eac_detour + l.eac_track + l.maintenance).sum();
        assert!((cost.get(TOTAL_INFRASTRUCTURE).unwrap() - sum / tk).abs() < 1e-9);
        assert!(rn.costs().infrastructure.is_some());
    }

    #[test]
    fn railway_paths() {
        let mut rn = rail_with(&[]);
        rn.network_mut().add_path(crate::network::path::Path::new("4-5".parse().unwrap(), "no path found", "wide"));
        let n = rn.network_mut();
        n.get_od("1-3".parse().unwrap(), 1);
        n.get_od("4-5".parse().unwrap(), 1);
        n.get_od("6-7".parse().unwrap(), 1);
        n.add_path(crate::network::path::Path::new("5-5".parse().unwrap(), "5-5", "wide"));
        n.get_od("5-5".parse().unwrap(), 1);
        for &(id, expected) in &[("1-3", true), ("4-5", false), ("6-7", false), ("5-5", false)] {
            let od = rn.network().od(id.parse().unwrap(), 1).unwrap();
            assert_eq!(rn.has_railway_path(od), expected);
        }
    }

    #[test]
    fn road_network() {
        let mut rn = RoadwayNetwork::build(&records(), &road_store()).unwrap();
        assert!(close(rn.calc_mobility_cost().unwrap().total(), 0.05));
        let cost = rn.calc_infrastructure_cost().unwrap();
        let link = rn.network().link("2-3".parse().unwrap(), "wide").unwrap();
        assert!(close(link.eac_track, 0.8 * 100.0f64.powf(0.6) * 10.0));
        assert!(cost.total() > 0.0);
        assert_eq!(rn.costs().infrastructure.as_ref().map(CostBreakdown::total), Some(cost.total()));
        assert!(rn.costs().mobility.is_some());
    }

    #[test]
    fn missing_parameters_fail_build() {
        let mut store = rail_store();
        store.remove("wagon_eac");
        assert!(RailwayNetwork::build(&records(), &store).is_err());
    }
}
