use crate::input::parameters::RoadParams;
use crate::network::link::Link;

use super::{CostBreakdown, TOTAL_INFRASTRUCTURE, TOTAL_MOBILITY};

/// Truck cost is linear in ton-km, so per ton-km it is the coefficient
/// itself (zero on an empty network).
pub fn mobility_cost(p: &RoadParams, total_ton_km: f64) -> CostBreakdown {
    CostBreakdown::new(TOTAL_MOBILITY)
        .with("mobility", p.mobility_cost_tk * total_ton_km)
        .per_ton_km(total_ton_km)
}

/// Yearly road cost of a link carrying `ton` tons.
pub fn eac_track(p: &RoadParams, ton: f64, dist: f64) -> f64 {
    p.coef_b_infrast_cost * ton.powf(p.coef_a_infrast_cost) * dist
}

pub fn infrastructure_cost<'a, I, F>(p: &RoadParams, links: I, total_ton_km: f64, mut record: F) -> CostBreakdown
    where I: IntoIterator<Item = &'a Link>, F: FnMut(&Link, f64) {
    let mut cost = CostBreakdown::new(TOTAL_INFRASTRUCTURE).with("eac_track", 0.0);
    for link in links.into_iter().filter(|l| l.get_ton() > 0.0) {
        let eac = eac_track(p, link.get_ton(), link.get_dist());
        cost.push("eac_track", eac);
        record(link, eac);
    }
    cost.per_ton_km(total_ton_km)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::parameters::tests::road_store;
    use crate::network::ids::LinkId;

    #[test]
    fn road_costs() {
        let p = RoadParams::from_store(&road_store()).unwrap();
        let id :LinkId = "4-9".parse().unwrap();
        let mut link = Link::new(id, 120.0, "road");
        link.add_original_ton(10_000.0, 3, id);
        let tk = link.ton_km();

        assert!((mobility_cost(&p, tk).total() - 0.05).abs() < 1e-12);
        assert_eq!(mobility_cost(&p, 0.0).total(), 0.0);

        let mut eacs = Vec::new();
        let links = vec![link, Link::new("9-12".parse().unwrap(), 30.0, "road")];
        let cost = infrastructure_cost(&p, &links, tk, |l, eac| eacs.push((l.id, eac)));
        let expected = 0.8 * 10_000.0f64.powf(0.6) * 120.0;
        assert_eq!(eacs.len(), 1);
        assert!((eacs[0].1 - expected).abs() < 1e-6);
        assert!((cost.get(TOTAL_INFRASTRUCTURE).unwrap() - expected / tk).abs() < 1e-12);
        assert_eq!(infrastructure_cost(&p, &links, 0.05, |_, _| ()).total(), 0.0);
    }
}
