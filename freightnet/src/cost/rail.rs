use log::warn;

use crate::input::parameters::RailParams;
use crate::network::link::Link;
use crate::rollingstock::Fleet;

use super::{capital_recovery_factor, CostBreakdown, TOTAL_INFRASTRUCTURE, TOTAL_MOBILITY};

/// Yearly infrastructure cost of one link.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct LinkCost {
    pub eac_detour: f64,
    pub eac_track: f64,
    pub maintenance: f64,
}

/// Rolling stock cost per ton-km.
pub fn mobility_cost(p: &RailParams, wagons: &Fleet, locomotives: &Fleet, total_ton_km: f64) -> CostBreakdown {
    let num_wagons = wagons.units_needed_by_time();
    let num_locomotives = locomotives.units_needed_by_time();

    let fuel = p.fuel_cost_by_km * locomotives.average_haul() * num_locomotives;
    let maintenance = p.maintenance_by_locomotive * num_locomotives + p.maintenance_by_wagon * num_wagons;

    CostBreakdown::new(TOTAL_MOBILITY)
        .with("eac_wagon", p.wagon_eac * num_wagons)
        .with("eac_locom", p.locomotive_eac * num_locomotives)
        .with("fuel_and_lub", fuel * (1.0 + p.lubricants_fuel_ratio))
        .with("maintenance", maintenance)
        .with("manpower", p.manpower_cost_by_loc_hour * locomotives.operation_time())
        .per_ton_km(total_ton_km)
}

/// Net tons per km above which a track is a main track.
pub fn is_main_track(p: &RailParams, gross_tk: f64, dist: f64) -> bool {
    gross_tk / p.net_to_gross_factor / dist > p.main_min_density
}

/// Number of turnouts (passing sidings) needed. Above the maximum density
/// turnouts are placed closer together.
pub fn number_of_detours(p: &RailParams, gross_tk: f64, dist: f64) -> f64 {
    let density = gross_tk / dist;
    let mut spacing = p.turnout_freq;
    if !(density < p.turnout_freq_max_density) {
        spacing = p.turnout_freq / (density / p.turnout_freq_max_density);
    }
    dist / spacing
}

/// Yearly cost of the track itself. Secondary tracks have none.
pub fn eac_track(p: &RailParams, gross_tk: f64, dist: f64) -> f64 {
    if !is_main_track(p, gross_tk, dist) {
        return 0.0;
    }
    let density = gross_tk / dist;
    let mut life = p.useful_life_track;
    let gross_tk_in_life = life * density;

    let price = if gross_tk_in_life < p.gross_tk_in_hq_track_lifetime {
        p.coef_a_track_cost + p.coef_b_track_cost * gross_tk_in_life
    } else {
        life = p.gross_tk_in_hq_track_lifetime / density;
        p.high_quality_track_price
    };
    price * capital_recovery_factor(p.interest_rate, life) * dist
}

/// Turnout wages plus the track of the turnouts, one km each at the
/// density of the link.
pub fn eac_detour(p: &RailParams, gross_tk: f64, dist: f64) -> f64 {
    let detours = number_of_detours(p, gross_tk, dist);
    detours * p.yearly_wages_by_turnout + detours * eac_track(p, gross_tk / dist, 1.0)
}

pub fn maintenance(p: &RailParams, gross_tk: f64, dist: f64) -> f64 {
    let density = gross_tk / dist;
    let track = density.powf(p.coef_a_track_maint_cost) * p.coef_b_track_maint_cost * gross_tk;
    let no_track = density.powf(p.coef_a_notrack_maint_cost) * p.coef_b_notrack_maint_cost * gross_tk;
    track + no_track
}

pub fn link_cost(p: &RailParams, link: &Link) -> LinkCost {
    let gross_tk = link.gross_ton_km(p.wagon_capacity, p.wagon_weight,
                                     p.locomotive_capacity, p.locomotive_weight);
    let dist = link.get_dist();
    LinkCost {
        eac_detour: eac_detour(p, gross_tk, dist),
        eac_track: eac_track(p, gross_tk, dist),
        maintenance: maintenance(p, gross_tk, dist),
    }
}

/// Track cost per ton-km of every loaded link. `record` receives the
/// yearly cost of each link that carries tons.
pub fn infrastructure_cost<'a, I, F>(p: &RailParams, links: I, total_ton_km: f64, mut record: F) -> CostBreakdown
    where I: IntoIterator<Item = &'a Link>, F: FnMut(&Link, LinkCost) {
    let mut cost = CostBreakdown::new(TOTAL_INFRASTRUCTURE)
        .with("eac_detour", 0.0)
        .with("eac_track", 0.0)
        .with("maintenance", 0.0);

    for link in links {
        if link.get_ton() <= 0.0 {
            continue;
        }
        if link.get_dist() <= 0.0 {
            warn!("loaded link {} ({}) has no length, left out of infrastructure cost", link.id, link.gauge);
            continue;
        }
        let c = link_cost(p, link);
        cost.push("eac_detour", c.eac_detour);
        cost.push("eac_track", c.eac_track);
        cost.push("maintenance", c.maintenance);
        record(link, c);
    }
    cost.per_ton_km(total_ton_km)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::parameters::tests::rail_store;
    use crate::network::ids::LinkId;

    fn params() -> RailParams {
        RailParams::from_store(&rail_store()).unwrap()
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
    }

    fn loaded_link(tons: f64, dist: f64) -> Link {
        let id :LinkId = "1-2".parse().unwrap();
        let mut l = Link::new(id, dist, "wide");
        l.add_original_ton(tons, 1, id);
        l
    }

    #[test]
    fn main_and_secondary_track() {
        let p = params();
        // net density 1.5e6 > 1e6
        assert!(is_main_track(&p, 1.6 * 1.5e6 * 100.0, 100.0));
        assert!(!is_main_track(&p, 1.6 * 0.5e6 * 100.0, 100.0));
        assert_eq!(eac_track(&p, 1.6 * 0.5e6 * 100.0, 100.0), 0.0);
    }

    #[test]
    fn track_cost_linear_branch() {
        let p = params();
        let density = 2.0e6;
        let in_life = 40.0 * density;
        assert!(in_life < p.gross_tk_in_hq_track_lifetime);
        let expected = (400_000.0 + 0.002 * in_life) * capital_recovery_factor(0.12, 40.0) * 100.0;
        assert!(close(eac_track(&p, density * 100.0, 100.0), expected));
    }

    #[test]
    fn track_cost_saturates() {
        let p = params();
        let density = 20.0e6;
        // 8e8 gross tons over the nominal life exceeds the ceiling
        let life = 500_000_000.0 / density;
        let expected = 1_500_000.0 * capital_recovery_factor(0.12, life) * 10.0;
        assert!(close(eac_track(&p, density * 10.0, 10.0), expected));
        // shorter life, higher yearly cost than the nominal one
        assert!(capital_recovery_factor(0.12, life) > capital_recovery_factor(0.12, 40.0));
    }

    #[test]
    fn detours_derate_above_max_density() {
        let p = params();
        assert!(close(number_of_detours(&p, 1.0e6 * 400.0, 400.0), 2.0));
        // twice the maximum density halves the spacing
        assert!(close(number_of_detours(&p, 10.0e6 * 400.0, 400.0), 4.0));
    }

    #[test]
    fn detour_cost_on_secondary_track() {
        let p = params();
        let c = eac_detour(&p, 1.0e6 * 400.0, 400.0);
        assert!(close(c, 2.0 * 20_000.0));
    }

    #[test]
    fn maintenance_power_law() {
        let p = params();
        let gross = 4.0e6 * 50.0;
        let expected = 4.0e6f64.powf(-0.3) * 0.05 * gross + 4.0e6f64.powf(-0.5) * 0.02 * gross;
        assert!(close(maintenance(&p, gross, 50.0), expected));
    }

    #[test]
    fn infrastructure_skips_empty_links() {
        let p = params();
        let links = vec![loaded_link(2_000_000.0, 100.0), Link::new("2-3".parse().unwrap(), 50.0, "wide")];
        let tk = 2_000_000.0 * 100.0;
        let mut recorded = 0;
        let cost = infrastructure_cost(&p, &links, tk, |_, _| recorded += 1);
        assert_eq!(recorded, 1);

        let c = link_cost(&p, &links[0]);
        assert!(close(cost.get("eac_detour").unwrap(), c.eac_detour / tk));
        assert!(close(cost.get("eac_track").unwrap(), c.eac_track / tk));
        assert!(close(cost.get("maintenance").unwrap(), c.maintenance / tk));
        assert!(close(cost.total(), (c.eac_detour + c.eac_track + c.maintenance) / tk));
        assert!(c.eac_track > 0.0);
    }

    #[test]
    fn cost_guard() {
        let p = params();
        let links = vec![loaded_link(1_000_000.0, 100.0)];
        let cost = infrastructure_cost(&p, &links, 0.05, |_, _| ());
        for (_, value) in cost.components() {
            assert_eq!(value, 0.0);
        }
        assert_eq!(cost.get(TOTAL_INFRASTRUCTURE), Some(0.0));

        let mut wagons = Fleet::new(p.wagons());
        let mut locomotives = Fleet::new(p.locomotives());
        wagons.add_freight_service(1000.0, 100.0);
        locomotives.add_freight_service(1000.0, 100.0);
        let cost = mobility_cost(&p, &wagons, &locomotives, 0.05);
        assert_eq!(cost.components().count(), 5);
        for (_, value) in cost.components() {
            assert_eq!(value, 0.0);
        }
        assert_eq!(cost.total(), 0.0);
    }

    #[test]
    fn mobility_components() {
        let p = params();
        let mut wagons = Fleet::new(p.wagons());
        let mut locomotives = Fleet::new(p.locomotives());
        wagons.add_freight_service(100_000.0, 500.0);
        locomotives.add_freight_service(100_000.0, 500.0);
        let tk = 100_000.0 * 500.0;

        let cost = mobility_cost(&p, &wagons, &locomotives, tk);
        let locs = locomotives.units_needed_by_time();
        let wags = wagons.units_needed_by_time();
        assert!(close(cost.get("eac_wagon").unwrap(), 6463.8 * wags / tk));
        assert!(close(cost.get("eac_locom").unwrap(), 154445.9 * locs / tk));
        assert!(close(cost.get("fuel_and_lub").unwrap(),
                      2.0 * locomotives.unit_km * 1.0667 / tk));
        assert!(close(cost.get("manpower").unwrap(), 30.42 * locomotives.operation_time() / tk));
        let sum :f64 = cost.components().map(|(_, v)| v).sum();
        assert!(close(cost.get(TOTAL_MOBILITY).unwrap(), sum));
    }
}
