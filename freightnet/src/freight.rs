use crate::modal::{RailwayNetwork, RoadwayNetwork};
use crate::network::ids::OdId;
use crate::network::tons::Category;
use crate::AppResult;

/// The rail and road networks of one study area, between which traffic
/// can be shifted.
#[derive(Clone, Debug)]
pub struct FreightNetwork {
    pub rail: RailwayNetwork,
    pub road: RoadwayNetwork,
}

impl FreightNetwork {
    pub fn new(rail: RailwayNetwork, road: RoadwayNetwork) -> FreightNetwork {
        FreightNetwork { rail, road }
    }

    /// Moves a share `coefficient` of the rail demand of an OD pair to
    /// road, first taking back what road had shifted to rail.
    /// Returns `(derived, returned)` tons.
    pub fn derive_to_road(&mut self, id: OdId, category: Category, coefficient: f64) -> AppResult<(f64, f64)> {
        let tons = self.rail.network_mut().derive_od(self.road.network_mut(), id, category, coefficient)?;
        Ok(tons)
    }

    pub fn derive_to_rail(&mut self, id: OdId, category: Category, coefficient: f64) -> AppResult<(f64, f64)> {
        let tons = self.road.network_mut().derive_od(self.rail.network_mut(), id, category, coefficient)?;
        Ok(tons)
    }

    pub fn total_tons(&self) -> f64 {
        self.rail.network().total_tons() + self.road.network().total_tons()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::builder::Records;
    use crate::input::parameters::tests::{rail_store, road_store};

    fn freight() -> FreightNetwork {
        let rail = Records::new()
            .with_link("10-17", 50.0, "wide")
            .with_link("17-25", 80.0, "wide")
            .with_path("10-25", "10-17-25", "wide")
            .with_demand("10-25", 1, 1000.0);
        let road = Records::new()
            .with_link("10-25", 140.0, "road")
            .with_path("10-25", "10-25", "road")
            .with_demand("10-25", 1, 400.0);
        FreightNetwork::new(RailwayNetwork::build(&rail, &rail_store()).unwrap(),
                            RoadwayNetwork::build(&road, &road_store()).unwrap())
    }

    #[test]
    fn shift_and_return() {
        let mut f = freight();
        let id :OdId = "10-25".parse().unwrap();
        let total = f.total_tons();

        let (derived, returned) = f.derive_to_road(id, 1, 0.3).unwrap();
        assert!((derived - 300.0).abs() < 1e-9);
        assert_eq!(returned, 0.0);
        assert!((f.total_tons() - total).abs() < 1e-9);
        assert!((f.road.network().link(id, "road").unwrap().get_ton() - 700.0).abs() < 1e-9);

        // road gives back the 300 tons first, then 10 % of its 400
        let (derived, returned) = f.derive_to_rail(id, 1, 0.1).unwrap();
        assert!((returned - 300.0).abs() < 1e-9);
        assert!((derived - 40.0).abs() < 1e-9);
        let rail_od = f.rail.network().od(id, 1).unwrap();
        assert!((rail_od.get_original_ton() - 1000.0).abs() < 1e-9);
        assert!((rail_od.get_derived_ton() - 40.0).abs() < 1e-9);
        assert!((f.total_tons() - total).abs() < 1e-9);
        f.rail.network().total_ton_km().unwrap();
        f.road.network().total_ton_km().unwrap();
    }

    #[test]
    fn unknown_od() {
        let mut f = freight();
        assert!(f.derive_to_road("1-2".parse().unwrap(), 1, 0.5).is_err());
    }
}
