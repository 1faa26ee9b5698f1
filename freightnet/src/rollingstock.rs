//! Fleet sizing of wagons and locomotives.
//!
//! A `Fleet` is an aggregate: it accumulates the time the whole fleet
//! spends running and standing still for all freight services added to it,
//! and sizes the fleet as the number of units whose yearly availability
//! covers that time. Every service is a round trip, loaded out and empty
//! back.

use std::fmt;

/// Slack when rounding the fleet size up, so that rounding noise in the
/// accumulated time does not add a whole unit.
const UNIT_ROUNDING: f64 = 1e-9;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FleetParams {
    /// km/h
    pub speed: f64,
    /// Tons hauled per unit.
    pub capacity: f64,
    /// Operating hours per unit and year.
    pub availability: f64,
    /// Hours standing at each end of a trip.
    pub head_stop_time: f64,
    /// Hours standing at each turnout (passing siding).
    pub turnout_time: f64,
    /// Km between turnouts.
    pub turnout_freq: f64,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Fleet {
    pub params: FleetParams,
    /// Hours running.
    pub running: f64,
    /// Hours standing at trip ends.
    pub idle_heads: f64,
    /// Hours standing at turnouts.
    pub idle_turnout: f64,
    pub unit_km: f64,
    pub ton_km: f64,
    /// Unused capacity (tons) of the dispatched units.
    pub idle_capacity: f64,
}

impl Fleet {
    pub fn new(params: FleetParams) -> Fleet {
        Fleet {
            params,
            running: 0.0,
            idle_heads: 0.0,
            idle_turnout: 0.0,
            unit_km: 0.0,
            ton_km: 0.0,
            idle_capacity: 0.0,
        }
    }

    fn trip_running(&self, trips: f64, distance: f64) -> f64 {
        trips * 2.0 * distance / self.params.speed
    }

    fn trip_turnout(&self, trips: f64, distance: f64) -> f64 {
        trips * self.params.turnout_time * 2.0 * distance / self.params.turnout_freq
    }

    /// Adds the time needed to carry `tons` over `distance` km and returns
    /// the capacity left unused by the dispatched units.
    pub fn add_freight_service(&mut self, tons: f64, distance: f64) -> f64 {
        if tons <= 0.0 {
            return 0.0;
        }
        let trips = (tons / self.params.capacity).ceil();

        self.running += self.trip_running(trips, distance);
        self.idle_heads += trips * 2.0 * self.params.head_stop_time;
        self.idle_turnout += self.trip_turnout(trips, distance);
        self.unit_km += trips * 2.0 * distance;
        self.ton_km += tons * distance;

        let idle = trips * self.params.capacity - tons;
        self.idle_capacity += idle;
        idle
    }

    pub fn total_time(&self) -> f64 {
        self.running + self.idle_heads + self.idle_turnout
    }

    /// Number of units whose availability covers the total time required.
    pub fn units_needed_by_time(&self) -> f64 {
        let units = (self.total_time() / self.params.availability - UNIT_ROUNDING).ceil();
        // ceil of a small negative gives -0.0
        if units > 0.0 { units } else { 0.0 }
    }

    /// Km run per unit of the fleet.
    pub fn average_haul(&self) -> f64 {
        let units = self.units_needed_by_time();
        if units > 0.0 { self.unit_km / units } else { 0.0 }
    }

    /// Hours with crew on board: running and waiting at turnouts.
    pub fn operation_time(&self) -> f64 {
        self.running + self.idle_turnout
    }

    /// Takes `units` unit-trips off a stretch of `distance` km by running
    /// their load in other, consolidated trains.
    pub fn regroup(&mut self, units: f64, distance: f64) {
        self.running -= self.trip_running(units, distance);
        self.idle_turnout -= self.trip_turnout(units, distance);
        self.unit_km -= units * 2.0 * distance;
    }

    pub fn revert_regroup(&mut self, units: f64, distance: f64) {
        self.running += self.trip_running(units, distance);
        self.idle_turnout += self.trip_turnout(units, distance);
        self.unit_km += units * 2.0 * distance;
    }

    /// Time spent uncoupling and recoupling `units` moved between trains.
    pub fn add_regroup_time(&mut self, units: f64) {
        self.idle_heads += units * 2.0 * self.params.head_stop_time;
    }

    pub fn subtract_regroup_time(&mut self, units: f64) {
        self.idle_heads -= units * 2.0 * self.params.head_stop_time;
    }
}

impl fmt::Display for Fleet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "units needed     {:.0}", self.units_needed_by_time())?;
        writeln!(f, "running (h)      {:.1}", self.running)?;
        writeln!(f, "idle heads (h)   {:.1}", self.idle_heads)?;
        writeln!(f, "idle turnout (h) {:.1}", self.idle_turnout)?;
        writeln!(f, "average haul     {:.1}", self.average_haul())?;
        write!(f, "idle capacity    {:.1}", self.idle_capacity)
    }
}
