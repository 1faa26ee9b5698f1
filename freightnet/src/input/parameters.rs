use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

use crate::rollingstock::FleetParams;

/// A named numeric parameter, as handed over by the parameter loader.
#[derive(Clone, Debug, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub value: f64,
}

impl Parameter {
    pub fn new(name: &str, value: f64) -> Parameter {
        Parameter { name: name.to_string(), value }
    }
}

/// Read access to parameters by name.
pub trait ParameterStore {
    fn value(&self, name: &str) -> Option<f64>;
}

impl<K: Borrow<str> + Hash + Eq> ParameterStore for HashMap<K, Parameter> {
    fn value(&self, name: &str) -> Option<f64> {
        self.get(name).map(|p| p.value)
    }
}

impl<K: Borrow<str> + Hash + Eq> ParameterStore for HashMap<K, f64> {
    fn value(&self, name: &str) -> Option<f64> {
        self.get(name).cloned()
    }
}

#[derive(Debug, Fail, PartialEq)]
pub enum ConfigError {
    #[fail(display = "missing parameter \"{}\"", _0)]
    MissingParameter(String),
    #[fail(display = "invalid value {} for parameter \"{}\": {}", value, name, reason)]
    InvalidParameter { name: String, value: f64, reason: &'static str },
}

fn finite<S: ParameterStore + ?Sized>(store: &S, name: &str) -> Result<f64, ConfigError> {
    let value = store.value(name).ok_or_else(|| ConfigError::MissingParameter(name.to_string()))?;
    if !value.is_finite() {
        return Err(ConfigError::InvalidParameter { name: name.to_string(), value, reason: "not a finite number" });
    }
    Ok(value)
}

fn positive<S: ParameterStore + ?Sized>(store: &S, name: &str) -> Result<f64, ConfigError> {
    let value = finite(store, name)?;
    if value <= 0.0 {
        return Err(ConfigError::InvalidParameter { name: name.to_string(), value, reason: "must be positive" });
    }
    Ok(value)
}

#[derive(Clone, Debug, PartialEq)]
pub struct RailParams {
    pub wagon_capacity: f64,
    pub wagon_weight: f64,
    pub wagon_eac: f64,
    pub maintenance_by_wagon: f64,
    pub wagon_speed: f64,
    pub wagon_availability: f64,
    pub wagon_head_stop_time: f64,
    pub wagon_turnout_time: f64,

    pub locomotive_capacity: f64,
    pub locomotive_weight: f64,
    pub locomotive_eac: f64,
    pub maintenance_by_locomotive: f64,
    pub locomotive_speed: f64,
    pub locomotive_availability: f64,
    pub locomotive_head_stop_time: f64,
    pub locomotive_turnout_time: f64,

    pub fuel_cost_by_km: f64,
    pub lubricants_fuel_ratio: f64,
    pub manpower_cost_by_loc_hour: f64,

    pub turnout_freq: f64,
    pub turnout_freq_max_density: f64,
    pub yearly_wages_by_turnout: f64,

    pub net_to_gross_factor: f64,
    pub main_min_density: f64,
    pub coef_a_track_cost: f64,
    pub coef_b_track_cost: f64,
    pub useful_life_track: f64,
    pub gross_tk_in_hq_track_lifetime: f64,
    pub interest_rate: f64,
    pub high_quality_track_price: f64,

    pub coef_a_track_maint_cost: f64,
    pub coef_b_track_maint_cost: f64,
    pub coef_a_notrack_maint_cost: f64,
    pub coef_b_notrack_maint_cost: f64,
}

impl RailParams {
    /// Reads and validates every rail parameter up front.
    pub fn from_store<S: ParameterStore + ?Sized>(s: &S) -> Result<RailParams, ConfigError> {
        Ok(RailParams {
            wagon_capacity: positive(s, "wagon_capacity")?,
            wagon_weight: finite(s, "wagon_weight")?,
            wagon_eac: finite(s, "wagon_eac")?,
            maintenance_by_wagon: finite(s, "maintenance_by_wagon")?,
            wagon_speed: positive(s, "wagon_speed")?,
            wagon_availability: positive(s, "wagon_availability")?,
            wagon_head_stop_time: finite(s, "wagon_head_stop_time")?,
            wagon_turnout_time: finite(s, "wagon_turnout_time")?,

            locomotive_capacity: positive(s, "locomotive_capacity")?,
            locomotive_weight: finite(s, "locomotive_weight")?,
            locomotive_eac: finite(s, "locomotive_eac")?,
            maintenance_by_locomotive: finite(s, "maintenance_by_locomotive")?,
            locomotive_speed: positive(s, "locomotive_speed")?,
            locomotive_availability: positive(s, "locomotive_availability")?,
            locomotive_head_stop_time: finite(s, "locomotive_head_stop_time")?,
            locomotive_turnout_time: finite(s, "locomotive_turnout_time")?,

            fuel_cost_by_km: finite(s, "fuel_cost_by_km")?,
            lubricants_fuel_ratio: finite(s, "lubricants_fuel_ratio")?,
            manpower_cost_by_loc_hour: finite(s, "manpower_cost_by_loc_hour")?,

            turnout_freq: positive(s, "turnout_freq")?,
            turnout_freq_max_density: positive(s, "turnout_freq_max_density")?,
            yearly_wages_by_turnout: finite(s, "yearly_wages_by_turnout")?,

            net_to_gross_factor: positive(s, "net_to_gross_factor")?,
            main_min_density: finite(s, "main_min_density")?,
            coef_a_track_cost: finite(s, "coef_a_track_cost")?,
            coef_b_track_cost: finite(s, "coef_b_track_cost")?,
            useful_life_track: positive(s, "useful_life_track")?,
            gross_tk_in_hq_track_lifetime: positive(s, "gross_tk_in_hq_track_lifetime")?,
            interest_rate: positive(s, "interest_rate")?,
            high_quality_track_price: finite(s, "high_quality_track_price")?,

            coef_a_track_maint_cost: finite(s, "coef_a_track_maint_cost")?,
            coef_b_track_maint_cost: finite(s, "coef_b_track_maint_cost")?,
            coef_a_notrack_maint_cost: finite(s, "coef_a_notrack_maint_cost")?,
            coef_b_notrack_maint_cost: finite(s, "coef_b_notrack_maint_cost")?,
        })
    }

    pub fn wagons(&self) -> FleetParams {
        FleetParams {
            speed: self.wagon_speed,
            capacity: self.wagon_capacity,
            availability: self.wagon_availability,
            head_stop_time: self.wagon_head_stop_time,
            turnout_time: self.wagon_turnout_time,
            turnout_freq: self.turnout_freq,
        }
    }

    pub fn locomotives(&self) -> FleetParams {
        FleetParams {
            speed: self.locomotive_speed,
            capacity: self.locomotive_capacity,
            availability: self.locomotive_availability,
            head_stop_time: self.locomotive_head_stop_time,
            turnout_time: self.locomotive_turnout_time,
            turnout_freq: self.turnout_freq,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RoadParams {
    pub mobility_cost_tk: f64,
    pub coef_a_infrast_cost: f64,
    pub coef_b_infrast_cost: f64,
}

impl RoadParams {
    pub fn from_store<S: ParameterStore + ?Sized>(s: &S) -> Result<RoadParams, ConfigError> {
        Ok(RoadParams {
            mobility_cost_tk: finite(s, "mobility_cost_tk")?,
            coef_a_infrast_cost: finite(s, "coef_a_infrast_cost")?,
            coef_b_infrast_cost: finite(s, "coef_b_infrast_cost")?,
        })
    }
}
