//! Mobility and infrastructure cost, expressed per ton-km.
//!
//! Cost functions are pure: they read a network snapshot and parameters
//! and return a fresh `CostBreakdown` on every call.

pub mod rail;
pub mod road;

use std::collections::BTreeMap;
use std::fmt;

use smallvec::SmallVec;

/// At or below this total ton-km a network is considered empty and every
/// per-ton-km cost is zero.
pub const MIN_TON_KM: f64 = 0.1;

pub const TOTAL_MOBILITY: &str = "total_mobility";
pub const TOTAL_INFRASTRUCTURE: &str = "total_infrastructure";

/// Spreads a yearly cost over the ton-km carried.
pub fn per_ton_km(cost: f64, total_ton_km: f64) -> f64 {
    if total_ton_km > MIN_TON_KM { cost / total_ton_km } else { 0.0 }
}

/// Share of an investment to be paid yearly over `life` years at
/// interest `rate`.
pub fn capital_recovery_factor(rate: f64, life: f64) -> f64 {
    let f = (1.0 + rate).powf(life);
    rate * f / (f - 1.0)
}

/// Named per-ton-km cost components and their sum.
#[derive(Clone, Debug, PartialEq)]
pub struct CostBreakdown {
    total_name: &'static str,
    components: SmallVec<[(&'static str, f64); 6]>,
}

impl CostBreakdown {
    pub fn new(total_name: &'static str) -> CostBreakdown {
        CostBreakdown { total_name, components: SmallVec::new() }
    }

    pub fn with(mut self, name: &'static str, value: f64) -> CostBreakdown {
        self.push(name, value);
        self
    }

    /// Adds `value` to a component, creating it if needed.
    pub fn push(&mut self, name: &'static str, value: f64) {
        match self.components.iter_mut().find(|(n, _)| *n == name) {
            Some(c) => c.1 += value,
            None => self.components.push((name, value)),
        }
    }

    /// Value of a component, or of the total when asked by its name.
    pub fn get(&self, name: &str) -> Option<f64> {
        if name == self.total_name {
            return Some(self.total());
        }
        self.components.iter().find(|(n, _)| *n == name).map(|c| c.1)
    }

    pub fn total(&self) -> f64 {
        self.components.iter().map(|c| c.1).sum()
    }

    pub fn total_name(&self) -> &'static str {
        self.total_name
    }

    pub fn components(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        self.components.iter().cloned()
    }

    /// Divides every component by the ton-km carried.
    pub fn per_ton_km(mut self, total_ton_km: f64) -> CostBreakdown {
        for c in self.components.iter_mut() {
            c.1 = per_ton_km(c.1, total_ton_km);
        }
        self
    }

    /// All components plus the total, keyed by name.
    pub fn to_map(&self) -> BTreeMap<&'static str, f64> {
        let mut map :BTreeMap<_, _> = self.components().collect();
        map.insert(self.total_name, self.total());
        map
    }
}

impl fmt::Display for CostBreakdown {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (name, value) in self.components() {
            writeln!(f, "{:<22} {:.6}", name, value)?;
        }
        write!(f, "{:<22} {:.6}", self.total_name, self.total())
    }
}
