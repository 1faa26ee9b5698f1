//! Bookkeeping of tons by transport mode of origin.
//!
//! Tons carried by a modal network are either *original* (native to the
//! mode) or *derived* (shifted in from the other mode). Derivation moves
//! tons between the ledgers of two OD pairs with the same identity, and
//! removal always gives back derived tons before touching original ones.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use super::ids::OdId;

pub type Category = u32;

/// Absolute tolerance for rounding residue when tons are removed.
pub const TOLERANCE: f64 = 0.01;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TonMode {
    Original,
    Derived,
}

impl fmt::Display for TonMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            TonMode::Original => write!(f, "original"),
            TonMode::Derived => write!(f, "derived"),
        }
    }
}

#[derive(Debug, Fail, PartialEq)]
pub enum TonsError {
    #[fail(display = "cannot remove {} {} tons, only {} available", requested, mode, available)]
    InvariantViolation { mode: TonMode, requested: f64, available: f64 },
    #[fail(display = "derivation coefficient {} is outside [0, 1]", _0)]
    InvalidCoefficient(f64),
    #[fail(display = "tons are already projected by a factor of {}", _0)]
    AlreadyProjected(f64),
    #[fail(display = "projection factor {} must be positive and finite", _0)]
    InvalidProjection(f64),
}

fn check_coefficient(coefficient: f64) -> Result<(), TonsError> {
    if coefficient >= 0.0 && coefficient <= 1.0 {
        Ok(())
    } else {
        Err(TonsError::InvalidCoefficient(coefficient))
    }
}

/// Remaining tons after removing `requested` from `available`, snapped to
/// zero when the shortfall is within tolerance.
fn settle(mode: TonMode, available: f64, requested: f64) -> Result<f64, TonsError> {
    let remaining = available - requested;
    if remaining < -TOLERANCE {
        Err(TonsError::InvariantViolation { mode, requested, available })
    } else if remaining < 0.0 {
        Ok(0.0)
    } else {
        Ok(remaining)
    }
}

/// Tons of a single OD pair.
#[derive(Clone, Debug, PartialEq)]
pub struct OdTons {
    original: f64,
    derived: f64,
    projection: Option<f64>,
}

impl Default for OdTons {
    fn default() -> OdTons {
        OdTons::new(0.0)
    }
}

impl OdTons {
    pub fn new(original: f64) -> OdTons {
        OdTons { original, derived: 0.0, projection: None }
    }

    pub fn get_original(&self) -> f64 { self.original }
    pub fn get_derived(&self) -> f64 { self.derived }

    /// Tons of one mode, or the total when `mode` is `None`.
    pub fn get(&self, mode: Option<TonMode>) -> f64 {
        match mode {
            Some(TonMode::Original) => self.original,
            Some(TonMode::Derived) => self.derived,
            None => self.original + self.derived,
        }
    }

    pub fn add_original(&mut self, ton: f64) -> Result<(), TonsError> {
        self.original = settle(TonMode::Original, self.original, -ton)?;
        Ok(())
    }

    /// Derives tons to the ledger of the same OD pair in another mode.
    ///
    /// Tons previously derived from `other` are folded back into the base
    /// before applying `coefficient`, so calling this twice with the same
    /// coefficient is idempotent. Tons this ledger holds as derived are
    /// returned to `other` in full. Returns `(derived, returned)`.
    pub fn derive(&mut self, other: &mut OdTons, coefficient: f64, allow_original: bool)
        -> Result<(f64, f64), TonsError> {
        check_coefficient(coefficient)?;

        let base = self.original + other.derived;
        let to_derive = if allow_original {
            base * coefficient - other.derived
        } else {
            0.0
        };
        let to_return = self.derived;

        let self_original = settle(TonMode::Original, self.original, to_derive)?;
        let other_derived = settle(TonMode::Derived, other.derived, -to_derive)?;

        self.original = self_original;
        self.derived = 0.0;
        other.derived = other_derived;
        other.original += to_return;

        Ok((to_derive, to_return))
    }

    /// Scales all tons by `factor`. Only one projection can be active;
    /// revert it before projecting again.
    pub fn project(&mut self, factor: f64) -> Result<(), TonsError> {
        if !(factor > 0.0 && factor.is_finite()) {
            return Err(TonsError::InvalidProjection(factor));
        }
        if let Some(active) = self.projection {
            return Err(TonsError::AlreadyProjected(active));
        }
        self.original *= factor;
        self.derived *= factor;
        self.projection = Some(factor);
        Ok(())
    }

    pub fn revert_project(&mut self) {
        if let Some(factor) = self.projection.take() {
            self.original /= factor;
            self.derived /= factor;
        }
    }

    pub fn projection(&self) -> Option<f64> {
        self.projection
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct TonKey {
    mode: TonMode,
    category: Category,
    od: OdId,
}

/// Selects ledger entries. `None` in a field matches everything.
#[derive(Copy, Clone, Debug, Default)]
pub struct TonFilter<'a> {
    pub categories: Option<&'a [Category]>,
    pub ods: Option<&'a [OdId]>,
    pub modes: Option<&'a [TonMode]>,
}

impl<'a> TonFilter<'a> {
    pub fn all() -> TonFilter<'a> {
        Default::default()
    }

    pub fn categories(mut self, categories: &'a [Category]) -> TonFilter<'a> {
        self.categories = Some(categories);
        self
    }

    pub fn ods(mut self, ods: &'a [OdId]) -> TonFilter<'a> {
        self.ods = Some(ods);
        self
    }

    pub fn modes(mut self, modes: &'a [TonMode]) -> TonFilter<'a> {
        self.modes = Some(modes);
        self
    }

    fn matches(&self, key: &TonKey) -> bool {
        self.modes.map_or(true, |m| m.contains(&key.mode))
            && self.categories.map_or(true, |c| c.contains(&key.category))
            && self.ods.map_or(true, |o| o.contains(&key.od))
    }
}

/// Tons passing through a link, by mode, category and OD pair.
#[derive(Clone, Debug, Default)]
pub struct LinkTons {
    tons: HashMap<TonKey, f64>,
}

impl LinkTons {
    pub fn new() -> LinkTons {
        Default::default()
    }

    pub fn get(&self, filter: &TonFilter) -> f64 {
        self.tons.iter()
            .filter(|(k, _)| filter.matches(k))
            .map(|(_, v)| *v)
            .sum()
    }

    pub fn total(&self) -> f64 {
        self.tons.values().sum()
    }

    pub fn get_original(&self, filter: &TonFilter) -> f64 {
        self.get(&filter.modes(&[TonMode::Original]))
    }

    pub fn get_derived(&self, filter: &TonFilter) -> f64 {
        self.get(&filter.modes(&[TonMode::Derived]))
    }

    pub fn entry(&self, mode: TonMode, category: Category, od: OdId) -> f64 {
        self.tons.get(&TonKey { mode, category, od }).cloned().unwrap_or(0.0)
    }

    pub fn tons_by_category(&self) -> BTreeMap<Category, f64> {
        let mut by_category = BTreeMap::new();
        for (key, ton) in &self.tons {
            *by_category.entry(key.category).or_insert(0.0) += *ton;
        }
        by_category
    }

    pub fn is_empty(&self) -> bool {
        self.tons.is_empty()
    }

    pub fn add_original(&mut self, ton: f64, category: Category, od: OdId) {
        self.add(ton, TonMode::Original, category, od);
    }

    pub fn add_derived(&mut self, ton: f64, category: Category, od: OdId) {
        self.add(ton, TonMode::Derived, category, od);
    }

    pub fn remove_original(&mut self, ton: f64, category: Category, od: OdId) -> Result<(), TonsError> {
        self.remove_mode(ton, TonMode::Original, category, od)
    }

    pub fn remove_derived(&mut self, ton: f64, category: Category, od: OdId) -> Result<(), TonsError> {
        self.remove_mode(ton, TonMode::Derived, category, od)
    }

    /// Removes tons of an OD pair, derived ones first.
    pub fn remove(&mut self, ton: f64, category: Category, od: OdId) -> Result<(), TonsError> {
        let derived = self.entry(TonMode::Derived, category, od);
        let original = self.entry(TonMode::Original, category, od);
        if ton - (derived + original) > TOLERANCE {
            return Err(TonsError::InvariantViolation {
                mode: TonMode::Original,
                requested: ton - derived,
                available: original,
            });
        }

        if ton < derived {
            self.remove_mode(ton, TonMode::Derived, category, od)
        } else if derived == 0.0 {
            self.remove_mode(ton, TonMode::Original, category, od)
        } else {
            self.tons.remove(&TonKey { mode: TonMode::Derived, category, od });
            self.remove_mode(ton - derived, TonMode::Original, category, od)
        }
    }

    /// Drops entries holding less than `significance` tons.
    pub fn prune_below(&mut self, significance: f64) {
        self.tons.retain(|_, ton| *ton >= significance);
    }

    fn add(&mut self, ton: f64, mode: TonMode, category: Category, od: OdId) {
        *self.tons.entry(TonKey { mode, category, od }).or_insert(0.0) += ton;
    }

    fn remove_mode(&mut self, ton: f64, mode: TonMode, category: Category, od: OdId)
        -> Result<(), TonsError> {
        if ton <= 0.0 {
            return Ok(());
        }
        let key = TonKey { mode, category, od };
        let existing = self.tons.get(&key).cloned().unwrap_or(0.0);
        let remaining = existing - ton;
        if remaining < -TOLERANCE {
            return Err(TonsError::InvariantViolation { mode, requested: ton, available: existing });
        }
        if remaining > TOLERANCE {
            self.tons.insert(key, remaining);
        } else {
            // rounding residue, the entry is exhausted
            self.tons.remove(&key);
        }
        Ok(())
    }
}
