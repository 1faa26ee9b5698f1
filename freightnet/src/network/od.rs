use super::ids::{LinkId, OdId};
use super::link::{Gauge, LinkTable};
use super::path::{LinkSequence, Path};
use super::tons::{Category, OdTons, TonMode, TonsError};
use super::NetworkError;

/// Routing state of an OD pair.
#[derive(Clone, Debug, PartialEq)]
pub enum PathState {
    /// No path has been given yet.
    Unassigned,
    /// A path was given but cannot be operated ("no path found", intrazone,
    /// or not decomposable into links).
    Declared { path: String, gauge: Gauge },
    Operable(Path),
}

/// Freight demand between two nodes for one category of goods.
#[derive(Clone, Debug)]
pub struct Od {
    id: OdId,
    category: Category,
    tons: OdTons,
    path: PathState,
    dist: f64,
    lowest_link: Option<(LinkId, Gauge)>,
    deposit_cost: Option<f64>,
    short_freight_cost: Option<f64>,
    immo_value_cost: Option<f64>,
}

impl Od {
    pub fn new(id: OdId, ton: f64, category: Category) -> Od {
        Od {
            id,
            category,
            tons: OdTons::new(ton),
            path: PathState::Unassigned,
            dist: 0.0,
            lowest_link: None,
            deposit_cost: None,
            short_freight_cost: None,
            immo_value_cost: None,
        }
    }

    pub fn id(&self) -> OdId { self.id }
    pub fn category(&self) -> Category { self.category }
    pub fn path_state(&self) -> &PathState { &self.path }

    pub fn get_ton(&self) -> f64 { self.tons.get(None) }
    pub fn get_original_ton(&self) -> f64 { self.tons.get(Some(TonMode::Original)) }
    pub fn get_derived_ton(&self) -> f64 { self.tons.get(Some(TonMode::Derived)) }
    pub fn tons(&self) -> &OdTons { &self.tons }

    pub fn get_dist(&self) -> f64 {
        if self.is_intrazone() { 0.0 } else { self.dist }
    }

    pub fn ton_km(&self) -> f64 {
        self.get_ton() * self.get_dist()
    }

    pub fn is_intrazone(&self) -> bool {
        self.id.is_loop()
    }

    /// Has a path, even if it is a "not found" one.
    pub fn has_declared_path(&self) -> bool {
        self.path != PathState::Unassigned
    }

    pub fn has_operable_path(&self) -> bool {
        match self.path {
            PathState::Operable(_) => true,
            _ => false,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match self.path {
            PathState::Operable(ref p) => Some(p),
            _ => None,
        }
    }

    pub fn set_path(&mut self, path: &str, gauge: &str) {
        let path = Path::new(self.id, path, gauge);
        self.assign_path(path);
    }

    pub fn assign_path(&mut self, path: Path) {
        self.path = if path.is_operable() {
            PathState::Operable(path)
        } else if !path.path().is_empty() && !path.gauge_str().is_empty() {
            PathState::Declared { path: path.path().to_string(), gauge: path.gauge_str().to_string() }
        } else {
            PathState::Unassigned
        };
    }

    pub fn update_distance(&mut self, table: &LinkTable) {
        self.dist = <Od as LinkSequence>::calc_distance(&*self, table);
    }

    pub fn set_category(&mut self, category: Category) {
        self.category = category;
    }

    /// Derives tons to the OD pair with the same id and category in another
    /// modal network. Returns `(derived, returned)` tons.
    pub(crate) fn derive_ton(&mut self, other: &mut Od, coefficient: f64) -> Result<(f64, f64), NetworkError> {
        if self.id != other.id || self.category != other.category {
            return Err(NetworkError::IdentityMismatch {
                a: self.id, a_category: self.category,
                b: other.id, b_category: other.category,
            });
        }
        Ok(self.tons.derive(&mut other.tons, coefficient, true)?)
    }

    pub(crate) fn add_original_ton(&mut self, ton: f64) -> Result<(), TonsError> {
        self.tons.add_original(ton)
    }

    pub fn lowest_link(&self) -> Option<&(LinkId, Gauge)> { self.lowest_link.as_ref() }

    pub fn set_lowest_scale_link(&mut self, link: Option<(LinkId, Gauge)>) {
        self.lowest_link = link;
    }

    pub fn deposit_cost(&self) -> Option<f64> { self.deposit_cost }
    pub fn short_freight_cost(&self) -> Option<f64> { self.short_freight_cost }
    pub fn immo_value_cost(&self) -> Option<f64> { self.immo_value_cost }

    pub fn set_deposit_cost(&mut self, cost: f64) { self.deposit_cost = Some(cost); }
    pub fn set_short_freight_cost(&mut self, cost: f64) { self.short_freight_cost = Some(cost); }
    pub fn set_immo_value_cost(&mut self, cost: f64) { self.immo_value_cost = Some(cost); }
}

impl LinkSequence for Od {
    fn od_id(&self) -> OdId { self.id }

    fn links(&self) -> &[LinkId] {
        match self.path {
            PathState::Operable(ref p) => p.links(),
            _ => &[],
        }
    }

    fn gauge(&self) -> Option<&str> {
        match self.path {
            PathState::Operable(ref p) => Some(p.gauge_str()),
            PathState::Declared { ref gauge, .. } => Some(gauge),
            PathState::Unassigned => None,
        }
    }
}
