//! Links, paths and OD pairs of one modal network.

pub mod ids;
pub mod link;
pub mod od;
pub mod path;
pub mod tons;

use std::collections::HashMap;

use log::warn;
use ordered_float::OrderedFloat;

use self::ids::{LinkId, OdId};
use self::link::{Link, LinkTable};
use self::od::Od;
use self::path::{LinkSequence, Path};
use self::tons::{Category, TonsError};

/// Missing links tolerated on a single path before the input is considered
/// corrupt.
pub const MAX_MISSING_LINKS: usize = 50;

/// Maximum relative difference between link and OD based ton-km.
pub const TON_KM_TOLERANCE: f64 = 0.001;

#[derive(Debug, Fail)]
pub enum NetworkError {
    #[fail(display = "od pairs are different: {} (category {}) != {} (category {})",
           a, a_category, b, b_category)]
    IdentityMismatch { a: OdId, a_category: Category, b: OdId, b_category: Category },
    #[fail(display = "link and od based total ton-km differ: {} != {}", link_ton_km, od_ton_km)]
    ConsistencyError { link_ton_km: f64, od_ton_km: f64 },
    #[fail(display = "too many links missing on path of od pair {}", _0)]
    TooManyMissingLinks(OdId),
    #[fail(display = "unknown od pair {} of category {}", _0, _1)]
    UnknownOd(OdId, Category),
    #[fail(display = "{}", _0)]
    Tons(#[cause] TonsError),
}

impl From<TonsError> for NetworkError {
    fn from(e: TonsError) -> NetworkError {
        NetworkError::Tons(e)
    }
}

#[derive(Clone, Debug, Default)]
pub struct Network {
    links: LinkTable,
    paths: HashMap<OdId, Path>,
    ods: Vec<Od>,
    od_index: HashMap<(OdId, Category), usize>,
}

impl Network {
    pub fn new() -> Network {
        Default::default()
    }

    pub fn add_link(&mut self, link: Link) -> Option<Link> {
        self.links.insert(link)
    }

    pub fn add_path(&mut self, path: Path) {
        self.paths.insert(path.od_id(), path);
    }

    pub fn links(&self) -> &LinkTable { &self.links }
    pub fn links_mut(&mut self) -> &mut LinkTable { &mut self.links }

    pub fn link(&self, id: LinkId, gauge: &str) -> Option<&Link> {
        self.links.get(id, gauge)
    }

    pub fn path(&self, id: OdId) -> Option<&Path> {
        self.paths.get(&id)
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.paths.values()
    }

    pub fn iter_links(&self) -> impl Iterator<Item = &Link> {
        self.links.iter()
    }

    pub fn iter_ods(&self) -> impl Iterator<Item = &Od> {
        self.ods.iter()
    }

    pub fn od(&self, id: OdId, category: Category) -> Option<&Od> {
        self.od_index.get(&(id, category)).map(|&i| &self.ods[i])
    }

    pub fn od_mut(&mut self, id: OdId, category: Category) -> Option<&mut Od> {
        match self.od_index.get(&(id, category)) {
            Some(&i) => Some(&mut self.ods[i]),
            None => None,
        }
    }

    /// Returns the OD pair, creating an empty one if it does not exist.
    /// A new OD pair takes its path from the path table.
    pub fn get_od(&mut self, id: OdId, category: Category) -> &mut Od {
        let idx = self.get_od_index(id, category);
        &mut self.ods[idx]
    }

    fn get_od_index(&mut self, id: OdId, category: Category) -> usize {
        if let Some(&i) = self.od_index.get(&(id, category)) {
            return i;
        }
        let od = self.new_od(id, category);
        self.insert_od(od)
    }

    fn new_od(&self, id: OdId, category: Category) -> Od {
        let mut od = Od::new(id, 0.0, category);
        if let Some(path) = self.paths.get(&id) {
            od.assign_path(path.clone());
        }
        od.update_distance(&self.links);
        od
    }

    fn insert_od(&mut self, od: Od) -> usize {
        let idx = self.ods.len();
        self.od_index.insert((od.id(), od.category()), idx);
        self.ods.push(od);
        idx
    }

    /// Adds demand to an OD pair and to every link on its path.
    pub fn add_original_tons(&mut self, id: OdId, category: Category, ton: f64) -> Result<(), NetworkError> {
        let idx = self.get_od_index(id, category);
        let links = self.path_link_indices(&self.ods[idx])?;
        self.ods[idx].add_original_ton(ton)?;
        for i in links {
            self.links.by_index_mut(i).add_original_ton(ton, category, id);
        }
        Ok(())
    }

    /// Applies `f` to every link on the path of an OD pair. Missing links are
    /// reported and skipped, up to `MAX_MISSING_LINKS` per path.
    pub fn for_each_path_link<F>(&mut self, od_idx: usize, mut f: F) -> Result<(), NetworkError>
        where F: FnMut(&mut Link) -> Result<(), NetworkError> {
        for i in self.path_link_indices(&self.ods[od_idx])? {
            f(self.links.by_index_mut(i))?;
        }
        Ok(())
    }

    /// Link table positions of the links on the path of `od`.
    fn path_link_indices(&self, od: &Od) -> Result<Vec<usize>, NetworkError> {
        let gauge = match od.gauge() {
            Some(g) => g,
            None => return Ok(Vec::new()),
        };

        let mut found = Vec::with_capacity(od.links().len());
        let mut missing = 0;
        for &link_id in od.links() {
            match self.links.index_of(link_id, gauge) {
                Some(i) => found.push(i),
                None => {
                    missing += 1;
                    warn!("there is no link {} with gauge {} for od pair {}", link_id, gauge, od.id());
                    if missing >= MAX_MISSING_LINKS {
                        return Err(NetworkError::TooManyMissingLinks(od.id()));
                    }
                }
            }
        }
        Ok(found)
    }

    /// Copies of the links on the path of `od` with `f` applied, keyed by
    /// link table position. The table itself is left untouched.
    fn stage_path_links<F>(&self, od: &Od, mut f: F) -> Result<HashMap<usize, Link>, NetworkError>
        where F: FnMut(&mut Link) -> Result<(), NetworkError> {
        let mut staged = HashMap::new();
        for i in self.path_link_indices(od)? {
            let link = staged.entry(i).or_insert_with(|| self.links.by_index(i).clone());
            f(link)?;
        }
        Ok(staged)
    }

    fn commit_links(&mut self, staged: HashMap<usize, Link>) {
        for (i, link) in staged {
            *self.links.by_index_mut(i) = link;
        }
    }

    pub fn od_indices(&self) -> std::ops::Range<usize> {
        0..self.ods.len()
    }

    pub fn od_by_index(&self, idx: usize) -> &Od {
        &self.ods[idx]
    }

    pub fn path_distance(&self, od: &Od) -> f64 {
        if od.is_intrazone() {
            return 0.0;
        }
        match self.paths.get(&od.id()) {
            Some(path) => path.calc_distance(&self.links),
            None => 0.0,
        }
    }

    pub fn total_tons(&self) -> f64 {
        self.ods.iter().map(Od::get_ton).sum()
    }

    /// Tons of OD pairs that have no operable path in this network.
    pub fn rejected_tons(&self) -> f64 {
        self.ods.iter()
            .filter(|od| !od.has_operable_path() && !od.is_intrazone())
            .map(Od::get_ton)
            .sum()
    }

    /// Total ton-km, computed over links and cross-checked against the OD
    /// pairs.
    pub fn total_ton_km(&self) -> Result<f64, NetworkError> {
        let link_ton_km :f64 = self.links.iter().map(Link::ton_km).sum();
        let od_ton_km :f64 = self.ods.iter().map(Od::ton_km).sum();

        let scale = link_ton_km.abs().max(od_ton_km.abs());
        if (link_ton_km - od_ton_km).abs() > TON_KM_TOLERANCE * scale {
            return Err(NetworkError::ConsistencyError { link_ton_km, od_ton_km });
        }
        Ok(link_ton_km)
    }

    /// Marks, for each OD pair, the link on its path with the least tons
    /// passing through.
    pub fn update_lowest_scale_links(&mut self) {
        for i in 0..self.ods.len() {
            let lowest = match self.ods[i].path() {
                Some(path) => path.links().iter()
                    .filter_map(|l| self.links.get(*l, path.gauge_str()))
                    .min_by_key(|l| OrderedFloat(l.get_ton()))
                    .map(Link::key),
                None => None,
            };
            self.ods[i].set_lowest_scale_link(lowest);
        }
    }

    /// Tons through the lowest-scale link of an OD pair.
    pub fn lowest_link_scale(&self, od: &Od) -> Option<f64> {
        od.lowest_link()
            .and_then(|&(id, ref gauge)| self.links.get(id, gauge))
            .map(Link::get_ton)
    }

    /// Derives tons of an OD pair to the same OD pair of `other`, keeping
    /// the link ledgers of both networks in step. Returns
    /// `(derived, returned)` tons. On error neither network is changed.
    pub fn derive_od(&mut self, other: &mut Network, id: OdId, category: Category, coefficient: f64)
        -> Result<(f64, f64), NetworkError> {
        let idx = match self.od_index.get(&(id, category)) {
            Some(&i) => i,
            None => return Err(NetworkError::UnknownOd(id, category)),
        };
        let other_idx = other.od_index.get(&(id, category)).cloned();

        let mut od = self.ods[idx].clone();
        let mut other_od = match other_idx {
            Some(i) => other.ods[i].clone(),
            None => other.new_od(id, category),
        };
        let (to_derive, to_return) = od.derive_ton(&mut other_od, coefficient)?;

        let links = self.stage_path_links(&od, |link| {
            if to_derive >= 0.0 {
                link.remove_ton(to_derive + to_return, category, id)?;
            } else {
                link.remove_derived_ton(to_return, category, id)?;
                link.add_original_ton(-to_derive, category, id);
            }
            Ok(())
        })?;
        let other_links = other.stage_path_links(&other_od, |link| {
            if to_derive >= 0.0 {
                link.add_derived_ton(to_derive, category, id);
            } else {
                link.remove_derived_ton(-to_derive, category, id)?;
            }
            link.add_original_ton(to_return, category, id);
            Ok(())
        })?;

        self.ods[idx] = od;
        self.commit_links(links);
        match other_idx {
            Some(i) => other.ods[i] = other_od,
            None => { other.insert_od(other_od); },
        }
        other.commit_links(other_links);
        Ok((to_derive, to_return))
    }
}
