use std::collections::HashMap;

use super::ids::{LinkId, OdId};
use super::tons::{Category, LinkTons, TonsError};

pub type Gauge = String;

/// A track or road segment between two nodes, for one gauge.
#[derive(Clone, Debug)]
pub struct Link {
    pub id: LinkId,
    pub gauge: Gauge,
    pub dist: f64,
    tons: LinkTons,
    /// Unused hauling capacity (tons) of the services passing through.
    pub idle_capacity: f64,
    pub eac_detour: f64,
    pub eac_track: f64,
    pub maintenance: f64,
}

impl Link {
    pub fn new(id: LinkId, dist: f64, gauge: &str) -> Link {
        Link {
            id,
            gauge: gauge.to_string(),
            dist,
            tons: LinkTons::new(),
            idle_capacity: 0.0,
            eac_detour: 0.0,
            eac_track: 0.0,
            maintenance: 0.0,
        }
    }

    pub fn key(&self) -> (LinkId, Gauge) {
        (self.id, self.gauge.clone())
    }

    pub fn get_ton(&self) -> f64 {
        self.tons.total()
    }

    /// Tons passing through, by mode, category and OD pair. They change only
    /// together with the OD pairs, through `Network`.
    pub fn tons(&self) -> &LinkTons {
        &self.tons
    }

    pub fn get_dist(&self) -> f64 {
        self.dist
    }

    pub fn ton_km(&self) -> f64 {
        self.get_ton() * self.dist
    }

    /// Ton-km including the tare of the wagons and locomotives needed
    /// to haul the net tons.
    pub fn gross_ton_km(&self, wagon_capacity: f64, wagon_weight: f64,
                        locomotive_capacity: f64, locomotive_weight: f64) -> f64 {
        let tare_ratio = wagon_weight / wagon_capacity + locomotive_weight / locomotive_capacity;
        self.ton_km() * (1.0 + tare_ratio)
    }

    pub(crate) fn add_original_ton(&mut self, ton: f64, category: Category, od: OdId) {
        self.tons.add_original(ton, category, od);
    }

    pub(crate) fn add_derived_ton(&mut self, ton: f64, category: Category, od: OdId) {
        self.tons.add_derived(ton, category, od);
    }

    pub(crate) fn remove_ton(&mut self, ton: f64, category: Category, od: OdId) -> Result<(), TonsError> {
        self.tons.remove(ton, category, od)
    }

    pub(crate) fn remove_derived_ton(&mut self, ton: f64, category: Category, od: OdId) -> Result<(), TonsError> {
        self.tons.remove_derived(ton, category, od)
    }

    pub fn add_idle_capacity(&mut self, capacity: f64) {
        self.idle_capacity += capacity;
    }

    pub fn regroup(&mut self, capacity: f64) {
        self.idle_capacity -= capacity;
    }

    pub fn revert_regroup(&mut self, capacity: f64) {
        self.idle_capacity += capacity;
    }
}

/// The links of a network, in insertion order.
#[derive(Clone, Debug, Default)]
pub struct LinkTable {
    links: Vec<Link>,
    index: HashMap<(LinkId, Gauge), usize>,
}

impl LinkTable {
    pub fn new() -> LinkTable {
        Default::default()
    }

    /// Inserts a link, replacing any link with the same id and gauge.
    pub fn insert(&mut self, link: Link) -> Option<Link> {
        let key = link.key();
        match self.index.get(&key) {
            Some(&idx) => Some(std::mem::replace(&mut self.links[idx], link)),
            None => {
                self.index.insert(key, self.links.len());
                self.links.push(link);
                None
            }
        }
    }

    pub fn index_of(&self, id: LinkId, gauge: &str) -> Option<usize> {
        self.index.get(&(id, gauge.to_string())).cloned()
    }

    pub fn get(&self, id: LinkId, gauge: &str) -> Option<&Link> {
        self.index_of(id, gauge).map(|i| &self.links[i])
    }

    pub fn get_mut(&mut self, id: LinkId, gauge: &str) -> Option<&mut Link> {
        match self.index_of(id, gauge) {
            Some(i) => Some(&mut self.links[i]),
            None => None,
        }
    }

    pub fn by_index(&self, idx: usize) -> &Link {
        &self.links[idx]
    }

    pub fn by_index_mut(&mut self, idx: usize) -> &mut Link {
        &mut self.links[idx]
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Link> {
        self.links.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Link> {
        self.links.iter_mut()
    }
}
