use std::collections::HashMap;
use std::ops::Index;

use crate::item::{Capability, CapabilitySet, Dep, Item, ItemStatus, Kind, Origin};

/// Item identifier - index into the pool
pub type ItemId = usize;

/// Name of the synthetic item carrying the platform capabilities
pub const SYSTEM_ITEM_NAME: &str = "system";

type IndexKey = (Kind, String);

/// An entry in the pool: the item and its mutable status
#[derive(Debug, Clone)]
struct PoolEntry {
    item: Item,
    status: ItemStatus,
}

/// The pool of all resolvable items, installed and available.
///
/// Items are addressed by [`ItemId`]. The pool keeps indexes by name,
/// by provided capability, and by required and conflicting capability so
/// provider and reverse-dependency lookups do not scan every item.
///
/// A pool always contains the synthetic system item: installed, locked,
/// and providing the platform capabilities.
#[derive(Debug, Clone)]
pub struct Pool {
    entries: Vec<PoolEntry>,
    /// Item ids by (kind, name)
    by_name: HashMap<IndexKey, Vec<ItemId>>,
    /// Item ids by provided capability, including the implicit self provide
    providers: HashMap<IndexKey, Vec<ItemId>>,
    /// Item ids by required capability
    requirers: HashMap<IndexKey, Vec<ItemId>>,
    /// Item ids by conflicting capability
    conflicters: HashMap<IndexKey, Vec<ItemId>>,
    system: ItemId,
}

impl Default for Pool {
    fn default() -> Self {
        Self::new()
    }
}

impl Pool {
    /// Create a pool holding only the system item
    pub fn new() -> Self {
        let mut pool = Self {
            entries: Vec::new(),
            by_name: HashMap::new(),
            providers: HashMap::new(),
            requirers: HashMap::new(),
            conflicters: HashMap::new(),
            system: 0,
        };

        let system = pool.insert(Item::new(Kind::System, SYSTEM_ITEM_NAME, "0"), true);
        if !pool.entries[system].status.set_lock(true, Origin::User) {
            log::warn!("Unable to lock the system item");
        }
        pool.system = system;
        pool
    }

    /// Add an available (not installed) item
    pub fn add(&mut self, item: Item) -> ItemId {
        self.insert(item, false)
    }

    /// Add an installed item
    pub fn add_installed(&mut self, item: Item) -> ItemId {
        self.insert(item, true)
    }

    fn insert(&mut self, item: Item, installed: bool) -> ItemId {
        let id = self.entries.len();

        self.by_name
            .entry((item.kind, item.name.clone()))
            .or_default()
            .push(id);
        self.providers
            .entry((item.kind, item.name.clone()))
            .or_default()
            .push(id);
        for cap in item.dep(Dep::Provides) {
            index_cap(&mut self.providers, cap, id);
        }
        for cap in item.dep(Dep::Requires) {
            index_cap(&mut self.requirers, cap, id);
        }
        for cap in item.dep(Dep::Conflicts) {
            index_cap(&mut self.conflicters, cap, id);
        }

        log::trace!("Added {} to pool as #{}", item, id);
        self.entries.push(PoolEntry {
            item,
            status: ItemStatus::new(installed),
        });
        id
    }

    /// Number of items in the pool, the system item included
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: ItemId) -> bool {
        id < self.entries.len()
    }

    /// Get an item by id
    pub fn get(&self, id: ItemId) -> Option<&Item> {
        self.entries.get(id).map(|e| &e.item)
    }

    /// Status of an item.
    ///
    /// Panics if `id` is not part of the pool.
    pub fn status(&self, id: ItemId) -> &ItemStatus {
        &self.entries[id].status
    }

    /// Mutable status of an item.
    ///
    /// Panics if `id` is not part of the pool.
    pub fn status_mut(&mut self, id: ItemId) -> &mut ItemStatus {
        &mut self.entries[id].status
    }

    /// The synthetic system item
    pub fn system_item(&self) -> ItemId {
        self.system
    }

    /// Replace the platform capabilities provided by the system item
    pub fn set_system_capabilities(&mut self, caps: CapabilitySet) {
        let system = self.system;
        for cap in self.entries[system].item.dep(Dep::Provides) {
            if let Some(ids) = self.providers.get_mut(&cap_key(cap)) {
                ids.retain(|&id| id != system);
            }
        }
        for cap in &caps {
            index_cap(&mut self.providers, cap, system);
        }
        self.entries[system].item.set_dep(Dep::Provides, caps);
    }

    /// All item ids in pool order
    pub fn ids(&self) -> impl Iterator<Item = ItemId> {
        0..self.entries.len()
    }

    /// Iterate all items with their status
    pub fn iter(&self) -> impl Iterator<Item = (ItemId, &Item, &ItemStatus)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(id, e)| (id, &e.item, &e.status))
    }

    /// Items of the given kind, in pool order
    pub fn by_kind(&self, kind: Kind) -> impl Iterator<Item = ItemId> + '_ {
        self.iter()
            .filter(move |(_, item, _)| item.kind == kind)
            .map(|(id, _, _)| id)
    }

    /// Items with the given kind and name, in pool order
    pub fn by_name(&self, kind: Kind, name: &str) -> &[ItemId] {
        self.by_name
            .get(&(kind, name.to_string()))
            .map(|ids| ids.as_slice())
            .unwrap_or(&[])
    }

    /// Installed items, in pool order
    pub fn installed(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.iter()
            .filter(|(_, _, status)| status.is_installed())
            .map(|(id, _, _)| id)
    }

    /// Items providing the capability, installed or not, in pool order
    pub fn what_provides(&self, cap: &Capability) -> Vec<ItemId> {
        let mut result: Vec<ItemId> = self
            .providers
            .get(&cap_key(cap))
            .map(|ids| ids.iter().copied().filter(|&id| self[id].provides(cap)).collect())
            .unwrap_or_default();
        result.dedup();
        result
    }

    /// Installed items providing the capability
    pub fn installed_providers(&self, cap: &Capability) -> Vec<ItemId> {
        self.what_provides(cap)
            .into_iter()
            .filter(|&id| self.status(id).is_installed())
            .collect()
    }

    /// Available (not installed) items providing the capability
    pub fn uninstalled_providers(&self, cap: &Capability) -> Vec<ItemId> {
        self.what_provides(cap)
            .into_iter()
            .filter(|&id| !self.status(id).is_installed())
            .collect()
    }

    /// Items with a requirement the given item provides, along with that
    /// requirement.
    pub fn requirers_of(&self, id: ItemId) -> Vec<(ItemId, Capability)> {
        self.reverse_lookup(&self.requirers, Dep::Requires, id)
    }

    /// Items with a conflict the given item provides, along with that
    /// conflict.
    pub fn conflicters_of(&self, id: ItemId) -> Vec<(ItemId, Capability)> {
        self.reverse_lookup(&self.conflicters, Dep::Conflicts, id)
    }

    fn reverse_lookup(
        &self,
        index: &HashMap<IndexKey, Vec<ItemId>>,
        dep: Dep,
        id: ItemId,
    ) -> Vec<(ItemId, Capability)> {
        let item = &self[id];
        let mut keys = vec![(item.kind, item.name.clone())];
        keys.extend(item.dep(Dep::Provides).map(cap_key));

        let mut result: Vec<(ItemId, Capability)> = Vec::new();
        for key in keys {
            let Some(candidates) = index.get(&key) else {
                continue;
            };
            for &other in candidates {
                for cap in self[other].dep(dep) {
                    if cap_key(cap) == key
                        && item.provides(cap)
                        && !result.iter().any(|(o, c)| *o == other && c == cap)
                    {
                        result.push((other, cap.clone()));
                    }
                }
            }
        }
        result
    }

    /// Log the pool contents at debug level. Items without a status are
    /// listed only when `full` is set.
    pub fn dump(&self, full: bool) {
        log::debug!("---------------------------------------");
        for (id, item, status) in self.iter() {
            if full || status.transacts() || !status.is_undetermined() {
                log::debug!("{}: {} [{}]", id, item, status);
            }
        }
        log::debug!("---------------------------------------");
    }
}

impl Index<ItemId> for Pool {
    type Output = Item;

    fn index(&self, id: ItemId) -> &Self::Output {
        &self.entries[id].item
    }
}

fn cap_key(cap: &Capability) -> IndexKey {
    (cap.refers(), cap.name().to_string())
}

fn index_cap(index: &mut HashMap<IndexKey, Vec<ItemId>>, cap: &Capability, id: ItemId) {
    let ids = index.entry(cap_key(cap)).or_default();
    if !ids.contains(&id) {
        ids.push(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zolv_edition::Operator;

    #[test]
    fn test_pool_has_locked_system_item() {
        let pool = Pool::new();
        let system = pool.system_item();

        assert_eq!(pool.len(), 1);
        assert_eq!(pool[system].kind, Kind::System);
        assert!(pool.status(system).is_installed());
        assert!(pool.status(system).is_locked());
    }

    #[test]
    fn test_what_provides_by_name_and_provides() {
        let mut pool = Pool::new();
        let foo = pool.add(Item::package("foo", "1.0"));
        let bar = pool.add_installed(
            Item::package("bar", "2.0").with_dep(Dep::Provides, Capability::new("foo")),
        );

        let providers = pool.what_provides(&Capability::new("foo"));
        assert_eq!(providers, vec![foo, bar]);
        assert_eq!(pool.installed_providers(&Capability::new("foo")), vec![bar]);
        assert_eq!(pool.uninstalled_providers(&Capability::new("foo")), vec![foo]);
    }

    #[test]
    fn test_what_provides_respects_range() {
        let mut pool = Pool::new();
        let old = pool.add(Item::package("libfoo", "1.0"));
        let new = pool.add(Item::package("libfoo", "2.0"));

        let cap = Capability::versioned("libfoo", Operator::GreaterEqual, "1.5");
        assert_eq!(pool.what_provides(&cap), vec![new]);

        let cap = Capability::versioned("libfoo", Operator::Less, "1.5");
        assert_eq!(pool.what_provides(&cap), vec![old]);
    }

    #[test]
    fn test_kind_separates_capabilities() {
        let mut pool = Pool::new();
        let pattern = pool.add(Item::new(Kind::Pattern, "base", "1"));
        pool.add(Item::package("base", "1"));

        let cap = Capability::of_kind(Kind::Pattern, "base");
        assert_eq!(pool.what_provides(&cap), vec![pattern]);
    }

    #[test]
    fn test_requirers_and_conflicters() {
        let mut pool = Pool::new();
        let lib = pool.add_installed(
            Item::package("libfoo", "1.0").with_dep(Dep::Provides, Capability::new("foo-api")),
        );
        let app = pool.add_installed(
            Item::package("app", "1.0").with_dep(Dep::Requires, Capability::new("foo-api")),
        );
        let enemy = pool.add(
            Item::package("enemy", "1.0").with_dep(Dep::Conflicts, Capability::new("libfoo")),
        );

        let requirers = pool.requirers_of(lib);
        assert_eq!(requirers.len(), 1);
        assert_eq!(requirers[0].0, app);
        assert_eq!(requirers[0].1, Capability::new("foo-api"));

        let conflicters = pool.conflicters_of(lib);
        assert_eq!(conflicters, vec![(enemy, Capability::new("libfoo"))]);
        assert!(pool.requirers_of(app).is_empty());
    }

    #[test]
    fn test_system_capabilities() {
        let mut pool = Pool::new();
        let system = pool.system_item();

        let caps: CapabilitySet = vec![Capability::new("hal(pci:1234)")].into_iter().collect();
        pool.set_system_capabilities(caps);
        assert_eq!(pool.what_provides(&Capability::new("hal(pci:1234)")), vec![system]);

        pool.set_system_capabilities(CapabilitySet::new());
        assert!(pool.what_provides(&Capability::new("hal(pci:1234)")).is_empty());
    }

    #[test]
    fn test_by_kind_and_name() {
        let mut pool = Pool::new();
        let a = pool.add(Item::package("a", "1"));
        let a2 = pool.add_installed(Item::package("a", "2"));
        let patch = pool.add(Item::new(Kind::Patch, "a", "1"));

        assert_eq!(pool.by_name(Kind::Package, "a"), &[a, a2]);
        assert_eq!(pool.by_kind(Kind::Patch).collect::<Vec<_>>(), vec![patch]);
        assert_eq!(pool.installed().collect::<Vec<_>>(), vec![pool.system_item(), a2]);
    }
}
