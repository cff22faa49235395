use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;

use indexmap::IndexMap;

use super::info::{InfoKind, ResolverInfo};
use super::pool::{ItemId, Pool};
use crate::item::{Arch, Capability, Origin, Status};

/// Dependencies and items the resolver is told to disregard.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IgnoreRules {
    /// Conflicts of an item that are not enforced
    pub conflicts: HashSet<(ItemId, Capability)>,
    /// Requirements of an item that are not enforced
    pub requires: HashSet<(ItemId, Capability)>,
    /// Obsoletes of an item that do not remove anything
    pub obsoletes: HashSet<(ItemId, Capability)>,
    /// Installed items whose installed state is disregarded
    pub installed_items: HashSet<ItemId>,
    /// Architectures whose incompatibility is disregarded
    pub architectures: HashSet<Arch>,
}

impl IgnoreRules {
    pub fn is_empty(&self) -> bool {
        self.conflicts.is_empty()
            && self.requires.is_empty()
            && self.obsoletes.is_empty()
            && self.installed_items.is_empty()
            && self.architectures.is_empty()
    }

    pub fn clear(&mut self) {
        self.conflicts.clear();
        self.requires.clear();
        self.obsoletes.clear();
        self.installed_items.clear();
        self.architectures.clear();
    }
}

/// One candidate world state: the decisions taken on one search path.
///
/// A context never touches the pool. Decisions are recorded here and only
/// copied to the pool once the resolver picked its best solution. Forking a
/// path clones the context, so independent paths never share state.
///
/// Contexts are ranked by a lexicographic key where lower is better:
///
/// 1. obligations skipped because resolving was forced,
/// 2. installed items removed (upgrades excluded),
/// 3. items left incomplete,
/// 4. downgrades.
///
/// Every counter only grows while a path is processed, so the key of an
/// unfinished context is a lower bound of its final key.
#[derive(Debug, Clone)]
pub struct Context {
    decisions: IndexMap<ItemId, Status>,
    /// Available items this path decided never to install
    excluded: HashSet<ItemId>,
    ignore: IgnoreRules,
    system_arch: Arch,
    establishing: bool,
    verifying: bool,
    force_resolve: bool,
    upgrade_mode: bool,
    infos: Vec<ResolverInfo>,
    unresolved: usize,
    removed_installed: usize,
    incomplete: usize,
    downgrades: usize,
}

impl Context {
    pub fn new(system_arch: Arch) -> Self {
        Self {
            decisions: IndexMap::new(),
            excluded: HashSet::new(),
            ignore: IgnoreRules::default(),
            system_arch,
            establishing: false,
            verifying: false,
            force_resolve: false,
            upgrade_mode: false,
            infos: Vec::new(),
            unresolved: 0,
            removed_installed: 0,
            incomplete: 0,
            downgrades: 0,
        }
    }

    // ---------------------------------------------------------------
    // Configuration

    pub fn set_ignore_rules(&mut self, rules: IgnoreRules) {
        self.ignore = rules;
    }

    pub fn ignore_rules(&self) -> &IgnoreRules {
        &self.ignore
    }

    pub fn set_force_resolve(&mut self, force: bool) {
        self.force_resolve = force;
    }

    pub fn force_resolve(&self) -> bool {
        self.force_resolve
    }

    pub fn set_upgrade_mode(&mut self, upgrade: bool) {
        self.upgrade_mode = upgrade;
    }

    pub fn upgrade_mode(&self) -> bool {
        self.upgrade_mode
    }

    pub fn set_verifying(&mut self, verifying: bool) {
        self.verifying = verifying;
    }

    pub fn verifying(&self) -> bool {
        self.verifying
    }

    pub fn set_establishing(&mut self, establishing: bool) {
        self.establishing = establishing;
    }

    pub fn establishing(&self) -> bool {
        self.establishing
    }

    pub fn system_arch(&self) -> &Arch {
        &self.system_arch
    }

    pub fn requires_ignored(&self, item: ItemId, cap: &Capability) -> bool {
        self.ignore.requires.contains(&(item, cap.clone()))
    }

    pub fn conflict_ignored(&self, item: ItemId, cap: &Capability) -> bool {
        self.ignore.conflicts.contains(&(item, cap.clone()))
    }

    pub fn obsoletes_ignored(&self, item: ItemId, cap: &Capability) -> bool {
        self.ignore.obsoletes.contains(&(item, cap.clone()))
    }

    pub fn installed_ignored(&self, item: ItemId) -> bool {
        self.ignore.installed_items.contains(&item)
    }

    /// Whether an item of this architecture may be installed
    pub fn arch_allowed(&self, arch: &Arch) -> bool {
        arch.compatible_with(&self.system_arch) || self.ignore.architectures.contains(arch)
    }

    // ---------------------------------------------------------------
    // Decisions

    /// Record a decision for an item.
    ///
    /// Returns `false` if the decision is impossible: the item is locked,
    /// it already carries a different transaction, an install targets an
    /// installed or excluded item, or a removal targets an item that is not
    /// installed. Established states may be replaced by a transaction.
    pub fn decide(&mut self, pool: &Pool, item: ItemId, status: Status) -> bool {
        match self.decisions.get(&item) {
            Some(&current) if current == status => return true,
            Some(current) if current.is_transact() => return false,
            _ => {}
        }

        let pool_status = pool.status(item);
        if pool_status.is_locked() {
            return false;
        }

        let installed = pool_status.is_installed();
        let allowed = match status {
            Status::ToBeInstalled => !installed && !self.excluded.contains(&item),
            Status::ToBeUninstalled | Status::ToBeUninstalledDueToUpgrade => installed,
            Status::Incomplete | Status::Unneeded | Status::Satisfied => true,
            Status::Undetermined | Status::Locked => false,
        };
        if !allowed {
            return false;
        }

        match status {
            Status::ToBeUninstalled => self.removed_installed += 1,
            // Establish passes only report states, they are not ranked
            Status::Incomplete if !self.establishing => self.incomplete += 1,
            _ => {}
        }

        log::trace!("Decided #{} {}", item, status);
        self.decisions.insert(item, status);
        true
    }

    pub fn install(&mut self, pool: &Pool, item: ItemId) -> bool {
        self.decide(pool, item, Status::ToBeInstalled)
    }

    pub fn uninstall(&mut self, pool: &Pool, item: ItemId, due_to_upgrade: bool) -> bool {
        let status = if due_to_upgrade {
            Status::ToBeUninstalledDueToUpgrade
        } else {
            Status::ToBeUninstalled
        };
        self.decide(pool, item, status)
    }

    pub fn incomplete(&mut self, pool: &Pool, item: ItemId) -> bool {
        self.decide(pool, item, Status::Incomplete)
    }

    pub fn satisfied(&mut self, pool: &Pool, item: ItemId) -> bool {
        self.decide(pool, item, Status::Satisfied)
    }

    pub fn unneeded(&mut self, pool: &Pool, item: ItemId) -> bool {
        self.decide(pool, item, Status::Unneeded)
    }

    /// Rule out installing an available item on this path.
    ///
    /// Returns `false` if the item is already decided for installation.
    pub fn exclude(&mut self, item: ItemId) -> bool {
        if self.is_to_be_installed(item) {
            return false;
        }
        self.excluded.insert(item);
        true
    }

    pub fn is_excluded(&self, item: ItemId) -> bool {
        self.excluded.contains(&item)
    }

    /// The decision for an item, if any
    pub fn decision(&self, item: ItemId) -> Option<Status> {
        self.decisions.get(&item).copied()
    }

    /// The decided status of an item, `Undetermined` without a decision
    pub fn status(&self, item: ItemId) -> Status {
        self.decision(item).unwrap_or_default()
    }

    pub fn is_to_be_installed(&self, item: ItemId) -> bool {
        self.status(item).is_to_be_installed()
    }

    pub fn is_to_be_uninstalled(&self, item: ItemId) -> bool {
        self.status(item).is_to_be_uninstalled()
    }

    /// Whether the item is on the system once this context is applied
    pub fn is_present(&self, pool: &Pool, item: ItemId) -> bool {
        let status = self.status(item);
        if status.is_to_be_installed() {
            return true;
        }
        if status.is_to_be_uninstalled() {
            return false;
        }
        pool.status(item).is_installed()
    }

    /// Whether an installed item is neither locked nor decided yet, so this
    /// path may still remove it.
    pub fn is_removable(&self, pool: &Pool, item: ItemId) -> bool {
        let status = pool.status(item);
        status.is_installed() && !status.is_locked() && !self.status(item).is_transact()
    }

    /// Providers of the capability present on the system once this context
    /// is applied
    pub fn present_providers(&self, pool: &Pool, cap: &Capability) -> Vec<ItemId> {
        pool.what_provides(cap)
            .into_iter()
            .filter(|&id| self.is_present(pool, id))
            .collect()
    }

    /// Iterate the decided items in decision order
    pub fn decided(&self) -> impl Iterator<Item = (ItemId, Status)> + '_ {
        self.decisions.iter().map(|(&id, &status)| (id, status))
    }

    /// Call `callback` for every decided item with the origin the decision
    /// is committed with: `HighPriorityApplication` when `high_priority` is
    /// set, `Solver` otherwise.
    pub fn for_each_decided<F>(&self, mut callback: F, high_priority: bool)
    where
        F: FnMut(ItemId, Status, Origin),
    {
        let origin = if high_priority {
            Origin::HighPriorityApplication
        } else {
            Origin::Solver
        };
        for (id, status) in self.decided() {
            callback(id, status, origin);
        }
    }

    pub fn install_count(&self) -> usize {
        self.decided().filter(|(_, s)| s.is_to_be_installed()).count()
    }

    pub fn uninstall_count(&self) -> usize {
        self.decided().filter(|(_, s)| s.is_to_be_uninstalled()).count()
    }

    // ---------------------------------------------------------------
    // Diagnostics and ranking

    pub fn add_info(&mut self, info: ResolverInfo) {
        log::debug!("{}", info);
        self.infos.push(info);
    }

    /// Record an obligation skipped because resolving is forced
    pub fn add_unresolved(&mut self, affected: Option<ItemId>, cap: Option<Capability>) {
        self.unresolved += 1;
        let mut info = ResolverInfo::new(InfoKind::UnresolvedForced, affected);
        info.capability = cap;
        self.add_info(info);
    }

    pub fn count_downgrade(&mut self) {
        self.downgrades += 1;
    }

    pub fn infos(&self) -> &[ResolverInfo] {
        &self.infos
    }

    pub fn has_errors(&self) -> bool {
        self.infos.iter().any(|i| i.error)
    }

    /// A context is valid when no error was recorded on it
    pub fn is_valid(&self) -> bool {
        !self.has_errors()
    }

    pub fn unresolved_count(&self) -> usize {
        self.unresolved
    }

    pub fn removed_count(&self) -> usize {
        self.removed_installed
    }

    pub fn incomplete_count(&self) -> usize {
        self.incomplete
    }

    pub fn downgrade_count(&self) -> usize {
        self.downgrades
    }

    fn rank_key(&self) -> (usize, usize, usize, usize) {
        (self.unresolved, self.removed_installed, self.incomplete, self.downgrades)
    }

    /// Compare two complete solutions.
    ///
    /// Returns `Ordering::Less` if `self` is the better solution. Equal keys
    /// compare `Equal`; the resolver keeps the solution found first.
    pub fn compare(&self, other: &Context) -> Ordering {
        self.rank_key().cmp(&other.rank_key())
    }

    /// Compare an unfinished context against a complete solution.
    ///
    /// Anything but `Ordering::Less` means `self` can no longer end up
    /// better than `other`, as its counters can only grow.
    pub fn partial_compare(&self, other: &Context) -> Ordering {
        self.rank_key().cmp(&other.rank_key())
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Context(install {}, remove {}, unresolved {}, removed {}, incomplete {}, downgrades {})",
            self.install_count(),
            self.uninstall_count(),
            self.unresolved,
            self.removed_installed,
            self.incomplete,
            self.downgrades
        )
    }
}
