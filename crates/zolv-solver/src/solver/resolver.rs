use std::cmp::Ordering;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

use super::context::{Context, IgnoreRules};
use super::helper::{find_installed_by_name_and_kind, find_reinstall_item, find_uninstalled_by_name_and_kind};
use super::policy::Policy;
use super::pool::{ItemId, Pool};
use super::request::Request;
use super::search_path::SearchPath;
use crate::config::ResolverConfig;
use crate::item::{Arch, Capability, Dep, Kind, Origin, Status, ESTABLISH_ORDER};

/// Result of the last resolve run.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// The search was exhausted without a valid solution
    NoSolution,
    /// The search was aborted; carries the best solution found so far
    TimedOut(Option<Context>),
    /// The best solution
    Solved(Context),
}

impl Outcome {
    pub fn is_solved(&self) -> bool {
        matches!(self, Outcome::Solved(_))
    }

    pub fn context(&self) -> Option<&Context> {
        match self {
            Outcome::NoSolution => None,
            Outcome::TimedOut(context) => context.as_ref(),
            Outcome::Solved(context) => Some(context),
        }
    }
}

/// The dependency resolver.
///
/// Holds the request lists and search configuration across runs, and the
/// search frontier of the last run in five buckets:
///
/// - pending: paths still to be stepped,
/// - complete: paths without obligations left, i.e. solutions,
/// - pruned: paths that can no longer beat the best solution,
/// - deferred: alternatives parked until no solution is found otherwise,
/// - invalid: paths that ran into a contradiction.
///
/// Nothing is written to the pool until a run finished and its best
/// solution was selected.
#[derive(Debug)]
pub struct Resolver {
    request: Request,
    ignore: IgnoreRules,
    policy: Policy,
    architecture: Arch,
    timeout: Duration,
    force_resolve: bool,
    upgrade_mode: bool,
    verifying: bool,

    pending: VecDeque<SearchPath>,
    complete: Vec<SearchPath>,
    pruned: Vec<SearchPath>,
    deferred: VecDeque<SearchPath>,
    invalid: Vec<SearchPath>,

    best_context: Option<Context>,
    valid_solution_count: usize,
    steps_taken: usize,
    timed_out: bool,
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new()
    }
}

impl Resolver {
    /// Create a resolver for the host architecture without timeout
    pub fn new() -> Self {
        Self {
            request: Request::new(),
            ignore: IgnoreRules::default(),
            policy: Policy::new(),
            architecture: Arch::new(std::env::consts::ARCH),
            timeout: Duration::ZERO,
            force_resolve: false,
            upgrade_mode: false,
            verifying: false,
            pending: VecDeque::new(),
            complete: Vec::new(),
            pruned: Vec::new(),
            deferred: VecDeque::new(),
            invalid: Vec::new(),
            best_context: None,
            valid_solution_count: 0,
            steps_taken: 0,
            timed_out: false,
        }
    }

    /// Create a resolver from a configuration
    pub fn with_config(config: &ResolverConfig) -> Self {
        let mut resolver = Self::new();
        resolver.apply_config(config);
        resolver
    }

    /// Apply timeout, modes, architecture and ignored architectures
    pub fn apply_config(&mut self, config: &ResolverConfig) {
        self.set_timeout(config.timeout_seconds);
        self.force_resolve = config.force_resolve;
        self.upgrade_mode = config.upgrade_mode;
        self.architecture = config.arch();
        for arch in config.ignored_archs() {
            self.ignore.architectures.insert(arch);
        }
    }

    // ---------------------------------------------------------------
    // Configuration

    /// Set the search timeout in seconds, 0 means unlimited
    pub fn set_timeout(&mut self, seconds: u64) {
        self.timeout = Duration::from_secs(seconds);
    }

    /// Set the search timeout, `Duration::ZERO` means unlimited
    pub fn set_timeout_duration(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
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

    pub fn set_architecture(&mut self, arch: Arch) {
        self.architecture = arch;
    }

    pub fn architecture(&self) -> &Arch {
        &self.architecture
    }

    pub fn set_policy(&mut self, policy: Policy) {
        self.policy = policy;
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    // ---------------------------------------------------------------
    // Requests

    /// Request an install. Cancels a pending removal of the same item.
    pub fn request_install(&mut self, item: ItemId) {
        self.request.install(item);
    }

    pub fn request_install_all(&mut self, items: &[ItemId]) {
        for &item in items {
            self.request_install(item);
        }
    }

    /// Request a removal. Cancels a pending install of the same item.
    pub fn request_remove(&mut self, item: ItemId) {
        self.request.remove(item);
    }

    pub fn request_remove_all(&mut self, items: &[ItemId]) {
        for &item in items {
            self.request_remove(item);
        }
    }

    pub fn request_verify(&mut self, item: ItemId) {
        self.request.verify(item);
    }

    pub fn request_establish(&mut self, item: ItemId) {
        self.request.establish(item);
    }

    pub fn request_establish_all(&mut self, items: &[ItemId]) {
        for &item in items {
            self.request_establish(item);
        }
    }

    pub fn add_extra_capability(&mut self, cap: Capability) {
        self.request.extra_capability(cap);
    }

    pub fn add_extra_conflict(&mut self, cap: Capability) {
        self.request.extra_conflict(cap);
    }

    pub fn request(&self) -> &Request {
        &self.request
    }

    pub fn items_to_install(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.request.install.iter().copied()
    }

    pub fn items_to_remove(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.request.remove.iter().copied()
    }

    pub fn items_to_verify(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.request.verify.iter().copied()
    }

    pub fn items_to_establish(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.request.establish.iter().copied()
    }

    // ---------------------------------------------------------------
    // Ignore rules

    /// Do not enforce the conflict `cap` of `item`
    pub fn add_ignore_conflict(&mut self, item: ItemId, cap: Capability) {
        self.ignore.conflicts.insert((item, cap));
    }

    /// Do not enforce the requirement `cap` of `item`
    pub fn add_ignore_requires(&mut self, item: ItemId, cap: Capability) {
        self.ignore.requires.insert((item, cap));
    }

    /// Do not remove what `item` obsoletes through `cap`
    pub fn add_ignore_obsoletes(&mut self, item: ItemId, cap: Capability) {
        self.ignore.obsoletes.insert((item, cap));
    }

    /// Disregard the installed item in conflict and requirement checks
    pub fn add_ignore_installed_item(&mut self, item: ItemId) {
        self.ignore.installed_items.insert(item);
    }

    /// Allow items of an incompatible architecture
    pub fn add_ignore_architecture(&mut self, arch: Arch) {
        self.ignore.architectures.insert(arch);
    }

    pub fn ignore_rules(&self) -> &IgnoreRules {
        &self.ignore
    }

    // ---------------------------------------------------------------
    // Results

    /// The best solution of the last run
    pub fn best_context(&self) -> Option<&Context> {
        self.best_context.as_ref()
    }

    /// The best solution, or the context of the first invalid path for
    /// diagnostics when no solution was found
    pub fn context(&self) -> Option<&Context> {
        self.best_context
            .as_ref()
            .or_else(|| self.invalid.first().map(|path| path.context()))
    }

    pub fn outcome(&self) -> Outcome {
        if self.timed_out {
            return Outcome::TimedOut(self.best_context.clone());
        }
        match &self.best_context {
            Some(context) if context.is_valid() => Outcome::Solved(context.clone()),
            _ => Outcome::NoSolution,
        }
    }

    pub fn timed_out(&self) -> bool {
        self.timed_out
    }

    /// Number of complete solutions found by the last run
    pub fn valid_solution_count(&self) -> usize {
        self.valid_solution_count
    }

    /// Number of obligations processed by the last run
    pub fn steps_taken(&self) -> usize {
        self.steps_taken
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn complete_count(&self) -> usize {
        self.complete.len()
    }

    pub fn pruned_count(&self) -> usize {
        self.pruned.len()
    }

    pub fn deferred_count(&self) -> usize {
        self.deferred.len()
    }

    pub fn invalid_count(&self) -> usize {
        self.invalid.len()
    }

    /// Clear requests and search state. Configuration and ignore rules are
    /// kept.
    pub fn reset(&mut self) {
        self.request.clear();
        self.verifying = false;
        self.clear_search();
        self.best_context = None;
        self.timed_out = false;
    }

    fn clear_search(&mut self) {
        self.pending.clear();
        self.complete.clear();
        self.pruned.clear();
        self.deferred.clear();
        self.invalid.clear();
        self.valid_solution_count = 0;
        self.steps_taken = 0;
    }

    fn log_buckets(&self) {
        log::debug!(
            "Pend {} / Cmpl {} / Prun {} / Defr {} / Invl {}",
            self.pending.len(),
            self.complete.len(),
            self.pruned.len(),
            self.deferred.len(),
            self.invalid.len()
        );
    }

    fn is_known(pool: &Pool, item: ItemId) -> bool {
        if pool.contains(item) {
            return true;
        }
        log::error!("Ignoring request for unknown item #{}", item);
        false
    }

    // ---------------------------------------------------------------
    // Resolving

    /// Run the search for the pending requests.
    ///
    /// Starts from `context` if given (its decisions are kept), otherwise
    /// from an empty context. Returns `true` if a valid solution was found;
    /// [`timed_out`](Self::timed_out) tells an aborted search apart from an
    /// exhausted one.
    pub fn resolve(&mut self, pool: &Pool, context: Option<Context>) -> bool {
        log::info!("Resolving dependencies");

        self.clear_search();
        self.best_context = None;
        self.timed_out = false;

        let mut context = context.unwrap_or_else(|| Context::new(self.architecture.clone()));
        context.set_ignore_rules(self.ignore.clone());
        context.set_force_resolve(self.force_resolve);
        context.set_upgrade_mode(self.upgrade_mode);
        context.set_verifying(self.verifying);

        let mut initial = SearchPath::new(context);
        for &item in &self.request.install {
            if Self::is_known(pool, item) {
                initial.add_install(item);
            }
        }
        for &item in &self.request.remove {
            if Self::is_known(pool, item) {
                initial.add_remove(item, !self.upgrade_mode);
            }
        }
        for &item in &self.request.verify {
            if Self::is_known(pool, item) {
                initial.add_verify(item);
            }
        }
        for &item in &self.request.establish {
            if Self::is_known(pool, item) {
                initial.add_establish(item);
            }
        }
        for cap in &self.request.extra_capabilities {
            initial.add_extra_capability(cap.clone());
        }
        for cap in &self.request.extra_conflicts {
            initial.add_extra_conflict(cap.clone());
        }

        if !pool.status(pool.system_item()).is_locked() {
            log::warn!("System item is not locked");
        }

        log::debug!("Initial search path: {}", initial);

        if initial.is_empty() {
            log::debug!("Empty search path, nothing to resolve");
            self.best_context = Some(initial.into_context());
            return true;
        }

        self.pending.push_front(initial);
        let start = Instant::now();

        while !self.pending.is_empty() {
            self.log_buckets();

            if !self.timeout.is_zero() && start.elapsed() > self.timeout {
                log::warn!("Resolver timed out after {:?}", start.elapsed());
                self.timed_out = true;
                break;
            }

            let Some(mut path) = self.pending.pop_front() else {
                break;
            };
            path.step(pool, &self.policy);
            self.steps_taken += 1;

            if path.is_invalid() {
                log::debug!("Invalid path");
                self.invalid.push(path);
            } else if path.is_empty() {
                log::debug!("Complete path: {}", path.context());
                self.valid_solution_count += 1;

                // On a tie the first solution found wins
                let better = match &self.best_context {
                    None => true,
                    Some(best) => path.context().compare(best) == Ordering::Less,
                };
                if better {
                    self.best_context = Some(path.context().clone());
                }
                self.complete.push(path);
            } else if self
                .best_context
                .as_ref()
                .map(|best| path.context().partial_compare(best) != Ordering::Less)
                .unwrap_or(false)
            {
                log::debug!("Pruned path");
                self.pruned.push(path);
            } else {
                path.fork(&mut self.pending, &mut self.deferred);
            }

            if self.pending.is_empty() && self.complete.is_empty() {
                if let Some(path) = self.deferred.pop_front() {
                    log::debug!("Promoting deferred path");
                    self.pending.push_back(path);
                }
            }
        }

        self.log_buckets();
        log::info!(
            "Dependency resolution finished in {:.3} seconds after {} steps, {} solution(s)",
            start.elapsed().as_secs_f64(),
            self.steps_taken,
            self.valid_solution_count
        );

        self.best_context.as_ref().map(|c| c.is_valid()).unwrap_or(false)
    }

    /// Verify every installed package. Missing requirements mark an item
    /// incomplete instead of failing the search.
    pub fn verify_system(&mut self, pool: &Pool) -> bool {
        log::debug!("Verifying system");

        let installed: Vec<ItemId> = pool
            .by_kind(Kind::Package)
            .filter(|&id| pool.status(id).is_installed())
            .collect();
        for item in installed {
            self.request_verify(item);
        }

        self.verifying = true;
        self.resolve(pool, None)
    }

    /// Establish the state of every patch, pattern and product.
    ///
    /// Runs one resolve pass per kind in [`ESTABLISH_ORDER`], carrying the
    /// context from pass to pass. The final context becomes the best
    /// context whatever the passes returned.
    pub fn establish_state(&mut self, pool: &Pool, context: Option<Context>) {
        log::debug!("Establishing state");

        let mut context = context.unwrap_or_else(|| Context::new(self.architecture.clone()));
        context.set_establishing(true);

        for kind in ESTABLISH_ORDER {
            log::debug!("Establishing state for kind {}", kind);

            let items: Vec<ItemId> = pool.by_kind(kind).collect();
            self.request_establish_all(&items);

            self.resolve(pool, Some(context.clone()));
            if let Some(best) = self.best_context.take() {
                context = best;
            }

            self.reset();
        }

        context.set_establishing(false);
        self.best_context = Some(context);
    }

    /// Establish the state and copy it to the pool as high priority
    /// application decisions.
    pub fn establish_pool(&mut self, pool: &mut Pool) -> bool {
        self.establish_state(pool, None);

        match self.best_context.clone() {
            Some(solution) => {
                Self::solution_to_pool(pool, &solution, true);
                true
            }
            None => {
                log::error!("Establishing the state did not produce a context");
                false
            }
        }
    }

    /// Resolve the transactions currently set in the pool.
    ///
    /// Former solver decisions are cleared and not requested again. User
    /// installs and removals become requests, and an incomplete installed
    /// item requests its reinstall candidate. On success the solution is
    /// copied back to the pool.
    pub fn resolve_pool(&mut self, pool: &mut Pool) -> bool {
        self.reset();

        log::info!("Resolving pool");
        log::debug!("Pool before resolve");
        pool.dump(false);

        let ids: Vec<ItemId> = pool.ids().collect();
        for id in ids {
            let status = pool.status(id).clone();

            if status.is_by_solver() {
                pool.status_mut(id).reset_transact(Origin::Solver);
                continue;
            }

            if status.is_to_be_installed() {
                self.request_install(id);
            }
            if status.is_to_be_uninstalled() {
                self.request_remove(id);
            }
            if status.is_incomplete() && status.is_installed() {
                match find_reinstall_item(pool, id) {
                    Some(reinstall) => {
                        log::info!("Reinstall {} for incomplete {}", pool[reinstall], pool[id]);
                        self.request_install(reinstall);
                    }
                    None => log::warn!("Can't find {} for re-installation", pool[id]),
                }
            }
        }

        let have_solution = self.resolve(pool, None);

        match (&self.best_context, have_solution) {
            (Some(solution), true) => {
                log::info!("Have solution, copying back to pool");
                Self::solution_to_pool(pool, solution, false);
                log::debug!("Pool after resolve");
                pool.dump(false);
            }
            _ => log::info!("No solution found"),
        }
        have_solution
    }

    /// Copy the decisions of a solution to the pool, as solver decisions or
    /// as high priority application decisions.
    fn solution_to_pool(pool: &mut Pool, solution: &Context, high_priority: bool) {
        solution.for_each_decided(
            |id, status, origin| {
                let item_status = pool.status_mut(id);
                let applied = match status {
                    Status::ToBeInstalled => item_status.set_to_be_installed(origin),
                    Status::ToBeUninstalledDueToUpgrade => item_status.set_to_be_uninstalled_due_to_upgrade(origin),
                    Status::ToBeUninstalled => item_status.set_to_be_uninstalled(origin),
                    Status::Incomplete => item_status.set_incomplete(origin),
                    Status::Unneeded => item_status.set_unneeded(origin),
                    Status::Satisfied => item_status.set_satisfied(origin),
                    Status::Undetermined | Status::Locked => true,
                };
                if !applied {
                    log::debug!("Could not set #{} to {}", id, status);
                }
            },
            high_priority,
        );
    }

    /// Clear the solver transactions in the pool and all ignore rules.
    /// Transactions set by the user are kept.
    pub fn undo(&mut self, pool: &mut Pool) {
        let ids: Vec<ItemId> = pool.ids().collect();
        for id in ids {
            if pool.status(id).transacts() {
                pool.status_mut(id).set_transact(false, Origin::Solver);
            }
        }
        self.ignore.clear();
    }

    /// Transact a single item without searching: its recommendations are
    /// transacted softly, its requirements hard, each resolved by name to
    /// the installed and best available item.
    ///
    /// Returns `false` if a requirement has no matching item at all.
    pub fn transact_item(&mut self, pool: &mut Pool, item: Option<ItemId>, install: bool) -> bool {
        let Some(item) = item.filter(|&id| pool.contains(id)) else {
            log::error!("transact_item called without a valid item");
            return false;
        };
        log::debug!("transact_item({}, {})", pool[item], if install { "install" } else { "remove" });

        let recommends: Vec<Capability> = pool[item].dep(Dep::Recommends).cloned().collect();
        let requires: Vec<Capability> = pool[item].dep(Dep::Requires).cloned().collect();

        transact_caps(pool, &recommends, install, true);
        transact_caps(pool, &requires, install, false)
    }
}

/// Transact the items matching each capability by name; returns `false` if
/// a capability matches neither an installed nor an available item.
fn transact_caps(pool: &mut Pool, caps: &[Capability], install: bool, soft: bool) -> bool {
    let mut result = true;

    for cap in caps {
        let installed = find_installed_by_name_and_kind(pool, cap.name(), cap.refers());
        let uninstalled = find_uninstalled_by_name_and_kind(pool, cap.name(), cap.refers());

        // Installing sets the available item to install and keeps the
        // installed one; removing does the reverse.
        for (id, transact) in [(uninstalled, install), (installed, !install)] {
            let Some(id) = id else {
                continue;
            };
            let status = pool.status_mut(id);
            if status.is_locked() {
                continue;
            }
            if soft {
                status.set_soft_transact(transact, Origin::Solver);
            } else {
                status.set_transact(transact, Origin::Solver);
            }
        }

        if installed.is_none() && uninstalled.is_none() {
            result = false;
        }
    }

    result
}
