use std::collections::VecDeque;
use std::fmt;

use super::context::Context;
use super::obligation::{Advance, Alternative, Obligation};
use super::policy::Policy;
use super::pool::{ItemId, Pool};
use crate::item::Capability;

/// One branch of the search: a context and the obligations still to process.
///
/// The path owns its context exclusively. [`step`](Self::step) processes
/// one obligation; when that obligation has several outcomes the path keeps
/// the alternatives until the resolver calls [`fork`](Self::fork).
#[derive(Debug, Clone)]
pub struct SearchPath {
    context: Context,
    obligations: Vec<Obligation>,
    branches: Vec<Alternative>,
    invalid: bool,
}

impl SearchPath {
    pub fn new(context: Context) -> Self {
        Self {
            context,
            obligations: Vec::new(),
            branches: Vec::new(),
            invalid: false,
        }
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn into_context(self) -> Context {
        self.context
    }

    // ---------------------------------------------------------------
    // Seeding

    pub fn add_obligation(&mut self, obligation: Obligation) {
        self.obligations.push(obligation);
    }

    pub fn add_install(&mut self, item: ItemId) {
        self.add_obligation(Obligation::Install { item, soft: false });
    }

    pub fn add_remove(&mut self, item: ItemId, remove_only: bool) {
        self.add_obligation(Obligation::Remove {
            item,
            remove_only,
            due_to_upgrade: false,
        });
    }

    pub fn add_verify(&mut self, item: ItemId) {
        self.add_obligation(Obligation::Verify { item });
    }

    pub fn add_establish(&mut self, item: ItemId) {
        self.add_obligation(Obligation::Establish { item });
    }

    pub fn add_extra_capability(&mut self, cap: Capability) {
        self.add_obligation(Obligation::ExtraCapability { cap });
    }

    pub fn add_extra_conflict(&mut self, cap: Capability) {
        self.add_obligation(Obligation::ExtraConflict { cap });
    }

    // ---------------------------------------------------------------
    // Processing

    pub fn obligations(&self) -> &[Obligation] {
        &self.obligations
    }

    /// No obligations and no pending alternatives remain: a complete candidate
    pub fn is_empty(&self) -> bool {
        self.obligations.is_empty() && self.branches.is_empty()
    }

    /// A contradiction was found; the path must be discarded
    pub fn is_invalid(&self) -> bool {
        self.invalid
    }

    /// The last step produced alternatives waiting for a fork
    pub fn has_branches(&self) -> bool {
        !self.branches.is_empty()
    }

    /// Process the obligation with the lowest priority, the earliest queued
    /// one on ties.
    pub fn step(&mut self, pool: &Pool, policy: &Policy) {
        if self.invalid || self.has_branches() {
            return;
        }

        let Some(index) = self
            .obligations
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| Obligation::compare_by_priority(a, b))
            .map(|(i, _)| i)
        else {
            return;
        };

        let obligation = self.obligations.remove(index);
        log::trace!("Processing {}", obligation);

        match obligation.advance(pool, policy, &mut self.context, &mut self.obligations) {
            Advance::Done => {}
            Advance::Fork(alternatives) => {
                log::trace!("Branching into {} alternatives", alternatives.len());
                self.branches = alternatives;
            }
            Advance::Unsatisfiable => {
                self.invalid = true;
            }
        }
    }

    /// Split the path into one copy per pending alternative.
    ///
    /// Each copy commits its alternative. The first copy goes to the front
    /// of `pending`, followed by the fallback copies (skipping a
    /// recommendation) so they are ranked against it. The remaining copies
    /// go to the back of `deferred`. A path without alternatives is put back
    /// to the front of `pending` unchanged.
    pub fn fork(self, pending: &mut VecDeque<SearchPath>, deferred: &mut VecDeque<SearchPath>) {
        if self.branches.is_empty() {
            pending.push_front(self);
            return;
        }

        let SearchPath {
            context,
            obligations,
            branches,
            ..
        } = self;

        let mut searched = Vec::new();
        for (i, alternative) in branches.into_iter().enumerate() {
            let to_pending = i == 0 || alternative.is_fallback();
            let mut path = SearchPath {
                context: context.clone(),
                obligations: obligations.clone(),
                branches: Vec::new(),
                invalid: false,
            };
            path.commit(alternative);

            if to_pending {
                searched.push(path);
            } else {
                deferred.push_back(path);
            }
        }

        for path in searched.into_iter().rev() {
            pending.push_front(path);
        }
    }

    fn commit(&mut self, alternative: Alternative) {
        match alternative {
            Alternative::Install { item, exclude } => {
                self.exclude_all(exclude);
                self.obligations.push(Obligation::Install { item, soft: false });
            }
            Alternative::TryInstall { item } => {
                self.obligations.push(Obligation::Install { item, soft: true });
            }
            Alternative::Skip { exclude } => self.exclude_all(exclude),
        }
    }

    fn exclude_all(&mut self, items: Vec<ItemId>) {
        for id in items {
            if !self.context.exclude(id) {
                self.invalid = true;
            }
        }
    }
}

impl fmt::Display for SearchPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, obligation) in self.obligations.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", obligation)?;
        }
        write!(f, "]")?;
        if self.invalid {
            write!(f, " invalid")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{Arch, Dep, Item};

    fn path() -> SearchPath {
        SearchPath::new(Context::new(Arch::new("x86_64")))
    }

    #[test]
    fn test_empty_path() {
        let path = path();
        assert!(path.is_empty());
        assert!(!path.is_invalid());
    }

    #[test]
    fn test_step_processes_by_priority() {
        let mut pool = Pool::new();
        let old = pool.add_installed(Item::package("old", "1.0"));
        let new = pool.add(Item::package("new", "1.0"));

        let mut path = path();
        path.add_install(new);
        path.add_remove(old, true);

        path.step(&pool, &Policy::new());
        assert!(path.context().is_to_be_uninstalled(old));
        assert!(!path.context().is_to_be_installed(new));

        path.step(&pool, &Policy::new());
        assert!(path.context().is_to_be_installed(new));
        assert!(path.is_empty());
    }

    #[test]
    fn test_step_marks_invalid() {
        let mut pool = Pool::new();
        let app = pool.add(Item::package("app", "1.0").with_dep(Dep::Requires, Capability::new("missing")));

        let mut path = path();
        path.add_install(app);
        path.step(&pool, &Policy::new());
        path.step(&pool, &Policy::new());

        assert!(path.is_invalid());
        assert!(path.context().has_errors());
    }

    #[test]
    fn test_fork_alternatives_are_exclusive() {
        let mut pool = Pool::new();
        let p1 = pool.add(Item::package("p1", "1.0").with_dep(Dep::Provides, Capability::new("libfoo")));
        let p2 = pool.add(Item::package("p2", "1.0").with_dep(Dep::Provides, Capability::new("libfoo")));

        let mut path = path();
        path.add_extra_capability(Capability::new("libfoo"));
        path.step(&pool, &Policy::new());
        assert!(path.has_branches());
        assert!(!path.is_empty());

        let mut pending = VecDeque::new();
        let mut deferred = VecDeque::new();
        path.fork(&mut pending, &mut deferred);
        assert_eq!(pending.len(), 1);
        assert_eq!(deferred.len(), 1);

        let mut first = pending.pop_front().unwrap();
        let mut second = deferred.pop_front().unwrap();
        first.step(&pool, &Policy::new());
        second.step(&pool, &Policy::new());

        assert!(first.context().is_to_be_installed(p1));
        assert!(!first.context().is_excluded(p2));
        assert!(second.context().is_to_be_installed(p2));
        assert!(second.context().is_excluded(p1));
    }

    #[test]
    fn test_fork_without_branches_requeues() {
        let mut pool = Pool::new();
        let a = pool.add(Item::package("a", "1.0"));
        let b = pool.add(Item::package("b", "1.0"));

        let mut path = path();
        path.add_install(a);
        path.add_install(b);
        path.step(&pool, &Policy::new());

        let mut pending = VecDeque::new();
        let mut deferred = VecDeque::new();
        path.fork(&mut pending, &mut deferred);
        assert_eq!(pending.len(), 1);
        assert!(deferred.is_empty());
        assert_eq!(pending[0].obligations().len(), 1);
    }

    #[test]
    fn test_fork_soft_keeps_skip_pending() {
        let mut pool = Pool::new();
        let docs = pool.add(Item::package("docs", "1.0"));

        let mut path = path();
        path.add_obligation(Obligation::Require {
            origin: None,
            cap: Capability::new("docs"),
            soft: true,
            allow_install: true,
        });
        path.step(&pool, &Policy::new());
        assert!(path.has_branches());

        let mut pending = VecDeque::new();
        let mut deferred = VecDeque::new();
        path.fork(&mut pending, &mut deferred);
        assert_eq!(pending.len(), 2);
        assert!(deferred.is_empty());

        let mut install = pending.pop_front().unwrap();
        install.step(&pool, &Policy::new());
        assert!(install.context().is_to_be_installed(docs));

        let skip = pending.pop_front().unwrap();
        assert!(skip.is_empty());
        assert!(skip.context().is_excluded(docs));
    }
}
