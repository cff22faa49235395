use std::fmt;

/// Who caused a status change. Ordered by authority: a transaction set by a
/// higher origin cannot be overridden by a lower one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Origin {
    #[default]
    Solver,
    HighPriorityApplication,
    User,
}

impl Origin {
    pub fn as_str(&self) -> &'static str {
        match self {
            Origin::Solver => "solver",
            Origin::HighPriorityApplication => "appl-high",
            Origin::User => "user",
        }
    }
}

/// Status of an item, as decided by a solver context or stored in the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Status {
    #[default]
    Undetermined,
    ToBeInstalled,
    ToBeUninstalled,
    ToBeUninstalledDueToUpgrade,
    /// Installed but not all requirements are met (or needed but not installed)
    Incomplete,
    /// Does not apply to this system
    Unneeded,
    /// All requirements are met
    Satisfied,
    /// Must not be changed
    Locked,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Undetermined => "undetermined",
            Status::ToBeInstalled => "to-be-installed",
            Status::ToBeUninstalled => "to-be-uninstalled",
            Status::ToBeUninstalledDueToUpgrade => "to-be-uninstalled-due-to-upgrade",
            Status::Incomplete => "incomplete",
            Status::Unneeded => "unneeded",
            Status::Satisfied => "satisfied",
            Status::Locked => "locked",
        }
    }

    /// Install and uninstall states are transactions
    pub fn is_transact(&self) -> bool {
        matches!(
            self,
            Status::ToBeInstalled | Status::ToBeUninstalled | Status::ToBeUninstalledDueToUpgrade
        )
    }

    pub fn is_to_be_installed(&self) -> bool {
        *self == Status::ToBeInstalled
    }

    pub fn is_to_be_uninstalled(&self) -> bool {
        matches!(self, Status::ToBeUninstalled | Status::ToBeUninstalledDueToUpgrade)
    }

    /// Incomplete, unneeded and satisfied describe an established state
    pub fn is_established(&self) -> bool {
        matches!(self, Status::Incomplete | Status::Unneeded | Status::Satisfied)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Mutable pool status of an item.
///
/// Every setter returns whether the change was accepted. Locked items reject
/// every change; transactions can only be overridden by an origin of equal
/// or higher authority. Setting the state an item already has succeeds
/// without touching its origin.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ItemStatus {
    installed: bool,
    state: Status,
    origin: Origin,
}

impl ItemStatus {
    pub fn new(installed: bool) -> Self {
        Self {
            installed,
            state: Status::Undetermined,
            origin: Origin::Solver,
        }
    }

    pub fn is_installed(&self) -> bool {
        self.installed
    }

    pub fn state(&self) -> Status {
        self.state
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    pub fn is_locked(&self) -> bool {
        self.state == Status::Locked
    }

    pub fn transacts(&self) -> bool {
        self.state.is_transact()
    }

    /// A transaction set by the solver itself
    pub fn is_by_solver(&self) -> bool {
        self.transacts() && self.origin == Origin::Solver
    }

    pub fn is_by_user(&self) -> bool {
        self.origin == Origin::User
    }

    pub fn is_to_be_installed(&self) -> bool {
        self.state.is_to_be_installed()
    }

    pub fn is_to_be_uninstalled(&self) -> bool {
        self.state.is_to_be_uninstalled()
    }

    pub fn is_to_be_uninstalled_due_to_upgrade(&self) -> bool {
        self.state == Status::ToBeUninstalledDueToUpgrade
    }

    pub fn is_incomplete(&self) -> bool {
        self.state == Status::Incomplete
    }

    pub fn is_unneeded(&self) -> bool {
        self.state == Status::Unneeded
    }

    pub fn is_satisfied(&self) -> bool {
        self.state == Status::Satisfied
    }

    pub fn is_undetermined(&self) -> bool {
        self.state == Status::Undetermined
    }

    fn can_transact(&self, origin: Origin) -> bool {
        !self.is_locked() && (!self.transacts() || origin >= self.origin)
    }

    fn apply(&mut self, state: Status, origin: Origin) -> bool {
        if self.state == state {
            return true;
        }
        if !self.can_transact(origin) {
            return false;
        }
        self.state = state;
        self.origin = origin;
        true
    }

    pub fn set_lock(&mut self, lock: bool, origin: Origin) -> bool {
        if lock {
            if self.is_locked() {
                return true;
            }
            if self.transacts() && origin < self.origin {
                return false;
            }
            self.state = Status::Locked;
            self.origin = origin;
            true
        } else {
            if !self.is_locked() {
                return true;
            }
            if origin < self.origin {
                return false;
            }
            self.state = Status::Undetermined;
            self.origin = origin;
            true
        }
    }

    pub fn set_to_be_installed(&mut self, origin: Origin) -> bool {
        if self.installed && !self.is_to_be_installed() {
            return false;
        }
        self.apply(Status::ToBeInstalled, origin)
    }

    pub fn set_to_be_uninstalled(&mut self, origin: Origin) -> bool {
        if !self.installed {
            return false;
        }
        self.apply(Status::ToBeUninstalled, origin)
    }

    pub fn set_to_be_uninstalled_due_to_upgrade(&mut self, origin: Origin) -> bool {
        if !self.installed {
            return false;
        }
        self.apply(Status::ToBeUninstalledDueToUpgrade, origin)
    }

    /// Clear a pending transaction, keeping the item in its installed state.
    pub fn reset_transact(&mut self, origin: Origin) -> bool {
        if !self.transacts() {
            return !self.is_locked();
        }
        if origin < self.origin {
            return false;
        }
        self.state = Status::Undetermined;
        self.origin = origin;
        true
    }

    /// `true` changes the installed state (install if absent, remove if
    /// present), `false` keeps it.
    pub fn set_transact(&mut self, transact: bool, origin: Origin) -> bool {
        match (transact, self.installed) {
            (true, true) => self.set_to_be_uninstalled(origin),
            (true, false) => self.set_to_be_installed(origin),
            (false, _) => self.reset_transact(origin),
        }
    }

    /// Like [`set_transact`](Self::set_transact), but never overrides an
    /// existing transaction.
    pub fn set_soft_transact(&mut self, transact: bool, origin: Origin) -> bool {
        if self.transacts() || self.is_locked() {
            return false;
        }
        self.set_transact(transact, origin)
    }

    fn set_established(&mut self, state: Status, origin: Origin) -> bool {
        if self.is_locked() || self.transacts() {
            return self.state == state;
        }
        self.state = state;
        self.origin = origin;
        true
    }

    pub fn set_incomplete(&mut self, origin: Origin) -> bool {
        self.set_established(Status::Incomplete, origin)
    }

    pub fn set_unneeded(&mut self, origin: Origin) -> bool {
        self.set_established(Status::Unneeded, origin)
    }

    pub fn set_satisfied(&mut self, origin: Origin) -> bool {
        self.set_established(Status::Satisfied, origin)
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}/{}",
            if self.installed { "I" } else { "U" },
            self.state,
            self.origin.as_str()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_authority() {
        assert!(Origin::User > Origin::HighPriorityApplication);
        assert!(Origin::HighPriorityApplication > Origin::Solver);
    }

    #[test]
    fn test_install_uninstalled() {
        let mut status = ItemStatus::new(false);
        assert!(status.set_to_be_installed(Origin::Solver));
        assert!(status.is_to_be_installed());
        assert!(status.is_by_solver());
        assert!(!status.set_to_be_uninstalled(Origin::User));
    }

    #[test]
    fn test_install_installed_fails() {
        let mut status = ItemStatus::new(true);
        assert!(!status.set_to_be_installed(Origin::User));
        assert!(status.set_to_be_uninstalled(Origin::User));
    }

    #[test]
    fn test_locked_rejects_everything() {
        let mut status = ItemStatus::new(true);
        assert!(status.set_lock(true, Origin::User));
        assert!(!status.set_to_be_uninstalled(Origin::User));
        assert!(!status.set_incomplete(Origin::Solver));
        assert!(!status.set_satisfied(Origin::HighPriorityApplication));
        assert!(!status.reset_transact(Origin::User));
        assert!(status.is_locked());
    }

    #[test]
    fn test_solver_cannot_override_user() {
        let mut status = ItemStatus::new(true);
        assert!(status.set_to_be_uninstalled(Origin::User));
        assert!(!status.reset_transact(Origin::Solver));
        assert!(!status.set_to_be_uninstalled_due_to_upgrade(Origin::Solver));
        assert!(status.is_to_be_uninstalled());
        // Same state again is accepted
        assert!(status.set_to_be_uninstalled(Origin::Solver));
        assert!(status.is_by_user());
    }

    #[test]
    fn test_soft_transact_keeps_existing() {
        let mut status = ItemStatus::new(false);
        assert!(status.set_transact(true, Origin::HighPriorityApplication));
        assert!(!status.set_soft_transact(false, Origin::Solver));
        assert!(status.is_to_be_installed());

        let mut fresh = ItemStatus::new(false);
        assert!(fresh.set_soft_transact(true, Origin::Solver));
        assert!(fresh.is_to_be_installed());
    }

    #[test]
    fn test_established_states() {
        let mut status = ItemStatus::new(true);
        assert!(status.set_satisfied(Origin::Solver));
        assert!(status.is_satisfied());
        assert!(status.set_incomplete(Origin::Solver));
        assert!(status.is_incomplete());
        assert!(!status.transacts());
    }
}
