use indexmap::IndexSet;

use super::pool::ItemId;
use crate::item::{Capability, CapabilitySet};

/// A request specifies what needs to be resolved.
///
/// Install and remove requests cancel each other: requesting the install of
/// an item queued for removal drops the removal instead of queuing both.
#[derive(Debug, Clone, Default)]
pub struct Request {
    /// Items to install
    /// Uses IndexSet to preserve insertion order (seeding order drives the search)
    pub install: IndexSet<ItemId>,

    /// Items to remove
    pub remove: IndexSet<ItemId>,

    /// Installed items to verify
    pub verify: IndexSet<ItemId>,

    /// Items whose state is established
    pub establish: IndexSet<ItemId>,

    /// Capabilities that must be provided
    pub extra_capabilities: CapabilitySet,

    /// Capabilities no present item may provide
    pub extra_conflicts: CapabilitySet,
}

impl Request {
    /// Create a new empty request
    pub fn new() -> Self {
        Self::default()
    }

    /// Request an install, cancelling a pending removal of the same item
    pub fn install(&mut self, item: ItemId) -> &mut Self {
        if self.remove.shift_remove(&item) {
            log::debug!("Install of #{} cancels its removal", item);
        } else {
            self.install.insert(item);
        }
        self
    }

    /// Request a removal, cancelling a pending install of the same item
    pub fn remove(&mut self, item: ItemId) -> &mut Self {
        if self.install.shift_remove(&item) {
            log::debug!("Removal of #{} cancels its install", item);
        } else {
            self.remove.insert(item);
        }
        self
    }

    pub fn verify(&mut self, item: ItemId) -> &mut Self {
        self.verify.insert(item);
        self
    }

    pub fn establish(&mut self, item: ItemId) -> &mut Self {
        self.establish.insert(item);
        self
    }

    pub fn extra_capability(&mut self, cap: Capability) -> &mut Self {
        self.extra_capabilities.insert(cap);
        self
    }

    pub fn extra_conflict(&mut self, cap: Capability) -> &mut Self {
        self.extra_conflicts.insert(cap);
        self
    }

    /// Whether nothing is requested
    pub fn is_empty(&self) -> bool {
        self.install.is_empty()
            && self.remove.is_empty()
            && self.verify.is_empty()
            && self.establish.is_empty()
            && self.extra_capabilities.is_empty()
            && self.extra_conflicts.is_empty()
    }

    /// Drop every request
    pub fn clear(&mut self) {
        self.install.clear();
        self.remove.clear();
        self.verify.clear();
        self.establish.clear();
        self.extra_capabilities.clear();
        self.extra_conflicts.clear();
    }
}
