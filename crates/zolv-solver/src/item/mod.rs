// Item model for resolvable pool entries
//
// This module provides the types describing what the resolver works on:
// resolvable items (packages, patches, patterns, products), the capabilities
// they provide and depend on, their architectures and their pool status.

mod arch;
mod capability;
mod item;
mod status;

pub use arch::Arch;
pub use capability::{Capability, CapabilitySet, Dep};
pub use item::{Item, Kind, ESTABLISH_ORDER};
pub use status::{ItemStatus, Origin, Status};
