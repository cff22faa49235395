pub mod config;
pub mod error;
pub mod item;
pub mod solver;

pub use config::{ConfigSource, ResolverConfig};
pub use error::{Result, SolverError};
pub use item::{Arch, Capability, CapabilitySet, Dep, Item, ItemStatus, Kind, Origin, Status};
pub use solver::{Context, ItemId, Outcome, Pool, Resolver};
