//! Backtracking dependency resolver.
//!
//! The resolver turns requests (install, remove, verify, establish) into a
//! consistent set of decisions for the items of a [`Pool`]:
//!
//! - [`Obligation`]: one unit of pending work, e.g. install an item or
//!   satisfy one of its requirements
//! - [`Context`]: the decisions of one candidate solution, with diagnostics
//!   and the counters solutions are ranked by
//! - [`SearchPath`]: a context and its remaining obligations; processes one
//!   obligation per step and forks when a requirement has several providers
//! - [`Resolver`]: owns the requests and the search frontier, keeps the
//!   best complete solution and writes it back to the pool

mod context;
mod helper;
mod info;
mod obligation;
mod policy;
mod pool;
mod request;
mod resolver;
mod search_path;

pub use context::{Context, IgnoreRules};
pub use helper::{find_installed_by_name_and_kind, find_reinstall_item, find_uninstalled_by_name_and_kind};
pub use info::{InfoKind, ResolverInfo};
pub use obligation::{Advance, Alternative, Obligation};
pub use policy::Policy;
pub use pool::{ItemId, Pool, SYSTEM_ITEM_NAME};
pub use request::Request;
pub use resolver::{Outcome, Resolver};
pub use search_path::SearchPath;
