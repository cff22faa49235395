//! Resolver configuration
//!
//! Configuration is assembled from several sources and merged in priority
//! order (highest to lowest):
//!
//! 1. Environment variables (`ZOLV_*`)
//! 2. A JSON configuration file
//! 3. Built-in defaults
//!
//! # Example
//!
//! ```rust,no_run
//! use zolv_solver::config::ResolverConfig;
//! use std::path::Path;
//!
//! let config = ResolverConfig::build(Some(Path::new("/etc/zolv/solver.json")), true).unwrap();
//! println!("Timeout: {}s", config.timeout_seconds);
//! ```

mod config;
mod source;

pub use config::ResolverConfig;
pub use source::{ConfigLoader, ConfigSource, RawConfig};
