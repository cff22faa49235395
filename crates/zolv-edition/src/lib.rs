//! Edition handling for the zolv dependency resolver
//!
//! This crate provides edition parsing (`[epoch:]version[-release]`), rpm-style
//! segment comparison and the relational ranges a capability uses to constrain
//! the editions it accepts.

pub mod constraint;
mod comparator;
mod edition;

pub use comparator::compare_segments;
pub use constraint::{InvalidOperatorError, Operator, Range};
pub use edition::{Edition, EditionError};
