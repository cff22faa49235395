//! Relational constraints on editions

mod operator;
mod range;

pub use operator::{InvalidOperatorError, Operator};
pub use range::Range;
