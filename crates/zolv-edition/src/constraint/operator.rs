//! Relational operators for edition constraints

use std::cmp::Ordering;
use std::fmt;
use thiserror::Error;

/// Comparison operators for edition constraints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// Equal (=)
    Equal,
    /// Not equal (!=)
    NotEqual,
    /// Less than (<)
    Less,
    /// Less than or equal (<=)
    LessEqual,
    /// Greater than (>)
    Greater,
    /// Greater than or equal (>=)
    GreaterEqual,
}

#[derive(Error, Debug)]
#[error("Invalid operator: {0}")]
pub struct InvalidOperatorError(pub String);

impl Operator {
    /// Parse operator from string
    pub fn from_str(s: &str) -> Result<Self, InvalidOperatorError> {
        match s {
            "=" | "==" => Ok(Operator::Equal),
            "!=" | "<>" => Ok(Operator::NotEqual),
            "<" => Ok(Operator::Less),
            "<=" => Ok(Operator::LessEqual),
            ">" => Ok(Operator::Greater),
            ">=" => Ok(Operator::GreaterEqual),
            _ => Err(InvalidOperatorError(s.to_string())),
        }
    }

    /// Get the string representation of the operator
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Equal => "=",
            Operator::NotEqual => "!=",
            Operator::Less => "<",
            Operator::LessEqual => "<=",
            Operator::Greater => ">",
            Operator::GreaterEqual => ">=",
        }
    }

    /// Whether an observed ordering (candidate compared to bound) satisfies
    /// this operator.
    pub fn accepts(&self, ordering: Ordering) -> bool {
        match self {
            Operator::Equal => ordering == Ordering::Equal,
            Operator::NotEqual => ordering != Ordering::Equal,
            Operator::Less => ordering == Ordering::Less,
            Operator::LessEqual => ordering != Ordering::Greater,
            Operator::Greater => ordering == Ordering::Greater,
            Operator::GreaterEqual => ordering != Ordering::Less,
        }
    }

    pub(crate) fn is_lower_bound(&self) -> bool {
        matches!(self, Operator::Greater | Operator::GreaterEqual)
    }

    pub(crate) fn is_upper_bound(&self) -> bool {
        matches!(self, Operator::Less | Operator::LessEqual)
    }

    pub(crate) fn is_inclusive(&self) -> bool {
        matches!(self, Operator::Equal | Operator::LessEqual | Operator::GreaterEqual)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
