//! Edition ranges

use std::cmp::Ordering;
use std::fmt;

use super::operator::Operator;
use crate::edition::Edition;

/// A single relational constraint such as `>= 1.2-3`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Range {
    pub op: Operator,
    pub edition: Edition,
}

impl Range {
    pub fn new(op: Operator, edition: Edition) -> Self {
        Self { op, edition }
    }

    /// Shorthand for an `= edition` range
    pub fn exact(edition: Edition) -> Self {
        Self::new(Operator::Equal, edition)
    }

    /// Check whether a concrete edition satisfies this range
    pub fn matches(&self, candidate: &Edition) -> bool {
        self.op.accepts(candidate.match_compare(&self.edition))
    }

    /// Check whether two ranges share at least one edition.
    ///
    /// Used when a versioned provide is checked against a versioned
    /// requirement: `foo = 1.2` provides `foo >= 1.0`, `foo < 1.0` does not
    /// intersect `foo >= 2.0`.
    pub fn intersects(&self, other: &Range) -> bool {
        if self.op == Operator::Equal {
            return other.matches(&self.edition);
        }
        if other.op == Operator::Equal {
            return self.matches(&other.edition);
        }
        if self.op == Operator::NotEqual || other.op == Operator::NotEqual {
            return true;
        }
        if (self.op.is_lower_bound() && other.op.is_lower_bound())
            || (self.op.is_upper_bound() && other.op.is_upper_bound())
        {
            return true;
        }

        let (lower, upper) = if self.op.is_lower_bound() {
            (self, other)
        } else {
            (other, self)
        };

        match lower.edition.compare(&upper.edition) {
            Ordering::Less => true,
            Ordering::Equal => lower.op.is_inclusive() && upper.op.is_inclusive(),
            Ordering::Greater => false,
        }
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.op, self.edition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(op: &str, ed: &str) -> Range {
        Range::new(Operator::from_str(op).unwrap(), Edition::from(ed))
    }

    #[test]
    fn test_matches() {
        assert!(range(">=", "1.0").matches(&Edition::from("1.0-5")));
        assert!(range("<", "2.0").matches(&Edition::from("1.9")));
        assert!(!range("<", "2.0").matches(&Edition::from("2.0")));
        assert!(range("=", "1.0-5").matches(&Edition::from("1.0-5")));
        assert!(!range("=", "1.0-5").matches(&Edition::from("1.0-6")));
    }

    #[test]
    fn test_intersects_equal() {
        assert!(range("=", "1.2").intersects(&range(">=", "1.0")));
        assert!(!range("=", "0.9").intersects(&range(">=", "1.0")));
        assert!(range(">=", "1.0").intersects(&range("=", "1.2")));
    }

    #[test]
    fn test_intersects_open_ranges() {
        assert!(range(">", "1.0").intersects(&range(">=", "5.0")));
        assert!(range("<", "1.0").intersects(&range("<=", "5.0")));
        assert!(range(">=", "1.0").intersects(&range("<", "2.0")));
        assert!(!range(">=", "2.0").intersects(&range("<", "1.0")));
        assert!(range(">=", "1.0").intersects(&range("<=", "1.0")));
        assert!(!range(">", "1.0").intersects(&range("<=", "1.0")));
    }
}
