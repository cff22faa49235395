//! Edition parsing and comparison

use std::cmp::Ordering;
use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

use crate::comparator::compare_segments;

/// Error type for edition parsing
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditionError {
    #[error("Invalid edition string \"{0}\"")]
    InvalidEdition(String),
    #[error("Invalid epoch \"{0}\"")]
    InvalidEpoch(String),
}

lazy_static! {
    static ref EDITION_RE: Regex = Regex::new(
        r"^(?:(\d+):)?([A-Za-z0-9._+~^]+)(?:-([A-Za-z0-9._+~^]+))?$"
    ).unwrap();
}

/// The edition of an item: `[epoch:]version[-release]`.
///
/// Equality is structural. Ordering is not `Ord` because two structurally
/// different editions (`1.0` and `1.00`) can compare equal; use
/// [`Edition::compare`] for ordering and [`Edition::match_compare`] for
/// constraint matching.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Edition {
    epoch: u32,
    version: String,
    release: Option<String>,
}

impl Edition {
    /// Create an edition from its parts
    pub fn new(epoch: u32, version: impl Into<String>, release: Option<String>) -> Self {
        Self {
            epoch,
            version: version.into(),
            release,
        }
    }

    /// Parse an edition string such as `1.2.3`, `1.2.3-4` or `2:1.2.3-4`.
    pub fn parse(input: &str) -> Result<Self, EditionError> {
        let input = input.trim();
        let caps = EDITION_RE
            .captures(input)
            .ok_or_else(|| EditionError::InvalidEdition(input.to_string()))?;

        let epoch = match caps.get(1) {
            Some(m) => m
                .as_str()
                .parse::<u32>()
                .map_err(|_| EditionError::InvalidEpoch(m.as_str().to_string()))?,
            None => 0,
        };

        Ok(Self {
            epoch,
            version: caps[2].to_string(),
            release: caps.get(3).map(|m| m.as_str().to_string()),
        })
    }

    pub fn epoch(&self) -> u32 {
        self.epoch
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn release(&self) -> Option<&str> {
        self.release.as_deref()
    }

    /// True for the empty edition (no version information at all)
    pub fn is_empty(&self) -> bool {
        self.epoch == 0 && self.version.is_empty() && self.release.is_none()
    }

    /// Total comparison: epoch, then version, then release.
    /// A missing release sorts before any release.
    ///
    /// Returns `Ordering::Greater` if `self` is newer than `other`.
    pub fn compare(&self, other: &Edition) -> Ordering {
        self.epoch
            .cmp(&other.epoch)
            .then_with(|| compare_segments(&self.version, &other.version))
            .then_with(|| match (&self.release, &other.release) {
                (Some(a), Some(b)) => compare_segments(a, b),
                (Some(_), None) => Ordering::Greater,
                (None, Some(_)) => Ordering::Less,
                (None, None) => Ordering::Equal,
            })
    }

    /// Comparison used when matching against a constraint edition.
    ///
    /// If `constraint` carries no release, the release of `self` is ignored,
    /// so `1.0-3` matches `= 1.0`.
    pub fn match_compare(&self, constraint: &Edition) -> Ordering {
        let base = self
            .epoch
            .cmp(&constraint.epoch)
            .then_with(|| compare_segments(&self.version, &constraint.version));

        match (&self.release, &constraint.release) {
            (_, None) => base,
            (Some(a), Some(b)) => base.then_with(|| compare_segments(a, b)),
            (None, Some(_)) => base.then(Ordering::Less),
        }
    }
}

impl From<&str> for Edition {
    /// Lenient conversion: strings that do not parse become a bare version.
    fn from(s: &str) -> Self {
        Edition::parse(s).unwrap_or_else(|_| Edition::new(0, s.trim(), None))
    }
}

impl fmt::Display for Edition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.epoch > 0 {
            write!(f, "{}:", self.epoch)?;
        }
        write!(f, "{}", self.version)?;
        if let Some(release) = &self.release {
            write!(f, "-{}", release)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full() {
        let ed = Edition::parse("2:1.4.0-7.1").unwrap();
        assert_eq!(ed.epoch(), 2);
        assert_eq!(ed.version(), "1.4.0");
        assert_eq!(ed.release(), Some("7.1"));
        assert_eq!(ed.to_string(), "2:1.4.0-7.1");
    }

    #[test]
    fn test_parse_version_only() {
        let ed = Edition::parse("3.1").unwrap();
        assert_eq!(ed.epoch(), 0);
        assert_eq!(ed.release(), None);
        assert_eq!(ed.to_string(), "3.1");
    }

    #[test]
    fn test_parse_invalid() {
        assert!(Edition::parse("1.0-2-3").is_err());
        assert!(Edition::parse("").is_err());
        assert!(Edition::parse("a b").is_err());
    }

    #[test]
    fn test_lenient_from() {
        let ed = Edition::from("weird version");
        assert_eq!(ed.version(), "weird version");
    }

    #[test]
    fn test_compare_epoch_wins() {
        let a = Edition::from("1:1.0");
        let b = Edition::from("9.9");
        assert_eq!(a.compare(&b), Ordering::Greater);
    }

    #[test]
    fn test_compare_release() {
        assert_eq!(Edition::from("1.0-2").compare(&Edition::from("1.0-10")), Ordering::Less);
        assert_eq!(Edition::from("1.0-1").compare(&Edition::from("1.0")), Ordering::Greater);
    }

    #[test]
    fn test_match_compare_ignores_missing_release() {
        let candidate = Edition::from("1.0-3");
        assert_eq!(candidate.match_compare(&Edition::from("1.0")), Ordering::Equal);
        assert_eq!(candidate.match_compare(&Edition::from("1.0-4")), Ordering::Less);
    }
}
