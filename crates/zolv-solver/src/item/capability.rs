use std::fmt;

use indexmap::IndexSet;
use lazy_static::lazy_static;
use regex::Regex;
use zolv_edition::{Edition, Operator, Range};

use super::item::Kind;
use crate::error::{Result, SolverError};

lazy_static! {
    static ref CAPABILITY_RE: Regex = Regex::new(
        r"^(?:([A-Za-z]+):)?([^\s<>=!~]+)(?:\s*([<>=!~]+)\s*(\S+))?$"
    ).unwrap();
}

/// Type of dependency an item declares
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dep {
    /// Capabilities the item offers
    Provides,
    /// Hard requirement: one provider must be present
    Requires,
    /// No provider may be present together with the item
    Conflicts,
    /// Installed providers are replaced by the item
    Obsoletes,
    /// Soft requirement, fulfilled when possible
    Recommends,
    /// The item only applies if one of these is present (patches)
    Freshens,
    /// The item is selected automatically if one of these is present
    Supplements,
}

impl Dep {
    /// Returns a human-readable description of the dependency type
    pub fn description(&self) -> &'static str {
        match self {
            Dep::Provides => "provides",
            Dep::Requires => "requires",
            Dep::Conflicts => "conflicts with",
            Dep::Obsoletes => "obsoletes",
            Dep::Recommends => "recommends",
            Dep::Freshens => "freshens",
            Dep::Supplements => "supplements",
        }
    }
}

impl fmt::Display for Dep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// A named relation, optionally restricted to a range of editions.
///
/// The capability refers to items of one kind; `pattern:base` is only
/// provided by patterns. Without a kind prefix a capability refers to
/// packages.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Capability {
    refers: Kind,
    name: String,
    range: Option<Range>,
}

impl Capability {
    /// An unversioned package capability
    pub fn new(name: impl Into<String>) -> Self {
        Self::of_kind(Kind::Package, name)
    }

    /// An unversioned capability referring to the given kind
    pub fn of_kind(refers: Kind, name: impl Into<String>) -> Self {
        Self {
            refers,
            name: name.into(),
            range: None,
        }
    }

    /// A versioned package capability
    pub fn versioned(name: impl Into<String>, op: Operator, edition: impl Into<Edition>) -> Self {
        Self::new(name).with_range(Range::new(op, edition.into()))
    }

    pub fn with_range(mut self, range: Range) -> Self {
        self.range = Some(range);
        self
    }

    /// Parse `[kind:]name [op edition]`, e.g. `libfoo >= 1.2` or `pattern:base`.
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        if input.is_empty() {
            return Err(SolverError::InvalidCapability("empty capability".to_string()));
        }

        let caps = CAPABILITY_RE
            .captures(input)
            .ok_or_else(|| SolverError::InvalidCapability(input.to_string()))?;

        let name = &caps[2];
        let (refers, name) = match caps.get(1) {
            Some(prefix) => match Kind::from_str(prefix.as_str()) {
                Some(kind) => (kind, name.to_string()),
                // Unknown prefixes are part of the name
                None => (Kind::Package, format!("{}:{}", prefix.as_str(), name)),
            },
            None => (Kind::Package, name.to_string()),
        };

        let (Some(op), Some(edition)) = (caps.get(3), caps.get(4)) else {
            return Ok(Self::of_kind(refers, name));
        };
        let op = Operator::from_str(op.as_str())
            .map_err(|e| SolverError::InvalidCapability(format!("{}: {}", input, e)))?;
        let edition = Edition::parse(edition.as_str())?;

        Ok(Self::of_kind(refers, name).with_range(Range::new(op, edition)))
    }

    pub fn refers(&self) -> Kind {
        self.refers
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn range(&self) -> Option<&Range> {
        self.range.as_ref()
    }

    /// Check whether a provided capability fulfils this one.
    ///
    /// Kinds and names must be equal; an unversioned side matches any edition.
    pub fn is_matched_by(&self, provided: &Capability) -> bool {
        if self.refers != provided.refers || self.name != provided.name {
            return false;
        }
        match (&self.range, &provided.range) {
            (Some(wanted), Some(offered)) => wanted.intersects(offered),
            _ => true,
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.refers != Kind::Package {
            write!(f, "{}:", self.refers)?;
        }
        write!(f, "{}", self.name)?;
        if let Some(range) = &self.range {
            write!(f, " {}", range)?;
        }
        Ok(())
    }
}

/// A set of unique capabilities; order is irrelevant for matching but kept
/// stable so iteration is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapabilitySet(IndexSet<Capability>);

impl CapabilitySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a capability, returns false if it was already present
    pub fn insert(&mut self, cap: Capability) -> bool {
        self.0.insert(cap)
    }

    pub fn remove(&mut self, cap: &Capability) -> bool {
        self.0.shift_remove(cap)
    }

    pub fn contains(&self, cap: &Capability) -> bool {
        self.0.contains(cap)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Capability> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

impl FromIterator<Capability> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        CapabilitySet(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a CapabilitySet {
    type Item = &'a Capability;
    type IntoIter = indexmap::set::Iter<'a, Capability>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain() {
        let cap = Capability::parse("libfoo").unwrap();
        assert_eq!(cap.name(), "libfoo");
        assert_eq!(cap.refers(), Kind::Package);
        assert!(cap.range().is_none());
    }

    #[test]
    fn test_parse_versioned() {
        let cap = Capability::parse("libfoo >= 1.2-3").unwrap();
        assert_eq!(cap.name(), "libfoo");
        let range = cap.range().unwrap();
        assert_eq!(range.op, Operator::GreaterEqual);
        assert_eq!(range.edition.to_string(), "1.2-3");

        let compact = Capability::parse("libfoo>=1.2-3").unwrap();
        assert_eq!(cap, compact);
    }

    #[test]
    fn test_parse_kind_prefix() {
        let cap = Capability::parse("pattern:base").unwrap();
        assert_eq!(cap.refers(), Kind::Pattern);
        assert_eq!(cap.name(), "base");
        assert_eq!(cap.to_string(), "pattern:base");

        // Unknown prefixes are part of the name
        let cap = Capability::parse("modalias:pci").unwrap();
        assert_eq!(cap.refers(), Kind::Package);
        assert_eq!(cap.name(), "modalias:pci");
    }

    #[test]
    fn test_parse_invalid() {
        assert!(Capability::parse("").is_err());
        assert!(Capability::parse("two words").is_err());
        assert!(Capability::parse(">= 1.0").is_err());
        assert!(Capability::parse("foo ~> 1.0").is_err());
        assert!(Capability::parse("foo >= 1.0 extra").is_err());
    }

    #[test]
    fn test_parse_colon_inside_name() {
        let cap = Capability::parse("modalias(pci:8086)").unwrap();
        assert_eq!(cap.refers(), Kind::Package);
        assert_eq!(cap.name(), "modalias(pci:8086)");

        let cap = Capability::parse("Product:sles = 15").unwrap();
        assert_eq!(cap.refers(), Kind::Product);
        assert_eq!(cap.name(), "sles");
        assert_eq!(cap.range().unwrap().op, Operator::Equal);
    }

    #[test]
    fn test_is_matched_by() {
        let wanted = Capability::parse("libfoo >= 1.0").unwrap();
        assert!(wanted.is_matched_by(&Capability::parse("libfoo = 1.5").unwrap()));
        assert!(!wanted.is_matched_by(&Capability::parse("libfoo = 0.9").unwrap()));
        assert!(wanted.is_matched_by(&Capability::new("libfoo")));
        assert!(!wanted.is_matched_by(&Capability::new("libbar")));
        assert!(!wanted.is_matched_by(&Capability::of_kind(Kind::Patch, "libfoo")));
    }

    #[test]
    fn test_capability_set_unique() {
        let mut set = CapabilitySet::new();
        assert!(set.insert(Capability::new("a")));
        assert!(!set.insert(Capability::new("a")));
        assert!(set.insert(Capability::parse("a >= 1").unwrap()));
        assert_eq!(set.len(), 2);
    }
}
