use std::collections::HashMap;
use std::fmt;

use zolv_edition::{Edition, Range};

use super::arch::Arch;
use super::capability::{Capability, CapabilitySet, Dep};

/// Kind of a resolvable item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Kind {
    Package,
    Patch,
    Pattern,
    Product,
    /// Sub-unit of a patch
    Atom,
    /// The synthetic item carrying platform capabilities
    System,
}

/// Kinds whose state is established, in order. Later kinds may depend on the
/// selections made for earlier ones.
pub const ESTABLISH_ORDER: [Kind; 4] = [Kind::Atom, Kind::Patch, Kind::Pattern, Kind::Product];

impl Kind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Package => "package",
            Kind::Patch => "patch",
            Kind::Pattern => "pattern",
            Kind::Product => "product",
            Kind::Atom => "atom",
            Kind::System => "system",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "package" => Some(Kind::Package),
            "patch" => Some(Kind::Patch),
            "pattern" => Some(Kind::Pattern),
            "product" => Some(Kind::Product),
            "atom" => Some(Kind::Atom),
            "system" => Some(Kind::System),
            _ => None,
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A resolvable item: one edition of a package, patch, pattern or product
/// built for one architecture, together with its dependencies.
#[derive(Debug, Clone)]
pub struct Item {
    pub kind: Kind,
    pub name: String,
    pub edition: Edition,
    pub arch: Arch,
    deps: HashMap<Dep, CapabilitySet>,
}

impl Item {
    /// Create a new noarch item without dependencies
    pub fn new(kind: Kind, name: impl Into<String>, edition: impl Into<Edition>) -> Self {
        Self {
            kind,
            name: name.into(),
            edition: edition.into(),
            arch: Arch::noarch(),
            deps: HashMap::new(),
        }
    }

    /// Create a new package
    pub fn package(name: impl Into<String>, edition: impl Into<Edition>) -> Self {
        Self::new(Kind::Package, name, edition)
    }

    pub fn with_arch(mut self, arch: &str) -> Self {
        self.arch = Arch::new(arch);
        self
    }

    /// Add a dependency of the given type
    pub fn with_dep(mut self, dep: Dep, cap: Capability) -> Self {
        self.add_dep(dep, cap);
        self
    }

    pub fn add_dep(&mut self, dep: Dep, cap: Capability) {
        self.deps.entry(dep).or_default().insert(cap);
    }

    /// Replace all capabilities of one dependency type
    pub fn set_dep(&mut self, dep: Dep, caps: CapabilitySet) {
        self.deps.insert(dep, caps);
    }

    /// Iterate the capabilities of one dependency type
    pub fn dep(&self, dep: Dep) -> impl Iterator<Item = &Capability> {
        self.deps.get(&dep).into_iter().flat_map(|set| set.iter())
    }

    pub fn has_dep(&self, dep: Dep) -> bool {
        self.deps.get(&dep).map(|set| !set.is_empty()).unwrap_or(false)
    }

    /// The capability every item provides implicitly: `kind:name = edition`
    pub fn self_capability(&self) -> Capability {
        Capability::of_kind(self.kind, self.name.clone()).with_range(Range::exact(self.edition.clone()))
    }

    /// Check whether this item provides the capability, either implicitly
    /// by name or through an explicit provides entry.
    pub fn provides(&self, cap: &Capability) -> bool {
        cap.is_matched_by(&self.self_capability())
            || self.dep(Dep::Provides).any(|provided| cap.is_matched_by(provided))
    }

    /// Check whether this item and `other` are the same item in another
    /// edition or architecture.
    pub fn same_name_and_kind(&self, other: &Item) -> bool {
        self.kind == other.kind && self.name == other.name
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.kind != Kind::Package {
            write!(f, "{}:", self.kind)?;
        }
        write!(f, "{}-{}.{}", self.name, self.edition, self.arch)
    }
}
