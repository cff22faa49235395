use std::fmt;

use super::pool::{ItemId, Pool};
use crate::item::Capability;

/// Kind of a diagnostic record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InfoKind {
    /// The affected item is replaced by the others
    Obsoletes,
    /// The affected item conflicts with the others
    ConflictsWith,
    /// Nothing provides a requirement of the affected item
    MissingProvider,
    /// The affected item is locked and cannot be changed
    Locked,
    /// The affected item cannot be installed on the system architecture
    IncompatibleArch,
    /// The affected item was decided both ways
    Contradiction,
    /// An unfulfilled obligation was skipped because resolving is forced
    UnresolvedForced,
    /// No candidate exists to reinstall an incomplete item
    ReinstallMissing,
    /// A recommended capability could not be installed
    RecommendedUnavailable,
    /// The affected item is installed but its requirements are not met
    Incomplete,
    /// The affected item is installed because the others need it
    NeededBy,
}

impl InfoKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InfoKind::Obsoletes => "obsoletes",
            InfoKind::ConflictsWith => "conflicts-with",
            InfoKind::MissingProvider => "missing-provider",
            InfoKind::Locked => "locked",
            InfoKind::IncompatibleArch => "incompatible-arch",
            InfoKind::Contradiction => "contradiction",
            InfoKind::UnresolvedForced => "unresolved-forced",
            InfoKind::ReinstallMissing => "reinstall-missing",
            InfoKind::RecommendedUnavailable => "recommended-unavailable",
            InfoKind::Incomplete => "incomplete",
            InfoKind::NeededBy => "needed-by",
        }
    }
}

/// A diagnostic record attached to a resolver context.
///
/// Records are data for a reporting layer; [`describe`](Self::describe)
/// renders the human-readable message against a pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverInfo {
    pub kind: InfoKind,
    pub affected: Option<ItemId>,
    pub others: Vec<ItemId>,
    pub capability: Option<Capability>,
    pub error: bool,
}

impl ResolverInfo {
    pub fn new(kind: InfoKind, affected: Option<ItemId>) -> Self {
        Self {
            kind,
            affected,
            others: Vec::new(),
            capability: None,
            error: false,
        }
    }

    pub fn with_other(mut self, other: ItemId) -> Self {
        self.others.push(other);
        self
    }

    pub fn with_capability(mut self, cap: Capability) -> Self {
        self.capability = Some(cap);
        self
    }

    /// Mark the record as an error
    pub fn as_error(mut self) -> Self {
        self.error = true;
        self
    }

    /// Check whether the record mentions the item
    pub fn mentions(&self, id: ItemId) -> bool {
        self.affected == Some(id) || self.others.contains(&id)
    }

    /// Render the message for this record
    pub fn describe(&self, pool: &Pool) -> String {
        let affected = match self.affected.and_then(|id| pool.get(id)) {
            Some(item) => item.to_string(),
            None => "the request".to_string(),
        };
        let others = self
            .others
            .iter()
            .filter_map(|&id| pool.get(id))
            .map(|item| item.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        let cap = self
            .capability
            .as_ref()
            .map(|c| c.to_string())
            .unwrap_or_default();

        match self.kind {
            InfoKind::Obsoletes => format!("{} is replaced by {}", affected, others),
            InfoKind::ConflictsWith => {
                if cap.is_empty() {
                    format!("{} conflicts with {}", affected, others)
                } else {
                    format!("{} conflicts with {} ({})", affected, others, cap)
                }
            }
            InfoKind::MissingProvider => format!("Nothing provides {} needed by {}", cap, affected),
            InfoKind::Locked => format!("{} is locked and cannot be changed", affected),
            InfoKind::IncompatibleArch => {
                format!("{} has an incompatible architecture", affected)
            }
            InfoKind::Contradiction => format!("{} cannot be both installed and removed", affected),
            InfoKind::UnresolvedForced => {
                if cap.is_empty() {
                    format!("Ignoring unresolved {}", affected)
                } else {
                    format!("Ignoring unresolved {} of {}", cap, affected)
                }
            }
            InfoKind::ReinstallMissing => {
                format!("Cannot find {} for re-installation", affected)
            }
            InfoKind::RecommendedUnavailable => {
                format!("{} recommends {}, which cannot be installed", affected, cap)
            }
            InfoKind::Incomplete => format!("{} is incomplete: {} is missing", affected, cap),
            InfoKind::NeededBy => format!("{} is needed by {}", affected, others),
        }
    }
}

impl fmt::Display for ResolverInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}", self.kind.as_str())?;
        if self.error {
            write!(f, " error")?;
        }
        if let Some(affected) = self.affected {
            write!(f, " #{}", affected)?;
        }
        for other in &self.others {
            write!(f, " +#{}", other)?;
        }
        if let Some(cap) = &self.capability {
            write!(f, " ({})", cap)?;
        }
        write!(f, "]")
    }
}
