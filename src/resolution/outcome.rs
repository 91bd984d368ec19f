use serde::Serialize;

use crate::types::RegistryEntry;

/// Coarse status of a resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ResolutionStatus {
    Resolved,
    Ambiguous,
    Unresolved,
}

impl ResolutionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Resolved => "resolved",
            Self::Ambiguous => "ambiguous",
            Self::Unresolved => "unresolved",
        }
    }
}

/// How a resolved entry was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MatchMethod {
    /// The only entry with the query's key.
    Exact,
    /// One of several candidates, picked by the priority region.
    TieBreak,
    /// Nearest key by edit distance, within the policy limit.
    Fuzzy { distance: usize },
}

impl MatchMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::TieBreak => "tie-break",
            Self::Fuzzy { .. } => "fuzzy",
        }
    }
}

/// Result of resolving one query against an index.
///
/// Created fresh per query. Entries are borrowed from the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ResolutionOutcome<'a> {
    Resolved {
        entry: &'a RegistryEntry,
        method: MatchMethod,
    },
    /// Several exact-key candidates and no tie-break winner. The
    /// representative is the first candidate in registry order and is only
    /// meant for reporting.
    Ambiguous {
        representative: &'a RegistryEntry,
        candidates: usize,
    },
    Unresolved,
}

impl<'a> ResolutionOutcome<'a> {
    pub fn status(&self) -> ResolutionStatus {
        match self {
            Self::Resolved { .. } => ResolutionStatus::Resolved,
            Self::Ambiguous { .. } => ResolutionStatus::Ambiguous,
            Self::Unresolved => ResolutionStatus::Unresolved,
        }
    }

    /// The chosen entry for `Resolved`, the representative for `Ambiguous`.
    pub fn entry(&self) -> Option<&'a RegistryEntry> {
        match *self {
            Self::Resolved { entry, .. } => Some(entry),
            Self::Ambiguous { representative, .. } => Some(representative),
            Self::Unresolved => None,
        }
    }

    pub fn method(&self) -> Option<MatchMethod> {
        match *self {
            Self::Resolved { method, .. } => Some(method),
            _ => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved { .. })
    }
}
