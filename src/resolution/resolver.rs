use tracing::{debug, trace};

use crate::normalize::normalize;
use crate::types::RegistryEntry;

use super::{Index, MatchMethod, MatchPolicy, ResolutionOutcome};

/// Resolves municipality names against a prebuilt [`Index`].
///
/// Holds no state besides a borrowed index and its policy, so one resolver
/// can be shared across threads and every call is independent.
pub struct NameResolver<'a> {
    index: &'a Index,
    policy: MatchPolicy,
}

impl<'a> NameResolver<'a> {
    pub fn new(index: &'a Index, policy: MatchPolicy) -> Self {
        Self { index, policy }
    }

    pub fn policy(&self) -> &MatchPolicy {
        &self.policy
    }

    /// Resolves a single query string.
    ///
    /// Resolution strategies are tried in order:
    /// 1. **Exact key** -- a single entry with the query's normalized key is
    ///    resolved; several entries go through the priority-region
    ///    tie-break, and are `Ambiguous` when it finds no winner.
    /// 2. **Fuzzy** -- only when no entry has the exact key. Every entry is
    ///    scanned for the minimum Levenshtein distance; a unique nearest
    ///    entry within [`MatchPolicy::limit_for`] is resolved, ties go
    ///    through the tie-break and are otherwise `Unresolved`.
    pub fn resolve_one(&self, query: &str) -> ResolutionOutcome<'a> {
        let key = normalize(query);

        if self.index.contains_key(&key) {
            return self.resolve_exact(&key);
        }

        self.resolve_fuzzy(&key)
    }

    /// Resolves a batch of queries, preserving order.
    pub fn resolve_all<S: AsRef<str>>(&self, queries: &[S]) -> Vec<ResolutionOutcome<'a>> {
        queries
            .iter()
            .map(|q| self.resolve_one(q.as_ref()))
            .collect()
    }

    // ------------------------------------------------------------------
    // Private helpers
    // ------------------------------------------------------------------

    fn resolve_exact(&self, key: &str) -> ResolutionOutcome<'a> {
        let index: &'a Index = self.index;
        let candidates = index.get(key);

        match candidates.as_slice() {
            [] => ResolutionOutcome::Unresolved,
            [only] => ResolutionOutcome::Resolved {
                entry: *only,
                method: MatchMethod::Exact,
            },
            [first, ..] => match self.tie_break(&candidates) {
                Some(entry) => ResolutionOutcome::Resolved {
                    entry,
                    method: MatchMethod::TieBreak,
                },
                None => {
                    trace!(key, candidates = candidates.len(), "ambiguous exact key");
                    ResolutionOutcome::Ambiguous {
                        representative: *first,
                        candidates: candidates.len(),
                    }
                }
            },
        }
    }

    fn resolve_fuzzy(&self, key: &str) -> ResolutionOutcome<'a> {
        // Every key is within len(key) of the empty string, so an empty
        // query would match whatever is shortest.
        if key.is_empty() {
            return ResolutionOutcome::Unresolved;
        }

        let index: &'a Index = self.index;
        let mut best_distance = usize::MAX;
        let mut candidates: Vec<&'a RegistryEntry> = Vec::new();

        for entry in index.entries() {
            let d = strsim::levenshtein(key, &entry.key);
            if d < best_distance {
                best_distance = d;
                candidates.clear();
                candidates.push(entry);
            } else if d == best_distance {
                candidates.push(entry);
            }
        }

        let limit = self.policy.limit_for(key.chars().count());
        debug!(
            key,
            best_distance,
            candidates = candidates.len(),
            limit,
            "fuzzy fallback"
        );

        if candidates.is_empty() || best_distance > limit {
            return ResolutionOutcome::Unresolved;
        }

        let method = MatchMethod::Fuzzy {
            distance: best_distance,
        };

        if let [only] = candidates.as_slice() {
            return ResolutionOutcome::Resolved {
                entry: *only,
                method,
            };
        }

        // No exact-key group backs these candidates, so an unbroken tie is
        // reported as unresolved rather than ambiguous.
        match self.tie_break(&candidates) {
            Some(entry) => ResolutionOutcome::Resolved { entry, method },
            None => ResolutionOutcome::Unresolved,
        }
    }

    /// Picks the first candidate, in registry order, whose region is the
    /// priority region.
    fn tie_break(&self, candidates: &[&'a RegistryEntry]) -> Option<&'a RegistryEntry> {
        let region = self.policy.priority_region()?;
        candidates
            .iter()
            .copied()
            .find(|entry| entry.region_code == region)
    }
}

/// Resolves `query` against `index` with a one-off resolver.
pub fn resolve<'a>(query: &str, index: &'a Index, policy: &MatchPolicy) -> ResolutionOutcome<'a> {
    NameResolver::new(index, policy.clone()).resolve_one(query)
}
