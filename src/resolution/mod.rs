/// Name resolution module.
///
/// Resolves free-text municipality names against an index of registry
/// entries: exact lookup on normalized keys, a region-priority tie-break for
/// homonyms, and a bounded Levenshtein fallback when no key matches.
mod index;
mod outcome;
mod policy;
mod resolver;

pub use index::{build_index, Index};
pub use outcome::{MatchMethod, ResolutionOutcome, ResolutionStatus};
pub use policy::MatchPolicy;
pub use resolver::{resolve, NameResolver};
