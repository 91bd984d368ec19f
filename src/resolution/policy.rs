use serde::{Deserialize, Serialize};

/// Tunable matching policy.
///
/// Deserialized directly from the `[matching]` section of the config file.
/// The thresholds trade precision for recall and the priority region is a
/// dataset-specific heuristic, so neither is hard-coded in the resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchPolicy {
    /// Region code preferred when several entries tie. `None` or an empty
    /// string disables the tie-break.
    pub priority_region: Option<String>,
    /// Keys up to this many characters count as short.
    pub short_key_max_len: usize,
    /// Largest accepted edit distance for short keys.
    pub short_key_max_distance: usize,
    /// Largest accepted edit distance for longer keys.
    pub long_key_max_distance: usize,
}

impl Default for MatchPolicy {
    fn default() -> Self {
        Self {
            priority_region: Some("SP".to_string()),
            short_key_max_len: 8,
            short_key_max_distance: 1,
            long_key_max_distance: 2,
        }
    }
}

impl MatchPolicy {
    /// Largest edit distance accepted for a query key of `key_len` characters.
    pub fn limit_for(&self, key_len: usize) -> usize {
        if key_len <= self.short_key_max_len {
            self.short_key_max_distance
        } else {
            self.long_key_max_distance
        }
    }

    /// The active priority region, if the tie-break is enabled.
    pub fn priority_region(&self) -> Option<&str> {
        self.priority_region
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
    }

    /// Same policy with a different priority region.
    pub fn with_priority_region(mut self, region: Option<&str>) -> Self {
        self.priority_region = region.map(str::to_string);
        self
    }
}
