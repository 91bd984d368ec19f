use std::collections::HashMap;

use crate::types::RegistryEntry;

/// Registry entries grouped by normalized key.
///
/// Built once per registry load and read-only afterwards. Each key maps to
/// the positions of its entries in registry order, so several entries per key
/// are expected (homonyms across states).
#[derive(Debug, Clone, Default)]
pub struct Index {
    entries: Vec<RegistryEntry>,
    by_key: HashMap<String, Vec<usize>>,
}

impl Index {
    /// Groups `entries` by their `key`, preserving input order within each
    /// group. Nothing is dropped or validated here.
    pub fn build(entries: Vec<RegistryEntry>) -> Self {
        let mut by_key: HashMap<String, Vec<usize>> = HashMap::new();
        for (pos, entry) in entries.iter().enumerate() {
            by_key.entry(entry.key.clone()).or_default().push(pos);
        }
        Self { entries, by_key }
    }

    /// Returns the entries sharing `key`, in registry order.
    ///
    /// The result is empty when the key is unknown.
    pub fn get(&self, key: &str) -> Vec<&RegistryEntry> {
        self.by_key
            .get(key)
            .map(|positions| positions.iter().map(|&p| &self.entries[p]).collect())
            .unwrap_or_default()
    }

    /// Returns `true` if at least one entry has exactly this key.
    pub fn contains_key(&self, key: &str) -> bool {
        self.by_key.contains_key(key)
    }

    /// All entries in registry order.
    pub fn entries(&self) -> &[RegistryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of distinct keys.
    pub fn key_count(&self) -> usize {
        self.by_key.len()
    }
}

/// Builds an [`Index`] from registry entries.
pub fn build_index(entries: Vec<RegistryEntry>) -> Index {
    Index::build(entries)
}
