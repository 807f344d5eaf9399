//! Baseline store
//!
//! Read-only lookup from document identifier to its accepted static score.
//! Built once from configuration; a missing entry means "no baseline", never 0.

use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BaselineStore {
    entries: BTreeMap<String, f64>,
}

impl BaselineStore {
    pub fn new(entries: BTreeMap<String, f64>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Expected score for `document`.
    ///
    /// An exact key wins. Otherwise a key matches when the identifier ends
    /// with `/<key>`, so `"main.mdc"` covers `".cursor/rules/main.mdc"`; the
    /// longest such key is used.
    pub fn lookup(&self, document: &str) -> Option<f64> {
        if let Some(score) = self.entries.get(document) {
            return Some(*score);
        }
        self.entries
            .iter()
            .filter(|(key, _)| {
                document.len() > key.len()
                    && document.ends_with(key.as_str())
                    && document.as_bytes()[document.len() - key.len() - 1] == b'/'
            })
            .max_by_key(|(key, _)| key.len())
            .map(|(_, score)| *score)
    }
}
