//! Completed-narrative store.

use super::key::RequestFingerprint;
use crate::types::Narrative;
use std::collections::HashMap;

/// Write-once map of completed narratives.
///
/// Entries live as long as the store: no TTL and no eviction. The usage pattern is a
/// bounded set of applicant profiles, so growth is bounded by the inputs seen.
#[derive(Debug, Default)]
pub(crate) struct CompletedStore {
    entries: HashMap<RequestFingerprint, Narrative>,
}

impl CompletedStore {
    pub(crate) fn get(&self, key: &RequestFingerprint) -> Option<&Narrative> {
        self.entries.get(key)
    }

    /// Insert unless an entry already exists. Returns whether the value was stored.
    pub(crate) fn insert_once(&mut self, key: RequestFingerprint, narrative: Narrative) -> bool {
        match self.entries.entry(key) {
            std::collections::hash_map::Entry::Occupied(_) => false,
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(narrative);
                true
            }
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
