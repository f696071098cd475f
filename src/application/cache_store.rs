// In-memory cache of the latest value per feed type
use crate::domain::cache::CacheEntry;
use crate::domain::feed::{FeedType, FeedValue};
use crate::domain::priority::PriorityTier;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

#[derive(Default)]
struct CacheState {
    entries: HashMap<FeedType, Arc<CacheEntry>>,
    closed: bool,
}

/// Entries are replaced wholesale, so a reader sees either the previous entry
/// or the new one. Reads never fetch.
#[derive(Default)]
pub struct CacheStore {
    state: RwLock<CacheState>,
}

impl CacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the entry for the value's feed type.
    ///
    /// Returns `None` once the store is closed; the value is dropped.
    pub fn write(
        &self,
        value: FeedValue,
        priority: PriorityTier,
        at: DateTime<Utc>,
    ) -> Option<Arc<CacheEntry>> {
        let entry = Arc::new(CacheEntry::new(value, priority, at));

        let mut state = self.state.write();
        if state.closed {
            return None;
        }
        state.entries.insert(entry.feed_type, entry.clone());
        Some(entry)
    }

    pub fn read(&self, feed_type: FeedType) -> Option<Arc<CacheEntry>> {
        self.state.read().entries.get(&feed_type).cloned()
    }

    /// Point-in-time copy of every cached entry
    pub fn read_all(&self) -> BTreeMap<FeedType, Arc<CacheEntry>> {
        self.state
            .read()
            .entries
            .iter()
            .map(|(ft, entry)| (*ft, entry.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.state.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every entry and reject later writes
    pub fn close(&self) {
        let mut state = self.state.write();
        state.closed = true;
        state.entries.clear();
    }

    pub fn is_closed(&self) -> bool {
        self.state.read().closed
    }
}
