// Cached feed entry
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::feed::{FeedType, FeedValue};
use super::priority::PriorityTier;

/// Most recent successful fetch of a feed, with the priority computed from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub feed_type: FeedType,
    pub value: FeedValue,
    pub last_updated: DateTime<Utc>,
    pub priority: PriorityTier,
}

impl CacheEntry {
    pub fn new(value: FeedValue, priority: PriorityTier, last_updated: DateTime<Utc>) -> Self {
        Self {
            feed_type: value.feed_type(),
            value,
            last_updated,
            priority,
        }
    }
}
