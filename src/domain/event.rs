// Update events delivered to subscribers
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::feed::{FeedType, FeedValue};

/// What caused a cache write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateSource {
    UserAction,
    ScheduledRefresh,
    DataChange,
    SystemEvent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateEvent {
    pub feed_type: FeedType,
    pub value: FeedValue,
    pub timestamp: DateTime<Utc>,
    pub source: UpdateSource,
}

impl UpdateEvent {
    pub fn new(value: FeedValue, timestamp: DateTime<Utc>, source: UpdateSource) -> Self {
        Self {
            feed_type: value.feed_type(),
            value,
            timestamp,
            source,
        }
    }
}
