// Error types for the feed service
use thiserror::Error;

use super::feed::FeedType;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("Failed to fetch feed {feed_type}: {cause:#}")]
    Fetch {
        feed_type: FeedType,
        cause: anyhow::Error,
    },

    #[error("No provider registered for feed type: {0}")]
    UnknownFeedType(String),

    #[error("Widget config not found: {0}")]
    ConfigNotFound(String),

    #[error("Invalid widget config {id}: {reason}")]
    InvalidWidget { id: String, reason: String },

    #[error("Dashboard service has been shut down")]
    ServiceStopped,
}

impl DashboardError {
    pub fn fetch(feed_type: FeedType, cause: impl Into<anyhow::Error>) -> Self {
        DashboardError::Fetch {
            feed_type,
            cause: cause.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;
