// Priority classification derived from fetched feed values
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::feed::{FeedValue, RiskLevel};

/// Coarse urgency tier used by the UI. Derived, never set by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorityTier {
    Low,
    Medium,
    High,
    Critical,
}

/// Compute the priority tier for a freshly fetched value.
///
/// `today` is the current local calendar day; it is passed in so the result
/// depends only on the arguments.
pub fn classify(value: &FeedValue, today: NaiveDate) -> PriorityTier {
    match value {
        FeedValue::UrgentItems(items) => severity_tier(items.iter().map(|item| item.risk)),
        FeedValue::Alerts(alerts) => severity_tier(alerts.iter().map(|alert| alert.severity)),
        FeedValue::ScheduledEvents(events) => {
            if events.iter().any(|event| event.starts_at.date() == today) {
                PriorityTier::High
            } else {
                PriorityTier::Medium
            }
        }
        FeedValue::DailyStats(_) | FeedValue::QuickActions(_) | FeedValue::RecentActivity(_) => {
            PriorityTier::Medium
        }
    }
}

fn severity_tier(mut levels: impl Iterator<Item = RiskLevel>) -> PriorityTier {
    if levels.any(|level| level == RiskLevel::Critical) {
        PriorityTier::Critical
    } else {
        PriorityTier::Medium
    }
}
