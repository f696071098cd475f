// Feed data domain models
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::DashboardError;

/// Category of dashboard data with its own fetch logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedType {
    UrgentItems,
    DailyStats,
    QuickActions,
    RecentActivity,
    Alerts,
    ScheduledEvents,
}

impl FeedType {
    pub const ALL: [FeedType; 6] = [
        FeedType::UrgentItems,
        FeedType::DailyStats,
        FeedType::QuickActions,
        FeedType::RecentActivity,
        FeedType::Alerts,
        FeedType::ScheduledEvents,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FeedType::UrgentItems => "urgent_items",
            FeedType::DailyStats => "daily_stats",
            FeedType::QuickActions => "quick_actions",
            FeedType::RecentActivity => "recent_activity",
            FeedType::Alerts => "alerts",
            FeedType::ScheduledEvents => "scheduled_events",
        }
    }
}

impl fmt::Display for FeedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeedType {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FeedType::ALL
            .into_iter()
            .find(|ft| ft.as_str() == s)
            .ok_or_else(|| DashboardError::UnknownFeedType(s.to_string()))
    }
}

/// Severity attached to urgent items and alerts. `Critical` is the topmost class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrgentItem {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub risk: RiskLevel,
    #[serde(default)]
    pub due: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyStats {
    pub revenue: f64,
    pub orders: u32,
    pub new_customers: u32,
    pub conversion_rate: f64,
    #[serde(default)]
    pub active_users: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuickAction {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub icon: Option<String>,
    pub route: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub id: String,
    pub actor: String,
    pub action: String,
    #[serde(default)]
    pub target: Option<String>,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub message: String,
    pub severity: RiskLevel,
    pub raised_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledEvent {
    pub id: String,
    pub title: String,
    /// Local wall-clock start
    pub starts_at: NaiveDateTime,
    #[serde(default)]
    pub location: Option<String>,
}

/// Payload produced by fetching a feed. One variant per [`FeedType`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum FeedValue {
    UrgentItems(Vec<UrgentItem>),
    DailyStats(DailyStats),
    QuickActions(Vec<QuickAction>),
    RecentActivity(Vec<ActivityEntry>),
    Alerts(Vec<Alert>),
    ScheduledEvents(Vec<ScheduledEvent>),
}

impl FeedValue {
    pub fn feed_type(&self) -> FeedType {
        match self {
            FeedValue::UrgentItems(_) => FeedType::UrgentItems,
            FeedValue::DailyStats(_) => FeedType::DailyStats,
            FeedValue::QuickActions(_) => FeedType::QuickActions,
            FeedValue::RecentActivity(_) => FeedType::RecentActivity,
            FeedValue::Alerts(_) => FeedType::Alerts,
            FeedValue::ScheduledEvents(_) => FeedType::ScheduledEvents,
        }
    }

    /// Type-appropriate empty value, served when a feed has never loaded.
    pub fn empty(feed_type: FeedType) -> Self {
        match feed_type {
            FeedType::UrgentItems => FeedValue::UrgentItems(Vec::new()),
            FeedType::DailyStats => FeedValue::DailyStats(DailyStats::default()),
            FeedType::QuickActions => FeedValue::QuickActions(Vec::new()),
            FeedType::RecentActivity => FeedValue::RecentActivity(Vec::new()),
            FeedType::Alerts => FeedValue::Alerts(Vec::new()),
            FeedType::ScheduledEvents => FeedValue::ScheduledEvents(Vec::new()),
        }
    }

    /// Decode a bare JSON payload (no type tag) as the given feed's shape.
    pub fn from_json(feed_type: FeedType, json: serde_json::Value) -> serde_json::Result<Self> {
        Ok(match feed_type {
            FeedType::UrgentItems => FeedValue::UrgentItems(serde_json::from_value(json)?),
            FeedType::DailyStats => FeedValue::DailyStats(serde_json::from_value(json)?),
            FeedType::QuickActions => FeedValue::QuickActions(serde_json::from_value(json)?),
            FeedType::RecentActivity => FeedValue::RecentActivity(serde_json::from_value(json)?),
            FeedType::Alerts => FeedValue::Alerts(serde_json::from_value(json)?),
            FeedType::ScheduledEvents => FeedValue::ScheduledEvents(serde_json::from_value(json)?),
        })
    }
}
