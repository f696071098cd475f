// Widget instance configuration
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::feed::FeedType;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WidgetSize {
    Small,
    #[default]
    Medium,
    Large,
    Full,
}

/// Grid cell of the widget's top-left corner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WidgetPosition {
    pub x: u32,
    pub y: u32,
}

impl WidgetPosition {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// Placement of a feed on the dashboard. Several instances may share a feed type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetInstanceConfig {
    pub id: String,
    pub feed_type: FeedType,
    #[serde(default)]
    pub size: WidgetSize,
    #[serde(default)]
    pub position: WidgetPosition,
    #[serde(default = "default_visible")]
    pub is_visible: bool,
    /// 0 disables automatic refresh
    #[serde(default)]
    pub refresh_interval_minutes: u32,
    #[serde(default)]
    pub custom_settings: Map<String, Value>,
}

fn default_visible() -> bool {
    true
}

impl WidgetInstanceConfig {
    pub fn new(id: impl Into<String>, feed_type: FeedType) -> Self {
        Self {
            id: id.into(),
            feed_type,
            size: WidgetSize::default(),
            position: WidgetPosition::default(),
            is_visible: true,
            refresh_interval_minutes: 0,
            custom_settings: Map::new(),
        }
    }

    pub fn with_size(mut self, size: WidgetSize) -> Self {
        self.size = size;
        self
    }

    pub fn at(mut self, x: u32, y: u32) -> Self {
        self.position = WidgetPosition::new(x, y);
        self
    }

    pub fn refresh_every(mut self, minutes: u32) -> Self {
        self.refresh_interval_minutes = minutes;
        self
    }

    pub fn refresh_enabled(&self) -> bool {
        self.refresh_interval_minutes > 0
    }

    /// Merge the fields present in `patch` into this config.
    pub fn apply(&mut self, patch: WidgetPatch) {
        if let Some(feed_type) = patch.feed_type {
            self.feed_type = feed_type;
        }
        if let Some(size) = patch.size {
            self.size = size;
        }
        if let Some(position) = patch.position {
            self.position = position;
        }
        if let Some(is_visible) = patch.is_visible {
            self.is_visible = is_visible;
        }
        if let Some(minutes) = patch.refresh_interval_minutes {
            self.refresh_interval_minutes = minutes;
        }
        if let Some(settings) = patch.custom_settings {
            self.custom_settings.extend(settings);
        }
    }
}

/// Partial widget config. Absent fields are left unchanged on merge.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WidgetPatch {
    #[serde(default)]
    pub feed_type: Option<FeedType>,
    #[serde(default)]
    pub size: Option<WidgetSize>,
    #[serde(default)]
    pub position: Option<WidgetPosition>,
    #[serde(default)]
    pub is_visible: Option<bool>,
    #[serde(default)]
    pub refresh_interval_minutes: Option<u32>,
    #[serde(default)]
    pub custom_settings: Option<Map<String, Value>>,
}

/// Widget set installed when no widgets are configured.
pub fn default_widgets() -> Vec<WidgetInstanceConfig> {
    vec![
        WidgetInstanceConfig::new("urgent-items", FeedType::UrgentItems)
            .with_size(WidgetSize::Large)
            .at(0, 0)
            .refresh_every(5),
        WidgetInstanceConfig::new("daily-stats", FeedType::DailyStats)
            .with_size(WidgetSize::Medium)
            .at(2, 0)
            .refresh_every(15),
        WidgetInstanceConfig::new("quick-actions", FeedType::QuickActions)
            .with_size(WidgetSize::Small)
            .at(3, 0),
        WidgetInstanceConfig::new("recent-activity", FeedType::RecentActivity)
            .with_size(WidgetSize::Medium)
            .at(0, 1)
            .refresh_every(10),
        WidgetInstanceConfig::new("alerts", FeedType::Alerts)
            .with_size(WidgetSize::Medium)
            .at(2, 1)
            .refresh_every(2),
        WidgetInstanceConfig::new("scheduled-events", FeedType::ScheduledEvents)
            .with_size(WidgetSize::Large)
            .at(0, 2)
            .refresh_every(30),
        WidgetInstanceConfig::new("daily-stats-summary", FeedType::DailyStats)
            .with_size(WidgetSize::Full)
            .at(0, 3)
            .refresh_every(60),
    ]
}
