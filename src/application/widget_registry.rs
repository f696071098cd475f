// Widget instance registry
use crate::domain::error::{DashboardError, Result};
use crate::domain::feed::FeedType;
use crate::domain::widget::{WidgetInstanceConfig, WidgetPatch, default_widgets};
use parking_lot::RwLock;
use std::collections::HashMap;

/// Owns every widget instance config, keyed by id.
#[derive(Default)]
pub struct WidgetRegistry {
    widgets: RwLock<HashMap<String, WidgetInstanceConfig>>,
}

impl WidgetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults() -> Self {
        let widgets = default_widgets()
            .into_iter()
            .map(|widget| (widget.id.clone(), widget))
            .collect();
        Self {
            widgets: RwLock::new(widgets),
        }
    }

    pub fn from_configs(configs: Vec<WidgetInstanceConfig>) -> Result<Self> {
        let mut widgets = HashMap::with_capacity(configs.len());
        for config in configs {
            validate_id(&config.id)?;
            if widgets.contains_key(&config.id) {
                return Err(DashboardError::InvalidWidget {
                    id: config.id,
                    reason: "duplicate widget id".to_string(),
                });
            }
            widgets.insert(config.id.clone(), config);
        }

        Ok(Self {
            widgets: RwLock::new(widgets),
        })
    }

    pub fn get(&self, id: &str) -> Result<WidgetInstanceConfig> {
        self.widgets
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| DashboardError::ConfigNotFound(id.to_string()))
    }

    /// All widgets in layout order (row, then column, then id)
    pub fn get_all(&self) -> Vec<WidgetInstanceConfig> {
        let mut widgets: Vec<_> = self.widgets.read().values().cloned().collect();
        widgets.sort_by(|a, b| {
            (a.position.y, a.position.x, &a.id).cmp(&(b.position.y, b.position.x, &b.id))
        });
        widgets
    }

    /// Merge `patch` into an existing widget, or insert a new one.
    ///
    /// A new widget needs at least a feed type.
    pub fn upsert(&self, id: &str, patch: WidgetPatch) -> Result<WidgetInstanceConfig> {
        validate_id(id)?;

        let mut widgets = self.widgets.write();
        if let Some(existing) = widgets.get_mut(id) {
            existing.apply(patch);
            return Ok(existing.clone());
        }

        let feed_type = patch.feed_type.ok_or_else(|| DashboardError::InvalidWidget {
            id: id.to_string(),
            reason: "feed_type is required for a new widget".to_string(),
        })?;
        let mut config = WidgetInstanceConfig::new(id, feed_type);
        config.apply(patch);
        widgets.insert(id.to_string(), config.clone());
        Ok(config)
    }

    pub fn remove(&self, id: &str) -> Result<WidgetInstanceConfig> {
        self.widgets
            .write()
            .remove(id)
            .ok_or_else(|| DashboardError::ConfigNotFound(id.to_string()))
    }

    /// Number of widgets bound to `feed_type`
    pub fn references(&self, feed_type: FeedType) -> usize {
        self.widgets
            .read()
            .values()
            .filter(|w| w.feed_type == feed_type)
            .count()
    }

    pub fn len(&self) -> usize {
        self.widgets.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn validate_id(id: &str) -> Result<()> {
    if id.trim().is_empty() {
        return Err(DashboardError::InvalidWidget {
            id: id.to_string(),
            reason: "widget id must not be empty".to_string(),
        });
    }
    Ok(())
}
