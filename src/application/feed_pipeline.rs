// Fetch, classify, cache and publish path shared by the facade and the scheduler
use crate::application::cache_store::CacheStore;
use crate::application::clock::Clock;
use crate::application::feed_provider::FeedProviderRegistry;
use crate::application::notification_bus::NotificationBus;
use crate::domain::cache::CacheEntry;
use crate::domain::error::{DashboardError, Result};
use crate::domain::event::{UpdateEvent, UpdateSource};
use crate::domain::feed::{FeedType, FeedValue};
use crate::domain::priority::classify;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

#[derive(Debug, Clone, Default)]
pub struct PipelineOptions {
    /// Serialize fetch+write per feed type, including manual calls
    pub serialize_fetches: bool,
    /// Fail a fetch that takes longer than this
    pub fetch_timeout: Option<Duration>,
}

/// Concurrent refreshes of the same feed are not ordered by start time; the
/// last fetch to complete wins unless `serialize_fetches` is set.
pub struct FeedPipeline {
    providers: FeedProviderRegistry,
    cache: CacheStore,
    bus: NotificationBus,
    clock: Arc<dyn Clock>,
    options: PipelineOptions,
    fetch_locks: HashMap<FeedType, Mutex<()>>,
}

impl FeedPipeline {
    pub fn new(
        providers: FeedProviderRegistry,
        clock: Arc<dyn Clock>,
        options: PipelineOptions,
    ) -> Self {
        let fetch_locks = providers
            .feed_types()
            .into_iter()
            .map(|ft| (ft, Mutex::new(())))
            .collect();

        Self {
            providers,
            cache: CacheStore::new(),
            bus: NotificationBus::new(),
            clock,
            options,
            fetch_locks,
        }
    }

    pub fn providers(&self) -> &FeedProviderRegistry {
        &self.providers
    }

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    pub fn bus(&self) -> &NotificationBus {
        &self.bus
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Fetch a fresh value, cache it and notify subscribers.
    ///
    /// On failure the cache is left untouched and nothing is published.
    pub async fn refresh(&self, feed_type: FeedType, source: UpdateSource) -> Result<Arc<CacheEntry>> {
        if self.cache.is_closed() {
            return Err(DashboardError::ServiceStopped);
        }

        let _serial = match self.fetch_locks.get(&feed_type) {
            Some(lock) if self.options.serialize_fetches => Some(lock.lock().await),
            _ => None,
        };

        let value = self.fetch(feed_type).await?;

        let now = self.clock.now();
        let priority = classify(&value, self.clock.today());
        let Some(entry) = self.cache.write(value, priority, now) else {
            tracing::debug!(feed = %feed_type, "Discarding fetch result after shutdown");
            return Err(DashboardError::ServiceStopped);
        };

        let event = UpdateEvent::new(entry.value.clone(), now, source);
        let delivered = self.bus.publish(&event);
        tracing::debug!(
            feed = %feed_type,
            ?source,
            ?priority,
            delivered,
            "Feed updated"
        );

        Ok(entry)
    }

    async fn fetch(&self, feed_type: FeedType) -> Result<FeedValue> {
        match self.options.fetch_timeout {
            Some(limit) => tokio::time::timeout(limit, self.providers.fetch(feed_type))
                .await
                .map_err(|_| {
                    DashboardError::fetch(feed_type, anyhow::anyhow!("timed out after {:?}", limit))
                })?,
            None => self.providers.fetch(feed_type).await,
        }
    }

    /// Close the cache and drop all listeners
    pub fn shutdown(&self) {
        self.cache.close();
        self.bus.clear();
    }
}
