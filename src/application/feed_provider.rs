// Provider trait and registry for feed data access
use crate::domain::error::{DashboardError, Result};
use crate::domain::feed::{FeedType, FeedValue};
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

#[async_trait]
pub trait FeedProvider: Send + Sync {
    /// Produce the feed's current value
    async fn fetch(&self) -> anyhow::Result<FeedValue>;
}

/// Adapter turning an async closure into a [`FeedProvider`].
pub struct FnProvider<F>(F);

#[async_trait]
impl<F, Fut> FeedProvider for FnProvider<F>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<FeedValue>> + Send + 'static,
{
    async fn fetch(&self) -> anyhow::Result<FeedValue> {
        (self.0)().await
    }
}

pub fn provider_fn<F, Fut>(f: F) -> Arc<dyn FeedProvider>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<FeedValue>> + Send + 'static,
{
    Arc::new(FnProvider(f))
}

/// Maps each feed type to the provider that fetches it.
#[derive(Clone, Default)]
pub struct FeedProviderRegistry {
    providers: HashMap<FeedType, Arc<dyn FeedProvider>>,
}

impl FeedProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider, returning the one it replaced
    pub fn register(
        &mut self,
        feed_type: FeedType,
        provider: Arc<dyn FeedProvider>,
    ) -> Option<Arc<dyn FeedProvider>> {
        self.providers.insert(feed_type, provider)
    }

    pub fn with(mut self, feed_type: FeedType, provider: Arc<dyn FeedProvider>) -> Self {
        self.register(feed_type, provider);
        self
    }

    pub fn contains(&self, feed_type: FeedType) -> bool {
        self.providers.contains_key(&feed_type)
    }

    /// Registered feed types in declaration order
    pub fn feed_types(&self) -> Vec<FeedType> {
        FeedType::ALL
            .into_iter()
            .filter(|ft| self.providers.contains_key(ft))
            .collect()
    }

    pub async fn fetch(&self, feed_type: FeedType) -> Result<FeedValue> {
        let provider = self
            .providers
            .get(&feed_type)
            .cloned()
            .ok_or_else(|| DashboardError::UnknownFeedType(feed_type.to_string()))?;

        let value = provider
            .fetch()
            .await
            .map_err(|e| DashboardError::fetch(feed_type, e))?;

        if value.feed_type() != feed_type {
            return Err(DashboardError::fetch(
                feed_type,
                anyhow::anyhow!("provider returned a {} payload", value.feed_type()),
            ));
        }

        Ok(value)
    }
}

impl fmt::Debug for FeedProviderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeedProviderRegistry")
            .field("feed_types", &self.feed_types())
            .finish()
    }
}
