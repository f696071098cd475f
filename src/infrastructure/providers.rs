// Provider wiring from configuration
use crate::application::clock::Clock;
use crate::application::feed_provider::FeedProviderRegistry;
use crate::domain::feed::FeedType;
use crate::infrastructure::config::FeedSettings;
use crate::infrastructure::demo_provider::DemoFeedProvider;
use crate::infrastructure::http_provider::HttpFeedProvider;
use anyhow::Context;
use std::sync::Arc;

/// Register an HTTP provider for each configured source and, when enabled,
/// a demo provider for every remaining feed type.
pub fn build_registry(
    settings: &FeedSettings,
    clock: Arc<dyn Clock>,
) -> anyhow::Result<FeedProviderRegistry> {
    let client = reqwest::Client::new();
    let mut registry = FeedProviderRegistry::new();

    for (name, url) in &settings.sources {
        let feed_type: FeedType = name
            .parse()
            .with_context(|| format!("Invalid feed source '{}'", name))?;
        tracing::info!(feed = %feed_type, %url, "Using HTTP feed source");
        registry.register(
            feed_type,
            Arc::new(HttpFeedProvider::new(
                client.clone(),
                feed_type,
                url.clone(),
                clock.clone(),
            )),
        );
    }

    if settings.demo_fallback {
        for feed_type in FeedType::ALL {
            if !registry.contains(feed_type) {
                registry.register(
                    feed_type,
                    Arc::new(DemoFeedProvider::new(
                        feed_type,
                        settings.latency(),
                        clock.clone(),
                    )),
                );
            }
        }
    }

    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::clock::SystemClock;
    use std::collections::HashMap;

    #[test]
    fn test_demo_fallback_covers_all_feeds() {
        let registry = build_registry(&FeedSettings::default(), Arc::new(SystemClock)).unwrap();
        assert_eq!(registry.feed_types(), FeedType::ALL.to_vec());
    }

    #[test]
    fn test_sources_only() {
        let settings = FeedSettings {
            demo_fallback: false,
            sources: HashMap::from([(
                "alerts".to_string(),
                "http://localhost:9000/alerts".to_string(),
            )]),
            ..Default::default()
        };
        let registry = build_registry(&settings, Arc::new(SystemClock)).unwrap();
        assert_eq!(registry.feed_types(), vec![FeedType::Alerts]);
    }

    #[test]
    fn test_unknown_source_name_rejected() {
        let settings = FeedSettings {
            sources: HashMap::from([("weather".to_string(), "http://x".to_string())]),
            ..Default::default()
        };
        let err = build_registry(&settings, Arc::new(SystemClock)).unwrap_err();
        assert!(err.to_string().contains("weather"));
    }
}
