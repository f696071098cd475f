// HTTP/JSON feed provider
use crate::application::clock::Clock;
use crate::application::feed_provider::FeedProvider;
use crate::domain::feed::{FeedType, FeedValue};
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// Fetches a feed from a backend endpoint returning the feed's bare JSON payload.
pub struct HttpFeedProvider {
    client: reqwest::Client,
    feed_type: FeedType,
    url_template: String,
    clock: Arc<dyn Clock>,
}

impl HttpFeedProvider {
    pub fn new(
        client: reqwest::Client,
        feed_type: FeedType,
        url_template: String,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            client,
            feed_type,
            url_template,
            clock,
        }
    }

    /// Expand `${feed}` and `${date}` (today, ISO 8601) in the template
    fn build_url(&self) -> String {
        self.url_template
            .replace("${feed}", self.feed_type.as_str())
            .replace("${date}", &self.clock.today().to_string())
    }
}

#[async_trait]
impl FeedProvider for HttpFeedProvider {
    async fn fetch(&self) -> Result<FeedValue> {
        let url = self.build_url();
        tracing::debug!(feed = %self.feed_type, %url, "Fetching feed");

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .with_context(|| format!("Failed to send request to {}", url))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Feed endpoint returned status {}: {}", status, body);
        }

        let json = response
            .json::<serde_json::Value>()
            .await
            .context("Failed to parse feed response")?;

        FeedValue::from_json(self.feed_type, json)
            .with_context(|| format!("Unexpected payload shape for {}", self.feed_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::clock::ManualClock;
    use axum::{Json, Router, http::StatusCode, routing::get};
    use chrono::{TimeZone, Utc};

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn clock() -> Arc<dyn Clock> {
        Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 3, 14, 8, 0, 0).unwrap()))
    }

    #[test]
    fn test_build_url_expands_placeholders() {
        let provider = HttpFeedProvider::new(
            reqwest::Client::new(),
            FeedType::ScheduledEvents,
            "http://backend.local/api/${feed}?day=${date}&again=${feed}".to_string(),
            clock(),
        );
        assert_eq!(
            provider.build_url(),
            "http://backend.local/api/scheduled_events?day=2024-03-14&again=scheduled_events"
        );
    }

    #[tokio::test]
    async fn test_fetch_decodes_payload() {
        let router = Router::new().route(
            "/feeds/daily_stats/2024-03-14",
            get(|| async {
                Json(serde_json::json!({
                    "revenue": 45000.0,
                    "orders": 312,
                    "new_customers": 27,
                    "conversion_rate": 3.8
                }))
            }),
        );
        let base = serve(router).await;

        let provider = HttpFeedProvider::new(
            reqwest::Client::new(),
            FeedType::DailyStats,
            format!("{}/feeds/${{feed}}/${{date}}", base),
            clock(),
        );

        match provider.fetch().await.unwrap() {
            FeedValue::DailyStats(stats) => assert_eq!(stats.revenue, 45000.0),
            other => panic!("unexpected value: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_error_status_fails() {
        let router = Router::new().route(
            "/alerts",
            get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "maintenance") }),
        );
        let base = serve(router).await;

        let provider = HttpFeedProvider::new(
            reqwest::Client::new(),
            FeedType::Alerts,
            format!("{}/alerts", base),
            clock(),
        );

        let err = provider.fetch().await.unwrap_err();
        assert!(err.to_string().contains("503"));
    }

    #[tokio::test]
    async fn test_wrong_shape_fails() {
        let router = Router::new().route(
            "/alerts",
            get(|| async { Json(serde_json::json!({ "revenue": 1.0 })) }),
        );
        let base = serve(router).await;

        let provider = HttpFeedProvider::new(
            reqwest::Client::new(),
            FeedType::Alerts,
            format!("{}/alerts", base),
            clock(),
        );

        let err = provider.fetch().await.unwrap_err();
        assert!(err.to_string().contains("Unexpected payload shape for alerts"));
    }
}
