// Dashboard service - Facade over feeds, cache, subscriptions, and widgets
use crate::application::clock::Clock;
use crate::application::feed_pipeline::{FeedPipeline, PipelineOptions};
use crate::application::feed_provider::FeedProviderRegistry;
use crate::application::notification_bus::SubscriptionId;
use crate::application::scheduler::{RefreshScheduler, SchedulerState};
use crate::application::widget_registry::WidgetRegistry;
use crate::domain::cache::CacheEntry;
use crate::domain::error::{DashboardError, Result};
use crate::domain::event::{UpdateEvent, UpdateSource};
use crate::domain::feed::{FeedType, FeedValue};
use crate::domain::priority::classify;
use crate::domain::widget::{WidgetInstanceConfig, WidgetPatch};
use futures::future::join_all;
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Outcome of one feed in [`DashboardService::get_all`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FeedStatus {
    Fresh,
    /// Fetch failed; the previously cached entry is served
    Stale { error: String },
    /// Fetch failed and nothing was cached; an empty default is served
    Unavailable { error: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedSnapshot {
    pub entry: Arc<CacheEntry>,
    #[serde(flatten)]
    pub status: FeedStatus,
}

impl FeedSnapshot {
    pub fn is_fresh(&self) -> bool {
        self.status == FeedStatus::Fresh
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Created,
    Running,
    Stopped,
}

struct ServiceInner {
    pipeline: Arc<FeedPipeline>,
    widgets: WidgetRegistry,
    scheduler: RefreshScheduler,
    lifecycle: Mutex<Lifecycle>,
}

/// Entry point for presentation code. Cheap to clone.
#[derive(Clone)]
pub struct DashboardService {
    inner: Arc<ServiceInner>,
}

impl DashboardService {
    pub fn new(
        providers: FeedProviderRegistry,
        widgets: WidgetRegistry,
        clock: Arc<dyn Clock>,
        options: PipelineOptions,
    ) -> Self {
        let pipeline = Arc::new(FeedPipeline::new(providers, clock, options));
        let scheduler = RefreshScheduler::new(pipeline.clone());

        Self {
            inner: Arc::new(ServiceInner {
                pipeline,
                widgets,
                scheduler,
                lifecycle: Mutex::new(Lifecycle::Created),
            }),
        }
    }

    /// Arm refresh timers for every widget with a non-zero interval.
    ///
    /// Fails if a widget references a feed with no provider. Calling it again
    /// while running does nothing. Must be called from within a tokio runtime.
    pub fn init(&self) -> Result<()> {
        let mut lifecycle = self.inner.lifecycle.lock();
        match *lifecycle {
            Lifecycle::Running => {
                tracing::debug!("Dashboard service already initialized");
                return Ok(());
            }
            Lifecycle::Stopped => return Err(DashboardError::ServiceStopped),
            Lifecycle::Created => {}
        }

        let widgets = self.inner.widgets.get_all();
        for widget in &widgets {
            self.ensure_provider(widget.feed_type)?;
        }

        let scheduled = widgets
            .iter()
            .filter(|widget| self.inner.scheduler.schedule(widget))
            .count();

        *lifecycle = Lifecycle::Running;
        tracing::info!(
            widgets = widgets.len(),
            scheduled,
            feeds = self.inner.pipeline.providers().feed_types().len(),
            "Dashboard service initialized"
        );
        Ok(())
    }

    /// Cancel all timers, clear the cache, and drop every subscriber.
    pub fn destroy(&self) {
        let mut lifecycle = self.inner.lifecycle.lock();
        if *lifecycle == Lifecycle::Stopped {
            return;
        }
        *lifecycle = Lifecycle::Stopped;

        self.inner.scheduler.shutdown();
        self.inner.pipeline.shutdown();
        tracing::info!("Dashboard service destroyed");
    }

    /// Fetch a fresh value (never served from cache).
    pub async fn get(&self, feed_type: FeedType) -> Result<Arc<CacheEntry>> {
        self.inner
            .pipeline
            .refresh(feed_type, UpdateSource::DataChange)
            .await
    }

    /// Fetch every registered feed concurrently.
    ///
    /// A failing feed never blocks the others; its snapshot carries the
    /// previous cached entry (or an empty default) plus the error.
    pub async fn get_all(&self) -> Result<BTreeMap<FeedType, FeedSnapshot>> {
        self.collect_all(UpdateSource::DataChange).await
    }

    /// Interactive refresh of one feed
    pub async fn refresh(&self, feed_type: FeedType) -> Result<Arc<CacheEntry>> {
        self.inner
            .pipeline
            .refresh(feed_type, UpdateSource::UserAction)
            .await
    }

    pub async fn refresh_all(&self) -> Result<BTreeMap<FeedType, FeedSnapshot>> {
        self.collect_all(UpdateSource::UserAction).await
    }

    /// Current cache entry, without fetching
    pub fn peek(&self, feed_type: FeedType) -> Option<Arc<CacheEntry>> {
        self.inner.pipeline.cache().read(feed_type)
    }

    pub fn peek_all(&self) -> BTreeMap<FeedType, Arc<CacheEntry>> {
        self.inner.pipeline.cache().read_all()
    }

    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&UpdateEvent) + Send + Sync + 'static,
    {
        self.inner.pipeline.bus().subscribe(listener)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner.pipeline.bus().unsubscribe(id)
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.pipeline.bus().listener_count()
    }

    /// Feed types with a registered provider
    pub fn feed_types(&self) -> Vec<FeedType> {
        self.inner.pipeline.providers().feed_types()
    }

    pub fn widgets(&self) -> Vec<WidgetInstanceConfig> {
        self.inner.widgets.get_all()
    }

    pub fn widget(&self, id: &str) -> Result<WidgetInstanceConfig> {
        self.inner.widgets.get(id)
    }

    /// Merge or insert a widget config and re-arm its timer.
    pub fn upsert_widget(&self, id: &str, patch: WidgetPatch) -> Result<WidgetInstanceConfig> {
        if let Some(feed_type) = patch.feed_type {
            self.ensure_provider(feed_type)?;
        }

        let widget = self.inner.widgets.upsert(id, patch)?;
        if self.is_running() {
            self.inner.scheduler.schedule(&widget);
        }
        tracing::debug!(widget = %widget.id, feed = %widget.feed_type, "Widget config updated");
        Ok(widget)
    }

    /// Remove a widget config and cancel its timer. Cached feed data is kept.
    pub fn remove_widget(&self, id: &str) -> Result<WidgetInstanceConfig> {
        let widget = self.inner.widgets.remove(id)?;
        self.inner.scheduler.cancel(id);
        tracing::debug!(
            widget = %widget.id,
            feed = %widget.feed_type,
            remaining_on_feed = self.inner.widgets.references(widget.feed_type),
            "Widget removed"
        );
        Ok(widget)
    }

    pub fn scheduler_state(&self, widget_id: &str) -> SchedulerState {
        self.inner.scheduler.state(widget_id)
    }

    pub fn is_running(&self) -> bool {
        *self.inner.lifecycle.lock() == Lifecycle::Running
    }

    fn ensure_provider(&self, feed_type: FeedType) -> Result<()> {
        if self.inner.pipeline.providers().contains(feed_type) {
            Ok(())
        } else {
            Err(DashboardError::UnknownFeedType(feed_type.to_string()))
        }
    }

    async fn collect_all(&self, source: UpdateSource) -> Result<BTreeMap<FeedType, FeedSnapshot>> {
        let pipeline = &self.inner.pipeline;
        if pipeline.cache().is_closed() {
            return Err(DashboardError::ServiceStopped);
        }

        let feed_types = pipeline.providers().feed_types();
        let results = join_all(
            feed_types
                .iter()
                .map(|&ft| async move { (ft, pipeline.refresh(ft, source).await) }),
        )
        .await;

        let snapshots: BTreeMap<_, _> = results
            .into_iter()
            .map(|(ft, result)| (ft, self.snapshot(ft, result)))
            .collect();

        let failed = snapshots.values().filter(|s| !s.is_fresh()).count();
        if failed > 0 {
            tracing::warn!(failed, total = snapshots.len(), "Some feeds failed to refresh");
        }
        Ok(snapshots)
    }

    fn snapshot(&self, feed_type: FeedType, result: Result<Arc<CacheEntry>>) -> FeedSnapshot {
        let error = match result {
            Ok(entry) => {
                return FeedSnapshot {
                    entry,
                    status: FeedStatus::Fresh,
                };
            }
            Err(e) => {
                tracing::warn!(feed = %feed_type, error = %e, "Feed refresh failed");
                e.to_string()
            }
        };

        let pipeline = &self.inner.pipeline;
        match pipeline.cache().read(feed_type) {
            Some(entry) => FeedSnapshot {
                entry,
                status: FeedStatus::Stale { error },
            },
            None => {
                let clock = pipeline.clock();
                let value = FeedValue::empty(feed_type);
                let priority = classify(&value, clock.today());
                FeedSnapshot {
                    entry: Arc::new(CacheEntry::new(value, priority, clock.now())),
                    status: FeedStatus::Unavailable { error },
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::clock::ManualClock;
    use crate::application::feed_provider::provider_fn;
    use crate::domain::feed::{Alert, DailyStats, RiskLevel};
    use crate::domain::priority::PriorityTier;
    use chrono::{TimeZone, Utc};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;

    fn clock() -> Arc<dyn Clock> {
        Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 3, 14, 8, 0, 0).unwrap()))
    }

    fn stats(revenue: f64) -> FeedValue {
        FeedValue::DailyStats(DailyStats {
            revenue,
            orders: 87,
            new_customers: 12,
            conversion_rate: 3.4,
            active_users: 410,
        })
    }

    fn critical_alert() -> FeedValue {
        FeedValue::Alerts(vec![Alert {
            id: "a1".to_string(),
            title: "Payment gateway down".to_string(),
            message: String::new(),
            severity: RiskLevel::Critical,
            raised_at: Utc.with_ymd_and_hms(2024, 3, 14, 7, 55, 0).unwrap(),
        }])
    }

    /// Service with daily_stats and alerts; alerts fails while `alerts_down` is set
    fn service(alerts_down: Arc<AtomicBool>, widgets: WidgetRegistry) -> DashboardService {
        let providers = FeedProviderRegistry::new()
            .with(FeedType::DailyStats, provider_fn(|| async { Ok(stats(45000.0)) }))
            .with(
                FeedType::Alerts,
                provider_fn(move || {
                    let down = alerts_down.load(Ordering::SeqCst);
                    async move {
                        if down {
                            Err(anyhow::anyhow!("alerts backend unreachable"))
                        } else {
                            Ok(critical_alert())
                        }
                    }
                }),
            );
        DashboardService::new(providers, widgets, clock(), PipelineOptions::default())
    }

    #[tokio::test]
    async fn test_get_end_to_end() {
        let svc = service(Arc::new(AtomicBool::new(false)), WidgetRegistry::new());
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        svc.subscribe(move |e| sink.lock().push(e.clone()));

        let entry = svc.get(FeedType::DailyStats).await.unwrap();
        match &entry.value {
            FeedValue::DailyStats(s) => assert_eq!(s.revenue, 45000.0),
            other => panic!("unexpected value: {:?}", other),
        }

        let events = events.lock();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].source, UpdateSource::DataChange);
        assert_eq!(events[0].feed_type, FeedType::DailyStats);
    }

    #[tokio::test]
    async fn test_peek_is_idempotent_and_never_fetches() {
        let svc = service(Arc::new(AtomicBool::new(false)), WidgetRegistry::new());
        assert!(svc.peek(FeedType::Alerts).is_none());

        svc.get(FeedType::Alerts).await.unwrap();
        let first = svc.peek(FeedType::Alerts).unwrap();
        let second = svc.peek(FeedType::Alerts).unwrap();

        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_vec(&first).unwrap(),
            serde_json::to_vec(&second).unwrap()
        );
        assert_eq!(first.priority, PriorityTier::Critical);
    }

    #[tokio::test]
    async fn test_get_all_isolates_failures() {
        let down = Arc::new(AtomicBool::new(false));
        let svc = service(down.clone(), WidgetRegistry::new());

        // first pass: alerts never cached, so empty default is served
        down.store(true, Ordering::SeqCst);
        let all = svc.get_all().await.unwrap();
        assert!(all[&FeedType::DailyStats].is_fresh());
        assert!(matches!(all[&FeedType::Alerts].status, FeedStatus::Unavailable { .. }));
        assert_eq!(all[&FeedType::Alerts].entry.value, FeedValue::Alerts(Vec::new()));
        assert!(svc.peek(FeedType::Alerts).is_none());

        // cache alerts, then fail again: previous value is served
        down.store(false, Ordering::SeqCst);
        let cached = svc.get(FeedType::Alerts).await.unwrap();
        down.store(true, Ordering::SeqCst);

        let all = svc.refresh_all().await.unwrap();
        assert!(all[&FeedType::DailyStats].is_fresh());
        match &all[&FeedType::Alerts].status {
            FeedStatus::Stale { error } => assert!(error.contains("unreachable")),
            other => panic!("unexpected status: {:?}", other),
        }
        assert_eq!(all[&FeedType::Alerts].entry, cached);

        let peeked = svc.peek_all();
        assert_eq!(peeked.len(), 2);
        assert_eq!(peeked[&FeedType::Alerts], cached);
    }

    #[tokio::test]
    async fn test_failed_get_surfaces_error_without_event() {
        let down = Arc::new(AtomicBool::new(true));
        let svc = service(down, WidgetRegistry::new());
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        svc.subscribe(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });

        let err = svc.refresh(FeedType::Alerts).await.unwrap_err();
        assert!(matches!(err, DashboardError::Fetch { feed_type: FeedType::Alerts, .. }));
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert!(svc.peek(FeedType::Alerts).is_none());
    }

    #[tokio::test]
    async fn test_unknown_feed_type() {
        let svc = service(Arc::new(AtomicBool::new(false)), WidgetRegistry::new());
        let err = svc.get(FeedType::QuickActions).await.unwrap_err();
        assert!(matches!(err, DashboardError::UnknownFeedType(_)));
    }

    #[tokio::test]
    async fn test_init_rejects_widget_without_provider() {
        let widgets = WidgetRegistry::from_configs(vec![
            WidgetInstanceConfig::new("actions", FeedType::QuickActions).refresh_every(5),
        ])
        .unwrap();
        let svc = service(Arc::new(AtomicBool::new(false)), widgets);

        assert!(matches!(svc.init(), Err(DashboardError::UnknownFeedType(_))));
        assert!(!svc.is_running());
    }

    #[tokio::test]
    async fn test_concurrent_gets_keep_priority_consistent() {
        let flip = Arc::new(AtomicUsize::new(0));
        let providers = FeedProviderRegistry::new().with(
            FeedType::Alerts,
            provider_fn(move || {
                let n = flip.fetch_add(1, Ordering::SeqCst);
                async move {
                    tokio::time::sleep(Duration::from_millis((n % 3) as u64)).await;
                    let severity = if n % 2 == 0 { RiskLevel::Critical } else { RiskLevel::Low };
                    Ok(FeedValue::Alerts(vec![Alert {
                        id: format!("a{}", n),
                        title: "Disk usage".to_string(),
                        message: String::new(),
                        severity,
                        raised_at: Utc::now(),
                    }]))
                }
            }),
        );
        let svc = DashboardService::new(
            providers,
            WidgetRegistry::new(),
            clock(),
            PipelineOptions::default(),
        );

        let calls = (0..20).map(|_| svc.get(FeedType::Alerts));
        for result in join_all(calls).await {
            let entry = result.unwrap();
            assert_eq!(entry.priority, classify(&entry.value, clock().today()));
        }

        let cached = svc.peek(FeedType::Alerts).unwrap();
        assert_eq!(cached.priority, classify(&cached.value, clock().today()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_scheduled_refresh_publishes_scheduled_source() {
        let widgets = WidgetRegistry::from_configs(vec![
            WidgetInstanceConfig::new("stats", FeedType::DailyStats).refresh_every(1),
        ])
        .unwrap();
        let svc = service(Arc::new(AtomicBool::new(false)), widgets);
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        svc.subscribe(move |e| sink.lock().push(e.source));

        svc.init().unwrap();
        svc.init().unwrap();
        assert_eq!(svc.scheduler_state("stats"), SchedulerState::Scheduled);

        tokio::time::sleep(Duration::from_secs(61)).await;
        assert_eq!(*events.lock(), vec![UpdateSource::ScheduledRefresh]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_scheduled_failure_keeps_timer_running() {
        let down = Arc::new(AtomicBool::new(true));
        let widgets = WidgetRegistry::from_configs(vec![
            WidgetInstanceConfig::new("alerts", FeedType::Alerts).refresh_every(1),
        ])
        .unwrap();
        let svc = service(down.clone(), widgets);
        svc.init().unwrap();

        tokio::time::sleep(Duration::from_secs(61)).await;
        assert!(svc.peek(FeedType::Alerts).is_none());
        assert_eq!(svc.scheduler_state("alerts"), SchedulerState::Scheduled);

        down.store(false, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert!(svc.peek(FeedType::Alerts).is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_destroy_halts_everything() {
        let widgets = WidgetRegistry::from_configs(vec![
            WidgetInstanceConfig::new("stats", FeedType::DailyStats).refresh_every(1),
            WidgetInstanceConfig::new("alerts", FeedType::Alerts).refresh_every(2),
        ])
        .unwrap();
        let svc = service(Arc::new(AtomicBool::new(false)), widgets);
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        svc.subscribe(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });
        svc.init().unwrap();

        svc.destroy();
        tokio::time::sleep(Duration::from_secs(24 * 3600)).await;

        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert_eq!(svc.scheduler_state("stats"), SchedulerState::Cancelled);
        assert!(matches!(
            svc.get(FeedType::DailyStats).await,
            Err(DashboardError::ServiceStopped)
        ));
        assert!(matches!(svc.get_all().await, Err(DashboardError::ServiceStopped)));
        assert!(matches!(svc.init(), Err(DashboardError::ServiceStopped)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_widget_upsert_and_remove() {
        let svc = service(Arc::new(AtomicBool::new(false)), WidgetRegistry::new());
        svc.init().unwrap();

        let widget = svc
            .upsert_widget(
                "stats",
                WidgetPatch {
                    feed_type: Some(FeedType::DailyStats),
                    refresh_interval_minutes: Some(1),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(widget.refresh_interval_minutes, 1);
        assert_eq!(svc.scheduler_state("stats"), SchedulerState::Scheduled);

        tokio::time::sleep(Duration::from_secs(61)).await;
        assert!(svc.peek(FeedType::DailyStats).is_some());

        svc.upsert_widget(
            "stats",
            WidgetPatch {
                refresh_interval_minutes: Some(0),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(svc.scheduler_state("stats"), SchedulerState::Idle);

        let removed = svc.remove_widget("stats").unwrap();
        assert_eq!(removed.id, "stats");
        assert!(svc.peek(FeedType::DailyStats).is_some());
        assert!(matches!(svc.widget("stats"), Err(DashboardError::ConfigNotFound(_))));
        assert!(matches!(svc.remove_widget("stats"), Err(DashboardError::ConfigNotFound(_))));
        assert_eq!(svc.inner.scheduler.timer_count(), 0);

        let err = svc
            .upsert_widget(
                "actions",
                WidgetPatch {
                    feed_type: Some(FeedType::QuickActions),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, DashboardError::UnknownFeedType(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_removed_widgets_release_their_timers() {
        let svc = service(Arc::new(AtomicBool::new(false)), WidgetRegistry::new());
        svc.init().unwrap();

        for i in 0..50 {
            let id = format!("w{}", i);
            svc.upsert_widget(
                &id,
                WidgetPatch {
                    feed_type: Some(FeedType::DailyStats),
                    refresh_interval_minutes: Some(1),
                    ..Default::default()
                },
            )
            .unwrap();
            assert_eq!(svc.scheduler_state(&id), SchedulerState::Scheduled);
            svc.remove_widget(&id).unwrap();
        }

        assert_eq!(svc.scheduler_state("w0"), SchedulerState::Idle);
        assert_eq!(svc.inner.scheduler.timer_count(), 0);

        tokio::time::sleep(Duration::from_secs(600)).await;
        assert!(svc.peek(FeedType::DailyStats).is_none());
    }
}
