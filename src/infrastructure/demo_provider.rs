// In-memory demo feeds with simulated backend latency
use crate::application::clock::Clock;
use crate::application::feed_provider::FeedProvider;
use crate::domain::feed::{
    ActivityEntry, Alert, DailyStats, FeedType, FeedValue, QuickAction, RiskLevel, ScheduledEvent,
    UrgentItem,
};
use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, NaiveDate, Utc};
use std::sync::Arc;
use std::time::Duration;

pub struct DemoFeedProvider {
    feed_type: FeedType,
    latency: Duration,
    clock: Arc<dyn Clock>,
}

impl DemoFeedProvider {
    pub fn new(feed_type: FeedType, latency: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            feed_type,
            latency,
            clock,
        }
    }
}

#[async_trait]
impl FeedProvider for DemoFeedProvider {
    async fn fetch(&self) -> anyhow::Result<FeedValue> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        Ok(fixture(self.feed_type, self.clock.now(), self.clock.today()))
    }
}

fn fixture(feed_type: FeedType, now: DateTime<Utc>, today: NaiveDate) -> FeedValue {
    match feed_type {
        FeedType::UrgentItems => FeedValue::UrgentItems(vec![
            UrgentItem {
                id: "urgent-1".to_string(),
                title: "Supplier contract expires".to_string(),
                description: "Renewal terms have not been signed".to_string(),
                risk: RiskLevel::High,
                due: today.succ_opt(),
            },
            UrgentItem {
                id: "urgent-2".to_string(),
                title: "Failed payroll export".to_string(),
                description: "Export job stopped at 40%".to_string(),
                risk: RiskLevel::Critical,
                due: Some(today),
            },
        ]),
        FeedType::DailyStats => FeedValue::DailyStats(DailyStats {
            revenue: 45000.0,
            orders: 312,
            new_customers: 27,
            conversion_rate: 3.8,
            active_users: 1240,
        }),
        FeedType::QuickActions => FeedValue::QuickActions(vec![
            action("new-order", "New order", "cart", "/orders/new"),
            action("add-customer", "Add customer", "user-plus", "/customers/new"),
            action("reports", "Reports", "chart", "/reports"),
        ]),
        FeedType::RecentActivity => FeedValue::RecentActivity(vec![
            ActivityEntry {
                id: "act-1".to_string(),
                actor: "maria".to_string(),
                action: "approved".to_string(),
                target: Some("invoice #1042".to_string()),
                at: now - ChronoDuration::minutes(4),
            },
            ActivityEntry {
                id: "act-2".to_string(),
                actor: "devon".to_string(),
                action: "logged in".to_string(),
                target: None,
                at: now - ChronoDuration::minutes(17),
            },
        ]),
        FeedType::Alerts => FeedValue::Alerts(vec![Alert {
            id: "alert-1".to_string(),
            title: "Disk usage above 85%".to_string(),
            message: "Volume /data on db-2".to_string(),
            severity: RiskLevel::Medium,
            raised_at: now - ChronoDuration::minutes(30),
        }]),
        FeedType::ScheduledEvents => {
            let mut events = Vec::new();
            if let Some(starts_at) = today.and_hms_opt(14, 0, 0) {
                events.push(ScheduledEvent {
                    id: "event-1".to_string(),
                    title: "Quarterly review".to_string(),
                    starts_at,
                    location: Some("Room 3".to_string()),
                });
            }
            if let Some(starts_at) = today.succ_opt().and_then(|d| d.and_hms_opt(9, 30, 0)) {
                events.push(ScheduledEvent {
                    id: "event-2".to_string(),
                    title: "Vendor call".to_string(),
                    starts_at,
                    location: None,
                });
            }
            FeedValue::ScheduledEvents(events)
        }
    }
}

fn action(id: &str, label: &str, icon: &str, route: &str) -> QuickAction {
    QuickAction {
        id: id.to_string(),
        label: label.to_string(),
        icon: Some(icon.to_string()),
        route: route.to_string(),
        enabled: true,
    }
}
