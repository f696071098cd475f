// Server-sent event stream of feed updates
use crate::application::dashboard_service::DashboardService;
use crate::application::notification_bus::SubscriptionId;
use crate::domain::event::UpdateEvent;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use std::convert::Infallible;
use tokio::sync::mpsc;

/// Updates buffered per client before new ones are dropped
const CLIENT_BUFFER: usize = 64;

/// Unsubscribes when the client's stream is dropped.
struct SubscriptionGuard {
    service: DashboardService,
    id: SubscriptionId,
}

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        self.service.unsubscribe(self.id);
        tracing::debug!(
            subscribers = self.service.subscriber_count(),
            "Update stream closed"
        );
    }
}

/// Subscribe to the service and forward every update as an `update` SSE event.
///
/// The stream ends when the service is destroyed (its listeners are dropped).
pub fn update_stream(service: DashboardService) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (tx, mut rx) = mpsc::channel::<UpdateEvent>(CLIENT_BUFFER);

    let id = service.subscribe(move |event| {
        if tx.try_send(event.clone()).is_err() {
            tracing::debug!(feed = %event.feed_type, "Update stream lagging, dropping event");
        }
    });
    tracing::debug!(
        subscribers = service.subscriber_count(),
        "Update stream opened"
    );
    let guard = SubscriptionGuard { service, id };

    let stream = async_stream::stream! {
        let _guard = guard;
        while let Some(event) = rx.recv().await {
            match Event::default().event("update").json_data(&event) {
                Ok(sse) => yield Ok(sse),
                Err(e) => tracing::warn!(error = %e, "Failed to encode update event"),
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}
