// Per-widget refresh timers, serialized per feed type
use crate::application::feed_pipeline::FeedPipeline;
use crate::domain::error::DashboardError;
use crate::domain::event::UpdateSource;
use crate::domain::feed::FeedType;
use crate::domain::widget::WidgetInstanceConfig;
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulerState {
    /// No timer
    Idle,
    Scheduled,
    Fetching,
    Cancelled,
}

struct TimerTask {
    token: CancellationToken,
    state: Arc<Mutex<SchedulerState>>,
}

pub struct RefreshScheduler {
    pipeline: Arc<FeedPipeline>,
    tasks: Mutex<HashMap<String, TimerTask>>,
    in_flight: Arc<Mutex<HashSet<FeedType>>>,
    shutdown: CancellationToken,
}

impl RefreshScheduler {
    pub fn new(pipeline: Arc<FeedPipeline>) -> Self {
        Self {
            pipeline,
            tasks: Mutex::new(HashMap::new()),
            in_flight: Arc::new(Mutex::new(HashSet::new())),
            shutdown: CancellationToken::new(),
        }
    }

    /// Arm (or re-arm) the timer for a widget.
    ///
    /// Any existing timer for the same id is cancelled first. Returns false if
    /// the widget does not refresh automatically or the scheduler is shut down.
    /// Must be called from within a tokio runtime.
    pub fn schedule(&self, widget: &WidgetInstanceConfig) -> bool {
        let mut tasks = self.tasks.lock();
        if let Some(previous) = tasks.remove(&widget.id) {
            previous.token.cancel();
        }

        if self.shutdown.is_cancelled() || !widget.refresh_enabled() {
            return false;
        }

        let period = Duration::from_secs(u64::from(widget.refresh_interval_minutes) * 60);
        let token = self.shutdown.child_token();
        let state = Arc::new(Mutex::new(SchedulerState::Scheduled));

        tokio::spawn(run_timer(TimerContext {
            pipeline: self.pipeline.clone(),
            widget_id: widget.id.clone(),
            feed_type: widget.feed_type,
            period,
            token: token.clone(),
            state: state.clone(),
            in_flight: self.in_flight.clone(),
        }));

        tracing::debug!(
            widget = %widget.id,
            feed = %widget.feed_type,
            interval_minutes = widget.refresh_interval_minutes,
            "Refresh timer armed"
        );

        tasks.insert(widget.id.clone(), TimerTask { token, state });
        true
    }

    /// Cancel and forget one widget's timer. Returns false if it had none.
    pub fn cancel(&self, widget_id: &str) -> bool {
        match self.tasks.lock().remove(widget_id) {
            Some(task) => {
                task.token.cancel();
                *task.state.lock() = SchedulerState::Cancelled;
                tracing::debug!(widget = %widget_id, "Refresh timer cancelled");
                true
            }
            None => false,
        }
    }

    /// Cancel every timer; later `schedule` calls are refused.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
        let tasks = self.tasks.lock();
        for task in tasks.values() {
            *task.state.lock() = SchedulerState::Cancelled;
        }
        tracing::info!(timers = tasks.len(), "Refresh scheduler shut down");
    }

    pub fn state(&self, widget_id: &str) -> SchedulerState {
        self.tasks
            .lock()
            .get(widget_id)
            .map(|task| *task.state.lock())
            .unwrap_or(SchedulerState::Idle)
    }

    #[cfg(test)]
    pub(crate) fn timer_count(&self) -> usize {
        self.tasks.lock().len()
    }
}

struct TimerContext {
    pipeline: Arc<FeedPipeline>,
    widget_id: String,
    feed_type: FeedType,
    period: Duration,
    token: CancellationToken,
    state: Arc<Mutex<SchedulerState>>,
    in_flight: Arc<Mutex<HashSet<FeedType>>>,
}

async fn run_timer(ctx: TimerContext) {
    let mut ticker = tokio::time::interval_at(Instant::now() + ctx.period, ctx.period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            _ = ctx.token.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let Some(_guard) = InFlightGuard::acquire(&ctx.in_flight, ctx.feed_type) else {
            tracing::debug!(
                widget = %ctx.widget_id,
                feed = %ctx.feed_type,
                "Refresh still in flight, skipping tick"
            );
            continue;
        };

        *ctx.state.lock() = SchedulerState::Fetching;

        // An in-flight fetch runs to completion; the closed cache drops its result
        match ctx
            .pipeline
            .refresh(ctx.feed_type, UpdateSource::ScheduledRefresh)
            .await
        {
            Ok(entry) => tracing::debug!(
                widget = %ctx.widget_id,
                feed = %ctx.feed_type,
                priority = ?entry.priority,
                "Scheduled refresh complete"
            ),
            Err(DashboardError::ServiceStopped) => break,
            Err(e) => tracing::warn!(
                widget = %ctx.widget_id,
                feed = %ctx.feed_type,
                error = %e,
                "Scheduled refresh failed, keeping cached value"
            ),
        }

        if ctx.token.is_cancelled() {
            break;
        }
        *ctx.state.lock() = SchedulerState::Scheduled;
    }

    *ctx.state.lock() = SchedulerState::Cancelled;
}

/// Marks a feed as being refreshed until dropped.
struct InFlightGuard {
    set: Arc<Mutex<HashSet<FeedType>>>,
    feed_type: FeedType,
}

impl InFlightGuard {
    fn acquire(set: &Arc<Mutex<HashSet<FeedType>>>, feed_type: FeedType) -> Option<Self> {
        if set.lock().insert(feed_type) {
            Some(Self {
                set: set.clone(),
                feed_type,
            })
        } else {
            None
        }
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.set.lock().remove(&self.feed_type);
    }
}
