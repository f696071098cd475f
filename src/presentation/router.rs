// Route table
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    delete_widget, get_feed, health_check, list_feeds, list_widgets, peek_feed, refresh_feed,
    stream_updates, upsert_widget,
};
use axum::{
    Router,
    routing::{get, patch, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/widgets", get(list_widgets))
        .route("/widgets/:id", patch(upsert_widget).delete(delete_widget))
        .route("/feeds", get(list_feeds))
        .route("/feeds/:feed", get(get_feed))
        .route("/feeds/:feed/cached", get(peek_feed))
        .route("/feeds/:feed/refresh", post(refresh_feed))
        .route("/events", get(stream_updates))
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}
