// HTTP request handlers
use crate::application::dashboard_service::FeedSnapshot;
use crate::domain::cache::CacheEntry;
use crate::domain::feed::FeedType;
use crate::domain::widget::{WidgetInstanceConfig, WidgetPatch};
use crate::infrastructure::event_stream::update_stream;
use crate::infrastructure::http_response::ApiError;
use crate::presentation::app_state::AppState;
use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use std::collections::BTreeMap;
use std::sync::Arc;

type ApiResult<T> = Result<Json<T>, ApiError>;

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// List configured widget instances in layout order
pub async fn list_widgets(State(state): State<Arc<AppState>>) -> Json<Vec<WidgetInstanceConfig>> {
    Json(state.service.widgets())
}

/// Merge a partial config into a widget, creating it if needed
pub async fn upsert_widget(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(patch): Json<WidgetPatch>,
) -> ApiResult<WidgetInstanceConfig> {
    Ok(Json(state.service.upsert_widget(&id, patch)?))
}

pub async fn delete_widget(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<WidgetInstanceConfig> {
    Ok(Json(state.service.remove_widget(&id)?))
}

/// Fetch every feed; failed feeds report their status alongside the served entry
pub async fn list_feeds(
    State(state): State<Arc<AppState>>,
) -> ApiResult<BTreeMap<FeedType, FeedSnapshot>> {
    Ok(Json(state.service.get_all().await?))
}

/// Fetch one feed fresh
pub async fn get_feed(
    Path(feed): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Arc<CacheEntry>> {
    let feed_type: FeedType = feed.parse()?;
    Ok(Json(state.service.get(feed_type).await?))
}

/// Cached entry without fetching
pub async fn peek_feed(
    Path(feed): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Arc<CacheEntry>> {
    let feed_type: FeedType = feed.parse()?;
    state
        .service
        .peek(feed_type)
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("Feed {} has not been fetched yet", feed_type)))
}

/// User-triggered refresh
pub async fn refresh_feed(
    Path(feed): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Arc<CacheEntry>> {
    let feed_type: FeedType = feed.parse()?;
    Ok(Json(state.service.refresh(feed_type).await?))
}

/// Live stream of update events
pub async fn stream_updates(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    update_stream(state.service.clone())
}
