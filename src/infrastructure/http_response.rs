// HTTP error mapping for API handlers
use crate::domain::error::DashboardError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Error returned by handlers, rendered as `{ "error": "..." }`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }
}

impl From<DashboardError> for ApiError {
    fn from(err: DashboardError) -> Self {
        let status = match &err {
            DashboardError::UnknownFeedType(_) | DashboardError::ConfigNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            DashboardError::InvalidWidget { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            DashboardError::Fetch { .. } => StatusCode::BAD_GATEWAY,
            DashboardError::ServiceStopped => StatusCode::SERVICE_UNAVAILABLE,
        };

        if status.is_server_error() {
            tracing::error!(error = %err, "Request failed");
        }

        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(serde_json::json!({ "error": self.message })),
        )
            .into_response()
    }
}
