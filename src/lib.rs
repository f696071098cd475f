// Live-feed cache and refresh service for dashboard widgets
pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;

pub use application::dashboard_service::{DashboardService, FeedSnapshot, FeedStatus};
pub use domain::error::{DashboardError, Result};
