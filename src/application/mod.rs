// Application layer - Use cases over feeds, cache, and widgets
pub mod cache_store;
pub mod clock;
pub mod dashboard_service;
pub mod feed_pipeline;
pub mod feed_provider;
pub mod notification_bus;
pub mod scheduler;
pub mod widget_registry;
