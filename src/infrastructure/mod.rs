// Infrastructure layer - External dependencies and adapters
pub mod config;
pub mod demo_provider;
pub mod event_stream;
pub mod http_provider;
pub mod http_response;
pub mod providers;
