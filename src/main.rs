// Main entry point - Dependency injection and server setup
use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use feed_dashboard::application::clock::{Clock, SystemClock};
use feed_dashboard::application::dashboard_service::DashboardService;
use feed_dashboard::application::widget_registry::WidgetRegistry;
use feed_dashboard::infrastructure::config::load_app_config;
use feed_dashboard::infrastructure::providers::build_registry;
use feed_dashboard::presentation::app_state::AppState;
use feed_dashboard::presentation::router::create_router;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = load_app_config()?;

    // Create providers (infrastructure layer)
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let providers = build_registry(&config.feeds, clock.clone())?;

    // Create service (application layer)
    let widgets = if config.widgets.is_empty() {
        WidgetRegistry::with_defaults()
    } else {
        WidgetRegistry::from_configs(config.widgets.clone())?
    };
    let service = DashboardService::new(
        providers,
        widgets,
        clock,
        config.feeds.pipeline_options(),
    );
    service.init()?;

    // Warm the cache so the first render has data
    let snapshots = service.get_all().await?;
    let failed = snapshots.values().filter(|s| !s.is_fresh()).count();
    tracing::info!(feeds = snapshots.len(), failed, "Initial feed load complete");

    // Build router (presentation layer)
    let router = create_router(AppState {
        service: service.clone(),
    });

    // Start server
    let addr: SocketAddr = config
        .server
        .bind
        .parse()
        .with_context(|| format!("Invalid bind address '{}'", config.server.bind))?;
    tracing::info!("Starting feed-dashboard service on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal(service.clone()))
        .await?;

    Ok(())
}

/// Wait for Ctrl-C, then tear the service down so open update streams end
async fn shutdown_signal(service: DashboardService) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutting down");
    service.destroy();
}
