// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use crate::application::alert_sink::AlertDispatcher;
use crate::application::monitor_service::MonitorService;
use crate::application::router::ReadingRouter;
use crate::infrastructure::broadcast_sink::BroadcastSink;
use crate::infrastructure::config::load_monitor_config;
use crate::infrastructure::log_sink::LogSink;
use crate::infrastructure::telemetry_listener::{TelemetryListener, run_stdin};
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::build_router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = load_monitor_config().context("Failed to load monitor configuration")?;

    // Initialize tracing, RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .context("Invalid log level")?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Alert sinks (infrastructure layer)
    let notices = BroadcastSink::new(config.http.notice_buffer);
    let dispatcher = AlertDispatcher::new()
        .with_sink(Arc::new(LogSink))
        .with_sink(Arc::new(notices.clone()));

    // Create services (application layer)
    let router = Arc::new(ReadingRouter::new(config.router_settings()));
    let monitor_service = MonitorService::new(router, dispatcher);

    tracing::info!(
        primary_source_id = config.monitor.primary_source_id,
        window_capacity = config.monitor.window_capacity,
        slope_threshold = config.monitor.slope_threshold,
        "Starting fridge-telemetry monitor"
    );

    // Telemetry transports
    let max_line_length = config.listener.max_line_length;
    if config.listener.enabled {
        let listener = TelemetryListener::bind(
            &config.listener.telemetry_addr,
            monitor_service.clone(),
            max_line_length,
        )
        .await?;
        tokio::spawn(async move {
            if let Err(e) = listener.run().await {
                tracing::error!(error = %e, "Telemetry listener stopped");
            }
        });
    }
    if config.listener.read_stdin {
        tokio::spawn(run_stdin(monitor_service.clone(), max_line_length));
    }

    // Build router (presentation layer)
    let state = Arc::new(AppState {
        monitor_service,
        notices,
    });
    let app = build_router(state);

    // Start server
    let http = tokio::net::TcpListener::bind(&config.http.addr)
        .await
        .with_context(|| format!("Failed to bind HTTP server on {}", config.http.addr))?;
    tracing::info!("Serving HTTP on {}", http.local_addr()?);

    axum::serve(http, app).await?;

    Ok(())
}
