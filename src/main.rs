// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc, time::Duration};
use axum::{
    routing::{get, put},
    Router,
};
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::application::plant_service::PlantService;
use crate::application::resolution_service::ResolutionService;
use crate::application::selection::{SelectionService, SessionLimits};
use crate::application::streaming_service::StreamingOverviewService;
use crate::infrastructure::backend_client::BackendClient;
use crate::infrastructure::config::load_dashboard_config;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    get_resolution, health_check, list_plants, select_view, stream_overview, view_snapshot,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing, defaulting to info when RUST_LOG is unset
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = load_dashboard_config()?;

    // Create repository (infrastructure layer)
    let repository = Arc::new(BackendClient::new(&config.backend)?);

    // Create services (application layer)
    let plant_service = PlantService::new(repository.clone());
    let resolution_service = ResolutionService::new(repository.clone());
    let streaming_service = StreamingOverviewService::new(resolution_service.clone());
    let selection_service = SelectionService::new(
        resolution_service.clone(),
        SessionLimits {
            max_sessions: config.selection.max_sessions,
            idle_ttl: Duration::from_secs(config.selection.idle_ttl_secs),
        },
    );

    // Create application state
    let state = Arc::new(AppState {
        plant_service,
        resolution_service,
        streaming_service,
        selection_service,
    });

    // Build router (presentation layer)
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/plants", get(list_plants))
        .route("/plants/:id/resolutions/:resolution", get(get_resolution))
        .route("/plants/:id/overview", get(stream_overview))
        .route("/plants/:id/view", get(view_snapshot))
        .route("/plants/:id/view/:resolution", put(select_view))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = config.server.bind_addr.parse()?;
    tracing::info!("Starting solar-telemetry service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
