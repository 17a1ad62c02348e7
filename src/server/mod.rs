pub mod api;
pub mod dashboard;

use crate::services::MentionStore;
use axum::{routing::get, Router};
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: MentionStore,
}

/// Build the router with all routes
pub fn router(state: AppState) -> Router {
    // Read-only surface: any origin may GET
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([axum::http::Method::GET, axum::http::Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/", get(dashboard::dashboard_handler))
        .route("/api/mentions", get(api::mentions_handler))
        .route("/api/merge", get(api::merge_handler))
        .route("/api/history", get(api::history_handler))
        .route("/health", get(api::health_handler))
        .layer(cors)
        .with_state(state)
}

/// Start the axum server
pub async fn serve(store: MentionStore, port: u16) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(database = %store.path().display(), "Starting wsb-mentions server");

    tracing::info!("Registering routes:");
    tracing::info!("  GET /?date=2024-05-02&top=20&ticker=NVDA");
    tracing::info!("  GET /api/mentions?date=2024-05-02");
    tracing::info!("  GET /api/merge?date=2024-05-02");
    tracing::info!("  GET /api/history?ticker=NVDA");
    tracing::info!("  GET /health");

    let app = router(AppState { store });

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!(%addr, "Server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
