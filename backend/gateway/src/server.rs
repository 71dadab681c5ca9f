//! Gateway HTTP server and router assembly.

use anyhow::Result;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use snapjudge_config::Settings;
use snapjudge_vision::ModelClient;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::analyze_api;
use crate::health_api;

/// State shared across routes: the model client, built once at startup.
#[derive(Clone)]
pub struct GatewayState {
    pub client: ModelClient,
}

/// Build the gateway router.
///
/// `max_upload_bytes` caps the multipart body size at the router layer;
/// oversized uploads are rejected with 413 before any handler runs.
pub fn router(state: GatewayState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/analyze/receipt", post(analyze_api::analyze_receipt))
        .route("/analyze/inventory", post(analyze_api::analyze_inventory))
        .route("/health", get(health_api::get_health))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the gateway and serve until the process exits.
pub async fn start_server(settings: &Settings) -> Result<()> {
    let state = GatewayState {
        client: ModelClient::new(&settings.api_url, &settings.api_key, &settings.model),
    };
    let app = router(state, settings.max_upload_bytes);

    info!("gateway listening on {}", settings.bind_addr);
    let listener = TcpListener::bind(settings.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
