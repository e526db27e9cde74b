//! API Routes
//!
//! This module organizes all HTTP endpoints for the relay:
//! - `/upload-{products,chats,comments,community}` - Multipart upload into a folder
//! - `/read/{*id}` - Delivery URL for an asset
//! - `/delete/{*public_id}` - Remove an asset
//! - `/health` - Health check

pub mod assets;
pub mod health;
pub mod upload;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::middleware::cors_layer;
use crate::models::AppState;

/// Create the main application router
///
/// Layers, outermost first: request tracing, CORS, body limit.
/// Without `UPLOAD_MAX_BODY_BYTES` the body limit is disabled.
pub fn create_router(state: AppState) -> Router {
    info!("Creating application router");

    let body_limit = match state.config.upload.max_body_bytes {
        Some(max) => DefaultBodyLimit::max(max),
        None => DefaultBodyLimit::disable(),
    };

    Router::new()
        .merge(upload::router())
        .merge(assets::router())
        .merge(health::router())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&state.config.cors))
                .layer(body_limit),
        )
        .with_state(state)
}
