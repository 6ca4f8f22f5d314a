//! memos-server: HTTP API server for memos
//!
//! This crate provides:
//! - REST endpoints for users, memos, tags, resources and workspace settings
//! - Bearer token authentication
//! - Markdown parse/restore endpoints over the core codec
//!
//! # Architecture
//!
//! The server is built on Axum with a middleware stack for:
//! - Request tracing and logging
//! - CORS handling
//! - Request ID generation
//! - JSON error responses
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use memos_server::{AppState, ServerConfig, app};
//! use memos_store::{LocalObjectStore, Store, StoreConfig};
//!
//! let config = ServerConfig::from_env()?;
//! let store = Store::connect(StoreConfig::from_env()?).await?;
//! let objects = Arc::new(LocalObjectStore::new(&config.blob_root, &config.blob_public_url));
//! let router = app(AppState::new(store, config, objects));
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;

use axum::{Router, http::HeaderValue};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::middleware::request_id::{propagate_request_id, request_id_layer};

// Re-exports for convenience
pub use config::{ConfigError, ServerConfig};
pub use error::{ApiError, ApiResult};
pub use state::AppState;

pub use memos_core;
pub use memos_store;

/// The full application: routes, local blob serving and middleware.
pub fn app(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config().cors_allowed_origins);
    let blobs = ServeDir::new(&state.config().blob_root);

    routes::build_router(state)
        .nest_service("/blobs", blobs)
        .layer(axum::middleware::from_fn(propagate_request_id))
        .layer(request_id_layer())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Build CORS layer from configuration.
///
/// Origins that are not valid header values are skipped with a warning.
pub fn build_cors_layer(allowed_origins: &str) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if allowed_origins.trim() == "*" {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    layer.allow_origin(AllowOrigin::list(origins))
}
