use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;

pub mod view;

async fn handle_404() -> (http::StatusCode, &'static str) {
    (http::StatusCode::NOT_FOUND, "Not found")
}

pub fn routes(config: Arc<ServerConfig>) -> Router {
    Router::new()
        .route("/config", get(view::config_handler))
        .route("/health", get(view::health_handler))
        .fallback(handle_404)
        .layer(Extension(config))
        .layer(TraceLayer::new_for_http())
}
