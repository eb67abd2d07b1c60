use std::sync::Arc;

use axum::{response::IntoResponse, Extension, Json};
use axum_extra::{headers::Host, TypedHeader};

use crate::config::{ConfigView, ServerConfig};

/// Serves the loaded config with `PmaAbsoluteUri` built from this request's
/// Host header.
pub async fn config_handler(
    Extension(config): Extension<Arc<ServerConfig>>,
    host: Option<TypedHeader<Host>>,
) -> impl IntoResponse {
    let request_id = uuid::Uuid::new_v4().as_u128();
    let Some(TypedHeader(host)) = host else {
        log::warn!("[Config] {request_id:x} rejected: no Host header");
        return (http::StatusCode::BAD_REQUEST, "missing Host header").into_response();
    };

    let host = host.to_string();
    log::info!("[Config] {request_id:x} served for host {}", host);
    Json(ConfigView::new(&config, Some(&host))).into_response()
}

pub async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
