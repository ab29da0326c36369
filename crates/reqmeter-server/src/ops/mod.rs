//! Operational HTTP endpoints.
//!
//! - `/health`  : liveness, JSON `{status, timestamp}`
//! - `/metrics` : text exposition of the registry (path configurable)

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::app_state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
}

/// `GET /health`
pub async fn health() -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy",
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }),
    )
}

/// `GET /metrics`
///
/// Always 200: series that fail to collect or encode are logged and left out.
pub async fn metrics(State(state): State<AppState>) -> Response {
    let out = state.render();
    if out.skipped > 0 {
        tracing::warn!(skipped = out.skipped, "scrape served with series omitted");
    }

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, state.encoder().content_type())],
        out.body,
    )
        .into_response()
}
