//! Axum router wiring.
//!
//! Layer order, outermost first: CORS, tracing, request metrics, timeout.
//! The timeout sits inside the interceptor so timed-out requests are
//! recorded with their 408 status.

use axum::{http::StatusCode, routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::{app_state::AppState, middleware::MetricsLayer, ops, routes};

pub fn build_router(state: AppState) -> Router {
    build_router_with(state, Router::new())
}

/// Like [`build_router`], with extra routes merged in before the layers are
/// applied so they are instrumented the same way.
pub fn build_router_with(state: AppState, extra: Router<AppState>) -> Router {
    let metrics_path = state.cfg().metrics.path.clone();
    let timeout = state.cfg().server.request_timeout();
    let metrics_layer = MetricsLayer::new(state.http_metrics(), &state.cfg().metrics);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(routes::root))
        .route("/health", get(ops::health))
        .route("/api/data", get(routes::api_data))
        .route(&metrics_path, get(ops::metrics))
        .merge(extra)
        .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout))
        .layer(metrics_layer)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
