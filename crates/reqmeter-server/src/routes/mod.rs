//! Application routes served alongside the instrumentation.

use axum::Json;
use serde_json::{json, Value};

/// `GET /`
pub async fn root() -> Json<Value> {
    Json(json!({ "message": "Welcome to the Backend API" }))
}

/// `GET /api/data`
pub async fn api_data() -> Json<Value> {
    Json(json!({
        "data": {
            "test": "This is some sample data from the backend API",
            "test-two": "This is some more sample data from the backend API"
        }
    }))
}
