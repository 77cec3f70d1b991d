use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns a simple status object with service version and backing file.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "resume-api",
        "data_file": state.config.data_file.display().to_string(),
    }))
}

/// GET /test
pub async fn hello_handler() -> Json<Value> {
    Json(json!({ "message": "Hello, World!" }))
}
