use axum::Json;
use serde_json::{Value, json};

/// Constant liveness response; no auth, no dependencies, no failure mode.
pub async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
