use axum::Json;
use serde_json::{Value, json};

/// Liveness probe. Touches neither the store nor the completion provider.
pub async fn handler() -> Json<Value> {
  Json(json!({ "status": "ok" }))
}
