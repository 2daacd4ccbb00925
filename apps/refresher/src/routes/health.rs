use axum::Json;
use chrono::{SecondsFormat, Utc};
use serde_json::{json, Value};

/// GET / and GET /health
/// Always succeeds while the process is up.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "running",
        "message": "Naukri resume refresh server is active",
        "time": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
    }))
}
