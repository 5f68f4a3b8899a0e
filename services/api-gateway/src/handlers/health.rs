use axum::{extract::State, response::Json};
use serde_json::{json, Value};

use crate::AppState;

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "orderdesk-api-gateway",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

pub async fn detailed_health_check(State(state): State<AppState>) -> Json<Value> {
    let store_status = match state.store.health_check().await {
        Ok(_) => json!({"status": "healthy", "message": "Connected"}),
        Err(e) => json!({"status": "unhealthy", "message": e.to_string()}),
    };
    let overall = if store_status["status"] == "healthy" {
        "healthy"
    } else {
        "degraded"
    };

    Json(json!({
        "status": overall,
        "service": "orderdesk-api-gateway",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
        "storage_backend": state.config.database.backend,
        "import_schema": state.imports.schema_name(),
        "checks": {
            "order_store": store_status
        }
    }))
}

pub async fn metrics_handler() -> String {
    crate::metrics::render()
}
