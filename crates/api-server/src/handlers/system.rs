use crate::AppState;
use axum::extract::State;
use axum::response::{IntoResponse, Json};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct StatusResponse {
    message: String,
    version: String,
    backend: String,
}

pub async fn system_status(State(state): State<AppState>) -> impl IntoResponse {
    Json(StatusResponse {
        message: "Portfolio API server is running".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        backend: state.app.backend().to_string(),
    })
}

pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}
