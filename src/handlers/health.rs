//! Health check handler

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    model_source: String,
    threshold: f64,
    database: &'static str,
    timestamp: i64,
}

/// Always succeeds once the process is serving traffic; a missing model is
/// fatal at startup, so reaching this handler implies the model is loaded.
pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        model_source: state.model_source.clone(),
        threshold: state.scorer.threshold(),
        database: if state.scorer.audit_enabled() {
            "enabled"
        } else {
            "disabled"
        },
        timestamp: chrono::Utc::now().timestamp(),
    })
}
