//! GET /health: live probes of search and completion.

use std::sync::Arc;

use ai_llm_service::HealthStatus;
use axum::{extract::State, http::StatusCode, response::Response};
use serde::Serialize;

use crate::core::{app_state::AppState, http::response_envelope::ApiResponse};

#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub ok: bool,
    pub services: Vec<HealthStatus>,
}

/// 200 when every probe passes, 503 otherwise. The body lists each probe.
pub async fn health(State(state): State<Arc<AppState>>) -> Response {
    let services = state.diagnostics.check_connections().await;
    let ok = services.iter().all(|s| s.ok);
    let status = if ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    ApiResponse::success(HealthReport { ok, services }).into_response_with_status(status)
}
