//! POST /api/ask: grounded answer plus the sources it was built from.

use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::Response,
};
use tracing::info;

use crate::{
    core::{app_state::AppState, http::response_envelope::ApiResponse},
    error_handler::{AppError, AppResult},
    routes::ask::ask_request::AskRequest,
};

/// Handler: POST /api/ask
///
/// Pipeline failures map to an error envelope; there is no demo fallback here.
///
/// # Example
/// ```bash
/// curl -X POST http://127.0.0.1:8080/api/ask \
///   -H 'content-type: application/json' \
///   -d '{"question":"What are the benefits of the Northwind Standard plan?"}'
/// ```
pub async fn ask_question(
    State(state): State<Arc<AppState>>,
    body: Result<Json<AskRequest>, JsonRejection>,
) -> AppResult<Response> {
    let Json(body) = body?;
    let question = body.question.trim();
    if question.is_empty() {
        return Err(AppError::BadRequest("question must not be empty".into()));
    }

    let qa = state.pipeline.ask(question).await?;
    info!(sources = qa.context.len(), "ask answered");

    Ok(ApiResponse::success(qa).into_response_with_status(StatusCode::OK))
}
