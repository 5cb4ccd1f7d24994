//! POST /api/chat: the chat-UI callback over HTTP.

use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use tracing::debug;

use crate::{
    core::app_state::AppState,
    error_handler::{AppError, AppResult},
    routes::chat::chat_request::{ChatRequest, ChatResponse},
};

/// Handler: POST /api/chat
///
/// Always 200 for a well-formed message: remote failures come back as the
/// demo-mode reply, quoting the message as sent.
pub async fn chat(
    State(state): State<Arc<AppState>>,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> AppResult<Json<ChatResponse>> {
    let Json(body) = body?;
    if body.message.trim().is_empty() {
        return Err(AppError::BadRequest("message must not be empty".into()));
    }

    debug!(history = body.history.len(), "chat request");
    let reply = state.ui.respond(&body.message).await;
    Ok(Json(ChatResponse { reply }))
}
