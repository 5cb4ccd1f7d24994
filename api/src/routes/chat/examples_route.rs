//! GET /api/examples: starter questions for the chat box.

use axum::{http::StatusCode, response::Response};
use contextor::driver::ui::EXAMPLE_QUESTIONS;
use serde::Serialize;

use crate::core::http::response_envelope::ApiResponse;

#[derive(Debug, Serialize)]
pub struct ExamplesResponse {
    pub examples: &'static [&'static str],
}

pub async fn examples() -> Response {
    ApiResponse::success(ExamplesResponse {
        examples: EXAMPLE_QUESTIONS,
    })
    .into_response_with_status(StatusCode::OK)
}
