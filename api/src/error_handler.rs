use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use contextor::ContextorError;
use thiserror::Error;

use crate::core::http::response_envelope::ApiResponse;

/// Public application error type.
#[derive(Debug, Error)]
pub enum AppError {
    // --- IO / network / server ---
    #[error("failed to bind listener on {addr}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error")]
    Server(#[source] std::io::Error),

    // --- Request / routing ---
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Pipeline failure mapped to a specific status & code.
    #[error("{message}")]
    Http {
        status: StatusCode,
        code: &'static str,
        message: String,
    },
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Http { status, .. } => *status,
            AppError::Bind { .. } | AppError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            AppError::Bind { .. } => "BIND_ERROR",
            AppError::Server(_) => "SERVER_ERROR",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::Http { code, .. } => code,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        ApiResponse::<()>::error(self.error_code(), self.to_string(), Vec::new())
            .into_response_with_status(status)
    }
}

/// Handy result alias used across handlers.
pub type AppResult<T> = Result<T, AppError>;

impl From<axum::extract::rejection::JsonRejection> for AppError {
    fn from(err: axum::extract::rejection::JsonRejection) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

/// Maps the pipeline taxonomy onto HTTP statuses; the message is the
/// user-facing text.
impl From<ContextorError> for AppError {
    fn from(err: ContextorError) -> Self {
        let (status, code) = match &err {
            ContextorError::ConfigMissing(_) | ContextorError::ConfigInvalid(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "CONFIG_ERROR")
            }
            ContextorError::Unauthorized { .. } => (StatusCode::BAD_GATEWAY, "UPSTREAM_UNAUTHORIZED"),
            ContextorError::DeploymentNotFound(_) => (StatusCode::BAD_GATEWAY, "DEPLOYMENT_NOT_FOUND"),
            ContextorError::SearchUnavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "SEARCH_UNAVAILABLE"),
            ContextorError::EmbeddingUnavailable(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, "EMBEDDING_UNAVAILABLE")
            }
            ContextorError::CompletionUnavailable(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, "COMPLETION_UNAVAILABLE")
            }
        };
        AppError::Http {
            status,
            code,
            message: err.user_message(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_deployment_is_bad_gateway() {
        let err = AppError::from(ContextorError::DeploymentNotFound("gpt-4o".into()));
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(err.error_code(), "DEPLOYMENT_NOT_FOUND");
        assert!(err.to_string().contains("'gpt-4o'"));
    }
}
