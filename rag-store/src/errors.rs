//! Unified error types for the crate.

use std::time::Duration;

use ai_llm_service::AiLlmError;
use thiserror::Error;

/// Top-level error for rag-store operations.
#[derive(Debug, Error)]
pub enum RagError {
    /// Invalid or unsupported configuration.
    #[error("config error: {0}")]
    Config(String),

    /// Connection-level failure talking to the search service.
    #[error("search transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Search request exceeded the configured timeout.
    #[error("search timed out after {0:?}")]
    Timeout(Duration),

    /// The search service rejected the api key (401/403).
    #[error("search unauthorized (HTTP {status}): {snippet}")]
    Unauthorized { status: u16, snippet: String },

    /// The index does not exist on this service.
    #[error("search index `{0}` not found")]
    IndexNotFound(String),

    /// Any other non-successful HTTP status.
    #[error("search HTTP {status} from {url}: {snippet}")]
    HttpStatus {
        status: u16,
        url: String,
        snippet: String,
    },

    /// Response payload could not be decoded.
    #[error("search decode error: {0}")]
    Decode(String),

    /// Embedding length differs from what the index expects.
    #[error("vector size mismatch: got {got}, want {want}")]
    VectorSizeMismatch { got: usize, want: usize },

    /// The query embedding could not be computed.
    #[error("embedding error: {0}")]
    Embedding(#[from] AiLlmError),
}

impl RagError {
    /// Classifies a non-success search response.
    pub(crate) fn from_status(status: reqwest::StatusCode, url: String, index: &str, body: &str) -> Self {
        let snippet = ai_llm_service::error_handler::make_snippet(body);
        match status.as_u16() {
            401 | 403 => RagError::Unauthorized {
                status: status.as_u16(),
                snippet,
            },
            404 => RagError::IndexNotFound(index.to_string()),
            code => RagError::HttpStatus {
                status: code,
                url,
                snippet,
            },
        }
    }

    /// `true` when a credential was rejected, by search or by the embedding deployment.
    pub fn is_unauthorized(&self) -> bool {
        match self {
            RagError::Unauthorized { .. } => true,
            RagError::Embedding(e) => e.is_unauthorized(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn statuses_map_to_variants() {
        let e = RagError::from_status(StatusCode::FORBIDDEN, "u".into(), "idx", "denied");
        assert!(e.is_unauthorized());

        let e = RagError::from_status(StatusCode::NOT_FOUND, "u".into(), "idx", "");
        assert!(matches!(e, RagError::IndexNotFound(ref i) if i == "idx"));

        let e = RagError::from_status(StatusCode::BAD_GATEWAY, "u".into(), "idx", "oops");
        assert!(matches!(e, RagError::HttpStatus { status: 502, .. }));
    }
}
