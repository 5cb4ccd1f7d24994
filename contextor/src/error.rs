//! Typed error for the contextor crate.
//!
//! Gateway errors ([`AiLlmError`], [`RagError`]) are classified here by
//! variant into the small taxonomy drivers show to users.

use ai_llm_service::{AiLlmError, ConfigError};
use rag_store::RagError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContextorError {
    /// A required setting is absent or blank.
    #[error("missing required configuration value: {0}")]
    ConfigMissing(String),

    /// A setting is present but malformed (number, URL, mode).
    #[error("invalid configuration: {0}")]
    ConfigInvalid(String),

    /// Search service unreachable, failing, or returning garbage.
    #[error("search unavailable: {0}")]
    SearchUnavailable(#[source] RagError),

    /// The query embedding could not be computed.
    #[error("embedding unavailable: {0}")]
    EmbeddingUnavailable(#[source] RagError),

    /// Completion endpoint unreachable, failing, or returning no text.
    #[error("completion unavailable: {0}")]
    CompletionUnavailable(#[source] AiLlmError),

    /// The named deployment does not exist on the resource.
    #[error("deployment `{0}` not found")]
    DeploymentNotFound(String),

    /// Credentials were rejected by the named service.
    #[error("{service} rejected the credentials: {detail}")]
    Unauthorized {
        service: &'static str,
        detail: String,
    },
}

impl ContextorError {
    /// Classifies a failed completion call.
    pub fn from_completion(err: AiLlmError) -> Self {
        if let Some(deployment) = err.missing_deployment() {
            return ContextorError::DeploymentNotFound(deployment.to_string());
        }
        if err.is_unauthorized() {
            return ContextorError::Unauthorized {
                service: "Azure OpenAI",
                detail: err.to_string(),
            };
        }
        match err {
            AiLlmError::Config(cfg) => config_error(cfg),
            other => ContextorError::CompletionUnavailable(other),
        }
    }

    /// Classifies a failed retrieval (embedding + search).
    pub fn from_retrieval(err: RagError) -> Self {
        match err {
            RagError::Embedding(inner) => {
                if let Some(deployment) = inner.missing_deployment() {
                    ContextorError::DeploymentNotFound(deployment.to_string())
                } else if inner.is_unauthorized() {
                    ContextorError::Unauthorized {
                        service: "Azure OpenAI",
                        detail: inner.to_string(),
                    }
                } else {
                    ContextorError::EmbeddingUnavailable(RagError::Embedding(inner))
                }
            }
            RagError::VectorSizeMismatch { .. } => ContextorError::EmbeddingUnavailable(err),
            RagError::Unauthorized { .. } => ContextorError::Unauthorized {
                service: "Azure AI Search",
                detail: err.to_string(),
            },
            RagError::Config(msg) => ContextorError::ConfigInvalid(msg),
            other => ContextorError::SearchUnavailable(other),
        }
    }

    /// `true` for startup problems that no retry can fix.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            ContextorError::ConfigMissing(_) | ContextorError::ConfigInvalid(_)
        )
    }

    /// One-line message suitable for end users.
    pub fn user_message(&self) -> String {
        match self {
            ContextorError::ConfigMissing(var) => format!(
                "{var} is not set. Add it to your environment or .env file and try again."
            ),
            ContextorError::ConfigInvalid(detail) => {
                format!("Configuration problem: {detail}.")
            }
            ContextorError::DeploymentNotFound(name) => format!(
                "Model deployment '{name}' not found. Please check your model deployment name in Azure OpenAI Studio."
            ),
            ContextorError::Unauthorized { service, .. } => {
                format!("Authentication failed for {service}. Please check your API key.")
            }
            ContextorError::SearchUnavailable(RagError::Transport(e)) => format!(
                "Connection error: {e}. Please check your search endpoint URL and internet connection."
            ),
            ContextorError::CompletionUnavailable(AiLlmError::HttpTransport(e)) => format!(
                "Connection error: {e}. Please check your endpoint URL and internet connection."
            ),
            ContextorError::SearchUnavailable(e) => format!("Error searching documents: {e}"),
            ContextorError::EmbeddingUnavailable(e) => format!("Error embedding the question: {e}"),
            ContextorError::CompletionUnavailable(e) => format!("Error getting response: {e}"),
        }
    }
}

impl From<AiLlmError> for ContextorError {
    fn from(err: AiLlmError) -> Self {
        ContextorError::from_completion(err)
    }
}

impl From<RagError> for ContextorError {
    fn from(err: RagError) -> Self {
        ContextorError::from_retrieval(err)
    }
}

fn config_error(err: ConfigError) -> ContextorError {
    match err {
        ConfigError::MissingVar(var) => ContextorError::ConfigMissing(var.to_string()),
        other => ContextorError::ConfigInvalid(other.to_string()),
    }
}
