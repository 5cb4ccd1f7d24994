//! Shared Azure OpenAI clients for the two roles: `chat` and `embedding`.
//!
//! - Lives in the same Tokio runtime as the application.
//! - Construct once, then hand out `Arc` clones of each client to dependents.
//! - Both clients are built eagerly so configuration problems surface at startup.
//!
//! # Example
//! ```no_run
//! use ai_llm_service::config::default_config::{config_azure_chat, config_azure_embedding};
//! use ai_llm_service::error_handler::process_env;
//! use ai_llm_service::service_profiles::LlmServiceProfiles;
//!
//! # async fn run() -> Result<(), ai_llm_service::AiLlmError> {
//! let profiles = LlmServiceProfiles::new(
//!     config_azure_chat(&process_env)?,
//!     config_azure_embedding(&process_env)?,
//! )?;
//! let vector = profiles.embedding().embeddings("dental coverage").await?;
//! println!("dim = {}", vector.len());
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use tracing::info;

use crate::{
    config::llm_model_config::LlmModelConfig, error_handler::AiLlmError,
    services::azure_openai_service::AzureOpenAiService,
};

/// Chat and embedding clients for one Azure OpenAI resource.
pub struct LlmServiceProfiles {
    chat: Arc<AzureOpenAiService>,
    embedding: Arc<AzureOpenAiService>,
}

impl LlmServiceProfiles {
    /// Builds both clients from explicit configs.
    ///
    /// # Errors
    /// Returns [`AiLlmError`] if either client rejects its config.
    pub fn new(chat: LlmModelConfig, embedding: LlmModelConfig) -> Result<Self, AiLlmError> {
        let chat = Arc::new(AzureOpenAiService::new(chat)?);
        let embedding = Arc::new(AzureOpenAiService::new(embedding)?);

        info!(
            chat = %chat.deployment(),
            embedding = %embedding.deployment(),
            "LLM service profiles ready"
        );

        Ok(Self { chat, embedding })
    }

    pub fn chat(&self) -> Arc<AzureOpenAiService> {
        Arc::clone(&self.chat)
    }

    pub fn embedding(&self) -> Arc<AzureOpenAiService> {
        Arc::clone(&self.embedding)
    }
}
