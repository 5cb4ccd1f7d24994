//! RAG orchestration over Azure AI Search and Azure OpenAI.
//!
//! - [`ContextorConfig`]: immutable settings read once from the environment.
//! - [`Gateways`]: the HTTP clients built from that config, created once.
//! - [`RagPipeline`]: question → (embedding) → search → grounded prompt → answer.
//! - [`driver`]: single-shot, interactive loop and chat-UI callback front ends.
//! - [`diagnostics`]: connection checks for search and completion.

mod api_types;
mod cfg;
pub mod diagnostics;
pub mod driver;
mod error;
mod pipeline;
mod progress;
pub mod prompt;

#[cfg(test)]
mod testing;

use std::sync::Arc;

pub use api_types::{AskOptions, QaAnswer, UsedChunk};
pub use cfg::{
    ContextorConfig, DEFAULT_API_ADDRESS, DEFAULT_K_NEAREST, DEFAULT_MAX_TOKENS, DEFAULT_TOP_K,
};
pub use error::ContextorError;
pub use pipeline::{DirectChat, RagPipeline, Responder};
pub use progress::{IndicatifProgress, NoopProgress, Progress};

use ai_llm_service::{AzureOpenAiService, LlmServiceProfiles};
use diagnostics::{Diagnostics, Targets};
use rag_store::{AzureEmbedder, RagStore};
use tracing::info;

/// Gateway clients for one configuration, shared by every driver.
pub struct Gateways {
    pub search: Arc<RagStore>,
    pub chat: Arc<AzureOpenAiService>,
    pub embedding: Arc<AzureOpenAiService>,
}

impl Gateways {
    /// Builds the search, chat and embedding clients. No network calls are made.
    ///
    /// # Errors
    /// `ConfigInvalid` if a client rejects its settings.
    pub fn connect(cfg: &ContextorConfig) -> Result<Self, ContextorError> {
        let search = Arc::new(RagStore::new(cfg.search.clone())?);
        let profiles = LlmServiceProfiles::new(cfg.chat.clone(), cfg.embedding.clone())?;

        info!(
            index = %cfg.search.index_name,
            chat = %cfg.chat.deployment,
            embedding = %cfg.embedding.deployment,
            "gateways ready"
        );

        Ok(Self {
            search,
            chat: profiles.chat(),
            embedding: profiles.embedding(),
        })
    }

    /// Grounded pipeline with the given knobs.
    pub fn pipeline(&self, opts: AskOptions) -> RagPipeline {
        RagPipeline::new(
            self.search.clone(),
            Arc::new(AzureEmbedder::new(self.embedding.clone())),
            self.chat.clone(),
            opts,
        )
    }

    /// Plain chat against the chat deployment.
    pub fn direct_chat(&self) -> DirectChat {
        DirectChat::new(self.chat.clone())
    }

    pub fn diagnostics(&self) -> Diagnostics {
        let search_cfg = self.search.config();
        Diagnostics::new(
            self.search.clone(),
            self.chat.clone(),
            Targets {
                search_endpoint: search_cfg.endpoint.clone(),
                index: search_cfg.index_name.clone(),
                openai_endpoint: self.chat.endpoint().to_string(),
                deployment: self.chat.deployment().to_string(),
            },
        )
    }
}

/// Loads config from the environment and answers one question.
///
/// # Example
/// ```no_run
/// # #[tokio::main] async fn main() {
/// let qa = contextor::ask("What are the benefits of the Northwind Standard plan?")
///     .await
///     .unwrap();
/// println!("{}", qa.answer);
/// # }
/// ```
pub async fn ask(question: &str) -> Result<QaAnswer, ContextorError> {
    let cfg = ContextorConfig::from_env()?;
    let gateways = Gateways::connect(&cfg)?;
    gateways.pipeline(cfg.ask_options()).ask(question).await
}
