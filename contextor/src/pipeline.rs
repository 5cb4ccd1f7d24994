//! The RAG pipeline and the plain-chat responder.
//!
//! Query flow: question → (embedding) → search → grounded prompt → completion.
//! Every stage waits for the previous one; gateways are injected as trait
//! objects so tests can swap in doubles.

use std::{future::Future, pin::Pin, sync::Arc};

use ai_llm_service::{ChatCompletion, ChatMessage, GenerationParams};
use rag_store::{EmbeddingsProvider, RagQuery, SearchBackend, SearchHit};
use tracing::{debug, info, instrument};

use crate::{
    api_types::{AskOptions, QaAnswer, UsedChunk},
    error::ContextorError,
    progress::{NoopProgress, Progress},
    prompt,
};

/// Anything that turns one user message into one reply.
///
/// Drivers (single-shot, loop, UI) only see this seam.
pub trait Responder: Send + Sync {
    fn respond<'a>(
        &'a self,
        message: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, ContextorError>> + Send + 'a>>;
}

/// Grounded question answering over one index.
pub struct RagPipeline {
    search: Arc<dyn SearchBackend>,
    embedder: Arc<dyn EmbeddingsProvider>,
    chat: Arc<dyn ChatCompletion>,
    opts: AskOptions,
    progress: Arc<dyn Progress>,
}

impl RagPipeline {
    pub fn new(
        search: Arc<dyn SearchBackend>,
        embedder: Arc<dyn EmbeddingsProvider>,
        chat: Arc<dyn ChatCompletion>,
        opts: AskOptions,
    ) -> Self {
        Self {
            search,
            embedder,
            chat,
            opts,
            progress: Arc::new(NoopProgress),
        }
    }

    /// Reports each stage to `progress` (e.g. a CLI spinner).
    pub fn with_progress(mut self, progress: Arc<dyn Progress>) -> Self {
        self.progress = progress;
        self
    }

    pub fn options(&self) -> AskOptions {
        self.opts
    }

    /// Embeds (when the mode needs it) and searches.
    ///
    /// # Errors
    /// `EmbeddingUnavailable`, `SearchUnavailable`, `Unauthorized` or
    /// `DeploymentNotFound`, classified from the gateway error.
    pub async fn retrieve(&self, question: &str) -> Result<Vec<SearchHit>, ContextorError> {
        let query = RagQuery {
            text: question,
            mode: self.opts.mode,
            top_k: self.opts.top_k,
            k_nearest_neighbors: self.opts.k_nearest_neighbors,
        };
        let hits = rag_store::rag_context(self.search.as_ref(), self.embedder.as_ref(), query)
            .await
            .map_err(ContextorError::from_retrieval)?;
        debug!(hits = hits.len(), mode = %self.opts.mode, "retrieved sources");
        Ok(hits)
    }

    /// Answers `question` from retrieved sources with deterministic sampling.
    ///
    /// # Errors
    /// Any retrieval error, or a classified completion error.
    #[instrument(skip_all, fields(mode = %self.opts.mode, top_k = self.opts.top_k))]
    pub async fn ask(&self, question: &str) -> Result<QaAnswer, ContextorError> {
        self.progress.message("searching documents");
        let hits = match self.retrieve(question).await {
            Ok(hits) => hits,
            Err(e) => {
                self.progress.finish("failed");
                return Err(e);
            }
        };

        self.progress.step("building prompt");
        let grounded = prompt::build_grounded_prompt(question, &hits);
        let messages = [ChatMessage::user(grounded)];

        self.progress.step("generating answer");
        let answer = self
            .chat
            .complete(&messages, GenerationParams::grounded(self.opts.max_tokens))
            .await
            .map_err(ContextorError::from_completion);
        self.progress.finish("done");
        let answer = answer?;

        info!(sources = hits.len(), answer_len = answer.len(), "grounded answer ready");

        Ok(QaAnswer {
            answer,
            context: hits.iter().map(UsedChunk::from).collect(),
        })
    }
}

impl Responder for RagPipeline {
    fn respond<'a>(
        &'a self,
        message: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, ContextorError>> + Send + 'a>> {
        Box::pin(async move { Ok(self.ask(message).await?.answer) })
    }
}

/// Free-form chat without retrieval: fixed system message, one user turn.
pub struct DirectChat {
    chat: Arc<dyn ChatCompletion>,
    system: String,
    params: GenerationParams,
}

impl DirectChat {
    /// Helpful-assistant persona with conversational sampling
    /// (temperature 0.7, 500 tokens, top_p 0.95).
    pub fn new(chat: Arc<dyn ChatCompletion>) -> Self {
        Self {
            chat,
            system: prompt::PLAIN_CHAT_SYSTEM.to_string(),
            params: GenerationParams::conversational(),
        }
    }
}

impl Responder for DirectChat {
    fn respond<'a>(
        &'a self,
        message: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, ContextorError>> + Send + 'a>> {
        Box::pin(async move {
            let messages = [
                ChatMessage::system(self.system.as_str()),
                ChatMessage::user(message),
            ];
            self.chat
                .complete(&messages, self.params)
                .await
                .map_err(ContextorError::from_completion)
        })
    }
}
