//! High-level retrieval facade over Azure AI Search.
//!
//! This crate provides a clean API to:
//! - Run keyword, vector or hybrid queries against one index
//! - Build ranked top‑K context for a textual question (embedding it when needed)
//!
//! The design is flat (no deep nesting) and splits responsibilities into focused modules.

mod config;
mod embed;
mod errors;
mod record;
mod retrieve;
mod search_facade;

pub use config::{DEFAULT_SEARCH_API_VERSION, DEFAULT_VECTOR_FIELD, SearchConfig};
pub use embed::{EmbeddingsProvider, azure::AzureEmbedder};
pub use errors::RagError;
pub use record::{DEFAULT_SELECT, QueryKind, SearchHit, SearchMode, SearchQuery, VectorQuery};
pub use retrieve::{RagQuery, build_query, rag_context, rank_hits};

use std::{future::Future, pin::Pin};

use tracing::{debug, trace};

/// Anything that can answer a [`SearchQuery`].
///
/// Implemented by [`RagStore`]; pipelines hold it as a trait object so tests
/// can substitute canned results.
pub trait SearchBackend: Send + Sync {
    /// Runs one query; results are in service order.
    fn search<'a>(
        &'a self,
        query: &'a SearchQuery,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<SearchHit>, RagError>> + Send + 'a>>;

    /// Cheap reachability check (one-result keyword search).
    fn ping<'a>(&'a self) -> Pin<Box<dyn Future<Output = Result<(), RagError>> + Send + 'a>>;
}

/// High-level facade that wires configuration and the search client.
///
/// This is the single entry point recommended for application code.
#[derive(Debug)]
pub struct RagStore {
    cfg: SearchConfig,
    client: search_facade::AzureSearchFacade,
}

impl RagStore {
    /// Constructs a new store from the given configuration.
    ///
    /// # Errors
    /// Returns `RagError::Config` if the configuration is invalid.
    pub fn new(cfg: SearchConfig) -> Result<Self, RagError> {
        trace!("RagStore::new index={}", cfg.index_name);
        let client = search_facade::AzureSearchFacade::new(&cfg)?;
        Ok(Self { cfg, client })
    }

    pub fn config(&self) -> &SearchConfig {
        &self.cfg
    }

    /// Runs one query and returns at most `top_k` hits, best first.
    ///
    /// # Errors
    /// Transport, auth, status and decode failures as [`RagError`].
    pub async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchHit>, RagError> {
        let hits = self.client.search(query).await?;
        Ok(rank_hits(hits, query.top_k))
    }

    /// One-result keyword search for `"test"`.
    pub async fn ping(&self) -> Result<(), RagError> {
        let hits = self
            .client
            .search(&SearchQuery::keyword("test", 1))
            .await?;
        debug!(index = %self.client.index(), hits = hits.len(), "search ping ok");
        Ok(())
    }
}

impl SearchBackend for RagStore {
    fn search<'a>(
        &'a self,
        query: &'a SearchQuery,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<SearchHit>, RagError>> + Send + 'a>> {
        Box::pin(RagStore::search(self, query))
    }

    fn ping<'a>(&'a self) -> Pin<Box<dyn Future<Output = Result<(), RagError>> + Send + 'a>> {
        Box::pin(RagStore::ping(self))
    }
}
