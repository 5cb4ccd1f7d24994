//! Embedding abstraction for vector and hybrid queries.

use crate::errors::RagError;
use std::{future::Future, pin::Pin};

/// Provider interface for query embeddings.
///
/// Async because real providers perform HTTP requests. Implement this trait
/// to plug in another backend or a test double.
pub trait EmbeddingsProvider: Send + Sync {
    /// Async embedding function.
    fn embed<'a>(
        &'a self,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<f32>, RagError>> + Send + 'a>>;
}

pub mod azure;
