//! Public API types re-used by external crates (e.g., the HTTP API layer).

use rag_store::{SearchHit, SearchMode};
use serde::Serialize;

/// Options that control retrieval and generation for a single question.
///
/// # Example
/// ```
/// use contextor::AskOptions;
/// use rag_store::SearchMode;
///
/// let opts = AskOptions { mode: SearchMode::Keyword, ..AskOptions::default() };
/// assert_eq!(opts.top_k, 3);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AskOptions {
    /// How the question is matched against the index.
    pub mode: SearchMode,
    /// Results handed to the prompt assembler.
    pub top_k: usize,
    /// Width of the vector neighbour search (vector/hybrid only).
    pub k_nearest_neighbors: usize,
    /// Completion cap; the answer may be cut at this length.
    pub max_tokens: Option<u32>,
}

impl Default for AskOptions {
    fn default() -> Self {
        Self {
            mode: SearchMode::Hybrid,
            top_k: crate::cfg::DEFAULT_TOP_K,
            k_nearest_neighbors: crate::cfg::DEFAULT_K_NEAREST,
            max_tokens: Some(crate::cfg::DEFAULT_MAX_TOKENS),
        }
    }
}

/// A compact record of a source that was fed to the LLM.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UsedChunk {
    pub score: f32,
    pub title: String,
    /// Content preview (at most 200 chars).
    pub preview: String,
}

impl From<&SearchHit> for UsedChunk {
    fn from(hit: &SearchHit) -> Self {
        Self {
            score: hit.score,
            title: hit.title.clone(),
            preview: hit.preview(200),
        }
    }
}

/// Final answer together with the sources passed to the model.
///
/// # Example
/// ```
/// use contextor::{QaAnswer, UsedChunk};
/// let qa = QaAnswer {
///     answer: "The Standard plan covers medical and vision.".into(),
///     context: vec![UsedChunk {
///         score: 0.03,
///         title: "Benefit_Options.pdf".into(),
///         preview: "Northwind Standard...".into(),
///     }],
/// };
/// assert!(!qa.answer.is_empty());
/// ```
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct QaAnswer {
    pub answer: String,
    pub context: Vec<UsedChunk>,
}
