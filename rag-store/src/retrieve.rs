//! Retrieval helpers: result ranking and high-level RAG context.

use std::cmp::Ordering;

use tracing::trace;

use crate::embed::EmbeddingsProvider;
use crate::errors::RagError;
use crate::record::{SearchHit, SearchMode, SearchQuery, VectorQuery};
use crate::SearchBackend;

/// Parameters for turning a question into ranked context.
#[derive(Clone, Copy, Debug)]
pub struct RagQuery<'a> {
    pub text: &'a str,
    pub mode: SearchMode,
    pub top_k: usize,
    pub k_nearest_neighbors: usize,
}

/// Orders hits by non-increasing score and keeps at most `top_k`.
/// NaN scores sort last.
pub fn rank_hits(mut hits: Vec<SearchHit>, top_k: usize) -> Vec<SearchHit> {
    hits.sort_by(|a, b| match (a.score.is_nan(), b.score.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal),
    });
    hits.truncate(top_k);
    hits
}

/// Builds the search request for `query`, embedding the text when the mode needs it.
///
/// # Errors
/// `RagError::Embedding` if the embedding call fails.
pub async fn build_query(
    query: RagQuery<'_>,
    provider: &dyn EmbeddingsProvider,
) -> Result<SearchQuery, RagError> {
    if !query.mode.needs_embedding() {
        return Ok(SearchQuery::keyword(query.text, query.top_k));
    }

    let vector = VectorQuery {
        vector: provider.embed(query.text).await?,
        k_nearest_neighbors: query.k_nearest_neighbors,
    };
    trace!(dim = vector.vector.len(), "query embedded");

    Ok(match query.mode {
        SearchMode::Vector => SearchQuery::vector(vector, query.top_k),
        _ => SearchQuery::hybrid(query.text, vector, query.top_k),
    })
}

/// Embeds (if needed) and searches, returning at most `top_k` ranked hits.
///
/// # Errors
/// Returns embedding errors or search failures.
pub async fn rag_context(
    backend: &dyn SearchBackend,
    provider: &dyn EmbeddingsProvider,
    query: RagQuery<'_>,
) -> Result<Vec<SearchHit>, RagError> {
    trace!(
        mode = %query.mode,
        top_k = query.top_k,
        "retrieve::rag_context"
    );

    let request = build_query(query, provider).await?;
    let hits = backend.search(&request).await?;
    let ranked = rank_hits(hits, query.top_k);

    trace!(hits = ranked.len(), "retrieve::rag_context done");
    Ok(ranked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::QueryKind;
    use serde_json::Map;
    use std::{future::Future, pin::Pin, sync::Mutex};

    fn hit(score: f32, title: &str) -> SearchHit {
        SearchHit {
            score,
            title: title.to_string(),
            content: format!("content of {title}"),
            fields: Map::new(),
        }
    }

    struct FixedEmbedder;

    impl EmbeddingsProvider for FixedEmbedder {
        fn embed<'a>(
            &'a self,
            _text: &'a str,
        ) -> Pin<Box<dyn Future<Output = Result<Vec<f32>, RagError>> + Send + 'a>> {
            Box::pin(async { Ok(vec![1.0, 0.0]) })
        }
    }

    /// Returns canned hits in scrambled order and remembers the last request.
    struct Recorder {
        last: Mutex<Option<SearchQuery>>,
    }

    impl SearchBackend for Recorder {
        fn search<'a>(
            &'a self,
            query: &'a SearchQuery,
        ) -> Pin<Box<dyn Future<Output = Result<Vec<SearchHit>, RagError>> + Send + 'a>> {
            Box::pin(async move {
                *self.last.lock().unwrap() = Some(query.clone());
                Ok(vec![hit(0.2, "c"), hit(0.9, "a"), hit(0.5, "b"), hit(0.1, "d")])
            })
        }

        fn ping<'a>(&'a self) -> Pin<Box<dyn Future<Output = Result<(), RagError>> + Send + 'a>> {
            Box::pin(async { Ok(()) })
        }
    }

    #[test]
    fn ranking_is_non_increasing_and_truncated() {
        let ranked = rank_hits(
            vec![hit(0.1, "x"), hit(f32::NAN, "n"), hit(0.7, "y"), hit(0.3, "z")],
            3,
        );
        let titles: Vec<_> = ranked.iter().map(|h| h.title.as_str()).collect();
        assert_eq!(titles, ["y", "z", "x"]);
    }

    #[tokio::test]
    async fn hybrid_context_returns_at_most_k_sorted() {
        let backend = Recorder {
            last: Mutex::new(None),
        };
        let hits = rag_context(
            &backend,
            &FixedEmbedder,
            RagQuery {
                text: "What does the Northwind Health Plus plan cover?",
                mode: SearchMode::Hybrid,
                top_k: 3,
                k_nearest_neighbors: 50,
            },
        )
        .await
        .unwrap();

        assert_eq!(hits.len(), 3);
        assert!(hits.windows(2).all(|w| w[0].score >= w[1].score));

        let sent = backend.last.lock().unwrap().clone().unwrap();
        assert!(matches!(sent.kind, QueryKind::Hybrid { ref vector, .. } if vector.k_nearest_neighbors == 50));
    }

    #[tokio::test]
    async fn keyword_mode_skips_embedding() {
        struct Failing;
        impl EmbeddingsProvider for Failing {
            fn embed<'a>(
                &'a self,
                _text: &'a str,
            ) -> Pin<Box<dyn Future<Output = Result<Vec<f32>, RagError>> + Send + 'a>> {
                Box::pin(async { Err(RagError::Config("not expected".into())) })
            }
        }

        let q = build_query(
            RagQuery {
                text: "dental",
                mode: SearchMode::Keyword,
                top_k: 2,
                k_nearest_neighbors: 50,
            },
            &Failing,
        )
        .await
        .unwrap();
        assert_eq!(q, SearchQuery::keyword("dental", 2));
    }
}
