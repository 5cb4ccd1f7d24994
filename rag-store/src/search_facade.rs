//! Thin adapter around the Azure AI Search REST API.
//!
//! This facade concentrates all HTTP interactions behind a minimal API,
//! keeping the rest of the crate decoupled from wire payloads:
//! - POST {endpoint}/indexes/{index}/docs/search?api-version={v}
//! - header `api-key`
//! - body `{ search?, select, top, vectorQueries? }`

use std::time::{Duration, Instant};

use reqwest::header;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, error, info};

use crate::config::SearchConfig;
use crate::errors::RagError;
use crate::record::{QueryKind, SearchHit, SearchQuery, VectorQuery};

/// A facade over one search index.
#[derive(Debug)]
pub struct AzureSearchFacade {
    client: reqwest::Client,
    url: String,
    index: String,
    vector_field: String,
    timeout: Duration,
}

impl AzureSearchFacade {
    /// Creates a new facade from the given configuration.
    ///
    /// # Errors
    /// `RagError::Config` for invalid values, `RagError::Transport` if the
    /// HTTP client cannot be built.
    pub fn new(cfg: &SearchConfig) -> Result<Self, RagError> {
        cfg.validate()?;

        let mut headers = header::HeaderMap::new();
        headers.insert(
            "api-key",
            header::HeaderValue::from_str(cfg.api_key.trim())
                .map_err(|e| RagError::Config(format!("invalid api key header: {e}")))?,
        );

        let timeout = Duration::from_secs(cfg.timeout_secs);
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        info!(
            index = %cfg.index_name,
            endpoint = %cfg.endpoint,
            api_version = %cfg.api_version,
            "search facade initialized"
        );

        Ok(Self {
            client,
            url: cfg.search_url(),
            index: cfg.index_name.trim().to_string(),
            vector_field: cfg.vector_field.clone(),
            timeout,
        })
    }

    pub fn index(&self) -> &str {
        &self.index
    }

    /// Executes one search request and returns the documents in service order.
    pub async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchHit>, RagError> {
        let started = Instant::now();
        let body = SearchRequest::from_query(query, &self.vector_field);

        debug!(
            index = %self.index,
            mode = %query.mode(),
            top = query.top_k,
            "POST {}", self.url
        );

        let resp = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    RagError::Timeout(self.timeout)
                } else {
                    RagError::Transport(e)
                }
            })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            let err = RagError::from_status(status, self.url.clone(), &self.index, &text);
            error!(
                %status,
                index = %self.index,
                latency_ms = started.elapsed().as_millis(),
                error = %err,
                "search returned non-success status"
            );
            return Err(err);
        }

        let out: SearchResponse = resp
            .json()
            .await
            .map_err(|e| RagError::Decode(format!("{e}; expected `value[]` documents")))?;

        let hits: Vec<SearchHit> = out
            .value
            .into_iter()
            .map(|doc| SearchHit::from_document(doc.score, doc.fields))
            .collect();

        info!(
            index = %self.index,
            mode = %query.mode(),
            hits = hits.len(),
            latency_ms = started.elapsed().as_millis(),
            "search completed"
        );

        Ok(hits)
    }
}

/* ---------------------------- wire payloads ---------------------------- */

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    search: Option<&'a str>,
    select: String,
    top: usize,
    #[serde(rename = "vectorQueries", skip_serializing_if = "Vec::is_empty")]
    vector_queries: Vec<VectorPayload<'a>>,
}

#[derive(Debug, Serialize)]
struct VectorPayload<'a> {
    kind: &'static str,
    vector: &'a [f32],
    k: usize,
    fields: &'a str,
}

impl<'a> SearchRequest<'a> {
    fn from_query(query: &'a SearchQuery, vector_field: &'a str) -> Self {
        let vector = |v: &'a VectorQuery| VectorPayload {
            kind: "vector",
            vector: &v.vector,
            k: v.k_nearest_neighbors,
            fields: vector_field,
        };

        let (search, vector_queries) = match &query.kind {
            QueryKind::Keyword { text } => (Some(text.as_str()), Vec::new()),
            QueryKind::Vector(v) => (None, vec![vector(v)]),
            QueryKind::Hybrid { text, vector: v } => (Some(text.as_str()), vec![vector(v)]),
        };

        Self {
            search,
            select: query.select.join(","),
            top: query.top_k,
            vector_queries,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    value: Vec<SearchDocument>,
}

#[derive(Debug, Deserialize)]
struct SearchDocument {
    #[serde(rename = "@search.score", default)]
    score: f32,
    #[serde(flatten)]
    fields: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn vq() -> VectorQuery {
        VectorQuery {
            vector: vec![0.5, 0.25],
            k_nearest_neighbors: 50,
        }
    }

    #[test]
    fn keyword_body_has_no_vector_queries() {
        let q = SearchQuery::keyword("dental", 3);
        let body = serde_json::to_value(SearchRequest::from_query(&q, "text_vector")).unwrap();
        assert_eq!(
            body,
            json!({"search": "dental", "select": "title,chunk", "top": 3})
        );
    }

    #[test]
    fn vector_body_has_no_search_text() {
        let q = SearchQuery::vector(vq(), 5).select(["chunk"]);
        let body = serde_json::to_value(SearchRequest::from_query(&q, "text_vector")).unwrap();
        assert_eq!(
            body,
            json!({
                "select": "chunk",
                "top": 5,
                "vectorQueries": [{"kind": "vector", "vector": [0.5, 0.25], "k": 50, "fields": "text_vector"}]
            })
        );
    }

    #[test]
    fn hybrid_body_carries_both() {
        let q = SearchQuery::hybrid("dental", vq(), 3);
        let body = serde_json::to_value(SearchRequest::from_query(&q, "embedding")).unwrap();
        assert_eq!(body["search"], "dental");
        assert_eq!(body["vectorQueries"][0]["fields"], "embedding");
    }
}
