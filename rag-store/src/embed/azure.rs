//! Azure OpenAI embedding provider.
//!
//! Delegates to the embedding deployment of [`AzureOpenAiService`] and
//! optionally checks the vector length against the index.

use std::{future::Future, pin::Pin, sync::Arc};

use ai_llm_service::AzureOpenAiService;
use tracing::warn;

use crate::{EmbeddingsProvider, RagError};

/// Embedding provider backed by an Azure OpenAI deployment.
#[derive(Clone)]
pub struct AzureEmbedder {
    svc: Arc<AzureOpenAiService>,
    dim: Option<usize>,
}

impl AzureEmbedder {
    pub fn new(svc: Arc<AzureOpenAiService>) -> Self {
        Self { svc, dim: None }
    }

    /// Rejects vectors whose length differs from `dim`
    /// (1536 for `text-embedding-ada-002`).
    pub fn with_dim(mut self, dim: usize) -> Self {
        self.dim = Some(dim);
        self
    }
}

impl EmbeddingsProvider for AzureEmbedder {
    fn embed<'a>(
        &'a self,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<f32>, RagError>> + Send + 'a>> {
        Box::pin(async move {
            let vector = self.svc.embeddings(text).await?;

            if let Some(want) = self.dim {
                if vector.len() != want {
                    warn!(
                        deployment = %self.svc.deployment(),
                        got = vector.len(),
                        want,
                        "embedding dimension mismatch"
                    );
                    return Err(RagError::VectorSizeMismatch {
                        got: vector.len(),
                        want,
                    });
                }
            }

            Ok(vector)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ai_llm_service::LlmModelConfig;
    use serde_json::json;
    use wiremock::{Mock, MockServer, ResponseTemplate, matchers::method};

    async fn embedder(server: &MockServer) -> AzureEmbedder {
        let svc = AzureOpenAiService::new(LlmModelConfig {
            deployment: "text-embedding-ada-002".into(),
            endpoint: server.uri(),
            api_key: "k".into(),
            api_version: "2024-02-15-preview".into(),
            timeout_secs: Some(5),
        })
        .unwrap();
        AzureEmbedder::new(Arc::new(svc))
    }

    #[tokio::test]
    async fn dimension_mismatch_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"data": [{"embedding": [0.1, 0.2]}]})),
            )
            .mount(&server)
            .await;

        let emb = embedder(&server).await.with_dim(1536);
        let err = emb.embed("dental").await.unwrap_err();
        assert!(matches!(err, RagError::VectorSizeMismatch { got: 2, want: 1536 }));
    }

    #[tokio::test]
    async fn upstream_auth_failure_surfaces_as_embedding_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = embedder(&server).await.embed("dental").await.unwrap_err();
        assert!(matches!(err, RagError::Embedding(_)));
        assert!(err.is_unauthorized());
    }
}
