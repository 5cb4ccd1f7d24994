//! Azure OpenAI service for chat completions and embeddings.
//!
//! Minimal, non-streaming client around the Azure OpenAI REST API.
//! Endpoints are derived from [`LlmModelConfig`]:
//! - POST {endpoint}/openai/deployments/{deployment}/chat/completions?api-version={v}
//! - POST {endpoint}/openai/deployments/{deployment}/embeddings?api-version={v}
//!
//! Constructor validation:
//! - `cfg.api_key` must be non-empty
//! - `cfg.endpoint` must start with http:// or https://
//! - `cfg.deployment` must be non-empty
//!
//! Errors are normalized via unified error types in `error_handler`.

use std::{
    future::Future,
    pin::Pin,
    time::{Duration, Instant},
};

use reqwest::header;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::{
    chat::{ChatCompletion, ChatMessage, GenerationParams},
    config::llm_model_config::LlmModelConfig,
    error_handler::{AiLlmError, ConfigError, ProviderError, ProviderErrorKind},
};

/// Thin client for one Azure OpenAI deployment.
///
/// Constructed from a complete [`LlmModelConfig`]. Internally keeps a
/// preconfigured `reqwest::Client` (with timeout and default headers), created
/// once and reused for every call.
#[derive(Debug)]
pub struct AzureOpenAiService {
    client: reqwest::Client,
    cfg: LlmModelConfig,
    timeout: Duration,
    url_chat: String,
    url_embeddings: String,
}

impl AzureOpenAiService {
    /// Creates a new [`AzureOpenAiService`] from the given config.
    ///
    /// # Errors
    /// - [`ProviderErrorKind::MissingApiKey`] if `cfg.api_key` is empty
    /// - [`ProviderErrorKind::InvalidEndpoint`] if `cfg.endpoint` is invalid
    /// - [`ConfigError::EmptyDeployment`] if `cfg.deployment` is empty
    /// - [`AiLlmError::HttpTransport`] if the HTTP client cannot be built
    pub fn new(cfg: LlmModelConfig) -> Result<Self, AiLlmError> {
        if cfg.deployment.trim().is_empty() {
            return Err(ConfigError::EmptyDeployment.into());
        }

        if cfg.api_key.trim().is_empty() {
            return Err(ProviderError::new(&cfg.deployment, ProviderErrorKind::MissingApiKey).into());
        }

        let endpoint = cfg.endpoint.trim();
        if endpoint.is_empty()
            || !(endpoint.starts_with("http://") || endpoint.starts_with("https://"))
        {
            return Err(ProviderError::new(
                &cfg.deployment,
                ProviderErrorKind::InvalidEndpoint(cfg.endpoint.clone()),
            )
            .into());
        }

        let timeout = cfg
            .timeout_secs
            .map(Duration::from_secs)
            .unwrap_or_else(|| Duration::from_secs(60));

        let mut headers = header::HeaderMap::new();
        headers.insert(
            "api-key",
            header::HeaderValue::from_str(cfg.api_key.trim()).map_err(|e| {
                ProviderError::new(
                    &cfg.deployment,
                    ProviderErrorKind::Decode(format!("invalid API key header: {e}")),
                )
            })?,
        );
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        let base = format!(
            "{}/openai/deployments/{}",
            endpoint.trim_end_matches('/'),
            cfg.deployment
        );
        let url_chat = format!("{base}/chat/completions?api-version={}", cfg.api_version);
        let url_embeddings = format!("{base}/embeddings?api-version={}", cfg.api_version);

        info!(
            deployment = %cfg.deployment,
            endpoint = %cfg.endpoint,
            api_version = %cfg.api_version,
            timeout_secs = timeout.as_secs(),
            "AzureOpenAiService initialized"
        );

        Ok(Self {
            client,
            cfg,
            timeout,
            url_chat,
            url_embeddings,
        })
    }

    /// Deployment this client talks to.
    pub fn deployment(&self) -> &str {
        &self.cfg.deployment
    }

    /// Resource endpoint as configured.
    pub fn endpoint(&self) -> &str {
        &self.cfg.endpoint
    }

    /// Performs a **non-streaming** chat completion.
    ///
    /// The message list is sent as-is; `temperature`, `top_p` and `max_tokens`
    /// come from `params` and are validated before any network call. A
    /// response cut at `max_tokens` is returned unchanged.
    ///
    /// # Errors
    /// - [`AiLlmError::Config`] if `params` are out of range
    /// - [`ProviderErrorKind::Unauthorized`] / [`ProviderErrorKind::DeploymentNotFound`]
    ///   / [`ProviderErrorKind::HttpStatus`] for non-2xx responses
    /// - [`AiLlmError::HttpTransport`] / [`AiLlmError::Timeout`] for network failures
    /// - [`ProviderErrorKind::Decode`] / [`ProviderErrorKind::EmptyChoices`] for bad payloads
    pub async fn complete(
        &self,
        messages: &[ChatMessage],
        params: GenerationParams,
    ) -> Result<String, AiLlmError> {
        params.validate()?;

        let started = Instant::now();
        let body = ChatCompletionRequest {
            messages,
            temperature: params.temperature,
            top_p: params.top_p,
            max_tokens: params.max_tokens,
        };

        debug!(
            deployment = %self.cfg.deployment,
            messages = messages.len(),
            temperature = params.temperature,
            max_tokens = ?params.max_tokens,
            "POST {}", self.url_chat
        );

        let resp = self
            .client
            .post(&self.url_chat)
            .json(&body)
            .send()
            .await
            .map_err(|e| AiLlmError::from_transport(e, self.timeout))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            let err =
                ProviderError::from_status(&self.cfg.deployment, status, self.url_chat.clone(), &text);

            error!(
                %status,
                deployment = %self.cfg.deployment,
                latency_ms = started.elapsed().as_millis(),
                error = %err,
                "chat completion returned non-success status"
            );
            return Err(err.into());
        }

        let out: ChatCompletionResponse = resp.json().await.map_err(|e| {
            error!(
                error = %e,
                deployment = %self.cfg.deployment,
                latency_ms = started.elapsed().as_millis(),
                "failed to decode chat completion response"
            );
            ProviderError::new(
                &self.cfg.deployment,
                ProviderErrorKind::Decode(format!(
                    "serde error: {e}; expected `choices[0].message.content`"
                )),
            )
        })?;

        let content = out
            .choices
            .into_iter()
            .find_map(|c| c.message.content)
            .ok_or_else(|| {
                ProviderError::new(&self.cfg.deployment, ProviderErrorKind::EmptyChoices)
            })?;

        info!(
            deployment = %self.cfg.deployment,
            latency_ms = started.elapsed().as_millis(),
            answer_len = content.len(),
            "chat completion completed"
        );

        Ok(content)
    }

    /// Retrieves a single embedding vector for `input`.
    ///
    /// # Errors
    /// Same classes as [`AzureOpenAiService::complete`]; an empty `data`
    /// array is a decode error.
    pub async fn embeddings(&self, input: &str) -> Result<Vec<f32>, AiLlmError> {
        let started = Instant::now();
        let body = EmbeddingsRequest { input };

        debug!(
            deployment = %self.cfg.deployment,
            input_len = input.len(),
            "POST {}", self.url_embeddings
        );

        let resp = self
            .client
            .post(&self.url_embeddings)
            .json(&body)
            .send()
            .await
            .map_err(|e| AiLlmError::from_transport(e, self.timeout))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            let err = ProviderError::from_status(
                &self.cfg.deployment,
                status,
                self.url_embeddings.clone(),
                &text,
            );

            error!(
                %status,
                deployment = %self.cfg.deployment,
                latency_ms = started.elapsed().as_millis(),
                error = %err,
                "embeddings returned non-success status"
            );
            return Err(err.into());
        }

        let out: EmbeddingsResponse = resp.json().await.map_err(|e| {
            ProviderError::new(
                &self.cfg.deployment,
                ProviderErrorKind::Decode(format!("serde error: {e}; expected `data[0].embedding`")),
            )
        })?;

        let first = out.data.into_iter().next().ok_or_else(|| {
            ProviderError::new(
                &self.cfg.deployment,
                ProviderErrorKind::Decode("empty `data` in embeddings response".into()),
            )
        })?;

        info!(
            deployment = %self.cfg.deployment,
            latency_ms = started.elapsed().as_millis(),
            dim = first.embedding.len(),
            "embeddings completed"
        );

        Ok(first.embedding)
    }
}

impl ChatCompletion for AzureOpenAiService {
    fn complete<'a>(
        &'a self,
        messages: &'a [ChatMessage],
        params: GenerationParams,
    ) -> Pin<Box<dyn Future<Output = Result<String, AiLlmError>> + Send + 'a>> {
        Box::pin(AzureOpenAiService::complete(self, messages, params))
    }
}

/* ===========================================================================
HTTP payloads
======================================================================== */

/// Request body for `chat/completions` (non-streaming). The deployment is in
/// the URL, so no `model` field is sent.
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    messages: &'a [ChatMessage],
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageOut,
}

#[derive(Debug, Deserialize)]
struct ChatMessageOut {
    content: Option<String>,
}

#[derive(Debug, Serialize)]
struct EmbeddingsRequest<'a> {
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingItem>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingItem {
    embedding: Vec<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{body_partial_json, header, method, path, query_param},
    };

    fn cfg(endpoint: &str) -> LlmModelConfig {
        LlmModelConfig {
            deployment: "gpt-4o".into(),
            endpoint: endpoint.into(),
            api_key: "test-key".into(),
            api_version: "2024-02-15-preview".into(),
            timeout_secs: Some(5),
        }
    }

    #[test]
    fn rejects_endpoint_without_scheme() {
        let err = AzureOpenAiService::new(cfg("northwind.openai.azure.com")).unwrap_err();
        assert!(matches!(
            err,
            AiLlmError::Provider(ProviderError {
                kind: ProviderErrorKind::InvalidEndpoint(_),
                ..
            })
        ));
    }

    #[tokio::test]
    async fn completion_sends_messages_and_params() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/openai/deployments/gpt-4o/chat/completions"))
            .and(query_param("api-version", "2024-02-15-preview"))
            .and(header("api-key", "test-key"))
            .and(body_partial_json(json!({
                "temperature": 0.0,
                "max_tokens": 10,
                "messages": [{"role": "user", "content": "Hello"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": "Hi there"}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let svc = AzureOpenAiService::new(cfg(&server.uri())).unwrap();
        let out = svc
            .complete(&[ChatMessage::user("Hello")], GenerationParams::grounded(Some(10)))
            .await
            .unwrap();
        assert_eq!(out, "Hi there");
    }

    #[tokio::test]
    async fn unauthorized_and_missing_deployment_are_classified() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": {"code": "401", "message": "Access denied due to invalid subscription key."}
            })))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "error": {"code": "DeploymentNotFound", "message": "The API deployment for this resource does not exist."}
            })))
            .mount(&server)
            .await;

        let svc = AzureOpenAiService::new(cfg(&server.uri())).unwrap();
        let msgs = [ChatMessage::user("Hello")];

        let first = svc
            .complete(&msgs, GenerationParams::grounded(None))
            .await
            .unwrap_err();
        assert!(first.is_unauthorized());

        let second = svc
            .complete(&msgs, GenerationParams::grounded(None))
            .await
            .unwrap_err();
        assert_eq!(second.missing_deployment(), Some("gpt-4o"));
    }

    #[tokio::test]
    async fn invalid_params_never_hit_the_network() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let svc = AzureOpenAiService::new(cfg(&server.uri())).unwrap();
        let params = GenerationParams {
            temperature: 3.0,
            max_tokens: None,
            top_p: None,
        };
        let err = svc
            .complete(&[ChatMessage::user("x")], params)
            .await
            .unwrap_err();
        assert!(matches!(err, AiLlmError::Config(_)));
    }

    #[tokio::test]
    async fn embeddings_returns_first_vector() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/openai/deployments/gpt-4o/embeddings"))
            .and(body_partial_json(json!({"input": "dental"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{"embedding": [0.25, -0.5, 1.0], "index": 0}]
            })))
            .mount(&server)
            .await;

        let svc = AzureOpenAiService::new(cfg(&server.uri())).unwrap();
        assert_eq!(svc.embeddings("dental").await.unwrap(), vec![0.25, -0.5, 1.0]);
    }

    #[tokio::test]
    async fn empty_choices_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        let svc = AzureOpenAiService::new(cfg(&server.uri())).unwrap();
        let err = svc
            .complete(&[ChatMessage::user("x")], GenerationParams::grounded(None))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AiLlmError::Provider(ProviderError {
                kind: ProviderErrorKind::EmptyChoices,
                ..
            })
        ));
    }
}
