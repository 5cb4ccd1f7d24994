//! Connection probes for Azure OpenAI deployments.
//!
//! One tiny completion (`"Hello"`, `max_tokens = 10`), used by the `check`
//! command and the `/health` endpoint.
//!
//! The returned [`HealthStatus`] is JSON-serializable. Probes are resilient and
//! never fail: errors are mapped to `ok = false` with a short message.

use std::{
    future::Future,
    time::{Duration, Instant},
};

use serde::Serialize;
use tracing::{info, warn};

use crate::{
    chat::{ChatCompletion, ChatMessage, GenerationParams},
    error_handler::AiLlmError,
};

/// A serializable health snapshot for a single upstream dependency.
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    /// Logical service (e.g., "chat", "embedding", "search").
    pub service: String,
    /// Endpoint base URL.
    pub endpoint: String,
    /// Deployment or index the probe targeted.
    pub target: String,
    /// Overall health flag.
    pub ok: bool,
    /// Measured latency in milliseconds for the probe.
    pub latency_ms: u128,
    /// Short human-readable message with details.
    pub message: String,
}

impl HealthStatus {
    pub fn passed(
        service: &str,
        endpoint: &str,
        target: &str,
        latency_ms: u128,
        message: impl Into<String>,
    ) -> Self {
        Self {
            service: service.to_string(),
            endpoint: endpoint.to_string(),
            target: target.to_string(),
            ok: true,
            latency_ms,
            message: message.into(),
        }
    }

    pub fn failed(
        service: &str,
        endpoint: &str,
        target: &str,
        latency_ms: u128,
        message: impl Into<String>,
    ) -> Self {
        Self {
            ok: false,
            ..Self::passed(service, endpoint, target, latency_ms, message)
        }
    }
}

/// Runs probes with a shared upper bound on their duration.
#[derive(Debug, Clone)]
pub struct HealthService {
    timeout: Duration,
}

impl HealthService {
    /// Creates a new health service with an optional probe timeout (seconds, default 10).
    pub fn new(timeout_secs: Option<u64>) -> Self {
        let timeout = Duration::from_secs(timeout_secs.unwrap_or(10));
        info!(timeout_secs = timeout.as_secs(), "HealthService initialized");
        Self { timeout }
    }

    /// Sends a minimal completion through any [`ChatCompletion`].
    ///
    /// `endpoint` and `target` only label the resulting status.
    pub async fn check_completion(
        &self,
        endpoint: &str,
        target: &str,
        chat: &dyn ChatCompletion,
    ) -> HealthStatus {
        let messages = [ChatMessage::user("Hello")];
        let params = GenerationParams::grounded(Some(10));
        self.run("chat", endpoint, target, chat.complete(&messages, params), |reply| {
            format!("chat deployment answered ({} chars)", reply.len())
        })
        .await
    }

    async fn run<T, F>(
        &self,
        service: &str,
        endpoint: &str,
        target: &str,
        fut: F,
        describe: impl FnOnce(&T) -> String,
    ) -> HealthStatus
    where
        F: Future<Output = Result<T, AiLlmError>>,
    {
        let started = Instant::now();
        let outcome = tokio::time::timeout(self.timeout, fut).await;
        let latency = started.elapsed().as_millis();

        let status = match outcome {
            Ok(Ok(value)) => HealthStatus::passed(service, endpoint, target, latency, describe(&value)),
            Ok(Err(err)) => HealthStatus::failed(service, endpoint, target, latency, err.to_string()),
            Err(_) => HealthStatus::failed(
                service,
                endpoint,
                target,
                latency,
                format!("probe timed out after {:?}", self.timeout),
            ),
        };

        if status.ok {
            info!(
                service = %status.service,
                target = %status.target,
                latency_ms = status.latency_ms,
                "health probe completed"
            );
        } else {
            warn!(
                service = %status.service,
                target = %status.target,
                latency_ms = status.latency_ms,
                message = %status.message,
                "health probe failed"
            );
        }
        status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::pin::Pin;

    struct Echo;

    impl ChatCompletion for Echo {
        fn complete<'a>(
            &'a self,
            messages: &'a [ChatMessage],
            _params: GenerationParams,
        ) -> Pin<Box<dyn Future<Output = Result<String, AiLlmError>> + Send + 'a>> {
            Box::pin(async move { Ok(messages[0].content.clone()) })
        }
    }

    struct Stuck;

    impl ChatCompletion for Stuck {
        fn complete<'a>(
            &'a self,
            _messages: &'a [ChatMessage],
            _params: GenerationParams,
        ) -> Pin<Box<dyn Future<Output = Result<String, AiLlmError>> + Send + 'a>> {
            Box::pin(std::future::pending())
        }
    }

    #[tokio::test]
    async fn healthy_completion_is_reported_ok() {
        let health = HealthService::new(Some(1));
        let status = health.check_completion("https://x", "gpt-4o", &Echo).await;
        assert!(status.ok);
        assert_eq!(status.service, "chat");
        assert_eq!(status.target, "gpt-4o");
    }

    #[tokio::test(start_paused = true)]
    async fn stuck_probe_times_out_without_error() {
        let health = HealthService::new(Some(1));
        let status = health.check_completion("https://x", "gpt-4o", &Stuck).await;
        assert!(!status.ok);
        assert!(status.message.contains("timed out"));
    }
}
