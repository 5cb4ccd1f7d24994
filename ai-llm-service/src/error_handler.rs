//! Unified error handling for `ai-llm-service`.
//!
//! This module exposes a single top-level error type [`AiLlmError`] for the whole
//! library, and groups domain-specific errors in nested types ([`ConfigError`],
//! [`ProviderError`]). Small helpers for reading/validating configuration values
//! are provided and return the unified [`Result<T>`] alias.
//!
//! Upstream failures are classified here, from the HTTP status and the error
//! body, so callers never inspect message text.
//!
//! All messages include the suffix `[AI LLM Service]` to simplify attribution in logs.

use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/* ------------------------------------------------------------------------- */
/* Public result alias                                                       */
/* ------------------------------------------------------------------------- */

/// Unified result alias for the entire crate.
pub type Result<T> = std::result::Result<T, AiLlmError>;

/* ------------------------------------------------------------------------- */
/* Top-level error                                                           */
/* ------------------------------------------------------------------------- */

/// Top-level error for the `ai-llm-service` crate.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum AiLlmError {
    /// Configuration/validation errors (startup or request parameters).
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Upstream answered, but not with what we asked for.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Underlying HTTP transport error (e.g., `reqwest::Error`).
    #[error("[AI LLM Service] transport error: {0}")]
    HttpTransport(#[from] reqwest::Error),

    /// Operation exceeded the configured timeout.
    #[error("[AI LLM Service] operation timed out after {0:?}")]
    Timeout(Duration),
}

impl AiLlmError {
    /// Maps a `reqwest` failure, keeping timeouts distinguishable.
    pub(crate) fn from_transport(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            AiLlmError::Timeout(timeout)
        } else {
            AiLlmError::HttpTransport(err)
        }
    }

    /// `true` when the upstream rejected our credentials.
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            AiLlmError::Provider(ProviderError {
                kind: ProviderErrorKind::Unauthorized(_),
                ..
            })
        )
    }

    /// Returns the deployment name when the upstream reported it as missing.
    pub fn missing_deployment(&self) -> Option<&str> {
        match self {
            AiLlmError::Provider(ProviderError {
                deployment,
                kind: ProviderErrorKind::DeploymentNotFound,
            }) => Some(deployment),
            _ => None,
        }
    }
}

/* ------------------------------------------------------------------------- */
/* Config errors                                                             */
/* ------------------------------------------------------------------------- */

/// Error enum for environment/config-driven setup.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable is missing or empty.
    #[error("[AI LLM Service] missing required environment variable: {0}")]
    MissingVar(&'static str),

    /// A number failed to parse (like limits, timeouts).
    #[error("[AI LLM Service] invalid number in {var}: {reason}")]
    InvalidNumber {
        /// Variable name (e.g., `LLM_MAX_TOKENS`).
        var: &'static str,
        /// Human-readable reason (e.g., `expected u32`).
        reason: &'static str,
    },

    /// Value had the wrong format (e.g., invalid URL).
    #[error("[AI LLM Service] invalid format in {var}: {reason}")]
    InvalidFormat {
        /// Variable name (e.g., `AZURE_OPENAI_ENDPOINT`).
        var: &'static str,
        /// Explanation (e.g., `must start with http:// or https://`).
        reason: &'static str,
    },

    /// A numeric field was outside of the allowed range.
    #[error("[AI LLM Service] {field} is out of range: {detail}")]
    OutOfRange {
        /// Field name (e.g., `temperature`).
        field: &'static str,
        /// Description of the expected range.
        detail: &'static str,
    },

    /// Deployment name was empty.
    #[error("[AI LLM Service] deployment name must not be empty")]
    EmptyDeployment,
}

/* ------------------------------------------------------------------------- */
/* Provider errors                                                           */
/* ------------------------------------------------------------------------- */

/// Failure reported for one deployment.
#[derive(Debug, Error)]
#[error("[AI LLM Service] deployment `{deployment}`: {kind}")]
pub struct ProviderError {
    /// Deployment (model) the request targeted.
    pub deployment: String,
    /// What went wrong.
    pub kind: ProviderErrorKind,
}

impl ProviderError {
    pub fn new(deployment: impl Into<String>, kind: ProviderErrorKind) -> Self {
        Self {
            deployment: deployment.into(),
            kind,
        }
    }

    /// Classifies a non-success response.
    ///
    /// 401/403 are credential problems, 404 (or an explicit
    /// `DeploymentNotFound` code) means the deployment does not exist,
    /// everything else is kept as a raw HTTP status.
    pub fn from_status(deployment: &str, status: StatusCode, url: String, body: &str) -> Self {
        let code = upstream_error_code(body);
        let http = HttpError {
            status,
            url,
            snippet: make_snippet(body),
        };

        let kind = match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProviderErrorKind::Unauthorized(http),
            StatusCode::NOT_FOUND => ProviderErrorKind::DeploymentNotFound,
            _ if code.as_deref() == Some("DeploymentNotFound") => {
                ProviderErrorKind::DeploymentNotFound
            }
            _ => ProviderErrorKind::HttpStatus(http),
        };

        Self::new(deployment, kind)
    }
}

/// Detailed provider failure.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ProviderErrorKind {
    /// Endpoint is empty or does not start with http/https.
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// No API key configured.
    #[error("missing API key")]
    MissingApiKey,

    /// Upstream rejected the credentials (401/403).
    #[error("unauthorized ({0})")]
    Unauthorized(HttpError),

    /// Deployment does not exist on this resource.
    #[error("deployment not found")]
    DeploymentNotFound,

    /// Upstream returned another non-successful HTTP status.
    #[error("{0}")]
    HttpStatus(HttpError),

    /// Response payload could not be decoded as expected.
    #[error("decode error: {0}")]
    Decode(String),

    /// Chat completion returned no choice with content.
    #[error("completion returned no choices")]
    EmptyChoices,
}

/// Status, URL and a trimmed body snippet of a failed call.
#[derive(Debug)]
pub struct HttpError {
    pub status: StatusCode,
    pub url: String,
    pub snippet: String,
}

impl std::fmt::Display for HttpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HTTP {} from {}: {}", self.status, self.url, self.snippet)
    }
}

/// Keeps at most 240 chars of a response body for logs and errors.
pub fn make_snippet(text: &str) -> String {
    text.trim().chars().take(240).collect()
}

/// Extracts `error.code` from an OpenAI-style error body, if present.
fn upstream_error_code(body: &str) -> Option<String> {
    #[derive(Deserialize)]
    struct Envelope {
        error: Option<Inner>,
    }
    #[derive(Deserialize)]
    struct Inner {
        code: Option<String>,
    }

    serde_json::from_str::<Envelope>(body)
        .ok()
        .and_then(|e| e.error)
        .and_then(|e| e.code)
}

/* ------------------------------------------------------------------------- */
/* Env helpers (return unified `Result<T>`)                                  */
/* ------------------------------------------------------------------------- */

/// Reads a value by name; `Some` only when set.
///
/// Config builders take a lookup so the same code serves the process
/// environment ([`process_env`]) and in-memory maps in tests.
pub type EnvLookup<'a> = &'a dyn Fn(&str) -> Option<String>;

/// Lookup backed by the process environment.
pub fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Fetches a required, non-empty value.
///
/// # Errors
/// Returns [`AiLlmError::Config`] with [`ConfigError::MissingVar`] if the
/// variable is absent or empty.
pub fn must_var(lookup: EnvLookup<'_>, name: &'static str) -> Result<String> {
    match lookup(name) {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(ConfigError::MissingVar(name).into()),
    }
}

/// Fetches an optional value, falling back to `default` when unset or empty.
pub fn var_or(lookup: EnvLookup<'_>, name: &str, default: &str) -> String {
    lookup(name)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Parses an optional `u32` (`Ok(None)` if unset/empty).
///
/// # Errors
/// Returns [`ConfigError::InvalidNumber`] if the variable is set but not a valid `u32`.
pub fn var_opt_u32(lookup: EnvLookup<'_>, name: &'static str) -> Result<Option<u32>> {
    match lookup(name) {
        Some(v) if !v.trim().is_empty() => v.trim().parse::<u32>().map(Some).map_err(|_| {
            AiLlmError::from(ConfigError::InvalidNumber {
                var: name,
                reason: "expected u32",
            })
        }),
        _ => Ok(None),
    }
}

/// Parses an optional `u64` (`Ok(None)` if unset/empty).
pub fn var_opt_u64(lookup: EnvLookup<'_>, name: &'static str) -> Result<Option<u64>> {
    match lookup(name) {
        Some(v) if !v.trim().is_empty() => v.trim().parse::<u64>().map(Some).map_err(|_| {
            AiLlmError::from(ConfigError::InvalidNumber {
                var: name,
                reason: "expected u64",
            })
        }),
        _ => Ok(None),
    }
}

/* ------------------------------------------------------------------------- */
/* Validation helpers                                                        */
/* ------------------------------------------------------------------------- */

/// Validates that an HTTP endpoint starts with `http://` or `https://`.
///
/// # Errors
/// Returns [`ConfigError::InvalidFormat`] when the scheme is missing.
pub fn validate_http_endpoint(var: &'static str, value: &str) -> Result<()> {
    if value.starts_with("http://") || value.starts_with("https://") {
        Ok(())
    } else {
        Err(ConfigError::InvalidFormat {
            var,
            reason: "must start with http:// or https://",
        }
        .into())
    }
}

/// Validates that a floating-point value lies within an inclusive range.
///
/// # Errors
/// Returns [`ConfigError::OutOfRange`] if `value` is outside `[min, max]` or not finite.
pub fn validate_range_f32(
    field: &'static str,
    detail: &'static str,
    value: f32,
    min: f32,
    max: f32,
) -> Result<()> {
    if value.is_finite() && value >= min && value <= max {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange { field, detail }.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn blank_required_var_is_missing() {
        let lookup = lookup_from(&[("AZURE_OPENAI_API_KEY", "   ")]);
        let err = must_var(&lookup, "AZURE_OPENAI_API_KEY").unwrap_err();
        assert!(matches!(
            err,
            AiLlmError::Config(ConfigError::MissingVar("AZURE_OPENAI_API_KEY"))
        ));
    }

    #[test]
    fn optional_number_rejects_garbage() {
        let lookup = lookup_from(&[("LLM_MAX_TOKENS", "lots")]);
        assert!(var_opt_u32(&lookup, "LLM_MAX_TOKENS").is_err());
        assert_eq!(var_opt_u32(&lookup, "UNSET").unwrap(), None);
    }

    #[test]
    fn status_classification() {
        let unauthorized =
            ProviderError::from_status("gpt-4o", StatusCode::UNAUTHORIZED, "u".into(), "{}");
        assert!(matches!(unauthorized.kind, ProviderErrorKind::Unauthorized(_)));

        let missing = ProviderError::from_status(
            "gpt-4o",
            StatusCode::BAD_REQUEST,
            "u".into(),
            r#"{"error":{"code":"DeploymentNotFound","message":"nope"}}"#,
        );
        assert!(matches!(missing.kind, ProviderErrorKind::DeploymentNotFound));

        let other = ProviderError::from_status(
            "gpt-4o",
            StatusCode::SERVICE_UNAVAILABLE,
            "u".into(),
            "busy",
        );
        assert!(matches!(other.kind, ProviderErrorKind::HttpStatus(_)));
    }

    #[test]
    fn temperature_range() {
        assert!(validate_range_f32("temperature", "0..=1", 0.0, 0.0, 1.0).is_ok());
        assert!(validate_range_f32("temperature", "0..=1", 1.2, 0.0, 1.0).is_err());
        assert!(validate_range_f32("temperature", "0..=1", f32::NAN, 0.0, 1.0).is_err());
    }
}
