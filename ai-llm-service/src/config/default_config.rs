//! Default deployment configs loaded strictly from environment values.
//!
//! Two roles share one Azure OpenAI resource:
//!
//! - **Chat**      → grounded answers and free-form chat
//! - **Embedding** → query vectors for vector/hybrid search
//!
//! # Environment variables
//!
//! - `AZURE_OPENAI_ENDPOINT`        = resource endpoint (mandatory)
//! - `AZURE_OPENAI_API_KEY`         = resource key (mandatory)
//! - `AZURE_OPENAI_MODEL_NAME`      = chat deployment (default `gpt-4o`)
//! - `AZURE_OPENAI_EMBEDDING_MODEL` = embedding deployment (default `text-embedding-ada-002`)
//! - `AZURE_OPENAI_API_VERSION`     = REST api version (default `2024-02-15-preview`)
//! - `LLM_TIMEOUT_SECS`             = optional HTTP timeout (u64)

use crate::{
    config::llm_model_config::LlmModelConfig,
    error_handler::{AiLlmError, EnvLookup, must_var, validate_http_endpoint, var_opt_u64, var_or},
};

pub const DEFAULT_CHAT_DEPLOYMENT: &str = "gpt-4o";
pub const DEFAULT_EMBEDDING_DEPLOYMENT: &str = "text-embedding-ada-002";
pub const DEFAULT_API_VERSION: &str = "2024-02-15-preview";

/// Resolves the settings shared by every deployment of the resource.
///
/// # Errors
///
/// - [`crate::ConfigError::MissingVar`] if endpoint or key are missing
/// - [`crate::ConfigError::InvalidFormat`] if the endpoint has no http(s) scheme
/// - [`crate::ConfigError::InvalidNumber`] if `LLM_TIMEOUT_SECS` is invalid
fn resource(lookup: EnvLookup<'_>, deployment: String) -> Result<LlmModelConfig, AiLlmError> {
    let endpoint = must_var(lookup, "AZURE_OPENAI_ENDPOINT")?;
    validate_http_endpoint("AZURE_OPENAI_ENDPOINT", &endpoint)?;
    let api_key = must_var(lookup, "AZURE_OPENAI_API_KEY")?;

    Ok(LlmModelConfig {
        deployment,
        endpoint,
        api_key,
        api_version: var_or(lookup, "AZURE_OPENAI_API_VERSION", DEFAULT_API_VERSION),
        timeout_secs: var_opt_u64(lookup, "LLM_TIMEOUT_SECS")?.or(Some(60)),
    })
}

/// Constructs the config for the **chat** deployment.
pub fn config_azure_chat(lookup: EnvLookup<'_>) -> Result<LlmModelConfig, AiLlmError> {
    let deployment = var_or(lookup, "AZURE_OPENAI_MODEL_NAME", DEFAULT_CHAT_DEPLOYMENT);
    resource(lookup, deployment)
}

/// Constructs the config for the **embedding** deployment.
///
/// Embedding calls are short; the timeout is capped at 30 seconds.
pub fn config_azure_embedding(lookup: EnvLookup<'_>) -> Result<LlmModelConfig, AiLlmError> {
    let deployment = var_or(
        lookup,
        "AZURE_OPENAI_EMBEDDING_MODEL",
        DEFAULT_EMBEDDING_DEPLOYMENT,
    );
    let mut cfg = resource(lookup, deployment)?;
    cfg.timeout_secs = cfg.timeout_secs.map(|t| t.min(30));
    Ok(cfg)
}
