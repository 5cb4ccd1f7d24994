//! Runtime configuration loaded from environment variables.
//!
//! Everything is read once, validated, and then passed explicitly to the
//! gateways. Required values:
//!
//! - `AZURE_SEARCH_ENDPOINT`, `AZURE_SEARCH_KEY`, `AZURE_SEARCH_INDEX_NAME`
//! - `AZURE_OPENAI_ENDPOINT`, `AZURE_OPENAI_API_KEY`
//!
//! Optional knobs and their defaults:
//!
//! - `AZURE_SEARCH_API_VERSION` (`2023-11-01`), `AZURE_SEARCH_VECTOR_FIELD` (`text_vector`)
//! - `AZURE_OPENAI_MODEL_NAME` (`gpt-4o`), `AZURE_OPENAI_EMBEDDING_MODEL`
//!   (`text-embedding-ada-002`), `AZURE_OPENAI_API_VERSION` (`2024-02-15-preview`)
//! - `LLM_MAX_TOKENS` (800), `LLM_TIMEOUT_SECS` (60)
//! - `RAG_SEARCH_MODE` (`hybrid`), `RAG_TOP_K` (3), `RAG_K_NEAREST` (50)
//! - `API_ADDRESS` (`127.0.0.1:7862`)

use ai_llm_service::{
    LlmModelConfig,
    config::default_config::{config_azure_chat, config_azure_embedding},
    error_handler::{EnvLookup, must_var, process_env, validate_http_endpoint, var_opt_u32, var_opt_u64, var_or},
};
use rag_store::{DEFAULT_SEARCH_API_VERSION, DEFAULT_VECTOR_FIELD, SearchConfig, SearchMode};
use tracing::debug;

use crate::api_types::AskOptions;
use crate::error::ContextorError;

pub const DEFAULT_TOP_K: usize = 3;
pub const DEFAULT_K_NEAREST: usize = 50;
pub const DEFAULT_MAX_TOKENS: u32 = 800;
pub const DEFAULT_API_ADDRESS: &str = "127.0.0.1:7862";

/// Immutable settings for one process run.
#[derive(Clone, Debug, PartialEq)]
pub struct ContextorConfig {
    pub search: SearchConfig,
    pub chat: LlmModelConfig,
    pub embedding: LlmModelConfig,

    // Retrieval and generation knobs
    pub mode: SearchMode,
    pub top_k: usize,
    pub k_nearest_neighbors: usize,
    pub max_tokens: u32,

    /// Bind address for the chat UI host.
    pub api_address: String,
}

impl ContextorConfig {
    /// Reads the process environment. Call `dotenvy::dotenv()` first to seed it
    /// from a `.env` file.
    ///
    /// # Errors
    /// [`ContextorError::ConfigMissing`] naming the first absent required
    /// variable, or [`ContextorError::ConfigInvalid`] for malformed values.
    pub fn from_env() -> Result<Self, ContextorError> {
        Self::from_lookup(&process_env)
    }

    /// Same as [`ContextorConfig::from_env`], reading through `lookup`.
    ///
    /// # Example
    /// ```
    /// use contextor::{ContextorConfig, ContextorError};
    ///
    /// let lookup = |k: &str| match k {
    ///     "AZURE_SEARCH_ENDPOINT" => Some("https://nw.search.windows.net".to_string()),
    ///     _ => None,
    /// };
    /// let err = ContextorConfig::from_lookup(&lookup).unwrap_err();
    /// assert!(matches!(err, ContextorError::ConfigMissing(v) if v == "AZURE_SEARCH_KEY"));
    /// ```
    pub fn from_lookup(lookup: EnvLookup<'_>) -> Result<Self, ContextorError> {
        let search_endpoint = must_var(lookup, "AZURE_SEARCH_ENDPOINT")?;
        validate_http_endpoint("AZURE_SEARCH_ENDPOINT", &search_endpoint)?;
        let search_key = must_var(lookup, "AZURE_SEARCH_KEY")?;
        let index_name = must_var(lookup, "AZURE_SEARCH_INDEX_NAME")?;

        let chat = config_azure_chat(lookup)?;
        let embedding = config_azure_embedding(lookup)?;

        let mode = var_or(lookup, "RAG_SEARCH_MODE", "hybrid")
            .parse::<SearchMode>()
            .map_err(|e| ContextorError::ConfigInvalid(format!("RAG_SEARCH_MODE: {e}")))?;

        let top_k = positive(var_opt_u32(lookup, "RAG_TOP_K")?, DEFAULT_TOP_K as u32, "RAG_TOP_K")?;
        let k_nearest_neighbors = positive(
            var_opt_u32(lookup, "RAG_K_NEAREST")?,
            DEFAULT_K_NEAREST as u32,
            "RAG_K_NEAREST",
        )?;
        let max_tokens = positive(
            var_opt_u32(lookup, "LLM_MAX_TOKENS")?,
            DEFAULT_MAX_TOKENS,
            "LLM_MAX_TOKENS",
        )?;

        let search = SearchConfig {
            endpoint: search_endpoint,
            api_key: search_key,
            index_name,
            api_version: var_or(lookup, "AZURE_SEARCH_API_VERSION", DEFAULT_SEARCH_API_VERSION),
            vector_field: var_or(lookup, "AZURE_SEARCH_VECTOR_FIELD", DEFAULT_VECTOR_FIELD),
            timeout_secs: var_opt_u64(lookup, "LLM_TIMEOUT_SECS")?.unwrap_or(30).clamp(1, 30),
        };

        let cfg = Self {
            search,
            chat,
            embedding,
            mode,
            top_k: top_k as usize,
            k_nearest_neighbors: k_nearest_neighbors as usize,
            max_tokens,
            api_address: var_or(lookup, "API_ADDRESS", DEFAULT_API_ADDRESS),
        };

        debug!(
            index = %cfg.search.index_name,
            chat = %cfg.chat.deployment,
            embedding = %cfg.embedding.deployment,
            mode = %cfg.mode,
            top_k = cfg.top_k,
            "configuration loaded"
        );
        Ok(cfg)
    }

    /// Retrieval/generation knobs as pipeline options.
    pub fn ask_options(&self) -> AskOptions {
        AskOptions {
            mode: self.mode,
            top_k: self.top_k,
            k_nearest_neighbors: self.k_nearest_neighbors,
            max_tokens: Some(self.max_tokens),
        }
    }
}

fn positive(value: Option<u32>, default: u32, var: &'static str) -> Result<u32, ContextorError> {
    match value {
        Some(0) => Err(ContextorError::ConfigInvalid(format!("{var} must be at least 1"))),
        Some(v) => Ok(v),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const REQUIRED: &[(&str, &str)] = &[
        ("AZURE_SEARCH_ENDPOINT", "https://nw.search.windows.net"),
        ("AZURE_SEARCH_KEY", "search-key"),
        ("AZURE_SEARCH_INDEX_NAME", "northwind"),
        ("AZURE_OPENAI_ENDPOINT", "https://nw.openai.azure.com"),
        ("AZURE_OPENAI_API_KEY", "openai-key"),
    ];

    fn lookup(pairs: &[(&str, &str)], skip: Option<&str>) -> impl Fn(&str) -> Option<String> {
        let mut map = HashMap::new();
        for (k, v) in REQUIRED {
            if Some(*k) != skip {
                map.insert(k.to_string(), v.to_string());
            }
        }
        for (k, v) in pairs {
            map.insert(k.to_string(), v.to_string());
        }
        move |k: &str| map.get(k).cloned()
    }

    #[test]
    fn defaults_fill_optional_values() {
        let cfg = ContextorConfig::from_lookup(&lookup(&[], None)).unwrap();
        assert_eq!(cfg.mode, SearchMode::Hybrid);
        assert_eq!(cfg.top_k, 3);
        assert_eq!(cfg.k_nearest_neighbors, 50);
        assert_eq!(cfg.max_tokens, 800);
        assert_eq!(cfg.chat.deployment, "gpt-4o");
        assert_eq!(cfg.search.vector_field, "text_vector");
        assert_eq!(cfg.api_address, "127.0.0.1:7862");
    }

    #[test]
    fn each_required_variable_is_reported_by_name() {
        for (var, _) in REQUIRED {
            let err = ContextorConfig::from_lookup(&lookup(&[], Some(*var))).unwrap_err();
            assert!(
                matches!(err, ContextorError::ConfigMissing(ref v) if v == var),
                "{var}: {err:?}"
            );
        }
    }

    #[test]
    fn malformed_values_are_invalid() {
        let err = ContextorConfig::from_lookup(&lookup(&[("RAG_SEARCH_MODE", "semantic")], None))
            .unwrap_err();
        assert!(matches!(err, ContextorError::ConfigInvalid(_)));

        let err = ContextorConfig::from_lookup(&lookup(&[("RAG_TOP_K", "0")], None)).unwrap_err();
        assert!(matches!(err, ContextorError::ConfigInvalid(_)));

        let err = ContextorConfig::from_lookup(&lookup(&[("LLM_MAX_TOKENS", "many")], None))
            .unwrap_err();
        assert!(matches!(err, ContextorError::ConfigInvalid(_)));
    }
}
