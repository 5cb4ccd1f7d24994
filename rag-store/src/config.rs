//! Search service and index configuration.

use crate::errors::RagError;

pub const DEFAULT_SEARCH_API_VERSION: &str = "2023-11-01";
pub const DEFAULT_VECTOR_FIELD: &str = "text_vector";

/// Configuration for retrieval against one search index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchConfig {
    /// Search service endpoint, e.g. `https://<name>.search.windows.net`.
    pub endpoint: String,
    /// Query or admin key sent in the `api-key` header.
    pub api_key: String,
    /// Target index name.
    pub index_name: String,
    /// REST `api-version` query parameter.
    pub api_version: String,
    /// Indexed vector field used by vector queries.
    pub vector_field: String,
    /// HTTP timeout in seconds.
    pub timeout_secs: u64,
}

impl SearchConfig {
    /// Creates a config with default api version, vector field and timeout.
    pub fn new_default(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        index_name: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            index_name: index_name.into(),
            api_version: DEFAULT_SEARCH_API_VERSION.to_string(),
            vector_field: DEFAULT_VECTOR_FIELD.to_string(),
            timeout_secs: 30,
        }
    }

    /// Validates config values.
    pub fn validate(&self) -> Result<(), RagError> {
        let endpoint = self.endpoint.trim();
        if endpoint.is_empty() {
            return Err(RagError::Config("search endpoint is empty".into()));
        }
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(RagError::Config(format!(
                "search endpoint must start with http:// or https:// (got `{endpoint}`)"
            )));
        }
        if self.api_key.trim().is_empty() {
            return Err(RagError::Config("search api key is empty".into()));
        }
        if self.index_name.trim().is_empty() {
            return Err(RagError::Config("index name is empty".into()));
        }
        if self.vector_field.trim().is_empty() {
            return Err(RagError::Config("vector field is empty".into()));
        }
        if self.timeout_secs == 0 {
            return Err(RagError::Config("timeout_secs must be > 0".into()));
        }
        Ok(())
    }

    /// `{endpoint}/indexes/{index}/docs/search?api-version={v}`
    pub(crate) fn search_url(&self) -> String {
        format!(
            "{}/indexes/{}/docs/search?api-version={}",
            self.endpoint.trim().trim_end_matches('/'),
            self.index_name.trim(),
            self.api_version
        )
    }
}
