/// Connection settings for one Azure OpenAI deployment.
///
/// Chat and embedding deployments each get their own value; sampling knobs
/// travel per call in [`crate::GenerationParams`].
///
/// # Examples
///
/// ```
/// use ai_llm_service::LlmModelConfig;
///
/// let cfg = LlmModelConfig {
///     deployment: "gpt-4o".to_string(),
///     endpoint: "https://northwind.openai.azure.com".to_string(),
///     api_key: "secret".to_string(),
///     api_version: "2024-02-15-preview".to_string(),
///     timeout_secs: Some(30),
/// };
/// assert_eq!(cfg.deployment, "gpt-4o");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmModelConfig {
    /// Deployment name (the model alias configured on the resource).
    pub deployment: String,

    /// Resource endpoint, e.g. `https://<name>.openai.azure.com`.
    pub endpoint: String,

    /// Key sent in the `api-key` header.
    pub api_key: String,

    /// REST `api-version` query parameter.
    pub api_version: String,

    /// Optional request timeout (in seconds).
    pub timeout_secs: Option<u64>,
}
