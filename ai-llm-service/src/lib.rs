//! Azure OpenAI gateway shared by the RAG pipeline.
//!
//! - [`services::azure_openai_service::AzureOpenAiService`]: chat completions and embeddings.
//! - [`chat`]: role-tagged messages, generation parameters and the [`ChatCompletion`] seam.
//! - [`config`]: per-deployment config built strictly from environment values.
//! - [`health_service`]: resilient probes for diagnostics endpoints.
//! - [`telemetry`]: workspace-scoped `tracing` layer.

pub mod chat;
pub mod config;
pub mod error_handler;
pub mod health_service;
pub mod service_profiles;
pub mod services;
pub mod telemetry;

pub use chat::{ChatCompletion, ChatMessage, GenerationParams, Role};
pub use config::llm_model_config::LlmModelConfig;
pub use error_handler::{AiLlmError, ConfigError, ProviderError, ProviderErrorKind};
pub use health_service::{HealthService, HealthStatus};
pub use service_profiles::LlmServiceProfiles;
pub use services::azure_openai_service::AzureOpenAiService;
