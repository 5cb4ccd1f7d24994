//! Chat primitives: role-tagged messages, generation knobs and the
//! [`ChatCompletion`] seam implemented by the Azure service and by test doubles.

use std::{future::Future, pin::Pin};

use serde::{Deserialize, Serialize};

use crate::error_handler::{AiLlmError, validate_range_f32};

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One entry of the ordered message list sent to the completion endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Sampling knobs for a single completion call.
///
/// `temperature` must lie in `[0, 1]`; `0` asks for the most reproducible
/// output. `max_tokens` caps the answer length and the service may cut the
/// text mid-sentence at that limit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    pub temperature: f32,
    pub max_tokens: Option<u32>,
    pub top_p: Option<f32>,
}

impl GenerationParams {
    /// Deterministic settings used for grounded Q&A.
    pub fn grounded(max_tokens: Option<u32>) -> Self {
        Self {
            temperature: 0.0,
            max_tokens,
            top_p: None,
        }
    }

    /// Looser settings for free-form chat without retrieval.
    pub fn conversational() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: Some(500),
            top_p: Some(0.95),
        }
    }

    /// Rejects values the completion endpoint would refuse or misinterpret.
    ///
    /// # Errors
    /// [`crate::ConfigError::OutOfRange`] for `temperature`/`top_p` outside `[0, 1]`
    /// or a zero `max_tokens`.
    pub fn validate(&self) -> Result<(), AiLlmError> {
        validate_range_f32(
            "temperature",
            "expected value in 0.0..=1.0",
            self.temperature,
            0.0,
            1.0,
        )?;
        if let Some(top_p) = self.top_p {
            validate_range_f32("top_p", "expected value in 0.0..=1.0", top_p, 0.0, 1.0)?;
        }
        if self.max_tokens == Some(0) {
            return Err(crate::ConfigError::OutOfRange {
                field: "max_tokens",
                detail: "expected at least 1",
            }
            .into());
        }
        Ok(())
    }
}

/// Anything that turns an ordered message list into generated text.
pub trait ChatCompletion: Send + Sync {
    /// Runs one non-streaming completion.
    fn complete<'a>(
        &'a self,
        messages: &'a [ChatMessage],
        params: GenerationParams,
    ) -> Pin<Box<dyn Future<Output = Result<String, AiLlmError>> + Send + 'a>>;
}
