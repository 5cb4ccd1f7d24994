use serde::Deserialize;

/// Request payload for `/api/ask`.
#[derive(Debug, Deserialize)]
pub struct AskRequest {
    /// Natural language question.
    pub question: String,
}
