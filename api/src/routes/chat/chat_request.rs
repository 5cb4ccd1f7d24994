use serde::{Deserialize, Serialize};

/// Request payload for `/api/chat`, shaped like a chat widget's callback.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    /// Earlier turns. Accepted for compatibility and not sent to the model.
    #[serde(default)]
    pub history: Vec<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
}
