//! Chat-UI callback: one message in, one reply out, never an error.
//!
//! Any pipeline failure turns into the canned demo-mode reply, which repeats
//! the user's message verbatim.

use std::sync::Arc;

use tracing::{info, warn};

use crate::pipeline::Responder;

/// Example questions shown next to the chat box.
pub const EXAMPLE_QUESTIONS: &[&str] = &[
    "What are the benefits offered?",
    "Tell me about healthcare coverage",
    "What is the Northwind Standard plan?",
];

/// Reply used when the remote services cannot answer.
pub fn demo_mode_reply(message: &str) -> String {
    format!(
        "**Northwind Benefits Assistant** (Demo Mode)

I apologize, but I'm currently unable to connect to Azure services to search through the documents.

For your question: \"{message}\"

In a real scenario, I would:
1. Search through Northwind benefits documents
2. Find relevant information
3. Provide a detailed answer based on the documents

**Example topics I can help with:**
- Health insurance coverage
- Retirement plans and 401(k)
- Paid time off policies
- Professional development benefits
- Life insurance options

*[Demo Mode - Azure connection unavailable]*"
    )
}

/// Callback handed to the chat UI host.
#[derive(Clone)]
pub struct UiCallback {
    responder: Arc<dyn Responder>,
}

impl UiCallback {
    pub fn new(responder: Arc<dyn Responder>) -> Self {
        Self { responder }
    }

    /// Runs the pipeline once for `message`.
    pub async fn respond(&self, message: &str) -> String {
        match self.responder.respond(message).await {
            Ok(answer) => {
                info!(answer_len = answer.len(), "ui reply ready");
                answer
            }
            Err(e) => {
                warn!(error = %e, "ui falling back to demo mode");
                demo_mode_reply(message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedResponder;

    #[tokio::test]
    async fn success_returns_pipeline_answer() {
        let ui = UiCallback::new(Arc::new(ScriptedResponder::new()));
        assert_eq!(ui.respond("What is PTO?").await, "answer to What is PTO?");
    }

    #[tokio::test]
    async fn failure_returns_demo_text_with_the_message() {
        let ui = UiCallback::new(Arc::new(ScriptedResponder::new()));
        let reply = ui.respond("boom: what is covered?").await;
        assert!(reply.contains("(Demo Mode)"));
        assert!(reply.contains("\"boom: what is covered?\""));
    }
}
