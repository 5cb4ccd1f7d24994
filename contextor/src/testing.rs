//! In-process doubles for the gateway seams, shared by unit tests.

use std::{
    future::Future,
    pin::Pin,
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use ai_llm_service::{AiLlmError, ChatCompletion, ChatMessage, GenerationParams};
use rag_store::{EmbeddingsProvider, RagError, SearchBackend, SearchHit, SearchQuery};
use serde_json::Map;

use crate::{error::ContextorError, pipeline::Responder};

pub fn hit(score: f32, title: &str, content: &str) -> SearchHit {
    SearchHit {
        score,
        title: title.to_string(),
        content: content.to_string(),
        fields: Map::new(),
    }
}

pub fn northwind_hits() -> Vec<SearchHit> {
    vec![
        hit(0.033, "Benefit_Options.pdf", "Northwind Standard covers medical, vision and dental."),
        hit(0.031, "Northwind_Standard_Benefits_Details.pdf", "Standard includes preventive care."),
        hit(0.016, "Employee_Handbook.pdf", "Benefits enrollment opens in November."),
    ]
}

/// Search double returning canned hits or a fixed failure.
pub struct CannedSearch {
    hits: Option<Vec<SearchHit>>,
    pub calls: AtomicUsize,
}

impl CannedSearch {
    pub fn hits(hits: Vec<SearchHit>) -> Self {
        Self {
            hits: Some(hits),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            hits: None,
            calls: AtomicUsize::new(0),
        }
    }

    fn outcome(&self) -> Result<Vec<SearchHit>, RagError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.hits
            .clone()
            .ok_or(RagError::Timeout(Duration::from_secs(30)))
    }
}

impl SearchBackend for CannedSearch {
    fn search<'a>(
        &'a self,
        _query: &'a SearchQuery,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<SearchHit>, RagError>> + Send + 'a>> {
        Box::pin(async move { self.outcome() })
    }

    fn ping<'a>(&'a self) -> Pin<Box<dyn Future<Output = Result<(), RagError>> + Send + 'a>> {
        Box::pin(async move { self.outcome().map(|_| ()) })
    }
}

pub struct FixedEmbedder;

impl EmbeddingsProvider for FixedEmbedder {
    fn embed<'a>(
        &'a self,
        _text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<f32>, RagError>> + Send + 'a>> {
        Box::pin(async { Ok(vec![0.1, 0.2, 0.3]) })
    }
}

enum Reply {
    Fixed(String),
    /// Deterministic function of the last message.
    Digest,
    Fail,
}

/// Chat double that records every call.
pub struct RecordingChat {
    reply: Reply,
    calls: Mutex<Vec<(Vec<ChatMessage>, GenerationParams)>>,
}

impl RecordingChat {
    fn with(reply: Reply) -> Self {
        Self {
            reply,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn answering(text: &str) -> Self {
        Self::with(Reply::Fixed(text.to_string()))
    }

    pub fn echo_hash() -> Self {
        Self::with(Reply::Digest)
    }

    pub fn failing() -> Self {
        Self::with(Reply::Fail)
    }

    pub fn last_call(&self) -> Option<(Vec<ChatMessage>, GenerationParams)> {
        self.calls.lock().unwrap().last().cloned()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl ChatCompletion for RecordingChat {
    fn complete<'a>(
        &'a self,
        messages: &'a [ChatMessage],
        params: GenerationParams,
    ) -> Pin<Box<dyn Future<Output = Result<String, AiLlmError>> + Send + 'a>> {
        Box::pin(async move {
            self.calls.lock().unwrap().push((messages.to_vec(), params));
            match &self.reply {
                Reply::Fixed(text) => Ok(text.clone()),
                Reply::Digest => {
                    let last = messages.last().map(|m| m.content.as_str()).unwrap_or("");
                    let sum: u64 = last.bytes().map(u64::from).sum();
                    Ok(format!("digest {sum} over {} chars", last.len()))
                }
                Reply::Fail => Err(AiLlmError::Timeout(Duration::from_secs(60))),
            }
        })
    }
}

/// Responder double: echoes the message, or fails when it contains "boom".
pub struct ScriptedResponder {
    pub seen: Mutex<Vec<String>>,
}

impl ScriptedResponder {
    pub fn new() -> Self {
        Self {
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

impl Responder for ScriptedResponder {
    fn respond<'a>(
        &'a self,
        message: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, ContextorError>> + Send + 'a>> {
        Box::pin(async move {
            self.seen.lock().unwrap().push(message.to_string());
            if message.contains("boom") {
                Err(ContextorError::DeploymentNotFound("gpt-4o".into()))
            } else {
                Ok(format!("answer to {message}"))
            }
        })
    }
}
