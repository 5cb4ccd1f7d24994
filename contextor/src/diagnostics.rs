//! Connection diagnostics: one cheap call against each remote service.
//!
//! - Search: keyword search for `"test"`, one result
//! - Completion: `"Hello"` with `max_tokens = 10`
//!
//! Never fails; each probe becomes a [`HealthStatus`].

use std::{sync::Arc, time::Instant};

use ai_llm_service::{ChatCompletion, HealthService, HealthStatus};
use rag_store::SearchBackend;
use tracing::{info, warn};

/// Labels shown next to each probe result.
#[derive(Clone, Debug)]
pub struct Targets {
    pub search_endpoint: String,
    pub index: String,
    pub openai_endpoint: String,
    pub deployment: String,
}

pub struct Diagnostics {
    search: Arc<dyn SearchBackend>,
    chat: Arc<dyn ChatCompletion>,
    targets: Targets,
    health: HealthService,
}

impl Diagnostics {
    pub fn new(search: Arc<dyn SearchBackend>, chat: Arc<dyn ChatCompletion>, targets: Targets) -> Self {
        Self {
            search,
            chat,
            targets,
            health: HealthService::new(Some(15)),
        }
    }

    pub fn targets(&self) -> &Targets {
        &self.targets
    }

    /// Probes search, then completion.
    pub async fn check_connections(&self) -> Vec<HealthStatus> {
        let search = self.check_search().await;
        let chat = self
            .health
            .check_completion(
                &self.targets.openai_endpoint,
                &self.targets.deployment,
                self.chat.as_ref(),
            )
            .await;
        vec![search, chat]
    }

    async fn check_search(&self) -> HealthStatus {
        let started = Instant::now();
        let result = self.search.ping().await;
        let latency = started.elapsed().as_millis();
        let t = &self.targets;

        match result {
            Ok(()) => {
                info!(index = %t.index, latency_ms = latency, "search probe completed");
                HealthStatus::passed("search", &t.search_endpoint, &t.index, latency, "search connection successful")
            }
            Err(e) => {
                warn!(index = %t.index, error = %e, "search probe failed");
                HealthStatus::failed("search", &t.search_endpoint, &t.index, latency, e.to_string())
            }
        }
    }
}
