use std::sync::Arc;

use contextor::{RagPipeline, diagnostics::Diagnostics, driver::ui::UiCallback};

/// Shared state for all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// Grounded pipeline used by `/api/ask`.
    pub pipeline: Arc<RagPipeline>,
    /// Chat-UI callback (same pipeline, demo-mode fallback) used by `/api/chat`.
    pub ui: UiCallback,
    /// Connection probes used by `/health`.
    pub diagnostics: Arc<Diagnostics>,
}

impl AppState {
    pub fn new(pipeline: Arc<RagPipeline>, diagnostics: Arc<Diagnostics>) -> Self {
        Self {
            ui: UiCallback::new(pipeline.clone()),
            pipeline,
            diagnostics,
        }
    }
}
