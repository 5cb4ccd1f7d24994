//! Lightweight progress reporting for the RAG pipeline.
//!
//! Use `NoopProgress` for servers and loops (default) and `IndicatifProgress`
//! for a single CLI question on a TTY.

use indicatif::{ProgressBar, ProgressStyle};

/// Minimal progress interface used inside the ask pipeline.
pub trait Progress: Send + Sync {
    /// Advance by one step and show a short message.
    fn step(&self, _msg: &str) {}
    /// Replace current message without advancing.
    fn message(&self, _msg: &str) {}
    /// Finish the UI.
    fn finish(&self, _msg: &str) {}
}

/// No-op reporter for servers/headless runs.
#[derive(Default, Clone, Copy)]
pub struct NoopProgress;
impl Progress for NoopProgress {}

/// Indicatif spinner drawn on stderr.
pub struct IndicatifProgress {
    pb: ProgressBar,
}

impl IndicatifProgress {
    /// Spinner (unknown total).
    pub fn spinner() -> Self {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
            pb.set_style(style.tick_chars("-\\|/ "));
        }
        pb.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { pb }
    }
}

impl Progress for IndicatifProgress {
    fn step(&self, msg: &str) {
        self.pb.inc(1);
        self.pb.set_message(msg.to_string());
    }
    fn message(&self, msg: &str) {
        self.pb.set_message(msg.to_string());
    }
    fn finish(&self, _msg: &str) {
        self.pb.finish_and_clear();
    }
}
