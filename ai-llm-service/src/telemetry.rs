use std::io::{self, IsTerminal};
use std::str::FromStr;

use tracing::Level;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer, filter, fmt};

/// Targets emitted by the workspace crates. Events from other crates
/// (hyper, reqwest, ...) are left to the global filter.
pub const WORKSPACE_TARGETS: &[&str] = &[
    "ai_llm_service",
    "rag_store",
    "contextor",
    "api",
    "northwind_rag",
];

/// RFC3339 UTC timer implemented via `chrono`.
/// Example output: `2025-09-12T10:20:30Z`
#[derive(Clone, Debug, Default)]
struct ChronoRfc3339Utc;

impl FormatTime for ChronoRfc3339Utc {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        let now = chrono::Utc::now();
        let s = now.to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
        w.write_str(&s)
    }
}

/// Build a formatting layer that renders only events emitted by the workspace.
///
/// - RFC3339 UTC timestamps
/// - Compact single-line format with target and `file:line`
/// - Span close events (duration of instrumented calls)
/// - Written to **stderr**, so answers on stdout stay clean
/// - ANSI colors only when stderr is a terminal
pub fn layer<S>() -> impl Layer<S> + Send + Sync
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    let use_ansi = io::stderr().is_terminal();

    let only_workspace = filter::filter_fn(|meta| {
        WORKSPACE_TARGETS
            .iter()
            .any(|prefix| meta.target().starts_with(prefix))
    });

    fmt::layer()
        .with_writer(io::stderr)
        .with_timer(ChronoRfc3339Utc)
        .with_level(true)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(use_ansi)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .event_format(fmt::format().compact().with_source_location(true))
        .with_filter(only_workspace)
}

/// Level directives for every workspace target, e.g. `contextor=debug`.
pub fn level_directives(level: Level) -> Vec<Directive> {
    let level = level.as_str().to_lowercase();
    WORKSPACE_TARGETS
        .iter()
        .filter_map(|target| Directive::from_str(&format!("{target}={level}")).ok())
        .collect()
}

/// EnvFilter from `RUST_LOG` or `default`, with `level` applied to the workspace.
///
/// `RUST_LOG=warn` with `Level::INFO` keeps third-party crates at WARN while
/// workspace crates log at INFO.
pub fn env_filter_with_level(default: &str, level: Level) -> EnvFilter {
    let base = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    level_directives(level)
        .into_iter()
        .fold(base, |filter, directive| filter.add_directive(directive))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directives_cover_all_workspace_targets() {
        let directives = level_directives(Level::DEBUG);
        assert_eq!(directives.len(), WORKSPACE_TARGETS.len());
        assert!(directives[1].to_string().starts_with("rag_store"));
    }
}
