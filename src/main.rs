use std::{
    error::Error,
    io::{self, Write},
    process::ExitCode,
    sync::Arc,
};

use ai_llm_service::telemetry;
use api::AppState;
use clap::{Parser, Subcommand};
use colored::Colorize;
use contextor::{
    AskOptions, ContextorConfig, Gateways, IndicatifProgress,
    driver::{
        repl::{ReplOptions, run_repl},
        single_shot::{DEFAULT_QUESTION, run_once},
    },
};
use rag_store::SearchMode;
use tokio::{io::BufReader, signal};
use tracing::{Level, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Query used by `search` when none is given.
const DEFAULT_SEARCH_QUERY: &str = "Share Northwind Standard is a basic plan";

/// Grounded answers over the Northwind benefits index.
#[derive(Debug, Parser)]
#[command(name = "northwind-rag", version, about)]
struct Cli {
    /// How questions are matched against the index.
    #[arg(long, global = true, value_parser = parse_mode)]
    mode: Option<SearchMode>,

    /// Number of search results handed to the model.
    #[arg(long, global = true, value_parser = parse_positive)]
    top_k: Option<usize>,

    /// Log workspace crates at DEBUG.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Answer one question from the documents (default).
    Demo { question: Option<String> },
    /// Interactive grounded Q&A.
    Chat,
    /// Interactive plain chat, no retrieval.
    Ask,
    /// Print raw search hits.
    Search {
        query: Option<String>,
        #[arg(long, value_parser = parse_positive)]
        top: Option<usize>,
    },
    /// Check the search and completion connections.
    Check,
    /// Serve the chat UI callback over HTTP.
    Serve {
        #[arg(long)]
        addr: Option<String>,
    },
}

fn parse_mode(s: &str) -> Result<SearchMode, String> {
    s.parse()
}

fn parse_positive(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("must be at least 1".into()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        telemetry::env_filter_with_level("info", Level::DEBUG)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(telemetry::layer())
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // A missing .env is fine; the variables may come from the shell.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {e}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode, Box<dyn Error>> {
    // Config problems stop here, before any client exists.
    let cfg = ContextorConfig::from_env()?;

    let mut opts = cfg.ask_options();
    if let Some(mode) = cli.mode {
        opts.mode = mode;
    }
    if let Some(k) = cli.top_k {
        opts.top_k = k;
    }

    let gateways = Gateways::connect(&cfg)?;
    info!(mode = %opts.mode, top_k = opts.top_k, "starting");

    match cli.command.unwrap_or(Command::Demo { question: None }) {
        Command::Demo { question } => demo(&gateways, opts, question.as_deref()).await,
        Command::Chat => {
            let pipeline = gateways.pipeline(opts);
            interactive(&pipeline, &ReplOptions::grounded()).await
        }
        Command::Ask => interactive(&gateways.direct_chat(), &ReplOptions::plain_chat()).await,
        Command::Search { query, top } => {
            let top = top.or(cli.top_k).unwrap_or(1);
            search(&gateways, AskOptions { top_k: top, ..opts }, query.as_deref()).await
        }
        Command::Check => check(&gateways).await,
        Command::Serve { addr } => {
            let addr = addr.unwrap_or_else(|| cfg.api_address.clone());
            let state = AppState::new(Arc::new(gateways.pipeline(opts)), Arc::new(gateways.diagnostics()));
            api::start(state, &addr).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn demo(
    gateways: &Gateways,
    opts: AskOptions,
    question: Option<&str>,
) -> Result<ExitCode, Box<dyn Error>> {
    let pipeline = gateways
        .pipeline(opts)
        .with_progress(Arc::new(IndicatifProgress::spinner()));

    let answered = run_once(&pipeline, question.unwrap_or(DEFAULT_QUESTION), &mut io::stdout()).await?;
    Ok(if answered {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

async fn interactive(
    responder: &dyn contextor::Responder,
    repl: &ReplOptions,
) -> Result<ExitCode, Box<dyn Error>> {
    let stdin = BufReader::new(tokio::io::stdin());
    let summary = run_repl(responder, stdin, &mut io::stdout(), signal::ctrl_c(), repl).await?;
    info!(
        questions = summary.questions,
        failures = summary.failures,
        exit = ?summary.exit,
        "session ended"
    );
    Ok(ExitCode::SUCCESS)
}

async fn search(
    gateways: &Gateways,
    opts: AskOptions,
    query: Option<&str>,
) -> Result<ExitCode, Box<dyn Error>> {
    let query = query.unwrap_or(DEFAULT_SEARCH_QUERY);
    let mut out = io::stdout();

    match gateways.pipeline(opts).retrieve(query).await {
        Ok(hits) => {
            writeln!(out, "{} {query} ({} mode)", "Query:".bold(), opts.mode)?;
            if hits.is_empty() {
                writeln!(out, "No results.")?;
            }
            for hit in hits {
                writeln!(out, "Score: {}", hit.score)?;
                writeln!(out, "Chunk: {}", hit.content)?;
                writeln!(out)?;
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            writeln!(out, "{} {}", "Error:".red().bold(), e.user_message())?;
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn check(gateways: &Gateways) -> Result<ExitCode, Box<dyn Error>> {
    let diagnostics = gateways.diagnostics();
    let targets = diagnostics.targets();
    let mut out = io::stdout();

    writeln!(out, "{}", "Connection check".bold())?;
    writeln!(out, "Search endpoint: {}", targets.search_endpoint)?;
    writeln!(out, "Index:           {}", targets.index)?;
    writeln!(out, "OpenAI endpoint: {}", targets.openai_endpoint)?;
    writeln!(out, "Deployment:      {}", targets.deployment)?;
    writeln!(out)?;

    let statuses = diagnostics.check_connections().await;
    for s in &statuses {
        let mark = if s.ok { "OK".green().bold() } else { "FAILED".red().bold() };
        writeln!(
            out,
            "[{mark}] {} ({}) in {} ms: {}",
            s.service, s.target, s.latency_ms, s.message
        )?;
    }

    Ok(if statuses.iter().all(|s| s.ok) {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_global_flags_after_the_subcommand() {
        let cli = Cli::try_parse_from(["northwind-rag", "search", "dental", "--top", "3", "--mode", "keyword"])
            .unwrap();
        assert_eq!(cli.mode, Some(SearchMode::Keyword));
        match cli.command {
            Some(Command::Search { query, top }) => {
                assert_eq!(query.as_deref(), Some("dental"));
                assert_eq!(top, Some(3));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn zero_top_k_is_rejected() {
        assert!(Cli::try_parse_from(["northwind-rag", "--top-k", "0"]).is_err());
    }

    #[test]
    fn no_subcommand_means_demo() {
        let cli = Cli::try_parse_from(["northwind-rag"]).unwrap();
        assert!(cli.command.is_none());
    }
}
