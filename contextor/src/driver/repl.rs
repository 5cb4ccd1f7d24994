//! Interactive question loop.
//!
//! States: await input → exit, or run query → await input. Exit words
//! (`quit`, `exit`, `bye`) and blank lines never reach the responder; a blank
//! line gets a short hint before the next prompt.
//! Errors are printed and the loop continues. An interrupt is only observed
//! while waiting for input.

use std::{
    future::Future,
    io::{self, Write},
};

use colored::Colorize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, warn};

use crate::driver::rule;
use crate::pipeline::Responder;

const EXIT_WORDS: &[&str] = &["quit", "exit", "bye"];

/// Texts shown by the loop.
#[derive(Clone, Debug)]
pub struct ReplOptions {
    pub title: String,
    pub intro: String,
    pub prompt: String,
}

impl ReplOptions {
    /// Grounded Q&A over the benefits documents.
    pub fn grounded() -> Self {
        Self {
            title: "Interactive RAG".into(),
            intro: "Ask questions about the Northwind Benefits documents".into(),
            prompt: "What's your question? ".into(),
        }
    }

    /// Plain chat without retrieval.
    pub fn plain_chat() -> Self {
        Self {
            title: "Azure OpenAI Chat".into(),
            intro: "You can now ask questions!".into(),
            prompt: "You: ".into(),
        }
    }
}

/// Why the loop stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExitReason {
    Command,
    EndOfInput,
    Interrupted,
}

/// Counters reported when the loop ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReplSummary {
    pub questions: usize,
    pub failures: usize,
    pub exit: ExitReason,
}

/// `true` for `quit`/`exit`/`bye`, ignoring case and surrounding blanks.
pub fn is_exit_command(line: &str) -> bool {
    let line = line.trim();
    EXIT_WORDS.iter().any(|w| line.eq_ignore_ascii_case(w))
}

/// Runs the loop until an exit word, end of input, or `interrupt` resolves.
///
/// `input` is usually stdin wrapped in a `BufReader`, `interrupt` usually
/// `tokio::signal::ctrl_c()`. Only write failures are returned as errors.
pub async fn run_repl<R, W, I>(
    responder: &dyn Responder,
    input: R,
    out: &mut W,
    interrupt: I,
    opts: &ReplOptions,
) -> io::Result<ReplSummary>
where
    R: AsyncBufRead + Unpin,
    W: Write,
    I: Future,
{
    let mut lines = input.lines();
    tokio::pin!(interrupt);

    let mut questions = 0usize;
    let mut failures = 0usize;

    writeln!(out, "{}", opts.title.bold())?;
    writeln!(out, "{}", rule(50))?;
    writeln!(out, "{}", opts.intro)?;
    writeln!(out, "Type 'quit', 'exit' or 'bye' to end the session.")?;
    writeln!(out)?;

    let exit = loop {
        write!(out, "{}", opts.prompt)?;
        out.flush()?;

        let line = tokio::select! {
            _ = &mut interrupt => {
                writeln!(out)?;
                break ExitReason::Interrupted;
            }
            line = lines.next_line() => line?,
        };

        let Some(line) = line else {
            writeln!(out)?;
            break ExitReason::EndOfInput;
        };

        let question = line.trim();
        if question.is_empty() {
            writeln!(out, "Please enter a question.")?;
            continue;
        }
        if is_exit_command(question) {
            break ExitReason::Command;
        }

        questions += 1;
        debug!(n = questions, "loop question");
        writeln!(out, "\n--- Question #{questions} ---")?;

        match responder.respond(question).await {
            Ok(answer) => {
                writeln!(out, "\n{}", "Answer:".bold().green())?;
                writeln!(out, "{}", rule(30))?;
                writeln!(out, "{answer}")?;
                writeln!(out, "{}", rule(30))?;
                writeln!(out)?;
            }
            Err(e) => {
                failures += 1;
                warn!(error = %e, "loop question failed");
                writeln!(out, "\n{} {}", "Error:".red().bold(), e.user_message())?;
                writeln!(out)?;
            }
        }
    };

    writeln!(out, "Goodbye!")?;

    Ok(ReplSummary {
        questions,
        failures,
        exit,
    })
}
