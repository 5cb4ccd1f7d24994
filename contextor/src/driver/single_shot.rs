//! One question in, one answer out.

use std::io::{self, Write};

use colored::Colorize;
use tracing::warn;

use crate::driver::{RULE_WIDTH, rule};
use crate::pipeline::Responder;

/// Question used when none is given on the command line.
pub const DEFAULT_QUESTION: &str = "What are the benefits of the Northwind Standard plan?";

/// Answers `question` once and writes the framed answer (or the user-facing
/// error) to `out`.
///
/// Returns `Ok(true)` when an answer was printed, `Ok(false)` when an error
/// message was printed instead; `Err` only for write failures.
pub async fn run_once<W: Write>(
    responder: &dyn Responder,
    question: &str,
    out: &mut W,
) -> io::Result<bool> {
    let question = question.trim();
    let question = if question.is_empty() {
        DEFAULT_QUESTION
    } else {
        question
    };

    writeln!(out, "{} {}", "Question:".bold(), question)?;

    match responder.respond(question).await {
        Ok(answer) => {
            writeln!(out, "{}", rule(RULE_WIDTH))?;
            writeln!(out, "{}", "RAG RESPONSE".bold().green())?;
            writeln!(out, "{}", rule(RULE_WIDTH))?;
            writeln!(out, "{answer}")?;
            writeln!(out, "{}", rule(RULE_WIDTH))?;
            Ok(true)
        }
        Err(e) => {
            warn!(error = %e, "single-shot question failed");
            writeln!(out, "{} {}", "Error:".red().bold(), e.user_message())?;
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedResponder;

    #[tokio::test]
    async fn blank_question_falls_back_to_default() {
        colored::control::set_override(false);
        let responder = ScriptedResponder::new();
        let mut out = Vec::new();
        assert!(run_once(&responder, "  ", &mut out).await.unwrap());

        assert_eq!(responder.seen(), [DEFAULT_QUESTION]);
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains(&format!("answer to {DEFAULT_QUESTION}")));
    }

    #[tokio::test]
    async fn failure_prints_user_message() {
        colored::control::set_override(false);
        let responder = ScriptedResponder::new();
        let mut out = Vec::new();
        assert!(!run_once(&responder, "boom", &mut out).await.unwrap());

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Error: Model deployment 'gpt-4o' not found"));
    }
}
