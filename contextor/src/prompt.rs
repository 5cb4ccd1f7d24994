//! Prompt builder: fixed grounding instructions + the question + the sources.
//!
//! Layout of a grounded prompt:
//!
//! ```text
//! <instructions>
//! Query: <question>
//! Sources:
//! <title 1>: <content 1>
//! =================
//! <title 2>: <content 2>
//! ```
//!
//! Contents are inserted verbatim, line breaks included. The only rewrite is a
//! content line that is exactly a separator, so no source can forge one.
//! Titles and the question are kept to a single line.

use std::borrow::Cow;

use rag_store::SearchHit;

/// Instructions that restrict the model to the supplied sources.
pub const GROUNDED_INSTRUCTIONS: &str = "\
You are an AI assistant that helps users learn from the information found in the source material.
Answer the query using only the sources provided below.
Use bullets if the answer has multiple points.
If the answer is longer than 3 sentences, provide a summary.
Answer ONLY with the facts listed in the list of sources below. Cite your source when you answer the question.
If there isn't enough information below, say you don't know.
Do not generate answers that don't use the sources below.";

/// Line placed between two sources.
pub const SOURCE_SEPARATOR: &str = "=================";

/// Stands in for a content line that would read as [`SOURCE_SEPARATOR`].
const ESCAPED_SEPARATOR: &str = "-----------------";

/// Written in place of the sources when retrieval found nothing.
pub const NO_SOURCES: &str =
    "No sources were retrieved for this query. Reply that there is not enough information to answer.";

/// System message for plain chat without retrieval.
pub const PLAIN_CHAT_SYSTEM: &str =
    "You are a helpful assistant. Provide clear and concise answers.";

/// Build the grounded prompt for `query` from ranked `hits`.
///
/// # Example
/// ```
/// use contextor::prompt::{build_grounded_prompt, NO_SOURCES};
///
/// let prompt = build_grounded_prompt("What is covered?", &[]);
/// assert!(prompt.contains("Query: What is covered?"));
/// assert!(prompt.ends_with(NO_SOURCES));
/// ```
pub fn build_grounded_prompt(query: &str, hits: &[SearchHit]) -> String {
    let mut out = String::with_capacity(GROUNDED_INSTRUCTIONS.len() + 256);
    out.push_str(GROUNDED_INSTRUCTIONS);
    out.push_str("\nQuery: ");
    out.push_str(&single_line(query));
    out.push_str("\nSources:\n");
    out.push_str(&format_sources(hits));
    out
}

/// `<title>: <content>` lines joined by [`SOURCE_SEPARATOR`], or [`NO_SOURCES`].
pub fn format_sources(hits: &[SearchHit]) -> String {
    if hits.is_empty() {
        return NO_SOURCES.to_string();
    }

    hits.iter()
        .map(|h| format!("{}: {}", single_line(&h.title), escape_separators(&h.content)))
        .collect::<Vec<_>>()
        .join(&format!("\n{SOURCE_SEPARATOR}\n"))
}

/// Trimmed, with line breaks turned into spaces.
fn single_line(text: &str) -> String {
    text.trim().replace(|c: char| matches!(c, '\r' | '\n'), " ")
}

/// `text` unchanged unless one of its lines, trimmed, equals the separator.
fn escape_separators(text: &str) -> Cow<'_, str> {
    let forged = |line: &str| line.trim() == SOURCE_SEPARATOR;
    if !text.split('\n').any(forged) {
        return Cow::Borrowed(text);
    }
    let escaped = text
        .split('\n')
        .map(|line| if forged(line) { ESCAPED_SEPARATOR } else { line })
        .collect::<Vec<_>>()
        .join("\n");
    Cow::Owned(escaped)
}
