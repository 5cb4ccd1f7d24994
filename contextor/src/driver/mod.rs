//! Front ends over a [`crate::Responder`]: one question, an interactive loop,
//! or a chat-UI callback.

pub mod repl;
pub mod single_shot;
pub mod ui;

/// Width of the `=` rules framing printed answers.
pub(crate) const RULE_WIDTH: usize = 60;

pub(crate) fn rule(width: usize) -> String {
    "=".repeat(width)
}
