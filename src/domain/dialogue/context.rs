//! Prompt construction from the rolling conversation window.

use super::message::ChatMessage;

/// Renders stored exchanges as alternating "User:"/"Assistant:" lines.
///
/// Messages must already be in chronological order (oldest first).
pub fn render_history(messages: &[ChatMessage]) -> String {
    let mut lines = Vec::with_capacity(messages.len() * 2);
    for msg in messages {
        lines.push(format!("User: {}", msg.question));
        lines.push(format!("Assistant: {}", msg.answer));
    }
    lines.join("\n")
}

/// Wraps the current question in the history-aware prompt template.
///
/// With no history the question is sent verbatim so first contacts stay
/// cheap and unpolluted.
pub fn contextualize(history: &str, question: &str) -> String {
    if history.is_empty() {
        return question.to_string();
    }

    format!(
        "Previous conversation:\n{history}\n\nCurrent question: {question}\n\nAnswer the current question considering the conversation history."
    )
}
