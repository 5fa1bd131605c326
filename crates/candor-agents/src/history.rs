use serde::Deserialize;
use tracing::warn;

use crate::providers::{ChatMessage, ChatRole};

/// One prior turn as handed over by a chat front end.
///
/// Front ends send either `[user, assistant]` pairs (the assistant side may be
/// `null` while a reply is pending) or already-structured messages. Anything
/// else lands in `Unrecognized` and is skipped during normalization.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum HistoryEntry {
    Pair(String, Option<String>),
    Structured(ChatMessage),
    Unrecognized(serde_json::Value),
}

impl HistoryEntry {
    pub fn pair(user: impl Into<String>, assistant: impl Into<String>) -> Self {
        Self::Pair(user.into(), Some(assistant.into()))
    }
}

/// Flatten `history` into a conversation that starts with exactly one system
/// message and ends with `message` as the latest user turn.
pub fn normalize_history(
    system_prompt: &str,
    history: &[HistoryEntry],
    message: &str,
) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(history.len() * 2 + 2);
    messages.push(ChatMessage::system(system_prompt));

    for (index, entry) in history.iter().enumerate() {
        match entry {
            HistoryEntry::Pair(user, assistant) => {
                messages.push(ChatMessage::user(user.clone()));
                if let Some(reply) = assistant.as_deref().filter(|r| !r.is_empty()) {
                    messages.push(ChatMessage::assistant(reply));
                }
            }
            HistoryEntry::Structured(msg) if msg.role == ChatRole::System => {
                warn!(index, "dropping system message from history");
            }
            // Tool calls and results are only valid within the turn that made them.
            HistoryEntry::Structured(msg) if msg.role == ChatRole::Tool => {
                warn!(index, "dropping tool result from history");
            }
            HistoryEntry::Structured(msg) if !msg.tool_calls.is_empty() => {
                warn!(index, "dropping assistant tool-call message from history");
            }
            HistoryEntry::Structured(msg) => messages.push(msg.clone()),
            HistoryEntry::Unrecognized(_) => {
                warn!(index, "skipping unrecognized history entry");
            }
        }
    }

    messages.push(ChatMessage::user(message));
    messages
}
