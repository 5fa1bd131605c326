use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    /// Network failure, timeout or non-success response from the completion backend.
    #[error("backend error: {0}")]
    Backend(String),

    #[error("tool execution failed: {0}")]
    ToolExecution(String),

    #[error("unknown tool: {0}")]
    UnknownTool(String),

    #[error("invalid arguments for tool '{tool}': {reason}")]
    ArgumentDecode { tool: String, reason: String },

    #[error("knowledge base error: {0}")]
    Knowledge(String),

    #[error("gateway error: {0}")]
    Gateway(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Errors that abort the remainder of a conversation turn. Everything else
    /// raised while dispatching a tool call is folded back into the conversation.
    pub fn is_turn_fatal(&self) -> bool {
        matches!(self, Error::Backend(_) | Error::ArgumentDecode { .. })
    }
}
