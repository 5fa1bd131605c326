pub mod history;
pub mod openai;
pub mod persona;
pub mod prompt;
pub mod providers;
pub mod runtime;
pub mod tools;

pub use history::{HistoryEntry, normalize_history};
pub use openai::OpenAiProvider;
pub use persona::{Identity, Persona};
pub use prompt::build_system_prompt;
pub use providers::{
    ChatMessage, ChatRole, LlmProvider, LlmRequest, LlmResponse, ToolCallRequest, ToolDefinition,
    Usage,
};
pub use runtime::{AgentRuntime, SYSTEM_ERROR_PREFIX};
pub use tools::{SerperSearchTool, Tool, ToolOutput, ToolRegistry};
