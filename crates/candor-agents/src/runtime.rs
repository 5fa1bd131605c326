use std::sync::Arc;

use candor_common::{Error, Result};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::history::{HistoryEntry, normalize_history};
use crate::persona::Persona;
use crate::prompt::build_system_prompt;
use crate::providers::{
    ChatMessage, LlmProvider, LlmRequest, LlmResponse, ToolCallRequest, ToolDefinition,
};
use crate::tools::ToolRegistry;

/// Marker prepended to replies for turns that failed outright.
pub const SYSTEM_ERROR_PREFIX: &str = "System Error";

/// Progress of a single user turn. Tool dispatch happens at most once:
/// `AwaitingSecondCompletion` always sends an empty tool list and always ends
/// in `Done`.
enum TurnState {
    BuildingRequest,
    AwaitingFirstCompletion {
        messages: Vec<ChatMessage>,
    },
    DispatchingTools {
        messages: Vec<ChatMessage>,
        response: LlmResponse,
    },
    AwaitingSecondCompletion {
        messages: Vec<ChatMessage>,
    },
    Done(String),
}

/// Answers interview questions in character, with at most one round of tool
/// calls per turn.
///
/// Holds no mutable state, so a single instance can serve concurrent turns.
pub struct AgentRuntime {
    provider: Arc<dyn LlmProvider>,
    tools: ToolRegistry,
    persona: Persona,
    system_prompt: String,
    model: String,
    max_tokens: Option<u32>,
    temperature: Option<f64>,
}

impl AgentRuntime {
    pub fn new(provider: Arc<dyn LlmProvider>, persona: Persona, tools: ToolRegistry) -> Self {
        let system_prompt = build_system_prompt(&persona.identity, &persona.knowledge);
        info!(
            provider = provider.provider_id(),
            tools = tools.len(),
            "agent runtime ready for {}",
            persona.identity.display_name
        );
        Self {
            provider,
            tools,
            persona,
            system_prompt,
            model: String::new(),
            max_tokens: None,
            temperature: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: Option<f64>) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn persona(&self) -> &Persona {
        &self.persona
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.names()
    }

    pub async fn health_check(&self) -> Result<bool> {
        self.provider.health_check().await
    }

    /// Answer `message` given the prior `history`. Never fails: turn-level
    /// errors come back as a reply prefixed with [`SYSTEM_ERROR_PREFIX`].
    #[instrument(skip_all, fields(turn_id = %Uuid::new_v4()))]
    pub async fn chat(&self, message: &str, history: &[HistoryEntry]) -> String {
        match self.run_turn(message, history).await {
            Ok(reply) => reply,
            Err(e) => {
                error!("turn failed: {}", e);
                format!("{SYSTEM_ERROR_PREFIX}: {e}")
            }
        }
    }

    /// Drive one turn through its states and return the final reply.
    pub async fn run_turn(&self, message: &str, history: &[HistoryEntry]) -> Result<String> {
        let mut state = TurnState::BuildingRequest;
        loop {
            state = match state {
                TurnState::BuildingRequest => TurnState::AwaitingFirstCompletion {
                    messages: normalize_history(&self.system_prompt, history, message),
                },
                TurnState::AwaitingFirstCompletion { messages } => {
                    let response = self
                        .complete(messages.clone(), self.tools.definitions())
                        .await?;
                    if response.has_tool_calls() {
                        TurnState::DispatchingTools { messages, response }
                    } else {
                        TurnState::Done(response.content)
                    }
                }
                TurnState::DispatchingTools {
                    mut messages,
                    response,
                } => {
                    self.dispatch_tools(&mut messages, response).await?;
                    TurnState::AwaitingSecondCompletion { messages }
                }
                TurnState::AwaitingSecondCompletion { messages } => {
                    let response = self.complete(messages, Vec::new()).await?;
                    if response.has_tool_calls() {
                        warn!(
                            count = response.tool_calls.len(),
                            "ignoring tool calls requested after the dispatch round"
                        );
                    }
                    TurnState::Done(response.content)
                }
                TurnState::Done(reply) => return Ok(reply),
            };
        }
    }

    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        tools: Vec<ToolDefinition>,
    ) -> Result<LlmResponse> {
        let request = LlmRequest {
            model: self.model.clone(),
            messages,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            tools,
        };
        self.provider.complete(&request).await.map_err(|e| match e {
            Error::Backend(_) => e,
            other => Error::Backend(other.to_string()),
        })
    }

    /// Append the tool-calling assistant turn and one tool result per call,
    /// in request order. Non-fatal call errors become the result text.
    async fn dispatch_tools(
        &self,
        messages: &mut Vec<ChatMessage>,
        response: LlmResponse,
    ) -> Result<()> {
        let calls = response.tool_calls;
        messages.push(ChatMessage::assistant_with_tool_calls(
            response.content,
            calls.clone(),
        ));

        for call in &calls {
            let result = match self.dispatch(call).await {
                Ok(output) => output,
                Err(e) if !e.is_turn_fatal() => {
                    warn!(call_id = %call.id, tool = %call.name, "{}", e);
                    format!("Error: {e}")
                }
                Err(e) => return Err(e),
            };
            messages.push(ChatMessage::tool_result(call.id.clone(), result));
        }
        Ok(())
    }

    async fn dispatch(&self, call: &ToolCallRequest) -> Result<String> {
        let tool = self
            .tools
            .get(&call.name)
            .ok_or_else(|| Error::UnknownTool(call.name.clone()))?;

        let input = decode_arguments(call)?;
        debug!(call_id = %call.id, tool = %call.name, "dispatching tool");

        let output = tool.execute(input).await.map_err(|e| match e {
            Error::ToolExecution(_) => e,
            other => Error::ToolExecution(other.to_string()),
        })?;
        if output.is_error {
            warn!(tool = %call.name, "tool reported an error: {}", output.content);
        }
        Ok(output.content)
    }
}

/// Parse the JSON argument text of `call`. Blank arguments mean "no arguments".
fn decode_arguments(call: &ToolCallRequest) -> Result<serde_json::Value> {
    if call.arguments.trim().is_empty() {
        return Ok(serde_json::Value::Object(Default::default()));
    }
    serde_json::from_str(&call.arguments).map_err(|e| Error::ArgumentDecode {
        tool: call.name.clone(),
        reason: e.to_string(),
    })
}
