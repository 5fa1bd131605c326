use std::sync::Arc;

use candor_agents::AgentRuntime;

pub type SharedState = Arc<AppState>;

/// Read-only state shared by every request handler.
pub struct AppState {
    pub runtime: Arc<AgentRuntime>,
}

impl AppState {
    pub fn new(runtime: Arc<AgentRuntime>) -> Self {
        Self { runtime }
    }
}
