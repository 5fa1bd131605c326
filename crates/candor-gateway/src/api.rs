use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use candor_agents::HistoryEntry;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::state::SharedState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PersonaResponse {
    pub name: String,
    pub role: String,
    pub knowledge_files: Vec<String>,
}

/// Error body for requests rejected before a turn starts. Turn failures are
/// not errors here; they come back as a normal reply.
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(serde_json::json!({ "error": self.message })),
        )
            .into_response()
    }
}

pub async fn chat(
    State(state): State<SharedState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    if request.message.trim().is_empty() {
        return Err(ApiError::bad_request("message must not be empty"));
    }

    info!(history = request.history.len(), "chat request");
    let reply = state
        .runtime
        .chat(&request.message, &request.history)
        .await;
    Ok(Json(ChatResponse { reply }))
}

pub async fn persona(State(state): State<SharedState>) -> Json<PersonaResponse> {
    let persona = state.runtime.persona();
    Json(PersonaResponse {
        name: persona.identity.display_name.clone(),
        role: persona.identity.role_title.clone(),
        knowledge_files: persona.knowledge.sources().to_vec(),
    })
}
