use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::api;
use crate::state::SharedState;

const WEBCHAT_TEMPLATE: &str = include_str!("webchat.html");

/// Build the application router with all routes.
pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(web_chat))
        .route("/health", get(health))
        .route("/api/persona", get(api::persona))
        .route("/api/chat", post(api::chat))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Reports whether the completion backend is reachable.
async fn health(State(state): State<SharedState>) -> (StatusCode, &'static str) {
    match state.runtime.health_check().await {
        Ok(true) => (StatusCode::OK, "ok"),
        Ok(false) => (StatusCode::SERVICE_UNAVAILABLE, "backend unavailable"),
        Err(e) => {
            warn!("health check failed: {}", e);
            (StatusCode::SERVICE_UNAVAILABLE, "backend unavailable")
        }
    }
}

async fn web_chat(State(state): State<SharedState>) -> Html<String> {
    let name = &state.runtime.persona().identity.display_name;
    Html(WEBCHAT_TEMPLATE.replace("{{NAME}}", &escape_html(name)))
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
