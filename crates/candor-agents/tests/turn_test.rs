use std::sync::Arc;
use std::time::Duration;

use candor_agents::{
    AgentRuntime, HistoryEntry, Identity, OpenAiProvider, Persona, SerperSearchTool, ToolRegistry,
};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

/// Matches completion requests that carry no tool definitions.
struct WithoutTools;

impl Match for WithoutTools {
    fn matches(&self, request: &Request) -> bool {
        serde_json::from_slice::<serde_json::Value>(&request.body)
            .map(|body| body.get("tools").is_none())
            .unwrap_or(false)
    }
}

fn completion(message: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "id": "chatcmpl-1",
        "model": "gemini-2.0-flash",
        "choices": [{"index": 0, "message": message, "finish_reason": "stop"}]
    }))
}

fn runtime(llm: &MockServer, search: &MockServer, timeout: Duration) -> AgentRuntime {
    let provider =
        OpenAiProvider::new("llm-key".to_string(), Some(llm.uri())).with_timeout(timeout);
    let tools = ToolRegistry::new().with(Arc::new(
        SerperSearchTool::new("serper-key").with_endpoint(format!("{}/search", search.uri())),
    ));
    let persona = Persona::new(
        Identity::new("Ada", "Engineer"),
        "Designed the analytical engine's first program.".into(),
    );
    AgentRuntime::new(Arc::new(provider), persona, tools).with_model("gemini-2.0-flash")
}

#[tokio::test]
async fn answers_directly_without_tools() {
    let llm = MockServer::start().await;
    let search = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({
            "model": "gemini-2.0-flash",
            "messages": [
                {"role": "system"},
                {"role": "user", "content": "Tell me about yourself"}
            ]
        })))
        .respond_with(completion(json!({"role": "assistant", "content": "I am Ada..."})))
        .expect(1)
        .mount(&llm)
        .await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&search)
        .await;

    let rt = runtime(&llm, &search, Duration::from_secs(10));
    assert_eq!(rt.chat("Tell me about yourself", &[]).await, "I am Ada...");
}

#[tokio::test]
async fn searches_then_answers_with_coach_note() {
    let llm = MockServer::start().await;
    let search = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({
            "tools": [{"type": "function", "function": {"name": "google_search"}}]
        })))
        .respond_with(completion(json!({
            "role": "assistant",
            "content": null,
            "tool_calls": [{
                "id": "c1",
                "type": "function",
                "function": {"name": "google_search", "arguments": "{\"query\":\"Acme Corp\"}"}
            }]
        })))
        .expect(1)
        .mount(&llm)
        .await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(WithoutTools)
        .and(body_partial_json(json!({
            "messages": [
                {"role": "system"},
                {"role": "user", "content": "What do you know about Acme Corp?"},
                {"role": "assistant", "tool_calls": [{"id": "c1"}]},
                {"role": "tool", "tool_call_id": "c1", "content": "[{\"title\":\"Acme\"}]"}
            ]
        })))
        .respond_with(completion(json!({
            "role": "assistant",
            "content": "Acme is...\nCoach's Note: ..."
        })))
        .expect(1)
        .mount(&llm)
        .await;

    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "organic": [{"title": "Acme"}]
        })))
        .expect(1)
        .mount(&search)
        .await;

    let rt = runtime(&llm, &search, Duration::from_secs(10));
    let reply = rt.chat("What do you know about Acme Corp?", &[]).await;

    assert_eq!(reply, "Acme is...\nCoach's Note: ...");
}

#[tokio::test]
async fn search_outage_still_produces_an_answer() {
    let llm = MockServer::start().await;
    let search = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({"tools": [{"type": "function"}]})))
        .respond_with(completion(json!({
            "role": "assistant",
            "content": "",
            "tool_calls": [{
                "id": "c9",
                "type": "function",
                "function": {"name": "google_search", "arguments": "{\"query\":\"Acme\"}"}
            }]
        })))
        .mount(&llm)
        .await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(WithoutTools)
        .and(body_partial_json(json!({
            "messages": [{}, {}, {}, {"role": "tool", "tool_call_id": "c9"}]
        })))
        .respond_with(completion(json!({
            "role": "assistant",
            "content": "I couldn't reach search, but from experience..."
        })))
        .mount(&llm)
        .await;

    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&search)
        .await;

    let rt = runtime(&llm, &search, Duration::from_secs(10));
    let reply = rt.chat("Acme?", &[]).await;

    assert_eq!(reply, "I couldn't reach search, but from experience...");
}

#[tokio::test]
async fn first_completion_timeout_is_reported_as_system_error() {
    let llm = MockServer::start().await;
    let search = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            completion(json!({"role": "assistant", "content": "too late"}))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&llm)
        .await;

    let rt = runtime(&llm, &search, Duration::from_millis(200));
    let history = vec![HistoryEntry::pair("Hi", "Hello!")];
    let reply = rt.chat("Still there?", &history).await;

    assert!(reply.starts_with("System Error: "), "got: {reply}");
    assert!(reply.contains("timed out"));
}
