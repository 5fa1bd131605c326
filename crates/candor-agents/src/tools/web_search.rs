use std::time::Duration;

use async_trait::async_trait;
use candor_common::{Error, Result};
use serde_json::json;
use tracing::{debug, info};

use crate::tools::{Tool, ToolOutput};

/// Canonical tool name, referenced by the system prompt.
pub const GOOGLE_SEARCH: &str = "google_search";

pub const SERPER_ENDPOINT: &str = "https://google.serper.dev/search";
const DEFAULT_MAX_RESULTS: usize = 2;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Google web search through the Serper API.
///
/// [`SerperSearchTool::search`] never fails: network errors, non-2xx statuses
/// and unparseable bodies come back as a `"Search Error: ..."` string so the
/// model can react to them. One attempt per call, no retries.
pub struct SerperSearchTool {
    http: reqwest::Client,
    api_key: String,
    endpoint: String,
    max_results: usize,
    timeout: Duration,
}

impl SerperSearchTool {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
            endpoint: SERPER_ENDPOINT.to_string(),
            max_results: DEFAULT_MAX_RESULTS,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub async fn search(&self, query: &str) -> String {
        self.run(query).await.content
    }

    async fn run(&self, query: &str) -> ToolOutput {
        info!("searching google for: {}", query);
        match self.fetch_organic(query).await {
            Ok(results) => {
                debug!(count = results.len(), "search returned results");
                ToolOutput::success(serde_json::Value::Array(results).to_string())
            }
            Err(e) => ToolOutput::error(format!("Search Error: {e}")),
        }
    }

    async fn fetch_organic(&self, query: &str) -> Result<Vec<serde_json::Value>> {
        let response = self
            .http
            .post(&self.endpoint)
            .timeout(self.timeout)
            .header("X-API-KEY", &self.api_key)
            .json(&json!({ "q": query }))
            .send()
            .await
            .map_err(|e| Error::ToolExecution(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::ToolExecution(format!(
                "search API returned status {}",
                status.as_u16()
            )));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| Error::ToolExecution(format!("failed to parse search results: {e}")))?;

        Ok(top_organic(&body, self.max_results))
    }
}

/// First `limit` entries of the `organic` array; a missing array is empty.
fn top_organic(body: &serde_json::Value, limit: usize) -> Vec<serde_json::Value> {
    body.get("organic")
        .and_then(|v| v.as_array())
        .map(|items| items.iter().take(limit).cloned().collect())
        .unwrap_or_default()
}

#[async_trait]
impl Tool for SerperSearchTool {
    fn name(&self) -> &str {
        GOOGLE_SEARCH
    }

    fn description(&self) -> &str {
        "Use this to search for company info, recent news, or technical concepts."
    }

    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, input: serde_json::Value) -> Result<ToolOutput> {
        let query = input["query"]
            .as_str()
            .ok_or_else(|| Error::ToolExecution("missing or invalid 'query' argument".into()))?;

        Ok(self.run(query).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_organic_truncates() {
        let body = json!({"organic": [{"title": "a"}, {"title": "b"}, {"title": "c"}]});
        let top = top_organic(&body, 2);
        assert_eq!(top, vec![json!({"title": "a"}), json!({"title": "b"})]);
    }

    #[test]
    fn top_organic_returns_all_when_fewer() {
        let body = json!({"organic": [{"title": "only"}]});
        assert_eq!(top_organic(&body, 2), vec![json!({"title": "only"})]);
    }

    #[test]
    fn top_organic_missing_array_is_empty() {
        assert!(top_organic(&json!({"knowledgeGraph": {}}), 2).is_empty());
        assert!(top_organic(&json!({"organic": "nope"}), 2).is_empty());
    }

    #[tokio::test]
    async fn execute_without_query_is_tool_error() {
        let tool = SerperSearchTool::new("key");
        let err = tool.execute(json!({"q": "Acme"})).await.unwrap_err();
        assert!(matches!(err, Error::ToolExecution(_)));
    }

    #[test]
    fn schema_requires_query() {
        let schema = SerperSearchTool::new("key").input_schema();
        assert_eq!(schema["required"], json!(["query"]));
        assert_eq!(schema["properties"]["query"]["type"], "string");
    }
}
