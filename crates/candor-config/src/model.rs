use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub const DEFAULT_LLM_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_SEARCH_ENDPOINT: &str = "https://google.serper.dev/search";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub llm: LlmConfig,
    pub search: SearchConfig,
    pub identity: IdentityConfig,
    pub knowledge: KnowledgeConfig,
    pub gateway: GatewayConfig,
}

impl AppConfig {
    /// Non-fatal configuration problems worth surfacing at startup.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.llm.api_key.as_deref().is_none_or(str::is_empty) {
            warnings.push(
                "LLM API key is missing; completion requests will fail until GEMINI_API_KEY is set"
                    .to_string(),
            );
        }
        if self.search.api_key.as_deref().is_none_or(str::is_empty) {
            warnings.push(
                "search API key is missing; google_search will return errors until SERPER_API_KEY is set"
                    .to_string(),
            );
        }
        warnings
    }
}

/// OpenAI-compatible completion backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f64>,
    /// Sent as `HTTP-Referer`; some OpenAI-compatible routers use it for attribution.
    pub referer: Option<String>,
    /// Sent as `X-Title`.
    pub title: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_LLM_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_tokens: None,
            temperature: None,
            referer: Some("http://localhost:7860".to_string()),
            title: Some("Interview Bot".to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub api_key: Option<String>,
    pub endpoint: String,
    pub max_results: usize,
    pub timeout_secs: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: DEFAULT_SEARCH_ENDPOINT.to_string(),
            max_results: 2,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// The person being impersonated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    pub name: String,
    pub role: String,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            name: "Candidate".to_string(),
            role: "Professional".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KnowledgeConfig {
    pub dir: PathBuf,
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("data"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7860,
        }
    }
}
