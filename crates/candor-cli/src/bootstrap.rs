use std::sync::Arc;
use std::time::Duration;

use candor_agents::{
    AgentRuntime, Identity, OpenAiProvider, Persona, SerperSearchTool, ToolRegistry,
};
use candor_config::AppConfig;
use candor_knowledge::KnowledgeLoader;
use tracing::info;

pub fn identity_from_config(config: &AppConfig) -> Identity {
    Identity::new(&config.identity.name, &config.identity.role)
}

pub fn build_tools(config: &AppConfig) -> ToolRegistry {
    let search = SerperSearchTool::new(config.search.api_key.clone().unwrap_or_default())
        .with_endpoint(&config.search.endpoint)
        .with_max_results(config.search.max_results)
        .with_timeout(Duration::from_secs(config.search.timeout_secs));
    ToolRegistry::new().with(Arc::new(search))
}

pub fn build_provider(config: &AppConfig) -> OpenAiProvider {
    let llm = &config.llm;
    let mut provider = OpenAiProvider::new(
        llm.api_key.clone().unwrap_or_default(),
        Some(llm.base_url.clone()),
    )
    .with_timeout(Duration::from_secs(llm.timeout_secs));
    if let Some(referer) = &llm.referer {
        provider = provider.with_header("HTTP-Referer", referer);
    }
    if let Some(title) = &llm.title {
        provider = provider.with_header("X-Title", title);
    }
    provider
}

/// Load the knowledge base and wire the runtime. Runs once at startup.
pub fn build_runtime(config: &AppConfig) -> AgentRuntime {
    let identity = identity_from_config(config);
    info!("loading data for {}...", identity.display_name);
    let knowledge = KnowledgeLoader::new(&config.knowledge.dir).load();

    AgentRuntime::new(
        Arc::new(build_provider(config)),
        Persona::new(identity, knowledge),
        build_tools(config),
    )
    .with_model(&config.llm.model)
    .with_max_tokens(config.llm.max_tokens)
    .with_temperature(config.llm.temperature)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runtime_uses_configured_identity_model_and_knowledge() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("resume.txt"), "Shipped a search engine.").unwrap();

        let mut config = AppConfig::default();
        config.identity.name = "Ada".to_string();
        config.identity.role = "Engineer".to_string();
        config.llm.model = "gemini-1.5-pro".to_string();
        config.knowledge.dir = dir.path().to_path_buf();

        let runtime = build_runtime(&config);

        assert_eq!(runtime.model(), "gemini-1.5-pro");
        assert_eq!(runtime.tool_names(), ["google_search"]);
        assert!(runtime.system_prompt().contains("Ada, a Engineer"));
        assert!(runtime.system_prompt().contains("Shipped a search engine."));
        assert_eq!(runtime.persona().knowledge.sources(), ["resume.txt"]);
    }

    #[test]
    fn provider_timeout_follows_config() {
        let mut config = AppConfig::default();
        config.llm.timeout_secs = 45;
        assert_eq!(build_provider(&config).timeout(), Duration::from_secs(45));
    }
}
