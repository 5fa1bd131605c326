use std::path::{Path, PathBuf};

use candor_common::{Error, Result};
use tracing::{info, warn};

use crate::model::AppConfig;

const CONFIG_DIR_NAME: &str = ".candor";
const CONFIG_FILE_NAME: &str = "config.yml";

/// Loads [`AppConfig`] from an optional YAML file, a `.env` file and the
/// process environment, in that order of increasing precedence.
pub struct ConfigLoader;

impl ConfigLoader {
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Load configuration. An explicit `path` must exist; the default path is
    /// only used when present.
    pub fn load(path: Option<&Path>) -> Result<AppConfig> {
        Self::load_with_env_file(path, None)
    }

    /// Like [`ConfigLoader::load`], reading `env_file` instead of searching for
    /// `.env` from the working directory. Values from the env file replace
    /// variables already set in the process.
    pub fn load_with_env_file(path: Option<&Path>, env_file: Option<&Path>) -> Result<AppConfig> {
        let mut config = match path {
            Some(p) => {
                if !p.is_file() {
                    return Err(Error::Config(format!(
                        "config file not found: {}",
                        p.display()
                    )));
                }
                Self::from_file(p)?
            }
            None => match Self::default_path().filter(|p| p.is_file()) {
                Some(p) => Self::from_file(&p)?,
                None => AppConfig::default(),
            },
        };

        match env_file {
            Some(p) => {
                dotenvy::from_path_override(p)
                    .map_err(|e| Error::Config(format!("{}: {}", p.display(), e)))?;
                info!("loaded environment from {}", p.display());
            }
            None => {
                if let Ok(env_path) = dotenvy::dotenv_override() {
                    info!("loaded environment from {}", env_path.display());
                }
            }
        }
        Self::apply_env(&mut config, |key| std::env::var(key).ok());

        for warning in config.warnings() {
            warn!("{warning}");
        }
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<AppConfig> {
        let raw = std::fs::read_to_string(path)?;
        let config = Self::from_yaml(&raw)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        info!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_yaml(raw: &str) -> Result<AppConfig> {
        if raw.trim().is_empty() {
            return Ok(AppConfig::default());
        }
        serde_yaml::from_str(raw).map_err(|e| Error::Config(format!("invalid YAML: {e}")))
    }

    /// Overlay environment variables onto `config`. Empty values are ignored.
    pub fn apply_env<F>(config: &mut AppConfig, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("GEMINI_API_KEY") {
            config.llm.api_key = Some(v);
        }
        if let Some(v) = get("GEMINI_BASE_URL") {
            config.llm.base_url = v;
        }
        if let Some(v) = get("SYSTEM_MODEL") {
            config.llm.model = v;
        }
        if let Some(v) = get("SERPER_API_KEY") {
            config.search.api_key = Some(v);
        }
        if let Some(v) = get("USER_NAME") {
            config.identity.name = v;
        }
        if let Some(v) = get("USER_ROLE") {
            config.identity.role = v;
        }
    }
}
