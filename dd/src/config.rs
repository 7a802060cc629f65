//! deard configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main deard configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// LLM provider configuration
    pub llm: LlmConfig,

    /// Conversation history shaping
    pub history: HistoryConfig,

    /// Storage configuration
    pub storage: StorageConfig,
}

impl Config {
    /// Validate configuration before use
    ///
    /// Call this early in startup to fail fast with a clear error message
    /// instead of a degraded first turn.
    pub fn validate(&self) -> Result<()> {
        if std::env::var(&self.llm.api_key_env).is_err() {
            return Err(eyre::eyre!(
                "LLM API key not found. Set the {} environment variable.",
                self.llm.api_key_env
            ));
        }
        Ok(())
    }

    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .deard.yml
        let local_config = PathBuf::from(".deard.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/deard/deard.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("deard").join("deard.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        // No config file found, use defaults
        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// LLM provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// API base URL (OpenAI-compatible chat completions)
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Environment variable containing the API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// Model identifier for the planner stage
    #[serde(rename = "planner-model")]
    pub planner_model: String,

    /// Model identifier for the generator stage
    #[serde(rename = "generator-model")]
    pub generator_model: String,

    /// Request timeout in milliseconds (bounds each completion call)
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,

    /// Maximum tokens per response
    #[serde(rename = "max-tokens")]
    pub max_tokens: u32,

    /// Site URL sent as the HTTP-Referer attribution header
    #[serde(rename = "site-url")]
    pub site_url: String,

    /// Application name sent as the X-Title attribution header
    #[serde(rename = "app-name")]
    pub app_name: String,
}

impl LlmConfig {
    /// Read the API key from the configured environment variable
    pub fn get_api_key(&self) -> Result<String> {
        let key = std::env::var(&self.api_key_env)
            .map_err(|_| eyre::eyre!("Environment variable {} not set", self.api_key_env))?;
        let key = key.trim().to_string();
        if key.is_empty() {
            return Err(eyre::eyre!("Environment variable {} is empty", self.api_key_env));
        }
        Ok(key)
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://openrouter.ai/api/v1".to_string(),
            api_key_env: "OPENROUTER_API_KEY".to_string(),
            planner_model: "deepseek/deepseek-chat-v3-0324".to_string(),
            generator_model: "deepseek/deepseek-chat-v3-0324".to_string(),
            timeout_ms: 20_000,
            max_tokens: 1024,
            site_url: "https://deard.local".to_string(),
            app_name: "deard".to_string(),
        }
    }
}

/// Conversation history shaping
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Number of recent turns loaded per request
    pub window: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { window: 10 }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the SQLite database
    #[serde(rename = "store-path")]
    pub store_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        let store_path = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("deard")
            .join(journalstore::DEFAULT_DB_NAME);

        Self { store_path }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.llm.base_url, "https://openrouter.ai/api/v1");
        assert_eq!(config.llm.api_key_env, "OPENROUTER_API_KEY");
        assert_eq!(config.llm.timeout_ms, 20_000);
        assert_eq!(config.history.window, 10);
    }

    #[test]
    fn test_deserialize_config() {
        let yaml = r#"
llm:
  base-url: https://api.example.com/v1
  api-key-env: MY_API_KEY
  planner-model: some/planner
  generator-model: some/generator
  timeout-ms: 5000
  max-tokens: 256
  site-url: https://example.com
  app-name: example

history:
  window: 4
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.llm.base_url, "https://api.example.com/v1");
        assert_eq!(config.llm.api_key_env, "MY_API_KEY");
        assert_eq!(config.llm.planner_model, "some/planner");
        assert_eq!(config.llm.generator_model, "some/generator");
        assert_eq!(config.llm.timeout_ms, 5000);
        assert_eq!(config.history.window, 4);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let yaml = r#"
llm:
  planner-model: other/model
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        // Specified value
        assert_eq!(config.llm.planner_model, "other/model");

        // Defaults for unspecified
        assert_eq!(config.llm.generator_model, "deepseek/deepseek-chat-v3-0324");
        assert_eq!(config.llm.api_key_env, "OPENROUTER_API_KEY");
        assert_eq!(config.history.window, 10);
    }

    #[test]
    fn test_get_api_key_missing_env() {
        let config = LlmConfig {
            api_key_env: "DEARD_TEST_KEY_THAT_IS_NEVER_SET".to_string(),
            ..Default::default()
        };
        assert!(config.get_api_key().is_err());
    }
}
