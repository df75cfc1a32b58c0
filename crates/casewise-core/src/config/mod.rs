//! Configuration management for Casewise.
//!
//! Configuration is loaded from multiple sources with the following priority:
//! 1. Environment variables (highest priority)
//! 2. Project-local `casewise.toml` file
//! 3. User config `~/.config/casewise/config.toml`
//! 4. Built-in defaults (lowest priority)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

mod defaults;

pub use defaults::*;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Packaged content configuration.
    pub content: ContentConfig,

    /// Graph database connection.
    pub graph: GraphConfig,

    /// LLM provider configuration.
    pub llm: LLMConfig,

    /// Report drafting configuration.
    pub report: ReportConfig,

    /// API server configuration.
    pub server: ServerConfig,
}

impl Config {
    /// Load configuration from default locations.
    ///
    /// Searches for config in order:
    /// 1. `./casewise.toml` (project local)
    /// 2. `~/.config/casewise/config.toml` (user config)
    /// 3. Falls back to defaults
    pub fn load() -> Result<Self, ConfigError> {
        if Path::new("casewise.toml").exists() {
            return Self::from_file("casewise.toml");
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("casewise").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        Self::from_defaults()
    }

    /// Built-in defaults with environment overrides applied.
    fn from_defaults() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content)?;

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var("CASEWISE_CASES_PATH") {
            self.content.cases_path = path;
        }

        // Graph overrides
        if let Some(uri) = env_any(&["CASEWISE_NEO4J_URI", "NEO4J_URI"]) {
            self.graph.uri = Some(uri);
        }
        if let Some(user) = env_any(&["CASEWISE_NEO4J_USERNAME", "NEO4J_USERNAME"]) {
            self.graph.username = user;
        }
        if let Some(password) = env_any(&["CASEWISE_NEO4J_PASSWORD", "NEO4J_PASSWORD"]) {
            self.graph.password = Some(password);
        }

        // LLM overrides
        if let Ok(provider) = std::env::var("CASEWISE_LLM_PROVIDER") {
            self.llm.provider = provider;
        }
        if let Ok(model) = std::env::var("CASEWISE_LLM_MODEL") {
            self.llm.model = Some(model);
        }
        if let Ok(url) = std::env::var("CASEWISE_LLM_BASE_URL") {
            self.llm.base_url = Some(url);
        }
        if let Ok(key) = std::env::var("CASEWISE_LLM_API_KEY") {
            self.llm.api_key = Some(key);
        }
        if let Ok(temperature) = std::env::var("CASEWISE_LLM_TEMPERATURE") {
            if let Ok(t) = temperature.parse() {
                self.llm.temperature = t;
            }
        }

        // Report overrides
        if let Ok(dir) = std::env::var("CASEWISE_REPORT_DIR") {
            self.report.output_dir = dir;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(ConfigError::Invalid(format!(
                "llm.temperature must be between 0 and 2, got {}",
                self.llm.temperature
            )));
        }
        if self.content.cases_path.trim().is_empty() {
            return Err(ConfigError::Invalid("content.cases_path is empty".to_string()));
        }
        Ok(())
    }

    /// Render as TOML. Secrets are left out.
    pub fn render(&self) -> String {
        toml::to_string_pretty(self).unwrap_or_default()
    }
}

fn env_any(keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| std::env::var(k).ok())
}

/// Packaged content configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    /// Path to the case list (JSON array).
    pub cases_path: String,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            cases_path: DEFAULT_CASES_PATH.to_string(),
        }
    }
}

impl ContentConfig {
    pub fn cases_path(&self) -> PathBuf {
        PathBuf::from(&self.cases_path)
    }
}

/// Graph database connection configuration.
///
/// The graph is optional: without a URI every query reports the store as
/// unavailable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Bolt URI, e.g. `bolt://localhost:7687`. `None` disables the graph.
    pub uri: Option<String>,

    /// Database user.
    pub username: String,

    /// Database password (can also be set via environment variable).
    #[serde(skip_serializing)]
    pub password: Option<String>,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            uri: None,
            username: DEFAULT_NEO4J_USERNAME.to_string(),
            password: None,
        }
    }
}

impl GraphConfig {
    /// Returns true when enough is configured to attempt a connection.
    pub fn is_configured(&self) -> bool {
        self.uri.as_deref().is_some_and(|u| !u.trim().is_empty())
    }
}

/// LLM provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LLMConfig {
    /// Provider name: "deepseek", "openai", "ollama" or "openai-compatible".
    pub provider: String,

    /// Model name (provider-specific).
    pub model: Option<String>,

    /// Base URL for API (for openai-compatible providers).
    pub base_url: Option<String>,

    /// API key (can also be set via environment variable).
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Sampling temperature.
    pub temperature: f32,
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            provider: DEFAULT_LLM_PROVIDER.to_string(),
            model: None,
            base_url: None,
            api_key: None,
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

impl LLMConfig {
    /// Get the model name, falling back to provider defaults.
    pub fn model_or_default(&self) -> String {
        self.model.clone().unwrap_or_else(|| {
            match self.provider.as_str() {
                "deepseek" => DEFAULT_DEEPSEEK_MODEL.to_string(),
                "ollama" => DEFAULT_OLLAMA_MODEL.to_string(),
                _ => DEFAULT_OPENAI_MODEL.to_string(),
            }
        })
    }

    /// Get the base URL, falling back to provider defaults.
    pub fn base_url_or_default(&self) -> String {
        self.base_url.clone().unwrap_or_else(|| {
            match self.provider.as_str() {
                "deepseek" => DEFAULT_DEEPSEEK_URL.to_string(),
                "ollama" => DEFAULT_OLLAMA_URL.to_string(),
                _ => DEFAULT_OPENAI_URL.to_string(),
            }
        })
    }

    /// Get API key from config or environment.
    pub fn api_key_or_env(&self) -> Option<String> {
        self.api_key.clone()
            .or_else(|| std::env::var("CASEWISE_LLM_API_KEY").ok())
            .or_else(|| match self.provider.as_str() {
                "deepseek" => std::env::var("DEEPSEEK_API_KEY").ok(),
                "ollama" => None,
                _ => std::env::var("OPENAI_API_KEY").ok(),
            })
    }
}

/// Report drafting configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Directory where saved reports are written.
    pub output_dir: String,

    /// Token budget for individual reports.
    pub personal_max_tokens: u32,

    /// Token budget for module reports.
    pub module_max_tokens: u32,

    /// Token budget for whole-course reports.
    pub overall_max_tokens: u32,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: DEFAULT_REPORT_DIR.to_string(),
            personal_max_tokens: DEFAULT_PERSONAL_MAX_TOKENS,
            module_max_tokens: DEFAULT_MODULE_MAX_TOKENS,
            overall_max_tokens: DEFAULT_OVERALL_MAX_TOKENS,
        }
    }
}

/// API server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_SERVER_HOST.to_string(),
            port: DEFAULT_SERVER_PORT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.content.cases_path, DEFAULT_CASES_PATH);
        assert_eq!(config.llm.provider, DEFAULT_LLM_PROVIDER);
        assert_eq!(config.report.overall_max_tokens, DEFAULT_OVERALL_MAX_TOKENS);
        assert!(!config.graph.is_configured());
    }

    #[test]
    fn test_config_to_toml_hides_secrets() {
        let mut config = Config::default();
        config.graph.password = Some("hunter2".to_string());
        config.llm.api_key = Some("sk-secret".to_string());

        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[content]"));
        assert!(toml_str.contains("[llm]"));
        assert!(toml_str.contains("[report]"));
        assert!(!toml_str.contains("hunter2"));
        assert!(!toml_str.contains("sk-secret"));
    }

    #[test]
    fn test_model_or_default() {
        let mut config = LLMConfig::default();
        assert_eq!(config.model_or_default(), DEFAULT_DEEPSEEK_MODEL);

        config.provider = "ollama".to_string();
        assert_eq!(config.model_or_default(), DEFAULT_OLLAMA_MODEL);

        config.provider = "openai".to_string();
        assert_eq!(config.model_or_default(), DEFAULT_OPENAI_MODEL);

        config.model = Some("custom-model".to_string());
        assert_eq!(config.model_or_default(), "custom-model");
    }

    #[test]
    fn test_env_overrides_are_validated_without_a_file() {
        std::env::set_var("CASEWISE_LLM_TEMPERATURE", "9");
        let result = Config::from_defaults();
        std::env::remove_var("CASEWISE_LLM_TEMPERATURE");

        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_base_url_or_default() {
        let mut config = LLMConfig::default();
        assert_eq!(config.base_url_or_default(), DEFAULT_DEEPSEEK_URL);

        config.provider = "ollama".to_string();
        assert_eq!(config.base_url_or_default(), DEFAULT_OLLAMA_URL);

        config.base_url = Some("http://gpu-box:8000/v1".to_string());
        assert_eq!(config.base_url_or_default(), "http://gpu-box:8000/v1");
    }

    #[test]
    fn test_blank_uri_is_not_configured() {
        let config = GraphConfig {
            uri: Some("  ".to_string()),
            ..GraphConfig::default()
        };
        assert!(!config.is_configured());
    }
}
