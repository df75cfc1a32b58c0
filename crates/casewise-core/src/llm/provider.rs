use tracing::warn;

use crate::config::{LLMConfig, DEFAULT_DEEPSEEK_MODEL, DEFAULT_DEEPSEEK_URL};
use super::{LLMError, OpenAIClient, LLM};

/// A resolved LLM endpoint.
#[derive(Debug, Clone)]
pub enum Provider {
    /// DeepSeek chat API (default)
    DeepSeek {
        base_url: String,
        api_key: String,
        model: String,
    },
    /// Any OpenAI-compatible endpoint
    OpenAI {
        base_url: String,
        api_key: String,
        model: String,
    },
    /// Local Ollama instance
    Ollama { base_url: String, model: String },
}

impl Default for Provider {
    fn default() -> Self {
        Provider::DeepSeek {
            base_url: DEFAULT_DEEPSEEK_URL.to_string(),
            api_key: String::new(),
            model: DEFAULT_DEEPSEEK_MODEL.to_string(),
        }
    }
}

impl Provider {
    /// Resolves a provider from LLMConfig, filling in per-provider defaults.
    pub fn from_config(config: &LLMConfig) -> Result<Self, LLMError> {
        let base_url = config.base_url_or_default();
        let model = config.model_or_default();

        match config.provider.as_str() {
            "deepseek" => Ok(Provider::DeepSeek {
                base_url,
                api_key: config.api_key_or_env().unwrap_or_default(),
                model,
            }),
            "openai" | "openai-compatible" | "openrouter" => Ok(Provider::OpenAI {
                base_url,
                api_key: config.api_key_or_env().unwrap_or_default(),
                model,
            }),
            "ollama" => Ok(Provider::Ollama { base_url, model }),
            other => Err(LLMError::UnknownProvider(other.to_string())),
        }
    }

    /// Creates an LLM client from the provider configuration.
    ///
    /// A missing API key is not fatal here: the request itself fails and the
    /// caller reports it, so other features keep working.
    pub fn build(self) -> Box<dyn LLM> {
        match self {
            Provider::DeepSeek { base_url, api_key, model }
            | Provider::OpenAI { base_url, api_key, model } => {
                if api_key.is_empty() {
                    warn!(%base_url, "no API key configured; report drafting will fail");
                }
                Box::new(OpenAIClient::new(base_url, api_key, model))
            }
            Provider::Ollama { base_url, model } => Box::new(OpenAIClient::new(base_url, "", model)),
        }
    }
}
