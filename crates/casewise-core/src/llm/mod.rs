mod error;
mod openai;
mod provider;

pub use error::LLMError;
pub use openai::OpenAIClient;
pub use provider::Provider;

use async_trait::async_trait;

use crate::config::{DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE};

/// Sampling settings for a single completion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionOptions {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

/// Trait for Large Language Model providers.
///
/// This abstraction allows swapping between different LLM providers
/// without changing the rest of the code.
///
/// # Supported Providers
///
/// - **DeepSeek** (default): OpenAI-compatible chat completions
/// - **OpenAI-compatible**: OpenAI, Azure, vLLM, OpenRouter, etc.
/// - **Ollama**: Local models via Ollama
///
/// # Example
///
/// ```ignore
/// use casewise_core::llm::{CompletionOptions, Provider, LLM};
///
/// let llm = Provider::from_config(&config.llm)?.build();
/// let options = CompletionOptions { temperature: 0.7, max_tokens: 2000 };
/// let text = llm.complete_with_options(Some("You are a helpful tutor."), "Hello!", &options).await?;
/// ```
#[async_trait]
pub trait LLM: Send + Sync {
    /// Complete a prompt with explicit sampling options and an optional system message.
    async fn complete_with_options(
        &self,
        system: Option<&str>,
        prompt: &str,
        options: &CompletionOptions,
    ) -> Result<String, LLMError>;

    /// Complete a prompt and return the response.
    async fn complete(&self, prompt: &str) -> Result<String, LLMError> {
        self.complete_with_options(None, prompt, &CompletionOptions::default())
            .await
    }

    /// Complete a prompt with a system message.
    async fn complete_with_system(
        &self,
        system: &str,
        prompt: &str,
    ) -> Result<String, LLMError> {
        self.complete_with_options(Some(system), prompt, &CompletionOptions::default())
            .await
    }

    /// Model identifier used for requests.
    fn model(&self) -> &str;
}

/// Blanket implementation for boxed trait objects.
#[async_trait]
impl LLM for Box<dyn LLM> {
    async fn complete_with_options(
        &self,
        system: Option<&str>,
        prompt: &str,
        options: &CompletionOptions,
    ) -> Result<String, LLMError> {
        (**self).complete_with_options(system, prompt, options).await
    }

    fn model(&self) -> &str {
        (**self).model()
    }
}
