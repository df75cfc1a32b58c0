use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{CompletionOptions, LLMError, LLM};

/// OpenAI-compatible chat completions client.
///
/// DeepSeek, OpenAI, Ollama (`/v1`), vLLM and OpenRouter all speak this
/// protocol.
pub struct OpenAIClient {
    api_key: String,
    base_url: String,
    model: String,
    client: Client,
}

impl OpenAIClient {
    /// Creates a new OpenAI-compatible client.
    ///
    /// # Arguments
    /// * `base_url` - The API base URL (e.g., "https://api.deepseek.com")
    /// * `api_key` - The API key (can be empty for local providers like Ollama)
    /// * `model` - The model name (e.g., "deepseek-chat", "llama3")
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            client: Client::new(),
        }
    }

    async fn send_request(
        &self,
        messages: Vec<ChatMessage>,
        options: &CompletionOptions,
    ) -> Result<String, LLMError> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages,
            temperature: options.temperature,
            max_tokens: Some(options.max_tokens),
        };

        let url = format!("{}/chat/completions", self.base_url);
        debug!(model = %self.model, %url, max_tokens = options.max_tokens, "sending chat completion");

        let mut req = self.client
            .post(&url)
            .header("content-type", "application/json");

        // Only add authorization if api_key is not empty
        if !self.api_key.is_empty() {
            req = req.header("authorization", format!("Bearer {}", self.api_key));
        }

        let response = req.json(&request).send().await?;

        let status = response.status();

        if status == 429 {
            return Err(LLMError::RateLimited);
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(LLMError::ApiError {
                status: status.as_u16(),
                message: error_text,
            });
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| LLMError::ParseError(e.to_string()))?;

        chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(LLMError::EmptyResponse)
    }
}

#[async_trait]
impl LLM for OpenAIClient {
    async fn complete_with_options(
        &self,
        system: Option<&str>,
        prompt: &str,
        options: &CompletionOptions,
    ) -> Result<String, LLMError> {
        let mut messages = Vec::with_capacity(2);
        if let Some(sys) = system {
            messages.push(ChatMessage::new("system", sys));
        }
        messages.push(ChatMessage::new("user", prompt));

        self.send_request(messages, options).await
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

impl ChatMessage {
    fn new(role: &'static str, content: &str) -> Self {
        Self {
            role,
            content: content.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = OpenAIClient::new(
            "https://api.example.com/v1",
            "test-key",
            "gpt-4",
        );
        assert_eq!(client.base_url, "https://api.example.com/v1");
        assert_eq!(client.model(), "gpt-4");
    }

    #[test]
    fn test_empty_key_kept_empty() {
        let client = OpenAIClient::new("http://localhost:11434/v1", "", "llama3");
        assert!(client.api_key.is_empty());
    }

    #[test]
    fn test_url_trailing_slash_removed() {
        let client = OpenAIClient::new("https://api.example.com/v1/", "key", "model");
        assert_eq!(client.base_url, "https://api.example.com/v1");
    }

    #[test]
    fn test_request_body_shape() {
        let request = ChatRequest {
            model: "deepseek-chat".to_string(),
            messages: vec![
                ChatMessage::new("system", "be brief"),
                ChatMessage::new("user", "hi"),
            ],
            temperature: 0.7,
            max_tokens: Some(2000),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "hi");
        assert_eq!(json["max_tokens"], 2000);
        assert!(json["temperature"].as_f64().unwrap() > 0.69);
    }

    #[test]
    fn test_null_content_parses() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(body).unwrap();
        assert!(parsed.choices[0].message.content.is_none());
    }
}
