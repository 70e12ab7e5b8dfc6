pub mod providers;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// LLM provider types
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum LLMProvider {
    LMStudio,
    Gemini,
    OpenAI,
}

impl LLMProvider {
    /// Endpoint used when the config leaves it unset
    pub fn default_endpoint(&self) -> &'static str {
        match self {
            LLMProvider::LMStudio => "http://localhost:1234/v1/chat/completions",
            LLMProvider::OpenAI => "https://api.openai.com/v1/chat/completions",
            LLMProvider::Gemini => "https://generativelanguage.googleapis.com/v1beta",
        }
    }

    pub fn requires_api_key(&self) -> bool {
        !matches!(self, LLMProvider::LMStudio)
    }
}

/// LLM configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LLMConfig {
    pub provider: LLMProvider,
    /// Chat completions URL (Gemini: API base URL)
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout_seconds: u64,
}

impl LLMConfig {
    pub fn endpoint(&self) -> &str {
        self.endpoint
            .as_deref()
            .unwrap_or_else(|| self.provider.default_endpoint())
    }
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            provider: LLMProvider::OpenAI,
            endpoint: None,
            api_key: None,
            model: "gpt-4o-mini".to_string(),
            max_tokens: 4096,
            temperature: 0.1, // Low temperature for consistent extraction
            timeout_seconds: 120,
        }
    }
}

/// Chat message for LLM communication
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Text returned by the model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Completion {
    pub content: String,
    pub model: String,
    pub tokens_used: Option<u32>,
}

/// A chat model that answers one request with one completion.
/// No streaming, no retries.
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn chat(&self, messages: Vec<ChatMessage>) -> Result<Completion>;

    fn provider_type(&self) -> LLMProvider;

    /// Send a single user prompt
    async fn complete(&self, prompt: &str) -> Result<Completion> {
        self.chat(vec![ChatMessage::user(prompt)]).await
    }
}

/// Create a model client based on configuration
pub fn create_client(config: &LLMConfig) -> Result<Box<dyn ModelClient>> {
    match config.provider {
        LLMProvider::LMStudio | LLMProvider::OpenAI => Ok(Box::new(
            providers::OpenAICompatibleProvider::new(config.clone())?,
        )),
        LLMProvider::Gemini => Ok(Box::new(providers::GeminiProvider::new(config.clone())?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_endpoints() {
        let config = LLMConfig::default();
        assert_eq!(config.endpoint(), "https://api.openai.com/v1/chat/completions");

        let local = LLMConfig {
            provider: LLMProvider::LMStudio,
            ..LLMConfig::default()
        };
        assert_eq!(local.endpoint(), "http://localhost:1234/v1/chat/completions");
        assert!(!local.provider.requires_api_key());
    }

    #[test]
    fn test_create_client_requires_key() {
        let config = LLMConfig {
            api_key: None,
            ..LLMConfig::default()
        };
        assert!(create_client(&config).is_err());

        let local = LLMConfig {
            provider: LLMProvider::LMStudio,
            ..LLMConfig::default()
        };
        let client = create_client(&local).unwrap();
        assert_eq!(client.provider_type(), LLMProvider::LMStudio);
    }
}
