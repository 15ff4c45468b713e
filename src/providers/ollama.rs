use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use super::{api_url, http_client, read_envelope, transport_error, Provider};
use crate::app_config::CompletionConfig;
use crate::errors::ProviderError;
use crate::translation::{CompletionResult, PromptPair};

/// Ollama client for interacting with Ollama API
#[derive(Debug)]
pub struct Ollama {
    /// Base URL of the Ollama API
    base_url: String,
    /// HTTP client for making requests
    client: Client,
}

/// Generation options for the Ollama API
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Temperature for generation (default: 0.8)
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    /// Maximum number of tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    frequency_penalty: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    presence_penalty: Option<f32>,
}

/// Chat message object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender (system, user, assistant, or tool)
    pub role: String,
    /// Content of the message
    pub content: String,
}

/// Chat request for the Ollama API
#[derive(Debug, Serialize)]
pub struct ChatRequest {
    /// Model name to use for generation
    model: String,
    /// Messages of the conversation
    messages: Vec<ChatMessage>,
    /// Additional model parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<GenerationOptions>,
    /// Whether to stream the response
    stream: bool,
}

/// Chat response from the Ollama API
#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    /// Model name
    pub model: String,
    /// Response message
    pub message: ChatMessage,
    /// Whether the generation is complete
    #[serde(default)]
    pub done: bool,
    /// Number of prompt tokens
    #[serde(default)]
    pub prompt_eval_count: Option<u64>,
    /// Number of generated tokens
    #[serde(default)]
    pub eval_count: Option<u64>,
}

impl ChatRequest {
    /// Create a new chat request
    pub fn new(model: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
            options: None,
            stream: false,
        }
    }

    /// Build the two-turn request for a prompt pair
    pub fn from_prompt(prompt: &PromptPair, config: &CompletionConfig) -> Self {
        let messages = vec![
            ChatMessage {
                role: "system".to_string(),
                content: prompt.system_prompt().to_string(),
            },
            ChatMessage {
                role: "user".to_string(),
                content: prompt.user_prompt().to_string(),
            },
        ];

        let mut request = Self::new(config.model.clone(), messages);
        request.options = Some(GenerationOptions {
            temperature: Some(config.temperature),
            num_predict: Some(config.max_tokens),
            frequency_penalty: Some(config.frequency_penalty),
            presence_penalty: Some(config.presence_penalty),
        });
        request
    }
}

impl Ollama {
    /// Create a new Ollama client from a complete URL
    pub fn from_url(url: impl Into<String>) -> Self {
        Self::new_with_timeout(url, Duration::from_secs(60))
    }

    /// Create a new Ollama client with a request timeout
    pub fn new_with_timeout(url: impl Into<String>, timeout: Duration) -> Self {
        let url = url.into();
        // No scheme, add http://
        let base_url = if url.starts_with("http://") || url.starts_with("https://") {
            url
        } else {
            format!("http://{}", url)
        };

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: http_client(timeout),
        }
    }

    /// Send a chat request, returning the typed response and the raw envelope
    pub async fn chat(&self, request: &ChatRequest) -> Result<(ChatResponse, Value), ProviderError> {
        let url = api_url(&self.base_url, "api/chat");

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| transport_error("Ollama", e))?;

        let envelope = read_envelope("Ollama", response).await?;
        let parsed = ChatResponse::deserialize(&envelope).map_err(|e| {
            ProviderError::ParseError(format!("Unexpected Ollama response shape: {}", e))
        })?;
        Ok((parsed, envelope))
    }

    /// Get the Ollama API version
    pub async fn version(&self) -> Result<String, ProviderError> {
        let url = api_url(&self.base_url, "api/version");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| transport_error("Ollama", e))?;

        let envelope = read_envelope("Ollama", response).await?;
        envelope["version"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| ProviderError::ParseError("Invalid version format in response".to_string()))
    }
}

#[async_trait]
impl Provider for Ollama {
    async fn complete(
        &self,
        prompt: &PromptPair,
        config: &CompletionConfig,
    ) -> Result<CompletionResult, ProviderError> {
        let request = ChatRequest::from_prompt(prompt, config);
        let (response, envelope) = self.chat(&request).await?;

        debug!(
            "Ollama {} done={} prompt_eval_count={:?} eval_count={:?}",
            response.model, response.done, response.prompt_eval_count, response.eval_count
        );

        Ok(CompletionResult::new(response.message.content, envelope))
    }

    async fn test_connection(&self, _config: &CompletionConfig) -> Result<(), ProviderError> {
        let version = self.version().await?;
        debug!("Connected to Ollama {}", version);
        Ok(())
    }

    fn name(&self) -> &str {
        "ollama"
    }
}
