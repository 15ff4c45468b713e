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

const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1";

/// OpenAI client for the chat completions API
///
/// Also serves any OpenAI-compatible server (LM Studio, vLLM, Azure deployments)
/// through a custom endpoint.
#[derive(Debug)]
pub struct OpenAI {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    api_key: String,
    /// API base URL, e.g. `https://api.openai.com/v1`
    endpoint: String,
}

/// Chat completion request
#[derive(Debug, Serialize)]
pub struct OpenAIRequest {
    /// The model to use
    model: String,

    /// The messages for the conversation
    messages: Vec<OpenAIMessage>,

    /// Temperature for generation
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,

    /// Maximum number of tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    frequency_penalty: Option<f32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    presence_penalty: Option<f32>,
}

/// Chat message format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIMessage {
    /// Role of the message sender (system, user, assistant)
    pub role: String,

    /// Content of the message
    #[serde(default)]
    pub content: String,
}

/// Token usage information
#[derive(Debug, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// One completion choice
#[derive(Debug, Deserialize)]
pub struct OpenAIChoice {
    /// The generated message
    pub message: OpenAIMessage,
    /// Why generation stopped ("stop", "length", ...)
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Chat completion response
#[derive(Debug, Deserialize)]
pub struct OpenAIResponse {
    /// Generated choices
    pub choices: Vec<OpenAIChoice>,
    /// Token usage information
    #[serde(default)]
    pub usage: Option<TokenUsage>,
}

impl Default for OpenAIRequest {
    fn default() -> Self {
        Self {
            model: String::new(),
            messages: Vec::new(),
            temperature: None,
            max_tokens: None,
            frequency_penalty: None,
            presence_penalty: None,
        }
    }
}

impl OpenAIRequest {
    /// Create a new request for the given model
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }

    /// Build the two-turn request for a prompt pair
    pub fn from_prompt(prompt: &PromptPair, config: &CompletionConfig) -> Self {
        Self::new(config.model.clone())
            .add_message("system", prompt.system_prompt())
            .add_message("user", prompt.user_prompt())
            .temperature(config.temperature)
            .max_tokens(config.max_tokens)
            .frequency_penalty(config.frequency_penalty)
            .presence_penalty(config.presence_penalty)
    }

    /// Add a message to the request
    pub fn add_message(mut self, role: impl Into<String>, content: impl Into<String>) -> Self {
        self.messages.push(OpenAIMessage {
            role: role.into(),
            content: content.into(),
        });
        self
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the maximum number of tokens
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn frequency_penalty(mut self, penalty: f32) -> Self {
        self.frequency_penalty = Some(penalty);
        self
    }

    pub fn presence_penalty(mut self, penalty: f32) -> Self {
        self.presence_penalty = Some(penalty);
        self
    }

    /// Messages in send order
    pub fn messages(&self) -> &[OpenAIMessage] {
        &self.messages
    }
}

impl OpenAI {
    /// Create a new OpenAI client
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self::new_with_timeout(api_key, endpoint, Duration::from_secs(60))
    }

    /// Create a new OpenAI client with a request timeout
    pub fn new_with_timeout(
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        let endpoint = endpoint.into();
        Self {
            client: http_client(timeout),
            api_key: api_key.into(),
            endpoint: if endpoint.is_empty() {
                DEFAULT_ENDPOINT.to_string()
            } else {
                endpoint
            },
        }
    }

    /// Send a chat completion request, returning the typed response and the raw envelope
    pub async fn complete_request(
        &self,
        request: &OpenAIRequest,
    ) -> Result<(OpenAIResponse, Value), ProviderError> {
        let url = api_url(&self.endpoint, "chat/completions");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| transport_error("OpenAI", e))?;

        let envelope = read_envelope("OpenAI", response).await?;
        let parsed = Self::parse_response(&envelope)?;
        Ok((parsed, envelope))
    }

    /// Decode a response envelope
    pub fn parse_response(envelope: &Value) -> Result<OpenAIResponse, ProviderError> {
        OpenAIResponse::deserialize(envelope).map_err(|e| {
            ProviderError::ParseError(format!("Unexpected OpenAI response shape: {}", e))
        })
    }

    /// Extract text from the first choice
    pub fn extract_text_from_response(response: &OpenAIResponse) -> Option<String> {
        response.choices.first().map(|c| c.message.content.clone())
    }
}

#[async_trait]
impl Provider for OpenAI {
    async fn complete(
        &self,
        prompt: &PromptPair,
        config: &CompletionConfig,
    ) -> Result<CompletionResult, ProviderError> {
        let request = OpenAIRequest::from_prompt(prompt, config);
        let (response, envelope) = self.complete_request(&request).await?;

        if let Some(usage) = &response.usage {
            debug!(
                "OpenAI usage: {} prompt + {} completion = {} tokens",
                usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
            );
        }

        let text = Self::extract_text_from_response(&response)
            .ok_or_else(|| ProviderError::ParseError("OpenAI response has no choices".to_string()))?;

        Ok(CompletionResult::new(text, envelope))
    }

    fn name(&self) -> &str {
        "openai"
    }
}
