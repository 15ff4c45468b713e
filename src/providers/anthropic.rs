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

const DEFAULT_ENDPOINT: &str = "https://api.anthropic.com";
const API_VERSION: &str = "2023-06-01";

/// Anthropic client for interacting with Anthropic API
#[derive(Debug)]
pub struct Anthropic {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    api_key: String,
    /// API endpoint URL (optional, defaults to public API)
    endpoint: String,
}

/// Anthropic message request
#[derive(Debug, Serialize)]
pub struct AnthropicRequest {
    /// The model to use
    model: String,

    /// The messages for the conversation
    messages: Vec<AnthropicMessage>,

    /// System prompt to guide the AI
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,

    /// Temperature for generation
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,

    /// Maximum number of tokens to generate
    max_tokens: u32,
}

/// Anthropic message format
#[derive(Debug, Serialize, Deserialize)]
pub struct AnthropicMessage {
    /// Role of the message sender (user, assistant)
    pub role: String,

    /// Content of the message
    pub content: String,
}

/// Token usage information
#[derive(Debug, Deserialize)]
pub struct TokenUsage {
    /// Number of input tokens
    pub input_tokens: u32,
    /// Number of output tokens
    pub output_tokens: u32,
}

/// Anthropic response
#[derive(Debug, Deserialize)]
pub struct AnthropicResponse {
    /// The content of the response
    pub content: Vec<AnthropicContent>,
    /// Token usage information
    #[serde(default)]
    pub usage: Option<TokenUsage>,
}

/// Individual content block in an Anthropic response
#[derive(Debug, Deserialize)]
pub struct AnthropicContent {
    /// The type of content
    #[serde(rename = "type")]
    pub content_type: String,

    /// The actual text content
    #[serde(default)]
    pub text: String,
}

impl AnthropicRequest {
    /// Create a new Anthropic request
    pub fn new(model: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            model: model.into(),
            messages: Vec::new(),
            system: None,
            temperature: None,
            max_tokens,
        }
    }

    /// Build the request for a prompt pair
    ///
    /// The Messages API takes the system turn as a top-level field and has no
    /// frequency or presence penalties; non-zero penalties are dropped.
    pub fn from_prompt(prompt: &PromptPair, config: &CompletionConfig) -> Self {
        if config.frequency_penalty != 0.0 || config.presence_penalty != 0.0 {
            debug!("Anthropic does not support frequency/presence penalties, ignoring them");
        }

        Self::new(config.model.clone(), config.max_tokens)
            .system(prompt.system_prompt())
            .add_message("user", prompt.user_prompt())
            .temperature(config.temperature)
    }

    /// Add a message to the request
    pub fn add_message(mut self, role: impl Into<String>, content: impl Into<String>) -> Self {
        self.messages.push(AnthropicMessage {
            role: role.into(),
            content: content.into(),
        });
        self
    }

    /// Set the system prompt
    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

impl Anthropic {
    /// Create a new Anthropic client
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self::new_with_timeout(api_key, endpoint, Duration::from_secs(120))
    }

    /// Create a new Anthropic client with a request timeout
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

    /// Complete a messages request, returning the typed response and the raw envelope
    pub async fn complete_request(
        &self,
        request: &AnthropicRequest,
    ) -> Result<(AnthropicResponse, Value), ProviderError> {
        let url = api_url(&self.endpoint, "v1/messages");

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(request)
            .send()
            .await
            .map_err(|e| transport_error("Anthropic", e))?;

        let envelope = read_envelope("Anthropic", response).await?;
        let parsed = AnthropicResponse::deserialize(&envelope).map_err(|e| {
            ProviderError::ParseError(format!("Unexpected Anthropic response shape: {}", e))
        })?;
        Ok((parsed, envelope))
    }

    /// Extract text from Anthropic response
    pub fn extract_text_from_response(response: &AnthropicResponse) -> String {
        response
            .content
            .iter()
            .filter(|c| c.content_type == "text")
            .map(|c| c.text.as_str())
            .collect()
    }
}

#[async_trait]
impl Provider for Anthropic {
    async fn complete(
        &self,
        prompt: &PromptPair,
        config: &CompletionConfig,
    ) -> Result<CompletionResult, ProviderError> {
        let request = AnthropicRequest::from_prompt(prompt, config);
        let (response, envelope) = self.complete_request(&request).await?;

        if let Some(usage) = &response.usage {
            debug!(
                "Anthropic usage: {} input + {} output tokens",
                usage.input_tokens, usage.output_tokens
            );
        }

        if !response.content.iter().any(|c| c.content_type == "text") {
            return Err(ProviderError::ParseError(
                "Anthropic response has no text content".to_string(),
            ));
        }

        Ok(CompletionResult::new(
            Self::extract_text_from_response(&response),
            envelope,
        ))
    }

    fn name(&self) -> &str {
        "anthropic"
    }
}
