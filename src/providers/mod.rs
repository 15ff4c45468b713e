/*!
 * Provider implementations for LLM completion services.
 *
 * This module contains client implementations for various LLM providers:
 * - OpenAI: OpenAI API integration (also used for LM Studio's compatible server)
 * - Anthropic: Anthropic API integration
 * - Ollama: Local LLM server
 * - Mock: Scripted provider for tests
 *
 * Every client sends exactly two turns (system, user) and hands back the
 * completion text together with the untouched JSON response. Clients never
 * retry, cache or throttle; that policy belongs to callers.
 */

use async_trait::async_trait;
use log::{error, warn};
use reqwest::{Client, Response, StatusCode};
use serde_json::Value;
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

use crate::app_config::{CompletionConfig, ProviderKind, ProviderSettings};
use crate::errors::ProviderError;
use crate::translation::{CompletionResult, PromptPair};

/// Common trait for all LLM providers
///
/// This trait defines the interface that all provider implementations must follow,
/// allowing them to be used interchangeably by the translation service.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// Complete a prompt pair using this provider
    ///
    /// # Arguments
    /// * `prompt` - The system and user prompts
    /// * `config` - Model and decoding parameters
    ///
    /// # Returns
    /// * `Result<CompletionResult, ProviderError>` - The completion text and response envelope, or an error
    async fn complete(
        &self,
        prompt: &PromptPair,
        config: &CompletionConfig,
    ) -> Result<CompletionResult, ProviderError>;

    /// Test the connection to the provider
    ///
    /// # Returns
    /// * `Result<(), ProviderError>` - Ok if the connection is successful, or an error
    async fn test_connection(&self, config: &CompletionConfig) -> Result<(), ProviderError> {
        let ping = PromptPair::new("Reply with OK.", "Say OK.");
        let ping_config = CompletionConfig {
            max_tokens: 5,
            ..config.clone()
        };
        self.complete(&ping, &ping_config).await.map(|_| ())
    }

    /// Short provider identifier used in logs
    fn name(&self) -> &str;
}

pub mod anthropic;
pub mod mock;
pub mod ollama;
pub mod openai;

/// Create the provider selected in the configuration
pub fn create_provider(settings: &ProviderSettings) -> Arc<dyn Provider> {
    let endpoint = settings.get_endpoint();
    let timeout = Duration::from_secs(settings.get_timeout_secs());

    match settings.active {
        ProviderKind::OpenAI => Arc::new(openai::OpenAI::new_with_timeout(
            settings.get_api_key(),
            endpoint,
            timeout,
        )),
        ProviderKind::LMStudio => {
            // LM Studio often doesn't require an API key; use a default if empty
            let api_key = {
                let k = settings.get_api_key();
                if k.is_empty() { "lm-studio".to_string() } else { k }
            };
            Arc::new(openai::OpenAI::new_with_timeout(api_key, endpoint, timeout))
        }
        ProviderKind::Anthropic => Arc::new(anthropic::Anthropic::new_with_timeout(
            settings.get_api_key(),
            endpoint,
            timeout,
        )),
        ProviderKind::Ollama => Arc::new(ollama::Ollama::new_with_timeout(endpoint, timeout)),
    }
}

/// HTTP client shared by the provider implementations
pub(crate) fn http_client(timeout: Duration) -> Client {
    Client::builder()
        .timeout(timeout)
        .pool_idle_timeout(Duration::from_secs(90))
        .build()
        .unwrap_or_else(|e| {
            warn!(
                "Failed to build HTTP client with a {:?} timeout, using defaults: {}",
                timeout, e
            );
            Client::new()
        })
}

/// Map a transport-level failure
pub(crate) fn transport_error(provider: &str, e: reqwest::Error) -> ProviderError {
    if e.is_timeout() || e.is_connect() {
        ProviderError::ConnectionError(format!("{}: {}", provider, e))
    } else {
        ProviderError::RequestFailed(format!("{}: {}", provider, e))
    }
}

/// Map a non-success HTTP status to a provider error
pub fn error_for_status(status_code: u16, body: &str, retry_after_secs: Option<u64>) -> ProviderError {
    let message = api_error_message(body);

    match status_code {
        401 | 403 => ProviderError::AuthenticationError(message),
        429 => ProviderError::RateLimitExceeded {
            message,
            retry_after_secs,
        },
        _ => ProviderError::ApiError {
            status_code,
            message,
        },
    }
}

/// Pull `error.message` out of a JSON error body, falling back to the raw body
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.pointer("/error/message")
                .or_else(|| v.get("error"))
                .and_then(|m| m.as_str().map(str::to_string))
        })
        .unwrap_or_else(|| body.trim().to_string())
}

/// Check the status and read the body as the JSON envelope
pub(crate) async fn read_envelope(provider: &str, response: Response) -> Result<Value, ProviderError> {
    let status = response.status();
    let retry_after = response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let body = response
        .text()
        .await
        .map_err(|e| transport_error(provider, e))?;

    parse_envelope(provider, status.as_u16(), retry_after.as_deref(), &body)
}

/// Turn a finished HTTP exchange into the JSON envelope or a provider error
///
/// A non-success status maps through `error_for_status`; a success with a
/// body that is not JSON is a parse error.
pub fn parse_envelope(
    provider: &str,
    status_code: u16,
    retry_after: Option<&str>,
    body: &str,
) -> Result<Value, ProviderError> {
    if !(200..300).contains(&status_code) {
        error!("{} API error ({}): {}", provider, status_code, body);
        let retry_after_secs = retry_after_secs(status_code, retry_after);
        return Err(error_for_status(status_code, body, retry_after_secs));
    }

    serde_json::from_str::<Value>(body).map_err(|e| {
        error!(
            "Failed to parse {} API response: {}. Raw response (first 500 chars): {}",
            provider,
            e,
            body.chars().take(500).collect::<String>()
        );
        ProviderError::ParseError(format!("{} returned invalid JSON: {}", provider, e))
    })
}

// Only the delta-seconds form of Retry-After is understood
fn retry_after_secs(status_code: u16, header: Option<&str>) -> Option<u64> {
    if status_code != StatusCode::TOO_MANY_REQUESTS.as_u16() {
        return None;
    }
    header.and_then(|v| v.trim().parse().ok())
}

/// Join an endpoint and a path without doubling slashes
pub(crate) fn api_url(endpoint: &str, path: &str) -> String {
    format!("{}/{}", endpoint.trim_end_matches('/'), path.trim_start_matches('/'))
}
