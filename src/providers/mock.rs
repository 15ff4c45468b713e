/*!
 * Mock provider implementation for testing.
 *
 * This module provides a mock provider that simulates different behaviors:
 * - `MockProvider::responding(sql)` - Always succeeds with the given completion
 * - `MockProvider::failing(kind)` - Always fails with an error of that kind
 * - `MockProvider::intermittent(sql, n)` - Fails every n-th request
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::app_config::CompletionConfig;
use crate::errors::{ProviderError, ProviderErrorKind};
use crate::providers::Provider;
use crate::translation::{CompletionResult, PromptPair};

/// Behavior mode for the mock provider
#[derive(Debug, Clone, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds with the given completion text
    Working { completion: String },
    /// Fails intermittently (every Nth request)
    Intermittent { completion: String, fail_every: usize },
    /// Always fails with an error of the given kind
    Failing { kind: ProviderErrorKind },
    /// Succeeds after a delay (for timeout testing)
    Slow { completion: String, delay_ms: u64 },
}

/// Mock provider for testing translation behavior
#[derive(Debug, Clone)]
pub struct MockProvider {
    /// Behavior mode
    behavior: MockBehavior,
    /// Request counter, shared between clones
    request_count: Arc<AtomicUsize>,
    /// Last prompt and config received
    last_request: Arc<Mutex<Option<(PromptPair, CompletionConfig)>>>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            last_request: Arc::new(Mutex::new(None)),
        }
    }

    /// Create a mock provider that always answers with `completion`
    pub fn responding(completion: impl Into<String>) -> Self {
        Self::new(MockBehavior::Working {
            completion: completion.into(),
        })
    }

    /// Create a failing mock provider that always errors
    pub fn failing(kind: ProviderErrorKind) -> Self {
        Self::new(MockBehavior::Failing { kind })
    }

    /// Create an intermittently failing mock provider
    pub fn intermittent(completion: impl Into<String>, fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent {
            completion: completion.into(),
            fail_every: fail_every.max(1),
        })
    }

    /// Number of requests received so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// The last prompt and config received
    pub fn last_request(&self) -> Option<(PromptPair, CompletionConfig)> {
        self.last_request.lock().clone()
    }

    /// Build an error of the given kind, shaped like a real provider failure
    pub fn error_of_kind(kind: ProviderErrorKind) -> ProviderError {
        match kind {
            ProviderErrorKind::Authentication => {
                ProviderError::AuthenticationError("Incorrect API key provided".to_string())
            }
            ProviderErrorKind::RateLimit => ProviderError::RateLimitExceeded {
                message: "Rate limit reached for requests".to_string(),
                retry_after_secs: Some(20),
            },
            ProviderErrorKind::Transient => {
                ProviderError::ConnectionError("Simulated network failure".to_string())
            }
            ProviderErrorKind::MalformedResponse => {
                ProviderError::ParseError("Simulated malformed response".to_string())
            }
            ProviderErrorKind::Rejected => ProviderError::ApiError {
                status_code: 400,
                message: "Simulated bad request".to_string(),
            },
        }
    }

    fn success(completion: &str, config: &CompletionConfig) -> CompletionResult {
        let envelope = json!({
            "id": "mock-completion",
            "object": "chat.completion",
            "model": config.model,
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": completion},
                "finish_reason": "stop"
            }]
        });
        CompletionResult::new(completion, envelope)
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn complete(
        &self,
        prompt: &PromptPair,
        config: &CompletionConfig,
    ) -> Result<CompletionResult, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock() = Some((prompt.clone(), config.clone()));

        match &self.behavior {
            MockBehavior::Working { completion } => Ok(Self::success(completion, config)),
            MockBehavior::Intermittent {
                completion,
                fail_every,
            } => {
                let fail_every = (*fail_every).max(1);
                if count % fail_every == fail_every - 1 {
                    Err(Self::error_of_kind(ProviderErrorKind::Transient))
                } else {
                    Ok(Self::success(completion, config))
                }
            }
            MockBehavior::Failing { kind } => Err(Self::error_of_kind(*kind)),
            MockBehavior::Slow {
                completion,
                delay_ms,
            } => {
                tokio::time::sleep(Duration::from_millis(*delay_ms)).await;
                Ok(Self::success(completion, config))
            }
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}
