/*!
 * Provider implementations for the summarization services.
 *
 * This module contains client implementations for various LLM providers:
 * - Gemini: Google Generative Language API (default)
 * - Ollama: Local LLM server
 * - Anthropic: Anthropic API integration
 */

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::{RequestBuilder, Response};
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::errors::ProviderError;

/// Common trait for all LLM providers
///
/// This trait defines the interface that all provider implementations must follow,
/// allowing them to be used interchangeably by the summarization service.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// The request type for this provider
    type Request: Send + Sync;

    /// The response type for this provider
    type Response: Send + Sync;

    /// Complete a request using this provider
    async fn complete(&self, request: Self::Request) -> Result<Self::Response, ProviderError>;

    /// Test the connection to the provider
    async fn test_connection(&self) -> Result<(), ProviderError>;

    /// Extract text from the provider response
    fn extract_text(response: &Self::Response) -> String;
}

/// Retry and pacing settings shared by the HTTP clients
///
/// Clones share one pacing schedule, so every request made through a policy and
/// its clones counts against the same rate limit.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of retry attempts after the first one
    pub max_retries: u32,
    /// Base backoff time in milliseconds, doubled after each failed attempt
    pub backoff_base_ms: u64,
    /// Optional rate limit in requests per minute, applied to every attempt
    pub rate_limit: Option<u32>,
    /// Earliest start of the next request
    next_slot: Arc<Mutex<Option<Instant>>>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, 1000, None)
    }
}

impl RetryPolicy {
    /// Create a new retry policy
    pub fn new(max_retries: u32, backoff_base_ms: u64, rate_limit: Option<u32>) -> Self {
        Self {
            max_retries,
            backoff_base_ms,
            rate_limit,
            next_slot: Arc::new(Mutex::new(None)),
        }
    }

    /// Minimum spacing between request starts, if rate limited
    pub fn request_interval(&self) -> Option<Duration> {
        self.rate_limit
            .filter(|r| *r > 0)
            .map(|r| Duration::from_millis(60_000 / r as u64))
    }

    /// Wait until the rate limit allows another request to start
    async fn pace(&self, service: &str) {
        let Some(interval) = self.request_interval() else {
            return;
        };

        let wait = {
            let mut next_slot = self.next_slot.lock().await;
            let now = Instant::now();
            let start = match *next_slot {
                Some(slot) if slot > now => slot,
                _ => now,
            };
            *next_slot = Some(start + interval);
            start - now
        };

        if !wait.is_zero() {
            debug!("Pacing {} request for {:?}", service, wait);
            tokio::time::sleep(wait).await;
        }
    }

    /// Backoff before retry number `attempt` (1-based)
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let factor = 1u64 << attempt.saturating_sub(1).min(16);
        Duration::from_millis(self.backoff_base_ms.saturating_mul(factor))
    }

    /// Send a request, retrying network errors, 429 and 5xx responses
    ///
    /// Every attempt, first or retried, waits for its slot under the rate limit.
    ///
    /// `build` is called once per attempt since a `RequestBuilder` is consumed by `send`.
    /// Any other non-success status fails immediately.
    pub async fn send<F>(&self, service: &str, build: F) -> Result<Response, ProviderError>
    where
        F: Fn() -> RequestBuilder,
    {
        let mut attempt = 0;

        loop {
            self.pace(service).await;

            let error = match build().send().await {
                Ok(response) if response.status().is_success() => return Ok(response),
                Ok(response) => {
                    let status = response.status().as_u16();
                    let body = response.text().await
                        .unwrap_or_else(|_| "Failed to get error response text".to_string());
                    ProviderError::from_status(status, body)
                }
                Err(e) => ProviderError::from(e),
            };

            if !error.is_transient() || attempt >= self.max_retries {
                return Err(error);
            }

            attempt += 1;
            warn!("{} request failed: {} - attempt {}/{}", service, error, attempt, self.max_retries + 1);
            let backoff = self.backoff_for(attempt);
            debug!("Retrying {} in {:?}", service, backoff);
            tokio::time::sleep(backoff).await;
        }
    }
}

/// Build a reqwest client with the given request timeout
pub(crate) fn build_client(timeout_secs: u64) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs.max(1)))
        .pool_idle_timeout(Duration::from_secs(90))
        .build()
        .unwrap_or_default()
}

pub mod anthropic;
pub mod gemini;
pub mod mock;
pub mod ollama;
