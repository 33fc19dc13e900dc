/*!
 * Core summarization service implementation.
 *
 * This module contains the `ChunkSummarizer` seam used by the pipeline and the
 * `SummarizationService` that dispatches requests to the configured provider.
 */

use anyhow::Result;
use async_trait::async_trait;
use log::debug;
use std::time::Instant;

use crate::app_config::{SummarizationConfig, SummaryProvider};
use crate::errors::ProviderError;
use crate::providers::anthropic::{Anthropic, AnthropicRequest};
use crate::providers::gemini::{Gemini, GeminiRequest};
use crate::providers::ollama::{GenerationRequest, Ollama};
use crate::providers::{Provider, RetryPolicy};

/// Upper bound on generated tokens per chunk; a 1000-word script fits comfortably
const MAX_OUTPUT_TOKENS: u32 = 4096;

/// Text-in, text-out call made once per chunk
#[async_trait]
pub trait ChunkSummarizer: Send + Sync {
    /// Send one full request (instruction and chunk) and return the raw response text
    async fn summarize(&self, request: &str) -> Result<String, ProviderError>;

    /// Provider and model, for log lines
    fn describe(&self) -> String {
        "summarizer".to_string()
    }
}

/// Build the request for one chunk: the duration prompt, a blank line, then the chunk
pub fn build_chunk_request(prompt: &str, chunk: &str) -> String {
    format!("{}\n\n{}", prompt, chunk)
}

/// Join chunk summaries in order with a blank line between them
pub fn combine_summaries<S: AsRef<str>>(summaries: &[S]) -> String {
    summaries.iter()
        .map(|s| s.as_ref().trim())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Summarization provider implementation variants
#[derive(Debug)]
enum SummaryProviderImpl {
    /// Google Gemini
    Gemini { client: Gemini },

    /// Ollama LLM service
    Ollama { client: Ollama },

    /// Anthropic API service
    Anthropic { client: Anthropic },
}

/// Summarization service backed by the configured provider
#[derive(Debug)]
pub struct SummarizationService {
    /// Provider implementation
    provider: SummaryProviderImpl,

    /// Configuration for the summarization service
    pub config: SummarizationConfig,
}

impl SummarizationService {
    /// Create a new summarization service with the given configuration
    pub fn new(config: SummarizationConfig) -> Result<Self> {
        let retry = RetryPolicy::new(
            config.common.retry_count,
            config.common.retry_backoff_ms,
            config.get_rate_limit(),
        );
        let timeout_secs = config.get_timeout_secs();

        let provider = match config.provider {
            SummaryProvider::Gemini => SummaryProviderImpl::Gemini {
                client: Gemini::new_with_config(
                    config.get_api_key(),
                    config.get_endpoint(),
                    config.get_model(),
                    timeout_secs,
                    retry,
                ),
            },
            SummaryProvider::Ollama => SummaryProviderImpl::Ollama {
                client: Ollama::new_with_config(config.get_endpoint(), timeout_secs, retry),
            },
            SummaryProvider::Anthropic => SummaryProviderImpl::Anthropic {
                client: Anthropic::new_with_config(
                    config.get_api_key(),
                    config.get_endpoint(),
                    config.get_model(),
                    timeout_secs,
                    retry,
                ),
            },
        };

        Ok(Self { provider, config })
    }

    /// Test the connection to the summarization provider
    pub async fn test_connection(&self) -> Result<(), ProviderError> {
        match &self.provider {
            SummaryProviderImpl::Gemini { client } => client.test_connection().await,
            SummaryProviderImpl::Ollama { client } => client.test_connection().await,
            SummaryProviderImpl::Anthropic { client } => client.test_connection().await,
        }
    }
}

#[async_trait]
impl ChunkSummarizer for SummarizationService {
    async fn summarize(&self, request: &str) -> Result<String, ProviderError> {
        let start_time = Instant::now();
        let model = self.config.get_model();
        let temperature = self.config.common.temperature;

        let text = match &self.provider {
            SummaryProviderImpl::Gemini { client } => {
                let request = GeminiRequest::new(model, request)
                    .temperature(temperature)
                    .max_output_tokens(MAX_OUTPUT_TOKENS);
                let response = client.complete(request).await?;
                Gemini::extract_text(&response)
            }
            SummaryProviderImpl::Ollama { client } => {
                let request = GenerationRequest::new(model, request)
                    .temperature(temperature);
                let response = client.complete(request).await?;
                Ollama::extract_text(&response)
            }
            SummaryProviderImpl::Anthropic { client } => {
                let request = AnthropicRequest::new(model, MAX_OUTPUT_TOKENS)
                    .add_message("user", request)
                    .temperature(temperature);
                let response = client.complete(request).await?;
                Anthropic::extract_text(&response)
            }
        };

        debug!("{} response received in {:?}", self.config.provider.display_name(), start_time.elapsed());
        Ok(text)
    }

    fn describe(&self) -> String {
        format!("{} - {}", self.config.provider.display_name(), self.config.get_model())
    }
}
