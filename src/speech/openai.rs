use async_trait::async_trait;
use log::debug;
use serde::Serialize;

use crate::errors::{ProviderError, SynthesisError};
use crate::providers::{build_client, RetryPolicy};

use super::text::split_for_speech;
use super::SpeechSynthesizer;

/// Longest input the speech endpoint accepts per request
pub const MAX_INPUT_CHARS: usize = 4096;

/// Client for the OpenAI audio speech endpoint
#[derive(Debug)]
pub struct OpenAiTts {
    /// HTTP client for API requests
    client: reqwest::Client,
    /// API key for authentication
    api_key: String,
    /// API base URL including the version segment
    endpoint: String,
    /// Speech model, e.g. `tts-1`
    model: String,
    /// Voice name, e.g. `alloy`
    voice: String,
    /// Retry settings
    retry: RetryPolicy,
}

/// Speech request body
#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    model: &'a str,
    voice: &'a str,
    input: &'a str,
    response_format: &'a str,
}

impl OpenAiTts {
    /// Create a new client
    pub fn new(
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
        model: impl Into<String>,
        voice: impl Into<String>,
        timeout_secs: u64,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            client: build_client(timeout_secs),
            api_key: api_key.into(),
            endpoint: endpoint.into(),
            model: model.into(),
            voice: voice.into(),
            retry,
        }
    }

    async fn speak(&self, input: &str) -> Result<bytes::Bytes, ProviderError> {
        let url = format!("{}/audio/speech", self.endpoint.trim_end_matches('/'));
        let body = SpeechRequest {
            model: &self.model,
            voice: &self.voice,
            input,
            response_format: "mp3",
        };

        let response = self.retry.send("OpenAI TTS", || {
            self.client.post(&url)
                .bearer_auth(&self.api_key)
                .json(&body)
        }).await?;

        response.bytes().await.map_err(ProviderError::from)
    }
}

#[async_trait]
impl SpeechSynthesizer for OpenAiTts {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, SynthesisError> {
        let parts = split_for_speech(text, MAX_INPUT_CHARS);
        if parts.is_empty() {
            return Err(SynthesisError::EmptyInput);
        }

        debug!("Requesting {} speech segment(s) with voice '{}'", parts.len(), self.voice);

        let mut audio = Vec::new();
        for part in &parts {
            audio.extend_from_slice(&self.speak(part).await?);
        }

        Ok(audio)
    }

    fn name(&self) -> &str {
        "OpenAI TTS"
    }
}
