use async_trait::async_trait;
use log::debug;

use crate::errors::{ProviderError, SynthesisError};
use crate::providers::{build_client, RetryPolicy};

use super::text::split_for_speech;
use super::SpeechSynthesizer;

/// Longest text the translate endpoint accepts in one request
pub const MAX_PART_CHARS: usize = 100;

/// Client for the Google Translate text-to-speech endpoint
///
/// Each request returns an MP3 segment; segments are concatenated in order,
/// which MP3 players handle as one continuous stream.
#[derive(Debug)]
pub struct GoogleTranslateTts {
    /// HTTP client for API requests
    client: reqwest::Client,
    /// Base URL, e.g. `https://translate.google.com`
    endpoint: String,
    /// Spoken language
    language: String,
    /// Retry settings
    retry: RetryPolicy,
}

impl GoogleTranslateTts {
    /// Create a new client
    pub fn new(endpoint: impl Into<String>, language: impl Into<String>, timeout_secs: u64, retry: RetryPolicy) -> Self {
        Self {
            client: build_client(timeout_secs),
            endpoint: endpoint.into(),
            language: language.into(),
            retry,
        }
    }

    fn tts_url(&self) -> String {
        format!("{}/translate_tts", self.endpoint.trim_end_matches('/'))
    }

    async fn fetch_part(&self, part: &str, index: usize, total: usize) -> Result<bytes::Bytes, ProviderError> {
        let url = self.tts_url();
        let total = total.to_string();
        let index = index.to_string();
        let textlen = part.chars().count().to_string();

        let response = self.retry.send("Google Translate TTS", || {
            self.client.get(&url)
                .header(reqwest::header::USER_AGENT, "Mozilla/5.0")
                .query(&[
                    ("ie", "UTF-8"),
                    ("q", part),
                    ("tl", self.language.as_str()),
                    ("total", total.as_str()),
                    ("idx", index.as_str()),
                    ("textlen", textlen.as_str()),
                    ("client", "tw-ob"),
                    ("ttsspeed", "1"),
                ])
        }).await?;

        response.bytes().await.map_err(ProviderError::from)
    }
}

#[async_trait]
impl SpeechSynthesizer for GoogleTranslateTts {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, SynthesisError> {
        let parts = split_for_speech(text, MAX_PART_CHARS);
        if parts.is_empty() {
            return Err(SynthesisError::EmptyInput);
        }

        debug!("Requesting {} speech segment(s) in '{}'", parts.len(), self.language);

        let mut audio = Vec::new();
        for (index, part) in parts.iter().enumerate() {
            let segment = self.fetch_part(part, index, parts.len()).await?;
            audio.extend_from_slice(&segment);
        }

        Ok(audio)
    }

    fn name(&self) -> &str {
        "Google Translate TTS"
    }
}
