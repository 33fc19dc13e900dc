use async_trait::async_trait;
use log::error;
use serde::{Deserialize, Serialize};

use crate::errors::ProviderError;
use super::{build_client, Provider, RetryPolicy};

/// Ollama client for interacting with Ollama API
#[derive(Debug)]
pub struct Ollama {
    /// Base URL of the Ollama API
    base_url: String,
    /// HTTP client for making requests
    client: reqwest::Client,
    /// Retry settings
    retry: RetryPolicy,
}

/// Generate request for the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Model name to use for generation
    model: String,
    /// Prompt to generate from
    prompt: String,
    /// System message to guide the model
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    /// Additional model parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<GenerationOptions>,
    /// Whether to stream the response
    #[serde(skip_serializing_if = "Option::is_none")]
    stream: Option<bool>,
}

/// Generation options for the Ollama API
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Temperature for generation
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    /// Maximum number of tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

/// Generation response from the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerationResponse {
    /// Model name
    #[serde(default)]
    pub model: String,
    /// Generated text
    #[serde(default)]
    pub response: String,
    /// Whether the generation is complete
    #[serde(default)]
    pub done: bool,
    /// Number of prompt tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_eval_count: Option<u64>,
    /// Number of generated tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eval_count: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct VersionResponse {
    version: String,
}

impl GenerationRequest {
    /// Create a new non-streaming generation request
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            system: None,
            options: None,
            stream: Some(false),
        }
    }

    /// Set the system prompt
    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.options.get_or_insert_with(GenerationOptions::default).temperature = Some(temperature);
        self
    }

    /// Limit the number of generated tokens
    pub fn num_predict(mut self, num_predict: u32) -> Self {
        self.options.get_or_insert_with(GenerationOptions::default).num_predict = Some(num_predict);
        self
    }
}

impl Ollama {
    /// Create a new Ollama client from a complete URL
    pub fn from_url(url: impl Into<String>) -> Self {
        Self::new_with_config(url, 120, RetryPolicy::default())
    }

    /// Create a new Ollama client with timeout and retry settings
    pub fn new_with_config(url: impl Into<String>, timeout_secs: u64, retry: RetryPolicy) -> Self {
        let url = url.into();
        let base_url = if url.starts_with("http://") || url.starts_with("https://") {
            url.trim_end_matches('/').to_string()
        } else {
            format!("http://{}", url.trim_end_matches('/'))
        };

        Self {
            base_url,
            client: build_client(timeout_secs),
            retry,
        }
    }

    /// Get the Ollama server version
    pub async fn version(&self) -> Result<String, ProviderError> {
        let url = format!("{}/api/version", self.base_url);
        let response = self.retry.send("Ollama", || self.client.get(&url)).await?;
        let version = response.json::<VersionResponse>().await
            .map_err(|e| ProviderError::ParseError(format!("Ollama version response: {}", e)))?;
        Ok(version.version)
    }

    /// Parse a generate response, tolerating streamed JSONL bodies
    pub fn parse_generation_response(response_text: &str) -> Result<GenerationResponse, ProviderError> {
        if let Ok(response) = serde_json::from_str::<GenerationResponse>(response_text) {
            return Ok(response);
        }

        // A streamed body is one JSON object per line; the pieces concatenate into the full text
        let mut full_response = String::new();
        let mut last: Option<GenerationResponse> = None;
        for line in response_text.lines().filter(|l| !l.trim().is_empty()) {
            match serde_json::from_str::<GenerationResponse>(line) {
                Ok(piece) => {
                    full_response.push_str(&piece.response);
                    last = Some(piece);
                }
                Err(e) => {
                    let preview: String = response_text.chars().take(500).collect();
                    error!("Failed to parse Ollama API response: {}. Raw response (first 500 chars): {}", e, preview);
                    return Err(ProviderError::ParseError(format!("Ollama response: {}", e)));
                }
            }
        }

        match last {
            Some(mut final_piece) => {
                final_piece.response = full_response;
                final_piece.done = true;
                Ok(final_piece)
            }
            None => Err(ProviderError::ParseError("Empty response from Ollama API".to_string())),
        }
    }
}

#[async_trait]
impl Provider for Ollama {
    type Request = GenerationRequest;
    type Response = GenerationResponse;

    async fn complete(&self, request: GenerationRequest) -> Result<GenerationResponse, ProviderError> {
        let url = format!("{}/api/generate", self.base_url);

        let response = self.retry.send("Ollama", || self.client.post(&url).json(&request)).await?;

        let response_text = response.text().await
            .map_err(|e| ProviderError::RequestFailed(format!("Failed to get response text from Ollama API: {}", e)))?;

        Self::parse_generation_response(&response_text)
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        self.version().await.map(|_| ())
    }

    fn extract_text(response: &GenerationResponse) -> String {
        response.response.clone()
    }
}
