use async_trait::async_trait;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::errors::ProviderError;
use super::{build_client, Provider, RetryPolicy};

/// Gemini client for the Google Generative Language API
#[derive(Debug)]
pub struct Gemini {
    /// HTTP client for API requests
    client: reqwest::Client,
    /// API key for authentication
    api_key: String,
    /// API base URL including the version segment
    endpoint: String,
    /// Model used for connection tests
    model: String,
    /// Retry settings
    retry: RetryPolicy,
}

/// Gemini `generateContent` request
#[derive(Debug, Serialize)]
pub struct GeminiRequest {
    /// The model to use; part of the URL, not the body
    #[serde(skip)]
    model: String,

    /// Conversation turns
    contents: Vec<GeminiContent>,

    /// Sampling settings
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

/// A single turn of content
#[derive(Debug, Serialize, Deserialize)]
pub struct GeminiContent {
    /// Role of the author (user, model)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    /// Content parts
    #[serde(default)]
    pub parts: Vec<GeminiPart>,
}

/// A text part
#[derive(Debug, Serialize, Deserialize)]
pub struct GeminiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Sampling settings for a request
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

/// Gemini response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiResponse {
    /// Generated candidates; the first one is used
    #[serde(default)]
    pub candidates: Vec<GeminiCandidate>,
}

/// A single generated candidate
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiCandidate {
    #[serde(default)]
    pub content: Option<GeminiContent>,

    #[serde(default)]
    pub finish_reason: Option<String>,
}

impl GeminiRequest {
    /// Create a request with a single user turn
    pub fn new(model: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![GeminiPart { text: Some(text.into()) }],
            }],
            generation_config: None,
        }
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.generation_config
            .get_or_insert(GenerationConfig { temperature: None, max_output_tokens: None })
            .temperature = Some(temperature);
        self
    }

    /// Set the maximum number of output tokens
    pub fn max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.generation_config
            .get_or_insert(GenerationConfig { temperature: None, max_output_tokens: None })
            .max_output_tokens = Some(max_output_tokens);
        self
    }
}

impl Gemini {
    /// Create a new Gemini client
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        Self::new_with_config(api_key, endpoint, model, 120, RetryPolicy::default())
    }

    /// Create a new Gemini client with timeout and retry settings
    pub fn new_with_config(
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
        model: impl Into<String>,
        timeout_secs: u64,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            client: build_client(timeout_secs),
            api_key: api_key.into(),
            endpoint: endpoint.into(),
            model: model.into(),
            retry,
        }
    }

    fn generate_url(&self, model: &str) -> String {
        let base = if self.endpoint.is_empty() {
            "https://generativelanguage.googleapis.com/v1beta"
        } else {
            self.endpoint.trim_end_matches('/')
        };
        format!("{}/models/{}:generateContent", base, model)
    }
}

#[async_trait]
impl Provider for Gemini {
    type Request = GeminiRequest;
    type Response = GeminiResponse;

    async fn complete(&self, request: GeminiRequest) -> Result<GeminiResponse, ProviderError> {
        let url = self.generate_url(&request.model);
        debug!("Gemini generateContent with model {}", request.model);

        let response = self.retry.send("Gemini", || {
            self.client.post(&url)
                .query(&[("key", self.api_key.as_str())])
                .json(&request)
        }).await?;

        let gemini_response = response.json::<GeminiResponse>().await
            .map_err(|e| ProviderError::ParseError(format!("Gemini response: {}", e)))?;

        if gemini_response.candidates.is_empty() {
            return Err(ProviderError::ParseError("No candidates in Gemini response".to_string()));
        }

        Ok(gemini_response)
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        let request = GeminiRequest::new(self.model.clone(), "Hello").max_output_tokens(5);
        self.complete(request).await?;
        Ok(())
    }

    fn extract_text(response: &GeminiResponse) -> String {
        response.candidates.first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content.parts.iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}
