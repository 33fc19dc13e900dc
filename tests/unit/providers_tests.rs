/*!
 * Tests for provider clients against a local mock HTTP server
 */

use serde_json::json;
use std::time::{Duration, Instant};
use wiremock::matchers::{body_json, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use pdfcast::app_config::{SummarizationConfig, SummaryProvider};
use pdfcast::errors::{ProviderError, SynthesisError};
use pdfcast::providers::anthropic::{Anthropic, AnthropicRequest};
use pdfcast::providers::gemini::{Gemini, GeminiRequest};
use pdfcast::providers::ollama::{GenerationRequest, Ollama};
use pdfcast::providers::{Provider, RetryPolicy};
use pdfcast::speech::{GoogleTranslateTts, OpenAiTts, SpeechSynthesizer};
use pdfcast::summary::{ChunkSummarizer, SummarizationService};

/// Retries without waiting
fn fast_retry(max_retries: u32) -> RetryPolicy {
    RetryPolicy::new(max_retries, 1, None)
}

#[test]
fn test_retry_policy_backoff_shouldDoubleEachAttempt() {
    let policy = RetryPolicy::new(3, 1000, None);
    assert_eq!(policy.backoff_for(1).as_millis(), 1000);
    assert_eq!(policy.backoff_for(2).as_millis(), 2000);
    assert_eq!(policy.backoff_for(3).as_millis(), 4000);
}

#[test]
fn test_retry_policy_request_interval_shouldFollowRateLimit() {
    assert_eq!(RetryPolicy::new(0, 0, Some(15)).request_interval(), Some(Duration::from_secs(4)));
    assert_eq!(RetryPolicy::new(0, 0, Some(0)).request_interval(), None);
    assert_eq!(RetryPolicy::new(0, 0, None).request_interval(), None);
}

#[tokio::test]
async fn test_retry_policy_withRateLimit_shouldPaceFirstAttempts() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": "llama3.2",
            "response": "ok",
            "done": true
        })))
        .expect(3)
        .mount(&server)
        .await;

    // 1200 requests per minute: one request every 50 ms, shared by clones
    let policy = RetryPolicy::new(0, 1, Some(1200));
    let first = Ollama::new_with_config(server.uri(), 5, policy.clone());
    let second = Ollama::new_with_config(server.uri(), 5, policy);

    let start = Instant::now();
    let (a, b, c) = tokio::join!(
        first.complete(GenerationRequest::new("llama3.2", "one")),
        second.complete(GenerationRequest::new("llama3.2", "two")),
        first.complete(GenerationRequest::new("llama3.2", "three")),
    );

    assert!(a.is_ok() && b.is_ok() && c.is_ok());
    assert!(start.elapsed() >= Duration::from_millis(100));
}

#[tokio::test]
async fn test_gemini_complete_shouldSendKeyAndReturnCandidateText() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/models/gemini-1.5-flash:generateContent"))
        .and(query_param("key", "test-key"))
        .and(body_string_contains("Summarize this"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": "Welcome " }, { "text": "to the show." }] },
                "finishReason": "STOP"
            }],
            "usageMetadata": { "promptTokenCount": 12, "candidatesTokenCount": 5, "totalTokenCount": 17 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = Gemini::new_with_config("test-key", server.uri(), "gemini-1.5-flash", 5, fast_retry(0));
    let response = client.complete(GeminiRequest::new("gemini-1.5-flash", "Summarize this\n\ntext")).await.unwrap();

    assert_eq!(Gemini::extract_text(&response), "Welcome to the show.");
}

#[tokio::test]
async fn test_gemini_complete_withNoCandidates_shouldBeParseError() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
        .mount(&server)
        .await;

    let client = Gemini::new_with_config("k", server.uri(), "gemini-1.5-flash", 5, fast_retry(0));
    let result = client.complete(GeminiRequest::new("gemini-1.5-flash", "hi")).await;

    assert!(matches!(result, Err(ProviderError::ParseError(_))));
}

#[tokio::test]
async fn test_gemini_complete_withBadKey_shouldFailWithoutRetry() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(403).set_body_string("API key not valid"))
        .expect(1)
        .mount(&server)
        .await;

    let client = Gemini::new_with_config("bad", server.uri(), "gemini-1.5-flash", 5, fast_retry(3));
    let result = client.complete(GeminiRequest::new("gemini-1.5-flash", "hi")).await;

    assert!(matches!(result, Err(ProviderError::AuthenticationError(_))));
}

#[tokio::test]
async fn test_ollama_complete_withTransientFailures_shouldRetryThenSucceed() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .with_priority(1)
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": "llama3.2",
            "response": "A short narration.",
            "done": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = Ollama::new_with_config(server.uri(), 5, fast_retry(3));
    let response = client.complete(GenerationRequest::new("llama3.2", "prompt")).await.unwrap();

    assert_eq!(Ollama::extract_text(&response), "A short narration.");
}

#[tokio::test]
async fn test_ollama_complete_withPersistentFailure_shouldStopAfterRetries() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("model crashed"))
        .expect(3)
        .mount(&server)
        .await;

    let client = Ollama::new_with_config(server.uri(), 5, fast_retry(2));
    let result = client.complete(GenerationRequest::new("llama3.2", "prompt")).await;

    assert!(matches!(result, Err(ProviderError::ApiError { status_code: 500, .. })));
}

#[tokio::test]
async fn test_anthropic_complete_shouldSendHeadersAndJoinTextBlocks() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(header("x-api-key", "anthropic-key"))
        .and(header("anthropic-version", "2023-06-01"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [{ "type": "text", "text": "Hello listeners." }],
            "usage": { "input_tokens": 10, "output_tokens": 4 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = Anthropic::new_with_config("anthropic-key", server.uri(), "claude-3-haiku-20240307", 5, fast_retry(0));
    let request = AnthropicRequest::new("claude-3-haiku-20240307", 100).add_message("user", "Summarize");
    let response = client.complete(request).await.unwrap();

    assert_eq!(Anthropic::extract_text(&response), "Hello listeners.");
}

#[tokio::test]
async fn test_summarization_service_withOllama_shouldSendWholeRequestAsPrompt() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_string_contains("\"prompt\":\"Do this\\n\\nchunk text\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": "llama3.2", "response": "  Summary.  ", "done": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = SummarizationConfig::default();
    config.provider = SummaryProvider::Ollama;
    config.active_provider_config_mut().endpoint = server.uri();
    config.common.retry_count = 0;

    let service = SummarizationService::new(config).unwrap();
    let text = service.summarize("Do this\n\nchunk text").await.unwrap();

    assert_eq!(text, "  Summary.  ");
    assert_eq!(service.describe(), "Ollama - llama3.2");
}

#[tokio::test]
async fn test_summarization_service_test_connection_withOllama_shouldQueryVersion() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/version"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "version": "0.5.1" })))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = SummarizationConfig::default();
    config.provider = SummaryProvider::Ollama;
    config.active_provider_config_mut().endpoint = server.uri();

    let service = SummarizationService::new(config).unwrap();

    assert!(service.test_connection().await.is_ok());
}

#[tokio::test]
async fn test_summarization_service_test_connection_withBadGeminiKey_shouldFail() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/models/gemini-1.5-flash:generateContent"))
        .respond_with(ResponseTemplate::new(403).set_body_string("API key not valid"))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = SummarizationConfig::default();
    let gemini = config.active_provider_config_mut();
    gemini.endpoint = server.uri();
    gemini.api_key = "bad-key".to_string();

    let service = SummarizationService::new(config).unwrap();

    assert!(matches!(service.test_connection().await, Err(ProviderError::AuthenticationError(_))));
}

#[tokio::test]
async fn test_google_translate_tts_shouldRequestEachPartInOrder() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/translate_tts"))
        .and(query_param("tl", "en"))
        .and(query_param("client", "tw-ob"))
        .and(query_param("idx", "0"))
        .and(query_param("total", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"AAA".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/translate_tts"))
        .and(query_param("idx", "1"))
        .and(query_param("total", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"BBB".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let tts = GoogleTranslateTts::new(server.uri(), "en", 5, fast_retry(0));
    let text = format!("{}. {}.", "a".repeat(60), "b".repeat(60));
    let audio = tts.synthesize(&text).await.unwrap();

    assert_eq!(audio, b"AAABBB");
}

#[tokio::test]
async fn test_google_translate_tts_withServerError_shouldBeProviderError() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let tts = GoogleTranslateTts::new(server.uri(), "en", 5, fast_retry(1));
    let result = tts.synthesize("Hello there.").await;

    assert!(matches!(result, Err(SynthesisError::Provider(ProviderError::ApiError { status_code: 500, .. }))));
}

#[tokio::test]
async fn test_openai_tts_shouldPostSpeechRequest() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/audio/speech"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_json(json!({
            "model": "tts-1",
            "voice": "alloy",
            "input": "Hello there.",
            "response_format": "mp3"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"MP3DATA".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let tts = OpenAiTts::new("sk-test", server.uri(), "tts-1", "alloy", 5, fast_retry(0));
    let audio = tts.synthesize("Hello there.").await.unwrap();

    assert_eq!(audio, b"MP3DATA");
    assert_eq!(tts.name(), "OpenAI TTS");
}
