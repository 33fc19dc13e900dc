/*!
 * Tests for application configuration functionality
 */

use std::collections::HashMap;

use pdfcast::app_config::{Config, LogLevel, ProviderConfig, SpeechProvider, SummaryProvider};
use pdfcast::errors::ConfigError;
use pdfcast::summary::PodcastDuration;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs.iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |name| map.get(name).cloned()
}

/// A default configuration with a Gemini key filled in
fn configured() -> Config {
    let mut config = Config::default();
    config.apply_credentials(lookup_from(&[("GOOGLE_API_KEY", "test-key")]));
    config
}

/// Test default configuration values
#[test]
fn test_default_config_withNoParameters_shouldHaveCorrectDefaults() {
    let config = Config::default();

    assert_eq!(config.summarization.provider, SummaryProvider::Gemini);
    assert_eq!(config.summarization.get_model(), "gemini-1.5-flash");
    assert_eq!(config.summarization.get_max_chars_per_request(), 12000);
    assert_eq!(config.summarization.optimal_concurrent_requests(), 1);
    assert_eq!(config.summarization.common.default_duration, PodcastDuration::Medium);

    assert_eq!(config.speech.provider, SpeechProvider::GoogleTranslate);
    assert_eq!(config.speech.language, "en");
    assert_eq!(config.speech.tld, "com");
    assert_eq!(config.speech.get_endpoint(), "https://translate.google.com");

    assert_eq!(config.server.upload_path().file_name().unwrap(), "temp_uploaded.pdf");
    assert_eq!(config.server.output_path().file_name().unwrap(), "generated_podcast.mp3");
    assert_eq!(config.server.bind_address(), "127.0.0.1:8501");

    assert_eq!(config.log_level, LogLevel::Info);
}

#[test]
fn test_validate_withoutGeminiKey_shouldReportMissingKey() {
    let config = Config::default();

    match config.validate() {
        Err(ConfigError::MissingApiKey(provider)) => assert_eq!(provider, "Gemini"),
        other => panic!("expected missing key error, got {:?}", other),
    }
}

#[test]
fn test_validate_withKeyFromEnvironment_shouldPass() {
    assert!(configured().validate().is_ok());
}

#[test]
fn test_validate_withOllama_shouldNotNeedKey() {
    let mut config = Config::default();
    config.summarization.provider = SummaryProvider::Ollama;
    assert!(config.validate().is_ok());
}

#[test]
fn test_validate_withZeroChunkSize_shouldFail() {
    let mut config = configured();
    config.summarization.active_provider_config_mut().max_chars_per_request = 0;

    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidValue { ref field, .. }) if field == "max_chars_per_request"
    ));
}

#[test]
fn test_validate_withZeroConcurrency_shouldFail() {
    let mut config = configured();
    config.summarization.active_provider_config_mut().concurrent_requests = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_withEmptyLanguage_shouldFail() {
    let mut config = configured();
    config.speech.language = "  ".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_withOpenAiSpeechAndNoKey_shouldFail() {
    let mut config = configured();
    config.speech.provider = SpeechProvider::OpenAI;
    assert!(matches!(config.validate(), Err(ConfigError::MissingApiKey(_))));

    config.apply_credentials(lookup_from(&[("OPENAI_API_KEY", "sk-test")]));
    assert!(config.validate().is_ok());
}

#[test]
fn test_apply_credentials_withKeyInFile_shouldKeepFileKey() {
    let mut config = Config::default();
    config.summarization.active_provider_config_mut().api_key = "from-file".to_string();

    config.apply_credentials(lookup_from(&[("GOOGLE_API_KEY", "from-env")]));

    assert_eq!(config.summarization.get_api_key(), "from-file");
}

#[test]
fn test_apply_credentials_shouldFillEachProviderFromItsVariable() {
    let mut config = Config::default();
    config.apply_credentials(lookup_from(&[
        ("GOOGLE_API_KEY", "google"),
        ("ANTHROPIC_API_KEY", "anthropic"),
    ]));

    let gemini = config.summarization.get_provider_config(&SummaryProvider::Gemini).unwrap();
    let anthropic = config.summarization.get_provider_config(&SummaryProvider::Anthropic).unwrap();
    let ollama = config.summarization.get_provider_config(&SummaryProvider::Ollama).unwrap();
    assert_eq!(gemini.api_key, "google");
    assert_eq!(anthropic.api_key, "anthropic");
    assert!(ollama.api_key.is_empty());
}

#[test]
fn test_active_provider_config_mut_withMissingEntry_shouldCreateIt() {
    let mut config = Config::default();
    config.summarization.available_providers.clear();
    config.summarization.provider = SummaryProvider::Anthropic;

    config.summarization.active_provider_config_mut().model = "claude-test".to_string();

    assert_eq!(config.summarization.available_providers.len(), 1);
    assert_eq!(config.summarization.get_model(), "claude-test");
    assert_eq!(config.summarization.get_endpoint(), "https://api.anthropic.com");
}

#[test]
fn test_apply_credentials_withNoEntryForActiveProvider_shouldCreateEntryWithKey() {
    let mut config = Config::default();
    config.summarization.available_providers.clear();

    config.apply_credentials(lookup_from(&[("GOOGLE_API_KEY", "google")]));

    assert_eq!(config.summarization.get_api_key(), "google");
    assert!(config.validate().is_ok());
}

#[test]
fn test_apply_credentials_afterModelOverrideCreatedEntry_shouldFillKey() {
    let mut config = Config::default();
    config.summarization.available_providers.clear();
    config.summarization.provider = SummaryProvider::Anthropic;
    config.summarization.active_provider_config_mut().model = "claude-test".to_string();

    config.apply_credentials(lookup_from(&[("ANTHROPIC_API_KEY", "anthropic")]));

    assert_eq!(config.summarization.get_api_key(), "anthropic");
    assert_eq!(config.summarization.get_model(), "claude-test");
    assert!(config.validate().is_ok());
}

#[test]
fn test_provider_config_new_shouldUseProviderDefaults() {
    let ollama = ProviderConfig::new(SummaryProvider::Ollama);
    assert_eq!(ollama.provider_type, "ollama");
    assert_eq!(ollama.endpoint, "http://localhost:11434");
    assert_eq!(ollama.rate_limit, None);

    let gemini = ProviderConfig::new(SummaryProvider::Gemini);
    assert_eq!(gemini.endpoint, "https://generativelanguage.googleapis.com/v1beta");
    assert_eq!(gemini.rate_limit, Some(15));
}

#[test]
fn test_config_deserialization_withPartialJson_shouldFillDefaults() {
    let json = r#"{
        "summarization": {
            "provider": "ollama",
            "available_providers": [
                { "type": "ollama", "model": "mistral", "max_chars_per_request": 8000 }
            ]
        },
        "speech": { "tld": "co.uk" },
        "log_level": "debug"
    }"#;

    let config: Config = serde_json::from_str(json).unwrap();

    assert_eq!(config.summarization.provider, SummaryProvider::Ollama);
    assert_eq!(config.summarization.get_model(), "mistral");
    assert_eq!(config.summarization.get_max_chars_per_request(), 8000);
    assert_eq!(config.summarization.get_endpoint(), "http://localhost:11434");
    assert_eq!(config.summarization.common.retry_count, 3);
    assert_eq!(config.speech.get_endpoint(), "https://translate.google.co.uk");
    assert_eq!(config.server.port, 8501);
    assert_eq!(config.log_level, LogLevel::Debug);
}

#[test]
fn test_config_serialization_shouldRoundTripProviders() {
    let config = configured();
    let json = serde_json::to_string_pretty(&config).unwrap();
    let parsed: Config = serde_json::from_str(&json).unwrap();

    assert_eq!(parsed.summarization.available_providers.len(), 3);
    assert_eq!(parsed.summarization.get_api_key(), "test-key");
    assert!(json.contains("\"type\": \"gemini\""));
}

#[test]
fn test_provider_from_str_withUnknownName_shouldFail() {
    assert_eq!("Gemini".parse::<SummaryProvider>().unwrap(), SummaryProvider::Gemini);
    assert!("openai".parse::<SummaryProvider>().is_err());
    assert_eq!("google_translate".parse::<SpeechProvider>().unwrap(), SpeechProvider::GoogleTranslate);
    assert!("espeak".parse::<SpeechProvider>().is_err());
}

#[test]
fn test_log_level_to_level_filter_shouldMapEachLevel() {
    assert_eq!(LogLevel::Error.to_level_filter(), log::LevelFilter::Error);
    assert_eq!(LogLevel::Trace.to_level_filter(), log::LevelFilter::Trace);
}
