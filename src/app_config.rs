use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::PathBuf;

use crate::errors::ConfigError;
use crate::summary::PodcastDuration;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Summarization config
    pub summarization: SummarizationConfig,

    /// Speech synthesis config
    pub speech: SpeechConfig,

    /// Web page and output file settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Summarization provider type
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SummaryProvider {
    // @provider: Google Gemini
    #[default]
    Gemini,
    // @provider: Ollama
    Ollama,
    // @provider: Anthropic
    Anthropic,
}

impl SummaryProvider {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Gemini => "Gemini",
            Self::Ollama => "Ollama",
            Self::Anthropic => "Anthropic",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Gemini => "gemini".to_string(),
            Self::Ollama => "ollama".to_string(),
            Self::Anthropic => "anthropic".to_string(),
        }
    }

    // @returns: Environment variable holding the API key, if the provider needs one
    pub fn api_key_env_var(&self) -> Option<&'static str> {
        match self {
            Self::Gemini => Some("GOOGLE_API_KEY"),
            Self::Ollama => None,
            Self::Anthropic => Some("ANTHROPIC_API_KEY"),
        }
    }
}

impl std::fmt::Display for SummaryProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for SummaryProvider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gemini" => Ok(Self::Gemini),
            "ollama" => Ok(Self::Ollama),
            "anthropic" => Ok(Self::Anthropic),
            _ => Err(ConfigError::Unknown { kind: "summarization provider", value: s.to_string() }),
        }
    }
}

/// Speech synthesis provider type
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SpeechProvider {
    // @provider: Google Translate text-to-speech
    #[default]
    #[serde(alias = "google_translate")]
    GoogleTranslate,
    // @provider: OpenAI audio speech
    OpenAI,
}

impl SpeechProvider {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::GoogleTranslate => "Google Translate TTS",
            Self::OpenAI => "OpenAI TTS",
        }
    }
}

impl std::str::FromStr for SpeechProvider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "googletranslate" | "google_translate" | "google" => Ok(Self::GoogleTranslate),
            "openai" => Ok(Self::OpenAI),
            _ => Err(ConfigError::Unknown { kind: "speech provider", value: s.to_string() }),
        }
    }
}

/// Provider configuration wrapper
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderConfig {
    // @field: Provider type identifier
    #[serde(rename = "type")]
    pub provider_type: String,

    // @field: Model name
    #[serde(default = "String::new")]
    pub model: String,

    // @field: API key
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Service URL
    #[serde(default = "String::new")]
    pub endpoint: String,

    // @field: Max concurrent chunk requests
    #[serde(default = "default_concurrent_requests")]
    pub concurrent_requests: usize,

    // @field: Chunk size in characters
    #[serde(default = "default_max_chars_per_request")]
    pub max_chars_per_request: usize,

    // @field: Timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    // @field: Rate limit (requests per minute)
    #[serde(default)]
    pub rate_limit: Option<u32>,
}

impl ProviderConfig {
    // @param provider_type: Provider enum
    // @returns: Provider config with defaults
    pub fn new(provider_type: SummaryProvider) -> Self {
        let (model, endpoint, rate_limit) = match provider_type {
            SummaryProvider::Gemini => (default_gemini_model(), default_gemini_endpoint(), Some(15)),
            SummaryProvider::Ollama => (default_ollama_model(), default_ollama_endpoint(), None),
            SummaryProvider::Anthropic => (default_anthropic_model(), default_anthropic_endpoint(), Some(45)),
        };

        Self {
            provider_type: provider_type.to_lowercase_string(),
            model,
            api_key: String::new(),
            endpoint,
            concurrent_requests: default_concurrent_requests(),
            max_chars_per_request: default_max_chars_per_request(),
            timeout_secs: default_timeout_secs(),
            rate_limit,
        }
    }
}

/// Summarization service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SummarizationConfig {
    /// Summarization provider to use
    #[serde(default)]
    pub provider: SummaryProvider,

    /// Available summarization providers
    #[serde(default)]
    pub available_providers: Vec<ProviderConfig>,

    /// Common settings applicable to all providers
    #[serde(default)]
    pub common: SummarizationCommonConfig,
}

/// Common summarization settings applicable to all providers
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SummarizationCommonConfig {
    /// Retry count for failed requests
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Backoff multiplier for retries (in milliseconds)
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Temperature parameter for text generation (0.0 to 1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Duration preselected on the page and used by the CLI when none is given
    #[serde(default)]
    pub default_duration: PodcastDuration,
}

impl Default for SummarizationCommonConfig {
    fn default() -> Self {
        Self {
            retry_count: default_retry_count(),
            retry_backoff_ms: default_retry_backoff_ms(),
            temperature: default_temperature(),
            default_duration: PodcastDuration::default(),
        }
    }
}

/// Speech synthesis configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SpeechConfig {
    /// Speech provider to use
    #[serde(default)]
    pub provider: SpeechProvider,

    /// Spoken language (IETF tag understood by the provider)
    #[serde(default = "default_speech_language")]
    pub language: String,

    /// Top-level domain selecting the accent for Google Translate TTS
    #[serde(default = "default_speech_tld")]
    pub tld: String,

    /// Model name (OpenAI only)
    #[serde(default = "default_openai_speech_model")]
    pub model: String,

    /// Voice name (OpenAI only)
    #[serde(default = "default_openai_voice")]
    pub voice: String,

    /// API key (OpenAI only)
    #[serde(default = "String::new")]
    pub api_key: String,

    /// Service URL override; derived from the provider when empty
    #[serde(default = "String::new")]
    pub endpoint: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Retry count for failed requests
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Backoff multiplier for retries (in milliseconds)
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            provider: SpeechProvider::default(),
            language: default_speech_language(),
            tld: default_speech_tld(),
            model: default_openai_speech_model(),
            voice: default_openai_voice(),
            api_key: String::new(),
            endpoint: String::new(),
            timeout_secs: default_timeout_secs(),
            retry_count: default_retry_count(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

impl SpeechConfig {
    /// Get the endpoint for the active speech provider
    pub fn get_endpoint(&self) -> String {
        if !self.endpoint.is_empty() {
            return self.endpoint.clone();
        }

        match self.provider {
            SpeechProvider::GoogleTranslate => format!("https://translate.google.{}", self.tld),
            SpeechProvider::OpenAI => default_openai_endpoint(),
        }
    }
}

/// Web page and output file settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServerConfig {
    /// Interface to bind
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory holding the uploaded document and the generated audio
    #[serde(default = "default_work_dir")]
    pub work_dir: PathBuf,

    /// Fixed name the uploaded document is stored under
    #[serde(default = "default_upload_file_name")]
    pub upload_file_name: String,

    /// Fixed name the generated audio is stored under
    #[serde(default = "default_output_file_name")]
    pub output_file_name: String,

    /// Largest accepted upload in bytes
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            work_dir: default_work_dir(),
            upload_file_name: default_upload_file_name(),
            output_file_name: default_output_file_name(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

impl ServerConfig {
    /// Path the uploaded document is written to
    pub fn upload_path(&self) -> PathBuf {
        self.work_dir.join(&self.upload_file_name)
    }

    /// Path the generated audio is written to
    pub fn output_path(&self) -> PathBuf {
        self.work_dir.join(&self.output_file_name)
    }

    /// Socket address string for binding
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Matching filter for the `log` facade
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_concurrent_requests() -> usize {
    1
}

fn default_max_chars_per_request() -> usize {
    12000
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    1000 // doubled on each retry
}

fn default_temperature() -> f32 {
    0.7
}

fn default_gemini_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_ollama_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_anthropic_endpoint() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_openai_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_gemini_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_ollama_model() -> String {
    "llama3.2".to_string()
}

fn default_anthropic_model() -> String {
    "claude-3-haiku-20240307".to_string()
}

fn default_speech_language() -> String {
    "en".to_string()
}

fn default_speech_tld() -> String {
    "com".to_string()
}

fn default_openai_speech_model() -> String {
    "tts-1".to_string()
}

fn default_openai_voice() -> String {
    "alloy".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8501
}

fn default_work_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_upload_file_name() -> String {
    "temp_uploaded.pdf".to_string()
}

fn default_output_file_name() -> String {
    "generated_podcast.mp3".to_string()
}

fn default_max_upload_bytes() -> usize {
    50 * 1024 * 1024
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<(), ConfigError> {
        let summarization = &self.summarization;

        if summarization.provider.api_key_env_var().is_some() && summarization.get_api_key().is_empty() {
            return Err(ConfigError::MissingApiKey(summarization.provider.display_name().to_string()));
        }

        if summarization.get_max_chars_per_request() == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_chars_per_request".to_string(),
                message: "chunk size must be greater than zero".to_string(),
            });
        }

        if summarization.optimal_concurrent_requests() == 0 {
            return Err(ConfigError::InvalidValue {
                field: "concurrent_requests".to_string(),
                message: "at least one request must be allowed".to_string(),
            });
        }

        if self.speech.language.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "speech.language".to_string(),
                message: "language cannot be empty".to_string(),
            });
        }

        if self.speech.provider == SpeechProvider::OpenAI && self.speech.api_key.is_empty() {
            return Err(ConfigError::MissingApiKey(self.speech.provider.display_name().to_string()));
        }

        if self.server.output_file_name.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "server.output_file_name".to_string(),
                message: "output file name cannot be empty".to_string(),
            });
        }

        Ok(())
    }

    /// Fill empty API keys from a lookup (normally the process environment)
    ///
    /// Keys already present in the configuration file are never replaced.
    pub fn apply_credentials<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        for provider_config in self.summarization.available_providers.iter_mut() {
            if !provider_config.api_key.is_empty() {
                continue;
            }
            let env_var = provider_config.provider_type.parse::<SummaryProvider>()
                .ok()
                .and_then(|p| p.api_key_env_var());
            if let Some(key) = env_var.and_then(&lookup) {
                provider_config.api_key = key;
            }
        }

        // The active provider may have no entry yet
        if self.summarization.get_api_key().is_empty() {
            if let Some(key) = self.summarization.provider.api_key_env_var().and_then(&lookup) {
                self.summarization.active_provider_config_mut().api_key = key;
            }
        }

        if self.speech.api_key.is_empty() {
            if let Some(key) = lookup("OPENAI_API_KEY") {
                self.speech.api_key = key;
            }
        }
    }

    /// Fill empty API keys from the process environment
    pub fn apply_env_credentials(&mut self) {
        self.apply_credentials(|name| std::env::var(name).ok().filter(|v| !v.is_empty()));
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            summarization: SummarizationConfig::default(),
            speech: SpeechConfig::default(),
            server: ServerConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl SummarizationConfig {
    pub fn optimal_concurrent_requests(&self) -> usize {
        if let Some(provider_config) = self.get_active_provider_config() {
            return provider_config.concurrent_requests;
        }

        default_concurrent_requests()
    }

    /// Get the active provider configuration from the available_providers array
    pub fn get_active_provider_config(&self) -> Option<&ProviderConfig> {
        self.get_provider_config(&self.provider)
    }

    /// Get a specific provider configuration by type
    pub fn get_provider_config(&self, provider_type: &SummaryProvider) -> Option<&ProviderConfig> {
        let provider_str = provider_type.to_lowercase_string();
        self.available_providers.iter()
            .find(|p| p.provider_type == provider_str)
    }

    /// Mutable access to the active provider configuration, created on demand
    pub fn active_provider_config_mut(&mut self) -> &mut ProviderConfig {
        let provider_str = self.provider.to_lowercase_string();
        let position = self.available_providers.iter().position(|p| p.provider_type == provider_str);
        let index = match position {
            Some(index) => index,
            None => {
                self.available_providers.push(ProviderConfig::new(self.provider.clone()));
                self.available_providers.len() - 1
            }
        };
        &mut self.available_providers[index]
    }

    /// Get the model for the active provider
    pub fn get_model(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.model.is_empty() {
                return provider_config.model.clone();
            }
        }

        match self.provider {
            SummaryProvider::Gemini => default_gemini_model(),
            SummaryProvider::Ollama => default_ollama_model(),
            SummaryProvider::Anthropic => default_anthropic_model(),
        }
    }

    /// Get the API key for the active provider
    pub fn get_api_key(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.api_key.is_empty() {
                return provider_config.api_key.clone();
            }
        }

        // Ollama doesn't use API keys
        String::new()
    }

    /// Get the endpoint for the active provider
    pub fn get_endpoint(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.endpoint.is_empty() {
                return provider_config.endpoint.clone();
            }
        }

        match self.provider {
            SummaryProvider::Gemini => default_gemini_endpoint(),
            SummaryProvider::Ollama => default_ollama_endpoint(),
            SummaryProvider::Anthropic => default_anthropic_endpoint(),
        }
    }

    /// Get the chunk size for the active provider
    pub fn get_max_chars_per_request(&self) -> usize {
        if let Some(provider_config) = self.get_active_provider_config() {
            return provider_config.max_chars_per_request;
        }

        default_max_chars_per_request()
    }

    /// Get the request timeout for the active provider
    pub fn get_timeout_secs(&self) -> u64 {
        self.get_active_provider_config()
            .map(|p| p.timeout_secs)
            .unwrap_or_else(default_timeout_secs)
    }

    /// Get the rate limit for the active provider
    pub fn get_rate_limit(&self) -> Option<u32> {
        if let Some(provider_config) = self.get_active_provider_config() {
            return provider_config.rate_limit;
        }

        ProviderConfig::new(self.provider.clone()).rate_limit
    }
}

impl Default for SummarizationConfig {
    fn default() -> Self {
        Self {
            provider: SummaryProvider::default(),
            available_providers: vec![
                ProviderConfig::new(SummaryProvider::Gemini),
                ProviderConfig::new(SummaryProvider::Ollama),
                ProviderConfig::new(SummaryProvider::Anthropic),
            ],
            common: SummarizationCommonConfig::default(),
        }
    }
}
