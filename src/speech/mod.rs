/*!
 * Speech synthesis of the combined summary.
 *
 * - `text`: Markup cleanup and length-limited splitting
 * - `google_translate`: Google Translate text-to-speech client (default)
 * - `openai`: OpenAI audio speech client
 */

use async_trait::async_trait;
use log::{debug, info};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::app_config::{SpeechConfig, SpeechProvider};
use crate::errors::SynthesisError;
use crate::file_utils::FileManager;
use crate::providers::RetryPolicy;

pub use self::google_translate::GoogleTranslateTts;
pub use self::openai::OpenAiTts;
pub use self::text::{clean_for_speech, split_for_speech};

pub mod google_translate;
pub mod openai;
pub mod text;

/// Text-in, audio-out call made once per run
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Turn already-cleaned text into encoded audio bytes
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, SynthesisError>;

    /// Engine name, for log lines
    fn name(&self) -> &str;
}

/// Build the synthesizer selected in the configuration
pub fn synthesizer_from_config(config: &SpeechConfig) -> Arc<dyn SpeechSynthesizer> {
    let retry = RetryPolicy::new(config.retry_count, config.retry_backoff_ms, None);

    match config.provider {
        SpeechProvider::GoogleTranslate => Arc::new(GoogleTranslateTts::new(
            config.get_endpoint(),
            config.language.clone(),
            config.timeout_secs,
            retry,
        )),
        SpeechProvider::OpenAI => Arc::new(OpenAiTts::new(
            config.api_key.clone(),
            config.get_endpoint(),
            config.model.clone(),
            config.voice.clone(),
            config.timeout_secs,
            retry,
        )),
    }
}

/// Writes the spoken version of a script to an audio file
#[derive(Clone)]
pub struct SpeechService {
    synthesizer: Arc<dyn SpeechSynthesizer>,
}

impl SpeechService {
    /// Create a new speech service around a synthesizer
    pub fn new(synthesizer: Arc<dyn SpeechSynthesizer>) -> Self {
        Self { synthesizer }
    }

    /// Create a speech service from configuration
    pub fn from_config(config: &SpeechConfig) -> Self {
        Self::new(synthesizer_from_config(config))
    }

    /// Engine name
    pub fn name(&self) -> &str {
        self.synthesizer.name()
    }

    /// Clean `text`, synthesize it and write the audio to `output_path`
    ///
    /// Empty input fails with `SynthesisError::EmptyInput` before any service call.
    /// The file at `output_path` is replaced only once the full audio is available.
    pub async fn synthesize_to_file(&self, text: &str, output_path: &Path) -> Result<PathBuf, SynthesisError> {
        let cleaned = clean_for_speech(text);
        if cleaned.trim().is_empty() {
            return Err(SynthesisError::EmptyInput);
        }

        debug!("Synthesizing {} characters with {}", cleaned.chars().count(), self.synthesizer.name());
        let audio = self.synthesizer.synthesize(cleaned.trim()).await?;
        if audio.is_empty() {
            return Err(SynthesisError::EmptyAudio);
        }

        FileManager::write_bytes_atomic(output_path, &audio)
            .map_err(|source| SynthesisError::Io { path: output_path.to_path_buf(), source })?;

        info!("Audio saved as {:?} ({} bytes)", output_path, audio.len());
        Ok(output_path.to_path_buf())
    }
}
