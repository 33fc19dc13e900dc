/*!
 * Mock speech synthesizer for testing
 *
 * Records every text it receives and returns predetermined audio bytes, so
 * pipeline tests never reach a real text-to-speech service.
 */

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use pdfcast::errors::{ProviderError, SynthesisError};
use pdfcast::speech::SpeechSynthesizer;

/// Synthesizer that records its input
#[derive(Debug, Clone, Default)]
pub struct RecordingSynthesizer {
    /// Every text submitted, in order
    calls: Arc<Mutex<Vec<String>>>,
    /// Bytes returned for each call; the text itself when `None`
    audio: Option<Vec<u8>>,
    /// Fail every call with a provider error
    should_fail: bool,
}

impl RecordingSynthesizer {
    /// Echo the submitted text back as the "audio"
    pub fn new() -> Self {
        Self::default()
    }

    /// Always return the given bytes
    pub fn with_audio(audio: &[u8]) -> Self {
        Self { audio: Some(audio.to_vec()), ..Self::default() }
    }

    /// Fail every call
    pub fn failing() -> Self {
        Self { should_fail: true, ..Self::default() }
    }

    /// Texts received so far
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl SpeechSynthesizer for RecordingSynthesizer {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, SynthesisError> {
        self.calls.lock().unwrap().push(text.to_string());

        if self.should_fail {
            return Err(SynthesisError::Provider(ProviderError::ConnectionError(
                "Simulated speech service outage".to_string(),
            )));
        }

        Ok(match &self.audio {
            Some(audio) => audio.clone(),
            None => text.as_bytes().to_vec(),
        })
    }

    fn name(&self) -> &str {
        "Recording TTS"
    }
}
