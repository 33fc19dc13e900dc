/*!
 * Tests for speech text preparation and the speech service
 */

use anyhow::Result;
use std::fs;
use std::sync::Arc;

use pdfcast::errors::SynthesisError;
use pdfcast::speech::google_translate::MAX_PART_CHARS;
use pdfcast::speech::{clean_for_speech, split_for_speech, SpeechService};

use crate::common;
use crate::common::mock_providers::RecordingSynthesizer;

#[test]
fn test_clean_for_speech_withAsterisks_shouldRemoveAllOfThem() {
    let text = "**Intro**\n\n*Host:* Today we discuss *transformers* ***and more***";
    let asterisks = text.matches('*').count();

    let cleaned = clean_for_speech(text);

    assert_eq!(asterisks, 14);
    assert_eq!(cleaned.matches('*').count(), 0);
    assert_eq!(cleaned.chars().count(), text.chars().count() - asterisks);
}

#[test]
fn test_split_for_speech_withSummaryText_shouldFitTranslateLimit() {
    let text = common::sample_text(1500);
    let parts = split_for_speech(&text, MAX_PART_CHARS);

    assert!(parts.len() >= 15);
    assert!(parts.iter().all(|p| p.chars().count() <= MAX_PART_CHARS));
}

#[tokio::test]
async fn test_synthesize_to_file_shouldSubmitCleanedTextAndWriteAudio() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let output = temp_dir.path().join("generated_podcast.mp3");
    let synthesizer = RecordingSynthesizer::with_audio(b"ID3 fake mp3");
    let service = SpeechService::new(Arc::new(synthesizer.clone()));

    let written = service.synthesize_to_file("  **Hello** listeners!  ", &output).await?;

    assert_eq!(written, output);
    assert_eq!(synthesizer.calls(), vec!["Hello listeners!".to_string()]);
    assert_eq!(fs::read(&output)?, b"ID3 fake mp3");
    Ok(())
}

#[tokio::test]
async fn test_synthesize_to_file_withEmptyText_shouldFailWithoutServiceCall() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let output = temp_dir.path().join("generated_podcast.mp3");
    let synthesizer = RecordingSynthesizer::new();
    let service = SpeechService::new(Arc::new(synthesizer.clone()));

    for text in ["", "   \n\n  ", "****"] {
        let result = service.synthesize_to_file(text, &output).await;
        assert!(matches!(result, Err(SynthesisError::EmptyInput)), "input {:?}", text);
    }

    assert_eq!(synthesizer.call_count(), 0);
    assert!(!output.exists());
    Ok(())
}

#[tokio::test]
async fn test_synthesize_to_file_withEmptyAudio_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let output = temp_dir.path().join("generated_podcast.mp3");
    let service = SpeechService::new(Arc::new(RecordingSynthesizer::with_audio(b"")));

    let result = service.synthesize_to_file("Hello", &output).await;

    assert!(matches!(result, Err(SynthesisError::EmptyAudio)));
    assert!(!output.exists());
    Ok(())
}

#[tokio::test]
async fn test_synthesize_to_file_withServiceFailure_shouldKeepPreviousAudio() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let output = temp_dir.path().join("generated_podcast.mp3");
    fs::write(&output, b"previous run")?;
    let service = SpeechService::new(Arc::new(RecordingSynthesizer::failing()));

    let result = service.synthesize_to_file("Hello", &output).await;

    assert!(matches!(result, Err(SynthesisError::Provider(_))));
    assert_eq!(fs::read(&output)?, b"previous run");
    Ok(())
}
