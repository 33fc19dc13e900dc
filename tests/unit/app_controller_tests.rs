/*!
 * Tests for the command line controller
 */

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::time::Duration;

use pdfcast::app_controller::Controller;
use pdfcast::providers::mock::MockProvider;
use pdfcast::summary::PodcastDuration;

use crate::common;
use crate::common::mock_providers::RecordingSynthesizer;

#[test]
fn test_default_audio_path_shouldSitNextToDocument() {
    assert_eq!(
        Controller::default_audio_path(Path::new("papers/attention.pdf")),
        PathBuf::from("papers/attention.mp3")
    );
    assert_eq!(
        Controller::transcript_path(Path::new("out/attention.mp3")),
        PathBuf::from("out/attention.txt")
    );
}

#[test]
fn test_format_duration_shouldPickLargestUnit() {
    assert_eq!(Controller::format_duration(Duration::from_millis(2500)), "2.500s");
    assert_eq!(Controller::format_duration(Duration::from_secs(125)), "2m 5s");
    assert_eq!(Controller::format_duration(Duration::from_secs(3725)), "1h 2m 5s");
}

#[tokio::test]
async fn test_run_with_pipeline_shouldWriteAudioAndTranscript() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let document = common::create_test_file(temp_dir.path(), "paper.md", &common::sample_text(500))?;
    let pipeline = common::mock_pipeline(MockProvider::working(), RecordingSynthesizer::with_audio(b"mp3"), 12000);
    let controller = Controller::new_for_test()?;

    let output = controller.run_with_pipeline(&pipeline, document, None, PodcastDuration::Short).await?;

    assert_eq!(output.audio_path, temp_dir.path().join("paper.mp3"));
    assert_eq!(std::fs::read(&output.audio_path)?, b"mp3");
    let transcript = std::fs::read_to_string(temp_dir.path().join("paper.txt"))?;
    assert_eq!(transcript, output.transcript);
    assert!(transcript.starts_with("[SUMMARY] The quick brown fox"));
    Ok(())
}

#[tokio::test]
async fn test_run_with_pipeline_withMissingInput_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let pipeline = common::mock_pipeline(MockProvider::working(), RecordingSynthesizer::new(), 12000);
    let controller = Controller::new_for_test()?;

    let result = controller
        .run_with_pipeline(&pipeline, temp_dir.path().join("missing.pdf"), None, PodcastDuration::Short)
        .await;

    assert!(result.is_err());
    Ok(())
}

#[tokio::test]
async fn test_run_with_pipeline_withTextDocument_shouldNotOverwriteIt() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let source = common::sample_text(300);
    let document = common::create_test_file(temp_dir.path(), "notes.txt", &source)?;
    let pipeline = common::mock_pipeline(MockProvider::working(), RecordingSynthesizer::new(), 12000);
    let controller = Controller::new_for_test()?;

    let output = controller.run_with_pipeline(&pipeline, document.clone(), None, PodcastDuration::Medium).await?;

    assert_eq!(std::fs::read_to_string(&document)?, source);
    let transcript = std::fs::read_to_string(temp_dir.path().join("notes.transcript.txt"))?;
    assert_eq!(transcript, output.transcript);
    Ok(())
}
