/*!
 * Common test utilities for the pdfcast test suite
 */

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

use pdfcast::extraction::DocumentExtractor;
use pdfcast::pipeline::PodcastPipeline;
use pdfcast::providers::mock::MockProvider;
use pdfcast::speech::SpeechService;
use pdfcast::summary::BatchSummarizer;

// Re-export the mock providers module
pub mod mock_providers;

use self::mock_providers::RecordingSynthesizer;

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Deterministic document text of exactly `len` characters
pub fn sample_text(len: usize) -> String {
    "The quick brown fox jumps over the lazy dog. "
        .chars()
        .cycle()
        .take(len)
        .collect()
}

/// Pipeline wired to a summarizer mock and a recording synthesizer
pub fn mock_pipeline(summarizer: MockProvider, synthesizer: RecordingSynthesizer, chunk_size: usize) -> PodcastPipeline {
    PodcastPipeline::new(
        DocumentExtractor::new(),
        BatchSummarizer::new(Arc::new(summarizer)).with_chunk_size(chunk_size),
        SpeechService::new(Arc::new(synthesizer)),
    )
}
