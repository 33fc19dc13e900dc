/*!
 * Document-to-podcast pipeline.
 *
 * Runs extraction, summarization and synthesis strictly one after another. The
 * pipeline knows nothing about the page or the CLI driving it; callers observe
 * progress through a `ProgressReporter`.
 */

use log::{debug, info};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::app_config::Config;
use crate::errors::AppError;
use crate::extraction::DocumentExtractor;
use crate::speech::SpeechService;
use crate::summary::{BatchSummarizer, PodcastDuration, SummarizationService};

/// Stage boundaries reported while a run progresses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Extraction,
    Summarization,
    Synthesis,
}

impl PipelineStage {
    /// Message shown while the stage is running
    pub fn activity(&self) -> &'static str {
        match self {
            Self::Extraction => "Extracting text from document...",
            Self::Summarization => "Summarizing text...",
            Self::Synthesis => "Generating audio...",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Extraction => write!(f, "extraction"),
            Self::Summarization => write!(f, "summarization"),
            Self::Synthesis => write!(f, "synthesis"),
        }
    }
}

/// Observer for stage boundaries and chunk progress
pub trait ProgressReporter: Send + Sync {
    fn stage_started(&self, _stage: PipelineStage) {}

    fn stage_finished(&self, _stage: PipelineStage, _elapsed: Duration) {}

    /// Called after each summarized chunk with `(completed, total)`
    fn chunk_finished(&self, _completed: usize, _total: usize) {}
}

/// Reports progress through the `log` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgress;

impl ProgressReporter for LogProgress {
    fn stage_started(&self, stage: PipelineStage) {
        info!("{}", stage.activity());
    }

    fn stage_finished(&self, stage: PipelineStage, elapsed: Duration) {
        info!("Finished {} in {:?}", stage, elapsed);
    }

    fn chunk_finished(&self, completed: usize, total: usize) {
        debug!("Summarized chunk {}/{}", completed, total);
    }
}

/// Result of one successful run
#[derive(Debug, Clone, PartialEq)]
pub struct PodcastOutput {
    /// Where the audio was written
    pub audio_path: PathBuf,
    /// The spoken script, also shown as the transcript
    pub transcript: String,
    /// Number of chunks the document was split into
    pub chunk_count: usize,
}

/// The extraction, summarization and synthesis stages wired together
pub struct PodcastPipeline {
    extractor: DocumentExtractor,
    summarizer: BatchSummarizer,
    speech: SpeechService,
}

impl PodcastPipeline {
    /// Assemble a pipeline from its stages
    pub fn new(extractor: DocumentExtractor, summarizer: BatchSummarizer, speech: SpeechService) -> Self {
        Self { extractor, summarizer, speech }
    }

    /// Build the pipeline for the configured providers
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let service = SummarizationService::new(config.summarization.clone())?;
        let summarizer = BatchSummarizer::new(Arc::new(service))
            .with_chunk_size(config.summarization.get_max_chars_per_request())
            .with_concurrency(config.summarization.optimal_concurrent_requests());

        Ok(Self::new(
            DocumentExtractor::new(),
            summarizer,
            SpeechService::from_config(&config.speech),
        ))
    }

    /// Name of the speech engine in use
    pub fn speech_engine(&self) -> &str {
        self.speech.name()
    }

    /// Turn `document` into a narrated summary written to `output`
    ///
    /// Any stage failure aborts the stages after it.
    pub async fn generate(
        &self,
        document: &Path,
        output: &Path,
        duration: PodcastDuration,
        progress: &dyn ProgressReporter,
    ) -> Result<PodcastOutput, AppError> {
        let run_start = Instant::now();

        progress.stage_started(PipelineStage::Extraction);
        let stage_start = Instant::now();
        let text = self.extractor.extract_text(document).await?;
        progress.stage_finished(PipelineStage::Extraction, stage_start.elapsed());

        progress.stage_started(PipelineStage::Summarization);
        let stage_start = Instant::now();
        let summary = self.summarizer
            .summarize(&text, duration, |completed, total| progress.chunk_finished(completed, total))
            .await?;
        progress.stage_finished(PipelineStage::Summarization, stage_start.elapsed());

        progress.stage_started(PipelineStage::Synthesis);
        let stage_start = Instant::now();
        let audio_path = self.speech.synthesize_to_file(&summary.combined, output).await?;
        progress.stage_finished(PipelineStage::Synthesis, stage_start.elapsed());

        info!(
            "Podcast ready: {} chunk(s), {} words, {:?} total",
            summary.chunk_count(),
            summary.combined.split_whitespace().count(),
            run_start.elapsed()
        );

        let chunk_count = summary.chunk_count();
        Ok(PodcastOutput {
            audio_path,
            transcript: summary.combined,
            chunk_count,
        })
    }
}
