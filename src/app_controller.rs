use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::app_config::Config;
use crate::file_utils::FileManager;
use crate::pipeline::{PipelineStage, PodcastOutput, PodcastPipeline, ProgressReporter};
use crate::summary::PodcastDuration;

// @module: Application controller for headless podcast generation

/// Spinner shown on the terminal while a run is in progress
struct SpinnerProgress {
    progress_bar: ProgressBar,
}

impl SpinnerProgress {
    fn new() -> Self {
        let progress_bar = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        progress_bar.set_style(style);
        progress_bar.enable_steady_tick(Duration::from_millis(120));
        Self { progress_bar }
    }

    fn finish(&self) {
        self.progress_bar.finish_and_clear();
    }
}

impl ProgressReporter for SpinnerProgress {
    fn stage_started(&self, stage: PipelineStage) {
        self.progress_bar.set_message(stage.activity());
    }

    fn stage_finished(&self, stage: PipelineStage, elapsed: Duration) {
        self.progress_bar.println(format!("Finished {} in {}", stage, Controller::format_duration(elapsed)));
    }

    fn chunk_finished(&self, completed: usize, total: usize) {
        self.progress_bar.set_message(format!("Summarizing text... {}/{} chunks", completed, total));
    }
}

/// Main application controller for the command line
pub struct Controller {
    // @field: App configuration
    config: Config,
}

impl Controller {
    /// Create a new controller for test purposes with default configuration
    pub fn new_for_test() -> Result<Self> {
        Self::with_config(Config::default())
    }

    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        Ok(Self { config })
    }

    /// Configuration in use
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Audio path used when none is given: the input's stem with an `.mp3` extension
    pub fn default_audio_path(input_file: &Path) -> PathBuf {
        let output_dir = input_file.parent().unwrap_or(Path::new("."));
        FileManager::generate_output_path(input_file, output_dir, "mp3")
    }

    /// Transcript path written next to the audio
    pub fn transcript_path(audio_path: &Path) -> PathBuf {
        audio_path.with_extension("txt")
    }

    /// Generate a podcast for `input_file` with a terminal spinner
    pub async fn run(&self, input_file: PathBuf, output: Option<PathBuf>, duration: PodcastDuration) -> Result<PodcastOutput> {
        let pipeline = PodcastPipeline::from_config(&self.config)
            .context("Failed to initialize the podcast pipeline")?;
        self.run_with_pipeline(&pipeline, input_file, output, duration).await
    }

    /// Run the workflow with an already assembled pipeline
    pub async fn run_with_pipeline(
        &self,
        pipeline: &PodcastPipeline,
        input_file: PathBuf,
        output: Option<PathBuf>,
        duration: PodcastDuration,
    ) -> Result<PodcastOutput> {
        let start_time = std::time::Instant::now();

        if !input_file.exists() {
            return Err(anyhow::anyhow!("Input file does not exist: {:?}", input_file));
        }

        let audio_path = output.unwrap_or_else(|| Self::default_audio_path(&input_file));
        if audio_path.exists() {
            warn!("Overwriting existing audio file: {:?}", audio_path);
        }

        info!("pdfcast: {} - {} / {}",
            self.config.summarization.provider.display_name(),
            self.config.summarization.get_model(),
            pipeline.speech_engine());
        info!("Podcast length: {}", duration.label());

        let spinner = SpinnerProgress::new();
        let result = pipeline.generate(&input_file, &audio_path, duration, &spinner).await;
        spinner.finish();
        let output = result?;

        let mut transcript_path = Self::transcript_path(&output.audio_path);
        if transcript_path == input_file {
            // Never overwrite a plain-text source document
            transcript_path = output.audio_path.with_extension("transcript.txt");
        }
        FileManager::write_to_file(&transcript_path, &output.transcript)?;

        info!("Success: {}", output.audio_path.display());
        info!("Transcript: {}", transcript_path.display());
        info!("Podcast generated in {}.", Self::format_duration(start_time.elapsed()));

        Ok(output)
    }

    // Format duration in a human-readable format (HH:MM:SS)
    pub fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
