// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};

use pdfcast::app_config::{self, Config, SpeechProvider, SummaryProvider};
use pdfcast::app_controller::Controller;
use pdfcast::summary::{PodcastDuration, SummarizationService};

/// CLI Wrapper for SummaryProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliSummaryProvider {
    Gemini,
    Ollama,
    Anthropic,
}

impl From<CliSummaryProvider> for SummaryProvider {
    fn from(cli_provider: CliSummaryProvider) -> Self {
        match cli_provider {
            CliSummaryProvider::Gemini => SummaryProvider::Gemini,
            CliSummaryProvider::Ollama => SummaryProvider::Ollama,
            CliSummaryProvider::Anthropic => SummaryProvider::Anthropic,
        }
    }
}

/// CLI Wrapper for SpeechProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliSpeechProvider {
    GoogleTranslate,
    #[value(name = "openai")]
    OpenAI,
}

impl From<CliSpeechProvider> for SpeechProvider {
    fn from(cli_provider: CliSpeechProvider) -> Self {
        match cli_provider {
            CliSpeechProvider::GoogleTranslate => SpeechProvider::GoogleTranslate,
            CliSpeechProvider::OpenAI => SpeechProvider::OpenAI,
        }
    }
}

/// CLI Wrapper for PodcastDuration to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliDuration {
    Short,
    Medium,
    Long,
}

impl From<CliDuration> for PodcastDuration {
    fn from(cli_duration: CliDuration) -> Self {
        match cli_duration {
            CliDuration::Short => PodcastDuration::Short,
            CliDuration::Medium => PodcastDuration::Medium,
            CliDuration::Long => PodcastDuration::Long,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

/// Options shared by every command that runs the pipeline
#[derive(clap::Args, Debug, Clone)]
struct CommonArgs {
    /// Summarization provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliSummaryProvider>,

    /// Model name to use for summarization
    #[arg(short, long)]
    model: Option<String>,

    /// Speech provider to use
    #[arg(long, value_enum)]
    speech: Option<CliSpeechProvider>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json", env = "PDFCAST_CONFIG")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve the upload page (default command)
    Serve {
        #[command(flatten)]
        common: CommonArgs,

        /// Interface to bind
        #[arg(long)]
        host: Option<String>,

        /// Port to bind
        #[arg(long)]
        port: Option<u16>,
    },

    /// Generate a podcast from a document without the page
    Generate {
        /// PDF (or plain text) document to summarize
        #[arg(value_name = "DOCUMENT")]
        input_file: PathBuf,

        /// Podcast length
        #[arg(short, long, value_enum)]
        duration: Option<CliDuration>,

        /// Audio output path (default: next to the document, .mp3)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// Check that the configured summarization provider answers
    Check {
        #[command(flatten)]
        common: CommonArgs,
    },

    /// Generate shell completions for pdfcast
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// pdfcast - turn research papers into narrated podcasts
///
/// Extracts the text of a PDF, summarizes it into a spoken-style script with an
/// AI provider and reads it aloud with a text-to-speech service.
#[derive(Parser, Debug)]
#[command(name = "pdfcast")]
#[command(version)]
#[command(about = "Turn PDF documents into narrated podcast summaries")]
#[command(long_about = "pdfcast extracts text from a PDF, summarizes it with an AI provider and converts the summary to speech.

EXAMPLES:
    pdfcast                                     # Serve the upload page on http://127.0.0.1:8501
    pdfcast serve --port 9000                   # Serve on another port
    pdfcast generate paper.pdf -d short         # Write paper.mp3 and paper.txt
    pdfcast generate paper.pdf -o out/talk.mp3  # Choose the audio path
    pdfcast generate paper.pdf -p ollama        # Summarize with a local model
    pdfcast check -p anthropic                  # Verify the provider key and endpoint
    pdfcast completions bash > pdfcast.bash     # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. If the file doesn't exist,
    a default one is created. API keys may also be supplied through
    GOOGLE_API_KEY, ANTHROPIC_API_KEY and OPENAI_API_KEY (a .env file is read).")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Prefix and ANSI color for log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("ERROR", "1;31"),
            Level::Warn => ("WARN ", "1;33"),
            Level::Info => ("INFO ", "1;32"),
            Level::Debug => ("DEBUG", "1;36"),
            Level::Trace => ("TRACE", "1;35"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (label, color) = Self::style_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "\x1B[{}m{} {} {}\x1B[0m", color, now, label, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // The logger accepts everything; log::set_max_level filters once the config is loaded
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "pdfcast", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Generate { input_file, duration, output, common }) => {
            let config = load_config(&common)?;
            let duration = duration.map(PodcastDuration::from)
                .unwrap_or(config.summarization.common.default_duration);

            let controller = Controller::with_config(config)?;
            controller.run(input_file, output, duration).await?;
            Ok(())
        }
        Some(Commands::Check { common }) => {
            let config = load_config(&common)?;
            let provider = config.summarization.provider.display_name().to_string();
            let model = config.summarization.get_model();

            info!("Checking connection to {} - {}", provider, model);
            let service = SummarizationService::new(config.summarization)?;
            service.test_connection().await
                .with_context(|| format!("{} did not answer", provider))?;
            info!("{} is reachable", provider);
            Ok(())
        }
        Some(Commands::Serve { common, host, port }) => {
            let mut config = load_config(&common)?;
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            pdfcast::web::serve(config).await
        }
        None => {
            let common = CommonArgs {
                provider: None,
                model: None,
                speech: None,
                config_path: std::env::var("PDFCAST_CONFIG").unwrap_or_else(|_| "conf.json".to_string()),
                log_level: None,
            };
            let config = load_config(&common)?;
            pdfcast::web::serve(config).await
        }
    }
}

/// Load or create the configuration file, then apply environment keys and CLI overrides
fn load_config(options: &CommonArgs) -> Result<Config> {
    if let Some(cmd_log_level) = &options.log_level {
        let level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let config_path = &options.config_path;
    let mut config = if Path::new(config_path).exists() {
        let file = File::open(config_path)
            .context(format!("Failed to open config file: {}", config_path))?;

        let reader = BufReader::new(file);
        serde_json::from_reader::<_, Config>(reader)
            .context(format!("Failed to parse config file: {}", config_path))?
    } else {
        warn!("Config file not found at '{}', creating default config.", config_path);

        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;

        std::fs::write(config_path, config_json)
            .context(format!("Failed to write default config to file: {}", config_path))?;

        config
    };

    if let Some(provider) = &options.provider {
        config.summarization.provider = provider.clone().into();
    }

    if let Some(model) = &options.model {
        config.summarization.active_provider_config_mut().model = model.clone();
    }

    if let Some(speech) = &options.speech {
        config.speech.provider = speech.clone().into();
    }

    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }

    // Keys from the environment only fill gaps; they are never written back to the file
    config.apply_env_credentials();

    config.validate()
        .context("Configuration validation failed")?;

    if options.log_level.is_none() {
        log::set_max_level(config.log_level.to_level_filter());
    }

    info!("Using configuration from {}", config_path);
    Ok(config)
}
