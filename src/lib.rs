/*!
 * # pdfcast - PDF to podcast generator
 *
 * Turns a document into a narrated audio summary: the text is extracted,
 * condensed into a spoken-style script by a language model, and read aloud by a
 * text-to-speech service.
 *
 * ## Features
 *
 * - Text extraction from PDF (and plain-text) documents
 * - Chunked summarization with selectable podcast length (short, medium, long)
 *   using one of several AI providers:
 *   - Google Gemini
 *   - Ollama (local LLM)
 *   - Anthropic API
 * - Speech synthesis through Google Translate TTS or OpenAI
 * - A small upload page with audio player and transcript
 * - Headless command line generation
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `extraction`: Document text extraction
 * - `summary`: Chunking, prompts and batch summarization
 * - `speech`: Text cleanup and speech synthesis clients
 * - `pipeline`: Extraction, summarization and synthesis run in sequence
 * - `web`: The interactive upload page
 * - `app_controller`: Command line controller
 * - `providers`: Client implementations for the summarization providers:
 *   - `providers::gemini`: Google Gemini API client
 *   - `providers::ollama`: Ollama API client
 *   - `providers::anthropic`: Anthropic API client
 * - `file_utils`: File system operations
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod errors;
pub mod extraction;
pub mod file_utils;
pub mod pipeline;
pub mod providers;
pub mod speech;
pub mod summary;
pub mod web;

// Re-export main types for easier usage
pub use app_config::Config;
pub use extraction::DocumentExtractor;
pub use pipeline::{PodcastOutput, PodcastPipeline};
pub use speech::SpeechService;
pub use summary::{BatchSummarizer, PodcastDuration, SummarizationService};
pub use errors::{AppError, ExtractionError, ProviderError, SummarizationError, SynthesisError};
