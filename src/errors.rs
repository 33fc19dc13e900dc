/*!
 * Error types for the pdfcast application.
 *
 * This module contains custom error types for each pipeline stage,
 * using the thiserror crate for ergonomic error definitions.
 */

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),
}

impl ProviderError {
    /// Map a non-success HTTP status and body to the matching variant
    pub fn from_status(status_code: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status_code {
            401 | 403 => Self::AuthenticationError(message),
            429 => Self::RateLimitExceeded(message),
            _ => Self::ApiError { status_code, message },
        }
    }

    /// Whether a retry of the same request may succeed
    pub fn is_transient(&self) -> bool {
        match self {
            Self::RequestFailed(_) | Self::ConnectionError(_) | Self::RateLimitExceeded(_) => true,
            Self::ApiError { status_code, .. } => *status_code >= 500,
            Self::ParseError(_) | Self::AuthenticationError(_) => false,
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_connect() || error.is_timeout() {
            Self::ConnectionError(error.to_string())
        } else if error.is_decode() {
            Self::ParseError(error.to_string())
        } else {
            Self::RequestFailed(error.to_string())
        }
    }
}

/// Errors that can occur while pulling text out of a document
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// The document does not exist
    #[error("Document not found: {0:?}")]
    NotFound(PathBuf),

    /// The document type is not one we can read
    #[error("Unsupported document format: {0:?}")]
    UnsupportedFormat(PathBuf),

    /// The document could not be opened
    #[error("Failed to read document {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document was opened but could not be parsed
    #[error("Failed to parse document {path:?}: {message}")]
    Parse {
        path: PathBuf,
        message: String,
    },
}

/// Errors that can occur during summarization
#[derive(Error, Debug)]
pub enum SummarizationError {
    /// A single chunk could not be summarized; the run is aborted
    #[error("Summarization of chunk {} of {total} failed: {source}", .index + 1)]
    Chunk {
        /// Zero-based chunk index
        index: usize,
        /// Total number of chunks in the run
        total: usize,
        #[source]
        source: ProviderError,
    },

    /// Invalid summarization settings
    #[error("Invalid summarization settings: {0}")]
    InvalidSettings(String),
}

/// Errors that can occur during speech synthesis
#[derive(Error, Debug)]
pub enum SynthesisError {
    /// Nothing left to speak after cleanup
    #[error("No text to speak")]
    EmptyInput,

    /// Error from the speech provider
    #[error("Speech provider error: {0}")]
    Provider(#[from] ProviderError),

    /// The provider returned no audio
    #[error("Speech provider returned no audio")]
    EmptyAudio,

    /// The audio could not be written to disk
    #[error("Failed to write audio to {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors found while loading or validating configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A provider needs a credential that is not set
    #[error("API key is required for the {0} provider")]
    MissingApiKey(String),

    /// A value is out of range or malformed
    #[error("Invalid configuration value for {field}: {message}")]
    InvalidValue {
        field: String,
        message: String,
    },

    /// Unknown provider or option name
    #[error("Unknown {kind}: {value}")]
    Unknown {
        kind: &'static str,
        value: String,
    },
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from text extraction
    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Error from summarization
    #[error("Summarization error: {0}")]
    Summarization(#[from] SummarizationError),

    /// Error from speech synthesis
    #[error("Synthesis error: {0}")]
    Synthesis(#[from] SynthesisError),
}
