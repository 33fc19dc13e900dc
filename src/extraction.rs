/*!
 * Text extraction from uploaded documents.
 *
 * PDF files are parsed with `pdf-extract`, which walks the pages in order and
 * concatenates their text. Plain-text documents are read as they are.
 */

use log::{debug, warn};
use std::path::{Path, PathBuf};

use crate::errors::ExtractionError;
use crate::file_utils::{DocumentType, FileManager};

/// Pulls the full text out of a document
#[derive(Debug, Clone, Default)]
pub struct DocumentExtractor;

impl DocumentExtractor {
    /// Create a new extractor
    pub fn new() -> Self {
        Self
    }

    /// Return the complete extractable text of the document at `path`
    ///
    /// Either the whole text is returned or an error; partial text never is.
    pub async fn extract_text(&self, path: &Path) -> Result<String, ExtractionError> {
        if !path.exists() {
            return Err(ExtractionError::NotFound(path.to_path_buf()));
        }

        let document_type = FileManager::detect_document_type(path)
            .map_err(|e| ExtractionError::Parse { path: path.to_path_buf(), message: e.to_string() })?;

        let text = match document_type {
            DocumentType::Pdf => Self::extract_pdf(path.to_path_buf()).await?,
            DocumentType::PlainText => tokio::fs::read_to_string(path).await
                .map_err(|source| ExtractionError::Io { path: path.to_path_buf(), source })?,
            DocumentType::Unknown => return Err(ExtractionError::UnsupportedFormat(path.to_path_buf())),
        };

        if text.trim().is_empty() {
            warn!("No extractable text found in {:?}", path);
        }
        debug!("Extracted {} characters from {:?}", text.chars().count(), path);

        Ok(text)
    }

    /// Parse a PDF on a blocking thread; a parser panic becomes a parse error
    async fn extract_pdf(path: PathBuf) -> Result<String, ExtractionError> {
        let bytes = tokio::fs::read(&path).await
            .map_err(|source| ExtractionError::Io { path: path.clone(), source })?;

        let parse_path = path.clone();
        let joined = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes)).await;

        match joined {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(e)) => Err(ExtractionError::Parse { path: parse_path, message: e.to_string() }),
            Err(join_error) => Err(ExtractionError::Parse {
                path,
                message: format!("PDF parser aborted: {}", join_error),
            }),
        }
    }
}
