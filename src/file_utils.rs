use anyhow::{Context, Result};
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

// @module: File and directory utilities

/// Leading bytes of every PDF file
const PDF_MAGIC: &[u8] = b"%PDF-";

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> std::io::Result<()> {
        let path = path.as_ref();
        if !path.as_os_str().is_empty() && !path.exists() {
            fs::create_dir_all(path)?;
        }
        Ok(())
    }

    // @generates: Sibling path of the input with another extension
    // @params: input_file, output_dir, extension
    pub fn generate_output_path<P1: AsRef<Path>, P2: AsRef<Path>>(
        input_file: P1,
        output_dir: P2,
        extension: &str,
    ) -> PathBuf {
        let stem = input_file.as_ref().file_stem().unwrap_or_default();

        let mut output_filename = stem.to_string_lossy().to_string();
        output_filename.push('.');
        output_filename.push_str(extension.trim_start_matches('.'));

        output_dir.as_ref().join(output_filename)
    }

    /// Write a string to a file
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Replace `path` with `content` in one step
    ///
    /// The bytes go to a temporary file in the same directory which is then renamed
    /// over the target, so readers see either the old file or the complete new one.
    pub fn write_bytes_atomic<P: AsRef<Path>>(path: P, content: &[u8]) -> std::io::Result<()> {
        let path = path.as_ref();
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        Self::ensure_dir(&parent)?;

        let mut temp = tempfile::NamedTempFile::new_in(&parent)?;
        temp.write_all(content)?;
        temp.flush()?;
        temp.persist(path).map_err(|e| e.error)?;

        Ok(())
    }

    /// Detect the kind of document at `path` from its extension, then its leading bytes
    pub fn detect_document_type<P: AsRef<Path>>(path: P) -> Result<DocumentType> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(anyhow::anyhow!("File does not exist: {:?}", path));
        }

        if let Some(ext) = path.extension() {
            match ext.to_string_lossy().to_lowercase().as_str() {
                "pdf" => return Ok(DocumentType::Pdf),
                "txt" | "md" | "markdown" | "text" => return Ok(DocumentType::PlainText),
                _ => {}
            }
        }

        let mut header = [0u8; 5];
        let mut file = fs::File::open(path)
            .with_context(|| format!("Failed to open file: {:?}", path))?;
        let read = file.read(&mut header)?;
        if read == PDF_MAGIC.len() && header == PDF_MAGIC {
            return Ok(DocumentType::Pdf);
        }

        Ok(DocumentType::Unknown)
    }
}

/// Enum representing the document kinds the extractor understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentType {
    /// Portable Document Format
    Pdf,
    /// UTF-8 text or markdown
    PlainText,
    /// Anything else
    Unknown,
}
