//! PDF text extraction seam
//!
//! The sorter only needs one operation from a PDF library: file path in,
//! plain text out. The trait keeps the crate behind a narrow contract so
//! tests can inject fixed text instead of parsing real PDFs. An empty or
//! whitespace-only result is a valid outcome (image-only scans), not an
//! error; the caller decides what to do with it.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from PDF text extraction
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The PDF could not be opened or parsed
    #[error("Failed to extract text from {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: pdf_extract::OutputError,
    },
}

/// File -> plain text
pub trait TextExtractor: Send + Sync {
    /// Extract the text content of the document at `path`
    ///
    /// May return an empty string for documents without a text layer.
    fn extract(&self, path: &Path) -> Result<String, ExtractError>;
}

/// Production extractor backed by the `pdf-extract` crate
pub struct PdfExtractor;

impl TextExtractor for PdfExtractor {
    fn extract(&self, path: &Path) -> Result<String, ExtractError> {
        let text = pdf_extract::extract_text(path).map_err(|source| ExtractError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(text.trim().to_string())
    }
}
