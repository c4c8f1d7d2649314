use super::traits::{has_extension, TextExtractor};
use crate::error::ExtractionError;
use std::fs;
use std::panic;
use std::path::Path;
use tracing::debug;

/// PDF text extractor using the pdf-extract crate.
/// Only reads embedded text layers; scans must have been OCR'd by the scanner.
#[derive(Debug, Default)]
pub struct PdfTextExtractor;

impl PdfTextExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl TextExtractor for PdfTextExtractor {
    fn extract_text(&self, path: &Path) -> Result<String, ExtractionError> {
        let pdf_bytes = fs::read(path).map_err(|source| ExtractionError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        // pdf-extract panics on some malformed files instead of erroring
        let pages = panic::catch_unwind(|| pdf_extract::extract_text_from_mem_by_pages(&pdf_bytes))
            .map_err(|_| ExtractionError::Pdf {
                path: path.to_path_buf(),
                reason: "PDF parser panicked".to_string(),
            })?
            .map_err(|e| ExtractionError::Pdf {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        debug!("{} page(s) extracted from {}", pages.len(), path.display());

        let mut document = String::new();
        for page in pages {
            document.push_str(&page);
            document.push('\n');
        }
        Ok(document)
    }

    fn name(&self) -> &str {
        "PdfTextExtractor"
    }

    fn supports_file_type(&self, path: &Path) -> bool {
        has_extension(path, "pdf")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corrupt_pdf_is_an_extraction_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        fs::write(&path, b"%PDF-1.4 truncated garbage").unwrap();

        let err = PdfTextExtractor::new().extract_text(&path).unwrap_err();
        assert!(matches!(err, ExtractionError::Pdf { .. }));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = PdfTextExtractor::new()
            .extract_text(Path::new("/nonexistent/scan.pdf"))
            .unwrap_err();
        assert!(matches!(err, ExtractionError::Io { .. }));
    }
}
