// TextExtractor trait
//
// This is the boundary between document formats and classification. An
// extractor returns the text of every page, newline-joined.

use crate::error::ExtractionError;
use std::path::Path;

pub trait TextExtractor {
    /// Full document text, pages joined with newlines
    fn extract_text(&self, path: &Path) -> Result<String, ExtractionError>;

    /// Extractor name for logging
    fn name(&self) -> &str;

    /// Check if the extractor supports the given file type
    fn supports_file_type(&self, path: &Path) -> bool;
}

/// Tries each extractor in order and uses the first that supports the file
pub struct CompositeExtractor {
    extractors: Vec<Box<dyn TextExtractor>>,
}

impl CompositeExtractor {
    pub fn new(extractors: Vec<Box<dyn TextExtractor>>) -> Self {
        Self { extractors }
    }

    fn extractor_for(&self, path: &Path) -> Option<&dyn TextExtractor> {
        self.extractors
            .iter()
            .find(|e| e.supports_file_type(path))
            .map(|e| e.as_ref())
    }
}

impl TextExtractor for CompositeExtractor {
    fn extract_text(&self, path: &Path) -> Result<String, ExtractionError> {
        match self.extractor_for(path) {
            Some(extractor) => extractor.extract_text(path),
            None => Err(ExtractionError::Unsupported(path.to_path_buf())),
        }
    }

    fn name(&self) -> &str {
        "CompositeExtractor"
    }

    fn supports_file_type(&self, path: &Path) -> bool {
        self.extractor_for(path).is_some()
    }
}

/// Case-insensitive extension check shared by the extractors
pub(crate) fn has_extension(path: &Path, wanted: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case(wanted))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::{PdfTextExtractor, PlainTextExtractor};

    #[test]
    fn test_composite_dispatches_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let note = dir.path().join("note.TXT");
        std::fs::write(&note, "Invoice 12").unwrap();

        let extractors: Vec<Box<dyn TextExtractor>> = vec![
            Box::new(PdfTextExtractor::new()),
            Box::new(PlainTextExtractor::new()),
        ];
        let extractor = CompositeExtractor::new(extractors);
        assert!(extractor.supports_file_type(Path::new("scan.pdf")));
        assert!(!extractor.supports_file_type(Path::new("photo.jpg")));
        assert_eq!(extractor.extract_text(&note).unwrap(), "Invoice 12");
        assert!(matches!(
            extractor.extract_text(Path::new("photo.jpg")),
            Err(ExtractionError::Unsupported(_))
        ));
    }
}
