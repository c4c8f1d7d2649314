use super::traits::{has_extension, TextExtractor};
use crate::error::ExtractionError;
use std::fs;
use std::path::Path;

/// Reads `.txt` files as-is
#[derive(Debug, Default)]
pub struct PlainTextExtractor;

impl PlainTextExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl TextExtractor for PlainTextExtractor {
    fn extract_text(&self, path: &Path) -> Result<String, ExtractionError> {
        fs::read_to_string(path).map_err(|source| ExtractionError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    fn name(&self) -> &str {
        "PlainTextExtractor"
    }

    fn supports_file_type(&self, path: &Path) -> bool {
        has_extension(path, "txt")
    }
}
