//! Text extraction
//!
//! Turns a source document into the plain text the rules are matched
//! against. Extraction is the only format-specific step; everything after it
//! works on a `String`.
//!
//! ## Available extractors
//!
//! - `PdfTextExtractor` - PDF documents with a text layer, via pdf-extract
//! - `PlainTextExtractor` - `.txt` files, handy when writing rules
//! - `CompositeExtractor` - first extractor that supports the file wins

pub mod pdf;
pub mod plain;
pub mod traits;

pub use pdf::PdfTextExtractor;
pub use plain::PlainTextExtractor;
pub use traits::{CompositeExtractor, TextExtractor};
