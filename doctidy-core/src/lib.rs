// Doctidy Core Library
//
// Classifies extracted document text against keyword rules, reads the
// document date, and files the source document with an audit trail.
// Main interface is `ClassificationPipeline`.

pub mod audit;
pub mod classifier;
pub mod config;
pub mod dates;
pub mod decisions;
pub mod error;
pub mod executor;
pub mod extractors;
pub mod fs;
pub mod pipeline;
pub mod planner;
pub mod rules;
pub mod types;

// Re-export main types and functions for easy use
pub use types::*;
pub use audit::{AuditLog, JsonAuditLog, MemoryAuditLog};
pub use classifier::{MatchResult, RuleMatcher};
pub use config::Settings;
pub use decisions::{DecisionProvider, ScriptedDecisions};
pub use extractors::{CompositeExtractor, PdfTextExtractor, PlainTextExtractor, TextExtractor};
pub use fs::{FileSystem, StdFileSystem};
pub use pipeline::{ClassificationPipeline, PipelineContext};
pub use rules::{load_rules_folder, RuleSet};
