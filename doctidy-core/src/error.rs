//! Typed failures surfaced by the library.
//!
//! Orchestration code (pipeline, executor) works in `anyhow::Result` and only
//! these load-time and collaborator failures get their own types.

use std::path::PathBuf;
use thiserror::Error;

/// Settings could not be read or are invalid
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read settings file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse settings file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid date replacement pattern '{pattern}': {source}")]
    InvalidReplacementPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Fatal problems while building the rule set
#[derive(Error, Debug)]
pub enum RuleLoadError {
    #[error("Failed to read rules folder '{path}': {source}")]
    ReadFolder {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read rule file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse rule file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Rule names have to be unique across all rule files. Can't add '{name}' from '{path}'")]
    DuplicateName { name: String, path: PathBuf },

    #[error("Rule '{name}' in '{path}' is invalid: {reason}")]
    InvalidRule {
        name: String,
        path: PathBuf,
        reason: String,
    },
}

/// The audit log could not be read or persisted
#[derive(Error, Debug)]
pub enum AuditLogError {
    #[error("Failed to access audit log '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Audit log '{path}' is not a valid log document: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Text could not be extracted from a source document
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("Could not open file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not read PDF file '{path}': {reason}")]
    Pdf { path: PathBuf, reason: String },

    #[error("No extractor supports '{0}'")]
    Unsupported(PathBuf),
}
