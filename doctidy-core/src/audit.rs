use crate::error::AuditLogError;
use crate::types::LogEntry;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Append-only record of disposition decisions
pub trait AuditLog {
    fn entries(&self) -> &[LogEntry];

    /// Add an entry and persist the whole log before returning
    fn append(&mut self, entry: LogEntry) -> Result<(), AuditLogError>;
}

/// On-disk shape: `{ "logs": [ ... ] }`
#[derive(Debug, Default, Serialize, Deserialize)]
struct LogDocument {
    #[serde(default)]
    logs: Vec<LogEntry>,
}

/// JSON log file, read fully at startup and rewritten fully on every append
pub struct JsonAuditLog {
    path: PathBuf,
    entries: Vec<LogEntry>,
}

impl JsonAuditLog {
    /// Open the log at `path`; a missing file is an empty log
    pub fn open(path: &Path) -> Result<Self, AuditLogError> {
        let entries = if path.exists() {
            let json_str = fs::read_to_string(path).map_err(|source| AuditLogError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            if json_str.trim().is_empty() {
                Vec::new()
            } else {
                let document: LogDocument =
                    serde_json::from_str(&json_str).map_err(|source| AuditLogError::Malformed {
                        path: path.to_path_buf(),
                        source,
                    })?;
                document.logs
            }
        } else {
            Vec::new()
        };

        Ok(Self {
            path: path.to_path_buf(),
            entries,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write to a sibling temp file, then rename it over the log
    fn persist(&self) -> Result<(), AuditLogError> {
        let io_error = |source: std::io::Error| AuditLogError::Io {
            path: self.path.clone(),
            source,
        };

        let document = LogDocument {
            logs: self.entries.clone(),
        };
        let json_str = serde_json::to_string_pretty(&document).map_err(|source| {
            AuditLogError::Malformed {
                path: self.path.clone(),
                source,
            }
        })?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).map_err(io_error)?;

        let mut temp = NamedTempFile::new_in(&dir).map_err(io_error)?;
        temp.write_all(json_str.as_bytes()).map_err(io_error)?;
        temp.as_file().sync_all().map_err(io_error)?;
        temp.persist(&self.path).map_err(|e| io_error(e.error))?;
        Ok(())
    }
}

impl AuditLog for JsonAuditLog {
    fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    fn append(&mut self, entry: LogEntry) -> Result<(), AuditLogError> {
        self.entries.push(entry);
        if let Err(e) = self.persist() {
            self.entries.pop();
            return Err(e);
        }
        Ok(())
    }
}

/// In-memory log that never touches the disk
#[derive(Debug, Default)]
pub struct MemoryAuditLog {
    entries: Vec<LogEntry>,
}

impl MemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AuditLog for MemoryAuditLog {
    fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    fn append(&mut self, entry: LogEntry) -> Result<(), AuditLogError> {
        self.entries.push(entry);
        Ok(())
    }
}
