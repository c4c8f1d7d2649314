use crate::dates::DateResolution;
use crate::fs::FileSystem;
use crate::types::{DispositionPlan, Rule};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Placeholder replaced by the document date in filename patterns
pub const DATE_PLACEHOLDER: &str = "{date}";

/// Computes where a classified document goes
pub struct DispositionPlanner<'a> {
    archives_folder: &'a Path,
    fs: &'a dyn FileSystem,
}

impl<'a> DispositionPlanner<'a> {
    pub fn new(archives_folder: &'a Path, fs: &'a dyn FileSystem) -> Self {
        Self { archives_folder, fs }
    }

    pub fn plan(
        &self,
        source: &Path,
        rule: &Rule,
        found_keywords: &[String],
        resolution: &DateResolution,
    ) -> DispositionPlan {
        let extension = source
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();
        let filename =
            destination_file_name(&rule.filename_pattern, resolution.resolved, &extension);
        let destination = rule.destination_path.join(&filename);

        let source_name = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let archive = archive_path(self.archives_folder, Uuid::new_v4(), &source_name, &filename);

        DispositionPlan {
            source: source.to_path_buf(),
            rule_name: rule.name.clone(),
            collision: self.fs.exists(&destination),
            destination,
            archive,
            document_date: resolution.resolved,
            dates: resolution.dates.clone(),
            found_keywords: found_keywords.to_vec(),
        }
    }
}

/// `{date}` becomes `yyyyMMdd`; the source extension (with its dot) is appended
pub fn destination_file_name(pattern: &str, date: NaiveDate, extension: &str) -> String {
    let stamp = date.format("%Y%m%d").to_string();
    format!("{}{}", pattern.replace(DATE_PLACEHOLDER, &stamp), extension)
}

/// `<archives>/<token>_<source name>_<destination name>`
pub fn archive_path(archives_folder: &Path, token: Uuid, source_name: &str, filename: &str) -> PathBuf {
    archives_folder.join(format!("{token}_{source_name}_{filename}"))
}
