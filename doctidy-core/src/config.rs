use crate::dates::{Culture, ReplacementTable};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

// Default value functions for serde
fn default_logs_file() -> PathBuf {
    PathBuf::from("logs.json")
}

fn default_input_folder() -> PathBuf {
    PathBuf::from("./inbox")
}

fn default_transcriptions_folder() -> Option<PathBuf> {
    Some(PathBuf::from("./transcriptions"))
}

fn default_archives_folder() -> PathBuf {
    PathBuf::from("./archives")
}

fn default_rules_folder() -> PathBuf {
    PathBuf::from("./rules")
}

fn default_culture_info() -> String {
    "en-US".to_string()
}

/// Process-wide settings, loaded once at startup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// JSON audit log, rewritten after every disposition decision
    #[serde(default = "default_logs_file")]
    pub logs_file: PathBuf,
    /// Folder scanned when no explicit file is given
    #[serde(default = "default_input_folder")]
    pub pdf_input_folder: PathBuf,
    /// Where `<file name>.txt` transcripts go; `null` disables them
    #[serde(default = "default_transcriptions_folder")]
    pub transcriptions_folder: Option<PathBuf>,
    /// Archive copies taken before every move or copy
    #[serde(default = "default_archives_folder")]
    pub archives_folder: PathBuf,
    /// Folder holding the rule files
    #[serde(default = "default_rules_folder")]
    pub rules_folder: PathBuf,
    /// Culture for rules that do not name one
    #[serde(default = "default_culture_info")]
    pub default_culture_info: String,
    /// Applied in declaration order to every date candidate
    #[serde(default)]
    pub date_replacement_patterns: ReplacementPatterns,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            logs_file: default_logs_file(),
            pdf_input_folder: default_input_folder(),
            transcriptions_folder: default_transcriptions_folder(),
            archives_folder: default_archives_folder(),
            rules_folder: default_rules_folder(),
            default_culture_info: default_culture_info(),
            date_replacement_patterns: ReplacementPatterns::default(),
        }
    }
}

impl Settings {
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }

    /// Load settings with fallback to defaults
    pub fn load_with_fallback(path: Option<&Path>) -> Self {
        match path {
            Some(p) => Self::load_from_file(p).unwrap_or_else(|e| {
                eprintln!("⚠️  Failed to load settings from {}, using defaults", p.display());
                warn!("{e}");
                Self::default()
            }),
            None => Self::default(),
        }
    }

    pub fn replacement_table(&self) -> Result<ReplacementTable, ConfigError> {
        ReplacementTable::compile(&self.date_replacement_patterns.0)
    }

    /// The configured default culture, or the invariant one if it is unknown
    pub fn default_culture(&self) -> Culture {
        Culture::from_id(&self.default_culture_info).unwrap_or_else(|| {
            eprintln!(
                "⚠️  Unknown default culture '{}', reading dates with English month names",
                self.default_culture_info
            );
            Culture::invariant()
        })
    }
}

/// Regex -> replacement pairs in declaration order.
///
/// Written as a YAML mapping; the mapping order is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "serde_yaml::Mapping", into = "serde_yaml::Mapping")]
pub struct ReplacementPatterns(pub Vec<(String, String)>);

impl TryFrom<serde_yaml::Mapping> for ReplacementPatterns {
    type Error = String;

    fn try_from(mapping: serde_yaml::Mapping) -> Result<Self, Self::Error> {
        mapping
            .into_iter()
            .map(|(key, value)| match (key.as_str(), value.as_str()) {
                (Some(k), Some(v)) => Ok((k.to_string(), v.to_string())),
                (Some(k), None) if value.is_null() => Ok((k.to_string(), String::new())),
                _ => Err(format!(
                    "date replacement patterns must map strings to strings, got {key:?}: {value:?}"
                )),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(ReplacementPatterns)
    }
}

impl From<ReplacementPatterns> for serde_yaml::Mapping {
    fn from(patterns: ReplacementPatterns) -> Self {
        patterns
            .0
            .into_iter()
            .map(|(k, v)| (serde_yaml::Value::String(k), serde_yaml::Value::String(v)))
            .collect()
    }
}
