use crate::dates::{Culture, DateFormat};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::path::PathBuf;

// ===== RULES =====

/// A keyword as written in the rule file, compiled once at load time.
#[derive(Debug, Clone)]
pub struct Keyword {
    pub pattern: String,
    pub regex: Regex,
}

impl Keyword {
    pub fn is_found_in(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

/// How a rule locates and reads the document date
#[derive(Debug, Clone)]
pub struct DateSpec {
    /// Locates date substrings in the text (case-insensitive)
    pub pattern: Regex,
    /// Strict format a normalized substring must satisfy
    pub parse_format: DateFormat,
    /// Number of newest distinct dates to skip
    pub skip: usize,
    pub culture: Culture,
}

/// A named classification policy. Immutable once loaded.
#[derive(Debug, Clone)]
pub struct Rule {
    pub name: String,
    pub destination_path: PathBuf,
    /// May contain a `{date}` placeholder
    pub filename_pattern: String,
    /// Never empty
    pub keywords: Vec<Keyword>,
    /// `None` when the rule has no `date_format`; the document date is then today
    pub date: Option<DateSpec>,
}

impl Rule {
    pub fn keyword_patterns(&self) -> impl Iterator<Item = &str> {
        self.keywords.iter().map(|k| k.pattern.as_str())
    }
}

// ===== DISPOSITION =====

/// What the operator decided to do with a classified document.
///
/// Older logs stored the raw key that was pressed; those still load, with
/// anything unrecognised read as a skip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    #[serde(alias = "M", alias = "Enter")]
    Move,
    #[serde(alias = "C")]
    Copy,
    #[serde(other)]
    Skip,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Move => write!(f, "move"),
            Action::Copy => write!(f, "copy"),
            Action::Skip => write!(f, "skip"),
        }
    }
}

/// Operator answer after a failed move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    Retry,
    Ignore,
}

/// Where a document would go, computed before anything touches the disk
#[derive(Debug, Clone, PartialEq)]
pub struct DispositionPlan {
    pub source: PathBuf,
    pub rule_name: String,
    pub destination: PathBuf,
    /// `<archives>/<uuid>_<source file name>_<destination file name>`
    pub archive: PathBuf,
    pub document_date: NaiveDate,
    /// Distinct parsed dates, newest first
    pub dates: Vec<NaiveDate>,
    pub found_keywords: Vec<String>,
    /// Destination already exists
    pub collision: bool,
}

// ===== AUDIT LOG =====

/// One record per disposition decision, written before the filesystem effect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub original: PathBuf,
    pub destination: PathBuf,
    pub archive: PathBuf,
    pub keywords: Vec<String>,
    #[serde(rename = "rulename")]
    pub rule_name: String,
    #[serde(deserialize_with = "deserialize_log_dates")]
    pub dates: Vec<NaiveDate>,
    pub action: Action,
}

impl LogEntry {
    pub fn new(plan: &DispositionPlan, action: Action) -> Self {
        Self {
            timestamp: Local::now(),
            original: plan.source.clone(),
            destination: plan.destination.clone(),
            archive: plan.archive.clone(),
            keywords: plan.found_keywords.clone(),
            rule_name: plan.rule_name.clone(),
            dates: plan.dates.clone(),
            action,
        }
    }
}

/// Accepts plain dates as well as the midnight date-times older logs contain.
fn deserialize_log_dates<'de, D>(deserializer: D) -> Result<Vec<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Vec<String> = Vec::deserialize(deserializer)?;
    raw.iter()
        .map(|value| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .or_else(|_| {
                    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f").map(|dt| dt.date())
                })
                .or_else(|_| DateTime::parse_from_rfc3339(value).map(|dt| dt.date_naive()))
                .map_err(|_| serde::de::Error::custom(format!("invalid log date '{value}'")))
        })
        .collect()
}

// ===== OUTCOMES =====

/// Terminal state reached for one document
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentOutcome {
    /// No rule had all of its keywords in the text
    Unclassified,
    /// Classified and planned, nothing touched
    DryRun,
    Moved,
    Copied,
    Skipped,
    /// Archive copy made, move given up by the operator
    MoveAbandoned,
    /// Destination already existed
    Collision { opened: bool, source_deleted: bool },
    ExtractionFailed(String),
    Failed(String),
}

/// Per-run tally printed at the end of a batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub processed: usize,
    pub unclassified: usize,
    pub dry_run: usize,
    pub moved: usize,
    pub copied: usize,
    pub skipped: usize,
    pub move_abandoned: usize,
    pub collisions: usize,
    pub extraction_failed: usize,
    pub failed: usize,
}

impl BatchReport {
    pub fn record(&mut self, outcome: &DocumentOutcome) {
        self.processed += 1;
        match outcome {
            DocumentOutcome::Unclassified => self.unclassified += 1,
            DocumentOutcome::DryRun => self.dry_run += 1,
            DocumentOutcome::Moved => self.moved += 1,
            DocumentOutcome::Copied => self.copied += 1,
            DocumentOutcome::Skipped => self.skipped += 1,
            DocumentOutcome::MoveAbandoned => self.move_abandoned += 1,
            DocumentOutcome::Collision { .. } => self.collisions += 1,
            DocumentOutcome::ExtractionFailed(_) => self.extraction_failed += 1,
            DocumentOutcome::Failed(_) => self.failed += 1,
        }
    }

    pub fn classified(&self) -> usize {
        self.processed - self.unclassified - self.extraction_failed - self.failed
    }
}
