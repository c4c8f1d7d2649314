//! Date extraction
//!
//! A rule's `date_format` regex locates candidate substrings. Each candidate
//! goes through the configured replacement table, then the rule culture's
//! month-name normalization, then a strict parse. Candidates that fail any
//! step are dropped.
//!
//! ```text
//! "le 12 mars 2024"  --replacements-->  "12 03 2024"  --parse(dd MM yyyy)-->  2024-03-12
//! ```

pub mod culture;
pub mod format;
pub mod resolver;

pub use culture::{Culture, MonthStyle};
pub use format::DateFormat;
pub use resolver::{DateResolution, DateResolver, ResolvedFrom};

use crate::error::ConfigError;
use regex::{Regex, RegexBuilder};

/// Ordered pattern -> replacement pairs applied to every date candidate.
/// Each pair sees the output of the previous one.
#[derive(Debug, Clone, Default)]
pub struct ReplacementTable {
    patterns: Vec<(Regex, String)>,
}

impl ReplacementTable {
    pub fn compile(pairs: &[(String, String)]) -> Result<Self, ConfigError> {
        let patterns = pairs
            .iter()
            .map(|(pattern, replacement)| {
                RegexBuilder::new(pattern)
                    .case_insensitive(true)
                    .build()
                    .map(|regex| (regex, replacement.clone()))
                    .map_err(|source| ConfigError::InvalidReplacementPattern {
                        pattern: pattern.clone(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { patterns })
    }

    pub fn apply(&self, text: &str) -> String {
        self.patterns
            .iter()
            .fold(text.to_string(), |current, (regex, replacement)| {
                regex.replace_all(&current, replacement.as_str()).into_owned()
            })
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}
