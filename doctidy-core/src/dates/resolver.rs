use super::ReplacementTable;
use crate::types::DateSpec;
use chrono::NaiveDate;
use tracing::{debug, info};

/// How the document date was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedFrom {
    /// Newest date found in the text
    Document,
    /// Date found after skipping this many newer ones
    Skipped(usize),
    /// The rule has no date pattern
    NoPatternToday,
    /// The pattern matched nothing that parsed
    NoDateFoundToday,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DateResolution {
    /// Distinct parsed dates, newest first
    pub dates: Vec<NaiveDate>,
    pub resolved: NaiveDate,
    pub from: ResolvedFrom,
}

impl DateResolution {
    pub fn used_today_fallback(&self) -> bool {
        matches!(self.from, ResolvedFrom::NoDateFoundToday)
    }
}

/// Finds, normalizes and parses candidate dates, then picks the document date.
pub struct DateResolver<'a> {
    replacements: &'a ReplacementTable,
}

impl<'a> DateResolver<'a> {
    pub fn new(replacements: &'a ReplacementTable) -> Self {
        Self { replacements }
    }

    pub fn resolve(&self, text: &str, spec: Option<&DateSpec>, today: NaiveDate) -> DateResolution {
        let Some(spec) = spec else {
            return DateResolution {
                dates: Vec::new(),
                resolved: today,
                from: ResolvedFrom::NoPatternToday,
            };
        };

        let dates = self.distinct_dates(text, spec);
        if dates.is_empty() {
            info!("Can't find any date references, using today");
            return DateResolution {
                dates,
                resolved: today,
                from: ResolvedFrom::NoDateFoundToday,
            };
        }

        info!(
            "Found dates: {}",
            dates
                .iter()
                .map(|d| d.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );

        let (resolved, from) = if spec.skip != 0 && spec.skip < dates.len() {
            info!("Skipping {} newest date(s)", spec.skip);
            (dates[spec.skip], ResolvedFrom::Skipped(spec.skip))
        } else {
            (dates[0], ResolvedFrom::Document)
        };

        DateResolution {
            dates,
            resolved,
            from,
        }
    }

    /// Every date in the text that survives normalization and strict parsing,
    /// deduplicated and sorted newest first.
    pub fn distinct_dates(&self, text: &str, spec: &DateSpec) -> Vec<NaiveDate> {
        let mut dates: Vec<NaiveDate> = spec
            .pattern
            .find_iter(text)
            .filter_map(|m| self.parse_candidate(m.as_str(), spec))
            .collect();

        dates.sort_unstable_by(|a, b| b.cmp(a));
        dates.dedup();
        dates
    }

    fn parse_candidate(&self, candidate: &str, spec: &DateSpec) -> Option<NaiveDate> {
        let replaced = self.replacements.apply(candidate);
        let normalized = match spec.parse_format.month_style() {
            Some(style) => spec.culture.normalize_month_names(&replaced, style),
            None => replaced,
        };
        let parsed = spec.parse_format.parse_date(&normalized);
        if parsed.is_none() {
            debug!(
                "Discarding '{}' (normalized '{}'): does not match '{}'",
                candidate,
                normalized,
                spec.parse_format.source()
            );
        }
        parsed
    }
}
