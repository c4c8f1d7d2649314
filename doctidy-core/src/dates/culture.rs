// Culture-specific month names.
//
// chrono only reads English month names, so a candidate written in another
// language has its month names rewritten to English before the strict parse.

use regex::{Regex, RegexBuilder};
use std::collections::HashMap;

const ENGLISH_MONTHS: [&str; 12] = [
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December",
];

/// Which English month names a date format reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonthStyle {
    /// `MMMM`, `%B`
    Full,
    /// `MMM`, `%b`
    Short,
}

impl MonthStyle {
    /// English name of the zero-based `month`
    pub fn english(self, month: usize) -> &'static str {
        let name = ENGLISH_MONTHS[month];
        match self {
            MonthStyle::Full => name,
            MonthStyle::Short => &name[..3],
        }
    }
}

struct MonthNames {
    language: &'static str,
    full: [&'static str; 12],
    short: [&'static str; 12],
}

const MONTH_TABLES: &[MonthNames] = &[
    MonthNames {
        language: "fr",
        full: [
            "janvier", "février", "mars", "avril", "mai", "juin", "juillet", "août", "septembre",
            "octobre", "novembre", "décembre",
        ],
        short: [
            "janv", "févr", "mars", "avr", "mai", "juin", "juil", "août", "sept", "oct", "nov",
            "déc",
        ],
    },
    MonthNames {
        language: "de",
        full: [
            "Januar", "Februar", "März", "April", "Mai", "Juni", "Juli", "August", "September",
            "Oktober", "November", "Dezember",
        ],
        short: [
            "Jan", "Feb", "Mär", "Apr", "Mai", "Jun", "Jul", "Aug", "Sep", "Okt", "Nov", "Dez",
        ],
    },
    MonthNames {
        language: "es",
        full: [
            "enero", "febrero", "marzo", "abril", "mayo", "junio", "julio", "agosto",
            "septiembre", "octubre", "noviembre", "diciembre",
        ],
        short: [
            "ene", "feb", "mar", "abr", "may", "jun", "jul", "ago", "sep", "oct", "nov", "dic",
        ],
    },
    MonthNames {
        language: "it",
        full: [
            "gennaio", "febbraio", "marzo", "aprile", "maggio", "giugno", "luglio", "agosto",
            "settembre", "ottobre", "novembre", "dicembre",
        ],
        short: [
            "gen", "feb", "mar", "apr", "mag", "giu", "lug", "ago", "set", "ott", "nov", "dic",
        ],
    },
    MonthNames {
        language: "nl",
        full: [
            "januari", "februari", "maart", "april", "mei", "juni", "juli", "augustus",
            "september", "oktober", "november", "december",
        ],
        short: [
            "jan", "feb", "mrt", "apr", "mei", "jun", "jul", "aug", "sep", "okt", "nov", "dec",
        ],
    },
    MonthNames {
        language: "pt",
        full: [
            "janeiro", "fevereiro", "março", "abril", "maio", "junho", "julho", "agosto",
            "setembro", "outubro", "novembro", "dezembro",
        ],
        short: [
            "jan", "fev", "mar", "abr", "mai", "jun", "jul", "ago", "set", "out", "nov", "dez",
        ],
    },
];

/// Locale used when reading dates out of a document
#[derive(Debug, Clone)]
pub struct Culture {
    id: String,
    months: Option<LocalMonths>,
}

#[derive(Debug, Clone)]
struct LocalMonths {
    regex: Regex,
    /// lowercased local name -> month index
    index: HashMap<String, usize>,
}

impl Culture {
    /// Resolve `fr-FR`, `fr_FR`, `fr`, `en-US`, or `""` / `invariant`.
    /// Returns `None` for languages without month tables.
    pub fn from_id(id: &str) -> Option<Self> {
        let language = id
            .split(['-', '_'])
            .next()
            .unwrap_or("")
            .trim()
            .to_lowercase();

        if language.is_empty() || language == "en" || language == "invariant" || language == "iv" {
            return Some(Self {
                id: id.to_string(),
                months: None,
            });
        }

        let table = MONTH_TABLES.iter().find(|t| t.language == language)?;
        Some(Self {
            id: id.to_string(),
            months: Some(LocalMonths::new(table)),
        })
    }

    pub fn invariant() -> Self {
        Self {
            id: String::new(),
            months: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Rewrite local month names (full or abbreviated, with an optional
    /// trailing dot) to their English names in `style`.
    pub fn normalize_month_names(&self, text: &str, style: MonthStyle) -> String {
        match &self.months {
            None => text.to_string(),
            Some(months) => months
                .regex
                .replace_all(text, |caps: &regex::Captures| {
                    let name = caps[1].to_lowercase();
                    months
                        .index
                        .get(&name)
                        .map(|&i| style.english(i).to_string())
                        .unwrap_or_else(|| caps[0].to_string())
                })
                .into_owned(),
        }
    }
}

impl Default for Culture {
    fn default() -> Self {
        Self::invariant()
    }
}

impl LocalMonths {
    fn new(table: &MonthNames) -> Self {
        let mut index = HashMap::new();
        for (i, name) in table.full.iter().chain(table.short.iter()).enumerate() {
            index.insert(name.to_lowercase(), i % 12);
        }

        // Longest first so "juillet" wins over "juil"
        let mut names: Vec<&String> = index.keys().collect();
        names.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()).then(a.cmp(b)));
        let alternation = names
            .iter()
            .map(|n| regex::escape(n))
            .collect::<Vec<_>>()
            .join("|");

        let regex = RegexBuilder::new(&format!(r"\b({alternation})\b\.?"))
            .case_insensitive(true)
            .build()
            .expect("month name alternation is built from escaped literals");

        Self { regex, index }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolves_culture_ids() {
        assert!(Culture::from_id("fr-FR").is_some());
        assert!(Culture::from_id("de_CH").is_some());
        assert!(Culture::from_id("en-US").is_some());
        assert!(Culture::from_id("").is_some());
        assert!(Culture::from_id("xx-YY").is_none());
    }

    #[test]
    fn test_normalizes_french_months() {
        let fr = Culture::from_id("fr-FR").unwrap();
        assert_eq!(fr.normalize_month_names("12 mars 2024", MonthStyle::Full), "12 March 2024");
        assert_eq!(fr.normalize_month_names("3 JUILLET 2023", MonthStyle::Full), "3 July 2023");
        assert_eq!(fr.normalize_month_names("3 juil. 2023", MonthStyle::Full), "3 July 2023");
        assert_eq!(fr.normalize_month_names("1er Février 2022", MonthStyle::Full), "1er February 2022");
    }

    #[test]
    fn test_normalizes_german_months() {
        let de = Culture::from_id("de-DE").unwrap();
        assert_eq!(de.normalize_month_names("5. März 2021", MonthStyle::Full), "5. March 2021");
        assert_eq!(de.normalize_month_names("5. Dez. 2021", MonthStyle::Full), "5. December 2021");
        assert_eq!(de.normalize_month_names("5. Dezember 2021", MonthStyle::Short), "5. Dec 2021");
        assert_eq!(de.normalize_month_names("5. Mär. 2021", MonthStyle::Short), "5. Mar 2021");
    }

    #[test]
    fn test_english_is_untouched() {
        let en = Culture::from_id("en-GB").unwrap();
        assert_eq!(en.normalize_month_names("12 mars 2024", MonthStyle::Full), "12 mars 2024");
    }
}
