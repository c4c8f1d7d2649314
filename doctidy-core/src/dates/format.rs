// Parse formats as written in rule files.
//
// Rule files carry formats in the custom date notation scanner software and
// office tools use (`dd.MM.yyyy`, `d MMMM yyyy`). A format containing `%` is
// taken as strftime already. Either way it is split into fields once, and
// each field yields both a chrono strftime item and an anchored regex piece.
// A candidate has to match the regex in full before chrono reads it, because
// chrono alone lets a space match nothing and `%d` take a single digit.

use super::culture::MonthStyle;
use chrono::NaiveDate;
use regex::{Regex, RegexBuilder};

/// Latest year a two-digit year can stand for
const TWO_DIGIT_YEAR_MAX: i32 = 2049;

const ENGLISH_WEEKDAYS: [&str; 7] = [
    "Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday", "Sunday",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Width {
    /// Exactly two digits (`dd`, `%d`)
    Two,
    /// One or two digits (`d`, `%-d`)
    OneOrTwo,
}

impl Width {
    fn from_run(run: usize) -> Self {
        if run >= 2 {
            Width::Two
        } else {
            Width::OneOrTwo
        }
    }

    fn shape(self) -> &'static str {
        match self {
            Width::Two => "[0-9]{2}",
            Width::OneOrTwo => "[0-9]{1,2}",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Field {
    Year,
    /// Expanded to four digits before chrono sees it
    ShortYear(Width),
    Month(Width),
    MonthName(MonthStyle),
    Day(Width),
    Weekday { full: bool },
    Hour24(Width),
    Hour12(Width),
    Minute(Width),
    Second(Width),
    AmPm,
    Literal(char),
    /// strftime directive chrono understands but that has no shape here
    Unchecked(String),
}

impl Field {
    fn push_strftime(&self, out: &mut String) {
        let item = match self {
            Field::Year | Field::ShortYear(_) => "%Y",
            Field::Month(_) => "%m",
            Field::MonthName(MonthStyle::Full) => "%B",
            Field::MonthName(MonthStyle::Short) => "%b",
            Field::Day(_) => "%d",
            Field::Weekday { full: true } => "%A",
            Field::Weekday { full: false } => "%a",
            Field::Hour24(_) => "%H",
            Field::Hour12(_) => "%I",
            Field::Minute(_) => "%M",
            Field::Second(_) => "%S",
            Field::AmPm => "%p",
            Field::Literal('%') => "%%",
            Field::Literal(c) => {
                out.push(*c);
                return;
            }
            Field::Unchecked(directive) => directive.as_str(),
        };
        out.push_str(item);
    }

    fn shape(&self) -> Option<String> {
        let shape = match self {
            Field::Year => "[0-9]{4}".to_string(),
            Field::ShortYear(width) => format!("({})", width.shape()),
            Field::Month(width)
            | Field::Day(width)
            | Field::Hour24(width)
            | Field::Hour12(width)
            | Field::Minute(width)
            | Field::Second(width) => width.shape().to_string(),
            Field::MonthName(style) => alternation((0..12).map(|i| style.english(i))),
            Field::Weekday { full } => alternation(
                ENGLISH_WEEKDAYS
                    .iter()
                    .map(|&name| if *full { name } else { &name[..3] }),
            ),
            Field::AmPm => "(?:AM|PM)".to_string(),
            Field::Literal(c) => regex::escape(&c.to_string()),
            Field::Unchecked(_) => return None,
        };
        Some(shape)
    }
}

fn alternation<'a>(names: impl Iterator<Item = &'a str>) -> String {
    format!("(?:{})", names.collect::<Vec<_>>().join("|"))
}

#[derive(Debug, Clone)]
pub struct DateFormat {
    source: String,
    strftime: String,
    /// Anchored; two-digit years are its only capture groups.
    /// `None` when the format holds a directive without a shape.
    shape: Option<Regex>,
    month_style: Option<MonthStyle>,
}

impl PartialEq for DateFormat {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for DateFormat {}

impl DateFormat {
    pub fn parse(source: &str) -> Self {
        let fields = if source.contains('%') {
            strftime_fields(source)
        } else {
            custom_fields(source)
        };

        let mut strftime = String::with_capacity(source.len() * 2);
        for field in &fields {
            field.push_strftime(&mut strftime);
        }

        let shape = fields
            .iter()
            .map(Field::shape)
            .collect::<Option<String>>()
            .and_then(|body| {
                RegexBuilder::new(&format!(r"\A(?:{body})\z"))
                    .case_insensitive(true)
                    .build()
                    .ok()
            });

        let month_style = fields.iter().find_map(|field| match field {
            Field::MonthName(style) => Some(*style),
            _ => None,
        });

        Self {
            source: source.to_string(),
            strftime,
            shape,
            month_style,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn as_strftime(&self) -> &str {
        &self.strftime
    }

    /// Month names the format reads, if any
    pub fn month_style(&self) -> Option<MonthStyle> {
        self.month_style
    }

    /// Strict parse: the whole input must match the format, field widths and
    /// literals included. Two-digit years 00-49 land in the 2000s, 50-99 in
    /// the 1900s.
    pub fn parse_date(&self, text: &str) -> Option<NaiveDate> {
        let Some(shape) = &self.shape else {
            return NaiveDate::parse_from_str(text, &self.strftime).ok();
        };

        let captures = shape.captures(text)?;
        let short_years: Vec<_> = captures.iter().skip(1).flatten().collect();

        let mut expanded = text.to_string();
        // Back to front so earlier ranges stay valid
        for year in short_years.iter().rev() {
            let full = expand_two_digit_year(year.as_str().parse().ok()?);
            expanded.replace_range(year.range(), &format!("{full:04}"));
        }

        NaiveDate::parse_from_str(&expanded, &self.strftime).ok()
    }
}

fn expand_two_digit_year(two_digits: i32) -> i32 {
    let year = TWO_DIGIT_YEAR_MAX / 100 * 100 + two_digits;
    if year > TWO_DIGIT_YEAR_MAX {
        year - 100
    } else {
        year
    }
}

fn custom_fields(source: &str) -> Vec<Field> {
    let chars: Vec<char> = source.chars().collect();
    let mut fields = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        // Quoted literal
        if c == '\'' || c == '"' {
            i += 1;
            while i < chars.len() && chars[i] != c {
                fields.push(Field::Literal(chars[i]));
                i += 1;
            }
            i += 1;
            continue;
        }

        if c == '\\' {
            if let Some(&next) = chars.get(i + 1) {
                fields.push(Field::Literal(next));
            }
            i += 2;
            continue;
        }

        let run = chars[i..].iter().take_while(|&&x| x == c).count();
        let width = Width::from_run(run);
        match c {
            'y' if run >= 3 => fields.push(Field::Year),
            'y' => fields.push(Field::ShortYear(width)),
            'M' if run >= 4 => fields.push(Field::MonthName(MonthStyle::Full)),
            'M' if run == 3 => fields.push(Field::MonthName(MonthStyle::Short)),
            'M' => fields.push(Field::Month(width)),
            'd' if run >= 4 => fields.push(Field::Weekday { full: true }),
            'd' if run == 3 => fields.push(Field::Weekday { full: false }),
            'd' => fields.push(Field::Day(width)),
            'H' => fields.push(Field::Hour24(width)),
            'h' => fields.push(Field::Hour12(width)),
            'm' => fields.push(Field::Minute(width)),
            's' => fields.push(Field::Second(width)),
            't' => fields.push(Field::AmPm),
            _ => fields.extend(std::iter::repeat(Field::Literal(c)).take(run)),
        }
        i += run;
    }

    fields
}

fn strftime_fields(source: &str) -> Vec<Field> {
    let mut fields = Vec::new();
    let mut chars = source.chars();

    while let Some(c) = chars.next() {
        if c != '%' {
            fields.push(Field::Literal(c));
            continue;
        }

        let Some(mut spec) = chars.next() else {
            fields.push(Field::Unchecked("%".to_string()));
            break;
        };
        let unpadded = spec == '-';
        if unpadded {
            match chars.next() {
                Some(next) => spec = next,
                None => {
                    fields.push(Field::Unchecked("%-".to_string()));
                    break;
                }
            }
        }
        let width = if unpadded { Width::OneOrTwo } else { Width::Two };

        fields.push(match spec {
            'Y' => Field::Year,
            'y' => Field::ShortYear(width),
            'm' => Field::Month(width),
            'd' => Field::Day(width),
            'e' => Field::Day(Width::OneOrTwo),
            'B' => Field::MonthName(MonthStyle::Full),
            'b' | 'h' => Field::MonthName(MonthStyle::Short),
            'A' => Field::Weekday { full: true },
            'a' => Field::Weekday { full: false },
            'H' => Field::Hour24(width),
            'I' => Field::Hour12(width),
            'M' => Field::Minute(width),
            'S' => Field::Second(width),
            'p' => Field::AmPm,
            '%' => Field::Literal('%'),
            other if unpadded => Field::Unchecked(format!("%-{other}")),
            other => Field::Unchecked(format!("%{other}")),
        });
    }

    fields
}
