use chrono::{Datelike, Local, NaiveDate};
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::str::FromStr;
use std::sync::OnceLock;
use thiserror::Error;

use crate::patterns::{self, PatternError};

// ── Compiled regex cache ─────────────────────────────────────────────────────

macro_rules! re {
    ($name:ident, $pat:expr) => {
        fn $name() -> &'static Regex {
            static R: OnceLock<Regex> = OnceLock::new();
            R.get_or_init(|| Regex::new($pat).expect("invalid regex"))
        }
    };
}

re!(re_time_of_day, r"\b\d{1,2}:\d{2}(?::\d{2})?(?:\.\d+)?\b");
re!(re_token, r"[A-Za-z]+|\d+");
re!(re_short_date, r"^\d{1,2}[-/.]\d{1,2}$");
re!(re_amount_marker, r"(?i)^(.*?\d)\s*(cr|dr|c|d)\.?$");
re!(re_numeric_core, r"^(?:\d+(?:\.\d+)?|\.\d+)$");

// ── Default pattern tables ───────────────────────────────────────────────────

/// Substrings that look like dates, tried in order. The last one has no year.
pub const DEFAULT_DATE_PATTERNS: &[&str] = &[
    r"\b\d{1,2}[-/.]\d{1,2}[-/.]\d{2,4}\b",
    r"\b\d{4}[-/.]\d{1,2}[-/.]\d{1,2}\b",
    r"\b\d{1,2}[\s-]+(?:jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?[\s,-]+\d{2,4}\b",
    r"\b(?:jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?\s+\d{1,2},?\s+\d{4}\b",
    r"\b\d{1,2}[\s-]+(?:jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\b",
];

/// chrono templates applied to each date candidate before the permissive fallback.
pub const DEFAULT_DATE_FORMATS: &[&str] = &[
    "%d-%m-%Y", "%d/%m/%Y", "%d.%m.%Y",
    "%d-%m-%y", "%d/%m/%y", "%d.%m.%y",
    "%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d",
    "%d %b %Y", "%d-%b-%Y", "%d %b, %Y",
    "%d %b %y", "%d-%b-%y",
    "%b %d, %Y", "%b %d %Y",
];

/// Money substrings, highest priority first.
pub const DEFAULT_AMOUNT_PATTERNS: &[&str] = &[
    r"(?:₹|\brs\.?|\binr\b)\s*\d[\d,]*(?:\.\d+)?(?:\s*(?:cr|dr)\b)?",
    r"\(\s*\d[\d,]*(?:\.\d+)?\s*\)",
    r"\b\d{1,3}(?:,\d{2,3})+(?:\.\d{1,2})?\b(?:\s*(?:cr|dr|c|d)\b)?",
    r"\b\d+\.\d{1,2}\b(?:\s*(?:cr|dr|c|d)\b)?",
    r"\b\d+\b(?:\s*(?:cr|dr)\b)?",
];

pub const DEFAULT_CURRENCY_MARKERS: &[&str] = &["₹", "Rs.", "Rs", "INR"];

const MONTHS: [&str; 12] = [
    "january", "february", "march", "april", "may", "june",
    "july", "august", "september", "october", "november", "december",
];

const WEEKDAYS: [&str; 7] = [
    "monday", "tuesday", "wednesday", "thursday", "friday", "saturday", "sunday",
];

const DATE_NOISE: &[&str] = &[
    "am", "pm", "t", "z", "utc", "gmt", "ist", "of", "st", "nd", "rd", "th",
];

// ── Types ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Empty date")]
    EmptyDate,
    #[error("Unrecognized date: {0}")]
    InvalidDate(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Credit,
    Debit,
}

/// A parsed amount plus the explicit direction marker, if the text carried one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignedAmount {
    pub value: Decimal,
    pub marker: Option<Direction>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateMatch {
    pub span: Range<usize>,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmountMatch {
    pub span: Range<usize>,
    pub text: String,
    pub amount: SignedAmount,
    /// Index of the pattern that produced the match; lower wins.
    pub pattern: usize,
}

impl AmountMatch {
    /// Carries a decimal point or digit grouping, as statement columns do.
    pub fn is_formatted(&self) -> bool {
        self.text.contains('.') || self.text.contains(',')
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerConfig {
    pub date_patterns: Vec<String>,
    pub date_formats: Vec<String>,
    pub amount_patterns: Vec<String>,
    pub currency_markers: Vec<String>,
    /// Interpret ambiguous numeric dates as day-month-year.
    pub day_first: bool,
    /// Year assumed for dates printed without one; current year when unset.
    pub reference_year: Option<i32>,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            date_patterns: patterns::owned(DEFAULT_DATE_PATTERNS),
            date_formats: patterns::owned(DEFAULT_DATE_FORMATS),
            amount_patterns: patterns::owned(DEFAULT_AMOUNT_PATTERNS),
            currency_markers: patterns::owned(DEFAULT_CURRENCY_MARKERS),
            day_first: true,
            reference_year: None,
        }
    }
}

// ── Normalizer ───────────────────────────────────────────────────────────────

/// Locale-tolerant date and amount parsing.
#[derive(Debug, Clone)]
pub struct Normalizer {
    config: NormalizerConfig,
    date_patterns: Vec<Regex>,
    amount_patterns: Vec<Regex>,
    currency: Option<Regex>,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(NormalizerConfig::default()).expect("built-in patterns compile")
    }
}

impl Normalizer {
    pub fn new(config: NormalizerConfig) -> Result<Self, PatternError> {
        let date_patterns = patterns::compile_all(&config.date_patterns)?;
        let amount_patterns = patterns::compile_all(&config.amount_patterns)?;
        let currency = currency_pattern(&config.currency_markers)
            .map(|p| patterns::compile(&p))
            .transpose()?;
        Ok(Self {
            config,
            date_patterns,
            amount_patterns,
            currency,
        })
    }

    pub fn config(&self) -> &NormalizerConfig {
        &self.config
    }

    /// Same tables, different year for year-less dates.
    pub fn with_reference_year(&self, year: i32) -> Self {
        let mut n = self.clone();
        n.config.reference_year = Some(year);
        n
    }

    pub fn reference_year(&self) -> i32 {
        self.config.reference_year.unwrap_or_else(|| Local::now().year())
    }

    // ── Dates ────────────────────────────────────────────────────────────────

    pub fn parse_date(&self, text: &str) -> Result<NaiveDate, ParseError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(ParseError::EmptyDate);
        }

        let candidates: Vec<&str> = std::iter::once(trimmed)
            .chain(
                self.date_patterns
                    .iter()
                    .filter_map(|re| re.find(trimmed))
                    .map(|m| m.as_str()),
            )
            .collect();

        candidates
            .iter()
            .find_map(|c| self.parse_with_formats(c))
            .or_else(|| candidates.iter().find_map(|c| self.parse_loose(c)))
            .ok_or_else(|| ParseError::InvalidDate(trimmed.to_string()))
    }

    /// First date in `text`, trying patterns in order.
    pub fn find_date(&self, text: &str) -> Option<DateMatch> {
        self.date_patterns.iter().find_map(|re| {
            re.find_iter(text).find_map(|m| {
                self.parse_date(m.as_str()).ok().map(|date| DateMatch {
                    span: m.range(),
                    date,
                })
            })
        })
    }

    /// Byte ranges of every date-pattern match, parsed or not.
    pub fn date_spans(&self, text: &str) -> Vec<Range<usize>> {
        self.date_patterns
            .iter()
            .flat_map(|re| re.find_iter(text).map(|m| m.range()))
            .collect()
    }

    fn parse_with_formats(&self, candidate: &str) -> Option<NaiveDate> {
        let collapsed = candidate.split_whitespace().collect::<Vec<_>>().join(" ");
        self.config
            .date_formats
            .iter()
            .filter_map(|fmt| NaiveDate::parse_from_str(&collapsed, fmt).ok())
            .find(|d| plausible(*d))
    }

    /// Day-first general parser over number and month-name tokens.
    fn parse_loose(&self, text: &str) -> Option<NaiveDate> {
        let stripped = re_time_of_day().replace_all(text, " ");
        let mut numbers: Vec<&str> = Vec::new();
        let mut month: Option<u32> = None;

        for token in re_token().find_iter(&stripped) {
            let t = token.as_str();
            if t.as_bytes()[0].is_ascii_digit() {
                numbers.push(t);
            } else if let Some(m) = month_from_name(t) {
                if month.replace(m).is_some() {
                    return None;
                }
            } else if !is_date_noise(t) {
                return None;
            }
        }

        let day = |s: &str| s.parse::<u32>().ok();
        match (month, numbers.as_slice()) {
            (Some(m), [d]) => ymd(self.reference_year(), m, day(d)?),
            (Some(m), [a, b]) if a.len() <= 2 => ymd(year_of(b)?, m, day(a)?),
            (Some(m), [a, b]) => ymd(year_of(a)?, m, day(b)?),
            (None, [a, b, c]) if a.len() == 4 => ymd(year_of(a)?, day(b)?, day(c)?),
            (None, [a, b, c]) => {
                let (p, q, y) = (day(a)?, day(b)?, year_of(c)?);
                if self.config.day_first {
                    ymd(y, q, p).or_else(|| ymd(y, p, q))
                } else {
                    ymd(y, p, q).or_else(|| ymd(y, q, p))
                }
            }
            (None, [a, b]) if re_short_date().is_match(stripped.trim()) => {
                let (p, q) = (day(a)?, day(b)?);
                let y = self.reference_year();
                if self.config.day_first {
                    ymd(y, q, p)
                } else {
                    ymd(y, p, q)
                }
            }
            (None, [compact]) if compact.len() == 8 => ymd(
                compact[..4].parse().ok()?,
                compact[4..6].parse().ok()?,
                compact[6..].parse().ok()?,
            ),
            _ => None,
        }
    }

    // ── Amounts ──────────────────────────────────────────────────────────────

    /// Signed amount with currency markers and separators stripped; 0 when unparsable.
    ///
    /// A zero result means "no amount found" and callers discard the row.
    pub fn parse_amount(&self, text: &str) -> Decimal {
        self.try_parse_amount(text).unwrap_or(Decimal::ZERO)
    }

    pub fn try_parse_amount(&self, text: &str) -> Option<Decimal> {
        self.parse_signed(text).map(|a| a.value)
    }

    pub fn parse_signed(&self, text: &str) -> Option<SignedAmount> {
        let (core, marker) = self.strip_amount(text)?;
        let mut digits: String = core
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '.')
            .collect();
        if digits.starts_with('.') {
            digits.insert(0, '0');
        }
        let digits = digits.trim_end_matches('.');
        if digits.is_empty() {
            return None;
        }
        let magnitude = Decimal::from_str(digits).ok()?;
        let value = if marker == Some(Direction::Debit) {
            -magnitude
        } else {
            magnitude
        };
        Some(SignedAmount { value, marker })
    }

    /// Stricter than [`Self::try_parse_amount`]: the whole cell must be a number.
    pub fn looks_like_amount(&self, text: &str) -> bool {
        self.strip_amount(text).is_some_and(|(core, _)| {
            let compact: String = core.chars().filter(|c| *c != ',' && !c.is_whitespace()).collect();
            re_numeric_core().is_match(&compact)
        })
    }

    /// Every amount-shaped substring, in text order, without overlaps.
    pub fn find_amounts(&self, text: &str) -> Vec<AmountMatch> {
        let mut found: Vec<AmountMatch> = Vec::new();
        for (pattern, re) in self.amount_patterns.iter().enumerate() {
            for m in re.find_iter(text) {
                let span = m.range();
                if found.iter().any(|f| f.span.start < span.end && span.start < f.span.end) {
                    continue;
                }
                if let Some(amount) = self.parse_signed(m.as_str()) {
                    found.push(AmountMatch {
                        span,
                        text: m.as_str().to_string(),
                        amount,
                        pattern,
                    });
                }
            }
        }
        found.sort_by_key(|f| f.span.start);
        found
    }

    fn strip_amount(&self, text: &str) -> Option<(String, Option<Direction>)> {
        let without_currency = match &self.currency {
            Some(re) => re.replace_all(text, "").into_owned(),
            None => text.to_string(),
        };
        let mut s = without_currency.trim();
        if s.is_empty() {
            return None;
        }

        let mut marker = None;
        if s.len() >= 2 && s.starts_with('(') && s.ends_with(')') {
            s = s[1..s.len() - 1].trim();
            marker = Some(Direction::Debit);
        }

        if let Some(c) = re_amount_marker().captures(s) {
            let suffix = c.get(2)?.as_str().to_ascii_lowercase();
            s = c.get(1)?.as_str().trim();
            if marker.is_none() {
                marker = Some(if suffix.starts_with('c') {
                    Direction::Credit
                } else {
                    Direction::Debit
                });
            }
        }

        if let Some(rest) = s.strip_prefix('-').or_else(|| s.strip_suffix('-')) {
            s = rest.trim();
            marker = Some(Direction::Debit);
        } else if let Some(rest) = s.strip_prefix('+') {
            s = rest.trim();
        }

        Some((s.to_string(), marker))
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

fn currency_pattern(markers: &[String]) -> Option<String> {
    let mut markers: Vec<&String> = markers.iter().filter(|m| !m.is_empty()).collect();
    if markers.is_empty() {
        return None;
    }
    markers.sort_by_key(|m| std::cmp::Reverse(m.chars().count()));
    let alternatives: Vec<String> = markers
        .iter()
        .map(|m| {
            let escaped = regex::escape(m);
            if m.starts_with(|c: char| c.is_ascii_alphanumeric()) {
                format!(r"\b{escaped}")
            } else {
                escaped
            }
        })
        .collect();
    Some(format!("(?:{})", alternatives.join("|")))
}

fn plausible(date: NaiveDate) -> bool {
    (1900..=2100).contains(&date.year())
}

fn ymd(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day).filter(|d| plausible(*d))
}

fn year_of(s: &str) -> Option<i32> {
    let n: i32 = s.parse().ok()?;
    Some(if s.len() <= 2 { expand_year(n) } else { n })
}

/// Two-digit years pivot at 70: `24` → 2024, `85` → 1985.
fn expand_year(y: i32) -> i32 {
    if y < 70 {
        2000 + y
    } else {
        1900 + y
    }
}

fn month_from_name(word: &str) -> Option<u32> {
    let lower = word.to_lowercase();
    if lower.len() < 3 {
        return None;
    }
    if lower == "sept" {
        return Some(9);
    }
    MONTHS
        .iter()
        .position(|m| m.starts_with(&lower))
        .map(|i| i as u32 + 1)
}

fn is_date_noise(word: &str) -> bool {
    let lower = word.to_lowercase();
    DATE_NOISE.contains(&lower.as_str())
        || (lower.len() >= 3 && WEEKDAYS.iter().any(|d| d.starts_with(&lower)))
}

// ── Tests ────────────────────────────────────────────────────────────────────
