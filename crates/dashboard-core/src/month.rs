use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::DashboardError;

// ── YearMonth ─────────────────────────────────────────────────────────────────

/// Month-granularity key for listings, statistics and chart points.
///
/// Ordering is chronological. The textual form is `YYYY-MM`, which is also the
/// serialised form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    /// Build a key, returning `None` when `month` is outside `1..=12`.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    /// The month containing `date`.
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    /// Calendar month, 1–12.
    pub fn month(&self) -> u32 {
        self.month
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = DashboardError;

    /// Parse the strict `YYYY-MM` form used by selectors and serialisation.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DashboardError::InvalidMonth(s.to_string());
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        Self::new(year, month).ok_or_else(invalid)
    }
}

impl TryFrom<String> for YearMonth {
    type Error = DashboardError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<YearMonth> for String {
    fn from(value: YearMonth) -> Self {
        value.to_string()
    }
}

// ── Date normalisation ────────────────────────────────────────────────────────

/// Normalise a raw date string from a listings file to its month key.
///
/// Handles RFC 3339 (including the `Z` suffix), the common date-time layouts
/// written by spreadsheet and dataframe tools, plain dates, and bare `YYYY-MM`.
/// Returns `None` for empty or unrecognised input.
pub fn normalize_month(raw: &str) -> Option<YearMonth> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    let normalised = match s.strip_suffix('Z') {
        Some(stripped) => format!("{}+00:00", stripped),
        None => s.to_string(),
    };
    if let Ok(dt) = DateTime::parse_from_rfc3339(&normalised) {
        return Some(YearMonth::from_date(dt.date_naive()));
    }

    const DATETIME_FORMATS: &[&str] = &[
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
    ];
    for fmt in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(YearMonth::from_date(naive.date()));
        }
    }

    const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y"];
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Some(YearMonth::from_date(date));
        }
    }

    if let Ok(month) = s.parse::<YearMonth>() {
        return Some(month);
    }

    debug!("could not normalise date \"{}\" to a month", s);
    None
}
