//! Relative due-date phrasing ("in 2 days", "1 hour ago", "tomorrow")
//!
//! English only; other languages fall back to English phrasing.

use chrono::{DateTime, Utc};
use serde::Serialize;

const SECOND: f64 = 1_000.0;
const MINUTE: f64 = 60.0 * SECOND;
const HOUR: f64 = 60.0 * MINUTE;
const DAY: f64 = 24.0 * HOUR;
const YEAR: f64 = 365.0 * DAY;
const MONTH: f64 = YEAR / 12.0;

/// Units from largest to smallest, with their length in milliseconds
const UNITS: [(Unit, f64); 6] = [
    (Unit::Year, YEAR),
    (Unit::Month, MONTH),
    (Unit::Day, DAY),
    (Unit::Hour, HOUR),
    (Unit::Minute, MINUTE),
    (Unit::Second, SECOND),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
}

impl Unit {
    fn name(self) -> &'static str {
        match self {
            Self::Year => "year",
            Self::Month => "month",
            Self::Day => "day",
            Self::Hour => "hour",
            Self::Minute => "minute",
            Self::Second => "second",
        }
    }

    /// Phrase for a value of this unit, where English has one. Only
    /// seconds can round to zero.
    fn idiom(self, value: i64) -> Option<&'static str> {
        match (self, value) {
            (Self::Year, -1) => Some("last year"),
            (Self::Year, 1) => Some("next year"),
            (Self::Month, -1) => Some("last month"),
            (Self::Month, 1) => Some("next month"),
            (Self::Day, -1) => Some("yesterday"),
            (Self::Day, 1) => Some("tomorrow"),
            (Self::Second, 0) => Some("now"),
            _ => None,
        }
    }
}

/// A rendered due date
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DueRender {
    pub text: String,
    pub overdue: bool,
}

/// Formats due dates relative to now
#[derive(Debug, Clone)]
pub struct RelativeTimeFormatter {
    lang: String,
}

impl Default for RelativeTimeFormatter {
    fn default() -> Self {
        Self::new("en")
    }
}

impl RelativeTimeFormatter {
    pub fn new(lang: impl Into<String>) -> Self {
        Self { lang: lang.into() }
    }

    pub fn lang(&self) -> &str {
        &self.lang
    }

    /// Render a due date given as Unix seconds. Absent, zero or
    /// unrepresentable dues render as empty text and are never overdue.
    pub fn due(&self, due: Option<i64>, now: DateTime<Utc>) -> DueRender {
        let Some(due) = due
            .filter(|d| *d > 0)
            .and_then(|d| DateTime::from_timestamp(d, 0))
        else {
            return DueRender::default();
        };
        let elapsed = due.signed_duration_since(now).num_milliseconds() as f64;
        DueRender {
            text: self.format_millis(elapsed),
            overdue: elapsed < 0.0,
        }
    }

    /// Phrase a signed offset in milliseconds (positive is in the future)
    pub fn format_millis(&self, elapsed: f64) -> String {
        let (unit, length) = UNITS
            .iter()
            .copied()
            .find(|(_, length)| elapsed.abs() > *length)
            .unwrap_or((Unit::Second, SECOND));

        // Half rounds up, towards positive infinity
        let value = (elapsed / length + 0.5).floor() as i64;
        if let Some(idiom) = unit.idiom(value) {
            return idiom.to_string();
        }

        let count = value.unsigned_abs();
        let plural = if count == 1 { "" } else { "s" };
        if value > 0 {
            format!("in {} {}{}", count, unit.name(), plural)
        } else {
            format!("{} {}{} ago", count, unit.name(), plural)
        }
    }
}
