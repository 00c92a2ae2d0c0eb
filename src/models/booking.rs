use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime, Timelike};
use serde::Serialize;
use sqlx::FromRow;

/// Booking status. `Completed` is part of the schema but nothing assigns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Booked,
    Cancelled,
    Completed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Booked => "booked",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Completed => "completed",
        }
    }
}

/// Database booking model
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Booking {
    pub id: i64,
    pub user_id: i64,
    pub slot_id: i64,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub status: BookingStatus,
    pub amount: i64,
    pub created_at: NaiveDateTime,
}

impl Booking {
    pub fn window(&self) -> BookingWindow {
        BookingWindow {
            start: self.start_time,
            end: self.end_time,
        }
    }
}

/// A booking joined with its slot number and, for admin listings, its owner
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct BookingDetails {
    #[sqlx(flatten)]
    pub booking: Booking,
    pub slot_number: i64,
    #[sqlx(default)]
    pub user_name: Option<String>,
    #[sqlx(default)]
    pub user_email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WindowError {
    #[error("unrecognised timestamp '{0}'")]
    Unparsable(String),
    #[error("timezone offsets are not supported: '{0}'")]
    Zoned(String),
    #[error("year must be between 0000 and 9999: '{0}'")]
    YearOutOfRange(String),
    #[error("End time must be after start time")]
    NotAfterStart,
}

/// A half-open `[start, end)` booking window.
///
/// Both ends are zone-less local times truncated to whole seconds, so the
/// database sees them in one lexically ordered text format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

// `%.f` also matches when there is no fractional part
const TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

const YEARS: std::ops::RangeInclusive<i32> = 0..=9999;

impl BookingWindow {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Result<Self, WindowError> {
        let start = canonical(start)?;
        let end = canonical(end)?;
        if end <= start {
            return Err(WindowError::NotAfterStart);
        }
        Ok(Self { start, end })
    }

    /// Parse the `start`/`end` strings submitted by the search form.
    pub fn parse(start: &str, end: &str) -> Result<Self, WindowError> {
        Self::new(parse_timestamp(start)?, parse_timestamp(end)?)
    }

    /// `[a1,a2)` and `[b1,b2)` overlap iff NOT(a2 <= b1 OR a1 >= b2).
    pub fn overlaps(&self, other: &BookingWindow) -> bool {
        !(self.end <= other.start || self.start >= other.end)
    }

    pub fn duration_seconds(&self) -> i64 {
        (self.end - self.start).num_seconds()
    }

    /// Query string carrying this window, as used by the search and book routes.
    pub fn query_string(&self) -> String {
        format!(
            "start={}&end={}",
            input_value(&self.start),
            input_value(&self.end)
        )
    }
}

/// Whole seconds within four-digit years, the only values whose stored text
/// sorts chronologically.
fn canonical(timestamp: NaiveDateTime) -> Result<NaiveDateTime, WindowError> {
    if !YEARS.contains(&timestamp.year()) {
        return Err(WindowError::YearOutOfRange(timestamp.to_string()));
    }
    Ok(timestamp.with_nanosecond(0).unwrap_or(timestamp))
}

pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime, WindowError> {
    let raw = raw.trim();

    for format in TIMESTAMP_FORMATS {
        if let Ok(timestamp) = NaiveDateTime::parse_from_str(raw, format) {
            return canonical(timestamp);
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return canonical(midnight);
        }
    }

    if DateTime::parse_from_rfc3339(raw).is_ok() {
        return Err(WindowError::Zoned(raw.to_string()));
    }

    Err(WindowError::Unparsable(raw.to_string()))
}

/// Value for a `datetime-local` input. Seconds are only printed when set.
pub fn input_value(timestamp: &NaiveDateTime) -> String {
    if timestamp.second() == 0 {
        timestamp.format("%Y-%m-%dT%H:%M").to_string()
    } else {
        timestamp.format("%Y-%m-%dT%H:%M:%S").to_string()
    }
}

/// Current local time truncated to whole seconds.
pub fn now() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(start: &str, end: &str) -> BookingWindow {
        BookingWindow::parse(start, end).unwrap()
    }

    #[test]
    fn contained_window_overlaps() {
        let existing = window("2025-03-01T10:00", "2025-03-01T14:00");
        let inner = window("2025-03-01T11:00", "2025-03-01T12:00");
        assert!(existing.overlaps(&inner));
        assert!(inner.overlaps(&existing));
    }

    #[test]
    fn adjacent_windows_do_not_overlap() {
        let morning = window("2025-03-01T08:00", "2025-03-01T10:00");
        let late = window("2025-03-01T10:00", "2025-03-01T12:00");
        assert!(!morning.overlaps(&late));
        assert!(!late.overlaps(&morning));
    }

    #[test]
    fn partial_overlap_is_detected() {
        let first = window("2025-03-01T08:00", "2025-03-01T10:30");
        let second = window("2025-03-01T10:00", "2025-03-01T12:00");
        assert!(first.overlaps(&second));
    }

    #[test]
    fn end_must_follow_start() {
        assert_eq!(
            BookingWindow::parse("2025-03-01T10:00", "2025-03-01T10:00"),
            Err(WindowError::NotAfterStart)
        );
        assert_eq!(
            BookingWindow::parse("2025-03-01T10:00", "2025-03-01T09:00"),
            Err(WindowError::NotAfterStart)
        );
    }

    #[test]
    fn accepts_form_and_space_separated_formats() {
        let a = parse_timestamp("2025-03-01T10:15").unwrap();
        let b = parse_timestamp("2025-03-01 10:15:00").unwrap();
        assert_eq!(a, b);

        let midnight = parse_timestamp("2025-03-01").unwrap();
        assert_eq!(midnight.to_string(), "2025-03-01 00:00:00");
    }

    #[test]
    fn rejects_zoned_and_garbage_input() {
        assert!(matches!(
            parse_timestamp("2025-03-01T10:15:00+02:00"),
            Err(WindowError::Zoned(_))
        ));
        assert!(matches!(
            parse_timestamp("tomorrow"),
            Err(WindowError::Unparsable(_))
        ));
    }

    #[test]
    fn rejects_years_outside_four_digits() {
        assert!(matches!(
            parse_timestamp("+10000-01-01T00:00"),
            Err(WindowError::YearOutOfRange(_))
        ));
        assert!(matches!(
            parse_timestamp("-0001-12-31 23:00"),
            Err(WindowError::YearOutOfRange(_))
        ));
        assert!(parse_timestamp("9999-12-31T23:59:59").is_ok());

        let far = NaiveDate::from_ymd_opt(10000, 1, 1)
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .unwrap();
        let start = parse_timestamp("2030-01-01T00:00").unwrap();
        assert!(matches!(
            BookingWindow::new(start, far),
            Err(WindowError::YearOutOfRange(_))
        ));
    }

    #[test]
    fn fractional_seconds_are_truncated() {
        let timestamp = parse_timestamp("2030-01-01T10:00:00.500").unwrap();
        assert_eq!(timestamp.to_string(), "2030-01-01 10:00:00");

        let spaced = parse_timestamp("2030-01-01 10:00:05.123456").unwrap();
        assert_eq!(spaced.to_string(), "2030-01-01 10:00:05");
    }

    #[test]
    fn query_string_round_trips_through_parse() {
        let original = window("2025-03-01T10:00", "2025-03-01T11:30:15");
        assert_eq!(
            original.query_string(),
            "start=2025-03-01T10:00&end=2025-03-01T11:30:15"
        );
    }
}
