//! Board date handling.
//!
//! The timetable API exchanges timestamps without a timezone, as
//! `YYYY-MM-DDTHH:MM` (seconds are usually omitted). The same form is used
//! for the `date` query parameter of a departure board request.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer};

/// Wire format used when sending a board date.
const WIRE_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Accepted timestamp formats, most common first.
const TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S"];

/// Error returned when parsing an invalid board date.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid date '{input}': expected YYYY-MM-DD or YYYY-MM-DDTHH:MM")]
pub struct InvalidBoardDate {
    input: String,
}

/// Parse a timestamp as sent by the API.
fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}

/// Parse a date-picker value into a board date.
///
/// A bare date means midnight.
///
/// # Examples
///
/// ```
/// use departure_board::domain::{format_board_date, parse_board_date};
///
/// let date = parse_board_date("2021-03-02T09:05").unwrap();
/// assert_eq!(format_board_date(&date), "2021-03-02T09:05");
///
/// let midnight = parse_board_date("2021-03-02").unwrap();
/// assert_eq!(format_board_date(&midnight), "2021-03-02T00:00");
///
/// assert!(parse_board_date("02.03.2021").is_err());
/// ```
pub fn parse_board_date(s: &str) -> Result<NaiveDateTime, InvalidBoardDate> {
    let s = s.trim();
    parse_timestamp(s)
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .ok_or_else(|| InvalidBoardDate {
            input: s.to_string(),
        })
}

/// Format a board date for the `date` query parameter.
pub fn format_board_date(date: &NaiveDateTime) -> String {
    date.format(WIRE_FORMAT).to_string()
}

/// Serde adapter for API timestamps.
pub(crate) fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_timestamp(&s)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {s}")))
}
