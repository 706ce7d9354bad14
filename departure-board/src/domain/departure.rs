//! Departure board entries.

use chrono::NaiveDateTime;
use serde::Deserialize;

use super::time::deserialize_timestamp;

/// Placeholder shown when a departure has no track information.
const NO_TRACK: &str = "-";

/// One scheduled service at one stop.
///
/// Field names follow the API's camelCase keys; `type` is exposed as
/// `kind` since it is a keyword.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Departure {
    /// Train name, e.g. "ICE 1234".
    pub name: String,

    /// Service category, e.g. "ICE" or "RE".
    #[serde(rename = "type")]
    pub kind: String,

    /// Identifier of the board this entry was listed on.
    pub board_id: i64,

    /// Identifier of the stop.
    pub stop_id: i64,

    /// Name of the stop.
    pub stop_name: String,

    /// Scheduled departure, local time without timezone.
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub date_time: NaiveDateTime,

    /// Track, when the provider knows it.
    #[serde(default)]
    pub track: Option<String>,

    /// Identifier for the service details endpoint.
    pub details_id: String,
}

impl Departure {
    /// Scheduled date as `DD.MM.YYYY`.
    pub fn display_date(&self) -> String {
        self.date_time.format("%d.%m.%Y").to_string()
    }

    /// Scheduled time as `HH:MM`.
    pub fn display_time(&self) -> String {
        self.date_time.format("%H:%M").to_string()
    }

    /// Track for display.
    ///
    /// A missing track renders as `-`; an empty track stays empty.
    pub fn display_track(&self) -> &str {
        self.track.as_deref().unwrap_or(NO_TRACK)
    }
}
