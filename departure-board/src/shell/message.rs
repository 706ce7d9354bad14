//! Messages flowing between the UI, the shell and background requests.

use std::fmt;

use crate::api::ApiError;
use crate::domain::{Departure, Location};
use crate::table::Generation;

/// One of the two result tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pane {
    Stations,
    Departures,
}

impl fmt::Display for Pane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pane::Stations => f.write_str("stations"),
            Pane::Departures => f.write_str("departures"),
        }
    }
}

/// A user action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Search stations whose name matches `query`.
    SearchStations { query: String },

    /// Pick the board date (date-picker value).
    SetDate { value: String },

    /// Show the departure board of a station.
    OpenStation { id: i64 },

    /// Show the single departure of a station at exactly the board date.
    OpenStationAt { id: i64 },

    /// Fetch the diagnostic about page.
    About,
}

/// A request to run in the background.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Locations {
        generation: Generation,
        name: String,
    },
    Board {
        generation: Generation,
        id: i64,
        date: String,
    },
    BoardAt {
        generation: Generation,
        id: i64,
        date: String,
    },
    About,
}

/// The outcome of a [`Request`].
#[derive(Debug)]
pub enum Update {
    Stations {
        generation: Generation,
        result: Result<Vec<Location>, ApiError>,
    },
    Departures {
        generation: Generation,
        result: Result<Vec<Departure>, ApiError>,
    },
    About(Result<String, ApiError>),
}
