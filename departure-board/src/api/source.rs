//! Abstraction over the timetable API.

use std::future::Future;

use crate::domain::{Departure, Location};

use super::error::ApiError;

/// The read operations the shell needs from the timetable API.
///
/// Implemented by [`ApiClient`](super::ApiClient); tests substitute
/// scripted sources.
pub trait TimetableSource {
    /// Search stations by name.
    fn locations(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Vec<Location>, ApiError>> + Send;

    /// Departures from a station starting at `date` (`YYYY-MM-DDTHH:MM`).
    fn departure_board(
        &self,
        id: i64,
        date: &str,
    ) -> impl Future<Output = Result<Vec<Departure>, ApiError>> + Send;

    /// The single departure from a station at exactly `date`.
    fn departure_board_date_time(
        &self,
        id: i64,
        date: &str,
    ) -> impl Future<Output = Result<Departure, ApiError>> + Send;

    /// Raw body of the diagnostic "about" endpoint.
    fn about(&self) -> impl Future<Output = Result<String, ApiError>> + Send;
}
