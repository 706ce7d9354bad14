//! Station search results.

use serde::Deserialize;

/// A station returned by a location search.
///
/// Identified by `id` within one result set; the other fields are only
/// used for display.
///
/// # Examples
///
/// ```
/// use departure_board::domain::Location;
///
/// let json = r#"{"id": 8000105, "name": "Frankfurt(Main)Hbf", "lon": 8.663785, "lat": 50.107149}"#;
/// let location: Location = serde_json::from_str(json).unwrap();
/// assert_eq!(location.id, 8000105);
/// assert_eq!(location.name, "Frankfurt(Main)Hbf");
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Location {
    /// Station identifier, used to request its departure board.
    pub id: i64,

    /// Human-readable station name.
    pub name: String,

    /// Longitude in degrees.
    pub lon: f64,

    /// Latitude in degrees.
    pub lat: f64,
}

impl Location {
    /// Create a new location.
    pub fn new(id: i64, name: impl Into<String>, lon: f64, lat: f64) -> Self {
        Self {
            id,
            name: name.into(),
            lon,
            lat,
        }
    }
}
