//! Timetable REST API client.
//!
//! The provider exposes station search (`/location/{name}`) and departure
//! boards (`/departureBoard/{id}?date=...`). Every call is a single GET;
//! there are no retries and no caching.

mod client;
mod error;
mod source;

pub use client::{ApiClient, ApiConfig, DEFAULT_BASE_URL};
pub use error::ApiError;
pub use source::TimetableSource;
