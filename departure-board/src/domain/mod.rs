//! Domain types for the departure board client.
//!
//! These are the response shapes of the timetable API. They are produced
//! fresh by every query and only live as long as the table showing them.

mod departure;
mod station;
mod time;

pub use departure::Departure;
pub use station::Location;
pub use time::{InvalidBoardDate, format_board_date, parse_board_date};
