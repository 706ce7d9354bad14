//! Departure board client.
//!
//! Searches stations on a timetable REST API and shows their departure
//! boards in two result tables.

pub mod api;
pub mod config;
pub mod domain;
pub mod session;
pub mod shell;
pub mod table;
