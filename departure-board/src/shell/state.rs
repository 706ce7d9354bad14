//! Shell state machine.
//!
//! The shell owns both result tables and the board date. It turns user
//! actions into background requests and applies their results, talking to
//! the widgets only through [`View`]. It never performs I/O itself, so it
//! runs on the UI's own task.

use chrono::NaiveDateTime;
use tracing::{debug, warn};

use crate::api::ApiError;
use crate::domain::{Departure, Location, format_board_date, parse_board_date};
use crate::table::{Generation, Table, TableObserver};

use super::message::{Action, Pane, Request, Update};

/// Status shown when a search is started without a query.
const EMPTY_QUERY: &str = "enter a station name";

/// Widget side of the shell.
pub trait View {
    /// Row `index` of `pane` was removed.
    fn row_removed(&mut self, pane: Pane, index: usize);

    /// A row was inserted at `index` of `pane`.
    fn row_inserted(&mut self, pane: Pane, index: usize);

    /// Enable or disable the controls feeding `pane`.
    fn set_busy(&mut self, pane: Pane, busy: bool);

    /// Show an error or hint in the status label.
    fn show_status(&mut self, message: &str);

    fn clear_status(&mut self);

    /// Show the body of the about diagnostic.
    fn show_about(&mut self, text: &str);

    /// Called after every state change with the full current state.
    fn refresh(&mut self, _screen: &Screen<'_>) {}
}

/// Read-only snapshot of the shell, handed to [`View::refresh`].
#[derive(Debug, Clone, Copy)]
pub struct Screen<'a> {
    pub stations: &'a [Location],
    pub departures: &'a [Departure],
    pub board_date: &'a NaiveDateTime,
    pub stations_busy: bool,
    pub departures_busy: bool,
    pub status: Option<&'a str>,
    pub about: Option<&'a str>,
}

/// What raised the current status message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    Pane(Pane),
    About,
}

/// Forwards table notifications for one pane to the view.
struct PaneObserver<'a, V> {
    view: &'a mut V,
    pane: Pane,
}

impl<V: View> TableObserver for PaneObserver<'_, V> {
    fn row_removed(&mut self, index: usize) {
        self.view.row_removed(self.pane, index);
    }

    fn row_inserted(&mut self, index: usize) {
        self.view.row_inserted(self.pane, index);
    }
}

/// Apply a fetch result to `table`.
///
/// Returns `Ok(false)` for a superseded request. Rows are only replaced on
/// success; a failed fetch leaves the previous rows in place.
fn settle_rows<T, V: View>(
    table: &mut Table<T>,
    view: &mut V,
    pane: Pane,
    generation: Generation,
    result: Result<Vec<T>, ApiError>,
) -> Result<bool, ApiError> {
    if !table.settle(generation) {
        debug!(%pane, generation = generation.value(), "discarding stale response");
        return Ok(false);
    }
    view.set_busy(pane, false);

    let rows = result?;
    debug!(%pane, rows = rows.len(), "replacing rows");
    table.replace(rows, &mut PaneObserver { view, pane });
    Ok(true)
}

/// The UI shell.
pub struct Shell<V> {
    stations: Table<Location>,
    departures: Table<Departure>,
    board_date: NaiveDateTime,
    /// Only a later success from the same origin clears it.
    status: Option<(Origin, String)>,
    about: Option<String>,
    view: V,
}

impl<V: View> Shell<V> {
    /// Create a shell with empty tables, showing boards from `board_date`.
    pub fn new(view: V, board_date: NaiveDateTime) -> Self {
        Self {
            stations: Table::new(),
            departures: Table::new(),
            board_date,
            status: None,
            about: None,
            view,
        }
    }

    pub fn stations(&self) -> &Table<Location> {
        &self.stations
    }

    pub fn departures(&self) -> &Table<Departure> {
        &self.departures
    }

    pub fn board_date(&self) -> &NaiveDateTime {
        &self.board_date
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_ref().map(|(_, message)| message.as_str())
    }

    pub fn about(&self) -> Option<&str> {
        self.about.as_deref()
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    /// React to a user action.
    ///
    /// Returns the request to run in the background, if any.
    pub fn handle(&mut self, action: Action) -> Option<Request> {
        let request = match action {
            Action::SearchStations { query } => self.search(&query),
            Action::SetDate { value } => {
                match parse_board_date(&value) {
                    Ok(date) => {
                        self.board_date = date;
                        self.clear_status(Origin::Pane(Pane::Departures));
                    }
                    Err(e) => self.report(Origin::Pane(Pane::Departures), &e.to_string()),
                }
                None
            }
            Action::OpenStation { id } => {
                let generation = self.begin_departures();
                Some(Request::Board {
                    generation,
                    id,
                    date: format_board_date(&self.board_date),
                })
            }
            Action::OpenStationAt { id } => {
                let generation = self.begin_departures();
                Some(Request::BoardAt {
                    generation,
                    id,
                    date: format_board_date(&self.board_date),
                })
            }
            Action::About => Some(Request::About),
        };

        self.refresh();
        request
    }

    fn search(&mut self, query: &str) -> Option<Request> {
        let name = query.trim();
        if name.is_empty() {
            self.report(Origin::Pane(Pane::Stations), EMPTY_QUERY);
            return None;
        }

        let generation = self.stations.begin_request();
        self.view.set_busy(Pane::Stations, true);
        debug!(name, generation = generation.value(), "searching stations");

        Some(Request::Locations {
            generation,
            name: name.to_string(),
        })
    }

    fn begin_departures(&mut self) -> Generation {
        let generation = self.departures.begin_request();
        self.view.set_busy(Pane::Departures, true);
        generation
    }

    /// Apply the result of a background request.
    pub fn apply(&mut self, update: Update) {
        let (origin, outcome) = match update {
            Update::Stations { generation, result } => (
                Origin::Pane(Pane::Stations),
                settle_rows(
                &mut self.stations,
                &mut self.view,
                    Pane::Stations,
                    generation,
                    result,
                ),
            ),
            Update::Departures { generation, result } => (
                Origin::Pane(Pane::Departures),
                settle_rows(
                &mut self.departures,
                &mut self.view,
                    Pane::Departures,
                    generation,
                    result,
                ),
            ),
            Update::About(result) => (
                Origin::About,
                result.map(|text| {
                    self.view.show_about(&text);
                    self.about = Some(text);
                    true
                }),
            ),
        };

        match outcome {
            Ok(true) => self.clear_status(origin),
            Ok(false) => {}
            Err(e) => {
                warn!(error = %e, "request failed");
                self.report(origin, &e.to_string());
            }
        }

        self.refresh();
    }

    fn report(&mut self, origin: Origin, message: &str) {
        self.view.show_status(message);
        self.status = Some((origin, message.to_string()));
    }

    fn clear_status(&mut self, origin: Origin) {
        if matches!(self.status, Some((raised_by, _)) if raised_by == origin) {
            self.status = None;
            self.view.clear_status();
        }
    }

    fn refresh(&mut self) {
        let screen = Screen {
            stations: self.stations.rows(),
            departures: self.departures.rows(),
            board_date: &self.board_date,
            stations_busy: self.stations.is_loading(),
            departures_busy: self.departures.is_loading(),
            status: self.status.as_ref().map(|(_, message)| message.as_str()),
            about: self.about.as_deref(),
        };
        self.view.refresh(&screen);
    }
}
