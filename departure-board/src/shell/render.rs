//! Askama templates for the terminal front end.

use askama::Template;

use super::state::Screen;

/// Both panes, the status line and the about text.
#[derive(Template)]
#[template(path = "screen.txt")]
pub struct ScreenTemplate {
    pub date: String,
    pub stations: Vec<StationRow>,
    pub departures: Vec<DepartureRow>,
    pub stations_busy: bool,
    pub departures_busy: bool,
    pub status: String,
    pub about: String,
}

/// Command reference.
#[derive(Template)]
#[template(path = "help.txt")]
pub struct HelpTemplate;

/// A station row; `row` is the 1-based number users type to open it.
pub struct StationRow {
    pub row: usize,
    pub id: i64,
    pub name: String,
    pub position: String,
}

pub struct DepartureRow {
    pub date: String,
    pub time: String,
    pub name: String,
    pub kind: String,
    pub track: String,
    pub stop_name: String,
}

impl ScreenTemplate {
    pub fn from_screen(screen: &Screen<'_>) -> Self {
        let stations = screen
            .stations
            .iter()
            .enumerate()
            .map(|(i, s)| StationRow {
                row: i + 1,
                id: s.id,
                name: s.name.clone(),
                position: format!("{:.4}, {:.4}", s.lat, s.lon),
            })
            .collect();

        let departures = screen
            .departures
            .iter()
            .map(|d| DepartureRow {
                date: d.display_date(),
                time: d.display_time(),
                name: d.name.clone(),
                kind: d.kind.clone(),
                track: d.display_track().to_string(),
                stop_name: d.stop_name.clone(),
            })
            .collect();

        Self {
            date: screen.board_date.format("%d.%m.%Y %H:%M").to_string(),
            stations,
            departures,
            stations_busy: screen.stations_busy,
            departures_busy: screen.departures_busy,
            status: screen.status.unwrap_or_default().to_string(),
            about: screen.about.unwrap_or_default().to_string(),
        }
    }
}

/// Render a screen, falling back to the template error text.
pub fn render_screen(screen: &Screen<'_>) -> String {
    ScreenTemplate::from_screen(screen)
        .render()
        .unwrap_or_else(|e| format!("Template error: {}", e))
}

pub fn render_help() -> String {
    HelpTemplate
        .render()
        .unwrap_or_else(|e| format!("Template error: {}", e))
}
