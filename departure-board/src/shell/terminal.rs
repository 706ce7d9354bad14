//! Line-oriented terminal front end.
//!
//! Commands are read from stdin and turned into shell actions; the view
//! redraws both panes after every change.

use std::io::Write;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::{mpsc, watch};
use tracing::{trace, warn};

use super::message::{Action, Pane};
use super::render::{render_help, render_screen};
use super::state::{Screen, View};

/// Errors from parsing a command line.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("unknown command '{0}' (type 'help')")]
    Unknown(String),

    #[error("usage: {0}")]
    MissingArgument(&'static str),

    #[error("invalid row '{0}'")]
    InvalidRow(String),

    #[error("no station in row {0}")]
    NoSuchRow(usize),
}

/// A parsed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Forward directly to the shell.
    Action(Action),
    /// Activate a station row (1-based).
    Open { row: usize, exact: bool },
    Help,
    Quit,
    /// Blank line.
    Nothing,
}

/// Parse one line of input.
pub fn parse_command(line: &str) -> Result<Command, CommandError> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    match word {
        "" => Ok(Command::Nothing),
        "search" | "s" => {
            if rest.is_empty() {
                return Err(CommandError::MissingArgument("search <name>"));
            }
            Ok(Command::Action(Action::SearchStations {
                query: rest.to_string(),
            }))
        }
        "date" | "d" => {
            if rest.is_empty() {
                return Err(CommandError::MissingArgument("date <value>"));
            }
            Ok(Command::Action(Action::SetDate {
                value: rest.to_string(),
            }))
        }
        "open" | "o" => {
            parse_row(rest, "open <row>").map(|row| Command::Open { row, exact: false })
        }
        "exact" | "x" => {
            parse_row(rest, "exact <row>").map(|row| Command::Open { row, exact: true })
        }
        "about" => Ok(Command::Action(Action::About)),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" | "q" => Ok(Command::Quit),
        other => Err(CommandError::Unknown(other.to_string())),
    }
}

fn parse_row(arg: &str, usage: &'static str) -> Result<usize, CommandError> {
    if arg.is_empty() {
        return Err(CommandError::MissingArgument(usage));
    }
    match arg.parse::<usize>() {
        Ok(row) if row > 0 => Ok(row),
        _ => Err(CommandError::InvalidRow(arg.to_string())),
    }
}

/// Turn a parsed command into a shell action, resolving station rows
/// against the ids currently on screen.
fn resolve(command: Command, station_ids: &[i64]) -> Result<Option<Action>, CommandError> {
    match command {
        Command::Action(action) => Ok(Some(action)),
        Command::Open { row, exact } => {
            let id = *station_ids
                .get(row - 1)
                .ok_or(CommandError::NoSuchRow(row))?;
            Ok(Some(if exact {
                Action::OpenStationAt { id }
            } else {
                Action::OpenStation { id }
            }))
        }
        Command::Help | Command::Quit | Command::Nothing => Ok(None),
    }
}

/// Read commands from `input` until `quit` or end of input.
///
/// Dropping `actions` on return lets the event loop finish.
pub async fn read_commands<R, W>(
    input: R,
    actions: mpsc::Sender<Action>,
    station_ids: watch::Receiver<Vec<i64>>,
    mut out: W,
) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();

    while let Some(line) = lines.next_line().await? {
        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(e) => {
                writeln!(out, "{e}")?;
                continue;
            }
        };

        match command {
            Command::Quit => break,
            Command::Help => {
                writeln!(out, "{}", render_help())?;
                continue;
            }
            _ => {}
        }

        let resolved = resolve(command, &station_ids.borrow());
        match resolved {
            Ok(Some(action)) => {
                if actions.send(action).await.is_err() {
                    break;
                }
            }
            Ok(None) => {}
            Err(e) => writeln!(out, "{e}")?,
        }
    }

    Ok(())
}

/// Renders the shell as text.
///
/// Publishes the ids of the listed stations so typed row numbers can be
/// resolved by [`read_commands`].
pub struct TerminalView<W> {
    out: W,
    station_ids: watch::Sender<Vec<i64>>,
}

impl<W: Write> TerminalView<W> {
    pub fn new(out: W, station_ids: watch::Sender<Vec<i64>>) -> Self {
        Self { out, station_ids }
    }
}

impl<W: Write> View for TerminalView<W> {
    fn row_removed(&mut self, pane: Pane, index: usize) {
        trace!(%pane, index, "row removed");
    }

    fn row_inserted(&mut self, pane: Pane, index: usize) {
        trace!(%pane, index, "row inserted");
    }

    fn set_busy(&mut self, pane: Pane, busy: bool) {
        trace!(%pane, busy, "busy");
    }

    fn show_status(&mut self, _message: &str) {}

    fn clear_status(&mut self) {}

    fn show_about(&mut self, _text: &str) {}

    fn refresh(&mut self, screen: &Screen<'_>) {
        self.station_ids
            .send_replace(screen.stations.iter().map(|s| s.id).collect());

        let rendered = render_screen(screen);
        if let Err(e) = writeln!(self.out, "{rendered}").and_then(|()| self.out.flush()) {
            warn!(error = %e, "failed to draw screen");
        }
    }
}
