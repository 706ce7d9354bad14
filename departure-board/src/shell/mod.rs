//! UI shell.
//!
//! The widget toolkit is kept behind [`View`]; the shell decides what to
//! fetch and how results land in the two tables. [`run`] is the event loop
//! tying user actions, background requests and the view together, and
//! [`terminal`] is a text front end for it.

mod message;
mod render;
mod runtime;
mod state;
pub mod terminal;

pub use message::{Action, Pane, Request, Update};
pub use render::{HelpTemplate, ScreenTemplate, render_help, render_screen};
pub use runtime::{execute, run};
pub use state::{Screen, Shell, View};
