use std::sync::Arc;

use chrono::Local;
use tokio::io::BufReader;
use tokio::sync::{mpsc, watch};
use tracing::info;
use tracing_subscriber::EnvFilter;

use departure_board::config::Settings;
use departure_board::session::FetchSession;
use departure_board::shell::terminal::{TerminalView, read_commands};
use departure_board::shell::{Shell, render_help, run};

/// Pending actions before input stalls.
const ACTION_CAPACITY: usize = 16;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("departure_board=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let settings = Settings::from_env().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(2);
    });

    if settings.api.api_key.is_none() {
        info!("no API key configured, requests are sent unauthenticated");
    }
    info!(base_url = %settings.api.base_url, "starting departure board");

    let session =
        Arc::new(FetchSession::new(settings.api).with_close_timeout(settings.close_timeout));
    info!(
        close_timeout_ms = session.close_timeout().as_millis() as u64,
        "sessions configured"
    );

    let (ids_tx, ids_rx) = watch::channel(Vec::new());
    let (actions_tx, actions_rx) = mpsc::channel(ACTION_CAPACITY);

    println!("{}", render_help());

    let mut shell = Shell::new(
        TerminalView::new(std::io::stdout(), ids_tx),
        Local::now().naive_local(),
    );

    let input = tokio::spawn(read_commands(
        BufReader::new(tokio::io::stdin()),
        actions_tx,
        ids_rx,
        std::io::stdout(),
    ));

    run(&mut shell, session, actions_rx).await;

    match input.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => eprintln!("Error reading input: {e}"),
        Err(e) => eprintln!("Input task failed: {e}"),
    }
}
