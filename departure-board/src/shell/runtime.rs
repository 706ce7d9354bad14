//! Background execution of shell requests.
//!
//! Each request runs as its own tokio task inside a fresh fetch session.
//! Results travel back to the event loop over a channel and are applied
//! there, so the shell and its view are only ever touched from one task.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::debug;

use crate::api::TimetableSource;
use crate::session::{Connect, FetchSession};

use super::message::{Action, Request, Update};
use super::state::{Shell, View};

/// Capacity of the update channel.
const UPDATE_CAPACITY: usize = 32;

/// Perform one request in its own session.
pub async fn execute<C>(session: &FetchSession<C>, request: Request) -> Update
where
    C: Connect,
    C::Client: TimetableSource,
{
    match request {
        Request::Locations { generation, name } => Update::Stations {
            generation,
            result: session
                .run(|client| async move { client.locations(&name).await })
                .await,
        },
        Request::Board {
            generation,
            id,
            date,
        } => Update::Departures {
            generation,
            result: session
                .run(|client| async move { client.departure_board(id, &date).await })
                .await,
        },
        Request::BoardAt {
            generation,
            id,
            date,
        } => Update::Departures {
            generation,
            result: session
                .run(|client| async move {
                    client
                        .departure_board_date_time(id, &date)
                        .await
                        .map(|departure| vec![departure])
                })
                .await,
        },
        Request::About => Update::About(
            session
                .run(|client| async move { client.about().await })
                .await,
        ),
    }
}

/// Drive `shell` from `actions` until the action channel closes.
///
/// Requests run concurrently in the background; their results are applied
/// here in completion order, and the generation check in the shell drops
/// superseded ones. Once `actions` closes, outstanding requests are still
/// awaited and applied before returning.
pub async fn run<C, V>(
    shell: &mut Shell<V>,
    session: Arc<FetchSession<C>>,
    mut actions: mpsc::Receiver<Action>,
) where
    C: Connect + Send + Sync + 'static,
    C::Client: TimetableSource + Send + Sync + 'static,
    V: View,
{
    let (tx, mut updates) = mpsc::channel(UPDATE_CAPACITY);
    // Dropped once input ends, so `updates` closes when the last task does.
    let mut tx = Some(tx);

    loop {
        tokio::select! {
            action = actions.recv(), if tx.is_some() => match action {
                Some(action) => {
                    if let (Some(request), Some(tx)) = (shell.handle(action), tx.as_ref()) {
                        spawn_request(Arc::clone(&session), request, tx.clone());
                    }
                }
                None => {
                    debug!("input closed, draining outstanding requests");
                    tx = None;
                }
            },
            update = updates.recv() => match update {
                Some(update) => shell.apply(update),
                None => break,
            },
        }
    }
}

fn spawn_request<C>(session: Arc<FetchSession<C>>, request: Request, tx: mpsc::Sender<Update>)
where
    C: Connect + Send + Sync + 'static,
    C::Client: TimetableSource + Send + Sync + 'static,
{
    tokio::spawn(async move {
        let update = execute(&session, request).await;
        if tx.send(update).await.is_err() {
            debug!("shell gone, dropping update");
        }
    });
}
