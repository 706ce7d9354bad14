//! Fetch sessions.
//!
//! A session is the lifetime of one client instance: it is built, used for
//! one logical operation, then shut down. Shutdown is bounded by a timeout;
//! a close that takes longer is cancelled so a slow teardown cannot hold up
//! the caller, and the operation's result is returned either way.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use crate::api::{ApiClient, ApiConfig, ApiError};

/// Default bound on graceful shutdown.
pub const DEFAULT_CLOSE_TIMEOUT: Duration = Duration::from_millis(3000);

/// Builds a fresh client for each session.
pub trait Connect {
    type Client: Shutdown + Clone;

    fn connect(&self) -> Result<Self::Client, ApiError>;
}

/// Graceful close of a client.
pub trait Shutdown {
    fn shutdown(self) -> impl Future<Output = Result<(), ApiError>> + Send;
}

impl Connect for ApiConfig {
    type Client = ApiClient;

    fn connect(&self) -> Result<ApiClient, ApiError> {
        ApiClient::new(self.clone())
    }
}

impl Shutdown for ApiClient {
    async fn shutdown(self) -> Result<(), ApiError> {
        // The connection pool is torn down when its last handle drops.
        drop(self);
        tokio::task::yield_now().await;
        Ok(())
    }
}

/// Runs operations against freshly connected clients.
#[derive(Debug, Clone)]
pub struct FetchSession<C> {
    connector: C,
    close_timeout: Duration,
}

impl<C: Connect> FetchSession<C> {
    /// Create a session factory with the default close timeout.
    pub fn new(connector: C) -> Self {
        Self {
            connector,
            close_timeout: DEFAULT_CLOSE_TIMEOUT,
        }
    }

    /// Set the bound on graceful shutdown.
    pub fn with_close_timeout(mut self, timeout: Duration) -> Self {
        self.close_timeout = timeout;
        self
    }

    pub fn close_timeout(&self) -> Duration {
        self.close_timeout
    }

    /// Connect, run `body`, then close the client.
    ///
    /// The client is closed whether `body` succeeded or not, and the
    /// result of `body` is returned unchanged. Shutdown failures and
    /// timeouts are logged, never returned.
    pub async fn run<T, F, Fut>(&self, body: F) -> Result<T, ApiError>
    where
        F: FnOnce(C::Client) -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let client = self.connector.connect()?;
        let result = body(client.clone()).await;

        match tokio::time::timeout(self.close_timeout, client.shutdown()).await {
            Ok(Ok(())) => debug!("session closed"),
            Ok(Err(e)) => warn!(error = %e, "session close failed"),
            Err(_) => warn!(
                timeout_ms = self.close_timeout.as_millis() as u64,
                "session close timed out, cancelled"
            ),
        }

        result
    }
}

/// Run `body` in a session against the timetable API described by `config`.
pub async fn with_session<T, F, Fut>(config: &ApiConfig, body: F) -> Result<T, ApiError>
where
    F: FnOnce(ApiClient) -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    FetchSession::new(config.clone()).run(body).await
}
