//! Timetable API error types.

/// Errors from the timetable API client.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Transport failure (connection refused, timeout, TLS, ...)
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Response body did not match the expected schema
    #[error("could not decode response: {message}")]
    Decode {
        message: String,
        body: Option<String>,
    },

    /// The API answered with an error status and a human-readable message
    #[error("{message}")]
    Server { status: u16, message: String },

    /// A path segment the URL parser would resolve away (`.` or `..`)
    #[error("'{0}' cannot be sent as a path segment")]
    DotSegment(String),

    /// Client could not be built from its configuration
    #[error("invalid client configuration: {message}")]
    Config { message: String },
}

impl ApiError {
    /// Build a decode error, keeping a short excerpt of the offending body.
    pub(crate) fn decode(err: impl std::fmt::Display, body: &str) -> Self {
        ApiError::Decode {
            message: err.to_string(),
            body: Some(body.chars().take(500).collect()),
        }
    }
}
