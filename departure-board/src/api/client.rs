//! Timetable API HTTP client.
//!
//! Issues plain GET requests and decodes the JSON bodies into domain types.
//! Every call is a single attempt.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::domain::{Departure, Location};

use super::error::ApiError;
use super::source::TimetableSource;

/// Default base URL of the public timetable API.
pub const DEFAULT_BASE_URL: &str = "https://api.deutschebahn.com/freeplan/v1";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for the timetable client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Base URL; endpoint paths are appended to it
    pub base_url: String,
    /// Optional API key, sent as a bearer token
    pub api_key: Option<String>,
    /// URL fetched by the "about" diagnostic (defaults to the base URL)
    pub about_url: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl ApiConfig {
    /// Create a config pointing at the public API without a key.
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            about_url: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Set a custom base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the API key.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the URL used by the about diagnostic.
    pub fn with_about_url(mut self, url: impl Into<String>) -> Self {
        self.about_url = Some(url.into());
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Error bodies the provider is known to send.
#[derive(Deserialize)]
#[serde(untagged)]
enum ErrorBody {
    Flat { message: String },
    Nested { error: NestedError },
}

#[derive(Deserialize)]
struct NestedError {
    message: String,
}

/// Timetable API client.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    about_url: Url,
}

impl ApiClient {
    /// Create a new client with the given configuration.
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();

        if let Some(key) = &config.api_key {
            let value =
                HeaderValue::from_str(&format!("Bearer {key}")).map_err(|_| ApiError::Config {
                    message: "API key is not a valid header value".to_string(),
                })?;
            headers.insert(AUTHORIZATION, value);
        }

        let base_url = parse_url(&config.base_url)?;
        let about_url = match &config.about_url {
            Some(url) => parse_url(url)?,
            None => base_url.clone(),
        };

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url,
            about_url,
        })
    }

    /// Append path segments to the base URL, percent-encoding each one.
    ///
    /// `.` and `..` are rejected: the URL parser treats them as relative
    /// steps even when percent-encoded, so they would address another
    /// resource.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        if let Some(dots) = segments.iter().find(|s| matches!(**s, "." | "..")) {
            return Err(ApiError::DotSegment(dots.to_string()));
        }

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::Config {
                message: format!("{} cannot be used as a base URL", self.base_url),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// GET `url` and return the body of a successful response.
    async fn get_body(&self, url: Url) -> Result<String, ApiError> {
        debug!(%url, "GET");

        let response = self.http.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Server {
                status: status.as_u16(),
                message: server_message(status, &body),
            });
        }

        Ok(response.text().await?)
    }

    fn board_url(&self, id: i64, date: &str) -> Result<Url, ApiError> {
        let id = id.to_string();
        let mut url = self.endpoint(&["departureBoard", id.as_str()])?;
        url.query_pairs_mut().append_pair("date", date);
        Ok(url)
    }

    /// Search stations by name.
    pub async fn locations(&self, name: &str) -> Result<Vec<Location>, ApiError> {
        let url = self.endpoint(&["location", name])?;
        let body = self.get_body(url).await?;
        decode(&body)
    }

    /// Get the departure board of a station from `date` onwards.
    pub async fn departure_board(&self, id: i64, date: &str) -> Result<Vec<Departure>, ApiError> {
        let url = self.board_url(id, date)?;
        let body = self.get_body(url).await?;
        decode(&body)
    }

    /// Get the one departure of a station at exactly `date`.
    ///
    /// The provider answers either with a bare object or a one-element
    /// list; anything else is a decode error.
    pub async fn departure_board_date_time(
        &self,
        id: i64,
        date: &str,
    ) -> Result<Departure, ApiError> {
        let url = self.board_url(id, date)?;
        let body = self.get_body(url).await?;

        let value = match decode::<serde_json::Value>(&body)? {
            serde_json::Value::Array(mut items) if items.len() == 1 => items.remove(0),
            serde_json::Value::Array(items) => {
                return Err(ApiError::decode(
                    format!("expected exactly one departure, got {}", items.len()),
                    &body,
                ));
            }
            other => other,
        };

        serde_json::from_value(value).map_err(|e| ApiError::decode(e, &body))
    }

    /// Fetch the about URL and return its body verbatim.
    pub async fn about(&self) -> Result<String, ApiError> {
        self.get_body(self.about_url.clone()).await
    }
}

impl TimetableSource for ApiClient {
    async fn locations(&self, name: &str) -> Result<Vec<Location>, ApiError> {
        ApiClient::locations(self, name).await
    }

    async fn departure_board(&self, id: i64, date: &str) -> Result<Vec<Departure>, ApiError> {
        ApiClient::departure_board(self, id, date).await
    }

    async fn departure_board_date_time(&self, id: i64, date: &str) -> Result<Departure, ApiError> {
        ApiClient::departure_board_date_time(self, id, date).await
    }

    async fn about(&self) -> Result<String, ApiError> {
        ApiClient::about(self).await
    }
}

fn parse_url(raw: &str) -> Result<Url, ApiError> {
    let url = Url::parse(raw).map_err(|e| ApiError::Config {
        message: format!("invalid URL '{raw}': {e}"),
    })?;

    if url.cannot_be_a_base() {
        return Err(ApiError::Config {
            message: format!("{raw} cannot be used as a base URL"),
        });
    }

    Ok(url)
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::decode(e, body))
}

/// Human-readable message for an error response.
///
/// Prefers a JSON `message`, then the raw text, then the status reason.
fn server_message(status: StatusCode, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        return match parsed {
            ErrorBody::Flat { message } => message,
            ErrorBody::Nested { error } => error.message,
        };
    }

    let text = body.trim();
    if !text.is_empty() {
        return text.to_string();
    }

    status
        .canonical_reason()
        .unwrap_or("request failed")
        .to_string()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use axum::extract::{Path, Query};
    use axum::http::HeaderMap as AxumHeaders;
    use axum::response::IntoResponse;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;

    use super::*;

    /// Serve `router` on an ephemeral local port and return its base URL.
    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn client(base_url: &str) -> ApiClient {
        ApiClient::new(ApiConfig::new().with_base_url(base_url).with_timeout(5)).unwrap()
    }

    fn departure_json(name: &str, time: &str) -> serde_json::Value {
        json!({
            "name": name,
            "type": "ICE",
            "boardId": 8000105,
            "stopId": 8000105,
            "stopName": "Frankfurt(Main)Hbf",
            "dateTime": time,
            "track": "7",
            "detailsId": "d1"
        })
    }

    #[test]
    fn config_builder() {
        let config = ApiConfig::new()
            .with_base_url("http://localhost:8080")
            .with_api_key("secret")
            .with_about_url("http://localhost:8080/about")
            .with_timeout(60);

        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.api_key.as_deref(), Some("secret"));
        assert_eq!(config.about_url.as_deref(), Some("http://localhost:8080/about"));
        assert_eq!(config.timeout_secs, 60);
    }

    #[test]
    fn config_defaults() {
        let config = ApiConfig::default();

        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.api_key, None);
        assert_eq!(config.about_url, None);
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn invalid_base_url_is_config_error() {
        let err = ApiClient::new(ApiConfig::new().with_base_url("not a url")).unwrap_err();
        assert!(matches!(err, ApiError::Config { .. }));

        let err = ApiClient::new(ApiConfig::new().with_base_url("mailto:a@b.c")).unwrap_err();
        assert!(matches!(err, ApiError::Config { .. }));
    }

    #[test]
    fn invalid_api_key_is_config_error() {
        let err = ApiClient::new(ApiConfig::new().with_api_key("bad\nkey")).unwrap_err();
        assert!(matches!(err, ApiError::Config { .. }));
    }

    #[test]
    fn endpoint_encodes_segments() {
        let client = client("http://localhost:8080/v1/");
        let url = client.endpoint(&["location", "Frankfurt Hbf/Süd"]).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/v1/location/Frankfurt%20Hbf%2FS%C3%BCd"
        );
    }

    #[test]
    fn endpoint_rejects_dot_segments() {
        let client = client("http://localhost:8080/v1/");

        for name in [".", ".."] {
            match client.endpoint(&["location", name]) {
                Err(ApiError::DotSegment(segment)) => assert_eq!(segment, name),
                other => panic!("unexpected result for {name:?}: {other:?}"),
            }
        }

        let url = client.endpoint(&["location", "..."]).unwrap();
        assert_eq!(url.path(), "/v1/location/...");
        let url = client.endpoint(&["location", ".Hbf"]).unwrap();
        assert_eq!(url.path(), "/v1/location/.Hbf");
    }

    #[test]
    fn board_url_carries_date() {
        let client = client("http://localhost:8080");
        let url = client.board_url(8000105, "2021-03-02T09:05").unwrap();
        assert_eq!(url.path(), "/departureBoard/8000105");
        assert_eq!(
            url.query_pairs().collect::<Vec<_>>(),
            vec![("date".into(), "2021-03-02T09:05".into())]
        );
    }

    #[test]
    fn server_message_sources() {
        let status = StatusCode::TOO_MANY_REQUESTS;
        assert_eq!(
            server_message(status, r#"{"message": "rate limited"}"#),
            "rate limited"
        );
        assert_eq!(
            server_message(status, r#"{"error": {"code": 900, "message": "rate limited"}}"#),
            "rate limited"
        );
        assert_eq!(server_message(status, " rate limited\n"), "rate limited");
        assert_eq!(server_message(status, ""), "Too Many Requests");
    }

    #[tokio::test]
    async fn locations_decodes_list() {
        let router = Router::new().route(
            "/location/:name",
            get(|Path(name): Path<String>| async move {
                Json(json!([
                    {"id": 8000105, "name": name, "lon": 8.663785, "lat": 50.107149}
                ]))
            }),
        );
        let base = serve(router).await;

        let locations = client(&base).locations("Frankfurt Hbf").await.unwrap();
        assert_eq!(
            locations,
            vec![Location::new(8000105, "Frankfurt Hbf", 8.663785, 50.107149)]
        );
    }

    #[tokio::test]
    async fn dot_only_search_never_reaches_the_server() {
        let hits = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let counter = hits.clone();
        let router = Router::new().fallback(move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                Json(json!([]))
            }
        });
        let base = serve(router).await;
        let client = client(&format!("{base}/v1"));

        for name in [".", ".."] {
            let err = client.locations(name).await.unwrap_err();
            assert!(matches!(err, ApiError::DotSegment(_)), "got {err:?}");
        }
        assert_eq!(hits.load(std::sync::atomic::Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn locations_schema_mismatch_is_decode_error() {
        let router = Router::new().route(
            "/location/:name",
            get(|| async { Json(json!({"unexpected": true})) }),
        );
        let base = serve(router).await;

        let err = client(&base).locations("x").await.unwrap_err();
        assert!(matches!(err, ApiError::Decode { .. }), "got {err:?}");
    }

    #[tokio::test]
    async fn server_error_carries_message() {
        let router = Router::new().route(
            "/location/:name",
            get(|| async {
                (
                    axum::http::StatusCode::TOO_MANY_REQUESTS,
                    Json(json!({"error": {"message": "rate limited"}})),
                )
                    .into_response()
            }),
        );
        let base = serve(router).await;

        match client(&base).locations("x").await.unwrap_err() {
            ApiError::Server { status, message } => {
                assert_eq!(status, 429);
                assert_eq!(message, "rate limited");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn unreachable_server_is_network_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = client(&format!("http://{addr}"))
            .locations("x")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Network(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn departure_board_sends_date() {
        let router = Router::new().route(
            "/departureBoard/:id",
            get(
                |Path(id): Path<i64>, Query(params): Query<HashMap<String, String>>| async move {
                    let date = params.get("date").cloned().unwrap_or_default();
                    assert_eq!(id, 8000105);
                    Json(json!([
                        departure_json("ICE 1", &date),
                        departure_json("ICE 2", "2021-03-02T10:15")
                    ]))
                },
            ),
        );
        let base = serve(router).await;

        let departures = client(&base)
            .departure_board(8000105, "2021-03-02T09:05")
            .await
            .unwrap();
        assert_eq!(departures.len(), 2);
        assert_eq!(departures[0].name, "ICE 1");
        assert_eq!(departures[0].display_time(), "09:05");
        assert_eq!(departures[1].display_time(), "10:15");
    }

    #[tokio::test]
    async fn departure_board_date_time_accepts_object_or_singleton() {
        let router = Router::new()
            .route(
                "/departureBoard/1",
                get(|| async { Json(departure_json("ICE 1", "2021-03-02T09:05")) }),
            )
            .route(
                "/departureBoard/2",
                get(|| async { Json(json!([departure_json("ICE 2", "2021-03-02T09:05")])) }),
            );
        let base = serve(router).await;
        let client = client(&base);

        let single = client
            .departure_board_date_time(1, "2021-03-02T09:05")
            .await
            .unwrap();
        assert_eq!(single.name, "ICE 1");

        let singleton = client
            .departure_board_date_time(2, "2021-03-02T09:05")
            .await
            .unwrap();
        assert_eq!(singleton.name, "ICE 2");
    }

    #[tokio::test]
    async fn departure_board_date_time_rejects_zero_or_many() {
        let router = Router::new()
            .route("/departureBoard/1", get(|| async { Json(json!([])) }))
            .route(
                "/departureBoard/2",
                get(|| async {
                    Json(json!([
                        departure_json("ICE 1", "2021-03-02T09:05"),
                        departure_json("ICE 2", "2021-03-02T09:05")
                    ]))
                }),
            );
        let base = serve(router).await;
        let client = client(&base);

        for id in [1, 2] {
            let err = client
                .departure_board_date_time(id, "2021-03-02T09:05")
                .await
                .unwrap_err();
            assert!(matches!(err, ApiError::Decode { .. }), "got {err:?}");
        }
    }

    #[tokio::test]
    async fn api_key_sent_as_bearer_token() {
        let router = Router::new().route(
            "/location/:name",
            get(|headers: AxumHeaders| async move {
                let auth = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("none")
                    .to_string();
                Json(json!([{"id": 1, "name": auth, "lon": 0.0, "lat": 0.0}]))
            }),
        );
        let base = serve(router).await;

        let keyed = ApiClient::new(ApiConfig::new().with_base_url(&base).with_api_key("k3y"))
            .unwrap();
        let locations = keyed.locations("x").await.unwrap();
        assert_eq!(locations[0].name, "Bearer k3y");

        let locations = client(&base).locations("x").await.unwrap();
        assert_eq!(locations[0].name, "none");
    }

    #[tokio::test]
    async fn about_returns_body_verbatim() {
        let router = Router::new().route("/about", get(|| async { "<h1>Timetable</h1>\n" }));
        let base = serve(router).await;

        let client = ApiClient::new(
            ApiConfig::new()
                .with_base_url(&base)
                .with_about_url(format!("{base}/about")),
        )
        .unwrap();

        assert_eq!(client.about().await.unwrap(), "<h1>Timetable</h1>\n");
    }
}
