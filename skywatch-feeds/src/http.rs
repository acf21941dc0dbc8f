//! HTTP collectors for the dashboard's JSON routes.
//!
//! All four feeds are plain `GET` requests relative to one base URL:
//!
//! | Feed | Route | Payload |
//! |---|---|---|
//! | streams | `{base}/streams` | array of stream records |
//! | telemetry | `{base}/telemetry` | single fix or fleet map |
//! | events | `{base}/events` | array of log lines |
//! | health | `{base}/health` | `{ "status": "ok" }` |
//!
//! ## Example
//!
//! ```rust,no_run
//! use skywatch_feeds::http::HttpFeeds;
//! use skywatch_feeds::Feeds;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let feeds = HttpFeeds::builder().base_url("http://dashboard.local/api").build()?;
//!
//!     let report = feeds.health().await?;
//!     println!("media server: {}", report.status);
//!     Ok(())
//! }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;

use skywatch_types::wire::TelemetryPayload;
use skywatch_types::{HealthReport, StreamRecord};

use crate::{FeedError, FeedKind, Feeds};

/// Default base URL of the dashboard API.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(4);

/// Feed collector backed by a shared reqwest client.
#[derive(Debug, Clone)]
pub struct HttpFeeds {
    client: Client,
    base_url: String,
}

impl HttpFeeds {
    /// Create a new builder for configuring the collector.
    pub fn builder() -> HttpFeedsBuilder {
        HttpFeedsBuilder::default()
    }

    /// The base URL all routes are resolved against.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL of a feed's route.
    pub fn url(&self, feed: FeedKind) -> String {
        format!("{}/{}", self.base_url, feed.name())
    }

    async fn get_json<T: DeserializeOwned>(&self, feed: FeedKind) -> Result<T, FeedError> {
        let response = self.client.get(self.url(feed)).send().await?;

        if !response.status().is_success() {
            return Err(FeedError::BadStatus(response.status().as_u16()));
        }

        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl Feeds for HttpFeeds {
    async fn streams(&self) -> Result<Vec<StreamRecord>, FeedError> {
        self.get_json(FeedKind::Streams).await
    }

    async fn telemetry(&self) -> Result<TelemetryPayload, FeedError> {
        self.get_json(FeedKind::Telemetry).await
    }

    async fn events(&self) -> Result<Vec<String>, FeedError> {
        self.get_json(FeedKind::Events).await
    }

    async fn health(&self) -> Result<HealthReport, FeedError> {
        self.get_json(FeedKind::Health).await
    }
}

/// Builder for HttpFeeds.
#[derive(Debug, Default)]
pub struct HttpFeedsBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
}

impl HttpFeedsBuilder {
    /// Set the API base URL (e.g., "http://localhost:8000/api").
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the request timeout (default: 4 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the collector.
    pub fn build(self) -> Result<HttpFeeds, FeedError> {
        let client = Client::builder()
            .timeout(self.timeout.unwrap_or(DEFAULT_TIMEOUT))
            .build()
            .map_err(|e| FeedError::Client(e.to_string()))?;

        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(HttpFeeds { client, base_url })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve exactly one canned HTTP response on an ephemeral port.
    async fn serve_once(status: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 4096];
            let mut request = Vec::new();
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                request.extend_from_slice(&buf[..n]);
                if n == 0 || request.windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }
            let response = format!(
                "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
        });

        format!("http://{}", addr)
    }

    #[test]
    fn test_builder_defaults() {
        let feeds = HttpFeeds::builder().build().unwrap();
        assert_eq!(feeds.base_url(), "http://localhost:8000/api");
        assert_eq!(feeds.url(FeedKind::Streams), "http://localhost:8000/api/streams");
    }

    #[test]
    fn test_builder_trims_trailing_slash() {
        let feeds = HttpFeeds::builder()
            .base_url("http://dashboard.local/api/")
            .build()
            .unwrap();
        assert_eq!(feeds.url(FeedKind::Health), "http://dashboard.local/api/health");
    }

    #[tokio::test]
    async fn test_streams_decoded() {
        let base = serve_once(
            "200 OK",
            r#"[{"path":"cam1","publishers":1,"readers":0,"rtsp_url":"rtsp://localhost:8554/cam1"}]"#,
        )
        .await;
        let feeds = HttpFeeds::builder().base_url(base).build().unwrap();

        let streams = feeds.streams().await.unwrap();
        assert_eq!(streams.len(), 1);
        assert_eq!(streams[0].path, "cam1");
        assert_eq!(streams[0].publisher_count, 1);
    }

    #[tokio::test]
    async fn test_legacy_telemetry_decoded() {
        let base = serve_once(
            "200 OK",
            r#"{"lat":55.76,"lon":37.61,"alt":120.0,"speed":15,"heading":5}"#,
        )
        .await;
        let feeds = HttpFeeds::builder().base_url(base).build().unwrap();

        let payload = feeds.telemetry().await.unwrap();
        assert!(matches!(payload, TelemetryPayload::Single(_)));
    }

    #[tokio::test]
    async fn test_bad_status() {
        let base = serve_once("503 Service Unavailable", "{}").await;
        let feeds = HttpFeeds::builder().base_url(base).build().unwrap();

        let err = feeds.health().await.unwrap_err();
        assert_eq!(err, FeedError::BadStatus(503));
    }

    #[tokio::test]
    async fn test_malformed_payload() {
        let base = serve_once("200 OK", r#"{"not":"a list"}"#).await;
        let feeds = HttpFeeds::builder().base_url(base).build().unwrap();

        let err = feeds.events().await.unwrap_err();
        assert!(matches!(err, FeedError::Parse(_)));
    }

    #[tokio::test]
    async fn test_truncated_body() {
        let base = serve_once("200 OK", r#"["boot", "rea"#).await;
        let feeds = HttpFeeds::builder().base_url(base).build().unwrap();

        let err = feeds.events().await.unwrap_err();
        assert_eq!(err.category(), "parse");
    }

    #[tokio::test]
    async fn test_connection_refused() {
        // Bind then drop to get a port nothing listens on.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let feeds = HttpFeeds::builder()
            .base_url(format!("http://{}", addr))
            .build()
            .unwrap();

        let err = feeds.streams().await.unwrap_err();
        assert_eq!(err.category(), "fetch");
    }
}
