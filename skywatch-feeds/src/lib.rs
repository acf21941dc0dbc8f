//! # skywatch-feeds
//!
//! Collectors for the four read-only feeds behind the skywatch dashboard.
//!
//! The [`Feeds`] trait is the fetch seam the poller drives. [`http::HttpFeeds`]
//! (`http` feature, on by default) implements it against the dashboard's JSON
//! routes; tests substitute scripted implementations.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use skywatch_feeds::http::HttpFeeds;
//! use skywatch_feeds::Feeds;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let feeds = HttpFeeds::builder()
//!         .base_url("http://localhost:8000/api")
//!         .timeout(Duration::from_secs(4))
//!         .build()?;
//!
//!     let streams = feeds.streams().await?;
//!     println!("{} streams", streams.len());
//!     Ok(())
//! }
//! ```

use std::fmt;

use async_trait::async_trait;

use skywatch_types::wire::TelemetryPayload;
use skywatch_types::{HealthReport, StreamRecord};

pub mod error;

#[cfg(feature = "http")]
pub mod http;

pub use error::FeedError;

/// The independently polled data sources.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum FeedKind {
    Streams,
    Telemetry,
    Events,
    Health,
}

impl FeedKind {
    /// Every feed, in display order.
    pub const ALL: [FeedKind; 4] = [
        FeedKind::Streams,
        FeedKind::Telemetry,
        FeedKind::Events,
        FeedKind::Health,
    ];

    /// Lowercase name, also the route path relative to the base URL.
    pub fn name(&self) -> &'static str {
        match self {
            FeedKind::Streams => "streams",
            FeedKind::Telemetry => "telemetry",
            FeedKind::Events => "events",
            FeedKind::Health => "health",
        }
    }
}

impl fmt::Display for FeedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Fetch functions for every feed.
///
/// Each call performs one request and returns the decoded payload. Calls are
/// independent: implementations must not share failure state between feeds.
#[async_trait]
pub trait Feeds: Send + Sync + fmt::Debug {
    /// Current media paths.
    async fn streams(&self) -> Result<Vec<StreamRecord>, FeedError>;

    /// Current telemetry in whichever shape the endpoint serves.
    async fn telemetry(&self) -> Result<TelemetryPayload, FeedError>;

    /// Tail of the event log, oldest first.
    async fn events(&self) -> Result<Vec<String>, FeedError>;

    /// Liveness probe.
    async fn health(&self) -> Result<HealthReport, FeedError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feed_names_are_route_paths() {
        let names: Vec<&str> = FeedKind::ALL.iter().map(FeedKind::name).collect();
        assert_eq!(names, vec!["streams", "telemetry", "events", "health"]);
        assert_eq!(FeedKind::Health.to_string(), "health");
    }
}
