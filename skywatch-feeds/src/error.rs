//! Error types for feed collection.

use thiserror::Error;

/// Errors that can occur while fetching a feed.
///
/// Every variant is local to one feed and one tick: the poller records the
/// message and tries again on the next tick.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeedError {
    /// Network-level failure (connection refused, reset, DNS).
    #[error("Request failed: {0}")]
    Fetch(String),

    /// The request did not complete within the client timeout.
    #[error("Request timed out")]
    Timeout,

    /// The endpoint answered with a non-success status.
    #[error("Endpoint returned status {0}")]
    BadStatus(u16),

    /// The payload did not match the expected shape.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// The HTTP client could not be constructed.
    #[error("Client setup failed: {0}")]
    Client(String),
}

impl FeedError {
    /// Short category name for logs.
    pub fn category(&self) -> &'static str {
        match self {
            FeedError::Fetch(_) | FeedError::Timeout => "fetch",
            FeedError::BadStatus(_) => "status",
            FeedError::Parse(_) => "parse",
            FeedError::Client(_) => "client",
        }
    }
}

impl From<serde_json::Error> for FeedError {
    fn from(err: serde_json::Error) -> Self {
        FeedError::Parse(err.to_string())
    }
}

#[cfg(feature = "http")]
impl From<reqwest::Error> for FeedError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FeedError::Timeout
        } else if err.is_decode() {
            FeedError::Parse(err.to_string())
        } else if let Some(status) = err.status() {
            FeedError::BadStatus(status.as_u16())
        } else {
            FeedError::Fetch(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_human_readable() {
        assert_eq!(
            FeedError::BadStatus(503).to_string(),
            "Endpoint returned status 503"
        );
        assert_eq!(FeedError::Timeout.to_string(), "Request timed out");
    }

    #[test]
    fn json_errors_are_parse_failures() {
        let err = serde_json::from_str::<Vec<String>>("{").unwrap_err();
        let feed_err = FeedError::from(err);
        assert_eq!(feed_err.category(), "parse");
    }
}
