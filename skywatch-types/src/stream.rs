//! Media stream records as published by the streams feed.

use std::fmt;

/// One media path known to the media server.
///
/// Records are replaced wholesale on every successful fetch; `path` is the
/// identity.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StreamRecord {
    /// Path name on the media server (unique key).
    pub path: String,

    /// Number of publishing sessions. The wire may carry a list of sessions
    /// instead of a count; its length is used.
    #[cfg_attr(
        feature = "serde",
        serde(
            rename = "publishers",
            default,
            deserialize_with = "crate::wire::count_or_len"
        )
    )]
    pub publisher_count: u64,

    /// Number of reading sessions (count or list on the wire).
    #[cfg_attr(
        feature = "serde",
        serde(
            rename = "readers",
            default,
            deserialize_with = "crate::wire::count_or_len"
        )
    )]
    pub reader_count: u64,

    /// Human-readable uptime, when the route handler knows the start time.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub uptime: Option<String>,

    /// RTSP endpoint a viewer connects to.
    #[cfg_attr(feature = "serde", serde(rename = "rtsp_url", default))]
    pub endpoint_url: String,

    /// Source kind reported by the media server (e.g. `rtmpConn`).
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub source_type: Option<String>,

    /// HLS playlist for in-browser playback.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub hls_url: Option<String>,
}

impl StreamRecord {
    /// Create a record with no publishers or readers.
    pub fn new(path: impl Into<String>, endpoint_url: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            publisher_count: 0,
            reader_count: 0,
            uptime: None,
            endpoint_url: endpoint_url.into(),
            source_type: None,
            hls_url: None,
        }
    }

    /// Set the publisher count.
    pub fn publishers(mut self, count: u64) -> Self {
        self.publisher_count = count;
        self
    }

    /// Set the reader count.
    pub fn readers(mut self, count: u64) -> Self {
        self.reader_count = count;
        self
    }

    /// Set the uptime string.
    pub fn uptime(mut self, uptime: impl Into<String>) -> Self {
        self.uptime = Some(uptime.into());
        self
    }

    /// Derived liveness: a stream is active while anything publishes to it.
    pub fn status(&self) -> StreamStatus {
        if self.publisher_count > 0 {
            StreamStatus::Active
        } else {
            StreamStatus::Inactive
        }
    }
}

/// Derived stream status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum StreamStatus {
    Active,
    Inactive,
}

impl StreamStatus {
    /// Lowercase label used in logs and alert text.
    pub fn label(&self) -> &'static str {
        match self {
            StreamStatus::Active => "active",
            StreamStatus::Inactive => "inactive",
        }
    }
}

impl fmt::Display for StreamStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_follows_publishers() {
        let idle = StreamRecord::new("cam1", "rtsp://localhost:8554/cam1");
        assert_eq!(idle.status(), StreamStatus::Inactive);
        assert_eq!(idle.publishers(2).status(), StreamStatus::Active);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserialize_route_payload() {
        let json = r#"[
            {
                "path": "drone-7",
                "source_type": "rtmpConn",
                "publishers": 1,
                "readers": 3,
                "rtsp_url": "rtsp://localhost:8554/drone-7",
                "hls_url": "/static/hls/drone-7/stream.m3u8",
                "uptime": "0:01:12",
                "is_new": false
            },
            { "path": "idle", "publishers": 0, "readers": 0, "rtsp_url": "rtsp://localhost:8554/idle" }
        ]"#;

        let records: Vec<StreamRecord> = serde_json::from_str(json).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].publisher_count, 1);
        assert_eq!(records[0].reader_count, 3);
        assert_eq!(records[0].uptime.as_deref(), Some("0:01:12"));
        assert_eq!(records[0].source_type.as_deref(), Some("rtmpConn"));
        assert_eq!(records[1].status(), StreamStatus::Inactive);
        assert!(records[1].uptime.is_none());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn session_lists_count_as_their_length() {
        let json = r#"{"path": "cam", "publishers": [{"id": "a"}], "readers": [], "rtsp_url": ""}"#;
        let record: StreamRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.publisher_count, 1);
        assert_eq!(record.reader_count, 0);
        assert_eq!(record.status(), StreamStatus::Active);
    }
}
