//! Event log lines.
//!
//! The media server's event hook appends `"<timestamp> | <event> | <stream>"`
//! lines to a log; the events feed returns the tail of that log.

/// One event log line, split into fields when it follows the hook format.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EventLine {
    /// The line exactly as received.
    pub raw: String,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub timestamp: Option<String>,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub event: Option<String>,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub stream: Option<String>,
}

impl EventLine {
    /// Split a line on `|`. Lines that do not have exactly three fields are
    /// kept raw with no parsed parts.
    pub fn parse(line: &str) -> Self {
        let raw = line.trim().to_string();
        let parts: Vec<&str> = raw.split('|').map(str::trim).collect();

        if let [timestamp, event, stream] = parts.as_slice() {
            Self {
                timestamp: Some(timestamp.to_string()),
                event: Some(event.to_string()),
                stream: Some(stream.to_string()),
                raw,
            }
        } else {
            Self {
                raw,
                timestamp: None,
                event: None,
                stream: None,
            }
        }
    }
}
