//! Liveness probe response.

/// Status value the probe reports when the media server answers.
pub const HEALTH_OK: &str = "ok";

/// Body of the health endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HealthReport {
    pub status: String,
    /// Failure reason, when the backend provides one.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub detail: Option<String>,
}

impl HealthReport {
    pub fn new(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            detail: None,
        }
    }

    /// A report carrying the success sentinel.
    pub fn ok() -> Self {
        Self::new(HEALTH_OK)
    }

    /// Whether the status is exactly the success sentinel.
    pub fn is_ok(&self) -> bool {
        self.status == HEALTH_OK
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_sentinel_is_ok() {
        assert!(HealthReport::ok().is_ok());
        assert!(!HealthReport::new("fail").is_ok());
        assert!(!HealthReport::new("healthy").is_ok());
        assert!(!HealthReport::new("OK").is_ok());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserialize_with_detail() {
        let report: HealthReport =
            serde_json::from_str(r#"{"status": "unhealthy", "detail": "connection refused"}"#)
                .unwrap();
        assert!(!report.is_ok());
        assert_eq!(report.detail.as_deref(), Some("connection refused"));
    }
}
