//! Serializable snapshot of everything the dashboard displays.

use std::collections::BTreeMap;

use serde::Serialize;

use skywatch_feeds::FeedKind;
use skywatch_types::{EventLine, StreamRecord, StreamStatus};

use crate::data::{Channel, HealthState, Point, Trajectory};
use crate::notify::Alert;

/// One stream card: the record plus derived display flags.
#[derive(Debug, Clone, Serialize)]
pub struct StreamCard {
    #[serde(flatten)]
    pub record: StreamRecord,
    pub status: StreamStatus,
    /// True while a recent status flip is being highlighted.
    pub flashing: bool,
}

/// Point-in-time view of the engine, built by [`crate::Engine::view`].
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub generated_at_ms: u64,
    pub streams: Vec<StreamCard>,
    pub charts: BTreeMap<Channel, Vec<Point>>,
    pub trajectories: BTreeMap<String, Trajectory>,
    pub events: Vec<EventLine>,
    /// `None` until the first health probe completes.
    pub health: Option<HealthState>,
    pub toasts: Vec<Alert>,
    /// Last error message per failing feed.
    pub errors: BTreeMap<FeedKind, String>,
}

impl DashboardView {
    pub fn active_streams(&self) -> usize {
        self.streams
            .iter()
            .filter(|card| card.status == StreamStatus::Active)
            .count()
    }

    /// Banner text combining every failing feed, or `None` when all are healthy.
    pub fn error_banner(&self) -> Option<String> {
        error_banner(&self.errors)
    }

    /// One-line description for periodic log output.
    pub fn summary(&self) -> String {
        let health = self.health.map_or("unknown", |h| h.label());
        let mut line = format!(
            "{} streams ({} active), {} tracked, {} events, health {}, {} toasts",
            self.streams.len(),
            self.active_streams(),
            self.trajectories.len(),
            self.events.len(),
            health,
            self.toasts.len(),
        );
        if !self.errors.is_empty() {
            let failing: Vec<&str> = self.errors.keys().map(FeedKind::name).collect();
            line.push_str(&format!(", failing: {}", failing.join(",")));
        }
        line
    }
}

pub(crate) fn error_banner(errors: &BTreeMap<FeedKind, String>) -> Option<String> {
    if errors.is_empty() {
        return None;
    }
    let parts: Vec<String> = errors
        .iter()
        .map(|(feed, message)| format!("{}: {}", feed, message))
        .collect();
    Some(parts.join("; "))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_view() -> DashboardView {
        DashboardView {
            generated_at_ms: 0,
            streams: Vec::new(),
            charts: BTreeMap::new(),
            trajectories: BTreeMap::new(),
            events: Vec::new(),
            health: None,
            toasts: Vec::new(),
            errors: BTreeMap::new(),
        }
    }

    #[test]
    fn summary_lists_failing_feeds() {
        let mut view = empty_view();
        view.streams.push(StreamCard {
            record: StreamRecord::new("cam1", "rtsp://localhost:8554/cam1").publishers(1),
            status: StreamStatus::Active,
            flashing: false,
        });
        view.errors.insert(FeedKind::Telemetry, "request timed out".into());

        let summary = view.summary();
        assert!(summary.starts_with("1 streams (1 active)"));
        assert!(summary.contains("health unknown"));
        assert!(summary.ends_with("failing: telemetry"));
    }

    #[test]
    fn banner_joins_feeds_in_order() {
        let mut view = empty_view();
        assert_eq!(view.error_banner(), None);

        view.errors.insert(FeedKind::Health, "b".into());
        view.errors.insert(FeedKind::Streams, "a".into());
        assert_eq!(view.error_banner().as_deref(), Some("streams: a; health: b"));
    }

    #[test]
    fn card_flattens_record_fields() {
        let card = StreamCard {
            record: StreamRecord::new("cam1", "rtsp://localhost:8554/cam1").publishers(2),
            status: StreamStatus::Active,
            flashing: true,
        };

        let json = serde_json::to_value(&card).unwrap();
        assert_eq!(json["path"], "cam1");
        assert_eq!(json["publishers"], 2);
        assert_eq!(json["status"], "active");
        assert_eq!(json["flashing"], true);
    }
}
