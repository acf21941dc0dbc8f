//! The dashboard engine: all derived state, updated one feed payload at a time.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use skywatch_feeds::{FeedError, FeedKind};
use skywatch_types::wire::TelemetryPayload;
use skywatch_types::{EventLine, HealthReport, StreamRecord};

use crate::clock::Clock;
use crate::data::{
    ChangeEvent, HealthMonitor, HealthState, Retention, StreamSetReconciler, TimeSeriesWindow,
    TrajectoryTracker, Transition,
};
use crate::notify::{NotificationDeduper, ToastBoard, DEFAULT_FLASH_MS, DEFAULT_TOAST_TTL_MS};
use crate::view::{self, DashboardView, StreamCard};

/// Tunables for the derived state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
    pub chart_capacity: usize,
    pub retention: Retention,
    pub toast_ttl_ms: u64,
    pub flash_ms: u64,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            chart_capacity: crate::data::window::DEFAULT_CAPACITY,
            retention: Retention::Unbounded,
            toast_ttl_ms: DEFAULT_TOAST_TTL_MS,
            flash_ms: DEFAULT_FLASH_MS,
        }
    }
}

/// A decoded response from one feed.
#[derive(Debug, Clone)]
pub enum FeedPayload {
    Streams(Vec<StreamRecord>),
    Telemetry(TelemetryPayload),
    Events(Vec<String>),
    Health(HealthReport),
}

impl FeedPayload {
    pub fn kind(&self) -> FeedKind {
        match self {
            FeedPayload::Streams(_) => FeedKind::Streams,
            FeedPayload::Telemetry(_) => FeedKind::Telemetry,
            FeedPayload::Events(_) => FeedKind::Events,
            FeedPayload::Health(_) => FeedKind::Health,
        }
    }
}

/// Owns every piece of derived dashboard state.
///
/// Feeds never touch each other's state: a payload for one feed only updates
/// that feed's slice, and a failure only records that feed's error.
#[derive(Debug)]
pub struct Engine {
    clock: Arc<dyn Clock>,
    reconciler: StreamSetReconciler,
    notifier: NotificationDeduper,
    toasts: ToastBoard,
    charts: TimeSeriesWindow,
    trajectories: TrajectoryTracker,
    events: Vec<EventLine>,
    health: HealthMonitor,
    errors: BTreeMap<FeedKind, String>,
}

impl Engine {
    pub fn new(clock: Arc<dyn Clock>, options: EngineOptions) -> Self {
        Self {
            clock,
            reconciler: StreamSetReconciler::new(),
            notifier: NotificationDeduper::new(options.toast_ttl_ms, options.flash_ms),
            toasts: ToastBoard::new(),
            charts: TimeSeriesWindow::new(options.chart_capacity),
            trajectories: TrajectoryTracker::new(options.retention),
            events: Vec::new(),
            health: HealthMonitor::new(),
            errors: BTreeMap::new(),
        }
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    /// Apply the outcome of one fetch for `feed`.
    pub fn apply(&mut self, feed: FeedKind, result: Result<FeedPayload, FeedError>) {
        self.sweep();

        match result {
            Ok(payload) if payload.kind() != feed => {
                let err = FeedError::Parse(format!(
                    "expected {} payload, got {}",
                    feed,
                    payload.kind()
                ));
                self.on_error(feed, &err);
            }
            Ok(FeedPayload::Streams(records)) => {
                self.on_streams(records);
            }
            Ok(FeedPayload::Telemetry(payload)) => self.on_telemetry(payload),
            Ok(FeedPayload::Events(lines)) => self.on_events(lines),
            Ok(FeedPayload::Health(report)) => self.on_health(&report),
            Err(err) => self.on_error(feed, &err),
        }
    }

    /// Reconcile a streams snapshot and notify on the differences.
    pub fn on_streams(&mut self, records: Vec<StreamRecord>) -> Vec<ChangeEvent> {
        let events = self.reconciler.reconcile(records);
        for event in &events {
            debug!(%event, "stream change");
        }

        let now = self.clock.now_ms();
        self.notifier.handle(&events, now, &mut self.toasts);
        self.clear_error(FeedKind::Streams);
        events
    }

    /// Normalize a telemetry payload, stamped with the current time, and feed
    /// it to the charts and trajectories.
    pub fn on_telemetry(&mut self, payload: TelemetryPayload) {
        let snapshot = payload.normalize(self.clock.now_ms());
        self.charts.record(&snapshot);
        let appended = self.trajectories.record(&snapshot);
        debug!(entities = snapshot.len(), appended, "telemetry applied");
        self.clear_error(FeedKind::Telemetry);
    }

    /// Replace the event list wholesale.
    pub fn on_events(&mut self, lines: Vec<String>) {
        self.events = lines.iter().map(|line| EventLine::parse(line)).collect();
        self.clear_error(FeedKind::Events);
    }

    pub fn on_health(&mut self, report: &HealthReport) {
        let transition = self.health.observe(report);
        log_transition(transition);
        self.clear_error(FeedKind::Health);
    }

    /// Record a failed fetch. Derived state is left as it was, except that a
    /// failed health probe marks the server offline.
    pub fn on_error(&mut self, feed: FeedKind, err: &FeedError) {
        if feed == FeedKind::Health {
            log_transition(self.health.observe_failure());
        }

        let message = err.to_string();
        match self.errors.insert(feed, message.clone()) {
            Some(previous) if previous == message => {
                debug!(%feed, error = %message, "feed still failing");
            }
            _ => warn!(%feed, category = err.category(), error = %message, "feed fetch failed"),
        }
    }

    fn clear_error(&mut self, feed: FeedKind) {
        if self.errors.remove(&feed).is_some() {
            info!(%feed, "feed recovered");
        }
    }

    /// Drop expired toasts and finished flashes.
    pub fn sweep(&mut self) {
        let now = self.clock.now_ms();
        let expired = self.toasts.expire(now);
        if expired > 0 {
            debug!(expired, "toasts expired");
        }
        self.notifier.prune(now);
    }

    pub fn dismiss_alert(&mut self, id: u64) -> bool {
        self.toasts.dismiss(id)
    }

    /// Last error message per failing feed.
    pub fn errors(&self) -> &BTreeMap<FeedKind, String> {
        &self.errors
    }

    pub fn error_banner(&self) -> Option<String> {
        view::error_banner(&self.errors)
    }

    pub fn streams(&self) -> &StreamSetReconciler {
        &self.reconciler
    }

    pub fn charts(&self) -> &TimeSeriesWindow {
        &self.charts
    }

    pub fn trajectories(&self) -> &TrajectoryTracker {
        &self.trajectories
    }

    pub fn events(&self) -> &[EventLine] {
        &self.events
    }

    pub fn health(&self) -> Option<HealthState> {
        self.health.state()
    }

    pub fn toasts(&self) -> &ToastBoard {
        &self.toasts
    }

    pub fn is_flashing(&self, path: &str) -> bool {
        self.notifier.is_flashing(path, self.clock.now_ms())
    }

    /// Build the serializable dashboard view at the current time.
    pub fn view(&self) -> DashboardView {
        let now = self.clock.now_ms();

        let streams = self
            .reconciler
            .records()
            .iter()
            .map(|record| StreamCard {
                status: record.status(),
                flashing: self.notifier.is_flashing(&record.path, now),
                record: record.clone(),
            })
            .collect();

        let charts = crate::data::Channel::ALL
            .into_iter()
            .map(|channel| (channel, self.charts.read(channel)))
            .collect();

        let trajectories = self
            .trajectories
            .iter()
            .map(|(id, trajectory)| (id.clone(), trajectory.clone()))
            .collect();

        DashboardView {
            generated_at_ms: now,
            streams,
            charts,
            trajectories,
            events: self.events.clone(),
            health: self.health.state(),
            toasts: self.toasts.live(now).cloned().collect(),
            errors: self.errors.clone(),
        }
    }
}

fn log_transition(transition: Transition) {
    if !transition.changed() {
        return;
    }
    match transition.to {
        HealthState::Ok => info!(from = ?transition.from, "media server is up"),
        HealthState::Offline => warn!(from = ?transition.from, "media server is offline"),
    }
}
