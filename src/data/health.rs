//! Two-state liveness tracking for the media server probe.

use serde::Serialize;

use skywatch_types::HealthReport;

/// Liveness of the media server as of the last probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthState {
    /// The probe answered with the `"ok"` sentinel.
    Ok,
    /// The probe failed or answered with anything else.
    Offline,
}

impl HealthState {
    pub fn label(&self) -> &'static str {
        match self {
            HealthState::Ok => "ok",
            HealthState::Offline => "offline",
        }
    }
}

/// The state before and after one probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: Option<HealthState>,
    pub to: HealthState,
}

impl Transition {
    pub fn changed(&self) -> bool {
        self.from != Some(self.to)
    }
}

/// Liveness of the media server as seen by the last probe.
///
/// Unknown until the first probe; afterwards every probe overwrites the state
/// outright.
#[derive(Debug, Clone, Default)]
pub struct HealthMonitor {
    state: Option<HealthState>,
}

impl HealthMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state, `None` before the first probe.
    pub fn state(&self) -> Option<HealthState> {
        self.state
    }

    /// Apply a well-formed probe response.
    pub fn observe(&mut self, report: &HealthReport) -> Transition {
        let to = if report.is_ok() {
            HealthState::Ok
        } else {
            HealthState::Offline
        };
        self.set(to)
    }

    /// Apply a probe that produced no usable response.
    pub fn observe_failure(&mut self) -> Transition {
        self.set(HealthState::Offline)
    }

    fn set(&mut self, to: HealthState) -> Transition {
        let from = self.state.replace(to);
        Transition { from, to }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_until_first_probe() {
        assert_eq!(HealthMonitor::new().state(), None);
    }

    #[test]
    fn ok_failure_ok_flips() {
        let mut monitor = HealthMonitor::new();
        let mut states = Vec::new();

        monitor.observe(&HealthReport::ok());
        states.push(monitor.state());
        monitor.observe_failure();
        states.push(monitor.state());
        monitor.observe(&HealthReport::ok());
        states.push(monitor.state());

        assert_eq!(
            states,
            vec![
                Some(HealthState::Ok),
                Some(HealthState::Offline),
                Some(HealthState::Ok)
            ]
        );
    }

    #[test]
    fn non_sentinel_status_is_offline() {
        let mut monitor = HealthMonitor::new();
        let transition = monitor.observe(&HealthReport::new("fail"));
        assert_eq!(transition.to, HealthState::Offline);
        assert!(transition.changed());
    }

    #[test]
    fn repeated_state_is_not_a_change() {
        let mut monitor = HealthMonitor::new();
        assert!(monitor.observe(&HealthReport::ok()).changed());
        assert!(!monitor.observe(&HealthReport::ok()).changed());
    }
}
