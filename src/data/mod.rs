//! Derived dashboard state.
//!
//! Each submodule owns one slice of what the dashboard shows and is updated
//! only from completed feed payloads handed to it by the engine.
//!
//! ## Submodules
//!
//! - [`reconcile`]: diffing consecutive stream snapshots into [`ChangeEvent`]s
//! - [`window`]: bounded per-channel chart series ([`TimeSeriesWindow`])
//! - [`trajectory`]: per-entity flight paths with stable colors ([`TrajectoryTracker`])
//! - [`health`]: media server liveness ([`HealthMonitor`])
//!
//! ## Data Flow
//!
//! ```text
//! Vec<StreamRecord> ──▶ StreamSetReconciler::reconcile() ──▶ ChangeEvent ──▶ notify
//!
//! TelemetrySnapshot ──┬▶ TimeSeriesWindow::record()
//!                     └▶ TrajectoryTracker::record()
//!
//! HealthReport ───────▶ HealthMonitor::observe()
//! ```

pub mod health;
pub mod reconcile;
pub mod trajectory;
pub mod window;

pub use health::{HealthMonitor, HealthState, Transition};
pub use reconcile::{ChangeEvent, StreamSetReconciler};
pub use trajectory::{palette_color, GeoPoint, Retention, Trajectory, TrajectoryTracker};
pub use window::{Channel, Point, TimeSeriesWindow};
