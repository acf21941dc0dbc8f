//! # skywatch
//!
//! A polling dashboard engine for a drone fleet: video stream availability,
//! live telemetry, the media server's event log, and server liveness.
//!
//! Four read-only feeds are polled on independent timers. Each completed fetch
//! is folded into one [`Engine`] that owns all derived state, and the engine
//! renders a serializable [`DashboardView`] on demand.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                           Poller                             │
//! │  streams ─┐                                                  │
//! │  telemetry┼──▶ Feeds (HTTP) ──▶ Engine::apply() ──▶ view()   │
//! │  events ──┤                      │                           │
//! │  health ──┘                      ├─▶ StreamSetReconciler ─▶ NotificationDeduper
//! │                                  ├─▶ TimeSeriesWindow        │
//! │                                  ├─▶ TrajectoryTracker       │
//! │                                  └─▶ HealthMonitor           │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`poller`]**: per-feed timers, sequence numbers and the ordering policy
//! - **[`engine`]**: the single owner of derived state and the per-feed error banner
//! - **[`data`]**: stream diffing, chart windows, trajectories, liveness
//! - **[`notify`]**: toasts for appear/disappear, flashes for status flips
//! - **[`config`]**: layered settings (defaults, TOML, environment)
//!
//! ## Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use skywatch::{Engine, EngineOptions, OrderingPolicy, Poller, SystemClock};
//! use skywatch_feeds::http::HttpFeeds;
//!
//! # tokio_test::block_on(async {
//! let feeds = HttpFeeds::builder().base_url("http://localhost:8000/api").build().unwrap();
//! let engine = Engine::new(Arc::new(SystemClock), EngineOptions::default());
//! let poller = Poller::new(Arc::new(feeds), engine, OrderingPolicy::default());
//!
//! poller.tick_all().await;
//! println!("{}", poller.view().summary());
//! # });
//! ```
//!
//! Driving the engine by hand, with a fixed clock:
//!
//! ```
//! use std::sync::Arc;
//! use skywatch::{ChangeEvent, Engine, EngineOptions, ManualClock};
//! use skywatch_types::StreamRecord;
//!
//! let mut engine = Engine::new(Arc::new(ManualClock::new(0)), EngineOptions::default());
//! let events = engine.on_streams(vec![StreamRecord::new("cam1", "rtsp://localhost:8554/cam1")]);
//!
//! assert_eq!(events, vec![ChangeEvent::Appeared("cam1".into())]);
//! assert_eq!(engine.view().toasts.len(), 1);
//! ```

pub mod clock;
pub mod config;
pub mod data;
pub mod engine;
pub mod notify;
pub mod poller;
pub mod view;

#[cfg(test)]
pub(crate) mod testing;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigError, LogFormat, Settings};
pub use data::{ChangeEvent, HealthState, Retention};
pub use engine::{Engine, EngineOptions, FeedPayload};
pub use notify::{Alert, AlertSink, Severity, ToastBoard};
pub use poller::{OrderingPolicy, Poller, PollerHandle, Schedule, TickOutcome};
pub use view::DashboardView;
