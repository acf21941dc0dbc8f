//! # skywatch-types
//!
//! Data shapes shared between the skywatch feed collectors and the dashboard
//! engine. Four read-only feeds are modeled:
//!
//! - **streams**: the media server's current path list ([`StreamRecord`])
//! - **telemetry**: per-drone position and vitals ([`TelemetrySnapshot`])
//! - **events**: the last lines of the media server's event hook log ([`EventLine`])
//! - **health**: a liveness probe ([`HealthReport`])
//!
//! ## Features
//!
//! - `serde` (default): JSON (de)serialization of every type, plus the
//!   [`wire`] module that normalizes the two legacy telemetry payloads into the
//!   canonical [`TelemetrySnapshot`].
//!
//! ## Example
//!
//! ```rust
//! use skywatch_types::{StreamRecord, StreamStatus};
//!
//! let record = StreamRecord::new("cam1", "rtsp://localhost:8554/cam1").publishers(1);
//! assert_eq!(record.status(), StreamStatus::Active);
//! ```

mod event;
mod health;
mod stream;
mod telemetry;

#[cfg(feature = "serde")]
pub mod wire;

pub use event::*;
pub use health::*;
pub use stream::*;
pub use telemetry::*;
