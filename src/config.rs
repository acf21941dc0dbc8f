//! Layered settings.
//!
//! Lowest to highest precedence: built-in defaults, an optional TOML file,
//! `SKYWATCH_*` environment variables (`__` separates sections, e.g.
//! `SKYWATCH_FEEDS__BASE_URL`), then CLI flags applied by the binary.

use std::path::Path;
use std::time::Duration;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use skywatch_feeds::http::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT};

use crate::data::Retention;
use crate::engine::EngineOptions;
use crate::poller::{OrderingPolicy, Schedule};

const ENV_PREFIX: &str = "SKYWATCH";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load settings: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid setting {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedSettings {
    pub base_url: String,
    pub request_timeout_ms: u64,
    pub streams_interval_ms: u64,
    pub telemetry_interval_ms: u64,
    pub events_interval_ms: u64,
    pub health_interval_ms: u64,
    pub ordering: OrderingPolicy,
}

impl Default for FeedSettings {
    fn default() -> Self {
        let schedule = Schedule::default();
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_ms: DEFAULT_TIMEOUT.as_millis() as u64,
            streams_interval_ms: schedule.streams.as_millis() as u64,
            telemetry_interval_ms: schedule.telemetry.as_millis() as u64,
            events_interval_ms: schedule.events.as_millis() as u64,
            health_interval_ms: schedule.health.as_millis() as u64,
            ordering: OrderingPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartSettings {
    pub capacity: usize,
}

impl Default for ChartSettings {
    fn default() -> Self {
        Self {
            capacity: crate::data::window::DEFAULT_CAPACITY,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrajectorySettings {
    /// Points kept per entity; unset keeps everything.
    pub max_points: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertSettings {
    pub toast_ttl_ms: u64,
    pub flash_ms: u64,
}

impl Default for AlertSettings {
    fn default() -> Self {
        Self {
            toast_ttl_ms: crate::notify::DEFAULT_TOAST_TTL_MS,
            flash_ms: crate::notify::DEFAULT_FLASH_MS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Filter directive used when `RUST_LOG` is unset.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

/// All runtime settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub feeds: FeedSettings,
    pub charts: ChartSettings,
    pub trajectories: TrajectorySettings,
    pub alerts: AlertSettings,
    pub logging: LoggingSettings,
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

impl Settings {
    /// Load defaults, then `path` if given, then the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with(path, environment())
    }

    fn load_with(path: Option<&Path>, env: Environment) -> Result<Self, ConfigError> {
        let mut builder = Config::builder().add_source(Config::try_from(&Settings::default())?);
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }

        let settings: Settings = builder.add_source(env).build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let intervals = [
            ("feeds.request_timeout_ms", self.feeds.request_timeout_ms),
            ("feeds.streams_interval_ms", self.feeds.streams_interval_ms),
            ("feeds.telemetry_interval_ms", self.feeds.telemetry_interval_ms),
            ("feeds.events_interval_ms", self.feeds.events_interval_ms),
            ("feeds.health_interval_ms", self.feeds.health_interval_ms),
        ];
        if let Some(&(key, _)) = intervals.iter().find(|(_, ms)| *ms == 0) {
            return Err(ConfigError::Invalid {
                key,
                reason: "must be greater than zero".to_string(),
            });
        }

        if self.feeds.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "feeds.base_url",
                reason: "must not be empty".to_string(),
            });
        }
        if self.charts.capacity == 0 {
            return Err(ConfigError::Invalid {
                key: "charts.capacity",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.trajectories.max_points == Some(0) {
            return Err(ConfigError::Invalid {
                key: "trajectories.max_points",
                reason: "must be greater than zero when set".to_string(),
            });
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.feeds.request_timeout_ms)
    }

    pub fn schedule(&self) -> Schedule {
        Schedule {
            streams: Duration::from_millis(self.feeds.streams_interval_ms),
            telemetry: Duration::from_millis(self.feeds.telemetry_interval_ms),
            events: Duration::from_millis(self.feeds.events_interval_ms),
            health: Duration::from_millis(self.feeds.health_interval_ms),
        }
    }

    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            chart_capacity: self.charts.capacity,
            retention: Retention::from(self.trajectories.max_points),
            toast_ttl_ms: self.alerts.toast_ttl_ms,
            flash_ms: self.alerts.flash_ms,
        }
    }
}
