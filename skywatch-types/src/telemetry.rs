//! Canonical telemetry model.
//!
//! Whatever shape the telemetry feed returns, the engine only ever sees a
//! [`TelemetrySnapshot`]: a mapping from entity id to [`TelemetrySample`].

use std::collections::BTreeMap;
use std::fmt;

/// One telemetry reading for one tracked entity.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TelemetrySample {
    /// Entity (drone) identifier.
    pub entity_id: String,
    /// Milliseconds since the Unix epoch at which the sample was taken.
    pub timestamp_ms: u64,
    /// Latitude in degrees, if the entity reported a fix.
    pub latitude: Option<f64>,
    /// Longitude in degrees, if the entity reported a fix.
    pub longitude: Option<f64>,
    /// Altitude in meters, if reported.
    pub altitude: Option<f64>,
    /// Ground speed in m/s, if reported.
    pub speed: Option<f64>,
    /// Heading in degrees.
    pub heading: Option<f64>,
    /// Battery level, 0-100.
    pub battery: Option<f64>,
    /// Link quality, 0-100.
    pub signal_strength: Option<f64>,
    pub status: EntityStatus,
}

impl TelemetrySample {
    /// Create a sample with no position and no reported metrics.
    pub fn new(entity_id: impl Into<String>, timestamp_ms: u64) -> Self {
        Self {
            entity_id: entity_id.into(),
            timestamp_ms,
            latitude: None,
            longitude: None,
            altitude: None,
            speed: None,
            heading: None,
            battery: None,
            signal_strength: None,
            status: EntityStatus::Active,
        }
    }

    /// Set both coordinates.
    pub fn position(mut self, latitude: f64, longitude: f64) -> Self {
        self.latitude = Some(latitude);
        self.longitude = Some(longitude);
        self
    }

    pub fn altitude(mut self, altitude: f64) -> Self {
        self.altitude = Some(altitude);
        self
    }

    pub fn speed(mut self, speed: f64) -> Self {
        self.speed = Some(speed);
        self
    }

    pub fn battery(mut self, battery: f64) -> Self {
        self.battery = Some(battery);
        self
    }

    pub fn signal_strength(mut self, signal: f64) -> Self {
        self.signal_strength = Some(signal);
        self
    }

    pub fn status(mut self, status: EntityStatus) -> Self {
        self.status = status;
        self
    }

    /// Both coordinates, when present.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        Some((self.latitude?, self.longitude?))
    }
}

/// Operational status of a tracked entity.
///
/// Anything other than `active` keeps its wire label (e.g. `low_battery`).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "String", into = "String"))]
pub enum EntityStatus {
    #[default]
    Active,
    Other(String),
}

impl EntityStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, EntityStatus::Active)
    }

    pub fn as_str(&self) -> &str {
        match self {
            EntityStatus::Active => "active",
            EntityStatus::Other(label) => label,
        }
    }
}

impl From<String> for EntityStatus {
    fn from(label: String) -> Self {
        if label == "active" {
            EntityStatus::Active
        } else {
            EntityStatus::Other(label)
        }
    }
}

impl From<EntityStatus> for String {
    fn from(status: EntityStatus) -> Self {
        match status {
            EntityStatus::Active => "active".to_string(),
            EntityStatus::Other(label) => label,
        }
    }
}

impl fmt::Display for EntityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// All samples from one successful telemetry fetch, keyed by entity id.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TelemetrySnapshot {
    /// Milliseconds since the Unix epoch when the snapshot was taken.
    pub timestamp_ms: u64,
    pub samples: BTreeMap<String, TelemetrySample>,
}

impl TelemetrySnapshot {
    /// Create an empty snapshot.
    pub fn new(timestamp_ms: u64) -> Self {
        Self {
            timestamp_ms,
            samples: BTreeMap::new(),
        }
    }

    /// Add a sample, replacing any earlier one for the same entity.
    pub fn insert(&mut self, sample: TelemetrySample) {
        self.samples.insert(sample.entity_id.clone(), sample);
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, sample: TelemetrySample) -> Self {
        self.insert(sample);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn get(&self, entity_id: &str) -> Option<&TelemetrySample> {
        self.samples.get(entity_id)
    }

    /// Iterate samples in entity-id order.
    pub fn iter(&self) -> impl Iterator<Item = &TelemetrySample> {
        self.samples.values()
    }
}
