//! Wire shapes and their normalization into the canonical model.
//!
//! The telemetry endpoint has served two payloads over its lifetime:
//!
//! - a flat single-drone fix: `{ "lat", "lon", "alt", "speed", "heading" }`
//! - a fleet map: `{ "<drone id>": { "latitude", "longitude", "altitude",
//!   "speed", "battery", "signal_strength", "status" } }`
//!
//! [`TelemetryPayload`] accepts either and [`TelemetryPayload::normalize`]
//! turns both into a [`TelemetrySnapshot`].

use std::collections::BTreeMap;

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};

use crate::{EntityStatus, TelemetrySample, TelemetrySnapshot};

/// Entity id the single-drone payload is filed under.
pub const DEFAULT_ENTITY_ID: &str = "default";

/// Raw telemetry payload in either supported shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TelemetryPayload {
    /// Multi-entity analytics view.
    Fleet(BTreeMap<String, FleetEntry>),
    /// Legacy single-drone view.
    Single(SingleFix),
}

/// One entry of the fleet payload.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FleetEntry {
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub altitude: Option<f64>,
    #[serde(default)]
    pub speed: Option<f64>,
    #[serde(default)]
    pub heading: Option<f64>,
    #[serde(default)]
    pub battery: Option<f64>,
    #[serde(default)]
    pub signal_strength: Option<f64>,
    #[serde(default)]
    pub status: Option<String>,
}

/// The legacy flat payload. `lat` and `lon` must be present (they may be null)
/// so that an unrelated object is not mistaken for a fix.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SingleFix {
    #[serde(deserialize_with = "Option::deserialize")]
    pub lat: Option<f64>,
    #[serde(deserialize_with = "Option::deserialize")]
    pub lon: Option<f64>,
    #[serde(default)]
    pub alt: Option<f64>,
    #[serde(default)]
    pub speed: Option<f64>,
    #[serde(default)]
    pub heading: Option<f64>,
}

impl TelemetryPayload {
    /// Convert into the canonical mapping, stamping every sample with
    /// `timestamp_ms`.
    pub fn normalize(self, timestamp_ms: u64) -> TelemetrySnapshot {
        let mut snapshot = TelemetrySnapshot::new(timestamp_ms);

        match self {
            TelemetryPayload::Fleet(entries) => {
                for (entity_id, entry) in entries {
                    snapshot.insert(TelemetrySample {
                        entity_id,
                        timestamp_ms,
                        latitude: entry.latitude,
                        longitude: entry.longitude,
                        altitude: entry.altitude,
                        speed: entry.speed,
                        heading: entry.heading,
                        battery: entry.battery,
                        signal_strength: entry.signal_strength,
                        status: entry.status.map(EntityStatus::from).unwrap_or_default(),
                    });
                }
            }
            TelemetryPayload::Single(fix) => {
                snapshot.insert(TelemetrySample {
                    entity_id: DEFAULT_ENTITY_ID.to_string(),
                    timestamp_ms,
                    latitude: fix.lat,
                    longitude: fix.lon,
                    altitude: fix.alt,
                    speed: fix.speed,
                    heading: fix.heading,
                    battery: None,
                    signal_strength: None,
                    status: EntityStatus::Active,
                });
            }
        }

        snapshot
    }
}

/// Deserialize a session count that may arrive as a number, a list of
/// sessions, or null.
pub fn count_or_len<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum CountOrList {
        Count(u64),
        List(Vec<IgnoredAny>),
    }

    Ok(match Option::<CountOrList>::deserialize(deserializer)? {
        Some(CountOrList::Count(n)) => n,
        Some(CountOrList::List(items)) => items.len() as u64,
        None => 0,
    })
}
