//! Per-entity flight paths for the map view.

use std::collections::{BTreeMap, VecDeque};

use serde::Serialize;

use skywatch_types::TelemetrySnapshot;

/// Track colors, indexed by a hash of the entity id.
pub const PALETTE: [&str; 12] = [
    "#e6194b", "#3cb44b", "#4363d8", "#f58231", "#911eb4", "#42d4f4", "#f032e6", "#bfef45",
    "#469990", "#9a6324", "#800000", "#000075",
];

/// How many points each trajectory keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Retention {
    /// Never drop points.
    #[default]
    Unbounded,
    /// Keep only the most recent `n` points (at least one).
    MaxPoints(usize),
}

impl From<Option<usize>> for Retention {
    fn from(max_points: Option<usize>) -> Self {
        match max_points {
            Some(n) => Retention::MaxPoints(n.max(1)),
            None => Retention::Unbounded,
        }
    }
}

/// A position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPoint {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
}

/// The recorded path of one entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trajectory {
    /// Hex color, fixed at first observation.
    pub color: &'static str,
    pub points: VecDeque<GeoPoint>,
}

/// Stable color for an entity: FNV-1a over the id, modulo the palette.
pub fn palette_color(entity_id: &str) -> &'static str {
    const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

    let hash = entity_id
        .bytes()
        .fold(FNV_OFFSET, |h, b| (h ^ b as u64).wrapping_mul(FNV_PRIME));
    PALETTE[(hash % PALETTE.len() as u64) as usize]
}

/// Paths of every entity ever seen with a position fix.
///
/// Entities are never removed, even when later snapshots omit them.
#[derive(Debug, Clone, Default)]
pub struct TrajectoryTracker {
    retention: Retention,
    entries: BTreeMap<String, Trajectory>,
}

impl TrajectoryTracker {
    pub fn new(retention: Retention) -> Self {
        Self {
            retention,
            entries: BTreeMap::new(),
        }
    }

    /// Append the position of every entity that has both coordinates.
    ///
    /// Returns the number of points appended.
    pub fn record(&mut self, snapshot: &TelemetrySnapshot) -> usize {
        let mut appended = 0;

        for sample in snapshot.iter() {
            let Some((lat, lon)) = sample.coordinates() else {
                continue;
            };

            let trajectory = self
                .entries
                .entry(sample.entity_id.clone())
                .or_insert_with(|| Trajectory {
                    color: palette_color(&sample.entity_id),
                    points: VecDeque::new(),
                });

            trajectory.points.push_back(GeoPoint { lat, lon });
            if let Retention::MaxPoints(max) = self.retention {
                while trajectory.points.len() > max {
                    trajectory.points.pop_front();
                }
            }
            appended += 1;
        }

        appended
    }

    pub fn get(&self, entity_id: &str) -> Option<&Trajectory> {
        self.entries.get(entity_id)
    }

    /// Trajectories in entity-id order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Trajectory)> {
        self.entries.iter()
    }

    /// Number of tracked entities.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skywatch_types::TelemetrySample;

    fn tick(ts: u64, samples: Vec<TelemetrySample>) -> TelemetrySnapshot {
        samples
            .into_iter()
            .fold(TelemetrySnapshot::new(ts), TelemetrySnapshot::with)
    }

    #[test]
    fn color_is_stable_across_ticks() {
        let mut tracker = TrajectoryTracker::default();
        let mut colors = Vec::new();

        for i in 0..3u64 {
            let lat = 55.75 + i as f64 * 0.001;
            tracker.record(&tick(i, vec![TelemetrySample::new("d1", i).position(lat, 37.61)]));
            colors.push(tracker.get("d1").unwrap().color);
        }

        assert!(colors.iter().all(|c| *c == colors[0]));
        assert_eq!(tracker.get("d1").unwrap().points.len(), 3);
    }

    #[test]
    fn color_does_not_depend_on_session() {
        assert_eq!(palette_color("drone-7"), palette_color("drone-7"));
        assert!(PALETTE.contains(&palette_color("drone-7")));
    }

    #[test]
    fn samples_without_a_fix_are_skipped() {
        let mut tracker = TrajectoryTracker::default();
        let mut half = TelemetrySample::new("d2", 0);
        half.latitude = Some(1.0);

        let appended = tracker.record(&tick(
            0,
            vec![TelemetrySample::new("d1", 0).position(1.0, 2.0), half],
        ));

        assert_eq!(appended, 1);
        assert!(tracker.get("d2").is_none());
    }

    #[test]
    fn entities_are_kept_when_omitted() {
        let mut tracker = TrajectoryTracker::default();
        tracker.record(&tick(0, vec![TelemetrySample::new("d1", 0).position(1.0, 2.0)]));
        tracker.record(&tick(1, vec![TelemetrySample::new("d2", 1).position(3.0, 4.0)]));

        assert_eq!(tracker.len(), 2);
        assert_eq!(tracker.get("d1").unwrap().points.len(), 1);
    }

    #[test]
    fn max_points_evicts_oldest() {
        let mut tracker = TrajectoryTracker::new(Retention::MaxPoints(2));
        for i in 0..4u64 {
            tracker.record(&tick(i, vec![TelemetrySample::new("d1", i).position(i as f64, 0.0)]));
        }

        let points: Vec<f64> = tracker.get("d1").unwrap().points.iter().map(|p| p.lat).collect();
        assert_eq!(points, vec![2.0, 3.0]);
    }

    #[test]
    fn retention_from_config_value() {
        assert_eq!(Retention::from(None), Retention::Unbounded);
        assert_eq!(Retention::from(Some(0)), Retention::MaxPoints(1));
    }
}
