//! Stream set reconciliation.
//!
//! Each successful streams fetch is diffed against the previous one to find
//! streams that appeared, disappeared, or changed between active and inactive.

use std::collections::BTreeMap;
use std::fmt;

use skywatch_types::{StreamRecord, StreamStatus};

/// A difference between two consecutive stream snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent {
    /// A path not present in the previous snapshot.
    Appeared(String),
    /// A path missing from the new snapshot.
    Disappeared(String),
    /// A path that flipped between active and inactive.
    StatusChanged {
        path: String,
        from: StreamStatus,
        to: StreamStatus,
    },
}

impl ChangeEvent {
    pub fn path(&self) -> &str {
        match self {
            ChangeEvent::Appeared(path) | ChangeEvent::Disappeared(path) => path,
            ChangeEvent::StatusChanged { path, .. } => path,
        }
    }
}

impl fmt::Display for ChangeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeEvent::Appeared(path) => write!(f, "appeared: {}", path),
            ChangeEvent::Disappeared(path) => write!(f, "disappeared: {}", path),
            ChangeEvent::StatusChanged { path, from, to } => {
                write!(f, "{}: {} -> {}", path, from, to)
            }
        }
    }
}

/// Holds the last known stream set and diffs new snapshots against it.
#[derive(Debug, Clone, Default)]
pub struct StreamSetReconciler {
    known: BTreeMap<String, StreamStatus>,
    records: Vec<StreamRecord>,
}

impl StreamSetReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Diff `snapshot` against the stored set, then replace the stored set.
    ///
    /// Events come out as all `Appeared` (snapshot order), then all
    /// `Disappeared` (path order), then all `StatusChanged` (snapshot order).
    /// Duplicate paths in one snapshot collapse to the last record.
    pub fn reconcile(&mut self, snapshot: Vec<StreamRecord>) -> Vec<ChangeEvent> {
        let mut order: Vec<String> = Vec::with_capacity(snapshot.len());
        let mut latest: BTreeMap<String, StreamRecord> = BTreeMap::new();

        for record in snapshot {
            if !latest.contains_key(&record.path) {
                order.push(record.path.clone());
            }
            latest.insert(record.path.clone(), record);
        }

        let current: BTreeMap<String, StreamStatus> = latest
            .iter()
            .map(|(path, record)| (path.clone(), record.status()))
            .collect();

        let appeared = order
            .iter()
            .filter(|path| !self.known.contains_key(*path))
            .map(|path| ChangeEvent::Appeared(path.clone()));

        let disappeared = self
            .known
            .keys()
            .filter(|path| !current.contains_key(*path))
            .map(|path| ChangeEvent::Disappeared(path.clone()));

        let changed = order.iter().filter_map(|path| {
            let from = *self.known.get(path)?;
            let to = current[path];
            (from != to).then(|| ChangeEvent::StatusChanged {
                path: path.clone(),
                from,
                to,
            })
        });

        let events: Vec<ChangeEvent> = appeared.chain(disappeared).chain(changed).collect();

        self.known = current;
        self.records = order
            .into_iter()
            .filter_map(|path| latest.remove(&path))
            .collect();

        events
    }

    /// Stored status of a path.
    pub fn status(&self, path: &str) -> Option<StreamStatus> {
        self.known.get(path).copied()
    }

    /// Latest records, in first-seen order of the last snapshot.
    pub fn records(&self) -> &[StreamRecord] {
        &self.records
    }

    /// Number of distinct paths in the last snapshot.
    pub fn len(&self) -> usize {
        self.known.len()
    }

    pub fn is_empty(&self) -> bool {
        self.known.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream(path: &str, publishers: u64) -> StreamRecord {
        StreamRecord::new(path, format!("rtsp://localhost:8554/{}", path)).publishers(publishers)
    }

    #[test]
    fn first_snapshot_is_all_appeared() {
        let mut reconciler = StreamSetReconciler::new();
        let events = reconciler.reconcile(vec![stream("cam1", 0), stream("cam2", 1)]);

        assert_eq!(
            events,
            vec![
                ChangeEvent::Appeared("cam1".into()),
                ChangeEvent::Appeared("cam2".into())
            ]
        );
    }

    #[test]
    fn appear_then_disappear() {
        let mut reconciler = StreamSetReconciler::new();
        reconciler.reconcile(vec![stream("A", 1)]);

        let events = reconciler.reconcile(vec![stream("A", 1), stream("B", 1)]);
        assert_eq!(events, vec![ChangeEvent::Appeared("B".into())]);

        let events = reconciler.reconcile(vec![stream("B", 1)]);
        assert_eq!(events, vec![ChangeEvent::Disappeared("A".into())]);
    }

    #[test]
    fn status_change_and_new_stream() {
        let mut reconciler = StreamSetReconciler::new();
        reconciler.reconcile(vec![stream("cam1", 1)]);

        let events = reconciler.reconcile(vec![stream("cam1", 0), stream("cam2", 1)]);
        assert_eq!(
            events,
            vec![
                ChangeEvent::Appeared("cam2".into()),
                ChangeEvent::StatusChanged {
                    path: "cam1".into(),
                    from: StreamStatus::Active,
                    to: StreamStatus::Inactive,
                },
            ]
        );
    }

    #[test]
    fn replaying_a_snapshot_is_silent() {
        let mut reconciler = StreamSetReconciler::new();
        let s1 = vec![stream("a", 1), stream("b", 0), stream("c", 1)];
        let s2 = vec![stream("a", 0), stream("b", 1), stream("c", 1)];

        reconciler.reconcile(s1);
        let events = reconciler.reconcile(s2.clone());
        let changes = events
            .iter()
            .filter(|e| matches!(e, ChangeEvent::StatusChanged { .. }))
            .count();
        assert_eq!(changes, 2);
        assert_eq!(events.len(), 2);

        assert!(reconciler.reconcile(s2).is_empty());
    }

    #[test]
    fn event_order_is_deterministic() {
        let mut reconciler = StreamSetReconciler::new();
        reconciler.reconcile(vec![stream("z", 1), stream("old", 1), stream("m", 0)]);

        let events = reconciler.reconcile(vec![stream("m", 1), stream("new", 0), stream("z", 0)]);
        assert_eq!(
            events,
            vec![
                ChangeEvent::Appeared("new".into()),
                ChangeEvent::Disappeared("old".into()),
                ChangeEvent::StatusChanged {
                    path: "m".into(),
                    from: StreamStatus::Inactive,
                    to: StreamStatus::Active,
                },
                ChangeEvent::StatusChanged {
                    path: "z".into(),
                    from: StreamStatus::Active,
                    to: StreamStatus::Inactive,
                },
            ]
        );
    }

    #[test]
    fn duplicate_paths_collapse() {
        let mut reconciler = StreamSetReconciler::new();
        let events = reconciler.reconcile(vec![stream("cam", 0), stream("cam", 2)]);

        assert_eq!(events, vec![ChangeEvent::Appeared("cam".into())]);
        assert_eq!(reconciler.len(), 1);
        assert_eq!(reconciler.records().len(), 1);
        assert_eq!(reconciler.records()[0].publisher_count, 2);
        assert_eq!(reconciler.status("cam"), Some(StreamStatus::Active));
    }

    #[test]
    fn empty_snapshot_disappears_everything() {
        let mut reconciler = StreamSetReconciler::new();
        reconciler.reconcile(vec![stream("b", 1), stream("a", 1)]);

        let events = reconciler.reconcile(Vec::new());
        assert_eq!(
            events,
            vec![
                ChangeEvent::Disappeared("a".into()),
                ChangeEvent::Disappeared("b".into())
            ]
        );
        assert!(reconciler.is_empty());
    }
}
