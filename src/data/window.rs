//! Rolling time-series for the dashboard charts.

use std::collections::{BTreeMap, VecDeque};

use serde::Serialize;

use skywatch_types::{TelemetrySample, TelemetrySnapshot};

/// Number of points each chart keeps by default.
pub const DEFAULT_CAPACITY: usize = 20;

/// A charted metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Altitude,
    Speed,
    Battery,
    Signal,
}

impl Channel {
    pub const ALL: [Channel; 4] = [
        Channel::Altitude,
        Channel::Speed,
        Channel::Battery,
        Channel::Signal,
    ];

    /// Lowercase name used in views and logs.
    pub fn label(&self) -> &'static str {
        match self {
            Channel::Altitude => "altitude",
            Channel::Speed => "speed",
            Channel::Battery => "battery",
            Channel::Signal => "signal",
        }
    }

    /// The sample's value for this metric, if it reports one.
    pub fn extract(&self, sample: &TelemetrySample) -> Option<f64> {
        match self {
            Channel::Altitude => sample.altitude,
            Channel::Speed => sample.speed,
            Channel::Battery => sample.battery,
            Channel::Signal => sample.signal_strength,
        }
    }
}

/// One charted value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub timestamp_ms: u64,
    pub value: f64,
}

/// Per-channel ring buffers holding the most recent `capacity` points.
///
/// Points are kept in insertion order; once a channel is full the oldest point
/// is evicted for every new one.
#[derive(Debug, Clone)]
pub struct TimeSeriesWindow {
    capacity: usize,
    channels: BTreeMap<Channel, VecDeque<Point>>,
}

impl Default for TimeSeriesWindow {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl TimeSeriesWindow {
    /// Create an empty window. A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            channels: BTreeMap::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append a point, evicting the oldest if the channel is over capacity.
    pub fn push(&mut self, channel: Channel, timestamp_ms: u64, value: f64) {
        let capacity = self.capacity;
        let buffer = self
            .channels
            .entry(channel)
            .or_insert_with(|| VecDeque::with_capacity(capacity + 1));
        buffer.push_back(Point {
            timestamp_ms,
            value,
        });
        if buffer.len() > capacity {
            buffer.pop_front();
        }
    }

    /// Push the fleet-wide mean of every channel for one telemetry tick.
    ///
    /// The mean covers the entities that report the metric; a tick where none
    /// do (including an empty snapshot) records `0.0`.
    pub fn record(&mut self, snapshot: &TelemetrySnapshot) {
        for channel in Channel::ALL {
            let value = mean(snapshot.iter().filter_map(|s| channel.extract(s)));
            self.push(channel, snapshot.timestamp_ms, value);
        }
    }

    /// Points of a channel, oldest first.
    pub fn read(&self, channel: Channel) -> Vec<Point> {
        self.iter(channel).copied().collect()
    }

    /// Borrowing iterator over a channel's points, oldest first.
    pub fn iter(&self, channel: Channel) -> impl Iterator<Item = &Point> {
        self.channels.get(&channel).into_iter().flatten()
    }

    /// Points currently held for `channel`.
    pub fn len(&self, channel: Channel) -> usize {
        self.channels.get(&channel).map_or(0, VecDeque::len)
    }

    /// True until the first tick is recorded.
    pub fn is_empty(&self) -> bool {
        self.channels.values().all(VecDeque::is_empty)
    }

    /// Most recent point of a channel.
    pub fn latest(&self, channel: Channel) -> Option<Point> {
        self.channels.get(&channel)?.back().copied()
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}
