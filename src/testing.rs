//! Scripted [`Feeds`] for driving the poller in tests.

use std::collections::{BTreeMap, VecDeque};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use skywatch_feeds::{FeedError, FeedKind, Feeds};
use skywatch_types::wire::TelemetryPayload;
use skywatch_types::{HealthReport, StreamRecord};

use crate::engine::FeedPayload;

#[derive(Debug)]
struct Scripted {
    result: Result<FeedPayload, FeedError>,
    delay: Option<Duration>,
}

/// Feeds that answer from per-feed queues, in call order.
///
/// An empty queue answers with a fetch error.
#[derive(Debug, Default)]
pub struct ScriptedFeeds {
    queues: Mutex<BTreeMap<FeedKind, VecDeque<Scripted>>>,
    calls: Mutex<BTreeMap<FeedKind, usize>>,
}

impl ScriptedFeeds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, feed: FeedKind, result: Result<FeedPayload, FeedError>) {
        self.enqueue(feed, result, None);
    }

    /// Queue a response that resolves only after `delay`.
    pub fn push_delayed(
        &self,
        feed: FeedKind,
        result: Result<FeedPayload, FeedError>,
        delay: Duration,
    ) {
        self.enqueue(feed, result, Some(delay));
    }

    fn enqueue(&self, feed: FeedKind, result: Result<FeedPayload, FeedError>, delay: Option<Duration>) {
        self.queues
            .lock()
            .entry(feed)
            .or_default()
            .push_back(Scripted { result, delay });
    }

    /// Number of fetches issued for `feed`.
    pub fn calls(&self, feed: FeedKind) -> usize {
        self.calls.lock().get(&feed).copied().unwrap_or(0)
    }

    async fn next(&self, feed: FeedKind) -> Result<FeedPayload, FeedError> {
        *self.calls.lock().entry(feed).or_default() += 1;
        let scripted = self.queues.lock().get_mut(&feed).and_then(VecDeque::pop_front);

        let Some(scripted) = scripted else {
            return Err(FeedError::Fetch(format!("no scripted {} response", feed)));
        };
        if let Some(delay) = scripted.delay {
            tokio::time::sleep(delay).await;
        }
        scripted.result
    }
}

fn mismatch(feed: FeedKind, payload: FeedPayload) -> FeedError {
    FeedError::Parse(format!("scripted {} payload for {}", payload.kind(), feed))
}

#[async_trait]
impl Feeds for ScriptedFeeds {
    async fn streams(&self) -> Result<Vec<StreamRecord>, FeedError> {
        match self.next(FeedKind::Streams).await? {
            FeedPayload::Streams(records) => Ok(records),
            other => Err(mismatch(FeedKind::Streams, other)),
        }
    }

    async fn telemetry(&self) -> Result<TelemetryPayload, FeedError> {
        match self.next(FeedKind::Telemetry).await? {
            FeedPayload::Telemetry(payload) => Ok(payload),
            other => Err(mismatch(FeedKind::Telemetry, other)),
        }
    }

    async fn events(&self) -> Result<Vec<String>, FeedError> {
        match self.next(FeedKind::Events).await? {
            FeedPayload::Events(lines) => Ok(lines),
            other => Err(mismatch(FeedKind::Events, other)),
        }
    }

    async fn health(&self) -> Result<HealthReport, FeedError> {
        match self.next(FeedKind::Health).await? {
            FeedPayload::Health(report) => Ok(report),
            other => Err(mismatch(FeedKind::Health, other)),
        }
    }
}
