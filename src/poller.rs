//! Independent periodic polling of every feed.
//!
//! Each feed gets its own timer task. Every tick spawns one fetch, so a slow
//! or hung request never delays that feed's next tick or any other feed.
//! Completed fetches are applied to the shared [`Engine`] under a short lock.
//!
//! Responses can complete out of order. Each fetch is tagged with a per-feed
//! sequence number when it is issued, and the [`OrderingPolicy`] decides what
//! happens to a response that completes after a newer one was applied.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use skywatch_feeds::{FeedError, FeedKind, Feeds};

use crate::engine::{Engine, FeedPayload};
use crate::view::DashboardView;

/// What to do with a response that completes after a newer one for the same feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderingPolicy {
    /// Apply every response as it completes.
    #[default]
    LastCompleted,
    /// Drop responses older than the last one applied.
    LastIssued,
}

/// Poll interval per feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    pub streams: Duration,
    pub telemetry: Duration,
    pub events: Duration,
    pub health: Duration,
}

impl Default for Schedule {
    fn default() -> Self {
        Self {
            streams: Duration::from_secs(5),
            telemetry: Duration::from_secs(1),
            events: Duration::from_secs(5),
            health: Duration::from_secs(10),
        }
    }
}

impl Schedule {
    pub fn interval(&self, feed: FeedKind) -> Duration {
        match feed {
            FeedKind::Streams => self.streams,
            FeedKind::Telemetry => self.telemetry,
            FeedKind::Events => self.events,
            FeedKind::Health => self.health,
        }
    }
}

/// Identifies one issued fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    pub feed: FeedKind,
    pub seq: u64,
}

/// What happened to a completed fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Applied,
    Failed,
    /// Discarded because a newer response was already applied.
    Stale,
}

#[derive(Debug, Default, Clone, Copy)]
struct Sequence {
    issued: u64,
    applied: u64,
}

/// Fetch one feed and wrap the result for the engine.
pub async fn fetch(feeds: &dyn Feeds, feed: FeedKind) -> Result<FeedPayload, FeedError> {
    Ok(match feed {
        FeedKind::Streams => FeedPayload::Streams(feeds.streams().await?),
        FeedKind::Telemetry => FeedPayload::Telemetry(feeds.telemetry().await?),
        FeedKind::Events => FeedPayload::Events(feeds.events().await?),
        FeedKind::Health => FeedPayload::Health(feeds.health().await?),
    })
}

/// Drives the feeds and applies their results to the engine.
#[derive(Debug)]
pub struct Poller {
    feeds: Arc<dyn Feeds>,
    engine: Arc<Mutex<Engine>>,
    ordering: OrderingPolicy,
    sequences: Mutex<BTreeMap<FeedKind, Sequence>>,
}

impl Poller {
    pub fn new(feeds: Arc<dyn Feeds>, engine: Engine, ordering: OrderingPolicy) -> Self {
        Self {
            feeds,
            engine: Arc::new(Mutex::new(engine)),
            ordering,
            sequences: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn engine(&self) -> &Arc<Mutex<Engine>> {
        &self.engine
    }

    pub fn ordering(&self) -> OrderingPolicy {
        self.ordering
    }

    pub fn view(&self) -> DashboardView {
        self.engine.lock().view()
    }

    /// Issue a new sequence number for `feed`.
    pub fn begin(&self, feed: FeedKind) -> FetchTicket {
        let mut sequences = self.sequences.lock();
        let sequence = sequences.entry(feed).or_default();
        sequence.issued += 1;
        FetchTicket {
            feed,
            seq: sequence.issued,
        }
    }

    /// Apply a completed fetch, subject to the ordering policy.
    pub fn finish(
        &self,
        ticket: FetchTicket,
        result: Result<FeedPayload, FeedError>,
    ) -> TickOutcome {
        let mut sequences = self.sequences.lock();
        let sequence = sequences.entry(ticket.feed).or_default();

        if self.ordering == OrderingPolicy::LastIssued && ticket.seq < sequence.applied {
            debug!(
                feed = %ticket.feed,
                seq = ticket.seq,
                applied = sequence.applied,
                "discarding stale response"
            );
            return TickOutcome::Stale;
        }
        sequence.applied = sequence.applied.max(ticket.seq);

        let outcome = if result.is_ok() {
            TickOutcome::Applied
        } else {
            TickOutcome::Failed
        };
        // Sequence lock is held so concurrent completions apply in order.
        self.engine.lock().apply(ticket.feed, result);
        debug!(feed = %ticket.feed, seq = ticket.seq, ?outcome, "tick complete");
        outcome
    }

    /// Run one fetch-and-apply cycle for `feed`.
    pub async fn tick(&self, feed: FeedKind) -> TickOutcome {
        let ticket = self.begin(feed);
        let result = fetch(self.feeds.as_ref(), feed).await;
        self.finish(ticket, result)
    }

    /// Tick every feed once, concurrently.
    pub async fn tick_all(&self) -> Vec<(FeedKind, TickOutcome)> {
        let (streams, telemetry, events, health) = tokio::join!(
            self.tick(FeedKind::Streams),
            self.tick(FeedKind::Telemetry),
            self.tick(FeedKind::Events),
            self.tick(FeedKind::Health),
        );
        vec![
            (FeedKind::Streams, streams),
            (FeedKind::Telemetry, telemetry),
            (FeedKind::Events, events),
            (FeedKind::Health, health),
        ]
    }

    /// Start one timer task per feed. Each feed ticks immediately, then on
    /// its interval, until the returned handle is stopped or dropped.
    pub fn spawn(self: &Arc<Self>, schedule: &Schedule) -> PollerHandle {
        let (stop_tx, stop_rx) = watch::channel(false);

        let tasks = FeedKind::ALL
            .into_iter()
            .map(|feed| {
                let poller = Arc::clone(self);
                let mut stop_rx = stop_rx.clone();
                let period = schedule.interval(feed);

                tokio::spawn(async move {
                    let mut interval_timer = tokio::time::interval(period);
                    interval_timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

                    loop {
                        tokio::select! {
                            _ = interval_timer.tick() => {
                                let poller = Arc::clone(&poller);
                                tokio::spawn(async move {
                                    poller.tick(feed).await;
                                });
                            }
                            changed = stop_rx.changed() => {
                                if changed.is_err() || *stop_rx.borrow() {
                                    break;
                                }
                            }
                        }
                    }
                    debug!(%feed, "poll loop stopped");
                })
            })
            .collect();

        PollerHandle { stop_tx, tasks }
    }
}

/// Handle for the timer tasks started by [`Poller::spawn`].
///
/// Drop this handle to stop polling, or call `stop()` explicitly. Fetches
/// already in flight are not cancelled.
#[derive(Debug)]
pub struct PollerHandle {
    stop_tx: watch::Sender<bool>,
    tasks: Vec<JoinHandle<()>>,
}

impl PollerHandle {
    /// Stop every timer.
    pub fn stop(&self) {
        let _ = self.stop_tx.send(true);
    }

    /// Stop every timer and wait for the timer tasks to exit.
    pub async fn shutdown(self) {
        self.stop();
        for task in self.tasks {
            let _ = task.await;
        }
    }
}
