//! Turning stream changes into user-facing notifications.
//!
//! Appearances and disappearances become toasts ([`Alert`]) handed to an
//! [`AlertSink`]. Active/inactive flips never toast; they mark the stream card
//! as flashing for a short, fixed time instead.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Debug;

use serde::Serialize;
use tracing::info;

use skywatch_types::StreamStatus;

use crate::data::ChangeEvent;

/// Default toast lifetime.
pub const DEFAULT_TOAST_TTL_MS: u64 = 4000;

/// Default duration of a status-change flash.
pub const DEFAULT_FLASH_MS: u64 = 1000;

/// Toast color class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Status change.
    Info,
    /// A stream came online.
    Success,
    /// A stream went away.
    Danger,
}

impl Severity {
    pub fn for_event(event: &ChangeEvent) -> Self {
        match event {
            ChangeEvent::Appeared(_) => Severity::Success,
            ChangeEvent::Disappeared(_) => Severity::Danger,
            ChangeEvent::StatusChanged { .. } => Severity::Info,
        }
    }
}

/// A toast notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alert {
    /// Unique for the lifetime of the process.
    pub id: u64,
    pub severity: Severity,
    pub path: String,
    pub message: String,
    pub created_at_ms: u64,
    pub expires_at_ms: u64,
}

impl Alert {
    pub fn is_expired(&self, now_ms: u64) -> bool {
        now_ms >= self.expires_at_ms
    }
}

/// Where alerts are presented.
pub trait AlertSink: Send + Debug {
    fn deliver(&mut self, alert: Alert);
}

/// In-memory toast stack, newest last.
#[derive(Debug, Clone, Default)]
pub struct ToastBoard {
    toasts: Vec<Alert>,
}

impl ToastBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove a toast before it expires. Returns false for unknown ids.
    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.toasts.len();
        self.toasts.retain(|t| t.id != id);
        self.toasts.len() != before
    }

    /// Drop every expired toast, returning how many were dropped.
    pub fn expire(&mut self, now_ms: u64) -> usize {
        let before = self.toasts.len();
        self.toasts.retain(|t| !t.is_expired(now_ms));
        before - self.toasts.len()
    }

    /// Toasts still visible at `now_ms`.
    pub fn live(&self, now_ms: u64) -> impl Iterator<Item = &Alert> {
        self.toasts.iter().filter(move |t| !t.is_expired(now_ms))
    }

    /// Toasts held, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.toasts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }
}

impl AlertSink for ToastBoard {
    fn deliver(&mut self, alert: Alert) {
        info!(id = alert.id, severity = ?alert.severity, path = %alert.path, "{}", alert.message);
        self.toasts.push(alert);
    }
}

/// A transient highlight on a stream card after a status flip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Flash {
    pub path: String,
    pub from: StreamStatus,
    pub to: StreamStatus,
    pub until_ms: u64,
}

/// Maps change events to exactly one notification each.
#[derive(Debug, Clone)]
pub struct NotificationDeduper {
    next_id: u64,
    toast_ttl_ms: u64,
    flash_ms: u64,
    flashes: BTreeMap<String, Flash>,
    present: BTreeSet<String>,
}

impl Default for NotificationDeduper {
    fn default() -> Self {
        Self::new(DEFAULT_TOAST_TTL_MS, DEFAULT_FLASH_MS)
    }
}

impl NotificationDeduper {
    pub fn new(toast_ttl_ms: u64, flash_ms: u64) -> Self {
        Self {
            next_id: 1,
            toast_ttl_ms,
            flash_ms,
            flashes: BTreeMap::new(),
            present: BTreeSet::new(),
        }
    }

    /// Dispatch one reconcile pass worth of events.
    ///
    /// An appearance for a path already announced, or a disappearance for a
    /// path never announced, is dropped. Returns the number of alerts sent.
    pub fn handle(&mut self, events: &[ChangeEvent], now_ms: u64, sink: &mut dyn AlertSink) -> usize {
        let mut sent = 0;

        for event in events {
            match event {
                ChangeEvent::Appeared(path) => {
                    if self.present.insert(path.clone()) {
                        sink.deliver(self.alert(event, format!("New stream: {}", path), now_ms));
                        sent += 1;
                    }
                }
                ChangeEvent::Disappeared(path) => {
                    if self.present.remove(path) {
                        self.flashes.remove(path);
                        sink.deliver(self.alert(event, format!("Stream ended: {}", path), now_ms));
                        sent += 1;
                    }
                }
                ChangeEvent::StatusChanged { path, from, to } => {
                    let until_ms = now_ms + self.flash_ms;
                    // A flip during a running flash does not extend it.
                    let flash = self.flashes.entry(path.clone()).or_insert(Flash {
                        path: path.clone(),
                        from: *from,
                        to: *to,
                        until_ms,
                    });
                    if flash.until_ms <= now_ms {
                        flash.until_ms = until_ms;
                    }
                    flash.from = *from;
                    flash.to = *to;
                }
            }
        }

        sent
    }

    fn alert(&mut self, event: &ChangeEvent, message: String, now_ms: u64) -> Alert {
        let id = self.next_id;
        self.next_id += 1;
        Alert {
            id,
            severity: Severity::for_event(event),
            path: event.path().to_string(),
            message,
            created_at_ms: now_ms,
            expires_at_ms: now_ms + self.toast_ttl_ms,
        }
    }

    pub fn is_flashing(&self, path: &str, now_ms: u64) -> bool {
        self.flashes.get(path).is_some_and(|f| f.until_ms > now_ms)
    }

    /// Flashes still running at `now_ms`.
    pub fn flashes(&self, now_ms: u64) -> impl Iterator<Item = &Flash> {
        self.flashes.values().filter(move |f| f.until_ms > now_ms)
    }

    /// Forget finished flashes.
    pub fn prune(&mut self, now_ms: u64) {
        self.flashes.retain(|_, f| f.until_ms > now_ms);
    }
}
