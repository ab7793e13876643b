// Monitor service - Use case for turning raw telemetry lines into notices
use crate::application::alert_sink::AlertDispatcher;
use crate::application::router::{ReadingRouter, RouterSnapshot};
use crate::domain::reading::Message;
use crate::infrastructure::line_decoder::{DecodeError, decode};
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// What happened to a single line.
#[derive(Debug, Clone, PartialEq)]
pub enum LineOutcome {
    Reading { alerted: bool },
    Topology,
    Unrecognized,
    Dropped(DecodeError),
}

#[derive(Debug, Default)]
struct Counters {
    lines: AtomicU64,
    readings: AtomicU64,
    topology: AtomicU64,
    unrecognized: AtomicU64,
    dropped: AtomicU64,
    alerts: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonitorStats {
    pub lines: u64,
    pub readings: u64,
    pub topology: u64,
    pub unrecognized: u64,
    pub dropped: u64,
    pub alerts: u64,
}

#[derive(Clone)]
pub struct MonitorService {
    router: Arc<ReadingRouter>,
    dispatcher: AlertDispatcher,
    counters: Arc<Counters>,
}

impl MonitorService {
    pub fn new(router: Arc<ReadingRouter>, dispatcher: AlertDispatcher) -> Self {
        Self {
            router,
            dispatcher,
            counters: Arc::new(Counters::default()),
        }
    }

    /// Decode, route and dispatch one raw line. Malformed lines are dropped
    /// without touching any series.
    pub fn handle_line(&self, raw: &str) -> LineOutcome {
        self.counters.lines.fetch_add(1, Ordering::Relaxed);
        match decode(raw) {
            Ok(message) => self.apply(message, raw),
            Err(e) => self.drop_line(raw, e),
        }
    }

    /// Same as [`handle_line`](Self::handle_line) for a line read off the wire.
    /// Invalid UTF-8 is a per-line drop.
    pub fn handle_bytes(&self, raw: &[u8]) -> LineOutcome {
        match std::str::from_utf8(raw) {
            Ok(line) => self.handle_line(line),
            Err(_) => {
                self.counters.lines.fetch_add(1, Ordering::Relaxed);
                self.drop_line(&String::from_utf8_lossy(raw), DecodeError::InvalidUtf8)
            }
        }
    }

    /// Count a line the transport refused to frame (e.g. over the length cap).
    pub fn reject_line(&self, error: DecodeError) -> LineOutcome {
        self.counters.lines.fetch_add(1, Ordering::Relaxed);
        self.drop_line("", error)
    }

    fn drop_line(&self, raw: &str, error: DecodeError) -> LineOutcome {
        self.counters.dropped.fetch_add(1, Ordering::Relaxed);
        tracing::warn!(line = raw, error = %error, "Dropping malformed telemetry line");
        LineOutcome::Dropped(error)
    }

    fn apply(&self, message: Message, raw: &str) -> LineOutcome {
        match message {
            Message::Reading(reading) => {
                self.counters.readings.fetch_add(1, Ordering::Relaxed);
                tracing::trace!(?reading, "Routing reading");

                let alert = self.router.route(&reading);
                let alerted = alert.is_some();
                if let Some(notice) = alert {
                    self.counters.alerts.fetch_add(1, Ordering::Relaxed);
                    self.dispatcher.dispatch(&notice);
                }
                LineOutcome::Reading { alerted }
            }
            Message::Topology(event) => {
                self.counters.topology.fetch_add(1, Ordering::Relaxed);
                let notice = self.router.topology_notice(&event);
                self.dispatcher.dispatch(&notice);
                LineOutcome::Topology
            }
            Message::Unrecognized => {
                self.counters.unrecognized.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(line = raw, "Ignoring unrecognized telemetry line");
                LineOutcome::Unrecognized
            }
        }
    }

    pub fn snapshot(&self) -> RouterSnapshot {
        self.router.snapshot()
    }

    pub fn stats(&self) -> MonitorStats {
        let c = &self.counters;
        MonitorStats {
            lines: c.lines.load(Ordering::Relaxed),
            readings: c.readings.load(Ordering::Relaxed),
            topology: c.topology.load(Ordering::Relaxed),
            unrecognized: c.unrecognized.load(Ordering::Relaxed),
            dropped: c.dropped.load(Ordering::Relaxed),
            alerts: c.alerts.load(Ordering::Relaxed),
        }
    }
}
