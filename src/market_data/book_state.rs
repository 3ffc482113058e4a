use std::sync::Arc;
use std::time::Instant;

use parking_lot::RwLock;

use crate::market_data::adapters::FeedEvent;
use crate::market_data::types::OrderBookSnapshot;

pub type SharedBookState = Arc<RwLock<BookState>>;

/// Current snapshot plus feed health, owned by the app loop and handed to renderers.
#[derive(Debug, Default)]
pub struct BookState {
    snapshot: Option<OrderBookSnapshot>,
    last_error: Option<String>,
    updated_at: Option<Instant>,
    pub ticks_ok: u64,
    pub ticks_failed: u64,
}

impl BookState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedBookState {
        Arc::new(RwLock::new(Self::new()))
    }

    // Replace the whole book with a fresh snapshot
    pub fn apply_snapshot(&mut self, snapshot: OrderBookSnapshot) {
        self.snapshot = Some(snapshot);
        self.last_error = None;
        self.updated_at = Some(Instant::now());
        self.ticks_ok += 1;
    }

    // Keep the last good snapshot, just remember what went wrong
    pub fn record_failure(&mut self, error: impl Into<String>) {
        self.last_error = Some(error.into());
        self.ticks_failed += 1;
    }

    pub fn apply(&mut self, event: FeedEvent) {
        match event {
            FeedEvent::Snapshot(snapshot) => self.apply_snapshot(snapshot),
            FeedEvent::Failed { error } => self.record_failure(error),
        }
    }

    pub fn snapshot(&self) -> Option<&OrderBookSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn updated_at(&self) -> Option<Instant> {
        self.updated_at
    }

    /// One-line feed status for the footer of every renderer.
    pub fn status_line(&self) -> String {
        match (&self.last_error, self.updated_at) {
            (Some(err), Some(at)) => format!(
                "ERROR: {} (showing data from {:.1}s ago)",
                err,
                at.elapsed().as_secs_f64()
            ),
            (Some(err), None) => format!("ERROR: {} (no data yet)", err),
            (None, Some(at)) => format!(
                "updated {:.1}s ago | ok {} | failed {}",
                at.elapsed().as_secs_f64(),
                self.ticks_ok,
                self.ticks_failed
            ),
            (None, None) => "waiting for first snapshot...".to_string(),
        }
    }
}
