// Poller drives a snapshot source on a fixed interval and forwards results
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{mpsc, watch};
use tokio::time::{Duration, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::error::{LadderError, LadderResult};
use crate::market_data::adapters::{FeedEvent, SnapshotSource};

/// Fixed refresh cadence of the ladder.
pub const POLL_INTERVAL: Duration = Duration::from_millis(1000);

pub struct Poller {
    source: Arc<dyn SnapshotSource>,
    interval: Duration,
}

impl Poller {
    pub fn new(source: Arc<dyn SnapshotSource>) -> Self {
        Self { source, interval: POLL_INTERVAL }
    }

    /// Shorter cadence for in-process tests; the binary always uses `POLL_INTERVAL`.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Runs until `shutdown` flips (or its sender is dropped) or the receiver of `tx` goes away.
    /// A failed fetch is reported as `FeedEvent::Failed` and the next tick runs as usual.
    pub async fn run(self, tx: mpsc::Sender<FeedEvent>, mut shutdown: watch::Receiver<bool>) -> LadderResult<()> {
        let endpoint = self.source.describe();
        info!(%endpoint, interval_ms = self.interval.as_millis() as u64, "poller started");

        let mut interval = tokio::time::interval(self.interval);
        // A slow fetch pushes the next tick back instead of bunching ticks up
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            if *shutdown.borrow() {
                break;
            }

            tokio::select! {
                _ = interval.tick() => {}
                _ = shutdown.changed() => break,
            }

            let started = Instant::now();
            let result = tokio::select! {
                r = self.source.fetch() => r,
                _ = shutdown.changed() => {
                    debug!("in-flight fetch cancelled");
                    break;
                }
            };
            metrics::histogram!("lobview_fetch_latency_seconds").record(started.elapsed().as_secs_f64());

            let event = match result {
                Ok(snapshot) => {
                    metrics::counter!("lobview_fetch_ok_total").increment(1);
                    debug!(asks = snapshot.asks.len(), bids = snapshot.bids.len(), "tick ok");
                    FeedEvent::Snapshot(snapshot)
                }
                Err(e) => {
                    metrics::counter!("lobview_fetch_failed_total").increment(1);
                    warn!(%endpoint, error = %e, "tick failed, keeping last snapshot");
                    FeedEvent::Failed { error: e.to_string() }
                }
            };

            if tx.send(event).await.is_err() {
                debug!("feed receiver dropped");
                return Err(LadderError::ChannelClosed);
            }
        }

        info!(%endpoint, "poller stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market_data::types::{OrderBookSnapshot, PriceLevel};
    use parking_lot::Mutex;
    use std::collections::VecDeque;

    // Replays a fixed script of results, then keeps returning the last one
    struct ScriptedSource {
        script: Mutex<VecDeque<Result<OrderBookSnapshot, String>>>,
        calls: Mutex<u32>,
    }

    impl ScriptedSource {
        fn new(script: Vec<Result<OrderBookSnapshot, String>>) -> Self {
            Self { script: Mutex::new(script.into()), calls: Mutex::new(0) }
        }
    }

    #[async_trait::async_trait]
    impl SnapshotSource for ScriptedSource {
        async fn fetch(&self) -> LadderResult<OrderBookSnapshot> {
            *self.calls.lock() += 1;
            let mut script = self.script.lock();
            let next = if script.len() > 1 { script.pop_front() } else { script.front().cloned() };
            match next {
                Some(Ok(snap)) => Ok(snap),
                Some(Err(body)) => Err(OrderBookSnapshot::from_json(&body).unwrap_err().into()),
                None => Err(LadderError::ChannelClosed),
            }
        }

        fn describe(&self) -> String {
            "scripted".to_string()
        }
    }

    fn one_level(price: &str) -> OrderBookSnapshot {
        OrderBookSnapshot { asks: vec![PriceLevel::new(price, "1")], bids: vec![] }
    }

    #[tokio::test]
    async fn test_malformed_body_does_not_stop_polling() {
        let source = Arc::new(ScriptedSource::new(vec![
            Ok(one_level("1.01")),
            Err("{not json".to_string()),
            Ok(one_level("1.02")),
        ]));
        let (tx, mut rx) = mpsc::channel(16);
        let (stop_tx, stop_rx) = watch::channel(false);

        let poller = Poller::new(source.clone()).with_interval(Duration::from_millis(10));
        let handle = tokio::spawn(poller.run(tx, stop_rx));

        assert_eq!(rx.recv().await, Some(FeedEvent::Snapshot(one_level("1.01"))));
        assert!(matches!(rx.recv().await, Some(FeedEvent::Failed { .. })));
        assert_eq!(rx.recv().await, Some(FeedEvent::Snapshot(one_level("1.02"))));

        stop_tx.send(true).unwrap();
        handle.await.unwrap().unwrap();
        assert!(*source.calls.lock() >= 3);
    }

    // Never answers within a test's lifetime
    struct StalledSource {
        calls: Mutex<u32>,
    }

    #[async_trait::async_trait]
    impl SnapshotSource for StalledSource {
        async fn fetch(&self) -> LadderResult<OrderBookSnapshot> {
            *self.calls.lock() += 1;
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(OrderBookSnapshot::default())
        }

        fn describe(&self) -> String {
            "stalled".to_string()
        }
    }

    #[tokio::test]
    async fn test_shutdown_cancels_in_flight_fetch() {
        let source = Arc::new(StalledSource { calls: Mutex::new(0) });
        let (tx, mut rx) = mpsc::channel(4);
        let (stop_tx, stop_rx) = watch::channel(false);

        let poller = Poller::new(source.clone()).with_interval(Duration::from_millis(10));
        let handle = tokio::spawn(poller.run(tx, stop_rx));

        // let the first fetch start
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(*source.calls.lock(), 1);

        stop_tx.send(true).unwrap();
        let result = tokio::time::timeout(Duration::from_millis(200), handle)
            .await
            .expect("poller kept waiting on the fetch");
        result.unwrap().unwrap();
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_slow_fetch_does_not_overlap_ticks() {
        let source = Arc::new(StalledSource { calls: Mutex::new(0) });
        let (tx, _rx) = mpsc::channel(4);
        let (stop_tx, stop_rx) = watch::channel(false);

        let poller = Poller::new(source.clone()).with_interval(Duration::from_millis(10));
        let handle = tokio::spawn(poller.run(tx, stop_rx));

        // ten intervals pass while the first fetch is still pending
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(*source.calls.lock(), 1);

        stop_tx.send(true).unwrap();
        handle.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_receiver_gone_ends_poller() {
        let source = Arc::new(ScriptedSource::new(vec![Ok(one_level("1.01"))]));
        let (tx, rx) = mpsc::channel(1);
        let (_stop_tx, stop_rx) = watch::channel(false);
        drop(rx);

        let result = Poller::new(source).with_interval(Duration::from_millis(5)).run(tx, stop_rx).await;
        assert!(matches!(result, Err(LadderError::ChannelClosed)));
    }
}
