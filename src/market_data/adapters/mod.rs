// Shared trait + event for snapshot sources

use crate::error::LadderResult;
use crate::market_data::types::OrderBookSnapshot;

#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    // Full snapshot, replaces whatever was shown before
    Snapshot(OrderBookSnapshot),
    // Tick failed; the last good snapshot stays on screen
    Failed { error: String },
}

#[async_trait::async_trait]
pub trait SnapshotSource: Send + Sync {
    async fn fetch(&self) -> LadderResult<OrderBookSnapshot>;

    // Shown in logs and the status line
    fn describe(&self) -> String;
}

pub mod http;
