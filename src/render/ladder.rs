// Presentation model: the slice of a snapshot that actually ends up on screen.

use crate::market_data::types::{OrderBookSnapshot, PriceLevel, Side};

/// Rows per side shown by default.
pub const DEFAULT_DEPTH: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LadderRow {
    pub price: String,
    pub size: String,
}

impl From<&PriceLevel> for LadderRow {
    fn from(level: &PriceLevel) -> Self {
        Self { price: level.price().to_string(), size: level.size().to_string() }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LadderView {
    pub asks: Vec<LadderRow>,
    pub bids: Vec<LadderRow>,
}

impl LadderView {
    /// First `depth` levels of each side, in the order the endpoint supplied them.
    pub fn from_snapshot(snapshot: &OrderBookSnapshot, depth: usize) -> Self {
        Self {
            asks: snapshot.asks.iter().take(depth).map(LadderRow::from).collect(),
            bids: snapshot.bids.iter().take(depth).map(LadderRow::from).collect(),
        }
    }

    pub fn rows(&self, side: Side) -> &[LadderRow] {
        match side {
            Side::Bid => &self.bids,
            Side::Ask => &self.asks,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.asks.is_empty() && self.bids.is_empty()
    }
}
