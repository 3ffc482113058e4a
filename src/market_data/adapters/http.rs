// HTTP snapshot source: GET <endpoint> -> OrderBookSnapshot

use std::time::Duration;

use tracing::debug;

use super::SnapshotSource;
use crate::error::{LadderError, LadderResult};
use crate::market_data::types::OrderBookSnapshot;

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8000/orderbook/api/data";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(800);

pub struct HttpSnapshotSource {
    pub endpoint: String,
    pub timeout: Duration,
    client: reqwest::Client,
}

impl HttpSnapshotSource {
    pub fn new(endpoint: &str, timeout: Duration) -> LadderResult<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { endpoint: endpoint.to_string(), timeout, client })
    }

    fn map_transport(&self, e: reqwest::Error) -> LadderError {
        if e.is_timeout() {
            LadderError::Timeout { url: self.endpoint.clone(), timeout: self.timeout }
        } else {
            LadderError::Http(e)
        }
    }
}

#[async_trait::async_trait]
impl SnapshotSource for HttpSnapshotSource {
    async fn fetch(&self) -> LadderResult<OrderBookSnapshot> {
        let res = self
            .client
            .get(&self.endpoint)
            .send()
            .await
            .map_err(|e| self.map_transport(e))?;

        let status = res.status();
        if !status.is_success() {
            return Err(LadderError::Status { url: self.endpoint.clone(), status: status.as_u16() });
        }

        // Read as text first so a bad body surfaces as a parse error, not a transport one
        let body = res.text().await.map_err(|e| self.map_transport(e))?;
        let snapshot = OrderBookSnapshot::from_json(&body)?;
        debug!(endpoint = %self.endpoint, asks = snapshot.asks.len(), bids = snapshot.bids.len(), "fetched snapshot");
        Ok(snapshot)
    }

    fn describe(&self) -> String {
        self.endpoint.clone()
    }
}
