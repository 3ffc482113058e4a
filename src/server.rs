// Local fixture for the snapshot endpoint, so the viewer can be run without
// the upstream book service.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use rand::Rng;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::market_data::types::{OrderBookSnapshot, PriceLevel};

pub const SNAPSHOT_ROUTE: &str = "/orderbook/api/data";

#[derive(Debug, Clone)]
pub struct FixtureState {
    pub book: OrderBookSnapshot,
    // Randomly scale sizes on every request
    pub jitter: bool,
}

pub fn sample_book() -> OrderBookSnapshot {
    let lv = |p: &str, s: &str| PriceLevel::new(p, s);
    OrderBookSnapshot {
        asks: vec![
            lv("19233.63", "0.71772706"),
            lv("19233.62", "0.00488478"),
            lv("19232.77", "0.07"),
            lv("19231.43", "0.14"),
            lv("19231.42", "0.0921495"),
        ],
        bids: vec![
            lv("19227.69", "0.05"),
            lv("19227.48", "0.02417"),
            lv("19227.11", "0.04969543"),
            lv("19226.99", "0.19"),
            lv("19226.97", "0.001"),
        ],
    }
}

fn jittered(book: &OrderBookSnapshot) -> OrderBookSnapshot {
    let mut rng = rand::thread_rng();
    let mut scale = |levels: &[PriceLevel]| -> Vec<PriceLevel> {
        levels
            .iter()
            .map(|l| match l.size().parse::<f64>() {
                Ok(size) => PriceLevel::new(l.price(), format!("{:.8}", size * rng.gen_range(0.5..1.5))),
                Err(_) => l.clone(),
            })
            .collect()
    };
    let asks = scale(&book.asks);
    let bids = scale(&book.bids);
    OrderBookSnapshot { asks, bids }
}

async fn snapshot(State(state): State<Arc<FixtureState>>) -> Json<OrderBookSnapshot> {
    if state.jitter {
        Json(jittered(&state.book))
    } else {
        Json(state.book.clone())
    }
}

pub fn router(state: FixtureState) -> Router {
    Router::new()
        .route(SNAPSHOT_ROUTE, get(snapshot))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

/// Binds `addr` and serves until the process ends.
pub async fn serve(addr: SocketAddr, state: FixtureState) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, route = SNAPSHOT_ROUTE, jitter = state.jitter, "fixture endpoint listening");
    axum::serve(listener, router(state)).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jitter_keeps_prices_and_shape() {
        let book = sample_book();
        let j = jittered(&book);
        assert_eq!(j.asks.len(), book.asks.len());
        assert_eq!(j.bids.len(), book.bids.len());
        for (a, b) in j.asks.iter().zip(&book.asks) {
            assert_eq!(a.price(), b.price());
            assert!(a.size().parse::<f64>().unwrap() > 0.0);
        }
    }
}
