pub mod app;
pub mod config;
pub mod error;
pub mod market_data;
pub mod render;
pub mod server;
pub mod telemetry;

pub use error::{LadderError, LadderResult};
