use std::time::Duration;

#[derive(thiserror::Error, Debug)]
pub enum LadderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("request to {url} timed out after {timeout:?}")]
    Timeout { url: String, timeout: Duration },

    #[error("endpoint {url} returned status {status}")]
    Status { url: String, status: u16 },

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("feed channel closed")]
    ChannelClosed,
}

pub type LadderResult<T> = Result<T, LadderError>;
