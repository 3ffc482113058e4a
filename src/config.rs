use std::path::PathBuf;
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::error::{LadderError, LadderResult};
use crate::market_data::adapters::http::{DEFAULT_ENDPOINT, DEFAULT_TIMEOUT};
use crate::render::ladder::DEFAULT_DEPTH;

pub const DEFAULT_BIND: &str = "127.0.0.1:8000";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    Tui,
    Text,
}

impl RenderMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RenderMode::Tui => "tui",
            RenderMode::Text => "text",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub endpoint: String,
    pub request_timeout_ms: u64,
    pub depth: usize,
    pub mode: RenderMode,
    pub log_filter: String,
    pub log_file: Option<PathBuf>,
    pub bind: String,
}

/// Values given on the command line; they win over file and environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub config_file: Option<PathBuf>,
    pub endpoint: Option<String>,
    pub request_timeout_ms: Option<u64>,
    pub depth: Option<usize>,
    pub mode: Option<RenderMode>,
    pub log_file: Option<PathBuf>,
    pub bind: Option<String>,
}

impl Settings {
    /// defaults -> lobview.toml (or --config) -> LOBVIEW_* env -> CLI
    pub fn load(overrides: &Overrides) -> LadderResult<Self> {
        let mut builder = Config::builder()
            .set_default("endpoint", DEFAULT_ENDPOINT)?
            .set_default("request_timeout_ms", DEFAULT_TIMEOUT.as_millis() as i64)?
            .set_default("depth", DEFAULT_DEPTH as i64)?
            .set_default("mode", RenderMode::Tui.as_str())?
            .set_default("log_filter", "info")?
            .set_default("bind", DEFAULT_BIND)?;

        builder = match &overrides.config_file {
            Some(path) => builder.add_source(File::from(path.as_path()).required(true)),
            None => builder.add_source(File::with_name("lobview").required(false)),
        };

        let settings: Settings = builder
            .add_source(Environment::with_prefix("LOBVIEW").try_parsing(true))
            .set_override_option("endpoint", overrides.endpoint.clone())?
            .set_override_option("request_timeout_ms", overrides.request_timeout_ms.map(|v| v as i64))?
            .set_override_option("depth", overrides.depth.map(|v| v as i64))?
            .set_override_option("mode", overrides.mode.map(|m| m.as_str()))?
            .set_override_option("log_file", overrides.log_file.as_ref().map(|p| p.display().to_string()))?
            .set_override_option("bind", overrides.bind.clone())?
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> LadderResult<()> {
        if self.endpoint.trim().is_empty() {
            return Err(invalid("endpoint must not be empty"));
        }
        if self.depth == 0 {
            return Err(invalid("depth must be at least 1"));
        }
        if self.request_timeout_ms == 0 {
            return Err(invalid("request_timeout_ms must be positive"));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

fn invalid(msg: &str) -> LadderError {
    LadderError::Config(ConfigError::Message(msg.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = Settings::load(&Overrides::default()).unwrap();
        assert_eq!(s.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(s.depth, 5);
        assert_eq!(s.request_timeout(), DEFAULT_TIMEOUT);
        assert_eq!(s.mode, RenderMode::Tui);
        assert!(s.log_file.is_none());
    }

    #[test]
    fn test_cli_overrides_win() {
        let overrides = Overrides {
            endpoint: Some("http://localhost:9999/api/data".into()),
            depth: Some(3),
            mode: Some(RenderMode::Text),
            log_file: Some(PathBuf::from("/tmp/lobview.log")),
            ..Overrides::default()
        };
        let s = Settings::load(&overrides).unwrap();
        assert_eq!(s.endpoint, "http://localhost:9999/api/data");
        assert_eq!(s.depth, 3);
        assert_eq!(s.mode, RenderMode::Text);
        assert_eq!(s.log_file, Some(PathBuf::from("/tmp/lobview.log")));
    }

    #[test]
    fn test_config_file_layer() {
        let path = std::env::temp_dir().join(format!("lobview-test-{}.toml", std::process::id()));
        std::fs::write(&path, "endpoint = \"http://10.0.0.2/orderbook/api/data\"\nrequest_timeout_ms = 300\n").unwrap();

        let overrides = Overrides { config_file: Some(path.clone()), ..Overrides::default() };
        let s = Settings::load(&overrides).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(s.endpoint, "http://10.0.0.2/orderbook/api/data");
        assert_eq!(s.request_timeout(), Duration::from_millis(300));
        assert_eq!(s.depth, 5);
    }

    #[test]
    fn test_rejects_zero_depth() {
        let overrides = Overrides { depth: Some(0), ..Overrides::default() };
        assert!(matches!(Settings::load(&overrides), Err(LadderError::Config(_))));
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let overrides = Overrides {
            config_file: Some(PathBuf::from("/nonexistent/lobview.toml")),
            ..Overrides::default()
        };
        assert!(Settings::load(&overrides).is_err());
    }
}
