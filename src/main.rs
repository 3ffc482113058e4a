use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tokio::sync::watch;
use tracing::{info, warn};

use lobview_rs::app::{terminal_controls, App};
use lobview_rs::config::{Overrides, RenderMode, Settings};
use lobview_rs::market_data::adapters::http::HttpSnapshotSource;
use lobview_rs::market_data::adapters::SnapshotSource;
use lobview_rs::render::text::TextRenderer;
use lobview_rs::render::theme::Theme;
use lobview_rs::render::tui::{self, TerminalRenderer};
use lobview_rs::server::{self, FixtureState};
use lobview_rs::telemetry::{self, LogSink};

const METRICS_PORT: u16 = 9000;

#[derive(Parser)]
#[command(name = "lobview", version, about = "Live order book ladder in the terminal")]
struct Cli {
    /// Settings file (default: ./lobview.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Poll the snapshot endpoint and draw the ladder (default)
    Watch(WatchArgs),
    /// Serve a sample snapshot on /orderbook/api/data
    Serve(ServeArgs),
}

#[derive(Args, Default)]
struct WatchArgs {
    /// Snapshot endpoint URL
    #[arg(long)]
    endpoint: Option<String>,
    #[arg(long, value_enum)]
    mode: Option<RenderMode>,
    /// Rows per side
    #[arg(long)]
    depth: Option<usize>,
    /// Per-request timeout
    #[arg(long)]
    timeout_ms: Option<u64>,
    /// Write logs here (the full-screen mode logs nowhere otherwise)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[derive(Args)]
struct ServeArgs {
    #[arg(long)]
    bind: Option<String>,
    /// Randomise sizes on every request
    #[arg(long)]
    jitter: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok(); // load .env

    let cli = Cli::parse();
    match cli.command.unwrap_or_else(|| Command::Watch(WatchArgs::default())) {
        Command::Watch(args) => watch(cli.config, args).await,
        Command::Serve(args) => serve(cli.config, args).await,
    }
}

async fn watch(config_file: Option<PathBuf>, args: WatchArgs) -> anyhow::Result<()> {
    let overrides = Overrides {
        config_file,
        endpoint: args.endpoint,
        request_timeout_ms: args.timeout_ms,
        depth: args.depth,
        mode: args.mode,
        log_file: args.log_file,
        bind: None,
    };
    let settings = Settings::load(&overrides).context("loading settings")?;

    let sink = match (&settings.log_file, settings.mode) {
        (Some(path), _) => LogSink::File(path.clone()),
        (None, RenderMode::Tui) => LogSink::Off,
        (None, RenderMode::Text) => LogSink::Stderr,
    };
    telemetry::init_tracing(&settings.log_filter, &sink).context("initialising logging")?;
    telemetry::init_metrics(METRICS_PORT)?;
    info!(endpoint = %settings.endpoint, mode = settings.mode.as_str(), depth = settings.depth, "lobview starting");

    let source: Arc<dyn SnapshotSource> =
        Arc::new(HttpSnapshotSource::new(&settings.endpoint, settings.request_timeout())?);
    let shutdown = ctrl_c_signal();

    match settings.mode {
        RenderMode::Text => {
            let mut app = App::new(TextRenderer::new(io::stdout(), settings.depth));
            app.run(source, futures::stream::pending(), shutdown).await?;
        }
        RenderMode::Tui => {
            let terminal = tui::init_terminal().context("setting up terminal")?;
            let mut app = App::new(TerminalRenderer::new(terminal, Theme::default(), settings.depth));
            let result = app.run(source, terminal_controls(), shutdown).await;

            // Restore terminal before reporting anything
            let mut renderer = app.into_renderer();
            tui::restore_terminal(renderer.terminal_mut())?;
            result?;
        }
    }

    info!("lobview stopped");
    Ok(())
}

async fn serve(config_file: Option<PathBuf>, args: ServeArgs) -> anyhow::Result<()> {
    let overrides = Overrides { config_file, bind: args.bind, ..Overrides::default() };
    let settings = Settings::load(&overrides).context("loading settings")?;
    telemetry::init_tracing(&settings.log_filter, &LogSink::Stderr)?;

    let addr: SocketAddr = settings
        .bind
        .parse()
        .with_context(|| format!("invalid bind address {}", settings.bind))?;
    let state = FixtureState { book: server::sample_book(), jitter: args.jitter };
    server::serve(addr, state).await?;
    Ok(())
}

// SIGINT flips the watch; raw-mode Ctrl-C arrives as a key event instead
fn ctrl_c_signal() -> watch::Receiver<bool> {
    let (tx, rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("received Ctrl-C, shutting down");
                let _ = tx.send(true);
            }
            Err(e) => {
                warn!(error = %e, "could not listen for Ctrl-C");
                // keep the sender alive so the app is not told to stop
                std::future::pending::<()>().await;
            }
        }
    });
    rx
}
