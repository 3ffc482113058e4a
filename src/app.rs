// Glue between the poller, the shared book state and a renderer.

use std::sync::Arc;

use crossterm::event::{Event, EventStream, KeyCode, KeyEventKind, KeyModifiers};
use futures::stream::LocalBoxStream;
use futures::{Stream, StreamExt};
use tokio::sync::{mpsc, watch};
use tokio::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{LadderError, LadderResult};
use crate::market_data::adapters::{FeedEvent, SnapshotSource};
use crate::market_data::book_state::{BookState, SharedBookState};
use crate::market_data::poller::{Poller, POLL_INTERVAL};
use crate::render::LadderRenderer;

/// Poller -> app channel. One event per second, so a handful of slots is plenty.
const FEED_CHANNEL_BUFFER: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Quit,
    Redraw,
}

pub struct App<R: LadderRenderer> {
    state: SharedBookState,
    renderer: R,
    poll_interval: Duration,
}

impl<R: LadderRenderer> App<R> {
    pub fn new(renderer: R) -> Self {
        Self::with_state(BookState::shared(), renderer)
    }

    pub fn with_state(state: SharedBookState, renderer: R) -> Self {
        Self { state, renderer, poll_interval: POLL_INTERVAL }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn state(&self) -> SharedBookState {
        Arc::clone(&self.state)
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn into_renderer(self) -> R {
        self.renderer
    }

    fn render(&mut self) -> LadderResult<()> {
        let state = self.state.read();
        self.renderer.render(&state)
    }

    /// Polls `source`, applies every feed event and redraws after each one.
    /// Returns when `input` yields `Control::Quit`, `shutdown` fires, or rendering fails.
    pub async fn run<S>(
        &mut self,
        source: Arc<dyn SnapshotSource>,
        mut input: S,
        mut shutdown: watch::Receiver<bool>,
    ) -> LadderResult<()>
    where
        S: Stream<Item = Control> + Unpin,
    {
        let (tx, mut rx) = mpsc::channel::<FeedEvent>(FEED_CHANNEL_BUFFER);
        let (stop_tx, stop_rx) = watch::channel(false);
        let poller = Poller::new(source).with_interval(self.poll_interval);
        let poller_task = tokio::spawn(poller.run(tx, stop_rx));

        self.render()?;

        let mut input_open = true;
        let result = loop {
            tokio::select! {
                event = rx.recv() => match event {
                    Some(event) => {
                        self.state.write().apply(event);
                        if let Err(e) = self.render() {
                            break Err(e);
                        }
                    }
                    None => break Err(LadderError::ChannelClosed),
                },
                control = input.next(), if input_open => match control {
                    Some(Control::Quit) => {
                        info!("quit requested");
                        break Ok(());
                    }
                    Some(Control::Redraw) => {
                        if let Err(e) = self.render() {
                            break Err(e);
                        }
                    }
                    None => input_open = false,
                },
                _ = shutdown.changed() => {
                    info!("shutdown signal received");
                    break Ok(());
                }
            }
        };

        // Stop the poller and make sure a pending send cannot block it
        let _ = stop_tx.send(true);
        drop(rx);
        match poller_task.await {
            Ok(Ok(())) | Ok(Err(LadderError::ChannelClosed)) => debug!("poller finished"),
            Ok(Err(e)) => warn!(error = %e, "poller returned error"),
            Err(e) => warn!(error = %e, "poller task panicked"),
        }

        result
    }
}

/// Key and resize events from the terminal, mapped to app controls.
pub fn terminal_controls() -> LocalBoxStream<'static, Control> {
    EventStream::new()
        .filter_map(|event| {
            futures::future::ready(match event {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => Some(Control::Quit),
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(Control::Quit),
                    KeyCode::Char('r') => Some(Control::Redraw),
                    _ => None,
                },
                Ok(Event::Resize(_, _)) => Some(Control::Redraw),
                Ok(_) => None,
                Err(e) => {
                    warn!(error = %e, "terminal input error");
                    None
                }
            })
        })
        .boxed_local()
}
