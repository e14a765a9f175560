//! Main application orchestration.
//!
//! Wires the stream subscription, parser, series store, and chart view
//! into one event loop. Selection changes and inbound frames are handled
//! on the same task, so points are appended strictly in arrival order.

use crate::chart::ChartView;
use crate::config::AppConfig;
use crate::error::AppResult;
use klinescope_core::{Interval, SubscriptionKey, Symbol};
use klinescope_feed::KlineParser;
use klinescope_store::{FileStore, SeriesStore};
use klinescope_ws::{StreamConfig, StreamEvent, StreamSubscription};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Commands a front end can drive the viewer with.
#[derive(Debug)]
pub enum Command {
    /// Switch the live subscription to a new (symbol, interval) selection.
    Select { symbol: Symbol, interval: Interval },
}

/// Main application.
pub struct Application {
    store: SeriesStore<FileStore>,
    parser: KlineParser,
    stream: StreamSubscription,
    events_rx: mpsc::Receiver<StreamEvent>,
    commands_tx: mpsc::Sender<Command>,
    commands_rx: mpsc::Receiver<Command>,
    selected: Option<SubscriptionKey>,
    config: AppConfig,
}

impl Application {
    pub fn new(config: AppConfig) -> AppResult<Self> {
        config.validate()?;

        let store = SeriesStore::new(FileStore::new(&config.data_dir)?);
        let (events_tx, events_rx) = mpsc::channel(config.event_buffer);
        let stream = StreamSubscription::new(
            StreamConfig {
                base_url: config.ws_base_url.clone(),
            },
            events_tx,
        );
        let (commands_tx, commands_rx) = mpsc::channel(16);

        Ok(Self {
            store,
            parser: KlineParser::new(),
            stream,
            events_rx,
            commands_tx,
            commands_rx,
            selected: None,
            config,
        })
    }

    /// Handle for driving selection changes from a front end.
    pub fn commands(&self) -> mpsc::Sender<Command> {
        self.commands_tx.clone()
    }

    /// Switch to a new selection: restore the cached series for the key,
    /// then resubscribe (the old connection is closed first).
    pub async fn select(&mut self, symbol: Symbol, interval: Interval) {
        let key = SubscriptionKey::new(symbol, interval);
        info!(key = %key, "Selecting stream");

        match self.store.hydrate(&key) {
            Ok(points) if points > 0 => info!(key = %key, points, "Restored cached series"),
            Ok(_) => {}
            Err(e) => warn!(key = %key, error = %e, "Restore failed, starting empty"),
        }

        self.stream.subscribe(key.clone()).await;
        self.selected = Some(key);
        self.render();
    }

    /// Run the viewer until Ctrl-C.
    pub async fn run(mut self) -> AppResult<()> {
        let key = self.config.default_key()?;
        info!(
            symbol = %key.symbol,
            interval = %key.interval,
            "Starting with configured selection"
        );
        self.select(key.symbol, key.interval).await;

        loop {
            tokio::select! {
                Some(event) = self.events_rx.recv() => {
                    self.handle_event(event);
                }

                Some(command) = self.commands_rx.recv() => {
                    match command {
                        Command::Select { symbol, interval } => {
                            self.select(symbol, interval).await;
                        }
                    }
                }

                _ = tokio::signal::ctrl_c() => {
                    info!("Shutdown signal received");
                    break;
                }
            }
        }

        self.stream.unsubscribe().await;
        Ok(())
    }

    /// Handle one stream event.
    ///
    /// Frames from a connection other than the current one are dropped:
    /// they were already queued when the selection switched.
    fn handle_event(&mut self, event: StreamEvent) {
        match event {
            StreamEvent::Frame { epoch, key, payload } => {
                if epoch != self.stream.current_epoch() {
                    debug!(epoch, "Dropping frame from closed stream");
                    return;
                }

                match self.parser.parse(&payload) {
                    Ok(candle) => {
                        if let Err(e) = self.store.append(&key, candle) {
                            warn!(key = %key, error = %e, "Persist failed, point kept in memory");
                        }
                        self.render();
                    }
                    Err(e) => {
                        warn!(error = %e, "Dropping malformed frame");
                    }
                }
            }
            StreamEvent::Closed { epoch, key, error } => {
                if epoch == self.stream.current_epoch() {
                    warn!(key = %key, error = %error, "Stream closed; select again to reconnect");
                } else {
                    debug!(epoch, "Old stream finished closing");
                }
            }
        }
    }

    /// Redraw the chart for the current selection.
    fn render(&self) {
        let Some(key) = &self.selected else {
            return;
        };
        let view = ChartView::from_candles(self.store.current(key));
        println!("{key}  {}", view.render_line());
    }
}
