//! Stream subscription lifecycle.
//!
//! One `StreamSubscription` owns at most one live connection. `subscribe`
//! closes the previous connection and waits for its reader task to finish
//! before opening the next one, so two connections never overlap. Every
//! event carries the epoch of the connection that produced it; consumers
//! drop events whose epoch is stale.

use crate::error::WsError;
use futures_util::{SinkExt, StreamExt};
use klinescope_core::SubscriptionKey;
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async_tls_with_config, tungstenite::Message};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Stream configuration.
#[derive(Debug, Clone)]
pub struct StreamConfig {
    /// Base endpoint the channel name is appended to.
    pub base_url: String,
}

impl StreamConfig {
    /// Full subscription address for a key, e.g.
    /// `wss://stream.binance.com:9443/ws/ethusdt@kline_1m`.
    pub fn url_for(&self, key: &SubscriptionKey) -> String {
        format!("{}{}", self.base_url, key.channel())
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            base_url: "wss://stream.binance.com:9443/ws/".to_string(),
        }
    }
}

/// Connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Idle,
    Connecting,
    Open,
    Closed,
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "IDLE"),
            Self::Connecting => write!(f, "CONNECTING"),
            Self::Open => write!(f, "OPEN"),
            Self::Closed => write!(f, "CLOSED"),
        }
    }
}

/// Event delivered from a live connection.
#[derive(Debug)]
pub enum StreamEvent {
    /// One text frame from the feed.
    Frame {
        epoch: u64,
        key: SubscriptionKey,
        payload: String,
    },
    /// The connection left the Open state on its own (remote close or
    /// transport error). Not emitted for locally requested closes.
    Closed {
        epoch: u64,
        key: SubscriptionKey,
        error: WsError,
    },
}

/// Handle to one spawned connection task.
struct ActiveConnection {
    key: SubscriptionKey,
    state: Arc<RwLock<ConnectionState>>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

/// Owns at most one live streaming connection.
///
/// Each `subscribe` call produces a brand-new connection task; a closed
/// connection is never reused. There is no automatic reconnect: a dropped
/// connection stays Closed until the next explicit `subscribe`.
pub struct StreamSubscription {
    config: StreamConfig,
    events_tx: mpsc::Sender<StreamEvent>,
    active: Option<ActiveConnection>,
    epoch: u64,
}

impl StreamSubscription {
    pub fn new(config: StreamConfig, events_tx: mpsc::Sender<StreamEvent>) -> Self {
        Self {
            config,
            events_tx,
            active: None,
            epoch: 0,
        }
    }

    /// Open a connection for `key`, closing any previous connection first.
    ///
    /// The previous reader task is awaited before the new connection is
    /// spawned, so at most one connection is ever live. Calling with the
    /// key already subscribed forces a reconnect rather than a no-op.
    pub async fn subscribe(&mut self, key: SubscriptionKey) {
        self.unsubscribe().await;

        self.epoch += 1;
        let epoch = self.epoch;
        let url = self.config.url_for(&key);
        let state = Arc::new(RwLock::new(ConnectionState::Connecting));
        let cancel = CancellationToken::new();

        let task = tokio::spawn(run_connection(
            url,
            key.clone(),
            epoch,
            state.clone(),
            cancel.clone(),
            self.events_tx.clone(),
        ));

        self.active = Some(ActiveConnection {
            key,
            state,
            cancel,
            task,
        });
    }

    /// Close the live connection, if any, and wait for its task to finish.
    pub async fn unsubscribe(&mut self) {
        if let Some(conn) = self.active.take() {
            debug!(key = %conn.key, "Closing stream");
            conn.cancel.cancel();
            if let Err(e) = conn.task.await {
                warn!(?e, "Connection task aborted abnormally");
            }
        }
    }

    /// State of the current connection; Idle when none exists.
    pub fn state(&self) -> ConnectionState {
        self.active
            .as_ref()
            .map(|conn| *conn.state.read())
            .unwrap_or(ConnectionState::Idle)
    }

    /// Epoch of the current connection. Events carrying any other epoch
    /// come from an already-closed connection and must be ignored.
    pub fn current_epoch(&self) -> u64 {
        self.epoch
    }

    /// Key of the current connection, if any.
    pub fn current_key(&self) -> Option<&SubscriptionKey> {
        self.active.as_ref().map(|conn| &conn.key)
    }
}

/// One connection's lifetime: Connecting -> Open -> Closed.
async fn run_connection(
    url: String,
    key: SubscriptionKey,
    epoch: u64,
    state: Arc<RwLock<ConnectionState>>,
    cancel: CancellationToken,
    events_tx: mpsc::Sender<StreamEvent>,
) {
    info!(%url, epoch, "Connecting to stream");

    let connect = tokio::select! {
        res = connect_async_tls_with_config(&url, None, true, None) => res,
        () = cancel.cancelled() => {
            *state.write() = ConnectionState::Closed;
            return;
        }
    };

    let ws_stream = match connect {
        Ok((stream, _response)) => stream,
        Err(e) => {
            error!(?e, %url, "Stream connect failed");
            *state.write() = ConnectionState::Closed;
            let error = WsError::ConnectionFailed(e.to_string());
            let _ = events_tx.send(StreamEvent::Closed { epoch, key, error }).await;
            return;
        }
    };

    *state.write() = ConnectionState::Open;
    info!(channel = %key.channel(), epoch, "Stream open");

    let (mut write, mut read) = ws_stream.split();

    let error = loop {
        tokio::select! {
            () = cancel.cancelled() => {
                // Locally requested close: best-effort Close frame, no event.
                if let Err(e) = write.send(Message::Close(None)).await {
                    debug!(?e, "Close frame not sent");
                }
                break None;
            }

            msg = read.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let frame = StreamEvent::Frame {
                            epoch,
                            key: key.clone(),
                            payload: text,
                        };
                        if events_tx.send(frame).await.is_err() {
                            warn!("Event receiver dropped");
                            break None;
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        debug!("Received ping, sending pong");
                        if let Err(e) = write.send(Message::Pong(data)).await {
                            break Some(WsError::Tungstenite(e));
                        }
                    }
                    Some(Ok(Message::Close(frame))) => {
                        let (code, reason) = frame
                            .map(|f| (f.code.into(), f.reason.to_string()))
                            .unwrap_or((1000, "Normal close".to_string()));
                        warn!(code, %reason, "Stream closed by server");
                        break Some(WsError::ConnectionClosed { code, reason });
                    }
                    Some(Err(e)) => {
                        error!(?e, "Stream read error");
                        break Some(WsError::Tungstenite(e));
                    }
                    None => {
                        warn!("Stream ended");
                        break Some(WsError::ConnectionClosed {
                            code: 1006,
                            reason: "Stream ended".to_string(),
                        });
                    }
                    _ => {}
                }
            }
        }
    };

    *state.write() = ConnectionState::Closed;

    if let Some(error) = error {
        let _ = events_tx.send(StreamEvent::Closed { epoch, key, error }).await;
    }
}
