//! Mock WebSocket server for integration tests.
//!
//! Provides a simple WebSocket server that can:
//! - Accept connections
//! - Send a scripted sequence of text frames to each new connection
//! - Track how many connections were opened and closed

use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, Mutex};
use tokio_tungstenite::{accept_async, tungstenite::Message};

/// What each accepted connection should do.
#[derive(Debug, Clone, Default)]
pub struct ServerScript {
    /// Text frames sent immediately after the handshake.
    pub frames: Vec<String>,
    /// Close the connection from the server side after sending the frames.
    pub close_after_send: bool,
}

/// A mock WebSocket server for testing.
pub struct MockWsServer {
    addr: SocketAddr,
    shutdown_tx: mpsc::Sender<()>,
    connections: Arc<Mutex<u32>>,
    closed: Arc<Mutex<u32>>,
}

impl MockWsServer {
    /// Start a server that accepts connections and sends nothing.
    pub async fn start() -> Self {
        Self::start_with(ServerScript::default()).await
    }

    /// Start a server that runs `script` on every accepted connection.
    pub async fn start_with(script: ServerScript) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let connections: Arc<Mutex<u32>> = Arc::new(Mutex::new(0));
        let closed: Arc<Mutex<u32>> = Arc::new(Mutex::new(0));
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);

        let connections_clone = connections.clone();
        let closed_clone = closed.clone();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    Ok((stream, _)) = listener.accept() => {
                        let script = script.clone();
                        let connections = connections_clone.clone();
                        let closed = closed_clone.clone();
                        tokio::spawn(handle_connection(stream, script, connections, closed));
                    }
                    _ = shutdown_rx.recv() => {
                        break;
                    }
                }
            }
        });

        Self {
            addr,
            shutdown_tx,
            connections,
            closed,
        }
    }

    /// The server's WebSocket URL, with a trailing slash so channel names
    /// can be appended the same way as against the real endpoint.
    pub fn base_url(&self) -> String {
        format!("ws://{}/", self.addr)
    }

    /// Number of connections accepted so far.
    pub async fn connection_count(&self) -> u32 {
        *self.connections.lock().await
    }

    /// Number of connections that have ended.
    pub async fn closed_count(&self) -> u32 {
        *self.closed.lock().await
    }

    /// Shutdown the server.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
    }
}

async fn handle_connection(
    stream: TcpStream,
    script: ServerScript,
    connections: Arc<Mutex<u32>>,
    closed: Arc<Mutex<u32>>,
) {
    {
        let mut count = connections.lock().await;
        *count += 1;
    }

    let ws_stream = match accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            eprintln!("WebSocket handshake failed: {}", e);
            return;
        }
    };

    let (mut write, mut read) = ws_stream.split();

    for frame in &script.frames {
        if write.send(Message::Text(frame.clone())).await.is_err() {
            break;
        }
    }

    if script.close_after_send {
        let _ = write.send(Message::Close(None)).await;
    } else {
        while let Some(msg) = read.next().await {
            match msg {
                Ok(Message::Ping(data)) => {
                    let _ = write.send(Message::Pong(data)).await;
                }
                Ok(Message::Close(_)) => break,
                Err(_) => break,
                _ => {}
            }
        }
    }

    let mut count = closed.lock().await;
    *count += 1;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_server_starts() {
        let server = MockWsServer::start().await;
        assert!(server.base_url().starts_with("ws://127.0.0.1:"));
        server.shutdown().await;
    }
}
