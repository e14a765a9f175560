//! WebSocket stream subscription for the klinescope feed.
//!
//! Owns exactly one live connection to one (symbol, interval) channel at a
//! time. A selection change closes the old connection before the new one
//! opens; frames from a closed connection are identified by epoch so late
//! deliveries can be ignored.

pub mod error;
pub mod subscription;

pub use error::{WsError, WsResult};
pub use subscription::{ConnectionState, StreamConfig, StreamEvent, StreamSubscription};

use std::sync::Once;

static INIT_CRYPTO: Once = Once::new();

/// Initialize the TLS crypto provider.
/// Must be called before any WebSocket connections are made.
pub fn init_crypto() {
    INIT_CRYPTO.call_once(|| {
        let _ = rustls::crypto::ring::default_provider().install_default();
    });
}
