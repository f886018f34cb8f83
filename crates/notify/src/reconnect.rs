//! Fixed-backoff reconnect policy.
//!
//! The delay depends only on how the previous session ended: a clean
//! close from the server waits less than a transport failure.  The
//! backoff is deliberately not exponential, and there is no retry cap;
//! the channel keeps trying until it is stopped.

use std::time::Duration;

/// How a WebSocket session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisconnectReason {
    /// The server sent a close frame.
    RemoteClose,
    /// The connection dropped or errored without a close handshake.
    TransportError,
}

/// Per-cause reconnect delays.
#[derive(Debug, Clone)]
pub struct ReconnectPolicy {
    /// Delay after a clean close from the remote side.
    pub after_remote_close: Duration,
    /// Delay after a transport-level failure.
    pub after_transport_error: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            after_remote_close: Duration::from_secs(5),
            after_transport_error: Duration::from_secs(10),
        }
    }
}

impl ReconnectPolicy {
    /// The delay to wait before the next connection attempt.
    pub fn delay_for(&self, reason: DisconnectReason) -> Duration {
        match reason {
            DisconnectReason::RemoteClose => self.after_remote_close,
            DisconnectReason::TransportError => self.after_transport_error,
        }
    }
}
