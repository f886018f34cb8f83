//! WebSocket notification channel for the Voz Urbana backend.
//!
//! Provides typed message parsing, the connect → subscribe → read →
//! reconnect lifecycle, a fixed-backoff reconnect policy, and broadcast
//! [`NotificationEvent`]s for consumers.  Connection failures are never
//! fatal: the channel retries indefinitely until [`NotificationChannel::stop`]
//! is called.

pub mod channel;
pub mod events;
pub mod messages;
pub mod reconnect;

pub use channel::{ChannelState, NotificationChannel};
pub use events::NotificationEvent;
pub use reconnect::{DisconnectReason, ReconnectPolicy};
