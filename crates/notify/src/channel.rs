//! Connection lifecycle of the notification WebSocket.
//!
//! [`NotificationChannel`] owns exactly one connection task running
//! connect → subscribe → read → reconnect until it is stopped.  Events
//! are fanned out over a [`tokio::sync::broadcast`] channel; subscribers
//! that lag simply observe `RecvError::Lagged`.
//!
//! Lifecycle: `Disconnected → Connecting → Connected → Disconnected`
//! in a loop, with a transient `Closing` state during graceful shutdown.
//! Because the whole lifecycle lives on a single task, at most one
//! reconnect timer can ever be pending.

use std::sync::{Arc, Mutex};

use futures::stream::SplitStream;
use futures::{SinkExt, StreamExt};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;

use crate::events::NotificationEvent;
use crate::messages::{self, ServerMessage};
use crate::reconnect::{DisconnectReason, ReconnectPolicy};

/// Broadcast buffer for notification events.
const EVENT_CHANNEL_CAPACITY: usize = 256;

type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

/// Observable connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    Disconnected,
    Connecting,
    Connected,
    Closing,
}

/// Manages the single WebSocket connection to the notification endpoint.
///
/// Create once, share via `Arc`, call [`start`](Self::start) to bring the
/// link up and [`stop`](Self::stop) to tear it down.
pub struct NotificationChannel {
    ws_url: String,
    policy: ReconnectPolicy,
    state: Mutex<ChannelState>,
    event_tx: broadcast::Sender<NotificationEvent>,
    cancel: Mutex<Option<CancellationToken>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl NotificationChannel {
    /// Channel for the given endpoint with the default reconnect policy.
    pub fn new(ws_url: impl Into<String>) -> NotificationChannel {
        Self::with_policy(ws_url, ReconnectPolicy::default())
    }

    pub fn with_policy(ws_url: impl Into<String>, policy: ReconnectPolicy) -> NotificationChannel {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        NotificationChannel {
            ws_url: ws_url.into(),
            policy,
            state: Mutex::new(ChannelState::Disconnected),
            event_tx,
            cancel: Mutex::new(None),
            task: Mutex::new(None),
        }
    }

    /// Subscribe to notification events.
    pub fn subscribe(&self) -> broadcast::Receiver<NotificationEvent> {
        self.event_tx.subscribe()
    }

    /// Current connection state.
    pub fn state(&self) -> ChannelState {
        *self.state.lock().unwrap()
    }

    /// Spawn the connection task.  No-op if the channel is already
    /// running.
    pub fn start(self: &Arc<Self>) {
        let mut task = self.task.lock().unwrap();
        if task.is_some() {
            tracing::debug!("Notification channel already running");
            return;
        }

        self.set_state(ChannelState::Connecting);
        let cancel = CancellationToken::new();
        *self.cancel.lock().unwrap() = Some(cancel.clone());

        let channel = Arc::clone(self);
        *task = Some(tokio::spawn(async move {
            channel.run(cancel).await;
            tracing::info!("Notification channel task exited");
        }));
    }

    /// Gracefully shut the channel down: cancels any pending reconnect
    /// timer, sends a normal-closure frame if connected, and waits for
    /// the task to exit.  Stopping a stopped channel is a no-op.
    pub async fn stop(&self) {
        let cancel = self.cancel.lock().unwrap().take();
        let task = self.task.lock().unwrap().take();
        let (Some(cancel), Some(task)) = (cancel, task) else {
            tracing::debug!("Notification channel already stopped");
            return;
        };

        self.set_state(ChannelState::Closing);
        cancel.cancel();
        if task.await.is_err() {
            tracing::warn!("Notification channel task panicked during shutdown");
        }
        self.set_state(ChannelState::Disconnected);
    }

    // ---- connection task ----

    async fn run(self: Arc<Self>, cancel: CancellationToken) {
        loop {
            if cancel.is_cancelled() {
                return;
            }
            self.set_state(ChannelState::Connecting);
            tracing::info!(url = %self.ws_url, "Connecting to notification WebSocket");

            let ws_stream = tokio::select! {
                _ = cancel.cancelled() => return,
                result = connect_async(self.ws_url.as_str()) => match result {
                    Ok((ws_stream, _response)) => ws_stream,
                    Err(e) => {
                        tracing::warn!(error = %e, "WebSocket connection failed");
                        self.set_state(ChannelState::Disconnected);
                        if !self.wait_backoff(DisconnectReason::TransportError, &cancel).await {
                            return;
                        }
                        continue;
                    }
                }
            };

            let (mut sink, mut stream) = ws_stream.split();

            // Subscribe before reporting the link as up.
            if let Err(e) = sink.send(Message::Text(messages::subscribe_frame())).await {
                tracing::warn!(error = %e, "Failed to send subscribe message");
                self.set_state(ChannelState::Disconnected);
                if !self
                    .wait_backoff(DisconnectReason::TransportError, &cancel)
                    .await
                {
                    return;
                }
                continue;
            }

            self.set_state(ChannelState::Connected);
            self.emit(NotificationEvent::ConnectionChanged { connected: true });
            tracing::info!("Notification WebSocket connected and subscribed");

            let reason = tokio::select! {
                _ = cancel.cancelled() => {
                    let frame = CloseFrame {
                        code: CloseCode::Normal,
                        reason: "closing connection".into(),
                    };
                    if let Err(e) = sink.send(Message::Close(Some(frame))).await {
                        tracing::debug!(error = %e, "Close frame not delivered");
                    }
                    self.emit(NotificationEvent::ConnectionChanged { connected: false });
                    self.set_state(ChannelState::Disconnected);
                    return;
                }
                reason = self.read_session(&mut stream) => reason,
            };

            self.emit(NotificationEvent::ConnectionChanged { connected: false });
            self.set_state(ChannelState::Disconnected);

            if !self.wait_backoff(reason, &cancel).await {
                return;
            }
        }
    }

    /// Read frames until the connection ends one way or the other.
    async fn read_session(&self, stream: &mut SplitStream<WsStream>) -> DisconnectReason {
        while let Some(frame) = stream.next().await {
            match frame {
                Ok(Message::Text(text)) => self.dispatch(&text),
                Ok(Message::Ping(_) | Message::Pong(_)) => {
                    // Answered automatically by tungstenite.
                }
                Ok(Message::Close(frame)) => {
                    tracing::info!(?frame, "Server closed notification socket");
                    return DisconnectReason::RemoteClose;
                }
                Ok(_) => {
                    // Binary / raw frames carry nothing for us.
                }
                Err(e) => {
                    tracing::error!(error = %e, "WebSocket receive error");
                    return DisconnectReason::TransportError;
                }
            }
        }
        tracing::warn!("WebSocket stream ended without a close handshake");
        DisconnectReason::TransportError
    }

    /// Forward one parsed text frame to subscribers, in delivery order.
    fn dispatch(&self, text: &str) {
        match messages::parse_message(text) {
            ServerMessage::NewReport(data) => {
                tracing::info!(
                    report_id = data.report_id,
                    titulo = %data.titulo,
                    "New report announced",
                );
                self.emit(NotificationEvent::NewReport {
                    report_id: data.report_id,
                    titulo: data.titulo,
                });
            }
            ServerMessage::StatusChange(data) => {
                tracing::info!(
                    report_id = data.report_id,
                    old_status = %data.old_status,
                    new_status = %data.new_status,
                    "Report status changed",
                );
                self.emit(NotificationEvent::StatusChanged {
                    report_id: data.report_id,
                    old_status: data.old_status,
                    new_status: data.new_status,
                });
            }
            ServerMessage::PendingReports(data) => {
                tracing::info!(count = data.count, "Pending reports reminder");
            }
            ServerMessage::Connected => {
                tracing::debug!("Server acknowledged the connection");
            }
            ServerMessage::Pong => {
                tracing::trace!("Keepalive pong");
            }
            ServerMessage::Unrecognized { raw } => {
                tracing::warn!(raw_message = %raw, "Dropping unrecognized notification payload");
            }
        }
    }

    /// Wait the backoff for `reason`.  Returns `false` when cancelled.
    async fn wait_backoff(&self, reason: DisconnectReason, cancel: &CancellationToken) -> bool {
        let delay = self.policy.delay_for(reason);
        tracing::info!(
            delay_ms = delay.as_millis() as u64,
            ?reason,
            "Scheduling reconnect",
        );
        tokio::select! {
            _ = cancel.cancelled() => false,
            _ = tokio::time::sleep(delay) => true,
        }
    }

    fn emit(&self, event: NotificationEvent) {
        // A SendError only means there are currently zero receivers.
        let _ = self.event_tx.send(event);
    }

    fn set_state(&self, state: ChannelState) {
        *self.state.lock().unwrap() = state;
    }
}
