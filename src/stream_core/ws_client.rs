use crate::event::decode_frame;
use crate::state::StateMessage;
use crate::stream_core::backoff::{ReconnectBackoff, ReconnectPolicy};
use futures_util::{Sink, SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;

/// Lifecycle of the one logical subscription. Reconnection always creates a
/// fresh connection; a `Closed` connection is never resurrected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Open,
    Closed,
}

impl ConnectionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionState::Connecting => "Connecting",
            ConnectionState::Open => "Connected",
            ConnectionState::Closed => "Disconnected",
        }
    }
}

/// Why a live connection stopped. Everything except `Cancelled` takes the
/// same path: forced close, delay, reconnect.
#[derive(Debug)]
enum Disconnect {
    Cancelled,
    ServerClose,
    Transport(String),
    StreamEnded,
}

/// Cheap clonable handle onto a running [`StreamClient`].
#[derive(Clone)]
pub struct StreamHandle {
    outbound_tx: mpsc::UnboundedSender<serde_json::Value>,
    status_rx: watch::Receiver<ConnectionState>,
    cancel: CancellationToken,
}

impl StreamHandle {
    /// Queue an outbound message. Transmitted immediately while the
    /// connection is open, otherwise held in FIFO order and drained the
    /// moment the next connection opens.
    pub fn send(&self, message: serde_json::Value) {
        // Send only fails after shutdown, when there is nobody left to drain.
        let _ = self.outbound_tx.send(message);
    }

    pub fn connection_state(&self) -> ConnectionState {
        *self.status_rx.borrow()
    }

    pub fn status(&self) -> watch::Receiver<ConnectionState> {
        self.status_rx.clone()
    }

    /// Stop the connect/retry loop deterministically.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

/// Owns one logical subscription to the backend alert stream.
///
/// `run` connects, drains queued outbound messages, then forwards every
/// decodable text frame over the state channel in exact arrival order.
/// On any close or transport error it waits out the reconnect policy and
/// connects again, forever, until the cancellation token fires.
pub struct StreamClient {
    url: String,
    backoff: ReconnectBackoff,
    outbound_rx: mpsc::UnboundedReceiver<serde_json::Value>,
    outbound_open: bool,
    events_tx: mpsc::Sender<StateMessage>,
    status_tx: watch::Sender<ConnectionState>,
    cancel: CancellationToken,
}

impl StreamClient {
    pub fn new(
        url: String,
        policy: ReconnectPolicy,
        events_tx: mpsc::Sender<StateMessage>,
    ) -> (Self, StreamHandle) {
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (status_tx, status_rx) = watch::channel(ConnectionState::Connecting);
        let cancel = CancellationToken::new();

        let handle = StreamHandle {
            outbound_tx,
            status_rx,
            cancel: cancel.clone(),
        };

        let client = Self {
            url,
            backoff: ReconnectBackoff::new(policy),
            outbound_rx,
            outbound_open: true,
            events_tx,
            status_tx,
            cancel,
        };

        (client, handle)
    }

    /// Connect/reconnect loop. Returns only after cancellation.
    pub async fn run(mut self) {
        loop {
            if self.cancel.is_cancelled() {
                break;
            }

            self.status_tx.send_replace(ConnectionState::Connecting);
            log::info!("🔌 Connecting to alert stream: {}", self.url);

            let connected = tokio::select! {
                _ = self.cancel.cancelled() => break,
                result = connect_async(self.url.as_str()) => result,
            };

            match connected {
                Ok((socket, _response)) => {
                    log::info!("✅ Alert stream connected");
                    self.backoff.reset();
                    self.status_tx.send_replace(ConnectionState::Open);

                    let disconnect = self.drive(socket).await;
                    self.status_tx.send_replace(ConnectionState::Closed);

                    match disconnect {
                        Disconnect::Cancelled => break,
                        Disconnect::ServerClose => {
                            log::warn!("Alert stream closed by server");
                        }
                        Disconnect::Transport(reason) => {
                            log::error!("❌ Alert stream transport error: {}", reason);
                        }
                        Disconnect::StreamEnded => {
                            log::warn!("Alert stream ended");
                        }
                    }
                }
                Err(error) => {
                    self.status_tx.send_replace(ConnectionState::Closed);
                    log::error!("❌ Connection failed: {}", error);
                }
            }

            let delay = self.backoff.next_delay();
            log::warn!(
                "⏳ Reconnect attempt {} in {:.1}s",
                self.backoff.attempt(),
                delay.as_secs_f64()
            );
            tokio::select! {
                _ = self.cancel.cancelled() => break,
                _ = tokio::time::sleep(delay) => {}
            }
        }

        self.status_tx.send_replace(ConnectionState::Closed);
        log::info!("Alert stream client stopped");
    }

    /// Service one live connection until it drops.
    async fn drive(
        &mut self,
        socket: WebSocketStream<MaybeTlsStream<TcpStream>>,
    ) -> Disconnect {
        let (mut write, mut read) = socket.split();

        // Drain everything queued while disconnected, oldest first, before
        // reading any frames.
        while let Ok(message) = self.outbound_rx.try_recv() {
            if let Some(disconnect) = send_outbound(&mut write, &message).await {
                return disconnect;
            }
        }

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    // Best effort; the server also sees the TCP close.
                    let _ = write.send(Message::Close(None)).await;
                    return Disconnect::Cancelled;
                }
                queued = self.outbound_rx.recv(), if self.outbound_open => {
                    match queued {
                        Some(message) => {
                            if let Some(disconnect) = send_outbound(&mut write, &message).await {
                                return disconnect;
                            }
                        }
                        // All handles dropped; keep receiving frames.
                        None => self.outbound_open = false,
                    }
                }
                frame = read.next() => {
                    match frame {
                        Some(Ok(Message::Text(payload))) => {
                            match decode_frame(&payload) {
                                Ok(event) => {
                                    // Await the send before the next frame so
                                    // delivery order matches arrival order.
                                    if self
                                        .events_tx
                                        .send(StateMessage::Alert(event))
                                        .await
                                        .is_err()
                                    {
                                        log::warn!("State channel closed, stopping stream");
                                        return Disconnect::Cancelled;
                                    }
                                }
                                Err(error) => {
                                    log::warn!("Dropping undecodable frame: {}", error);
                                }
                            }
                        }
                        Some(Ok(Message::Close(_))) => return Disconnect::ServerClose,
                        Some(Ok(Message::Ping(_) | Message::Pong(_))) => {
                            // tungstenite answers pings internally on flush
                        }
                        Some(Ok(other)) => {
                            log::debug!("Ignoring non-text frame: {:?}", other);
                        }
                        Some(Err(error)) => return Disconnect::Transport(error.to_string()),
                        None => return Disconnect::StreamEnded,
                    }
                }
            }
        }
    }
}

async fn send_outbound<S>(write: &mut S, message: &serde_json::Value) -> Option<Disconnect>
where
    S: Sink<Message> + Unpin,
    S::Error: std::fmt::Display,
{
    let payload = message.to_string();
    match write.send(Message::Text(payload)).await {
        Ok(()) => None,
        Err(error) => Some(Disconnect::Transport(format!(
            "outbound send failed: {}",
            error
        ))),
    }
}
