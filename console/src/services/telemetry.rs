//! WebSocket telemetry channel
//!
//! Owns the single duplex connection to the apparatus and decodes inbound
//! frames into system snapshots. The channel is receive-only: frames come
//! in, nothing goes out. Malformed frames are logged and dropped without
//! touching the connection flag; a transport close or error flips to
//! disconnected exactly once and releases the socket on every exit path.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, Notify, RwLock};
use tokio_tungstenite::tungstenite::protocol::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

use shared::SystemState;

use crate::error::{ConsoleError, ConsoleResult};
use crate::traits::TelemetryChannel;
use crate::types::TelemetryEvent;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Reconnect behavior after the transport drops.
#[derive(Debug, Clone, PartialEq)]
pub enum ReconnectPolicy {
    /// Drop to disconnected and stay there. This matches the observed
    /// upstream behavior and is the default.
    None,
    /// Bounded doubling delay between reconnect attempts.
    ExponentialBackoff {
        initial: Duration,
        max: Duration,
        max_attempts: u32,
    },
}

/// Connection state shared between the channel handle and its read task
#[derive(Clone, Default)]
pub(crate) struct ConnectionState {
    connected: Arc<RwLock<bool>>,
}

impl ConnectionState {
    pub(crate) async fn get(&self) -> bool {
        *self.connected.read().await
    }

    /// Compare-and-set; returns true when the value actually changed, so
    /// repeated close events produce a single Disconnected transition.
    pub(crate) async fn set(&self, connected: bool) -> bool {
        let mut guard = self.connected.write().await;
        if *guard == connected {
            return false;
        }
        *guard = connected;
        true
    }
}

pub struct WsTelemetryChannel {
    url: String,
    policy: ReconnectPolicy,
    connection: ConnectionState,
    event_tx: mpsc::Sender<TelemetryEvent>,
    event_rx: Option<mpsc::Receiver<TelemetryEvent>>,
    shutdown: Arc<Notify>,
    started: bool,
}

impl WsTelemetryChannel {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_policy(url, ReconnectPolicy::None)
    }

    pub fn with_policy(url: impl Into<String>, policy: ReconnectPolicy) -> Self {
        let (event_tx, event_rx) = mpsc::channel(100);
        Self {
            url: url.into(),
            policy,
            connection: ConnectionState::default(),
            event_tx,
            event_rx: Some(event_rx),
            shutdown: Arc::new(Notify::new()),
            started: false,
        }
    }

    /// Read frames until the transport closes, fails, or the consumer goes
    /// away. Frames are forwarded in arrival order; the bounded channel
    /// applies backpressure rather than merging.
    async fn read_loop(stream: &mut WsStream, tx: &mpsc::Sender<TelemetryEvent>) {
        while let Some(message) = stream.next().await {
            match message {
                Ok(Message::Text(raw)) => match SystemState::decode(&raw) {
                    Ok(frame) => {
                        if tx.send(TelemetryEvent::Frame(Box::new(frame))).await.is_err() {
                            debug!("telemetry consumer dropped, ending read loop");
                            break;
                        }
                    }
                    // Malformed frames are dropped; the connection stays up.
                    Err(e) => {
                        let error = ConsoleError::FrameDecode {
                            message: e.to_string(),
                        };
                        warn!("dropping telemetry frame: {error}");
                    }
                },
                Ok(Message::Close(_)) => {
                    info!("telemetry channel closed by remote");
                    break;
                }
                // Receive-only channel: control and binary messages are ignored.
                Ok(_) => {}
                Err(e) => {
                    warn!("telemetry transport error: {e}");
                    break;
                }
            }
        }
    }

    /// Bounded exponential backoff until a connection sticks or attempts
    /// run out.
    async fn try_reconnect(
        url: &str,
        initial: Duration,
        max: Duration,
        max_attempts: u32,
    ) -> Option<WsStream> {
        let mut delay = initial;
        for attempt in 1..=max_attempts {
            tokio::time::sleep(delay).await;
            match connect_async(url).await {
                Ok((stream, _)) => {
                    info!(attempt, "telemetry channel reconnected");
                    return Some(stream);
                }
                Err(e) => {
                    warn!(attempt, "telemetry reconnect failed: {e}");
                    delay = (delay * 2).min(max);
                }
            }
        }
        None
    }

    /// Drives the connection lifecycle: read until the transport ends, flip
    /// to disconnected exactly once, then reconnect per policy. The socket
    /// is dropped on every exit path, including a shutdown during an
    /// in-flight read.
    async fn drive(
        stream: WsStream,
        url: String,
        policy: ReconnectPolicy,
        tx: mpsc::Sender<TelemetryEvent>,
        connection: ConnectionState,
        shutdown: Arc<Notify>,
    ) {
        let mut current = Some(stream);
        while let Some(mut stream) = current.take() {
            let shut = tokio::select! {
                _ = shutdown.notified() => true,
                _ = Self::read_loop(&mut stream, &tx) => false,
            };
            drop(stream);

            if connection.set(false).await {
                let _ = tx.send(TelemetryEvent::Disconnected).await;
            }
            if shut || tx.is_closed() {
                break;
            }

            match &policy {
                ReconnectPolicy::None => break,
                ReconnectPolicy::ExponentialBackoff {
                    initial,
                    max,
                    max_attempts,
                } => {
                    let reconnected = tokio::select! {
                        _ = shutdown.notified() => None,
                        stream = Self::try_reconnect(&url, *initial, *max, *max_attempts) => stream,
                    };
                    match reconnected {
                        Some(stream) => {
                            connection.set(true).await;
                            let _ = tx.send(TelemetryEvent::Connected).await;
                            current = Some(stream);
                        }
                        None => break,
                    }
                }
            }
        }
    }
}

#[async_trait]
impl TelemetryChannel for WsTelemetryChannel {
    async fn connect(&mut self) -> ConsoleResult<()> {
        if self.started {
            return Err(ConsoleError::TransportFailed {
                message: "telemetry channel already connected".to_string(),
            });
        }

        // The first connection failure surfaces to the caller; later drops
        // are the driver's business.
        let (stream, _) = connect_async(self.url.as_str())
            .await
            .map_err(|e| ConsoleError::TransportFailed {
                message: e.to_string(),
            })?;
        self.started = true;

        self.connection.set(true).await;
        let _ = self.event_tx.send(TelemetryEvent::Connected).await;
        info!("telemetry channel connected to {}", self.url);

        tokio::spawn(Self::drive(
            stream,
            self.url.clone(),
            self.policy.clone(),
            self.event_tx.clone(),
            self.connection.clone(),
            self.shutdown.clone(),
        ));
        Ok(())
    }

    async fn updates(&mut self) -> ConsoleResult<mpsc::Receiver<TelemetryEvent>> {
        self.event_rx.take().ok_or(ConsoleError::TransportFailed {
            message: "telemetry updates already taken".to_string(),
        })
    }

    async fn is_connected(&self) -> bool {
        self.connection.get().await
    }

    async fn disconnect(&self) -> ConsoleResult<()> {
        // notify_one stores a permit, so a shutdown issued before the
        // driver reaches its select point is not lost.
        self.shutdown.notify_one();
        if self.connection.set(false).await {
            let _ = self.event_tx.send(TelemetryEvent::Disconnected).await;
            info!("telemetry channel disconnected");
        }
        Ok(())
    }
}
