//! TransportSession: the client end of the WebSocket channel.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use pad_core::{decode_server_message, encode_message, ClientMessage};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, Notify};
use tokio::task::JoinHandle;
use tokio::time;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

use super::event_bus::{EventBus, TOPIC_CONNECTED, TOPIC_DISCONNECTED, TOPIC_ERROR, TOPIC_MESSAGE};
use super::{ConnectionState, TransportError, TransportEvent};
use crate::application::drive_trackpad::CommandSink;

/// Delay between a close or connect failure and the next attempt.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_millis(3000);

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Where to connect and how long to wait between attempts.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Full WebSocket URL, e.g. `ws://192.168.1.20:8080`.
    pub url: String,
    pub reconnect_delay: Duration,
}

impl TransportConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self {
            url: format!("ws://{host}:{port}"),
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
        }
    }
}

/// State shared by `send` and the connection task.  Guarded by one lock so
/// that a queue flush and a concurrent `send` cannot interleave.
struct Inner {
    state: ConnectionState,
    /// Encoded messages waiting for a connection, oldest first.
    queue: VecDeque<String>,
    /// Writer channel of the live connection, if any.
    outbound: Option<mpsc::UnboundedSender<String>>,
}

/// Reconnecting, queueing WebSocket client.
///
/// Create with [`TransportSession::new`], register listeners on
/// [`events`](Self::events), then call [`start`](Self::start).  `send` may be
/// called from any thread at any time.
pub struct TransportSession {
    config: TransportConfig,
    inner: Mutex<Inner>,
    events: EventBus,
    running: AtomicBool,
    shutdown: Notify,
}

impl TransportSession {
    pub fn new(config: TransportConfig) -> Self {
        Self {
            config,
            inner: Mutex::new(Inner {
                state: ConnectionState::Disconnected,
                queue: VecDeque::new(),
                outbound: None,
            }),
            events: EventBus::new(),
            running: AtomicBool::new(false),
            shutdown: Notify::new(),
        }
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn state(&self) -> ConnectionState {
        self.lock().state
    }

    /// Number of messages waiting for a connection.
    pub fn queued(&self) -> usize {
        self.lock().queue.len()
    }

    /// Sends `message`, or queues it if there is no open connection.
    ///
    /// Never fails; a message that cannot be encoded is logged and dropped.
    pub fn send(&self, message: &ClientMessage) {
        let text = match encode_message(message) {
            Ok(text) => text,
            Err(e) => {
                warn!(kind = message.type_name(), "dropping unencodable message: {e}");
                return;
            }
        };

        let mut inner = self.lock();
        let text = match inner.outbound.as_ref() {
            Some(tx) => match tx.send(text) {
                Ok(()) => return,
                Err(mpsc::error::SendError(text)) => text,
            },
            None => text,
        };
        inner.queue.push_back(text);
    }

    /// Spawns the connect/reconnect loop.  Runs until [`shutdown`](Self::shutdown).
    pub fn start(self: Arc<Self>) -> JoinHandle<()> {
        self.running.store(true, Ordering::SeqCst);
        tokio::spawn(async move { self.run().await })
    }

    /// Closes the connection and stops reconnecting.
    pub fn shutdown(&self) {
        self.running.store(false, Ordering::SeqCst);
        self.shutdown.notify_one();
    }

    // ── Connection loop ───────────────────────────────────────────────────────

    async fn run(&self) {
        while self.running.load(Ordering::SeqCst) {
            self.lock().state = ConnectionState::Connecting;
            debug!(url = %self.config.url, "connecting");

            if let Err(e) = self.connect_and_pump().await {
                warn!(url = %self.config.url, "transport error: {e}");
                self.events.publish(
                    TOPIC_ERROR,
                    &TransportEvent::Error {
                        message: e.to_string(),
                    },
                );
            }

            self.lock().state = ConnectionState::Disconnected;
            self.events.publish(TOPIC_DISCONNECTED, &TransportEvent::Disconnected);

            if !self.running.load(Ordering::SeqCst) {
                break;
            }
            info!(
                "disconnected from {}; reconnecting in {:?}",
                self.config.url, self.config.reconnect_delay
            );
            tokio::select! {
                _ = time::sleep(self.config.reconnect_delay) => {}
                _ = self.shutdown.notified() => {}
            }
        }
        debug!("transport loop stopped");
    }

    async fn connect_and_pump(&self) -> Result<(), TransportError> {
        let (ws, _response) =
            connect_async(self.config.url.as_str())
                .await
                .map_err(|source| TransportError::Connect {
                    url: self.config.url.clone(),
                    source,
                })?;

        let (tx, mut rx) = mpsc::unbounded_channel();
        self.on_open(tx);

        let mut unsent = None;
        let result = self.pump(ws, &mut rx, &mut unsent).await;
        self.on_close(&mut rx, unsent);
        result
    }

    /// Flushes the queue into the new connection and publishes `connected`.
    fn on_open(&self, tx: mpsc::UnboundedSender<String>) {
        let flushed = {
            let mut inner = self.lock();
            let flushed = inner.queue.len();
            for text in inner.queue.drain(..) {
                // The receiver is alive for the whole connection.
                let _ = tx.send(text);
            }
            inner.outbound = Some(tx);
            inner.state = ConnectionState::Connected;
            flushed
        };
        info!(url = %self.config.url, flushed, "connected");
        self.events.publish(
            TOPIC_CONNECTED,
            &TransportEvent::Connected {
                url: self.config.url.clone(),
            },
        );
    }

    /// Detaches the writer channel and puts every message it did not write
    /// back at the front of the queue, oldest first.
    fn on_close(&self, rx: &mut mpsc::UnboundedReceiver<String>, unsent: Option<String>) {
        let mut inner = self.lock();
        inner.outbound = None;
        let mut in_flight: Vec<String> = unsent.into_iter().collect();
        while let Ok(text) = rx.try_recv() {
            in_flight.push(text);
        }
        if !in_flight.is_empty() {
            debug!(count = in_flight.len(), "re-queueing unsent messages");
        }
        for text in in_flight.into_iter().rev() {
            inner.queue.push_front(text);
        }
    }

    async fn pump(
        &self,
        ws: WsStream,
        rx: &mut mpsc::UnboundedReceiver<String>,
        unsent: &mut Option<String>,
    ) -> Result<(), TransportError> {
        let (mut sink, mut stream) = ws.split();
        loop {
            tokio::select! {
                outbound = rx.recv() => {
                    let Some(text) = outbound else {
                        return Ok(());
                    };
                    if let Err(e) = sink.send(Message::Text(text.clone())).await {
                        *unsent = Some(text);
                        return Err(TransportError::Send(e));
                    }
                }
                inbound = stream.next() => match inbound {
                    Some(Ok(Message::Text(text))) => self.dispatch_inbound(&text),
                    Some(Ok(Message::Close(_))) => return Ok(()),
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(TransportError::Receive(e)),
                    None => return Err(TransportError::Closed),
                },
                _ = self.shutdown.notified() => {
                    let _ = sink.send(Message::Close(None)).await;
                    return Ok(());
                }
            }
        }
    }

    /// Publishes an inbound frame under its type name and under `message`.
    fn dispatch_inbound(&self, text: &str) {
        match decode_server_message(text).map_err(TransportError::from) {
            Ok(message) => {
                let topic = message.type_name();
                let event = TransportEvent::Message(message);
                self.events.publish(topic, &event);
                self.events.publish(TOPIC_MESSAGE, &event);
            }
            Err(e) => {
                warn!("ignoring server frame: {e}");
                self.events.publish(
                    TOPIC_ERROR,
                    &TransportEvent::Error {
                        message: e.to_string(),
                    },
                );
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl CommandSink for TransportSession {
    fn send(&self, message: ClientMessage) {
        TransportSession::send(self, &message);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
