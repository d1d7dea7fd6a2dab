//! WebSocket server: accept loop and per-session task management.
//!
//! This module is responsible for:
//!
//! 1. Binding a TCP listener on the configured address.
//! 2. Accepting connections from touch clients and upgrading them to
//!    WebSocket sessions.
//! 3. Enforcing the connection limit: a session over the limit is closed
//!    with code 1008 (policy violation) right after the handshake.
//! 4. Greeting each client with a `connected` message.
//! 5. Passing every text frame to the shared [`CommandRouter`] and writing
//!    its reply, if any, back to the same client.
//! 6. Stopping when the `running` flag is cleared.
//!
//! Each session runs in its own Tokio task.  All sessions share one router,
//! and through it one injection unit, so input from several clients is
//! serialised in arrival order.

use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc,
};
use std::time::Duration;

use anyhow::Context;
use futures_util::{SinkExt, StreamExt};
use pad_core::{encode_message, ServerMessage};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tokio_tungstenite::{
    accept_async,
    tungstenite::{
        protocol::{frame::coding::CloseCode, CloseFrame},
        Error as WsError, Message as WsMessage,
    },
};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::application::CommandRouter;

/// Close reason sent to clients over the connection limit.
pub const MAX_CONNECTIONS_REASON: &str = "Max connections reached";

/// Everything a session needs, shared across all sessions.
pub struct ServerContext {
    pub router: Arc<CommandRouter>,
    pub max_connections: usize,
    /// Sent to every client right after the handshake.
    pub greeting: ServerMessage,
    active: AtomicUsize,
}

impl ServerContext {
    pub fn new(router: Arc<CommandRouter>, max_connections: usize) -> Self {
        Self {
            router,
            max_connections,
            greeting: host_greeting(),
            active: AtomicUsize::new(0),
        }
    }

    /// Number of sessions currently holding a slot.
    pub fn active_sessions(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Claims a session slot, or returns `None` when the limit is reached.
    fn try_claim(self: &Arc<Self>) -> Option<SessionSlot> {
        self.active
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                (n < self.max_connections).then_some(n + 1)
            })
            .ok()
            .map(|_| SessionSlot(Arc::clone(self)))
    }
}

/// Releases its slot when the session ends, however it ends.
struct SessionSlot(Arc<ServerContext>);

impl Drop for SessionSlot {
    fn drop(&mut self) {
        self.0.active.fetch_sub(1, Ordering::SeqCst);
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Binds `bind_addr` and serves until `running` is set to `false`.
///
/// # Errors
///
/// Returns an error if the TCP listener cannot be bound (e.g., the port is
/// already in use).
pub async fn run_server(
    bind_addr: &str,
    context: Arc<ServerContext>,
    running: Arc<AtomicBool>,
) -> anyhow::Result<()> {
    let listener = TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind WebSocket listener on {bind_addr}"))?;

    info!("trackpad server listening on {bind_addr}");
    serve(listener, context, running).await;
    Ok(())
}

/// Runs the accept loop on an already bound listener.
pub async fn serve(listener: TcpListener, context: Arc<ServerContext>, running: Arc<AtomicBool>) {
    loop {
        if !running.load(Ordering::Relaxed) {
            info!("shutdown flag set; stopping accept loop");
            break;
        }

        // Short timeout so the `running` flag is checked even when idle.
        match timeout(Duration::from_millis(200), listener.accept()).await {
            Ok(Ok((stream, peer_addr))) => {
                debug!("new connection from {peer_addr}");
                let ctx = Arc::clone(&context);
                tokio::spawn(async move {
                    handle_client_session(stream, peer_addr, ctx).await;
                });
            }
            Ok(Err(e)) => error!("accept error: {e}"),
            Err(_) => {}
        }
    }
}

// ── Per-session handler ───────────────────────────────────────────────────────

async fn handle_client_session(raw_stream: TcpStream, peer_addr: SocketAddr, context: Arc<ServerContext>) {
    let session_id = Uuid::new_v4();
    match run_session(raw_stream, peer_addr, session_id, context).await {
        Ok(()) => info!(%session_id, "session {peer_addr} closed"),
        Err(e) => warn!(%session_id, "session {peer_addr} closed with error: {e:#}"),
    }
}

async fn run_session(
    raw_stream: TcpStream,
    peer_addr: SocketAddr,
    session_id: Uuid,
    context: Arc<ServerContext>,
) -> anyhow::Result<()> {
    let mut ws_stream = accept_async(raw_stream)
        .await
        .with_context(|| format!("WebSocket handshake failed with {peer_addr}"))?;

    let Some(_slot) = context.try_claim() else {
        warn!(
            %session_id,
            max = context.max_connections,
            "rejecting {peer_addr}: connection limit reached"
        );
        let frame = CloseFrame {
            code: CloseCode::Policy,
            reason: MAX_CONNECTIONS_REASON.into(),
        };
        // The peer may already be gone; nothing else to do then.
        let _ = ws_stream.close(Some(frame)).await;
        return Ok(());
    };

    info!(
        %session_id,
        active = context.active_sessions(),
        "client connected from {peer_addr}"
    );

    let (mut ws_tx, mut ws_rx) = ws_stream.split();

    let greeting = encode_message(&context.greeting).context("failed to encode greeting")?;
    ws_tx
        .send(WsMessage::Text(greeting))
        .await
        .context("failed to send greeting")?;

    loop {
        let ws_msg = match ws_rx.next().await {
            Some(Ok(msg)) => msg,
            Some(Err(WsError::ConnectionClosed | WsError::Protocol(_))) => {
                debug!(%session_id, "client WebSocket closed");
                break;
            }
            Some(Err(e)) => {
                warn!(%session_id, "client WebSocket error: {e}");
                break;
            }
            None => break,
        };

        let text = match ws_msg {
            WsMessage::Text(text) => text,
            WsMessage::Binary(data) => match String::from_utf8(data) {
                Ok(text) => text,
                Err(_) => {
                    warn!(%session_id, "binary frame is not UTF-8; ignored");
                    continue;
                }
            },
            WsMessage::Close(_) => break,
            WsMessage::Ping(_) | WsMessage::Pong(_) | WsMessage::Frame(_) => continue,
        };

        let Some(reply) = context.router.handle_frame(&text).await else {
            continue;
        };
        match encode_message(&reply) {
            Ok(json) => {
                if ws_tx.send(WsMessage::Text(json)).await.is_err() {
                    debug!(%session_id, "reply not delivered; client gone");
                    break;
                }
            }
            Err(e) => error!(%session_id, "failed to encode reply: {e}"),
        }
    }

    Ok(())
}

// ── Host identity ─────────────────────────────────────────────────────────────

/// Builds the `connected` greeting from the host name and OS release.
pub fn host_greeting() -> ServerMessage {
    ServerMessage::Connected {
        host_name: host_name(),
        os_description: os_description(),
    }
}

fn host_name() -> String {
    std::env::var("HOSTNAME")
        .ok()
        .or_else(|| std::fs::read_to_string("/etc/hostname").ok())
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "localhost".to_string())
}

fn os_description() -> String {
    let release = std::fs::read_to_string("/proc/sys/kernel/osrelease")
        .map(|r| r.trim().to_string())
        .unwrap_or_default();
    if release.is_empty() {
        std::env::consts::OS.to_string()
    } else {
        format!("{} {release}", std::env::consts::OS)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
