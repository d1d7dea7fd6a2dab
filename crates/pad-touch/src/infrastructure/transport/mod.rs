//! Reconnecting WebSocket transport for the touch client.
//!
//! # How it works (for beginners)
//!
//! The client keeps one WebSocket open to the server.  Touch gestures produce
//! commands at any time, including while the socket is down (Wi-Fi roaming,
//! server restart).  Rather than fail, [`TransportSession::send`] appends the
//! command to a FIFO queue; when the socket reopens the queue is flushed in
//! order before anything sent afterwards.
//!
//! The session walks through three states:
//!
//! ```text
//! Disconnected ──► Connecting ──► Connected
//!      ▲                              │
//!      └──── close / error ◄──────────┘   (reconnect after a fixed delay)
//! ```
//!
//! Everything the session observes (open, close, errors, inbound server
//! messages) is published on an [`EventBus`] so the UI layer can react
//! without holding a reference to the socket.

pub mod event_bus;
pub mod session;

pub use event_bus::{EventBus, SubscriptionId};
pub use session::{TransportConfig, TransportSession};

use pad_core::{ProtocolError, ServerMessage};
use thiserror::Error;

/// Connection lifecycle of a [`TransportSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

/// What the session publishes on its [`EventBus`].
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    /// The socket opened; carries the server URL.
    Connected { url: String },
    Disconnected,
    Error { message: String },
    /// A decoded server message.
    Message(ServerMessage),
}

/// Errors that can occur in the client transport.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to connect to {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: tokio_tungstenite::tungstenite::Error,
    },
    #[error("send failed: {0}")]
    Send(#[source] tokio_tungstenite::tungstenite::Error),
    #[error("receive failed: {0}")]
    Receive(#[source] tokio_tungstenite::tungstenite::Error),
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
    /// The stream ended without a close frame.
    #[error("connection dropped by server")]
    Closed,
}
