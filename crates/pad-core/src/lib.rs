//! # pad-core
//!
//! Shared library for the remote trackpad containing the JSON wire protocol,
//! the message vocabulary of the input-injection unit, screen geometry, and
//! the key naming tables used when turning commands into keystrokes.
//!
//! This crate is used by both the touch client (`pad-touch`) and the host
//! server (`pad-server`).  It has zero dependencies on OS APIs, sockets, or
//! async runtimes.
//!
//! # Architecture overview (for beginners)
//!
//! The remote trackpad lets a phone or tablet act as the touchpad and
//! keyboard of another computer on the same network.  The touch client turns
//! finger contacts into small commands ("move 3px right", "scroll", "go back")
//! and sends them as JSON over a WebSocket.  The server decodes them and hands
//! them to an isolated injection unit, the only component allowed to touch the
//! real mouse and keyboard.
//!
//! This crate is the shared foundation.  It defines:
//!
//! - **`protocol`** – The JSON messages exchanged between client and server
//!   (`{"type": "move", "dx": 1.5, "dy": 0}`) and the typed channel between
//!   the server's router and its injection unit.
//!
//! - **`domain`** – Pure geometry: screen sizes, cursor points, and the
//!   clamping rules shared by the client batcher and the injection unit.
//!
//! - **`keymap`** – Modifier aliases (`cmd`, `opt`, `ctrl`), shortcut parsing
//!   (`"cmd+shift+c"`), and the translation of canonical key names to the
//!   key names understood by X11 tooling.

pub mod domain;
pub mod keymap;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `pad_core::ClientMessage` instead of `pad_core::protocol::messages::ClientMessage`.
pub use domain::geometry::{clamp_axis, Point, ScreenSize};
pub use keymap::{KeyChord, KeymapError, Modifier};
pub use protocol::codec::{decode_client_message, decode_server_message, encode_message, ProtocolError};
pub use protocol::messages::{ClientMessage, GestureKind, PresentationAction, ServerMessage};
pub use protocol::worker::{WorkerCommand, WorkerEvent};
