//! Application layer for pad-server.
//!
//! The application layer knows *what* each client command means, but
//! delegates *how* to perform it to the infrastructure layer through traits.
//!
//! # Responsibilities
//!
//! - Decoding client frames and rejecting malformed ones
//! - Validating numeric fields so non-finite values never reach native calls
//! - Translating commands into injection-unit commands and key chords
//! - Answering queries (app list, presentation info)
//!
//! # What does NOT belong here?
//!
//! - Sockets and WebSocket framing (that is infrastructure)
//! - Native input calls (only the injection unit makes those)
//! - Process spawning for launches (the launcher implementation)

pub mod route_commands;

pub use route_commands::{AppLauncher, CommandRouter, LaunchError, LaunchRequest, UnitSender};
