//! pad-server library crate.
//!
//! This crate receives trackpad commands from touch clients over WebSocket
//! and turns them into real pointer and keyboard input on the host.
//!
//! # Architecture (clean architecture)
//!
//! ```text
//! Touch client (JSON over WebSocket)
//!         ↕
//! [pad-server]
//!   ├── domain/            Presentation state, command → keystroke tables
//!   ├── application/       CommandRouter: decode, validate, dispatch
//!   └── infrastructure/
//!         ├── ws_server/   WebSocket accept loop (tokio-tungstenite)
//!         ├── injection/   Isolated injection unit + supervising bridge
//!         ├── native_input/ XTest backend and a recording mock
//!         ├── launcher/    Application launcher and app directory scan
//!         └── storage/     TOML server configuration
//! ```
//!
//! # For beginners: why an isolated injection unit?
//!
//! Native input calls can block, fail, or even crash.  The router must keep
//! answering clients no matter what, so every native call happens on a
//! separate thread (the *injection unit*).  The router only ever drops a
//! message into the unit's mailbox and moves on.  If the unit dies, the
//! *bridge* buffers commands and starts a fresh unit a moment later.

/// Domain layer: pure state and lookup tables (no I/O).
pub mod domain;

/// Application layer: command routing.
pub mod application;

/// Infrastructure layer: sockets, threads, processes, files.
pub mod infrastructure;
