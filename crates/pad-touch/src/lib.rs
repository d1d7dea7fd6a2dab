//! pad-touch library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! # What does pad-touch do? (for beginners)
//!
//! pad-touch is the *touch surface* half of the remote trackpad.  It turns
//! fingers on glass into a compact stream of commands for the host:
//!
//! 1. Raw contact events (touch down, move, lift) go into the
//!    `GestureClassifier`, which decides whether the user is pointing,
//!    tapping, dragging, scrolling, pinching, or swiping.
//! 2. Pointer moves are batched so at most one `move` leaves per frame, and
//!    released scrolls keep coasting with inertia.
//! 3. Commands are sent as JSON over a WebSocket `TransportSession` that
//!    queues while offline and reconnects on its own.

/// Domain layer: contacts and settings.
pub mod domain;

/// Application layer: classifier, batcher, inertia, and controller.
pub mod application;

/// Infrastructure layer: transport, settings file, trace replay.
pub mod infrastructure;
