//! Application layer use cases for the touch client.
//!
//! # What use cases does the touch client have?
//!
//! - **`classify_gestures`** – Turns raw multi-touch contact events into
//!   trackpad intents: pointer moves, taps, long-press drags, two-contact
//!   scroll and pinch, back/forward flicks, and three/four-contact desktop
//!   gestures.
//!
//! - **`batch_moves`** – Accumulates pointer deltas between frames so that
//!   at most one `move` message leaves the client per frame.
//!
//! - **`inertia`** – Keeps a released scroll going with exponentially
//!   decaying velocity.
//!
//! - **`drive_trackpad`** – The controller that wires the three pieces above
//!   to the user's settings and to an outbound command sink.

pub mod batch_moves;
pub mod classify_gestures;
pub mod drive_trackpad;
pub mod inertia;
