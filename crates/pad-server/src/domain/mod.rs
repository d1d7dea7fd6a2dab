//! Domain layer for pad-server.
//!
//! Pure types with no I/O: the presentation slide tracker and the tables
//! that turn trackpad commands into key chords.

pub mod keystrokes;
pub mod presentation;

pub use presentation::PresentationTracker;
