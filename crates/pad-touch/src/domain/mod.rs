//! Domain entities for the touch client.
//!
//! Pure data with no I/O: the contacts reported by the touch hardware, the
//! commands the classifier produces from them, and the user's tuning
//! settings.  Everything here can be tested on any platform.

/// Touch contacts and the lifecycle events that carry them.
pub mod contact;

/// Pointer and scroll tuning, connection target, haptics switch.
pub mod settings;
