//! Domain entities shared by the client and the server.
//!
//! Everything here is plain arithmetic with no I/O, so it can be tested on any
//! platform without setup.  Both ends of the system clamp deltas the same way:
//! the client before sending a batched move, the injection unit before
//! advancing its cursor model.

/// Screen bounds, cursor points, and clamping helpers.
pub mod geometry;
