//! MovementBatcher: coalesces pointer deltas into one move per frame.
//!
//! Touch hardware reports positions faster than it is useful to inject
//! them, and every forwarded delta costs a network frame plus a native call
//! on the host.  The batcher adds up every delta produced during one frame
//! and emits a single scaled, clamped move when the frame ends.

use pad_core::clamp_axis;

/// Deltas smaller than this on both axes are noise and never accumulated.
pub const PUSH_NOISE: f64 = 0.2;
/// A flushed move must exceed this on one axis to be sent.
pub const FLUSH_MIN: f64 = 0.1;
/// Default per-axis limit of a flushed move.
pub const DEFAULT_MAX_DELTA: f64 = 80.0;

/// Pointer delta waiting for the next frame boundary.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PendingMove {
    pub dx: f64,
    pub dy: f64,
}

/// Frame-rate movement batcher.
#[derive(Debug, Clone)]
pub struct MovementBatcher {
    pending: PendingMove,
    max_delta: f64,
}

impl Default for MovementBatcher {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DELTA)
    }
}

impl MovementBatcher {
    pub fn new(max_delta: f64) -> Self {
        Self {
            pending: PendingMove::default(),
            max_delta,
        }
    }

    /// Adds a delta to the current frame.
    ///
    /// Non-finite deltas and deltas below the noise floor on both axes are
    /// dropped.
    pub fn push(&mut self, dx: f64, dy: f64) {
        if !dx.is_finite() || !dy.is_finite() {
            return;
        }
        if dx.abs() < PUSH_NOISE && dy.abs() < PUSH_NOISE {
            return;
        }
        self.pending.dx += dx;
        self.pending.dy += dy;
    }

    /// The delta accumulated so far in this frame.
    pub fn pending(&self) -> PendingMove {
        self.pending
    }

    /// Ends the frame: zeroes the accumulator and returns the move to send,
    /// if any.
    ///
    /// `multiplier` is the combined speed and acceleration factor.  The
    /// scaled delta is clamped per axis to the configured maximum.
    pub fn flush(&mut self, multiplier: f64) -> Option<PendingMove> {
        let raw = std::mem::take(&mut self.pending);
        let dx = clamp_axis(raw.dx * multiplier, self.max_delta);
        let dy = clamp_axis(raw.dy * multiplier, self.max_delta);
        if dx.abs() > FLUSH_MIN || dy.abs() > FLUSH_MIN {
            Some(PendingMove { dx, dy })
        } else {
            None
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_large_delta_is_clamped_to_max() {
        // Arrange
        let mut batcher = MovementBatcher::new(80.0);

        // Act
        batcher.push(200.0, 0.0);
        let flushed = batcher.flush(1.0);

        // Assert
        assert_eq!(flushed, Some(PendingMove { dx: 80.0, dy: 0.0 }));
    }

    #[test]
    fn test_deltas_within_a_frame_are_summed() {
        let mut batcher = MovementBatcher::default();
        batcher.push(1.0, 2.0);
        batcher.push(3.0, -1.0);
        assert_eq!(batcher.flush(1.0), Some(PendingMove { dx: 4.0, dy: 1.0 }));
    }

    #[test]
    fn test_flush_applies_multiplier_before_clamp() {
        let mut batcher = MovementBatcher::default();
        batcher.push(60.0, -10.0);
        assert_eq!(batcher.flush(1.5), Some(PendingMove { dx: 80.0, dy: -15.0 }));
    }

    #[test]
    fn test_flush_zeroes_accumulator() {
        // Arrange
        let mut batcher = MovementBatcher::default();
        batcher.push(5.0, 5.0);

        // Act
        batcher.flush(1.0);

        // Assert
        assert_eq!(batcher.pending(), PendingMove::default());
        assert_eq!(batcher.flush(1.0), None);
    }

    #[test]
    fn test_noise_is_not_accumulated() {
        let mut batcher = MovementBatcher::default();
        batcher.push(0.1, -0.15);
        assert_eq!(batcher.pending(), PendingMove::default());
    }

    #[test]
    fn test_non_finite_delta_is_dropped() {
        let mut batcher = MovementBatcher::default();
        batcher.push(f64::NAN, 4.0);
        batcher.push(3.0, f64::INFINITY);
        assert_eq!(batcher.flush(1.0), None);
    }

    #[test]
    fn test_tiny_flushed_move_is_suppressed() {
        let mut batcher = MovementBatcher::default();
        batcher.push(0.3, 0.0);
        assert_eq!(batcher.flush(0.2), None);
    }
}
