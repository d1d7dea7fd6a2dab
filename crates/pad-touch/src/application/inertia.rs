//! InertiaScroller: continues a released scroll with decaying velocity.

/// Velocity multiplier applied after every emitted frame.
pub const DECAY: f64 = 0.95;
/// Inertia stops once the velocity magnitude falls below this.
pub const CUTOFF: f64 = 0.1;

/// Decaying scroll velocity driven by the frame ticker.
///
/// [`next_frame`](Self::next_frame) returns the velocity to emit for this
/// frame and then decays it; the loop ends the first time the magnitude is
/// below [`CUTOFF`].  A release at velocity `v` therefore produces
/// `ceil(ln(CUTOFF / |v|) / ln(DECAY))` scroll frames.
#[derive(Debug, Clone, Default)]
pub struct InertiaScroller {
    velocity: Option<(f64, f64)>,
}

impl InertiaScroller {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts (or restarts) inertia from a released scroll velocity.
    pub fn start(&mut self, vx: f64, vy: f64) {
        if !vx.is_finite() || !vy.is_finite() {
            self.velocity = None;
            return;
        }
        self.velocity = Some((vx, vy));
    }

    /// Stops any running inertia.
    pub fn cancel(&mut self) {
        self.velocity = None;
    }

    pub fn is_active(&self) -> bool {
        self.velocity.is_some()
    }

    /// Returns this frame's scroll delta, or `None` once inertia has died out.
    pub fn next_frame(&mut self) -> Option<(f64, f64)> {
        let (vx, vy) = self.velocity?;
        if vx.hypot(vy) < CUTOFF {
            self.velocity = None;
            return None;
        }
        self.velocity = Some((vx * DECAY, vy * DECAY));
        Some((vx, vy))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emission_count_matches_decay_formula() {
        // Arrange
        let mut inertia = InertiaScroller::new();
        inertia.start(10.0, 0.0);
        let expected = ((CUTOFF / 10.0).ln() / DECAY.ln()).ceil() as usize;

        // Act
        let mut frames = Vec::new();
        while let Some(v) = inertia.next_frame() {
            frames.push(v);
        }

        // Assert
        assert_eq!(frames.len(), expected);
        assert_eq!(frames.len(), 90);
        assert!(!inertia.is_active());
    }

    #[test]
    fn test_successive_frames_decay_by_constant_factor() {
        let mut inertia = InertiaScroller::new();
        inertia.start(10.0, 0.0);
        let a = inertia.next_frame().unwrap().0;
        let b = inertia.next_frame().unwrap().0;
        let c = inertia.next_frame().unwrap().0;
        assert!((b / a - DECAY).abs() < 1e-12);
        assert!((c / b - DECAY).abs() < 1e-12);
    }

    #[test]
    fn test_last_emission_is_above_cutoff() {
        let mut inertia = InertiaScroller::new();
        inertia.start(0.0, -3.0);
        let mut last = None;
        while let Some(v) = inertia.next_frame() {
            last = Some(v);
        }
        let (_, y) = last.unwrap();
        assert!(y.abs() >= CUTOFF);
    }

    #[test]
    fn test_cancel_stops_emission() {
        let mut inertia = InertiaScroller::new();
        inertia.start(5.0, 5.0);
        inertia.next_frame();
        inertia.cancel();
        assert_eq!(inertia.next_frame(), None);
    }

    #[test]
    fn test_velocity_below_cutoff_emits_nothing() {
        let mut inertia = InertiaScroller::new();
        inertia.start(0.05, 0.0);
        assert_eq!(inertia.next_frame(), None);
    }

    #[test]
    fn test_non_finite_start_is_ignored() {
        let mut inertia = InertiaScroller::new();
        inertia.start(f64::NAN, 1.0);
        assert!(!inertia.is_active());
    }
}
