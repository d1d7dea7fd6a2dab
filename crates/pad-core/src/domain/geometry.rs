//! Screen geometry used by the cursor model and the movement pipeline.

use serde::{Deserialize, Serialize};

/// Pixel dimensions of the host's primary display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenSize {
    pub width: u32,
    pub height: u32,
}

impl ScreenSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Clamps `point` to the last addressable pixel on each axis.
    ///
    /// A zero-sized screen clamps everything to the origin.
    pub fn clamp(&self, point: Point) -> Point {
        let max_x = f64::from(self.width.saturating_sub(1));
        let max_y = f64::from(self.height.saturating_sub(1));
        Point {
            x: point.x.clamp(0.0, max_x),
            y: point.y.clamp(0.0, max_y),
        }
    }
}

/// A cursor position in screen pixels.
///
/// Kept as `f64` so the injection unit can accumulate sub-pixel motion between
/// ticks; it is only rounded when handed to the native layer.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Returns the point rounded to whole pixels.
    pub fn rounded(&self) -> (i32, i32) {
        (self.x.round() as i32, self.y.round() as i32)
    }

    /// Returns a new point offset by `(dx, dy)`.
    pub fn offset(&self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// Clamps a single axis delta to `[-max, max]`.
///
/// Non-finite input clamps to zero so a stray NaN can never reach a native call.
pub fn clamp_axis(value: f64, max: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    value.clamp(-max.abs(), max.abs())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
