//! Touch contacts and their lifecycle events.

use pad_core::Point;
use serde::{Deserialize, Serialize};

/// Maximum number of simultaneous contacts the classifier tracks.
pub const MAX_CONTACTS: usize = 4;

/// Hardware identifier of a contact, stable for the contact's lifetime.
pub type ContactId = u32;

/// Lifecycle stage reported by the touch hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TouchPhase {
    /// One or more contacts touched down.
    Began,
    /// One or more contacts moved.
    Moved,
    /// One or more contacts lifted.
    Ended,
    /// The platform took the contacts away (e.g. a system gesture).
    Cancelled,
}

/// One contact position as reported in a touch event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TouchPoint {
    pub id: ContactId,
    pub x: f64,
    pub y: f64,
}

impl TouchPoint {
    pub fn new(id: ContactId, x: f64, y: f64) -> Self {
        Self { id, x, y }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// A touch event: a phase, a timestamp, and the contacts that changed.
///
/// For `Moved` the points are every contact that moved in this frame; for
/// the other phases they are the contacts that began or lifted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TouchEvent {
    pub phase: TouchPhase,
    /// Milliseconds on a monotonic clock shared with the frame ticker.
    pub time_ms: u64,
    pub points: Vec<TouchPoint>,
}

impl TouchEvent {
    pub fn began(time_ms: u64, points: Vec<TouchPoint>) -> Self {
        Self {
            phase: TouchPhase::Began,
            time_ms,
            points,
        }
    }

    pub fn moved(time_ms: u64, points: Vec<TouchPoint>) -> Self {
        Self {
            phase: TouchPhase::Moved,
            time_ms,
            points,
        }
    }

    pub fn ended(time_ms: u64, points: Vec<TouchPoint>) -> Self {
        Self {
            phase: TouchPhase::Ended,
            time_ms,
            points,
        }
    }
}

/// A tracked contact: where it started, where it is now, and when it began.
///
/// Created on first observation, mutated on every update for its id, and
/// dropped when the hardware reports it lifted or cancelled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub id: ContactId,
    pub start: Point,
    pub current: Point,
    pub start_ms: u64,
}

impl Contact {
    pub fn new(point: TouchPoint, time_ms: u64) -> Self {
        Self {
            id: point.id,
            start: point.position(),
            current: point.position(),
            start_ms: time_ms,
        }
    }

    /// Straight-line distance from the start position.
    pub fn displacement(&self) -> f64 {
        distance(self.start, self.current)
    }

    /// Milliseconds since the contact began, saturating at zero.
    pub fn elapsed_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.start_ms)
    }
}

/// Euclidean distance between two points.
pub fn distance(a: Point, b: Point) -> f64 {
    (b.x - a.x).hypot(b.y - a.y)
}

/// Mean position of `points`; the origin for an empty slice.
pub fn centroid(points: &[Point]) -> Point {
    if points.is_empty() {
        return Point::default();
    }
    let n = points.len() as f64;
    let (sx, sy) = points
        .iter()
        .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
    Point::new(sx / n, sy / n)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
