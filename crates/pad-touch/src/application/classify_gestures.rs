//! GestureClassifier: turns raw contact events into trackpad commands.
//!
//! The classifier is a state machine keyed by the number of active contacts.
//! Each contact count has its own session type, and the session is rebuilt
//! from scratch every time the count changes, so a latch set by one gesture
//! can never leak into the next:
//!
//! ```text
//!             began           began            began           began
//!   Idle ─────────────► One ─────────► Two ───────────► Three ────────► Four
//!    ▲                   │              │                 │               │
//!    └──── lifted ◄──────┴── lifted ◄───┴──── lifted ◄────┴── lifted ◄────┘
//! ```
//!
//! | Contacts | Recognises                                                   |
//! |----------|--------------------------------------------------------------|
//! | 1        | tap → `Click`, long press → `DragStart`/`DragEnd`, `Move`    |
//! | 2        | pinch → `Zoom`, horizontal flick → back/forward, `Scroll`,   |
//! |          | quick tap → `RightClick`                                     |
//! | 3        | vertical → mission control / app exposé, horizontal → desktop|
//! | 4        | horizontal → desktop left/right, then drops the contacts     |
//!
//! The classifier is synchronous and owns no timers.  The long press is
//! detected by [`GestureClassifier::poll`], which the frame ticker calls once
//! per frame, and by every incoming event before it is processed.

use pad_core::{GestureKind, Point};
use tracing::trace;

use crate::domain::contact::{
    centroid, distance, Contact, TouchEvent, TouchPhase, TouchPoint, MAX_CONTACTS,
};

// ── Thresholds ────────────────────────────────────────────────────────────────

/// A lift sooner than this after touch-down can be a tap.
pub const TAP_MAX_MS: u64 = 200;
/// A tap must stay closer than this to its start position.
pub const TAP_SLOP: f64 = 10.0;
/// Holding still this long starts a drag.
pub const LONG_PRESS_MS: u64 = 500;
/// Moving farther than this cancels the long press.
pub const LONG_PRESS_SLOP: f64 = 10.0;
/// Contact updates smaller than this on both axes are noise.
pub const CONTACT_NOISE: f64 = 0.2;
/// Pointer deltas must exceed this on one axis to be forwarded.
pub const MOVE_MIN: f64 = 0.5;
/// Per-frame distance change that can lock a two-contact session into pinch.
pub const PINCH_THRESHOLD: f64 = 6.0;
/// Pinch must exceed this share of the larger contact's motion.
pub const PINCH_DOMINANCE: f64 = 0.8;
/// Per-axis motion under this counts as "not moving" for the direction test.
pub const DIRECTION_TOLERANCE: f64 = 0.2;
/// Distance change that produces a zoom step once pinching.
pub const ZOOM_MIN: f64 = 1.0;
/// Horizontal centroid motion within one frame that fires back/forward navigation.
pub const SWIPE_THRESHOLD: f64 = 70.0;
/// Centroid deltas must exceed this on one axis to scroll.
pub const SCROLL_MIN: f64 = 0.5;
/// Centroid travel that fires a three- or four-contact gesture.
pub const MULTI_SWIPE_THRESHOLD: f64 = 100.0;

/// What the classifier recognised.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureEvent {
    Move { dx: f64, dy: f64 },
    Click,
    RightClick,
    Scroll { dx: f64, dy: f64 },
    Zoom { delta: f64 },
    DragStart,
    DragEnd,
    Gesture(GestureKind),
    /// A scrolling two-contact session ended without navigating; the caller
    /// may continue the last scroll with inertia.
    ScrollReleased,
}

// ── Sessions ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LongPress {
    Armed,
    Cancelled,
    Fired,
}

#[derive(Debug)]
struct OneContact {
    /// Position of the last forwarded move.
    anchor: Point,
    /// Still a tap candidate.
    tap_eligible: bool,
    long_press: LongPress,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TwoMode {
    Undecided,
    Pinching,
    Navigated,
}

#[derive(Debug)]
struct TwoContact {
    last: [Point; 2],
    last_distance: f64,
    /// Centroid at the last forwarded scroll.
    scroll_anchor: Point,
    mode: TwoMode,
    scrolled: bool,
    emitted: bool,
    started_ms: u64,
}

#[derive(Debug)]
struct ThreeContact {
    origin: Point,
    vertical_fired: bool,
    horizontal_fired: bool,
}

#[derive(Debug)]
struct FourContact {
    origin: Point,
}

#[derive(Debug)]
enum Session {
    Idle,
    One(OneContact),
    Two(TwoContact),
    Three(ThreeContact),
    Four(FourContact),
}

/// Multi-touch gesture classifier.
#[derive(Debug)]
pub struct GestureClassifier {
    /// Active contacts in touch-down order.
    contacts: Vec<Contact>,
    session: Session,
    dragging: bool,
    /// Start time of a two-contact session that ended as a tap candidate.
    pending_right_click: Option<u64>,
}

impl Default for GestureClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl GestureClassifier {
    pub fn new() -> Self {
        Self {
            contacts: Vec::with_capacity(MAX_CONTACTS),
            session: Session::Idle,
            dragging: false,
            pending_right_click: None,
        }
    }

    /// Number of contacts currently tracked.
    pub fn active_contacts(&self) -> usize {
        self.contacts.len()
    }

    /// `true` between `DragStart` and `DragEnd`.
    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Processes one touch event and returns what it completed.
    pub fn handle(&mut self, event: &TouchEvent) -> Vec<GestureEvent> {
        let mut out = Vec::new();
        self.check_long_press(event.time_ms, &mut out);
        match event.phase {
            TouchPhase::Began => self.on_began(event, &mut out),
            TouchPhase::Moved => self.on_moved(event, &mut out),
            TouchPhase::Ended | TouchPhase::Cancelled => self.on_lifted(event, &mut out),
        }
        out
    }

    /// Advances time without a touch event.  Fires the long press.
    pub fn poll(&mut self, now_ms: u64) -> Vec<GestureEvent> {
        let mut out = Vec::new();
        self.check_long_press(now_ms, &mut out);
        out
    }

    // ── Event handlers ────────────────────────────────────────────────────────

    fn on_began(&mut self, event: &TouchEvent, out: &mut Vec<GestureEvent>) {
        let before = self.contacts.len();
        for point in &event.points {
            if self.contacts.iter().any(|c| c.id == point.id) {
                continue;
            }
            if self.contacts.len() >= MAX_CONTACTS {
                trace!(id = point.id, "ignoring contact beyond the tracked limit");
                continue;
            }
            self.contacts.push(Contact::new(*point, event.time_ms));
        }
        if self.contacts.len() != before {
            self.pending_right_click = None;
            self.transition(before, event.time_ms, &[], out);
        }
    }

    fn on_moved(&mut self, event: &TouchEvent, out: &mut Vec<GestureEvent>) {
        if !self.update_positions(&event.points) {
            return;
        }
        let now = event.time_ms;

        let clear = match &mut self.session {
            Session::Idle => false,
            Session::One(s) => {
                s.on_frame(&self.contacts[0], now, &mut self.pending_right_click, out);
                false
            }
            Session::Two(s) => {
                s.on_frame(&self.contacts[0], &self.contacts[1], out);
                false
            }
            Session::Three(s) => {
                s.on_frame(current_centroid(&self.contacts), out);
                false
            }
            Session::Four(s) => s.on_frame(current_centroid(&self.contacts), out),
        };

        if clear {
            // Four-contact gestures are terminal: forget the contacts so the
            // rest of this touch sequence is ignored.
            self.contacts.clear();
            self.session = Session::Idle;
            self.pending_right_click = None;
            if self.dragging {
                self.dragging = false;
                out.push(GestureEvent::DragEnd);
            }
        }
    }

    fn on_lifted(&mut self, event: &TouchEvent, out: &mut Vec<GestureEvent>) {
        self.update_positions(&event.points);
        let before = self.contacts.len();
        let mut lifted = Vec::with_capacity(event.points.len());
        self.contacts.retain(|c| {
            if event.points.iter().any(|p| p.id == c.id) {
                lifted.push(*c);
                false
            } else {
                true
            }
        });
        if lifted.is_empty() {
            return;
        }

        let now = event.time_ms;
        self.transition(before, now, &lifted, out);

        if self.contacts.is_empty() {
            if let Some(started) = self.pending_right_click.take() {
                if !self.dragging && now.saturating_sub(started) < TAP_MAX_MS {
                    out.push(GestureEvent::RightClick);
                }
            }
            if self.dragging {
                self.dragging = false;
                out.push(GestureEvent::DragEnd);
            }
        }
    }

    /// Copies new positions into tracked contacts.  Returns `true` if any
    /// tracked contact moved by more than the noise floor.
    fn update_positions(&mut self, points: &[TouchPoint]) -> bool {
        let mut moved = false;
        for point in points {
            if let Some(c) = self.contacts.iter_mut().find(|c| c.id == point.id) {
                let dx = point.x - c.current.x;
                let dy = point.y - c.current.y;
                if dx.abs() < CONTACT_NOISE && dy.abs() < CONTACT_NOISE {
                    continue;
                }
                c.current = point.position();
                moved = true;
            }
        }
        moved
    }

    // ── Session transitions ───────────────────────────────────────────────────

    /// Closes the current session and opens the one for the new contact count.
    ///
    /// This is the only place sessions are created, so every count change
    /// resets every latch in the same step.
    fn transition(
        &mut self,
        previous_count: usize,
        now: u64,
        lifted: &[Contact],
        out: &mut Vec<GestureEvent>,
    ) {
        let count = self.contacts.len();
        let closing = std::mem::replace(&mut self.session, Session::Idle);

        match closing {
            Session::One(s) if count == 0 => {
                if let Some(c) = lifted.first() {
                    let is_tap = s.tap_eligible
                        && !self.dragging
                        && c.elapsed_ms(now) < TAP_MAX_MS
                        && c.displacement() < TAP_SLOP;
                    if is_tap {
                        out.push(GestureEvent::Click);
                    }
                }
            }
            Session::Two(s) if count < 2 => {
                if s.mode == TwoMode::Undecided && s.scrolled {
                    out.push(GestureEvent::ScrollReleased);
                }
                self.pending_right_click = if !s.emitted
                    && now.saturating_sub(s.started_ms) < TAP_MAX_MS
                {
                    Some(s.started_ms)
                } else {
                    None
                };
            }
            _ => {}
        }

        self.session = match count {
            0 => Session::Idle,
            1 => {
                let from_multi = previous_count > 1;
                Session::One(OneContact {
                    anchor: self.contacts[0].current,
                    tap_eligible: !from_multi,
                    long_press: if from_multi || self.dragging {
                        LongPress::Cancelled
                    } else {
                        LongPress::Armed
                    },
                })
            }
            2 => {
                let (a, b) = (self.contacts[0], self.contacts[1]);
                let center = centroid(&[a.current, b.current]);
                Session::Two(TwoContact {
                    last: [a.current, b.current],
                    last_distance: distance(a.current, b.current),
                    scroll_anchor: center,
                    mode: TwoMode::Undecided,
                    scrolled: false,
                    emitted: false,
                    started_ms: a.start_ms.min(b.start_ms),
                })
            }
            3 => Session::Three(ThreeContact {
                origin: current_centroid(&self.contacts),
                vertical_fired: false,
                horizontal_fired: false,
            }),
            _ => Session::Four(FourContact {
                origin: current_centroid(&self.contacts),
            }),
        };
        trace!(from = previous_count, to = count, "contact count changed");
    }

    fn check_long_press(&mut self, now: u64, out: &mut Vec<GestureEvent>) {
        let Session::One(s) = &mut self.session else {
            return;
        };
        if s.long_press != LongPress::Armed || self.dragging {
            return;
        }
        let Some(contact) = self.contacts.first() else {
            return;
        };
        if contact.displacement() > LONG_PRESS_SLOP {
            s.long_press = LongPress::Cancelled;
            return;
        }
        if contact.elapsed_ms(now) >= LONG_PRESS_MS {
            s.long_press = LongPress::Fired;
            s.tap_eligible = false;
            self.dragging = true;
            self.pending_right_click = None;
            out.push(GestureEvent::DragStart);
        }
    }
}

// ── Per-session frame logic ───────────────────────────────────────────────────

impl OneContact {
    fn on_frame(
        &mut self,
        contact: &Contact,
        now: u64,
        pending_right_click: &mut Option<u64>,
        out: &mut Vec<GestureEvent>,
    ) {
        let displacement = contact.displacement();
        if displacement > LONG_PRESS_SLOP && self.long_press == LongPress::Armed {
            self.long_press = LongPress::Cancelled;
        }
        if displacement >= TAP_SLOP || contact.elapsed_ms(now) >= TAP_MAX_MS {
            self.tap_eligible = false;
        }
        // Held back while this could still become a tap.
        if self.tap_eligible {
            return;
        }

        let dx = contact.current.x - self.anchor.x;
        let dy = contact.current.y - self.anchor.y;
        if dx.abs() > MOVE_MIN || dy.abs() > MOVE_MIN {
            out.push(GestureEvent::Move { dx, dy });
            self.anchor = contact.current;
            *pending_right_click = None;
        }
    }
}

impl TwoContact {
    fn on_frame(&mut self, a: &Contact, b: &Contact, out: &mut Vec<GestureEvent>) {
        let (pa, pb) = (a.current, b.current);
        let move_a = Point::new(pa.x - self.last[0].x, pa.y - self.last[0].y);
        let move_b = Point::new(pb.x - self.last[1].x, pb.y - self.last[1].y);
        let dist = distance(pa, pb);
        let pinch = dist - self.last_distance;
        let center = centroid(&[pa, pb]);
        let last_center = centroid(&self.last);

        match self.mode {
            TwoMode::Navigated => {}
            TwoMode::Pinching => {
                if pinch.abs() > ZOOM_MIN {
                    out.push(GestureEvent::Zoom { delta: pinch });
                }
            }
            TwoMode::Undecided => {
                let movement = (move_a.x.abs() + move_a.y.abs()).max(move_b.x.abs() + move_b.y.abs());
                let locks_pinch = pinch.abs() > PINCH_THRESHOLD
                    && (!same_direction(move_a, move_b) || pinch.abs() > PINCH_DOMINANCE * movement);

                if locks_pinch {
                    self.mode = TwoMode::Pinching;
                    self.emitted = true;
                } else {
                    // Only a single fast frame navigates; slow travel scrolls.
                    let step_x = center.x - last_center.x;
                    let step_y = center.y - last_center.y;
                    if step_x.abs() > step_y.abs() && step_x.abs() > SWIPE_THRESHOLD {
                        let kind = if step_x < 0.0 {
                            GestureKind::BrowserBack
                        } else {
                            GestureKind::BrowserForward
                        };
                        out.push(GestureEvent::Gesture(kind));
                        self.mode = TwoMode::Navigated;
                        self.emitted = true;
                    } else {
                        let dx = center.x - self.scroll_anchor.x;
                        let dy = center.y - self.scroll_anchor.y;
                        if dx.abs() > SCROLL_MIN || dy.abs() > SCROLL_MIN {
                            out.push(GestureEvent::Scroll { dx, dy });
                            self.scroll_anchor = center;
                            self.scrolled = true;
                            self.emitted = true;
                        }
                    }
                }
            }
        }

        self.last = [pa, pb];
        self.last_distance = dist;
    }
}

impl ThreeContact {
    fn on_frame(&mut self, center: Point, out: &mut Vec<GestureEvent>) {
        let dx = center.x - self.origin.x;
        let dy = center.y - self.origin.y;

        if dy.abs() > dx.abs() {
            if !self.vertical_fired && dy.abs() > MULTI_SWIPE_THRESHOLD {
                self.vertical_fired = true;
                out.push(GestureEvent::Gesture(if dy < 0.0 {
                    GestureKind::MissionControl
                } else {
                    GestureKind::AppExpose
                }));
            }
        } else if !self.horizontal_fired && dx.abs() > MULTI_SWIPE_THRESHOLD {
            self.horizontal_fired = true;
            out.push(GestureEvent::Gesture(desktop_direction(dx)));
        }
    }
}

impl FourContact {
    /// Returns `true` when the gesture fired and the contacts must be dropped.
    fn on_frame(&mut self, center: Point, out: &mut Vec<GestureEvent>) -> bool {
        let dx = center.x - self.origin.x;
        if dx.abs() > MULTI_SWIPE_THRESHOLD {
            out.push(GestureEvent::Gesture(desktop_direction(dx)));
            return true;
        }
        false
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn desktop_direction(dx: f64) -> GestureKind {
    if dx < 0.0 {
        GestureKind::DesktopLeft
    } else {
        GestureKind::DesktopRight
    }
}

fn current_centroid(contacts: &[Contact]) -> Point {
    let points: Vec<Point> = contacts.iter().map(|c| c.current).collect();
    centroid(&points)
}

/// Two motions agree in direction on both axes, treating tiny motion on
/// either side as agreement.
fn same_direction(a: Point, b: Point) -> bool {
    let axis = |u: f64, v: f64| {
        u.abs() < DIRECTION_TOLERANCE || v.abs() < DIRECTION_TOLERANCE || u.signum() == v.signum()
    };
    axis(a.x, b.x) && axis(a.y, b.y)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn p(id: u32, x: f64, y: f64) -> TouchPoint {
        TouchPoint::new(id, x, y)
    }

    fn count(events: &[GestureEvent], pred: impl Fn(&GestureEvent) -> bool) -> usize {
        events.iter().filter(|e| pred(e)).count()
    }

    // ── One contact ───────────────────────────────────────────────────────────

    #[test]
    fn test_quick_still_tap_is_single_click_without_moves() {
        // Arrange
        let mut c = GestureClassifier::new();
        let mut out = Vec::new();

        // Act
        out.extend(c.handle(&TouchEvent::began(0, vec![p(1, 100.0, 100.0)])));
        out.extend(c.handle(&TouchEvent::moved(40, vec![p(1, 103.0, 102.0)])));
        out.extend(c.handle(&TouchEvent::moved(80, vec![p(1, 105.0, 104.0)])));
        out.extend(c.handle(&TouchEvent::ended(120, vec![p(1, 105.0, 104.0)])));

        // Assert
        assert_eq!(out, vec![GestureEvent::Click]);
    }

    #[test]
    fn test_slow_lift_is_not_a_click() {
        let mut c = GestureClassifier::new();
        c.handle(&TouchEvent::began(0, vec![p(1, 0.0, 0.0)]));
        let out = c.handle(&TouchEvent::ended(250, vec![p(1, 0.0, 0.0)]));
        assert!(!out.contains(&GestureEvent::Click));
    }

    #[test]
    fn test_far_movement_is_forwarded_as_move_and_no_click() {
        // Arrange
        let mut c = GestureClassifier::new();
        c.handle(&TouchEvent::began(0, vec![p(1, 0.0, 0.0)]));

        // Act
        let moved = c.handle(&TouchEvent::moved(16, vec![p(1, 15.0, 0.0)]));
        let lifted = c.handle(&TouchEvent::ended(50, vec![p(1, 15.0, 0.0)]));

        // Assert
        assert_eq!(moved, vec![GestureEvent::Move { dx: 15.0, dy: 0.0 }]);
        assert!(lifted.is_empty());
    }

    #[test]
    fn test_moves_are_relative_to_last_forwarded_position() {
        let mut c = GestureClassifier::new();
        c.handle(&TouchEvent::began(0, vec![p(1, 0.0, 0.0)]));
        c.handle(&TouchEvent::moved(300, vec![p(1, 20.0, 0.0)]));
        let out = c.handle(&TouchEvent::moved(316, vec![p(1, 23.0, -1.0)]));
        assert_eq!(out, vec![GestureEvent::Move { dx: 3.0, dy: -1.0 }]);
    }

    #[test]
    fn test_sub_threshold_motion_accumulates_until_forwarded() {
        // Arrange: past the tap window so nothing is held back.
        let mut c = GestureClassifier::new();
        c.handle(&TouchEvent::began(0, vec![p(1, 0.0, 0.0)]));
        c.handle(&TouchEvent::moved(300, vec![p(1, 20.0, 0.0)]));

        // Act
        let first = c.handle(&TouchEvent::moved(316, vec![p(1, 20.3, 0.0)]));
        let second = c.handle(&TouchEvent::moved(332, vec![p(1, 20.6, 0.0)]));

        // Assert
        assert!(first.is_empty());
        assert_eq!(second.len(), 1);
    }

    #[test]
    fn test_slow_glide_under_slop_moves_pointer() {
        // Arrange
        let mut c = GestureClassifier::new();
        let mut out = Vec::new();
        out.extend(c.handle(&TouchEvent::began(0, vec![p(1, 100.0, 100.0)])));

        // Act: 1 unit every 50ms for 400ms, then lift.
        for i in 1..=8u32 {
            out.extend(c.handle(&TouchEvent::moved(
                50 * u64::from(i),
                vec![p(1, 100.0 + f64::from(i), 100.0)],
            )));
        }
        out.extend(c.handle(&TouchEvent::ended(420, vec![p(1, 108.0, 100.0)])));

        // Assert
        let total: f64 = out
            .iter()
            .map(|e| match e {
                GestureEvent::Move { dx, .. } => *dx,
                _ => 0.0,
            })
            .sum();
        assert!((total - 8.0).abs() < 1e-9);
        assert!(!out.contains(&GestureEvent::Click));
        assert!(!out.contains(&GestureEvent::DragStart));
    }

    #[test]
    fn test_long_press_starts_drag_once() {
        // Arrange
        let mut c = GestureClassifier::new();
        let mut out = Vec::new();
        out.extend(c.handle(&TouchEvent::began(0, vec![p(1, 50.0, 50.0)])));
        out.extend(c.handle(&TouchEvent::moved(200, vec![p(1, 52.0, 51.0)])));

        // Act
        out.extend(c.poll(500));
        out.extend(c.poll(516));
        out.extend(c.handle(&TouchEvent::moved(532, vec![p(1, 80.0, 51.0)])));
        out.extend(c.handle(&TouchEvent::ended(600, vec![p(1, 80.0, 51.0)])));

        // Assert
        let drag_start = out.iter().position(|e| *e == GestureEvent::DragStart);
        let first_move_after = out
            .iter()
            .enumerate()
            .skip(drag_start.unwrap() + 1)
            .find(|(_, e)| matches!(e, GestureEvent::Move { .. }));
        assert_eq!(count(&out, |e| *e == GestureEvent::DragStart), 1);
        assert!(first_move_after.is_some());
        assert_eq!(out.last(), Some(&GestureEvent::DragEnd));
        assert!(!out.contains(&GestureEvent::Click));
    }

    #[test]
    fn test_long_press_cancelled_by_displacement() {
        let mut c = GestureClassifier::new();
        c.handle(&TouchEvent::began(0, vec![p(1, 0.0, 0.0)]));
        c.handle(&TouchEvent::moved(100, vec![p(1, 12.0, 0.0)]));
        c.handle(&TouchEvent::moved(150, vec![p(1, 0.0, 0.0)]));
        assert!(c.poll(600).is_empty());
        assert!(!c.is_dragging());
    }

    #[test]
    fn test_long_press_fires_from_next_event_without_poll() {
        let mut c = GestureClassifier::new();
        c.handle(&TouchEvent::began(0, vec![p(1, 0.0, 0.0)]));
        let out = c.handle(&TouchEvent::moved(520, vec![p(1, 30.0, 0.0)]));
        // Displacement is checked before the new position is applied.
        assert_eq!(out[0], GestureEvent::DragStart);
    }

    // ── Two contacts ──────────────────────────────────────────────────────────

    fn two_down(c: &mut GestureClassifier) {
        c.handle(&TouchEvent::began(0, vec![p(1, 100.0, 200.0), p(2, 200.0, 200.0)]));
    }

    #[test]
    fn test_opposing_spread_locks_pinch_and_zooms_twice() {
        // Arrange
        let mut c = GestureClassifier::new();
        two_down(&mut c);
        let mut out = Vec::new();

        // Act: distance +8, +2, +2 with contacts moving apart on x.
        out.extend(c.handle(&TouchEvent::moved(16, vec![p(1, 96.0, 200.0), p(2, 204.0, 200.0)])));
        out.extend(c.handle(&TouchEvent::moved(32, vec![p(1, 95.0, 200.0), p(2, 205.0, 200.0)])));
        out.extend(c.handle(&TouchEvent::moved(48, vec![p(1, 94.0, 200.0), p(2, 206.0, 200.0)])));

        // Assert
        assert_eq!(count(&out, |e| matches!(e, GestureEvent::Zoom { .. })), 2);
        assert_eq!(count(&out, |e| matches!(e, GestureEvent::Scroll { .. })), 0);
        assert!(out
            .iter()
            .all(|e| matches!(e, GestureEvent::Zoom { delta } if (*delta - 2.0).abs() < 1e-9)));
    }

    #[test]
    fn test_pinch_mode_persists_through_parallel_motion() {
        let mut c = GestureClassifier::new();
        two_down(&mut c);
        c.handle(&TouchEvent::moved(16, vec![p(1, 96.0, 200.0), p(2, 204.0, 200.0)]));
        // Both contacts move down together: would be a scroll if undecided.
        let out = c.handle(&TouchEvent::moved(32, vec![p(1, 96.0, 230.0), p(2, 204.0, 230.0)]));
        assert!(out.is_empty());
    }

    #[test]
    fn test_flick_left_fires_back_once_then_nothing() {
        // Arrange
        let mut c = GestureClassifier::new();
        two_down(&mut c);

        // Act
        let flick = c.handle(&TouchEvent::moved(16, vec![p(1, 20.0, 200.0), p(2, 120.0, 200.0)]));
        let after = c.handle(&TouchEvent::moved(32, vec![p(1, 20.0, 260.0), p(2, 120.0, 260.0)]));

        // Assert
        assert_eq!(flick, vec![GestureEvent::Gesture(GestureKind::BrowserBack)]);
        assert!(after.is_empty());
    }

    #[test]
    fn test_gradual_right_travel_only_scrolls() {
        // Arrange
        let mut c = GestureClassifier::new();
        two_down(&mut c);
        let mut out = Vec::new();

        // Act: 8 frames of +10 on x, 100 units in total.
        for i in 1..=8u32 {
            let dx = 10.0 * f64::from(i);
            out.extend(c.handle(&TouchEvent::moved(
                16 * u64::from(i),
                vec![p(1, 100.0 + dx, 200.0), p(2, 200.0 + dx, 200.0)],
            )));
        }
        out.extend(c.handle(&TouchEvent::moved(200, vec![p(1, 200.0, 200.0), p(2, 300.0, 200.0)])));

        // Assert
        assert_eq!(count(&out, |e| matches!(e, GestureEvent::Gesture(_))), 0);
        assert_eq!(count(&out, |e| matches!(e, GestureEvent::Scroll { .. })), 9);
    }

    #[test]
    fn test_slow_horizontal_scroll_never_navigates() {
        // Arrange
        let mut c = GestureClassifier::new();
        two_down(&mut c);
        let mut out = Vec::new();

        // Act: 20 frames of +5 on x.
        for i in 1..=20u32 {
            let dx = 5.0 * f64::from(i);
            out.extend(c.handle(&TouchEvent::moved(
                16 * u64::from(i),
                vec![p(1, 100.0 + dx, 200.0), p(2, 200.0 + dx, 200.0)],
            )));
        }
        out.extend(c.handle(&TouchEvent::ended(400, vec![p(1, 200.0, 200.0), p(2, 300.0, 200.0)])));

        // Assert
        assert_eq!(count(&out, |e| matches!(e, GestureEvent::Scroll { .. })), 20);
        assert!(out.iter().all(|e| !matches!(e, GestureEvent::Gesture(_))));
        assert_eq!(out.last(), Some(&GestureEvent::ScrollReleased));
    }

    #[test]
    fn test_fast_frame_after_scrolling_navigates_forward() {
        let mut c = GestureClassifier::new();
        two_down(&mut c);
        c.handle(&TouchEvent::moved(16, vec![p(1, 100.0, 210.0), p(2, 200.0, 210.0)]));
        let out = c.handle(&TouchEvent::moved(32, vec![p(1, 180.0, 210.0), p(2, 280.0, 210.0)]));
        assert_eq!(out, vec![GestureEvent::Gesture(GestureKind::BrowserForward)]);
    }

    #[test]
    fn test_vertical_two_contact_motion_scrolls() {
        let mut c = GestureClassifier::new();
        two_down(&mut c);
        let out = c.handle(&TouchEvent::moved(16, vec![p(1, 100.0, 210.0), p(2, 200.0, 210.0)]));
        assert_eq!(out, vec![GestureEvent::Scroll { dx: 0.0, dy: 10.0 }]);
    }

    #[test]
    fn test_scroll_release_reports_for_inertia() {
        let mut c = GestureClassifier::new();
        two_down(&mut c);
        c.handle(&TouchEvent::moved(16, vec![p(1, 100.0, 210.0), p(2, 200.0, 210.0)]));
        let out = c.handle(&TouchEvent::ended(300, vec![p(1, 100.0, 210.0), p(2, 200.0, 210.0)]));
        assert_eq!(out, vec![GestureEvent::ScrollReleased]);
    }

    #[test]
    fn test_no_scroll_release_after_navigation() {
        let mut c = GestureClassifier::new();
        two_down(&mut c);
        c.handle(&TouchEvent::moved(16, vec![p(1, 20.0, 200.0), p(2, 120.0, 200.0)]));
        let out = c.handle(&TouchEvent::ended(300, vec![p(1, 20.0, 200.0), p(2, 120.0, 200.0)]));
        assert!(out.is_empty());
    }

    #[test]
    fn test_two_contact_tap_is_right_click() {
        let mut c = GestureClassifier::new();
        two_down(&mut c);
        let out = c.handle(&TouchEvent::ended(120, vec![p(1, 100.0, 200.0), p(2, 200.0, 200.0)]));
        assert_eq!(out, vec![GestureEvent::RightClick]);
    }

    #[test]
    fn test_staggered_two_contact_tap_is_right_click() {
        // Arrange
        let mut c = GestureClassifier::new();
        let mut out = Vec::new();

        // Act
        out.extend(c.handle(&TouchEvent::began(0, vec![p(1, 100.0, 200.0)])));
        out.extend(c.handle(&TouchEvent::began(10, vec![p(2, 200.0, 200.0)])));
        out.extend(c.handle(&TouchEvent::ended(90, vec![p(1, 100.0, 200.0)])));
        out.extend(c.handle(&TouchEvent::ended(130, vec![p(2, 200.0, 200.0)])));

        // Assert
        assert_eq!(out, vec![GestureEvent::RightClick]);
    }

    #[test]
    fn test_slow_two_contact_lift_is_not_right_click() {
        let mut c = GestureClassifier::new();
        two_down(&mut c);
        let out = c.handle(&TouchEvent::ended(260, vec![p(1, 100.0, 200.0), p(2, 200.0, 200.0)]));
        assert!(out.is_empty());
    }

    #[test]
    fn test_swipe_latch_resets_on_new_two_contact_session() {
        // Arrange
        let mut c = GestureClassifier::new();
        two_down(&mut c);
        c.handle(&TouchEvent::moved(16, vec![p(1, 20.0, 200.0), p(2, 120.0, 200.0)]));
        c.handle(&TouchEvent::ended(400, vec![p(1, 20.0, 200.0), p(2, 120.0, 200.0)]));

        // Act
        c.handle(&TouchEvent::began(500, vec![p(3, 100.0, 200.0), p(4, 200.0, 200.0)]));
        let out = c.handle(&TouchEvent::moved(516, vec![p(3, 20.0, 200.0), p(4, 120.0, 200.0)]));

        // Assert
        assert_eq!(out, vec![GestureEvent::Gesture(GestureKind::BrowserBack)]);
    }

    #[test]
    fn test_residual_contact_after_two_is_not_a_tap() {
        let mut c = GestureClassifier::new();
        two_down(&mut c);
        c.handle(&TouchEvent::moved(16, vec![p(1, 100.0, 220.0), p(2, 200.0, 220.0)]));
        c.handle(&TouchEvent::ended(40, vec![p(2, 200.0, 220.0)]));
        let out = c.handle(&TouchEvent::ended(60, vec![p(1, 100.0, 220.0)]));
        assert!(!out.contains(&GestureEvent::Click));
        assert!(!out.contains(&GestureEvent::RightClick));
    }

    // ── Three and four contacts ───────────────────────────────────────────────

    fn three_down(c: &mut GestureClassifier) {
        c.handle(&TouchEvent::began(
            0,
            vec![p(1, 100.0, 300.0), p(2, 150.0, 300.0), p(3, 200.0, 300.0)],
        ));
    }

    fn shift3(dx: f64, dy: f64) -> Vec<TouchPoint> {
        vec![
            p(1, 100.0 + dx, 300.0 + dy),
            p(2, 150.0 + dx, 300.0 + dy),
            p(3, 200.0 + dx, 300.0 + dy),
        ]
    }

    #[test]
    fn test_three_contact_swipe_up_is_mission_control_once() {
        // Arrange
        let mut c = GestureClassifier::new();
        three_down(&mut c);
        let mut out = Vec::new();

        // Act
        out.extend(c.handle(&TouchEvent::moved(16, shift3(0.0, -60.0))));
        out.extend(c.handle(&TouchEvent::moved(32, shift3(0.0, -120.0))));
        out.extend(c.handle(&TouchEvent::moved(48, shift3(0.0, -200.0))));

        // Assert
        assert_eq!(out, vec![GestureEvent::Gesture(GestureKind::MissionControl)]);
    }

    #[test]
    fn test_three_contact_swipe_down_is_app_expose() {
        let mut c = GestureClassifier::new();
        three_down(&mut c);
        let out = c.handle(&TouchEvent::moved(16, shift3(5.0, 130.0)));
        assert_eq!(out, vec![GestureEvent::Gesture(GestureKind::AppExpose)]);
    }

    #[test]
    fn test_three_contact_each_axis_fires_at_most_once() {
        // Arrange
        let mut c = GestureClassifier::new();
        three_down(&mut c);
        let mut out = Vec::new();

        // Act
        out.extend(c.handle(&TouchEvent::moved(16, shift3(0.0, 150.0))));
        out.extend(c.handle(&TouchEvent::moved(32, shift3(300.0, 150.0))));
        out.extend(c.handle(&TouchEvent::moved(48, shift3(600.0, 150.0))));

        // Assert
        assert_eq!(
            out,
            vec![
                GestureEvent::Gesture(GestureKind::AppExpose),
                GestureEvent::Gesture(GestureKind::DesktopRight),
            ]
        );
    }

    #[test]
    fn test_four_contact_swipe_left_fires_and_drops_contacts() {
        // Arrange
        let mut c = GestureClassifier::new();
        c.handle(&TouchEvent::began(
            0,
            vec![p(1, 300.0, 300.0), p(2, 350.0, 300.0), p(3, 400.0, 300.0), p(4, 450.0, 300.0)],
        ));

        // Act
        let out = c.handle(&TouchEvent::moved(
            16,
            vec![p(1, 180.0, 300.0), p(2, 230.0, 300.0), p(3, 280.0, 300.0), p(4, 330.0, 300.0)],
        ));
        let lifted = c.handle(&TouchEvent::ended(200, vec![p(1, 0.0, 0.0), p(2, 0.0, 0.0)]));

        // Assert
        assert_eq!(out, vec![GestureEvent::Gesture(GestureKind::DesktopLeft)]);
        assert_eq!(c.active_contacts(), 0);
        assert!(lifted.is_empty());
    }

    #[test]
    fn test_fifth_contact_is_ignored() {
        let mut c = GestureClassifier::new();
        c.handle(&TouchEvent::began(
            0,
            vec![p(1, 0.0, 0.0), p(2, 1.0, 0.0), p(3, 2.0, 0.0), p(4, 3.0, 0.0), p(5, 4.0, 0.0)],
        ));
        assert_eq!(c.active_contacts(), MAX_CONTACTS);
    }

    #[test]
    fn test_moves_for_unknown_contacts_are_ignored() {
        let mut c = GestureClassifier::new();
        assert!(c.handle(&TouchEvent::moved(0, vec![p(9, 10.0, 10.0)])).is_empty());
        assert!(c.handle(&TouchEvent::ended(0, vec![p(9, 10.0, 10.0)])).is_empty());
    }

    #[test]
    fn test_same_direction_tolerates_stationary_axis() {
        assert!(same_direction(Point::new(3.0, 0.1), Point::new(2.0, -0.1)));
        assert!(!same_direction(Point::new(-3.0, 0.0), Point::new(3.0, 0.0)));
    }
}
