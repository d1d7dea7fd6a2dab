//! TrackpadController: the touch client's per-frame pipeline.
//!
//! Wires the [`GestureClassifier`], [`MovementBatcher`], and
//! [`InertiaScroller`] together and hands the resulting wire messages to a
//! [`CommandSink`].  Two entry points drive it:
//!
//! - [`TrackpadController::handle_touch`] for every touch event, and
//! - [`TrackpadController::on_frame`] once per rendered frame.
//!
//! Pointer moves are batched until the next frame; every other command is
//! sent immediately, after first flushing any batched move so the host sees
//! commands in the order the user performed them.
//!
//! # Architecture
//!
//! The controller depends only on traits (`CommandSink`, `SettingsStore`)
//! injected at construction time, so it can be driven in tests with recording
//! doubles and no network.

use std::sync::Arc;

use pad_core::ClientMessage;
use tracing::debug;

use crate::application::batch_moves::MovementBatcher;
use crate::application::classify_gestures::{GestureClassifier, GestureEvent};
use crate::application::inertia::InertiaScroller;
use crate::domain::contact::{TouchEvent, TouchPhase};
use crate::domain::settings::{HapticStrength, Settings};

/// Scroll strip deltas are amplified by this factor.
pub const STRIP_GAIN: f64 = 1.5;
/// Scroll strip motion must exceed this to scroll.
pub const STRIP_MIN: f64 = 0.5;

/// Outbound side of the controller.
///
/// Implementations must never fail; a disconnected transport queues.
pub trait CommandSink: Send + Sync {
    fn send(&self, message: ClientMessage);
}

/// Read access to the user's settings plus the haptic feedback hook.
pub trait SettingsStore: Send + Sync {
    /// Current settings snapshot.
    fn settings(&self) -> Settings;

    /// Requests a feedback pulse.  A no-op when haptics are disabled.
    fn haptic(&self, strength: HapticStrength);
}

/// Client-side trackpad pipeline.
pub struct TrackpadController {
    classifier: GestureClassifier,
    batcher: MovementBatcher,
    inertia: InertiaScroller,
    /// Velocity of the last finger-driven scroll, in wire units.
    last_scroll: Option<(f64, f64)>,
    strip_last_y: Option<f64>,
    settings: Arc<dyn SettingsStore>,
    sink: Arc<dyn CommandSink>,
}

impl TrackpadController {
    pub fn new(settings: Arc<dyn SettingsStore>, sink: Arc<dyn CommandSink>) -> Self {
        Self {
            classifier: GestureClassifier::new(),
            batcher: MovementBatcher::default(),
            inertia: InertiaScroller::new(),
            last_scroll: None,
            strip_last_y: None,
            settings,
            sink,
        }
    }

    /// Feeds one touch event through the classifier.
    pub fn handle_touch(&mut self, event: &TouchEvent) {
        if event.phase == TouchPhase::Began {
            self.inertia.cancel();
        }
        let events = self.classifier.handle(event);
        self.dispatch(events);
    }

    /// Frame boundary: fires a pending long press, flushes batched movement,
    /// and advances inertia.
    pub fn on_frame(&mut self, now_ms: u64) {
        let events = self.classifier.poll(now_ms);
        self.dispatch(events);
        self.flush_moves();
        if let Some((dx, dy)) = self.inertia.next_frame() {
            self.sink.send(ClientMessage::Scroll { dx, dy });
        }
    }

    /// On-screen primary button.
    pub fn click(&mut self) {
        self.flush_moves();
        self.settings.haptic(HapticStrength::Light);
        self.sink.send(ClientMessage::Click);
    }

    /// On-screen secondary button.
    pub fn right_click(&mut self) {
        self.flush_moves();
        self.settings.haptic(HapticStrength::Medium);
        self.sink.send(ClientMessage::RightClick);
    }

    /// A finger touched the one-axis scroll strip.
    pub fn strip_begin(&mut self, y: f64) {
        self.strip_last_y = Some(y);
    }

    /// The finger on the scroll strip moved to `y`.
    pub fn strip_move(&mut self, y: f64) {
        let Some(last) = self.strip_last_y else {
            return;
        };
        let dy = y - last;
        if dy.abs() > STRIP_MIN {
            self.scroll(0.0, dy * STRIP_GAIN);
            self.strip_last_y = Some(y);
        }
    }

    /// The finger left the scroll strip.
    pub fn strip_end(&mut self) {
        self.strip_last_y = None;
    }

    /// `true` while inertia frames are still being produced.
    pub fn is_coasting(&self) -> bool {
        self.inertia.is_active()
    }

    // ── Internals ─────────────────────────────────────────────────────────────

    fn dispatch(&mut self, events: Vec<GestureEvent>) {
        for event in events {
            if let GestureEvent::Move { dx, dy } = event {
                self.batcher.push(dx, dy);
                continue;
            }
            self.flush_moves();
            match event {
                GestureEvent::Move { .. } => {}
                GestureEvent::Click => {
                    self.settings.haptic(HapticStrength::Light);
                    self.sink.send(ClientMessage::Click);
                }
                GestureEvent::RightClick => {
                    self.settings.haptic(HapticStrength::Medium);
                    self.sink.send(ClientMessage::RightClick);
                }
                GestureEvent::DragStart => {
                    self.settings.haptic(HapticStrength::Heavy);
                    self.sink.send(ClientMessage::DragStart);
                }
                GestureEvent::DragEnd => {
                    self.settings.haptic(HapticStrength::Medium);
                    self.sink.send(ClientMessage::DragEnd);
                }
                GestureEvent::Scroll { dx, dy } => self.scroll(dx, dy),
                GestureEvent::Zoom { delta } => {
                    self.settings.haptic(HapticStrength::Light);
                    self.sink.send(ClientMessage::Zoom { delta });
                }
                GestureEvent::Gesture(kind) => {
                    debug!(gesture = %kind, "gesture recognised");
                    self.settings.haptic(HapticStrength::Medium);
                    self.sink.send(ClientMessage::gesture(kind));
                }
                GestureEvent::ScrollReleased => {
                    let coast = self.settings.settings().scroll.inertia;
                    if let (true, Some((vx, vy))) = (coast, self.last_scroll.take()) {
                        self.inertia.start(vx, vy);
                    }
                }
            }
        }
    }

    fn scroll(&mut self, dx: f64, dy: f64) {
        let m = self.settings.settings().scroll.multiplier();
        let (sx, sy) = (dx * m, dy * m);
        self.last_scroll = Some((sx, sy));
        self.sink.send(ClientMessage::Scroll { dx: sx, dy: sy });
    }

    fn flush_moves(&mut self) {
        let m = self.settings.settings().cursor.multiplier();
        if let Some(mv) = self.batcher.flush(m) {
            self.sink.send(ClientMessage::Move {
                dx: mv.dx,
                dy: mv.dy,
            });
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
