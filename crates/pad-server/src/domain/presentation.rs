//! Slide-show remote state.
//!
//! The host has no way to ask a presentation app which slide is showing, so
//! the tracker counts the `next`/`prev` presses it forwards.  The count is a
//! best guess: it starts at slide 1 and the total is reported as 0 (unknown).
//!
//! | Action           | Key        | State change            |
//! |------------------|------------|-------------------------|
//! | `next`           | Right      | slide + 1               |
//! | `prev`           | Left       | slide − 1, never below 1 |
//! | `black`          | `b`        | overlay toggles         |
//! | `white`          | `w`        | overlay toggles         |
//! | `notes`          | Alt+`p`    | none                    |
//! | `dismissOverlay` | Escape     | overlay off             |

use pad_core::{KeyChord, Modifier, PresentationAction};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresentationTracker {
    current_slide: u32,
    total_slides: u32,
    overlay_active: bool,
}

impl Default for PresentationTracker {
    fn default() -> Self {
        Self {
            current_slide: 1,
            total_slides: 0,
            overlay_active: false,
        }
    }
}

impl PresentationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Updates the state for `action` and returns the chord to press.
    pub fn apply(&mut self, action: PresentationAction) -> KeyChord {
        match action {
            PresentationAction::Next => {
                self.current_slide = self.current_slide.saturating_add(1);
                KeyChord::bare("right")
            }
            PresentationAction::Prev => {
                if self.current_slide > 1 {
                    self.current_slide -= 1;
                }
                KeyChord::bare("left")
            }
            PresentationAction::Black => {
                self.overlay_active = !self.overlay_active;
                KeyChord::bare("b")
            }
            PresentationAction::White => {
                self.overlay_active = !self.overlay_active;
                KeyChord::bare("w")
            }
            PresentationAction::Notes => KeyChord::new("p", &[Modifier::Alt]),
            PresentationAction::DismissOverlay => {
                self.overlay_active = false;
                KeyChord::bare("escape")
            }
        }
    }

    pub fn current_slide(&self) -> u32 {
        self.current_slide
    }

    pub fn total_slides(&self) -> u32 {
        self.total_slides
    }

    pub fn overlay_active(&self) -> bool {
        self.overlay_active
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
