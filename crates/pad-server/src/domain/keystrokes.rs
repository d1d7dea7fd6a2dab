//! Key chords for commands that the host performs as keyboard shortcuts.

use pad_core::{GestureKind, KeyChord, Modifier};

/// The chord that performs a system gesture.
pub fn gesture_chord(kind: GestureKind) -> KeyChord {
    match kind {
        GestureKind::MissionControl => KeyChord::new("up", &[Modifier::Control]),
        GestureKind::AppExpose => KeyChord::new("down", &[Modifier::Control]),
        GestureKind::DesktopLeft => KeyChord::new("left", &[Modifier::Control]),
        GestureKind::DesktopRight => KeyChord::new("right", &[Modifier::Control]),
        GestureKind::ShowDesktop => KeyChord::bare("f11"),
        GestureKind::BrowserBack => KeyChord::new("[", &[Modifier::Command]),
        GestureKind::BrowserForward => KeyChord::new("]", &[Modifier::Command]),
    }
}

/// Zoom in for a positive delta, out otherwise.
pub fn zoom_chord(delta: f64) -> KeyChord {
    let key = if delta > 0.0 { "=" } else { "-" };
    KeyChord::new(key, &[Modifier::Command])
}

/// Cycles the active input source.
pub fn switch_language_chord() -> KeyChord {
    KeyChord::new("space", &[Modifier::Control])
}

/// Pastes the clipboard.
pub fn paste_chord() -> KeyChord {
    KeyChord::new("v", &[Modifier::Command])
}
