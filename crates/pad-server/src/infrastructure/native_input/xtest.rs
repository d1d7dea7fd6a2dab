//! Linux X11 native input via the XTest extension.
//!
//! # What is XTest? (for beginners)
//!
//! XTest is an X11 protocol extension that lets a process synthesize keyboard
//! and mouse events as if the user had physically interacted with the
//! hardware.  The receiving application cannot tell them apart from real
//! input.  One display connection is opened at startup and reused for every
//! call, so a move on the 8ms tick costs one request rather than a process.
//!
//! | Operation       | Xlib / XTest call                                     |
//! |-----------------|-------------------------------------------------------|
//! | screen size     | `XDisplayWidth` / `XDisplayHeight`                    |
//! | cursor position | `XQueryPointer` on the root window                    |
//! | move            | `XTestFakeMotionEvent`                                |
//! | click / toggle  | `XTestFakeButtonEvent` (1 = left, 3 = right)          |
//! | scroll          | `XTestFakeButtonEvent` press+release of buttons 4–7   |
//! | keys and text   | `XStringToKeysym` → `XKeysymToKeycode` → `XTestFakeKeyEvent` |
//!
//! The clipboard is written with `xclip -selection clipboard`; Xlib has no
//! call that owns a selection without running an event loop.
//!
//! # Scroll notches
//!
//! X11 has no scroll-wheel API; scrolling is a press+release of buttons 4–7.
//! Pixel amounts are converted to notches of [`PIXELS_PER_NOTCH`], with at
//! least one notch for any non-zero amount.
//!
//! # Shifted keysyms
//!
//! A keysym such as `A` or `plus` shares its keycode with an unshifted one.
//! When the keycode's first keysym is not the requested one, Shift is held
//! around the key press.

use std::ffi::CString;
use std::io::Write;
use std::os::raw::{c_int, c_uint};
use std::process::{Command, Stdio};
use std::ptr::NonNull;
use std::sync::Mutex;

use pad_core::keymap::x11::{chord_keysyms, keysym_name};
use pad_core::{Modifier, Point, ScreenSize};
use tracing::{debug, info};
use x11::{xlib, xtest};

use super::{ButtonState, MouseButton, NativeInput, NativeInputError};

/// Pixel scroll amount per wheel notch.
pub const PIXELS_PER_NOTCH: i32 = 10;

/// `CurrentTime`: let the server stamp synthesized events.
const CURRENT_TIME: xlib::Time = 0;

/// `-1` moves within whichever screen currently holds the pointer.
const SCREEN_DEFAULT: c_int = -1;

const NO_SYMBOL: xlib::KeySym = 0;

const XCLIP: &str = "xclip";

/// An open Xlib connection, closed on drop.
struct Connection(NonNull<xlib::Display>);

// SAFETY: Xlib connections are not thread-safe, but the pointer is only
// dereferenced while the owning `Mutex` is held.
unsafe impl Send for Connection {}

impl Drop for Connection {
    fn drop(&mut self) {
        // SAFETY: the pointer came from `XOpenDisplay` and is closed once.
        unsafe { xlib::XCloseDisplay(self.0.as_ptr()) };
    }
}

/// Native input backed by the XTest extension.  Requires `DISPLAY` to be set.
pub struct XTestInput {
    display: Mutex<Connection>,
}

impl XTestInput {
    /// Connects to the display named by `DISPLAY` and checks for XTest.
    ///
    /// # Errors
    ///
    /// Returns [`NativeInputError::DisplayUnavailable`] if the display cannot
    /// be opened, or [`NativeInputError::Unsupported`] if the server lacks
    /// the XTest extension.
    pub fn open() -> Result<Self, NativeInputError> {
        // SAFETY: a null name means "use $DISPLAY".
        let raw = unsafe { xlib::XOpenDisplay(std::ptr::null()) };
        let Some(ptr) = NonNull::new(raw) else {
            let name = std::env::var("DISPLAY").unwrap_or_else(|_| "<unset>".to_string());
            return Err(NativeInputError::DisplayUnavailable(name));
        };
        let display = Connection(ptr);

        let (mut event_base, mut error_base, mut major, mut minor): (c_int, c_int, c_int, c_int) =
            (0, 0, 0, 0);
        // SAFETY: `display` is open; the out-pointers are valid locals.
        let has_xtest = unsafe {
            xtest::XTestQueryExtension(
                display.0.as_ptr(),
                &mut event_base,
                &mut error_base,
                &mut major,
                &mut minor,
            )
        };
        if has_xtest == xlib::False {
            return Err(NativeInputError::Unsupported("XTest extension".to_string()));
        }
        info!("XTest {major}.{minor} available");

        Ok(Self {
            display: Mutex::new(display),
        })
    }

    /// Runs `f` with the locked connection, then flushes the output buffer.
    fn with_display<T>(
        &self,
        f: impl FnOnce(*mut xlib::Display) -> Result<T, NativeInputError>,
    ) -> Result<T, NativeInputError> {
        let guard = self.display.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let display = guard.0.as_ptr();
        let result = f(display);
        // SAFETY: `display` stays open while `guard` is held.
        unsafe { xlib::XFlush(display) };
        result
    }
}

impl NativeInput for XTestInput {
    fn screen_size(&self) -> Result<ScreenSize, NativeInputError> {
        self.with_display(|display| {
            // SAFETY: `display` is an open connection.
            let (width, height) = unsafe {
                let screen = xlib::XDefaultScreen(display);
                (
                    xlib::XDisplayWidth(display, screen),
                    xlib::XDisplayHeight(display, screen),
                )
            };
            match (u32::try_from(width), u32::try_from(height)) {
                (Ok(w), Ok(h)) if w > 0 && h > 0 => Ok(ScreenSize::new(w, h)),
                _ => Err(NativeInputError::Rejected("XDisplayWidth")),
            }
        })
    }

    fn cursor_position(&self) -> Result<Point, NativeInputError> {
        self.with_display(|display| {
            let (mut root_return, mut child_return): (xlib::Window, xlib::Window) = (0, 0);
            let (mut root_x, mut root_y, mut win_x, mut win_y): (c_int, c_int, c_int, c_int) =
                (0, 0, 0, 0);
            let mut mask: c_uint = 0;
            // SAFETY: `display` is open; the out-pointers are valid locals.
            let on_screen = unsafe {
                let root = xlib::XDefaultRootWindow(display);
                xlib::XQueryPointer(
                    display,
                    root,
                    &mut root_return,
                    &mut child_return,
                    &mut root_x,
                    &mut root_y,
                    &mut win_x,
                    &mut win_y,
                    &mut mask,
                )
            };
            if on_screen == xlib::False {
                return Err(NativeInputError::Rejected("XQueryPointer"));
            }
            Ok(Point::new(f64::from(root_x), f64::from(root_y)))
        })
    }

    fn move_to(&self, x: i32, y: i32) -> Result<(), NativeInputError> {
        self.with_display(|display| {
            // SAFETY: `display` is an open connection.
            let sent = unsafe {
                xtest::XTestFakeMotionEvent(display, SCREEN_DEFAULT, x, y, CURRENT_TIME)
            };
            check(sent, "XTestFakeMotionEvent")
        })
    }

    fn click(&self, button: MouseButton) -> Result<(), NativeInputError> {
        self.with_display(|display| {
            let number = button_number(button);
            fake_button(display, number, true)?;
            fake_button(display, number, false)
        })
    }

    fn toggle(&self, button: MouseButton, state: ButtonState) -> Result<(), NativeInputError> {
        self.with_display(|display| {
            fake_button(display, button_number(button), state == ButtonState::Down)
        })
    }

    fn scroll(&self, dx: i32, dy: i32) -> Result<(), NativeInputError> {
        self.with_display(|display| {
            for (button, notches) in scroll_buttons(dx, dy) {
                for _ in 0..notches {
                    fake_button(display, button, true)?;
                    fake_button(display, button, false)?;
                }
            }
            Ok(())
        })
    }

    fn key_tap(&self, key: &str, modifiers: &[Modifier]) -> Result<(), NativeInputError> {
        let names = chord_keysyms(key, modifiers);
        debug!(?names, "key chord");
        self.with_display(|display| {
            let keysyms = names
                .iter()
                .map(|name| lookup_keysym(name))
                .collect::<Result<Vec<_>, _>>()?;
            let Some((&last, held)) = keysyms.split_last() else {
                return Ok(());
            };
            let mut pressed = Vec::with_capacity(held.len());
            let mut press_chord = || {
                for &keysym in held {
                    let key = resolve(display, keysym)?;
                    fake_key(display, key.code, true)?;
                    pressed.push(key.code);
                }
                tap_keysym(display, last)
            };
            let result = press_chord();
            // Release whatever was pressed, even after a failure.
            for code in pressed.into_iter().rev() {
                fake_key(display, code, false)?;
            }
            result
        })
    }

    fn type_string(&self, text: &str) -> Result<(), NativeInputError> {
        self.with_display(|display| {
            for ch in text.chars() {
                let keysym = char_keysym(ch)?;
                tap_keysym(display, keysym)?;
            }
            Ok(())
        })
    }

    fn set_clipboard(&self, text: &str) -> Result<(), NativeInputError> {
        let failed = |detail: String| NativeInputError::CommandFailed {
            command: XCLIP.to_string(),
            detail,
        };
        let mut child = Command::new(XCLIP)
            .args(["-selection", "clipboard"])
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| failed(e.to_string()))?;
        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(text.as_bytes())
                .map_err(|e| failed(e.to_string()))?;
        }
        let output = child.wait_with_output().map_err(|e| failed(e.to_string()))?;
        if !output.status.success() {
            return Err(failed(String::from_utf8_lossy(&output.stderr).trim().to_string()));
        }
        Ok(())
    }
}

// ── XTest helpers ─────────────────────────────────────────────────────────────

/// A keycode and whether Shift must be held to produce the wanted keysym.
#[derive(Debug, Clone, Copy)]
struct ResolvedKey {
    code: c_uint,
    shifted: bool,
}

/// XTest calls return zero when the request could not be queued.
fn check(sent: c_int, call: &'static str) -> Result<(), NativeInputError> {
    if sent == 0 {
        Err(NativeInputError::Rejected(call))
    } else {
        Ok(())
    }
}

fn fake_button(display: *mut xlib::Display, button: c_uint, press: bool) -> Result<(), NativeInputError> {
    let is_press = if press { xlib::True } else { xlib::False };
    // SAFETY: callers hold the connection lock.
    let sent = unsafe { xtest::XTestFakeButtonEvent(display, button, is_press, CURRENT_TIME) };
    check(sent, "XTestFakeButtonEvent")
}

fn fake_key(display: *mut xlib::Display, code: c_uint, press: bool) -> Result<(), NativeInputError> {
    let is_press = if press { xlib::True } else { xlib::False };
    // SAFETY: callers hold the connection lock.
    let sent = unsafe { xtest::XTestFakeKeyEvent(display, code, is_press, CURRENT_TIME) };
    check(sent, "XTestFakeKeyEvent")
}

fn resolve(display: *mut xlib::Display, keysym: xlib::KeySym) -> Result<ResolvedKey, NativeInputError> {
    // SAFETY: callers hold the connection lock.
    let code = unsafe { xlib::XKeysymToKeycode(display, keysym) };
    if code == 0 {
        return Err(NativeInputError::UnknownKey(format!("keysym {keysym:#x} has no keycode")));
    }
    // SAFETY: as above; index 0 is the unshifted keysym.
    let unshifted = unsafe { xlib::XKeycodeToKeysym(display, code, 0) };
    Ok(ResolvedKey {
        code: c_uint::from(code),
        shifted: unshifted != keysym,
    })
}

/// Presses and releases the key for `keysym`, holding Shift if it needs it.
fn tap_keysym(display: *mut xlib::Display, keysym: xlib::KeySym) -> Result<(), NativeInputError> {
    let key = resolve(display, keysym)?;
    let shift = if key.shifted {
        let shift = resolve(display, lookup_keysym("Shift_L")?)?;
        fake_key(display, shift.code, true)?;
        Some(shift.code)
    } else {
        None
    };
    let result = fake_key(display, key.code, true).and_then(|()| fake_key(display, key.code, false));
    if let Some(code) = shift {
        fake_key(display, code, false)?;
    }
    result
}

/// Looks up a keysym by its X11 name (`Return`, `equal`, `a`).
fn lookup_keysym(name: &str) -> Result<xlib::KeySym, NativeInputError> {
    let c_name = CString::new(name).map_err(|_| NativeInputError::UnknownKey(name.to_string()))?;
    // SAFETY: `c_name` is a valid NUL-terminated string.
    let keysym = unsafe { xlib::XStringToKeysym(c_name.as_ptr()) };
    if keysym == NO_SYMBOL {
        return Err(NativeInputError::UnknownKey(name.to_string()));
    }
    Ok(keysym)
}

// ── Pure helpers ──────────────────────────────────────────────────────────────

fn button_number(button: MouseButton) -> c_uint {
    match button {
        MouseButton::Left => 1,
        MouseButton::Right => 3,
    }
}

/// Wheel notches for a pixel amount.
pub fn scroll_notches(amount: i32) -> u32 {
    let pixels = amount.unsigned_abs();
    if pixels == 0 {
        return 0;
    }
    pixels.div_ceil(PIXELS_PER_NOTCH.unsigned_abs())
}

/// Wheel buttons and notch counts for a scroll: vertical first.
/// Button 4 scrolls up, 5 down, 6 left and 7 right.
pub fn scroll_buttons(dx: i32, dy: i32) -> Vec<(c_uint, u32)> {
    let vertical = if dy > 0 { 4 } else { 5 };
    let horizontal = if dx > 0 { 7 } else { 6 };
    [(vertical, dy), (horizontal, dx)]
        .into_iter()
        .map(|(button, amount)| (button, scroll_notches(amount)))
        .filter(|&(_, notches)| notches > 0)
        .collect()
}

/// Keysym for one character of typed text.
///
/// Printable ASCII keysyms equal their code points; newline and tab go
/// through the named-key table.
pub fn char_keysym(ch: char) -> Result<xlib::KeySym, NativeInputError> {
    match ch {
        ' '..='~' => Ok(xlib::KeySym::from(u32::from(ch))),
        '\n' | '\t' => lookup_keysym(&keysym_name(&ch.to_string())),
        other => Err(NativeInputError::UnknownKey(other.escape_default().to_string())),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scroll_notches_round_up() {
        assert_eq!(scroll_notches(0), 0);
        assert_eq!(scroll_notches(3), 1);
        assert_eq!(scroll_notches(-10), 1);
        assert_eq!(scroll_notches(25), 3);
        assert_eq!(scroll_notches(-120), 12);
    }

    #[test]
    fn test_scroll_buttons_map_direction_to_wheel_button() {
        // Arrange / Act
        let up_left = scroll_buttons(-20, 15);
        let down_right = scroll_buttons(5, -30);

        // Assert
        assert_eq!(up_left, vec![(4, 2), (6, 2)]);
        assert_eq!(down_right, vec![(5, 3), (7, 1)]);
    }

    #[test]
    fn test_scroll_buttons_skip_idle_axis() {
        assert_eq!(scroll_buttons(0, -1), vec![(5, 1)]);
        assert!(scroll_buttons(0, 0).is_empty());
    }

    #[test]
    fn test_button_numbers() {
        assert_eq!(button_number(MouseButton::Left), 1);
        assert_eq!(button_number(MouseButton::Right), 3);
    }

    #[test]
    fn test_printable_ascii_keysyms_are_code_points() {
        assert_eq!(char_keysym('a').unwrap(), 0x61);
        assert_eq!(char_keysym('A').unwrap(), 0x41);
        assert_eq!(char_keysym(' ').unwrap(), 0x20);
        assert_eq!(char_keysym('~').unwrap(), 0x7e);
    }

    #[test]
    fn test_non_ascii_text_is_rejected() {
        let err = char_keysym('é').unwrap_err();
        assert!(matches!(err, NativeInputError::UnknownKey(_)));
    }

    /// With a display the backend must open and report a real screen; without
    /// one it must fail cleanly instead of crashing.
    #[test]
    fn test_open_smoke() {
        match XTestInput::open() {
            Ok(input) => {
                let size = input.screen_size().unwrap();
                assert!(size.width > 0 && size.height > 0);
            }
            Err(e) => {
                if std::env::var("DISPLAY").is_err() {
                    assert!(matches!(e, NativeInputError::DisplayUnavailable(_)));
                }
            }
        }
    }
}
