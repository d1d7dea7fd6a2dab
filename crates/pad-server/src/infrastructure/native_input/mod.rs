//! Native pointer and keyboard access.
//!
//! [`NativeInput`] is the only path to the host's real cursor and keyboard.
//! It is owned by the injection unit; nothing else in the server calls it.
//!
//! # Implementations
//!
//! | Type                 | Used for                                       |
//! |----------------------|------------------------------------------------|
//! | [`XTestInput`]       | X11 desktops, via Xlib and the XTest extension |
//! | [`MockNativeInput`]  | Tests: records every call, optionally fails    |
//!
//! All methods are synchronous.  The unit runs on its own thread, so a slow
//! native call only delays other native calls.

pub mod mock;
#[cfg(target_os = "linux")]
pub mod xtest;

pub use mock::{MockNativeInput, NativeCall};
#[cfg(target_os = "linux")]
pub use xtest::XTestInput;

use std::sync::Arc;

use pad_core::{Modifier, Point, ScreenSize};
use thiserror::Error;

/// Error type for native input operations.
#[derive(Debug, Error)]
pub enum NativeInputError {
    /// The X display named by `DISPLAY` could not be opened.
    #[error("cannot open X display {0:?}")]
    DisplayUnavailable(String),

    /// The display server refused or could not queue a request.
    #[error("{0} was rejected by the display server")]
    Rejected(&'static str),

    /// A key name or character has no keysym or keycode on this display.
    #[error("unknown key: {0}")]
    UnknownKey(String),

    /// An external tool could not be started or exited unsuccessfully.
    #[error("`{command}` failed: {detail}")]
    CommandFailed { command: String, detail: String },

    /// The backend cannot perform this operation.
    #[error("not supported by this backend: {0}")]
    Unsupported(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonState {
    Down,
    Up,
}

/// Platform-agnostic native input trait.
pub trait NativeInput: Send + Sync {
    /// Size of the primary screen in pixels.
    fn screen_size(&self) -> Result<ScreenSize, NativeInputError>;

    /// Current absolute cursor position.
    fn cursor_position(&self) -> Result<Point, NativeInputError>;

    /// Moves the cursor to an absolute pixel position.
    fn move_to(&self, x: i32, y: i32) -> Result<(), NativeInputError>;

    /// Presses and releases `button`.
    fn click(&self, button: MouseButton) -> Result<(), NativeInputError>;

    /// Presses or releases `button` without the other half.
    fn toggle(&self, button: MouseButton, state: ButtonState) -> Result<(), NativeInputError>;

    /// Scrolls by a pixel amount; positive `dy` scrolls up, positive `dx` right.
    /// Backends with notched wheels round the amount to whole notches.
    fn scroll(&self, dx: i32, dy: i32) -> Result<(), NativeInputError>;

    /// Taps `key` while holding `modifiers`.
    fn key_tap(&self, key: &str, modifiers: &[Modifier]) -> Result<(), NativeInputError>;

    /// Types printable ASCII text.
    fn type_string(&self, text: &str) -> Result<(), NativeInputError>;

    /// Replaces the clipboard contents with `text`.
    fn set_clipboard(&self, text: &str) -> Result<(), NativeInputError>;
}

/// Opens the native input backend for this platform.
///
/// # Errors
///
/// Fails when no desktop session is reachable, or on platforms without a
/// backend.
#[cfg(target_os = "linux")]
pub fn open_native_input() -> Result<Arc<dyn NativeInput>, NativeInputError> {
    Ok(Arc::new(XTestInput::open()?))
}

#[cfg(not(target_os = "linux"))]
pub fn open_native_input() -> Result<Arc<dyn NativeInput>, NativeInputError> {
    Err(NativeInputError::Unsupported(format!(
        "native input on {}",
        std::env::consts::OS
    )))
}
