//! Mock native input for unit testing.
//!
//! # Why a mock?
//!
//! The real backend moves the cursor and presses keys on the machine running
//! the tests, and needs a desktop session to do so.  `MockNativeInput`
//! replaces every native call with in-memory recording.  Each call is pushed
//! into a `Mutex<Vec<NativeCall>>` so assertions can inspect exactly what was
//! issued and in what order.
//!
//! # Failure injection
//!
//! Set `should_fail` to make every call return [`NativeInputError::CommandFailed`],
//! or `fail_moves` to fail only `move_to`.  Both are atomics so a test can
//! flip them while the unit thread holds the mock.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use pad_core::{Modifier, Point, ScreenSize};

use super::{ButtonState, MouseButton, NativeInput, NativeInputError};

/// One recorded native call.
#[derive(Debug, Clone, PartialEq)]
pub enum NativeCall {
    ScreenSize,
    CursorPosition,
    MoveTo(i32, i32),
    Click(MouseButton),
    Toggle(MouseButton, ButtonState),
    Scroll(i32, i32),
    KeyTap(String, Vec<Modifier>),
    TypeString(String),
    SetClipboard(String),
}

pub struct MockNativeInput {
    /// Every call in issue order, including failed ones.
    pub calls: Mutex<Vec<NativeCall>>,
    /// What `screen_size` reports.
    pub screen: ScreenSize,
    /// What `cursor_position` reports; `move_to` updates it.
    pub cursor: Mutex<Point>,
    pub should_fail: AtomicBool,
    pub fail_moves: AtomicBool,
}

impl Default for MockNativeInput {
    fn default() -> Self {
        Self::new(ScreenSize::new(1920, 1080), Point::new(960.0, 540.0))
    }
}

impl MockNativeInput {
    pub fn new(screen: ScreenSize, cursor: Point) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            screen,
            cursor: Mutex::new(cursor),
            should_fail: AtomicBool::new(false),
            fail_moves: AtomicBool::new(false),
        }
    }

    /// Moves the simulated cursor as if the user touched the physical mouse.
    pub fn nudge_cursor(&self, to: Point) {
        *lock(&self.cursor) = to;
    }

    /// Snapshot of the recorded calls.
    pub fn calls(&self) -> Vec<NativeCall> {
        lock(&self.calls).clone()
    }

    /// Recorded `move_to` targets only.
    pub fn moves(&self) -> Vec<(i32, i32)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                NativeCall::MoveTo(x, y) => Some((x, y)),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        lock(&self.calls).clear();
    }

    fn record(&self, call: NativeCall) -> Result<(), NativeInputError> {
        let is_move = matches!(call, NativeCall::MoveTo(..));
        lock(&self.calls).push(call);
        if self.should_fail.load(Ordering::SeqCst)
            || (is_move && self.fail_moves.load(Ordering::SeqCst))
        {
            return Err(NativeInputError::CommandFailed {
                command: "mock".to_string(),
                detail: "mock failure".to_string(),
            });
        }
        Ok(())
    }
}

/// Locks `mutex`, recovering the data if a previous holder panicked.
fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl NativeInput for MockNativeInput {
    fn screen_size(&self) -> Result<ScreenSize, NativeInputError> {
        self.record(NativeCall::ScreenSize)?;
        Ok(self.screen)
    }

    fn cursor_position(&self) -> Result<Point, NativeInputError> {
        self.record(NativeCall::CursorPosition)?;
        Ok(*lock(&self.cursor))
    }

    fn move_to(&self, x: i32, y: i32) -> Result<(), NativeInputError> {
        self.record(NativeCall::MoveTo(x, y))?;
        *lock(&self.cursor) = Point::new(f64::from(x), f64::from(y));
        Ok(())
    }

    fn click(&self, button: MouseButton) -> Result<(), NativeInputError> {
        self.record(NativeCall::Click(button))
    }

    fn toggle(&self, button: MouseButton, state: ButtonState) -> Result<(), NativeInputError> {
        self.record(NativeCall::Toggle(button, state))
    }

    fn scroll(&self, dx: i32, dy: i32) -> Result<(), NativeInputError> {
        self.record(NativeCall::Scroll(dx, dy))
    }

    fn key_tap(&self, key: &str, modifiers: &[Modifier]) -> Result<(), NativeInputError> {
        self.record(NativeCall::KeyTap(key.to_string(), modifiers.to_vec()))
    }

    fn type_string(&self, text: &str) -> Result<(), NativeInputError> {
        self.record(NativeCall::TypeString(text.to_string()))
    }

    fn set_clipboard(&self, text: &str) -> Result<(), NativeInputError> {
        self.record(NativeCall::SetClipboard(text.to_string()))
    }
}
