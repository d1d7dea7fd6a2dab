//! The injection unit: the single owner of native input.
//!
//! The unit runs on a dedicated OS thread with its own current-thread tokio
//! runtime, so a blocking or crashing native call can never stall the
//! router.  It talks to the rest of the server only through two channels:
//! [`WorkerCommand`]s in, [`WorkerEvent`]s out.
//!
//! # Lifecycle
//!
//! ```text
//! spawn ──► init: query screen + cursor ──► emit Ready{screen}
//!                                             │
//!          ┌──────────────────────────────────┘
//!          ▼
//!   select! over  command mailbox   → handle(command)
//!                 move tick (8ms)   → process_move_buffer()
//!                 sync tick (1.5s)  → sync_cursor()
//!          │
//!          └─ mailbox closed → thread exits
//! ```
//!
//! # Cursor model
//!
//! Moves are relative, but the native call is absolute.  The unit keeps a
//! model of the cursor position, advances it by each drained delta, and
//! periodically overwrites it with the real position so that outside
//! interference (someone touching the physical mouse) does not accumulate.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use pad_core::keymap::is_typeable;
use pad_core::{clamp_axis, Modifier, Point, ScreenSize, WorkerCommand, WorkerEvent};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::domain::keystrokes::paste_chord;
use crate::infrastructure::native_input::{ButtonState, MouseButton, NativeInput, NativeInputError};

/// Per-axis magnitude below which a move is ignored.
pub const MOVE_THRESHOLD: f64 = 0.05;

const LABEL_INIT: &str = "init";
const LABEL_MOVE: &str = "moveMouse";
const LABEL_POSITION: &str = "getMousePos";

/// Tunables for one unit.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitConfig {
    /// How often the move accumulator is drained.
    pub move_interval: Duration,
    /// How often the cursor model is corrected against the real position.
    pub sync_interval: Duration,
    /// Per-axis clamp applied to a drained move and to scroll deltas.
    pub max_delta: f64,
    /// Multiplier applied to drained moves.
    pub speed_multiplier: f64,
}

impl Default for UnitConfig {
    fn default() -> Self {
        Self {
            move_interval: Duration::from_millis(8),
            sync_interval: Duration::from_millis(1500),
            max_delta: 120.0,
            speed_multiplier: 1.0,
        }
    }
}

/// The two channel ends the bridge holds for a running unit.
#[derive(Debug)]
pub struct UnitHandle {
    pub commands: UnboundedSender<WorkerCommand>,
    pub events: UnboundedReceiver<WorkerEvent>,
}

/// Starts a unit on its own thread.
///
/// The unit exits when the returned `commands` sender is dropped; the
/// `events` receiver then yields `None`.
///
/// # Errors
///
/// Returns an error if the OS refuses to create the thread.
pub fn spawn_unit(native: Arc<dyn NativeInput>, config: UnitConfig) -> std::io::Result<UnitHandle> {
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (event_tx, event_rx) = mpsc::unbounded_channel();

    std::thread::Builder::new()
        .name("injection-unit".to_string())
        .spawn(move || {
            let runtime = match tokio::runtime::Builder::new_current_thread()
                .enable_time()
                .build()
            {
                Ok(rt) => rt,
                Err(e) => {
                    let _ = event_tx.send(WorkerEvent::Error {
                        label: "runtime".to_string(),
                        message: e.to_string(),
                    });
                    return;
                }
            };
            let unit = InjectionUnit::new(native, config, event_tx);
            runtime.block_on(unit.run(command_rx));
        })?;

    Ok(UnitHandle {
        commands: command_tx,
        events: event_rx,
    })
}

pub struct InjectionUnit {
    native: Arc<dyn NativeInput>,
    config: UnitConfig,
    events: UnboundedSender<WorkerEvent>,
    screen: Option<ScreenSize>,
    cursor: Option<Point>,
    pending: Point,
    has_pending: bool,
    dragging: bool,
}

impl InjectionUnit {
    pub fn new(
        native: Arc<dyn NativeInput>,
        config: UnitConfig,
        events: UnboundedSender<WorkerEvent>,
    ) -> Self {
        Self {
            native,
            config,
            events,
            screen: None,
            cursor: None,
            pending: Point::default(),
            has_pending: false,
            dragging: false,
        }
    }

    /// Runs until the command mailbox closes.
    pub async fn run(mut self, mut commands: UnboundedReceiver<WorkerCommand>) {
        self.init();

        let floor = Duration::from_millis(1);
        let move_every = self.config.move_interval.max(floor);
        let sync_every = self.config.sync_interval.max(floor);
        let start = Instant::now();
        let mut move_tick = interval_at(start + move_every, move_every);
        move_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut sync_tick = interval_at(start + sync_every, sync_every);
        sync_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(command) => self.handle(command),
                    None => break,
                },
                _ = move_tick.tick() => self.process_move_buffer(),
                _ = sync_tick.tick() => self.sync_cursor(),
            }
        }
        info!("injection unit mailbox closed; exiting");
    }

    /// Queries screen and cursor, then announces readiness.
    pub fn init(&mut self) {
        let queried = self.native_call(LABEL_INIT, |n| {
            let screen = n.screen_size()?;
            Ok((screen, n.cursor_position()))
        });
        if let Some((screen, cursor)) = queried {
            self.screen = Some(screen);
            match cursor {
                Ok(cursor) => self.cursor = Some(cursor),
                Err(e) => self.report_error(LABEL_INIT, e.to_string()),
            }
        }
        self.emit(WorkerEvent::Ready {
            screen: self.screen,
        });
    }

    pub fn handle(&mut self, command: WorkerCommand) {
        debug!(kind = command.type_name(), "unit command");
        match command {
            WorkerCommand::Move { dx, dy } => self.enqueue_move(dx, dy),
            WorkerCommand::Click => {
                self.native_call("click", |n| n.click(MouseButton::Left));
            }
            WorkerCommand::RightClick => {
                self.native_call("rightClick", |n| n.click(MouseButton::Right));
            }
            WorkerCommand::Scroll { dx, dy } => self.scroll(dx, dy),
            WorkerCommand::DragStart => {
                if self.dragging {
                    return;
                }
                self.native_call("dragStart", |n| n.toggle(MouseButton::Left, ButtonState::Down));
                self.dragging = true;
            }
            WorkerCommand::DragEnd => {
                if !self.dragging {
                    return;
                }
                self.native_call("dragEnd", |n| n.toggle(MouseButton::Left, ButtonState::Up));
                self.dragging = false;
            }
            WorkerCommand::KeyTap { key, modifiers } => {
                self.native_call("keyTap", |n| n.key_tap(&key, &modifiers));
            }
            WorkerCommand::TypeText { text, modifiers } => self.type_text(&text, &modifiers),
            WorkerCommand::Sync => self.sync_cursor(),
        }
    }

    /// Adds a delta to the accumulator; the next move tick applies it.
    pub fn enqueue_move(&mut self, dx: f64, dy: f64) {
        if !dx.is_finite() || !dy.is_finite() {
            return;
        }
        if dx.abs() < MOVE_THRESHOLD && dy.abs() < MOVE_THRESHOLD {
            return;
        }
        self.pending = self.pending.offset(dx, dy);
        self.has_pending = true;
    }

    /// Drains the accumulator into at most one absolute move.
    pub fn process_move_buffer(&mut self) {
        if !self.has_pending {
            return;
        }
        let Point { x: dx, y: dy } = std::mem::take(&mut self.pending);
        self.has_pending = false;
        if dx.abs() < MOVE_THRESHOLD && dy.abs() < MOVE_THRESHOLD {
            return;
        }

        let cursor = match self.cursor {
            Some(cursor) => cursor,
            None => match self.native_call(LABEL_POSITION, |n| n.cursor_position()) {
                Some(cursor) => cursor,
                None => return,
            },
        };

        let max = self.config.max_delta;
        let speed = self.config.speed_multiplier;
        let mut target = cursor.offset(clamp_axis(dx, max) * speed, clamp_axis(dy, max) * speed);
        if let Some(screen) = self.screen {
            target = screen.clamp(target);
        }
        self.cursor = Some(target);

        let (x, y) = target.rounded();
        if self.native_call(LABEL_MOVE, |n| n.move_to(x, y)).is_none() {
            self.sync_cursor();
        }
    }

    /// Overwrites the cursor model with the real position.
    ///
    /// On failure the model is dropped; the next move re-reads it.
    pub fn sync_cursor(&mut self) {
        self.cursor = self.native_call(LABEL_POSITION, |n| n.cursor_position());
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn cursor(&self) -> Option<Point> {
        self.cursor
    }

    pub fn screen(&self) -> Option<ScreenSize> {
        self.screen
    }

    // ── Command helpers ───────────────────────────────────────────────────────

    /// Injects only the dominant axis.
    fn scroll(&self, dx: f64, dy: f64) {
        let dx = clamp_axis(dx, self.config.max_delta);
        let dy = clamp_axis(dy, self.config.max_delta);
        let (sx, sy) = if dy.abs() > dx.abs() {
            (0, dy.round() as i32)
        } else {
            (dx.round() as i32, 0)
        };
        if sx == 0 && sy == 0 {
            return;
        }
        self.native_call("scroll", |n| n.scroll(sx, sy));
    }

    fn type_text(&self, text: &str, modifiers: &[Modifier]) {
        if text.is_empty() {
            return;
        }
        if !is_typeable(text) {
            let chord = paste_chord();
            self.native_call("typeViaClipboard", |n| {
                n.set_clipboard(text)?;
                n.key_tap(&chord.key, &chord.modifiers)
            });
        } else if !modifiers.is_empty() {
            for ch in text.chars() {
                let key = ch.to_string();
                if let Err(message) = guarded(self.native.as_ref(), |n| n.key_tap(&key, modifiers)) {
                    self.emit(WorkerEvent::Warn {
                        message: format!("Skipping character {ch:?}: {message}"),
                    });
                }
            }
        } else {
            self.native_call("typeString", |n| n.type_string(text));
        }
    }

    // ── Failure containment ───────────────────────────────────────────────────

    /// Runs one native call; failures and panics become `workerError` events.
    fn native_call<T>(
        &self,
        label: &str,
        call: impl FnOnce(&dyn NativeInput) -> Result<T, NativeInputError>,
    ) -> Option<T> {
        match guarded(self.native.as_ref(), call) {
            Ok(value) => Some(value),
            Err(message) => {
                self.report_error(label, message);
                None
            }
        }
    }

    fn report_error(&self, label: &str, message: String) {
        self.emit(WorkerEvent::Error {
            label: label.to_string(),
            message,
        });
    }

    fn emit(&self, event: WorkerEvent) {
        // The bridge is gone only during shutdown.
        let _ = self.events.send(event);
    }
}

fn guarded<T>(
    native: &dyn NativeInput,
    call: impl FnOnce(&dyn NativeInput) -> Result<T, NativeInputError>,
) -> Result<T, String> {
    match panic::catch_unwind(AssertUnwindSafe(|| call(native))) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(e.to_string()),
        Err(payload) => Err(panic_message(payload.as_ref())),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panicked: {s}")
    } else {
        "panicked".to_string()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
