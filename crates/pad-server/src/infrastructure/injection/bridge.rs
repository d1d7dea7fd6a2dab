//! The worker bridge: the router's fire-and-forget handle to the unit.
//!
//! # States
//!
//! ```text
//!            spawn                Ready event
//!   (none) ───────► attached ───────────────► ready
//!     ▲                │                        │
//!     │  respawn delay │ events channel closed  │
//!     └────────────────┴────────────────────────┘
//! ```
//!
//! While not ready, [`WorkerBridge::send`] appends to a bounded buffer; when
//! the buffer is full the oldest command is evicted.  On `Ready` the buffer is
//! replayed in order before any newer command, because both paths hold the
//! same lock.  When the unit exits the bridge waits a short fixed delay,
//! spawns a fresh one, and buffering resumes until it reports `Ready`.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use pad_core::{WorkerCommand, WorkerEvent};
use thiserror::Error;
use tokio::sync::mpsc::{error::SendError, UnboundedReceiver, UnboundedSender};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::unit::{spawn_unit, UnitConfig, UnitHandle};
use crate::application::route_commands::UnitSender;
use crate::infrastructure::native_input::NativeInput;

/// Error type for starting injection units.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The unit's thread could not be created.
    #[error("injection unit unavailable: {0}")]
    Spawn(#[source] std::io::Error),
}

/// Starts injection units.  The production spawner runs a real unit on a
/// thread; tests substitute channels they drive by hand.
pub trait UnitSpawner: Send + Sync {
    fn spawn(&self) -> Result<UnitHandle, BridgeError>;
}

/// Spawns [`InjectionUnit`](super::InjectionUnit)s on dedicated threads.
pub struct ThreadSpawner {
    native: Arc<dyn NativeInput>,
    config: UnitConfig,
}

impl ThreadSpawner {
    pub fn new(native: Arc<dyn NativeInput>, config: UnitConfig) -> Self {
        Self { native, config }
    }
}

impl UnitSpawner for ThreadSpawner {
    fn spawn(&self) -> Result<UnitHandle, BridgeError> {
        spawn_unit(Arc::clone(&self.native), self.config.clone()).map_err(BridgeError::Spawn)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BridgeConfig {
    /// Commands kept while no unit is ready.
    pub buffer_capacity: usize,
    /// Pause between a unit exiting and its replacement starting.
    pub respawn_delay: Duration,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: 500,
            respawn_delay: Duration::from_millis(200),
        }
    }
}

#[derive(Default)]
struct BridgeState {
    ready: bool,
    buffer: VecDeque<WorkerCommand>,
    unit: Option<UnboundedSender<WorkerCommand>>,
}

impl BridgeState {
    /// Hands `command` to a ready unit, or gives it back.
    fn try_deliver(&mut self, command: WorkerCommand) -> Result<(), WorkerCommand> {
        if !self.ready {
            return Err(command);
        }
        let Some(unit) = self.unit.as_ref() else {
            return Err(command);
        };
        match unit.send(command) {
            Ok(()) => Ok(()),
            Err(SendError(command)) => {
                self.ready = false;
                Err(command)
            }
        }
    }
}

pub struct WorkerBridge {
    config: BridgeConfig,
    state: Mutex<BridgeState>,
    running: AtomicBool,
    shutdown: Notify,
}

impl WorkerBridge {
    pub fn new(config: BridgeConfig) -> Self {
        Self {
            config,
            state: Mutex::new(BridgeState::default()),
            running: AtomicBool::new(true),
            shutdown: Notify::new(),
        }
    }

    /// Starts the supervisor task that spawns and restarts units.
    pub fn start(self: Arc<Self>, spawner: Arc<dyn UnitSpawner>) -> JoinHandle<()> {
        tokio::spawn(self.supervise(spawner))
    }

    /// Queues `command` for the unit.  Never blocks and never fails.
    pub fn send(&self, command: WorkerCommand) {
        let mut state = self.lock();
        if let Err(command) = state.try_deliver(command) {
            self.buffer(&mut state, command);
        }
    }

    pub fn is_ready(&self) -> bool {
        self.lock().ready
    }

    /// Number of commands waiting for a ready unit.
    pub fn buffered(&self) -> usize {
        self.lock().buffer.len()
    }

    /// Stops the supervisor; the current unit exits once its mailbox closes.
    pub fn shutdown(&self) {
        self.running.store(false, Ordering::SeqCst);
        self.shutdown.notify_one();
    }

    // ── Supervisor ────────────────────────────────────────────────────────────

    async fn supervise(self: Arc<Self>, spawner: Arc<dyn UnitSpawner>) {
        while self.running.load(Ordering::SeqCst) {
            match spawner.spawn() {
                Ok(handle) => {
                    debug!(target: "injection", "injection unit spawned");
                    self.attach(handle.commands);
                    self.pump(handle.events).await;
                    self.detach();
                    if !self.running.load(Ordering::SeqCst) {
                        break;
                    }
                    warn!(
                        target: "injection",
                        delay_ms = self.config.respawn_delay.as_millis() as u64,
                        "injection unit exited; respawning"
                    );
                }
                Err(e) => error!(target: "injection", "{e}"),
            }

            tokio::select! {
                _ = tokio::time::sleep(self.config.respawn_delay) => {}
                _ = self.shutdown.notified() => break,
            }
        }
        self.detach();
        info!(target: "injection", "injection bridge stopped");
    }

    /// Handles unit events until the unit exits or shutdown is requested.
    async fn pump(&self, mut events: UnboundedReceiver<WorkerEvent>) {
        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Some(event) => self.on_event(event),
                    None => return,
                },
                _ = self.shutdown.notified() => return,
            }
        }
    }

    fn on_event(&self, event: WorkerEvent) {
        match event {
            WorkerEvent::Ready { screen } => {
                match screen {
                    Some(s) => info!(target: "injection", "injection unit ready; screen {}x{}", s.width, s.height),
                    None => info!(target: "injection", "injection unit ready; screen size unknown"),
                }
                self.flush();
            }
            WorkerEvent::Error { label, message } => {
                error!(target: "injection", %label, "injection unit error: {message}");
            }
            WorkerEvent::Warn { message } => {
                warn!(target: "injection", "injection unit warning: {message}");
            }
        }
    }

    fn attach(&self, unit: UnboundedSender<WorkerCommand>) {
        let mut state = self.lock();
        state.unit = Some(unit);
        state.ready = false;
    }

    fn detach(&self) {
        let mut state = self.lock();
        state.unit = None;
        state.ready = false;
    }

    /// Marks the unit ready and replays the buffer in order.
    fn flush(&self) {
        let mut state = self.lock();
        state.ready = true;
        let mut replayed = 0usize;
        while let Some(command) = state.buffer.pop_front() {
            if let Err(command) = state.try_deliver(command) {
                state.buffer.push_front(command);
                break;
            }
            replayed += 1;
        }
        if replayed > 0 {
            debug!(target: "injection", replayed, "replayed buffered commands");
        }
    }

    fn buffer(&self, state: &mut BridgeState, command: WorkerCommand) {
        state.buffer.push_back(command);
        if state.buffer.len() > self.config.buffer_capacity.max(1) {
            if let Some(evicted) = state.buffer.pop_front() {
                debug!(target: "injection", kind = evicted.type_name(), "buffer full; evicted oldest");
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, BridgeState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl UnitSender for WorkerBridge {
    fn send(&self, command: WorkerCommand) {
        WorkerBridge::send(self, command);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
