//! Isolated input injection.
//!
//! - [`unit`]: the injection unit, a thread that owns [`NativeInput`] and
//!   applies [`WorkerCommand`]s with move coalescing and drift correction.
//! - [`bridge`]: the [`WorkerBridge`], which the router talks to.  It buffers
//!   commands while no unit is ready and restarts the unit when it exits.
//!
//! [`NativeInput`]: crate::infrastructure::native_input::NativeInput
//! [`WorkerCommand`]: pad_core::WorkerCommand

pub mod bridge;
pub mod unit;

pub use bridge::{BridgeConfig, BridgeError, ThreadSpawner, UnitSpawner, WorkerBridge};
pub use unit::{spawn_unit, InjectionUnit, UnitConfig, UnitHandle};
