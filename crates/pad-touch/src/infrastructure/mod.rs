//! Infrastructure layer for the touch client.
//!
//! Contains the adapters that touch the outside world: the network socket,
//! the settings file, and recorded touch traces.
//!
//! **Dependency rule**: this layer may depend on `application` and `domain`,
//! but MUST NOT be imported by them.  The application layer sees these
//! adapters only through the `CommandSink` and `SettingsStore` traits.
//!
//! # Sub-modules
//!
//! - **`transport`** – Reconnecting WebSocket client with an outbound FIFO
//!   queue and a publish/subscribe event surface.
//!
//! - **`storage`** – TOML settings store with dotted get/set and the haptic
//!   hook.
//!
//! - **`replay`** – Feeds a recorded JSON Lines touch trace through the
//!   controller at the frame rate; used by the `pad-touch` binary.

pub mod replay;
pub mod storage;
pub mod transport;
