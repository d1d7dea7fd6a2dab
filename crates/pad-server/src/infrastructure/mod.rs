//! Infrastructure layer for the trackpad server.
//!
//! Contains OS-facing adapters: the native input backend, the isolated
//! injection unit and its bridge, the application launcher, the WebSocket
//! listener, and configuration storage.
//!
//! **Dependency rule**: this layer may depend on `application`, `domain` and
//! `pad_core`, but MUST NOT be imported by the `application` or `domain`
//! layers.

pub mod injection;
pub mod launcher;
pub mod native_input;
pub mod storage;
pub mod ws_server;
