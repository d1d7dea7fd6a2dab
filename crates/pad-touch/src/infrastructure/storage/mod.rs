//! Persistent storage for the touch client.
//!
//! - **`settings`** – TOML-backed [`SettingsStore`](crate::application::drive_trackpad::SettingsStore)
//!   with dotted-path accessors (`cursor.speed`, `scroll.natural`) and the
//!   haptic feedback hook.

pub mod settings;
