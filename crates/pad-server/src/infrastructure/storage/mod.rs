//! Storage infrastructure: the server's TOML configuration file.
//!
//! The `config` sub-module reads the file from the platform config directory
//! (or an explicit path), falls back to defaults on first run, and converts
//! the `cursor` and `worker` sections into injection-unit and bridge settings.

pub mod config;

pub use config::{load_config, save_config, ConfigError, ServerConfig};
