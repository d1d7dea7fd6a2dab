//! TOML-based configuration for the trackpad server.
//!
//! The default file lives in the platform config directory:
//! - Windows:  `%APPDATA%\RemoteTrackpad\server.toml`
//! - Linux:    `~/.config/remote-trackpad/server.toml`
//! - macOS:    `~/Library/Application Support/RemoteTrackpad/server.toml`
//!
//! A different file can be given with `--config`.  Example:
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 8080
//!
//! [cursor]
//! max_delta = 120.0
//! speed_multiplier = 1.5
//! ```
//!
//! Every field has a serde default, so a partial file (or no file at all)
//! still produces a complete [`ServerConfig`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::infrastructure::injection::{BridgeConfig, UnitConfig};

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized to TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

// ── Config schema types ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: ListenConfig,
    #[serde(default)]
    pub security: SecurityConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub cursor: CursorConfig,
    #[serde(default)]
    pub worker: WorkerConfig,
    #[serde(default)]
    pub launcher: LauncherConfig,
}

/// Where the WebSocket listener binds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ListenConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SecurityConfig {
    /// Concurrent client sessions; extra sockets are closed with 1008.
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Log at `debug` instead of `info` when `RUST_LOG` is unset.
    #[serde(default)]
    pub verbose: bool,
}

/// Pointer motion applied by the injection unit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CursorConfig {
    /// Per-axis clamp for one drained move, in pixels.
    #[serde(default = "default_max_delta")]
    pub max_delta: f64,
    #[serde(default = "default_speed_multiplier")]
    pub speed_multiplier: f64,
}

/// Timing of the injection unit and its bridge.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkerConfig {
    #[serde(default = "default_move_interval_ms")]
    pub move_interval_ms: u64,
    #[serde(default = "default_sync_interval_ms")]
    pub sync_interval_ms: u64,
    #[serde(default = "default_buffer_capacity")]
    pub buffer_capacity: usize,
    #[serde(default = "default_respawn_delay_ms")]
    pub respawn_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LauncherConfig {
    /// Directories scanned for `.desktop` entries by `getAppList`.
    #[serde(default = "default_app_dirs")]
    pub app_dirs: Vec<PathBuf>,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_max_connections() -> usize {
    5
}
fn default_max_delta() -> f64 {
    120.0
}
fn default_speed_multiplier() -> f64 {
    1.0
}
fn default_move_interval_ms() -> u64 {
    8
}
fn default_sync_interval_ms() -> u64 {
    1500
}
fn default_buffer_capacity() -> usize {
    500
}
fn default_respawn_delay_ms() -> u64 {
    200
}
fn default_app_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![
        PathBuf::from("/usr/share/applications"),
        PathBuf::from("/usr/local/share/applications"),
    ];
    if let Some(home) = std::env::var_os("HOME") {
        dirs.push(PathBuf::from(home).join(".local/share/applications"));
    }
    dirs
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_connections: default_max_connections(),
        }
    }
}

impl Default for CursorConfig {
    fn default() -> Self {
        Self {
            max_delta: default_max_delta(),
            speed_multiplier: default_speed_multiplier(),
        }
    }
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            move_interval_ms: default_move_interval_ms(),
            sync_interval_ms: default_sync_interval_ms(),
            buffer_capacity: default_buffer_capacity(),
            respawn_delay_ms: default_respawn_delay_ms(),
        }
    }
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            app_dirs: default_app_dirs(),
        }
    }
}

impl ServerConfig {
    /// `host:port` for the listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn unit_config(&self) -> UnitConfig {
        UnitConfig {
            move_interval: Duration::from_millis(self.worker.move_interval_ms.max(1)),
            sync_interval: Duration::from_millis(self.worker.sync_interval_ms.max(1)),
            max_delta: self.cursor.max_delta,
            speed_multiplier: self.cursor.speed_multiplier,
        }
    }

    pub fn bridge_config(&self) -> BridgeConfig {
        BridgeConfig {
            buffer_capacity: self.worker.buffer_capacity,
            respawn_delay: Duration::from_millis(self.worker.respawn_delay_ms),
        }
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Determines the platform-appropriate directory for the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] when the platform config base
/// directory cannot be determined from the environment.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    platform_config_dir().ok_or(ConfigError::NoPlatformConfigDir)
}

/// Resolves the full path to the default config file.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join("server.toml"))
}

/// Loads [`ServerConfig`] from `path`, or from [`config_file_path`] when
/// `path` is `None`.  A missing file yields the defaults.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config(path: Option<&Path>) -> Result<ServerConfig, ConfigError> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => config_file_path()?,
    };

    match std::fs::read_to_string(&path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ServerConfig::default()),
        Err(e) => Err(ConfigError::Io { path, source: e }),
    }
}

/// Writes `config` to `path`, creating parent directories as needed.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system failures or
/// [`ConfigError::Serialize`] if serialization fails.
pub fn save_config(config: &ServerConfig, path: &Path) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("RemoteTrackpad"))
    }

    #[cfg(target_os = "linux")]
    {
        // XDG_CONFIG_HOME or ~/.config
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("remote-trackpad"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("RemoteTrackpad")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
