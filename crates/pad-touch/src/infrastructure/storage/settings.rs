//! TOML-backed settings store for the touch client.
//!
//! Settings live in `settings.toml` under the platform config directory:
//! - Linux:    `~/.config/remote-trackpad/settings.toml`
//! - macOS:    `~/Library/Application Support/RemoteTrackpad/settings.toml`
//! - Windows:  `%APPDATA%\RemoteTrackpad\settings.toml`
//!
//! # Dotted paths (for beginners)
//!
//! The UI addresses individual settings with a dotted path such as
//! `"scroll.natural"`: the part before the dot names the TOML table and the
//! part after it the key inside that table.  [`TomlSettingsStore::get`] and
//! [`TomlSettingsStore::set`] work on raw `toml::Value`s at those paths, and
//! every `set` is checked by re-reading the whole document as [`Settings`],
//! so a value of the wrong type is rejected instead of corrupting the file.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use thiserror::Error;
use toml::Value;
use tracing::{debug, info};

use crate::application::drive_trackpad::SettingsStore;
use crate::domain::settings::{HapticStrength, Settings};

/// Error type for settings operations.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    #[error("I/O error accessing settings at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse settings TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// The dotted path does not name a known setting.
    #[error("unknown setting `{0}`")]
    UnknownKey(String),
}

/// Receives the vibration length for each haptic pulse.
pub type HapticCallback = Box<dyn Fn(Duration) + Send + Sync>;

/// Settings held in memory as a TOML document, optionally backed by a file.
pub struct TomlSettingsStore {
    path: Option<PathBuf>,
    document: Mutex<Value>,
    haptic: Option<HapticCallback>,
}

impl TomlSettingsStore {
    /// In-memory store holding the defaults.  Nothing is persisted.
    pub fn in_memory() -> Result<Self, SettingsError> {
        Ok(Self {
            path: None,
            document: Mutex::new(Value::try_from(Settings::default())?),
            haptic: None,
        })
    }

    /// Loads the store from `path`; a missing file yields the defaults.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, SettingsError> {
        let path = path.into();
        let settings = match std::fs::read_to_string(&path) {
            Ok(content) => toml::from_str::<Settings>(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no settings file; using defaults");
                Settings::default()
            }
            Err(source) => return Err(SettingsError::Io { path, source }),
        };
        Ok(Self {
            path: Some(path),
            document: Mutex::new(Value::try_from(settings)?),
            haptic: None,
        })
    }

    /// Loads from the platform settings file.
    pub fn load_default() -> Result<Self, SettingsError> {
        Self::load(settings_file_path()?)
    }

    /// Installs the function that performs the vibration.
    pub fn with_haptic_callback(mut self, callback: HapticCallback) -> Self {
        self.haptic = Some(callback);
        self
    }

    /// Reads the value at a dotted path (`"cursor.speed"`).
    pub fn get(&self, path: &str) -> Option<Value> {
        let doc = self.lock();
        lookup(&doc, path).cloned()
    }

    /// Writes `value` at a dotted path after checking the result still
    /// parses as [`Settings`].  Persists to disk when file-backed.
    pub fn set(&self, path: &str, value: Value) -> Result<(), SettingsError> {
        let snapshot = {
            let mut doc = self.lock();
            let mut candidate = doc.clone();
            let slot = lookup_mut(&mut candidate, path)
                .ok_or_else(|| SettingsError::UnknownKey(path.to_string()))?;
            *slot = value;
            let parsed: Settings = candidate.clone().try_into()?;
            *doc = candidate;
            parsed
        };
        info!(path, "setting updated");
        self.persist(&snapshot)
    }

    /// Writes the current settings to the backing file, if any.
    pub fn save(&self) -> Result<(), SettingsError> {
        let settings = self.settings();
        self.persist(&settings)
    }

    fn persist(&self, settings: &Settings) -> Result<(), SettingsError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).map_err(|source| SettingsError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
        }
        let content = toml::to_string_pretty(settings)?;
        std::fs::write(path, content).map_err(|source| SettingsError::Io {
            path: path.clone(),
            source,
        })
    }

    fn lock(&self) -> MutexGuard<'_, Value> {
        self.document.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl SettingsStore for TomlSettingsStore {
    fn settings(&self) -> Settings {
        // `set` only stores documents that parse, so this cannot fail in
        // practice; fall back to defaults rather than panic.
        self.lock().clone().try_into().unwrap_or_default()
    }

    fn haptic(&self, strength: HapticStrength) {
        let haptics = self.settings().haptics;
        if !haptics.enabled {
            return;
        }
        if let Some(callback) = &self.haptic {
            callback(strength.duration(haptics.strength));
        }
    }
}

fn lookup<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(doc, |node, key| node.get(key))
}

fn lookup_mut<'a>(doc: &'a mut Value, path: &str) -> Option<&'a mut Value> {
    path.split('.').try_fold(doc, |node, key| node.get_mut(key))
}

// ── Paths ─────────────────────────────────────────────────────────────────────

/// Full path of the platform settings file.
pub fn settings_file_path() -> Result<PathBuf, SettingsError> {
    platform_config_dir()
        .map(|dir| dir.join("settings.toml"))
        .ok_or(SettingsError::NoPlatformConfigDir)
}

fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("RemoteTrackpad"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            Path::new(&h)
                .join("Library")
                .join("Application Support")
                .join("RemoteTrackpad")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| Path::new(&h).join(".config")))?;
        Some(base.join("remote-trackpad"))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
