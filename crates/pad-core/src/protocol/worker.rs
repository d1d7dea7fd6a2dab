//! Messages exchanged between the server's command router and the isolated
//! input-injection unit.
//!
//! The channel mirrors the wire vocabulary minus the UI-only queries.  On the
//! JSON side every command has the `{"type": ..., "payload": {...}}` shape so
//! it can be logged or piped to an out-of-process unit unchanged:
//!
//! ```json
//! {"type":"move","payload":{"dx":3.0,"dy":0.0}}
//! {"type":"dragStart"}
//! ```
//!
//! Keystrokes arrive already resolved: the router turns `typeKey`,
//! `specialKey`, `shortcut`, gestures, and presentation actions into
//! [`WorkerCommand::KeyTap`] with canonical key names, so the unit only needs
//! to know how to tap a key.

use serde::{Deserialize, Serialize};

use crate::domain::geometry::ScreenSize;
use crate::keymap::Modifier;

/// A command sent from the router to the injection unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum WorkerCommand {
    /// Add a delta to the movement accumulator.
    Move { dx: f64, dy: f64 },
    Click,
    RightClick,
    Scroll { dx: f64, dy: f64 },
    /// Press the primary button, unless a drag is already active.
    DragStart,
    /// Release the primary button, unless no drag is active.
    DragEnd,
    /// Tap `key` while holding `modifiers`.
    KeyTap {
        key: String,
        #[serde(default)]
        modifiers: Vec<Modifier>,
    },
    /// Type text.  Non-ASCII text is pasted through the clipboard.
    TypeText {
        text: String,
        #[serde(default)]
        modifiers: Vec<Modifier>,
    },
    /// Force an immediate drift correction.
    Sync,
}

impl WorkerCommand {
    /// Returns the channel discriminator, used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Move { .. } => "move",
            Self::Click => "click",
            Self::RightClick => "rightClick",
            Self::Scroll { .. } => "scroll",
            Self::DragStart => "dragStart",
            Self::DragEnd => "dragEnd",
            Self::KeyTap { .. } => "keyTap",
            Self::TypeText { .. } => "typeText",
            Self::Sync => "sync",
        }
    }
}

/// An event reported by the injection unit back to its bridge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum WorkerEvent {
    /// The unit queried the screen and cursor and is accepting commands.
    /// `screen` is `None` when the startup query failed.
    Ready { screen: Option<ScreenSize> },
    /// A native call failed.  `label` names the operation.
    #[serde(rename = "workerError")]
    Error { label: String, message: String },
    /// A recoverable oddity, such as an unsupported command.
    #[serde(rename = "workerWarn")]
    Warn { message: String },
}

// ── Tests ─────────────────────────────────────────────────────────────────────
