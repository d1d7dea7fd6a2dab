//! JSON message types exchanged between the touch client and the host server.
//!
//! Every message is a JSON object with a `"type"` field that identifies the
//! variant; all other fields sit in the same object:
//!
//! ```json
//! {"type":"move","dx":3.5,"dy":-1.0}
//! {"type":"gesture","gesture":"missionControl"}
//! {"type":"connected","macName":"studio","macOS":"linux 6.8.0"}
//! ```
//!
//! # Why two enums?
//!
//! The client *sends* input commands and queries; the server *sends* replies
//! and the connection greeting.  Using two distinct enums makes it a
//! compile-time error to send a server-only message from the client.
//!
//! # Numeric fields
//!
//! Deltas are `f64`.  A missing, `null`, or non-numeric value decodes to
//! `NaN` instead of failing the whole frame, and the router treats any
//! non-finite value as a no-op.  This keeps one bad field from turning into
//! an `error` reply while still guaranteeing it never reaches a native call.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

// ── Client → Server messages ──────────────────────────────────────────────────

/// All messages the touch client can send to the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    /// Relative pointer motion.
    Move {
        #[serde(default = "non_finite", deserialize_with = "lenient_f64")]
        dx: f64,
        #[serde(default = "non_finite", deserialize_with = "lenient_f64")]
        dy: f64,
    },
    /// Primary button click.
    Click,
    /// Secondary button click.
    RightClick,
    /// Relative scroll.
    Scroll {
        #[serde(default = "non_finite", deserialize_with = "lenient_f64")]
        dx: f64,
        #[serde(default = "non_finite", deserialize_with = "lenient_f64")]
        dy: f64,
    },
    /// Pinch zoom step; positive zooms in.
    Zoom {
        #[serde(default = "non_finite", deserialize_with = "lenient_f64")]
        delta: f64,
    },
    /// Press and hold the primary button.
    DragStart,
    /// Release the primary button held by `DragStart`.
    DragEnd,
    /// A named system or browser gesture.  Kept as a string so an unknown
    /// gesture name is rejected by the router, not by the decoder.
    Gesture { gesture: String },
    /// Open an application by name or a URL.
    LaunchApp {
        #[serde(rename = "appName", default, skip_serializing_if = "Option::is_none")]
        app_name: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        url: Option<String>,
        #[serde(rename = "appType", default, skip_serializing_if = "Option::is_none")]
        app_type: Option<String>,
    },
    /// Type a block of text, optionally holding modifiers.
    TypeText {
        #[serde(default)]
        text: String,
        #[serde(default)]
        modifiers: Vec<String>,
    },
    /// Tap a single key, optionally holding modifiers.
    TypeKey {
        #[serde(default)]
        key: String,
        #[serde(default)]
        modifiers: Vec<String>,
    },
    /// Tap a named editing key (`enter`, `esc`, `delete`, arrows, ...).
    SpecialKey {
        action: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        key: Option<String>,
    },
    /// A chord written as `"cmd+shift+c"`.
    Shortcut { shortcut: String },
    /// Cycle the host's input source.
    SwitchLanguage {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        lang: Option<String>,
    },
    /// Slide deck control.
    Presentation { action: String },
    /// Ask for the list of launchable applications.
    GetAppList,
    /// Ask for the current slide counter.
    GetPresentationInfo,
}

impl ClientMessage {
    /// Every `type` discriminator this enum understands.
    ///
    /// The codec consults this list to tell an unknown type (dropped with a
    /// warning) apart from a known type with a malformed body (answered with
    /// an `error` reply).
    pub const TYPE_NAMES: &'static [&'static str] = &[
        "move",
        "click",
        "rightClick",
        "scroll",
        "zoom",
        "dragStart",
        "dragEnd",
        "gesture",
        "launchApp",
        "typeText",
        "typeKey",
        "specialKey",
        "shortcut",
        "switchLanguage",
        "presentation",
        "getAppList",
        "getPresentationInfo",
    ];

    /// Builds a `gesture` message for a known gesture kind.
    pub fn gesture(kind: GestureKind) -> Self {
        Self::Gesture {
            gesture: kind.as_str().to_string(),
        }
    }

    /// Returns the wire discriminator of this message.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Move { .. } => "move",
            Self::Click => "click",
            Self::RightClick => "rightClick",
            Self::Scroll { .. } => "scroll",
            Self::Zoom { .. } => "zoom",
            Self::DragStart => "dragStart",
            Self::DragEnd => "dragEnd",
            Self::Gesture { .. } => "gesture",
            Self::LaunchApp { .. } => "launchApp",
            Self::TypeText { .. } => "typeText",
            Self::TypeKey { .. } => "typeKey",
            Self::SpecialKey { .. } => "specialKey",
            Self::Shortcut { .. } => "shortcut",
            Self::SwitchLanguage { .. } => "switchLanguage",
            Self::Presentation { .. } => "presentation",
            Self::GetAppList => "getAppList",
            Self::GetPresentationInfo => "getPresentationInfo",
        }
    }
}

// ── Server → Client messages ──────────────────────────────────────────────────

/// All messages the server can send to the touch client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage {
    /// Greeting sent once right after the WebSocket upgrade.
    Connected {
        #[serde(rename = "macName")]
        host_name: String,
        #[serde(rename = "macOS")]
        os_description: String,
    },
    /// Reply to `getAppList`.
    AppList { apps: Vec<AppEntry> },
    /// Reply to `getPresentationInfo`.
    PresentationInfo {
        #[serde(rename = "currentSlide")]
        current_slide: u32,
        #[serde(rename = "totalSlides")]
        total_slides: u32,
    },
    /// Sent when an inbound frame could not be processed.
    Error { message: String },
}

impl ServerMessage {
    /// Returns the wire discriminator of this message.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Connected { .. } => "connected",
            Self::AppList { .. } => "appList",
            Self::PresentationInfo { .. } => "presentationInfo",
            Self::Error { .. } => "error",
        }
    }
}

/// One launchable application found on the host.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AppEntry {
    pub name: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

// ── Gesture vocabulary ────────────────────────────────────────────────────────

/// Named gestures the server knows how to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GestureKind {
    MissionControl,
    AppExpose,
    DesktopLeft,
    DesktopRight,
    ShowDesktop,
    #[serde(alias = "back")]
    BrowserBack,
    #[serde(alias = "forward")]
    BrowserForward,
}

impl GestureKind {
    /// Returns the camelCase wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissionControl => "missionControl",
            Self::AppExpose => "appExpose",
            Self::DesktopLeft => "desktopLeft",
            Self::DesktopRight => "desktopRight",
            Self::ShowDesktop => "showDesktop",
            Self::BrowserBack => "browserBack",
            Self::BrowserForward => "browserForward",
        }
    }
}

impl fmt::Display for GestureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a gesture or presentation action name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown name: {0}")]
pub struct UnknownName(pub String);

impl FromStr for GestureKind {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "missionControl" => Ok(Self::MissionControl),
            "appExpose" => Ok(Self::AppExpose),
            "desktopLeft" => Ok(Self::DesktopLeft),
            "desktopRight" => Ok(Self::DesktopRight),
            "showDesktop" => Ok(Self::ShowDesktop),
            "browserBack" | "back" => Ok(Self::BrowserBack),
            "browserForward" | "forward" => Ok(Self::BrowserForward),
            other => Err(UnknownName(other.to_string())),
        }
    }
}

// ── Presentation vocabulary ───────────────────────────────────────────────────

/// Slide deck actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PresentationAction {
    Next,
    Prev,
    Black,
    White,
    Notes,
    DismissOverlay,
}

impl FromStr for PresentationAction {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "next" => Ok(Self::Next),
            "prev" => Ok(Self::Prev),
            "black" => Ok(Self::Black),
            "white" => Ok(Self::White),
            "notes" => Ok(Self::Notes),
            "dismissOverlay" => Ok(Self::DismissOverlay),
            other => Err(UnknownName(other.to_string())),
        }
    }
}

// ── Lenient numeric decoding ──────────────────────────────────────────────────

fn non_finite() -> f64 {
    f64::NAN
}

/// Accepts any JSON value for a numeric field; anything that is not a number
/// becomes `NaN`.
fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| v.as_f64()).unwrap_or(f64::NAN))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
