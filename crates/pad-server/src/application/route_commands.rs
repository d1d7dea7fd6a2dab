//! CommandRouter: decodes client frames and dispatches each command.
//!
//! Every text frame from a touch client passes through
//! [`CommandRouter::handle_frame`].  The router:
//!
//! 1. Decodes the frame.  A frame without a recognised `type` is logged and
//!    dropped; a frame that is not valid JSON, or whose fields do not fit its
//!    type, is answered with an `error` message.  Serving always continues.
//! 2. Validates numeric fields.  Non-finite deltas are a no-op.
//! 3. Translates the command into [`WorkerCommand`]s for the injection unit,
//!    a launch request, or a reply.
//!
//! The router never waits on the unit: [`UnitSender::send`] is
//! fire-and-forget, and launches run in their own task.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use pad_core::keymap::{is_typeable, parse_shortcut, special_key};
use pad_core::protocol::messages::AppEntry;
use pad_core::{
    decode_client_message, ClientMessage, GestureKind, KeyChord, Modifier, PresentationAction,
    ProtocolError, ServerMessage, WorkerCommand,
};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::domain::keystrokes::{gesture_chord, switch_language_chord, zoom_chord};
use crate::domain::PresentationTracker;

/// Text of the `error` reply sent for frames that cannot be processed.
pub const PROCESS_FAILURE_MESSAGE: &str = "Failed to process message";

// ── Seams ─────────────────────────────────────────────────────────────────────

/// Delivers commands to the injection unit without blocking.
pub trait UnitSender: Send + Sync {
    fn send(&self, command: WorkerCommand);
}

/// Error type for application launches and listing.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("failed to run {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{command} exited unsuccessfully: {detail}")]
    Failed { command: String, detail: String },
    #[error("no application named {0:?}")]
    NotFound(String),
}

/// What a `launchApp` message asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchRequest {
    /// Open a URL in the default browser.
    Url(String),
    /// Start an application by name.
    App(String),
    /// Open a file or path with its default handler.
    Open(String),
}

impl LaunchRequest {
    /// Builds a request from `launchApp` fields.  A URL wins over a name;
    /// without either there is nothing to launch.
    pub fn from_fields(
        app_name: Option<&str>,
        url: Option<&str>,
        app_type: Option<&str>,
    ) -> Option<Self> {
        if let Some(url) = url.filter(|u| !u.trim().is_empty()) {
            return Some(Self::Url(url.to_string()));
        }
        let name = app_name.filter(|n| !n.trim().is_empty())?.to_string();
        match app_type.unwrap_or("app") {
            "app" => Some(Self::App(name)),
            _ => Some(Self::Open(name)),
        }
    }
}

impl fmt::Display for LaunchRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Url(url) => write!(f, "url {url}"),
            Self::App(name) => write!(f, "app {name}"),
            Self::Open(path) => write!(f, "{path}"),
        }
    }
}

/// Starts applications and lists the installed ones.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AppLauncher: Send + Sync {
    async fn launch(&self, request: LaunchRequest) -> Result<(), LaunchError>;

    /// Installed applications, sorted by name.
    async fn app_list(&self) -> Result<Vec<AppEntry>, LaunchError>;
}

// ── Router ────────────────────────────────────────────────────────────────────

/// Shared by every client session.
pub struct CommandRouter {
    unit: Arc<dyn UnitSender>,
    launcher: Arc<dyn AppLauncher>,
    presentation: Mutex<PresentationTracker>,
}

impl CommandRouter {
    pub fn new(unit: Arc<dyn UnitSender>, launcher: Arc<dyn AppLauncher>) -> Self {
        Self {
            unit,
            launcher,
            presentation: Mutex::new(PresentationTracker::new()),
        }
    }

    /// Handles one text frame and returns the reply for the sender, if any.
    pub async fn handle_frame(&self, text: &str) -> Option<ServerMessage> {
        match decode_client_message(text) {
            Ok(message) => self.route(message).await,
            Err(ProtocolError::MissingType) => {
                warn!("message without a type; dropped");
                None
            }
            Err(ProtocolError::UnknownType(kind)) => {
                warn!(%kind, "unknown message type; dropped");
                None
            }
            Err(e) => {
                warn!("failed to process message: {e}");
                Some(ServerMessage::Error {
                    message: PROCESS_FAILURE_MESSAGE.to_string(),
                })
            }
        }
    }

    /// Dispatches a decoded command.
    pub async fn route(&self, message: ClientMessage) -> Option<ServerMessage> {
        debug!(kind = message.type_name(), "routing command");
        match message {
            ClientMessage::Move { dx, dy } => {
                if finite(&[dx, dy]) {
                    self.unit.send(WorkerCommand::Move { dx, dy });
                }
            }
            ClientMessage::Click => self.unit.send(WorkerCommand::Click),
            ClientMessage::RightClick => self.unit.send(WorkerCommand::RightClick),
            ClientMessage::Scroll { dx, dy } => {
                if finite(&[dx, dy]) {
                    self.unit.send(WorkerCommand::Scroll { dx, dy });
                }
            }
            ClientMessage::Zoom { delta } => {
                if finite(&[delta]) {
                    self.tap(zoom_chord(delta));
                }
            }
            ClientMessage::DragStart => self.unit.send(WorkerCommand::DragStart),
            ClientMessage::DragEnd => self.unit.send(WorkerCommand::DragEnd),
            ClientMessage::Gesture { gesture } => self.gesture(&gesture),
            ClientMessage::LaunchApp {
                app_name,
                url,
                app_type,
            } => {
                match LaunchRequest::from_fields(
                    app_name.as_deref(),
                    url.as_deref(),
                    app_type.as_deref(),
                ) {
                    Some(request) => self.launch(request),
                    None => warn!("launch request without an app name or url; ignored"),
                }
            }
            ClientMessage::TypeText { text, modifiers } => {
                if text.is_empty() {
                    return None;
                }
                if let Some(modifiers) = parse_modifiers(&modifiers) {
                    self.unit.send(WorkerCommand::TypeText { text, modifiers });
                }
            }
            ClientMessage::TypeKey { key, modifiers } => self.type_key(key, &modifiers),
            ClientMessage::SpecialKey { action, .. } => {
                self.tap(KeyChord::bare(special_key(&action)));
            }
            ClientMessage::Shortcut { shortcut } => match parse_shortcut(&shortcut) {
                Ok(chord) => self.tap(chord),
                Err(e) => warn!(%shortcut, "invalid shortcut: {e}"),
            },
            ClientMessage::SwitchLanguage { lang } => {
                info!(lang = lang.as_deref().unwrap_or("next"), "switching input language");
                self.tap(switch_language_chord());
            }
            ClientMessage::Presentation { action } => self.presentation(&action),
            ClientMessage::GetAppList => return Some(self.app_list().await),
            ClientMessage::GetPresentationInfo => return Some(self.presentation_info()),
        }
        None
    }

    // ── Command helpers ───────────────────────────────────────────────────────

    fn tap(&self, chord: KeyChord) {
        self.unit.send(WorkerCommand::KeyTap {
            key: chord.key,
            modifiers: chord.modifiers,
        });
    }

    fn gesture(&self, gesture: &str) {
        if gesture.is_empty() {
            return;
        }
        match gesture.parse::<GestureKind>() {
            Ok(kind) => self.tap(gesture_chord(kind)),
            Err(_) => warn!(%gesture, "unknown gesture; ignored"),
        }
    }

    fn type_key(&self, key: String, modifiers: &[String]) {
        if key.is_empty() {
            return;
        }
        if !is_typeable(&key) {
            // The unit pastes non-ASCII through the clipboard.
            self.unit.send(WorkerCommand::TypeText {
                text: key,
                modifiers: Vec::new(),
            });
            return;
        }
        if let Some(modifiers) = parse_modifiers(modifiers) {
            self.unit.send(WorkerCommand::KeyTap { key, modifiers });
        }
    }

    fn presentation(&self, action: &str) {
        let action = match action.parse::<PresentationAction>() {
            Ok(action) => action,
            Err(_) => {
                warn!(%action, "unknown presentation action; ignored");
                return;
            }
        };
        let chord = {
            let mut tracker = self.tracker();
            let chord = tracker.apply(action);
            debug!(slide = tracker.current_slide(), ?action, "presentation");
            chord
        };
        self.tap(chord);
    }

    fn presentation_info(&self) -> ServerMessage {
        let tracker = self.tracker();
        ServerMessage::PresentationInfo {
            current_slide: tracker.current_slide(),
            total_slides: tracker.total_slides(),
        }
    }

    fn launch(&self, request: LaunchRequest) {
        info!("launching {request}");
        let launcher = Arc::clone(&self.launcher);
        tokio::spawn(async move {
            let label = request.to_string();
            match launcher.launch(request).await {
                Ok(()) => info!("launched {label}"),
                Err(e) => warn!("launch of {label} failed: {e}"),
            }
        });
    }

    async fn app_list(&self) -> ServerMessage {
        let apps = match self.launcher.app_list().await {
            Ok(apps) => apps,
            Err(e) => {
                warn!("could not list applications: {e}");
                Vec::new()
            }
        };
        ServerMessage::AppList { apps }
    }

    fn tracker(&self) -> MutexGuard<'_, PresentationTracker> {
        self.presentation
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn finite(values: &[f64]) -> bool {
    let ok = values.iter().all(|v| v.is_finite());
    if !ok {
        debug!(?values, "non-finite field; command ignored");
    }
    ok
}

fn parse_modifiers(names: &[String]) -> Option<Vec<Modifier>> {
    match Modifier::parse_all(names) {
        Ok(modifiers) => Some(modifiers),
        Err(e) => {
            warn!("{e}; command ignored");
            None
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
