//! Desktop application launcher.
//!
//! [`DesktopLauncher`] implements [`AppLauncher`] for freedesktop hosts:
//!
//! - URLs and paths are opened with `xdg-open`.
//! - Applications are resolved against the `.desktop` entries in the
//!   configured directories and started with `gtk-launch`.  When no entry
//!   matches, or `gtk-launch` fails, the name is run directly as a program.
//! - `getAppList` lists every visible `Type=Application` entry.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use pad_core::protocol::messages::AppEntry;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::application::{AppLauncher, LaunchError, LaunchRequest};

pub struct DesktopLauncher {
    app_dirs: Vec<PathBuf>,
}

impl DesktopLauncher {
    pub fn new(app_dirs: Vec<PathBuf>) -> Self {
        Self { app_dirs }
    }

    /// Finds the desktop entry whose display name or file stem matches
    /// `name`, ignoring case.
    async fn find_entry(&self, name: &str) -> Option<AppEntry> {
        let wanted = name.to_lowercase();
        scan_dirs(&self.app_dirs).await.into_iter().find(|entry| {
            entry.name.to_lowercase() == wanted
                || desktop_id(Path::new(&entry.path))
                    .map(|id| id.to_lowercase() == wanted)
                    .unwrap_or(false)
        })
    }

    async fn launch_app(&self, name: &str) -> Result<(), LaunchError> {
        if let Some(entry) = self.find_entry(name).await {
            if let Some(id) = desktop_id(Path::new(&entry.path)) {
                match run("gtk-launch", &[id.as_str()]).await {
                    Ok(()) => return Ok(()),
                    Err(e) => warn!("gtk-launch {id} failed: {e}; trying {name} directly"),
                }
            }
        }
        spawn_detached(name)
    }
}

#[async_trait]
impl AppLauncher for DesktopLauncher {
    async fn launch(&self, request: LaunchRequest) -> Result<(), LaunchError> {
        match request {
            LaunchRequest::Url(url) => run("xdg-open", &[url.as_str()]).await,
            LaunchRequest::Open(path) => {
                let path = expand_home(&path);
                run("xdg-open", &[path.as_str()]).await
            }
            LaunchRequest::App(name) => self.launch_app(&name).await,
        }
    }

    async fn app_list(&self) -> Result<Vec<AppEntry>, LaunchError> {
        let mut apps = scan_dirs(&self.app_dirs).await;
        apps.sort();
        apps.dedup_by(|a, b| a.name == b.name);
        Ok(apps)
    }
}

// ── Process helpers ───────────────────────────────────────────────────────────

/// Runs `program` to completion and maps a non-zero exit to an error.
async fn run(program: &str, args: &[&str]) -> Result<(), LaunchError> {
    debug!(program, ?args, "launching");
    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|source| LaunchError::Spawn {
            command: program.to_string(),
            source,
        })?;

    if output.status.success() {
        Ok(())
    } else {
        Err(LaunchError::Failed {
            command: program.to_string(),
            detail: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

/// Starts `name` as a program without waiting for it.
fn spawn_detached(name: &str) -> Result<(), LaunchError> {
    let program = name.trim().to_lowercase().replace(' ', "-");
    Command::new(&program)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map(|_child| ())
        .map_err(|e| {
            debug!(%program, "direct launch failed: {e}");
            LaunchError::NotFound(name.to_string())
        })
}

fn expand_home(path: &str) -> String {
    match (path.strip_prefix("~/"), std::env::var_os("HOME")) {
        (Some(rest), Some(home)) => PathBuf::from(home).join(rest).to_string_lossy().into_owned(),
        _ => path.to_string(),
    }
}

// ── Desktop entries ───────────────────────────────────────────────────────────

fn desktop_id(path: &Path) -> Option<String> {
    path.file_stem().map(|s| s.to_string_lossy().into_owned())
}

/// Reads every `.desktop` file in `dirs`.  Missing or unreadable
/// directories are skipped.
async fn scan_dirs(dirs: &[PathBuf]) -> Vec<AppEntry> {
    let mut apps = Vec::new();
    for dir in dirs {
        let mut entries = match tokio::fs::read_dir(dir).await {
            Ok(entries) => entries,
            Err(e) => {
                debug!(dir = %dir.display(), "skipping app directory: {e}");
                continue;
            }
        };
        while let Ok(Some(entry)) = entries.next_entry().await {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("desktop") {
                continue;
            }
            let Ok(text) = tokio::fs::read_to_string(&path).await else {
                continue;
            };
            if let Some(app) = parse_desktop_entry(&text, &path) {
                apps.push(app);
            }
        }
    }
    apps
}

/// Parses the `[Desktop Entry]` group of a desktop file.  Returns `None`
/// for hidden entries and anything that is not an application.
pub fn parse_desktop_entry(text: &str, path: &Path) -> Option<AppEntry> {
    let mut in_group = false;
    let mut name = None;
    let mut icon = None;
    let mut is_app = false;
    let mut hidden = false;

    for line in text.lines().map(str::trim) {
        if line.starts_with('[') {
            in_group = line == "[Desktop Entry]";
            continue;
        }
        if !in_group {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        match key.trim() {
            "Name" => name = Some(value.trim().to_string()),
            "Icon" => icon = Some(value.trim().to_string()),
            "Type" => is_app = value.trim() == "Application",
            "NoDisplay" | "Hidden" => hidden |= value.trim() == "true",
            _ => {}
        }
    }

    if !is_app || hidden {
        return None;
    }
    Some(AppEntry {
        name: name.filter(|n| !n.is_empty())?,
        path: path.to_string_lossy().into_owned(),
        icon: icon.filter(|i| !i.is_empty()),
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
