//! Touch-trace replay: drives a [`TrackpadController`] from a recorded file.
//!
//! A trace is JSON Lines, one [`TouchEvent`] per line:
//!
//! ```text
//! {"phase":"began","time_ms":0,"points":[{"id":1,"x":100.0,"y":100.0}]}
//! {"phase":"moved","time_ms":16,"points":[{"id":1,"x":112.0,"y":101.0}]}
//! {"phase":"ended","time_ms":90,"points":[{"id":1,"x":112.0,"y":101.0}]}
//! ```
//!
//! Blank lines and lines starting with `#` are skipped.  Replay advances a
//! virtual clock one frame at a time, delivering every event whose timestamp
//! has been reached before running the frame, exactly as a live touch surface
//! interleaves input and animation frames.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use tokio::time::{self, MissedTickBehavior};
use tracing::debug;

use crate::application::drive_trackpad::TrackpadController;
use crate::domain::contact::TouchEvent;

/// Frame period used by the touch client.
pub const FRAME_MS: u64 = 16;

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("I/O error reading trace {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("trace line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Parses a JSON Lines trace.
pub fn parse_trace(text: &str) -> Result<Vec<TouchEvent>, ReplayError> {
    text.lines()
        .enumerate()
        .filter(|(_, l)| {
            let l = l.trim();
            !l.is_empty() && !l.starts_with('#')
        })
        .map(|(i, l)| {
            serde_json::from_str(l).map_err(|source| ReplayError::Parse { line: i + 1, source })
        })
        .collect()
}

pub fn load_trace(path: &Path) -> Result<Vec<TouchEvent>, ReplayError> {
    let text = std::fs::read_to_string(path).map_err(|source| ReplayError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_trace(&text)
}

/// Replays a trace frame by frame.
pub struct TraceReplay {
    events: VecDeque<TouchEvent>,
    frame_ms: u64,
    now_ms: u64,
}

impl TraceReplay {
    pub fn new(mut events: Vec<TouchEvent>, frame_ms: u64) -> Self {
        events.sort_by_key(|e| e.time_ms);
        let now_ms = events.first().map(|e| e.time_ms).unwrap_or(0);
        Self {
            events: events.into(),
            frame_ms: frame_ms.max(1),
            now_ms,
        }
    }

    /// Virtual time of the next frame.
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// All events delivered and inertia has stopped.
    pub fn is_finished(&self, controller: &TrackpadController) -> bool {
        self.events.is_empty() && !controller.is_coasting()
    }

    /// Delivers due events, runs one frame, and advances the clock.
    pub fn step(&mut self, controller: &mut TrackpadController) {
        while self.events.front().is_some_and(|e| e.time_ms <= self.now_ms) {
            if let Some(event) = self.events.pop_front() {
                controller.handle_touch(&event);
            }
        }
        controller.on_frame(self.now_ms);
        self.now_ms += self.frame_ms;
    }

    /// Runs to completion without waiting between frames.
    pub fn run_to_end(&mut self, controller: &mut TrackpadController) {
        while !self.is_finished(controller) {
            self.step(controller);
        }
    }

    /// Runs to completion at wall-clock frame pace.
    pub async fn run_paced(&mut self, controller: &mut TrackpadController) {
        let mut ticker = time::interval(Duration::from_millis(self.frame_ms));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        while !self.is_finished(controller) {
            ticker.tick().await;
            self.step(controller);
        }
        debug!(end_ms = self.now_ms, "trace replay finished");
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
