//! Integration tests for the touch client pipeline.
//!
//! # Purpose
//!
//! These tests drive the public API end to end: a JSON Lines touch trace is
//! replayed through `TraceReplay` into a `TrackpadController` wired to the
//! real `TomlSettingsStore`, and the commands that reach the outbound sink
//! are checked.  No network is involved; the sink records what it is given.
//!
//! ```text
//! trace ──► TraceReplay ──► TrackpadController ──► RecordingSink
//!                              │        ▲
//!                              ▼        │
//!                         classifier  settings
//! ```

use std::sync::{Arc, Mutex};

use pad_core::ClientMessage;
use pad_touch::application::drive_trackpad::{CommandSink, SettingsStore, TrackpadController};
use pad_touch::infrastructure::replay::{parse_trace, TraceReplay, FRAME_MS};
use pad_touch::infrastructure::storage::settings::TomlSettingsStore;

#[derive(Default)]
struct RecordingSink {
    sent: Mutex<Vec<ClientMessage>>,
}

impl CommandSink for RecordingSink {
    fn send(&self, message: ClientMessage) {
        self.sent.lock().unwrap().push(message);
    }
}

/// Replays `trace` with default settings and returns everything sent.
fn replay(trace: &str) -> Vec<ClientMessage> {
    let store = Arc::new(TomlSettingsStore::in_memory().unwrap());
    replay_with(store, trace)
}

fn replay_with(store: Arc<TomlSettingsStore>, trace: &str) -> Vec<ClientMessage> {
    let sink = Arc::new(RecordingSink::default());
    let mut controller = TrackpadController::new(
        store as Arc<dyn SettingsStore>,
        Arc::clone(&sink) as Arc<dyn CommandSink>,
    );
    let mut replay = TraceReplay::new(parse_trace(trace).unwrap(), FRAME_MS);
    replay.run_to_end(&mut controller);
    let sent = sink.sent.lock().unwrap().clone();
    sent
}

fn kinds(sent: &[ClientMessage]) -> Vec<&'static str> {
    sent.iter().map(|m| m.type_name()).collect()
}

// ── One contact ───────────────────────────────────────────────────────────────

#[test]
fn test_tap_trace_sends_single_click() {
    // Arrange
    let trace = r#"
{"phase":"began","time_ms":0,"points":[{"id":1,"x":200.0,"y":300.0}]}
{"phase":"moved","time_ms":40,"points":[{"id":1,"x":203.0,"y":301.0}]}
{"phase":"ended","time_ms":110,"points":[{"id":1,"x":203.0,"y":301.0}]}
"#;

    // Act
    let sent = replay(trace);

    // Assert
    assert_eq!(sent, vec![ClientMessage::Click]);
}

#[test]
fn test_long_press_trace_drags_with_scaled_moves() {
    // Arrange: hold still past the long-press delay, then slide right.
    let trace = r#"
{"phase":"began","time_ms":0,"points":[{"id":1,"x":100.0,"y":100.0}]}
{"phase":"moved","time_ms":600,"points":[{"id":1,"x":150.0,"y":100.0}]}
{"phase":"moved","time_ms":616,"points":[{"id":1,"x":160.0,"y":100.0}]}
{"phase":"ended","time_ms":700,"points":[{"id":1,"x":160.0,"y":100.0}]}
"#;

    // Act
    let sent = replay(trace);

    // Assert: default pointer multiplier is 5/5 × 1.5.
    assert_eq!(kinds(&sent), vec!["dragStart", "move", "move", "dragEnd"]);
    match sent[1] {
        ClientMessage::Move { dx, dy } => {
            assert!((dx - 75.0).abs() < 1e-9);
            assert_eq!(dy, 0.0);
        }
        ref other => panic!("expected move, got {other:?}"),
    }
}

// ── Two contacts ──────────────────────────────────────────────────────────────

#[test]
fn test_two_finger_scroll_coasts_after_release() {
    // Arrange
    let trace = r#"
{"phase":"began","time_ms":0,"points":[{"id":1,"x":100.0,"y":300.0},{"id":2,"x":200.0,"y":300.0}]}
{"phase":"moved","time_ms":16,"points":[{"id":1,"x":100.0,"y":310.0},{"id":2,"x":200.0,"y":310.0}]}
{"phase":"ended","time_ms":100,"points":[{"id":1,"x":100.0,"y":310.0},{"id":2,"x":200.0,"y":310.0}]}
"#;

    // Act
    let sent = replay(trace);

    // Assert: natural scrolling flips the sign; 10 × 1.5 = 15 then 98 inertia frames.
    assert!(sent.iter().all(|m| matches!(m, ClientMessage::Scroll { .. })));
    assert_eq!(sent.len(), 1 + 98);
    match sent[0] {
        ClientMessage::Scroll { dx, dy } => {
            assert_eq!(dx, 0.0);
            assert!((dy + 15.0).abs() < 1e-9);
        }
        ref other => panic!("expected scroll, got {other:?}"),
    }
}

#[test]
fn test_scroll_without_inertia_setting_stops_on_release() {
    // Arrange
    let store = Arc::new(TomlSettingsStore::in_memory().unwrap());
    store.set("scroll.inertia", toml::Value::Boolean(false)).unwrap();
    let trace = r#"
{"phase":"began","time_ms":0,"points":[{"id":1,"x":100.0,"y":300.0},{"id":2,"x":200.0,"y":300.0}]}
{"phase":"moved","time_ms":16,"points":[{"id":1,"x":100.0,"y":310.0},{"id":2,"x":200.0,"y":310.0}]}
{"phase":"ended","time_ms":100,"points":[{"id":1,"x":100.0,"y":310.0},{"id":2,"x":200.0,"y":310.0}]}
"#;

    // Act
    let sent = replay_with(store, trace);

    // Assert
    assert_eq!(kinds(&sent), vec!["scroll"]);
}

#[test]
fn test_two_finger_tap_trace_sends_right_click() {
    let trace = r#"
{"phase":"began","time_ms":0,"points":[{"id":1,"x":100.0,"y":300.0},{"id":2,"x":200.0,"y":300.0}]}
{"phase":"ended","time_ms":120,"points":[{"id":1,"x":100.0,"y":300.0},{"id":2,"x":200.0,"y":300.0}]}
"#;
    assert_eq!(replay(trace), vec![ClientMessage::RightClick]);
}

#[test]
fn test_pinch_trace_sends_only_zooms() {
    let trace = r#"
{"phase":"began","time_ms":0,"points":[{"id":1,"x":100.0,"y":300.0},{"id":2,"x":200.0,"y":300.0}]}
{"phase":"moved","time_ms":16,"points":[{"id":1,"x":96.0,"y":300.0},{"id":2,"x":204.0,"y":300.0}]}
{"phase":"moved","time_ms":32,"points":[{"id":1,"x":95.0,"y":300.0},{"id":2,"x":205.0,"y":300.0}]}
{"phase":"moved","time_ms":48,"points":[{"id":1,"x":94.0,"y":300.0},{"id":2,"x":206.0,"y":300.0}]}
{"phase":"ended","time_ms":300,"points":[{"id":1,"x":94.0,"y":300.0},{"id":2,"x":206.0,"y":300.0}]}
"#;
    assert_eq!(kinds(&replay(trace)), vec!["zoom", "zoom"]);
}

// ── Three contacts ────────────────────────────────────────────────────────────

#[test]
fn test_three_finger_swipe_up_trace_sends_mission_control() {
    let trace = r#"
{"phase":"began","time_ms":0,"points":[{"id":1,"x":100.0,"y":400.0},{"id":2,"x":150.0,"y":400.0},{"id":3,"x":200.0,"y":400.0}]}
{"phase":"moved","time_ms":16,"points":[{"id":1,"x":100.0,"y":340.0},{"id":2,"x":150.0,"y":340.0},{"id":3,"x":200.0,"y":340.0}]}
{"phase":"moved","time_ms":32,"points":[{"id":1,"x":100.0,"y":280.0},{"id":2,"x":150.0,"y":280.0},{"id":3,"x":200.0,"y":280.0}]}
{"phase":"ended","time_ms":300,"points":[{"id":1,"x":100.0,"y":280.0},{"id":2,"x":150.0,"y":280.0},{"id":3,"x":200.0,"y":280.0}]}
"#;
    assert_eq!(
        replay(trace),
        vec![ClientMessage::Gesture {
            gesture: "missionControl".to_string()
        }]
    );
}
