//! Remote trackpad touch client: headless trace driver.
//!
//! Replays a recorded touch trace through the full client pipeline
//! (classifier, batcher, inertia, transport) and sends the resulting commands
//! to a `pad-server`.  Useful for exercising a server without a touch device
//! and for reproducing gesture bugs from a captured trace.
//!
//! # Usage
//!
//! ```text
//! pad-touch --trace swipe.jsonl [OPTIONS]
//!
//! Options:
//!   --trace    <PATH>   JSON Lines touch trace to replay
//!   --settings <PATH>   Settings file [default: platform settings.toml]
//!   --host     <HOST>   Server host (overrides connection.host)
//!   --port     <PORT>   Server port (overrides connection.port)
//!   --fast              Replay without waiting between frames
//!   --linger   <SECS>   How long to wait for queued commands to drain [default: 3]
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use pad_touch::application::drive_trackpad::{CommandSink, SettingsStore, TrackpadController};
use pad_touch::infrastructure::replay::{load_trace, TraceReplay, FRAME_MS};
use pad_touch::infrastructure::storage::settings::TomlSettingsStore;
use pad_touch::infrastructure::transport::event_bus::{TOPIC_ERROR, TOPIC_MESSAGE};
use pad_touch::infrastructure::transport::{
    ConnectionState, TransportConfig, TransportEvent, TransportSession,
};

// ── CLI argument definitions ──────────────────────────────────────────────────

#[derive(Debug, Parser)]
#[command(
    name = "pad-touch",
    about = "Replays a touch trace through the remote trackpad client",
    version
)]
struct Cli {
    /// JSON Lines file with one touch event per line.
    #[arg(long, env = "PAD_TRACE")]
    trace: PathBuf,

    /// Settings file.  Defaults to the platform settings location.
    #[arg(long, env = "PAD_SETTINGS")]
    settings: Option<PathBuf>,

    /// Server host; overrides `connection.host` from settings.
    #[arg(long, env = "PAD_HOST")]
    host: Option<String>,

    /// Server port; overrides `connection.port` from settings.
    #[arg(long, env = "PAD_PORT")]
    port: Option<u16>,

    /// Replay as fast as possible instead of at frame pace.
    #[arg(long)]
    fast: bool,

    /// Seconds to wait for queued commands to reach the server.
    #[arg(long, default_value_t = 3)]
    linger: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let store = match &cli.settings {
        Some(path) => TomlSettingsStore::load(path),
        None => TomlSettingsStore::load_default(),
    }
    .context("failed to load settings")?
    .with_haptic_callback(Box::new(|duration| debug!(?duration, "haptic pulse")));
    let store = Arc::new(store);

    let connection = store.settings().connection;
    let host = cli.host.clone().unwrap_or(connection.host);
    let port = cli.port.unwrap_or(connection.port);

    let events = load_trace(&cli.trace)
        .with_context(|| format!("failed to load trace {}", cli.trace.display()))?;
    info!(events = events.len(), "pad-touch replaying {} to {host}:{port}", cli.trace.display());

    // ── Transport ─────────────────────────────────────────────────────────────
    let session = Arc::new(TransportSession::new(TransportConfig::new(&host, port)));
    session.events().subscribe(TOPIC_MESSAGE, |event| {
        if let TransportEvent::Message(message) = event {
            info!(kind = message.type_name(), "server: {message:?}");
        }
    });
    session.events().subscribe(TOPIC_ERROR, |event| {
        if let TransportEvent::Error { message } = event {
            warn!("transport: {message}");
        }
    });
    let transport_task = Arc::clone(&session).start();

    // ── Replay ────────────────────────────────────────────────────────────────
    let mut controller = TrackpadController::new(
        Arc::clone(&store) as Arc<dyn SettingsStore>,
        Arc::clone(&session) as Arc<dyn CommandSink>,
    );
    let mut replay = TraceReplay::new(events, FRAME_MS);
    if cli.fast {
        replay.run_to_end(&mut controller);
    } else {
        replay.run_paced(&mut controller).await;
    }

    // ── Drain ─────────────────────────────────────────────────────────────────
    let drained = tokio::time::timeout(Duration::from_secs(cli.linger), async {
        while session.queued() > 0 || session.state() != ConnectionState::Connected {
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        // Give the writer a moment to put the last frames on the wire.
        tokio::time::sleep(Duration::from_millis(100)).await;
    })
    .await;
    if drained.is_err() {
        warn!(queued = session.queued(), "server unreachable; discarding queued commands");
    }

    session.shutdown();
    let _ = transport_task.await;
    info!("pad-touch finished");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_requires_only_trace() {
        // Arrange / Act
        let cli = Cli::parse_from(["pad-touch", "--trace", "t.jsonl"]);

        // Assert
        assert_eq!(cli.trace, PathBuf::from("t.jsonl"));
        assert!(cli.host.is_none());
        assert!(cli.port.is_none());
        assert!(!cli.fast);
        assert_eq!(cli.linger, 3);
    }

    #[test]
    fn test_cli_connection_overrides() {
        let cli = Cli::parse_from([
            "pad-touch", "--trace", "t.jsonl", "--host", "10.0.0.9", "--port", "9000", "--fast",
        ]);
        assert_eq!(cli.host.as_deref(), Some("10.0.0.9"));
        assert_eq!(cli.port, Some(9000));
        assert!(cli.fast);
    }

    #[test]
    fn test_cli_without_trace_is_rejected() {
        assert!(Cli::try_parse_from(["pad-touch"]).is_err());
    }
}
