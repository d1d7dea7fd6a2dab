//! Remote trackpad server: entry point.
//!
//! Accepts WebSocket connections from touch clients and turns their commands
//! into pointer and keyboard input on this machine.
//!
//! # Usage
//!
//! ```text
//! pad-server [OPTIONS]
//!
//! Options:
//!   --config <PATH>            Config file [default: platform config dir]
//!   --host <HOST>              Listener address (overrides the config file)
//!   --port <PORT>              Listener port (overrides the config file)
//!   --max-connections <N>      Concurrent clients (overrides the config file)
//!   --verbose                  Log at debug level
//! ```
//!
//! Every option can also be set through a `PAD_*` environment variable
//! (`PAD_CONFIG`, `PAD_HOST`, `PAD_PORT`, `PAD_MAX_CONNECTIONS`,
//! `PAD_VERBOSE`).  `RUST_LOG` overrides the log level entirely.
//!
//! # Startup sequence
//!
//! 1. Load the TOML config and apply CLI overrides.
//! 2. Connect to the X display, then start the worker bridge, which spawns
//!    the injection unit thread.
//! 3. Build the command router over the bridge and the desktop launcher.
//! 4. Serve WebSocket clients until Ctrl+C.

use std::path::PathBuf;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use pad_server::application::{AppLauncher, CommandRouter, UnitSender};
use pad_server::infrastructure::injection::{ThreadSpawner, UnitSpawner, WorkerBridge};
use pad_server::infrastructure::launcher::DesktopLauncher;
use pad_server::infrastructure::native_input::open_native_input;
use pad_server::infrastructure::storage::{load_config, ServerConfig};
use pad_server::infrastructure::ws_server::{run_server, ServerContext};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Remote trackpad host server.
#[derive(Debug, Parser)]
#[command(
    name = "pad-server",
    about = "Receives trackpad commands over WebSocket and injects them as native input",
    version
)]
struct Cli {
    /// Path to the TOML config file.
    #[arg(long, env = "PAD_CONFIG")]
    config: Option<PathBuf>,

    /// Address to bind the WebSocket listener to.
    #[arg(long, env = "PAD_HOST")]
    host: Option<String>,

    /// Port for the WebSocket listener.
    #[arg(long, env = "PAD_PORT")]
    port: Option<u16>,

    /// Maximum number of simultaneously connected clients.
    #[arg(long, env = "PAD_MAX_CONNECTIONS")]
    max_connections: Option<usize>,

    /// Log at debug level.
    #[arg(long, env = "PAD_VERBOSE")]
    verbose: bool,
}

impl Cli {
    /// Applies the command-line overrides on top of the loaded config.
    fn apply(&self, mut config: ServerConfig) -> ServerConfig {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(max) = self.max_connections {
            config.security.max_connections = max;
        }
        config.logging.verbose |= self.verbose;
        config
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref()).context("failed to load configuration")?;
    let config = cli.apply(config);

    init_logging(config.logging.verbose);
    info!(
        "remote trackpad server starting; bind={} max_connections={}",
        config.bind_address(),
        config.security.max_connections
    );

    // ── Injection unit ────────────────────────────────────────────────────────
    let native = open_native_input().context("failed to open native input")?;
    let spawner: Arc<dyn UnitSpawner> = Arc::new(ThreadSpawner::new(native, config.unit_config()));
    let bridge = Arc::new(WorkerBridge::new(config.bridge_config()));
    let supervisor = Arc::clone(&bridge).start(spawner);

    // ── Router ────────────────────────────────────────────────────────────────
    let launcher: Arc<dyn AppLauncher> = Arc::new(DesktopLauncher::new(config.launcher.app_dirs.clone()));
    let unit: Arc<dyn UnitSender> = Arc::clone(&bridge) as Arc<dyn UnitSender>;
    let router = Arc::new(CommandRouter::new(unit, launcher));
    let context = Arc::new(ServerContext::new(router, config.security.max_connections));

    // ── Graceful shutdown flag ────────────────────────────────────────────────
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = Arc::clone(&running);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("received Ctrl+C; shutting down");
                running_clone.store(false, Ordering::Relaxed);
            }
            Err(e) => tracing::error!("failed to listen for Ctrl+C signal: {e}"),
        }
    });

    let result = run_server(&config.bind_address(), context, running).await;

    bridge.shutdown();
    let _ = supervisor.await;
    result?;

    info!("remote trackpad server stopped");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
