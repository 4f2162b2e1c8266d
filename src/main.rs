//! voldeckd: privileged daemon for per-source volume control
//!
//! This daemon provides:
//! - the canonical source table and global mute flag
//! - the only connection to the system volume API (with a deterministic
//!   mock fallback when it is unavailable)
//! - global shortcut capture via CGEventTap
//! - a Unix socket IPC server pushing state notifications to panels
//!
//! Sources are logical categories over the one master volume; there is no
//! per-application routing and no persistence across restarts.

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::{broadcast, mpsc};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use voldeck::config::Config;
use voldeck::events::Notification;
use voldeck::hotkey::{Bindings, HotkeyListener};
use voldeck::ipc::Server;
use voldeck::lifecycle::shutdown_signal;
use voldeck::mixer::{default_sources, Command, Mixer};
use voldeck::volume::{MockVolume, SystemVolume, VolumeControl};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "voldeckd starting");

    // Load configuration
    let config = Config::load()?;
    config.ensure_dirs()?;
    info!(
        ?config.socket_path,
        mute_all_key = %config.mute_all_key,
        reset_all_key = %config.reset_all_key,
        "configuration loaded"
    );

    // Use the system master volume if it answers, the mock otherwise
    let backend: Arc<dyn VolumeControl> = match SystemVolume::probe().await {
        Ok(system) => Arc::new(system),
        Err(e) => {
            warn!(error = %e, "system volume backend unavailable, using mock");
            Arc::new(MockVolume::new())
        }
    };

    // IPC server and hotkey listener both feed this channel
    let (command_tx, command_rx) = mpsc::channel::<Command>(32);
    // Mixer -> connected panels
    let (notify_tx, _notify_rx) = broadcast::channel::<Notification>(64);

    let mut mixer = Mixer::new(default_sources(), backend, notify_tx.clone());

    // Best-effort shortcut registration; per-binding failures are logged
    // inside for_sources and do not affect the rest
    let bindings = Bindings::for_sources(
        mixer.sources(),
        config.mute_all_key,
        config.reset_all_key,
    );
    let hotkey_listener = HotkeyListener::new(command_tx.clone(), bindings);
    match hotkey_listener.start() {
        Ok(()) => {
            info!("hotkey listener started");
        }
        Err(e) => {
            error!(?e, "failed to start hotkey listener");
            warn!("continuing without global shortcuts - check Accessibility permissions");
        }
    }

    let server = Server::new(&config.socket_path, command_tx.clone(), notify_tx.clone())?;

    info!("daemon initialized, entering main loop");

    tokio::select! {
        // Process intents and shortcut commands
        _ = mixer.run(command_rx) => {
            info!("mixer exited");
        }

        // Accept panel connections
        result = server.run() => {
            if let Err(e) = result {
                error!(?e, "IPC server error");
            }
        }

        // Wait for shutdown signal
        _ = shutdown_signal() => {
            info!("shutdown signal received");
        }
    }

    // Cleanup
    info!("shutting down...");

    hotkey_listener.stop();
    server.shutdown().await;

    info!("voldeckd stopped");

    Ok(())
}
