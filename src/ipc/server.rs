//! Unix domain socket server for IPC
//!
//! Every panel connection runs as its own task pair: intent frames are
//! decoded and forwarded into the mixer channel, while every broadcast
//! notification is written back out. A failing panel only disconnects
//! itself; the daemon keeps running.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, error, info, warn};

use crate::events::Notification;
use crate::mixer::Command;

use super::protocol::{read_frame, write_frame, Intent};

/// IPC server handling panel connections
pub struct Server {
    socket_path: PathBuf,
    listener: Option<UnixListener>,
    command_tx: mpsc::Sender<Command>,
    notify_tx: broadcast::Sender<Notification>,
    shutdown_tx: broadcast::Sender<()>,
}

impl Server {
    /// Bind the Unix socket, replacing any stale socket file
    pub fn new(
        socket_path: &Path,
        command_tx: mpsc::Sender<Command>,
        notify_tx: broadcast::Sender<Notification>,
    ) -> Result<Self> {
        if let Some(parent) = socket_path.parent() {
            std::fs::create_dir_all(parent).context("failed to create socket directory")?;
        }

        if socket_path.exists() {
            std::fs::remove_file(socket_path).context("failed to remove stale socket")?;
        }

        let listener = UnixListener::bind(socket_path).context("failed to bind Unix socket")?;

        // Owner-only socket
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(socket_path, std::fs::Permissions::from_mode(0o600))?;
        }

        let (shutdown_tx, _) = broadcast::channel(1);

        info!(?socket_path, "IPC server listening");

        Ok(Self {
            socket_path: socket_path.to_owned(),
            listener: Some(listener),
            command_tx,
            notify_tx,
            shutdown_tx,
        })
    }

    /// Run the server, accepting connections
    pub async fn run(&self) -> Result<()> {
        let listener = self.listener.as_ref().context("server not initialized")?;

        loop {
            match listener.accept().await {
                Ok((stream, _addr)) => {
                    debug!("panel connected");
                    let command_tx = self.command_tx.clone();
                    let notify_rx = self.notify_tx.subscribe();
                    let mut shutdown_rx = self.shutdown_tx.subscribe();

                    tokio::spawn(async move {
                        tokio::select! {
                            result = Self::handle_client(stream, command_tx, notify_rx) => {
                                if let Err(e) = result {
                                    warn!(?e, "client handler error");
                                }
                            }
                            _ = shutdown_rx.recv() => {
                                debug!("client handler shutting down");
                            }
                        }
                    });
                }
                Err(e) => {
                    error!(?e, "accept error");
                }
            }
        }
    }

    /// Handle a single panel connection
    async fn handle_client(
        stream: UnixStream,
        command_tx: mpsc::Sender<Command>,
        mut notify_rx: broadcast::Receiver<Notification>,
    ) -> Result<()> {
        let (mut reader, mut writer) = stream.into_split();

        // Notifications flow out independently of intent reads
        let writer_task = tokio::spawn(async move {
            loop {
                match notify_rx.recv().await {
                    Ok(notification) => {
                        if write_frame(&mut writer, &notification).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!(skipped = n, "notification receiver lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        let result = loop {
            match read_frame::<Intent, _>(&mut reader).await {
                Ok(None) => {
                    debug!("panel disconnected");
                    break Ok(());
                }
                Ok(Some(intent)) => {
                    debug!(?intent, "received intent");
                    if command_tx.send(command_from_intent(intent)).await.is_err() {
                        warn!("mixer channel closed");
                        break Ok(());
                    }
                }
                Err(e) => break Err(e),
            }
        };

        writer_task.abort();
        result
    }

    /// Gracefully shutdown the server
    pub async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());

        if self.socket_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.socket_path) {
                warn!(?e, "failed to remove socket file");
            }
        }

        info!("IPC server shutdown complete");
    }
}

fn command_from_intent(intent: Intent) -> Command {
    match intent {
        Intent::SetVolume { source, volume } => Command::SetVolume { source, volume },
        Intent::GetCurrentVolumes => Command::Snapshot,
        Intent::ToggleMute { source } => Command::ToggleMute { source },
    }
}
