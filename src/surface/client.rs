//! Async socket client used by the panel
//!
//! Split into independent halves so the panel can send intents while
//! awaiting the next pushed notification.

use std::path::Path;

use anyhow::{Context, Result};
use tokio::net::unix::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::UnixStream;

use crate::events::Notification;
use crate::ipc::{read_frame, write_frame, Intent};

/// Outbound half: fire-and-forget intents
pub struct ClientSender {
    writer: OwnedWriteHalf,
}

/// Inbound half: pushed notifications
pub struct ClientReceiver {
    reader: OwnedReadHalf,
}

/// Connect to the daemon socket
pub async fn connect(path: &Path) -> Result<(ClientSender, ClientReceiver)> {
    let stream = UnixStream::connect(path)
        .await
        .with_context(|| format!("failed to connect to daemon at {}", path.display()))?;
    let (reader, writer) = stream.into_split();

    Ok((ClientSender { writer }, ClientReceiver { reader }))
}

impl ClientSender {
    pub async fn send(&mut self, intent: &Intent) -> Result<()> {
        write_frame(&mut self.writer, intent).await
    }
}

impl ClientReceiver {
    /// Next pushed notification; None when the daemon closed the connection
    pub async fn next(&mut self) -> Result<Option<Notification>> {
        read_frame(&mut self.reader).await
    }
}
