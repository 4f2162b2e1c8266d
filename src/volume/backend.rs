//! The external volume API contract

use async_trait::async_trait;

/// Errors from the system volume API
#[derive(Debug, thiserror::Error)]
pub enum VolumeError {
    #[error("volume command failed: {0}")]
    CommandFailed(String),

    #[error("volume command produced unreadable output: {0}")]
    UnreadableOutput(String),

    #[error("volume I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Four-method contract over the single system-wide master volume.
///
/// Implementations must be safe to share across tasks; the mixer holds one
/// behind an `Arc<dyn VolumeControl>` and is the only caller.
#[async_trait]
pub trait VolumeControl: Send + Sync {
    /// Current master volume in [0, 100]
    async fn volume(&self) -> Result<u8, VolumeError>;

    /// Set the master volume, returning the accepted value
    async fn set_volume(&self, volume: u8) -> Result<u8, VolumeError>;

    /// Current master mute flag
    async fn muted(&self) -> Result<bool, VolumeError>;

    /// Set the master mute flag, returning the accepted value
    async fn set_muted(&self, muted: bool) -> Result<bool, VolumeError>;
}
