//! Master volume backend driving the macOS output device via `osascript`
//!
//! Each call shells out once; there is no retry. A failed probe at startup
//! makes the daemon fall back to the mock backend.

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use super::backend::{VolumeControl, VolumeError};

/// System master-volume backend
#[derive(Debug, Default)]
pub struct SystemVolume;

impl SystemVolume {
    pub fn new() -> Self {
        Self
    }

    /// Check that the system volume API answers at all
    pub async fn probe() -> Result<Self, VolumeError> {
        let backend = Self::new();
        let volume = backend.volume().await?;
        debug!(volume, "system volume backend probed");
        Ok(backend)
    }

    async fn run_script(&self, script: &str) -> Result<String, VolumeError> {
        let output = Command::new("osascript")
            .arg("-e")
            .arg(script)
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(VolumeError::CommandFailed(stderr));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

#[async_trait]
impl VolumeControl for SystemVolume {
    async fn volume(&self) -> Result<u8, VolumeError> {
        let out = self
            .run_script("output volume of (get volume settings)")
            .await?;
        out.parse::<u8>()
            .map_err(|_| VolumeError::UnreadableOutput(out))
    }

    async fn set_volume(&self, volume: u8) -> Result<u8, VolumeError> {
        self.run_script(&format!("set volume output volume {volume}"))
            .await?;
        Ok(volume)
    }

    async fn muted(&self) -> Result<bool, VolumeError> {
        let out = self
            .run_script("output muted of (get volume settings)")
            .await?;
        out.parse::<bool>()
            .map_err(|_| VolumeError::UnreadableOutput(out))
    }

    async fn set_muted(&self, muted: bool) -> Result<bool, VolumeError> {
        self.run_script(&format!("set volume output muted {muted}"))
            .await?;
        Ok(muted)
    }
}
