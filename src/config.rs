//! Configuration loading and tuning constants

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::hotkey::Key;

/// Default volume for every source at startup and after a reset
pub const DEFAULT_VOLUME: u8 = 50;

/// Volume change applied per global shortcut press
pub const SHORTCUT_STEP: i32 = 5;

/// Volume change applied per slider nudge in the panel
pub const SLIDER_STEP: i32 = 5;

/// Debounce window for slider feedback. Intermediate slider positions are
/// local-only and never cross the IPC boundary, so this is currently not
/// engaged on the commit path; it is the window to use if intermediate
/// updates are ever forwarded.
pub const SLIDER_DEBOUNCE_MS: u64 = 100;

/// How long a status banner message stays visible before auto-dismissing
pub const STATUS_BANNER_MS: u64 = 3000;

/// How long a card stays highlighted after a shortcut-originated change
pub const SHORTCUT_PULSE_MS: u64 = 300;

/// Source id the panel's "mute all" button reports in its toggle-mute intent
pub const MASTER_SOURCE: &str = "master";

/// Daemon configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the Unix domain socket for IPC
    pub socket_path: PathBuf,

    /// Directory for runtime data
    pub data_dir: PathBuf,

    /// Global shortcut toggling mute-all. Defaults to F21, which macOS
    /// keyboards cannot produce; rebind via `VOLDECK_MUTE_ALL_KEY` to
    /// make the action reachable from hardware.
    pub mute_all_key: Key,

    /// Global shortcut resetting every volume. Defaults to F22; rebind
    /// via `VOLDECK_RESET_ALL_KEY`.
    pub reset_all_key: Key,
}

impl Config {
    /// Load configuration from environment and defaults
    pub fn load() -> Result<Self> {
        let home = std::env::var("HOME")?;
        let data_dir = PathBuf::from(&home)
            .join(".local")
            .join("share")
            .join("voldeck");

        let socket_path = data_dir.join("voldeck.sock");

        Ok(Self {
            socket_path,
            data_dir,
            mute_all_key: key_from_env("VOLDECK_MUTE_ALL_KEY", Key::F21)?,
            reset_all_key: key_from_env("VOLDECK_RESET_ALL_KEY", Key::F22)?,
        })
    }

    /// Ensure data directory exists
    pub fn ensure_dirs(&self) -> Result<()> {
        std::fs::create_dir_all(&self.data_dir)?;
        Ok(())
    }
}

fn key_from_env(var: &str, default: Key) -> Result<Key> {
    match std::env::var(var) {
        Ok(value) => value
            .parse()
            .with_context(|| format!("invalid key name in {var}")),
        Err(_) => Ok(default),
    }
}
