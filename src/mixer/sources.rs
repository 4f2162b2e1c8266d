//! Audio source table definitions
//!
//! Sources are logical, user-facing categories; they all drive the one
//! master output. The table is fixed at startup and lives for the process
//! lifetime, with volumes resetting to defaults on every restart.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_VOLUME;
use crate::hotkey::Key;

/// One logical audio source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioSource {
    /// Human-readable label shown on the card
    pub name: String,

    /// Logical volume, always within [0, 100]
    pub volume: u8,

    /// Global shortcut raising the volume by one step
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_increase: Option<Key>,

    /// Global shortcut lowering the volume by one step
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_decrease: Option<Key>,
}

impl AudioSource {
    pub fn new(name: &str, key_increase: Key, key_decrease: Key) -> Self {
        Self {
            name: name.to_string(),
            volume: DEFAULT_VOLUME,
            key_increase: Some(key_increase),
            key_decrease: Some(key_decrease),
        }
    }
}

/// Ordered id -> source map; ordering keeps snapshots and renders stable
pub type SourceTable = BTreeMap<String, AudioSource>;

/// Clamp an arbitrary volume computation into the valid [0, 100] range
pub fn clamp_volume(volume: i32) -> u8 {
    volume.clamp(0, 100) as u8
}

/// The fixed set of sources, all at the default volume
pub fn default_sources() -> SourceTable {
    let mut table = SourceTable::new();
    table.insert(
        "music".to_string(),
        AudioSource::new("Music Player", Key::F13, Key::F14),
    );
    table.insert(
        "browser".to_string(),
        AudioSource::new("Browser", Key::F15, Key::F16),
    );
    table.insert(
        "system".to_string(),
        AudioSource::new("System Sounds", Key::F17, Key::F18),
    );
    table.insert(
        "game".to_string(),
        AudioSource::new("Games", Key::F19, Key::F20),
    );
    table
}
