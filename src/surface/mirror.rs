//! Panel-side mirror of the daemon's state
//!
//! The mirror is never authoritative. It changes by applying pushed
//! notifications, plus two optimistic local adornments: the displayed
//! value of an in-progress slider gesture, and per-card mute styling.

use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use crate::config::{DEFAULT_VOLUME, SHORTCUT_PULSE_MS};
use crate::events::Notification;
use crate::mixer::SourceTable;

/// Severity of a transient status message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Success,
    Error,
}

/// A transient message for the status banner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub text: String,
    pub kind: StatusKind,
}

impl Status {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: StatusKind::Info,
        }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: StatusKind::Success,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: StatusKind::Error,
        }
    }
}

/// Read-only mirrored copy of the source table and global mute flag
#[derive(Debug, Default)]
pub struct Mirror {
    sources: SourceTable,
    muted: bool,
    /// Cards recently changed by a shortcut, for the highlight pulse
    pulses: HashMap<String, Instant>,
    /// Optimistic per-card mute styling. Tracks button presses only; the
    /// underlying effect is the one global flag, so this is not
    /// guaranteed consistent with `muted`.
    local_mutes: HashSet<String>,
}

impl Mirror {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sources(&self) -> &SourceTable {
        &self.sources
    }

    pub fn muted(&self) -> bool {
        self.muted
    }

    /// Display name for a source id, falling back to the id itself
    pub fn display_name(&self, id: &str) -> String {
        self.sources
            .get(id)
            .map(|s| s.name.clone())
            .unwrap_or_else(|| id.to_string())
    }

    /// Apply a pushed notification, returning the status message the
    /// panel should show for it, if any
    pub fn apply(&mut self, notification: &Notification, now: Instant) -> Option<Status> {
        match notification {
            Notification::AudioSources { sources } => {
                self.sources = sources.clone();
                None
            }

            Notification::VolumeUpdate {
                source,
                volume,
                from_shortcut,
            } => {
                self.set_volume(source, *volume);
                if *from_shortcut {
                    self.pulses.insert(source.clone(), now);
                    Some(Status::success(format!(
                        "{} volume: {}%",
                        self.display_name(source),
                        volume
                    )))
                } else {
                    None
                }
            }

            Notification::VolumeUpdated { source, volume } => {
                self.set_volume(source, *volume);
                Some(Status::success(format!(
                    "{} volume updated to {}%",
                    self.display_name(source),
                    volume
                )))
            }

            Notification::MuteUpdate { muted } => {
                self.muted = *muted;
                Some(Status::success(if *muted {
                    "Audio muted"
                } else {
                    "Audio unmuted"
                }))
            }

            Notification::MuteToggled { source, muted } => Some(Status::success(format!(
                "{} {}",
                self.display_name(source),
                if *muted { "muted" } else { "unmuted" }
            ))),

            Notification::ResetVolumes { sources } => {
                self.sources = sources.clone();
                Some(Status::success(format!(
                    "All volumes reset to {DEFAULT_VOLUME}%"
                )))
            }

            Notification::Error { message } => Some(Status::error(message.clone())),
        }
    }

    /// Optimistic display update for an in-progress slider gesture
    pub fn set_displayed_volume(&mut self, source: &str, volume: u8) {
        self.set_volume(source, volume);
    }

    /// Flip the local muted styling for one card; returns the new state
    pub fn toggle_local_mute(&mut self, source: &str) -> bool {
        if !self.local_mutes.remove(source) {
            self.local_mutes.insert(source.to_string());
            true
        } else {
            false
        }
    }

    pub fn is_locally_muted(&self, source: &str) -> bool {
        self.local_mutes.contains(source)
    }

    /// Whether a card is inside its post-shortcut highlight window
    pub fn is_pulsing(&self, source: &str, now: Instant) -> bool {
        self.pulses.get(source).is_some_and(|since| {
            now.duration_since(*since) < Duration::from_millis(SHORTCUT_PULSE_MS)
        })
    }

    fn set_volume(&mut self, source: &str, volume: u8) {
        if let Some(entry) = self.sources.get_mut(source) {
            // The mirror never trusts wire values past the display range
            entry.volume = volume.min(100);
        }
    }
}
