//! Mixer module: single source of truth for volume and mute state
//!
//! The `Mixer` owns the source table and the global mute flag, is the only
//! caller of the system volume backend, and broadcasts a notification for
//! every accepted change. All mutations arrive as `Command`s over one
//! channel, fed by both the IPC server and the hotkey listener.

mod authority;
mod error;
mod sources;

pub use authority::{Command, Mixer};
pub use error::MixerError;
pub use sources::{clamp_volume, default_sources, AudioSource, SourceTable};
