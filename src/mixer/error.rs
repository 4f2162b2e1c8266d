//! Mixer error taxonomy
//!
//! Every variant is non-fatal: the run loop logs it and forwards the
//! rendered message to panels as an `error` notification.

use crate::volume::VolumeError;

#[derive(Debug, thiserror::Error)]
pub enum MixerError {
    /// Intent referenced a source id not present in the table
    #[error("unknown audio source: {0}")]
    UnknownSource(String),

    /// Requested volume is outside [0, 100]
    #[error("invalid volume value: {0}")]
    InvalidVolume(i32),

    /// The system volume API rejected or failed the call
    #[error("volume backend error: {0}")]
    Backend(#[from] VolumeError),
}
