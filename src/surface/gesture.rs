//! Slider drag tracking
//!
//! While a gesture is active, every intermediate position updates only the
//! local display. The daemon hears nothing until the gesture finalizes,
//! which yields exactly one set-volume intent with the final value.

use crate::ipc::Intent;
use crate::mixer::clamp_volume;

/// One in-progress slider drag on a single card
#[derive(Debug, Clone)]
pub struct SliderGesture {
    source: String,
    volume: u8,
}

impl SliderGesture {
    /// Start a drag from the card's current displayed volume
    pub fn begin(source: &str, volume: u8) -> Self {
        Self {
            source: source.to_string(),
            volume,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Current displayed position
    pub fn volume(&self) -> u8 {
        self.volume
    }

    /// Move the slider; display-only, nothing is sent
    pub fn nudge(&mut self, delta: i32) -> u8 {
        self.volume = clamp_volume(self.volume as i32 + delta);
        self.volume
    }

    /// Finalize the gesture, producing its single intent
    pub fn commit(self) -> Intent {
        Intent::SetVolume {
            source: self.source,
            volume: self.volume as i32,
        }
    }
}
