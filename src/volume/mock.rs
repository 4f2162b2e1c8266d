//! Deterministic in-memory volume backend
//!
//! Stands in for the system backend when it is unavailable and backs the
//! mixer tests. Starts at volume 50, unmuted, and records every set_volume
//! call so tests can assert call counts. A switchable failing mode makes
//! every call error, for exercising the mixer's backend-failure path.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::config::DEFAULT_VOLUME;

use super::backend::{VolumeControl, VolumeError};

#[derive(Debug)]
struct MockState {
    volume: u8,
    muted: bool,
    failing: bool,
    set_volume_calls: Vec<u8>,
}

impl MockState {
    fn check(&self) -> Result<(), VolumeError> {
        if self.failing {
            return Err(VolumeError::CommandFailed("mock failure".to_string()));
        }
        Ok(())
    }
}

/// In-memory stand-in for the master volume
#[derive(Debug)]
pub struct MockVolume {
    state: Mutex<MockState>,
}

impl MockVolume {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState {
                volume: DEFAULT_VOLUME,
                muted: false,
                failing: false,
                set_volume_calls: Vec::new(),
            }),
        }
    }

    /// Every value passed to set_volume so far, in call order
    pub fn set_volume_calls(&self) -> Vec<u8> {
        self.state.lock().unwrap().set_volume_calls.clone()
    }

    /// While set, every call fails with `CommandFailed`
    pub fn set_failing(&self, failing: bool) {
        self.state.lock().unwrap().failing = failing;
    }
}

impl Default for MockVolume {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VolumeControl for MockVolume {
    async fn volume(&self) -> Result<u8, VolumeError> {
        let state = self.state.lock().unwrap();
        state.check()?;
        Ok(state.volume)
    }

    async fn set_volume(&self, volume: u8) -> Result<u8, VolumeError> {
        let mut state = self.state.lock().unwrap();
        state.check()?;
        state.volume = volume;
        state.set_volume_calls.push(volume);
        Ok(volume)
    }

    async fn muted(&self) -> Result<bool, VolumeError> {
        let state = self.state.lock().unwrap();
        state.check()?;
        Ok(state.muted)
    }

    async fn set_muted(&self, muted: bool) -> Result<bool, VolumeError> {
        let mut state = self.state.lock().unwrap();
        state.check()?;
        state.muted = muted;
        Ok(muted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_deterministic_defaults() {
        let mock = MockVolume::new();
        assert_eq!(mock.volume().await.unwrap(), 50);
        assert!(!mock.muted().await.unwrap());
    }

    #[tokio::test]
    async fn test_records_set_volume_calls() {
        let mock = MockVolume::new();
        mock.set_volume(30).await.unwrap();
        mock.set_volume(70).await.unwrap();
        assert_eq!(mock.set_volume_calls(), vec![30, 70]);
        assert_eq!(mock.volume().await.unwrap(), 70);
    }

    #[tokio::test]
    async fn test_failing_mode_errors_without_recording() {
        let mock = MockVolume::new();
        mock.set_failing(true);

        let err = mock.set_volume(30).await.unwrap_err();
        assert!(matches!(err, VolumeError::CommandFailed(_)));
        assert!(mock.set_volume_calls().is_empty());

        mock.set_failing(false);
        assert_eq!(mock.set_volume(30).await.unwrap(), 30);
    }
}
