//! The state authority over volumes and mute
//!
//! `Mixer` is the exclusive mutator of the source table. It consumes
//! `Command`s from one mpsc channel (IPC intents and global shortcuts both
//! end up here) and fans accepted changes out on a broadcast channel.
//! Last write wins; there is no sequencing between racing shortcut and
//! panel intents.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tracing::{info, warn};

use crate::config::DEFAULT_VOLUME;
use crate::events::Notification;
use crate::volume::VolumeControl;

use super::error::MixerError;
use super::sources::{clamp_volume, SourceTable};

/// Unified mixer input, fed by the IPC server and the hotkey listener
#[derive(Debug, Clone)]
pub enum Command {
    /// Panel slider commit
    SetVolume { source: String, volume: i32 },
    /// Global shortcut step (shortcut-only entry point)
    AdjustVolume { source: String, delta: i32 },
    /// Per-source mute button (aliases the global mute flag)
    ToggleMute { source: String },
    /// Mute-all shortcut
    ToggleMuteAll,
    /// Reset-all shortcut
    ResetAll,
    /// Full table snapshot request
    Snapshot,
}

/// Single source of truth for the source table and the global mute flag
pub struct Mixer {
    sources: SourceTable,
    /// Local view of the backend's global mute flag
    muted: bool,
    backend: Arc<dyn VolumeControl>,
    notify_tx: broadcast::Sender<Notification>,
}

impl Mixer {
    pub fn new(
        sources: SourceTable,
        backend: Arc<dyn VolumeControl>,
        notify_tx: broadcast::Sender<Notification>,
    ) -> Self {
        Self {
            sources,
            muted: false,
            backend,
            notify_tx,
        }
    }

    /// Read-only view of the table
    pub fn sources(&self) -> &SourceTable {
        &self.sources
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Process commands until the channel closes
    pub async fn run(&mut self, mut command_rx: mpsc::Receiver<Command>) {
        info!(sources = self.sources.len(), "mixer started");

        while let Some(command) = command_rx.recv().await {
            self.dispatch(command).await;
        }

        info!("mixer stopped");
    }

    /// Execute one command; failures are logged and broadcast, never fatal
    pub(crate) async fn dispatch(&mut self, command: Command) {
        let result = match command {
            Command::SetVolume { source, volume } => self.set_volume(&source, volume).await,
            Command::AdjustVolume { source, delta } => self.adjust_volume(&source, delta).await,
            Command::ToggleMute { source } => self.toggle_mute(&source).await,
            Command::ToggleMuteAll => self.toggle_mute_all().await,
            Command::ResetAll => self.reset_all().await,
            Command::Snapshot => {
                self.broadcast_snapshot();
                Ok(())
            }
        };

        if let Err(e) = result {
            warn!(error = %e, "command failed");
            self.notify(Notification::Error {
                message: e.to_string(),
            });
        }
    }

    /// Set one source to an absolute volume (panel path)
    pub async fn set_volume(&mut self, source: &str, volume: i32) -> Result<(), MixerError> {
        if !self.sources.contains_key(source) {
            return Err(MixerError::UnknownSource(source.to_string()));
        }
        if !(0..=100).contains(&volume) {
            return Err(MixerError::InvalidVolume(volume));
        }

        self.apply_volume(source, volume as u8, false).await
    }

    /// Step one source's volume by a signed delta, clamped (shortcut path)
    pub async fn adjust_volume(&mut self, source: &str, delta: i32) -> Result<(), MixerError> {
        let current = self
            .sources
            .get(source)
            .ok_or_else(|| MixerError::UnknownSource(source.to_string()))?
            .volume;
        let volume = clamp_volume(current as i32 + delta);

        self.apply_volume(source, volume, true).await
    }

    async fn apply_volume(
        &mut self,
        source: &str,
        volume: u8,
        from_shortcut: bool,
    ) -> Result<(), MixerError> {
        let entry = self
            .sources
            .get_mut(source)
            .ok_or_else(|| MixerError::UnknownSource(source.to_string()))?;
        entry.volume = volume;
        let name = entry.name.clone();

        // Table first, backend second: a backend failure is reported but the
        // accepted value stays in the table
        self.backend.set_volume(volume).await?;

        if from_shortcut {
            info!(source, name = %name, volume, "volume adjusted via shortcut");
            self.notify(Notification::VolumeUpdate {
                source: source.to_string(),
                volume,
                from_shortcut: true,
            });
        } else {
            info!(source, name = %name, volume, "volume set");
            self.notify(Notification::VolumeUpdated {
                source: source.to_string(),
                volume,
            });
        }

        Ok(())
    }

    /// Flip the global mute flag on behalf of one source's mute button.
    ///
    /// The source id is carried through to the notification but not
    /// validated: there is no per-source mute state, and the panel's
    /// mute-all button reports the reserved id `master` here.
    pub async fn toggle_mute(&mut self, source: &str) -> Result<(), MixerError> {
        let muted = !self.backend.muted().await?;
        self.backend.set_muted(muted).await?;
        self.muted = muted;

        info!(source, muted, "mute toggled");
        self.notify(Notification::MuteToggled {
            source: source.to_string(),
            muted,
        });

        Ok(())
    }

    /// Flip the global mute flag (mute-all shortcut path)
    pub async fn toggle_mute_all(&mut self) -> Result<(), MixerError> {
        let muted = !self.backend.muted().await?;
        self.backend.set_muted(muted).await?;
        self.muted = muted;

        info!(muted, "global mute toggled");
        self.notify(Notification::MuteUpdate { muted });

        Ok(())
    }

    /// Reset every source to the default volume with one backend call
    pub async fn reset_all(&mut self) -> Result<(), MixerError> {
        for source in self.sources.values_mut() {
            source.volume = DEFAULT_VOLUME;
        }
        self.backend.set_volume(DEFAULT_VOLUME).await?;

        info!(volume = DEFAULT_VOLUME, "all volumes reset");
        self.notify(Notification::ResetVolumes {
            sources: self.sources.clone(),
        });

        Ok(())
    }

    /// Push the full table to every connected panel
    pub fn broadcast_snapshot(&self) {
        self.notify(Notification::AudioSources {
            sources: self.sources.clone(),
        });
    }

    fn notify(&self, notification: Notification) {
        // Send only fails when no panel is connected
        let _ = self.notify_tx.send(notification);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mixer::default_sources;
    use crate::volume::MockVolume;

    fn mixer_with_mock() -> (Mixer, Arc<MockVolume>, broadcast::Receiver<Notification>) {
        let backend = Arc::new(MockVolume::new());
        let (notify_tx, notify_rx) = broadcast::channel(16);
        let mixer = Mixer::new(default_sources(), backend.clone(), notify_tx);
        (mixer, backend, notify_rx)
    }

    #[tokio::test]
    async fn test_set_volume_updates_only_target_source() {
        let (mut mixer, _, _rx) = mixer_with_mock();

        mixer.set_volume("music", 80).await.unwrap();

        assert_eq!(mixer.sources()["music"].volume, 80);
        assert_eq!(mixer.sources()["browser"].volume, 50);
        assert_eq!(mixer.sources()["system"].volume, 50);
        assert_eq!(mixer.sources()["game"].volume, 50);
    }

    #[tokio::test]
    async fn test_out_of_range_volume_rejected_table_unchanged() {
        let (mut mixer, backend, _rx) = mixer_with_mock();

        for volume in [-5, -1, 101, 150] {
            let err = mixer.set_volume("music", volume).await.unwrap_err();
            assert!(matches!(err, MixerError::InvalidVolume(v) if v == volume));
        }

        assert_eq!(mixer.sources()["music"].volume, 50);
        assert!(backend.set_volume_calls().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_source_rejected() {
        let (mut mixer, _, _rx) = mixer_with_mock();

        let err = mixer.set_volume("nonexistent", 10).await.unwrap_err();
        assert!(matches!(err, MixerError::UnknownSource(_)));
    }

    #[tokio::test]
    async fn test_adjust_volume_clamps_at_both_rails() {
        let (mut mixer, _, _rx) = mixer_with_mock();

        mixer.set_volume("music", 98).await.unwrap();
        mixer.adjust_volume("music", 5).await.unwrap();
        assert_eq!(mixer.sources()["music"].volume, 100);

        mixer.set_volume("music", 2).await.unwrap();
        mixer.adjust_volume("music", -5).await.unwrap();
        assert_eq!(mixer.sources()["music"].volume, 0);

        mixer.adjust_volume("music", -5).await.unwrap();
        assert_eq!(mixer.sources()["music"].volume, 0);
    }

    #[tokio::test]
    async fn test_reset_all_is_one_backend_call() {
        let (mut mixer, backend, _rx) = mixer_with_mock();

        mixer.set_volume("music", 80).await.unwrap();
        mixer.set_volume("game", 20).await.unwrap();

        let calls_before = backend.set_volume_calls().len();
        mixer.reset_all().await.unwrap();

        assert!(mixer.sources().values().all(|s| s.volume == 50));
        let calls = backend.set_volume_calls();
        assert_eq!(calls.len(), calls_before + 1);
        assert_eq!(*calls.last().unwrap(), 50);
    }

    #[tokio::test]
    async fn test_double_mute_toggle_restores_flag() {
        let (mut mixer, backend, _rx) = mixer_with_mock();

        mixer.toggle_mute_all().await.unwrap();
        assert!(mixer.is_muted());
        assert!(backend.muted().await.unwrap());

        mixer.toggle_mute_all().await.unwrap();
        assert!(!mixer.is_muted());
        assert!(!backend.muted().await.unwrap());
    }

    #[tokio::test]
    async fn test_shortcut_adjust_broadcasts_tagged_update() {
        let (mut mixer, _, mut rx) = mixer_with_mock();

        mixer.adjust_volume("music", -5).await.unwrap();

        match rx.try_recv().unwrap() {
            Notification::VolumeUpdate {
                source,
                volume,
                from_shortcut,
            } => {
                assert_eq!(source, "music");
                assert_eq!(volume, 45);
                assert!(from_shortcut);
            }
            other => panic!("unexpected notification: {other:?}"),
        }

        assert_eq!(mixer.sources()["browser"].volume, 50);
        assert_eq!(mixer.sources()["system"].volume, 50);
        assert_eq!(mixer.sources()["game"].volume, 50);
    }

    #[tokio::test]
    async fn test_invalid_set_emits_error_and_nothing_else() {
        let (mut mixer, _, mut rx) = mixer_with_mock();

        mixer
            .dispatch(Command::SetVolume {
                source: "browser".to_string(),
                volume: 150,
            })
            .await;

        match rx.try_recv().unwrap() {
            Notification::Error { message } => {
                assert!(message.contains("invalid volume value: 150"));
            }
            other => panic!("unexpected notification: {other:?}"),
        }
        assert!(rx.try_recv().is_err());
        assert_eq!(mixer.sources()["browser"].volume, 50);
    }

    #[tokio::test]
    async fn test_backend_failure_keeps_accepted_value_and_reports_error() {
        let (mut mixer, backend, mut rx) = mixer_with_mock();
        backend.set_failing(true);

        mixer
            .dispatch(Command::SetVolume {
                source: "music".to_string(),
                volume: 30,
            })
            .await;

        // Table first, backend second: the accepted value stays
        assert_eq!(mixer.sources()["music"].volume, 30);
        match rx.try_recv().unwrap() {
            Notification::Error { message } => {
                assert!(message.contains("volume command failed"));
            }
            other => panic!("unexpected notification: {other:?}"),
        }
        assert!(rx.try_recv().is_err());

        // The mixer keeps serving once the backend recovers
        backend.set_failing(false);
        mixer
            .dispatch(Command::SetVolume {
                source: "music".to_string(),
                volume: 40,
            })
            .await;

        assert_eq!(mixer.sources()["music"].volume, 40);
        match rx.try_recv().unwrap() {
            Notification::VolumeUpdated { source, volume } => {
                assert_eq!(source, "music");
                assert_eq!(volume, 40);
            }
            other => panic!("unexpected notification: {other:?}"),
        }
        assert_eq!(backend.set_volume_calls(), vec![40]);
    }

    #[tokio::test]
    async fn test_per_source_mute_aliases_global_flag() {
        let (mut mixer, backend, mut rx) = mixer_with_mock();

        mixer.toggle_mute("music").await.unwrap();

        match rx.try_recv().unwrap() {
            Notification::MuteToggled { source, muted } => {
                assert_eq!(source, "music");
                assert!(muted);
            }
            other => panic!("unexpected notification: {other:?}"),
        }
        // The flip landed on the one global flag, not on the source
        assert!(backend.muted().await.unwrap());

        // The reserved master id is accepted without validation
        mixer.toggle_mute("master").await.unwrap();
        assert!(!backend.muted().await.unwrap());
    }

    #[tokio::test]
    async fn test_snapshot_command_broadcasts_full_table() {
        let (mut mixer, _, mut rx) = mixer_with_mock();

        mixer.dispatch(Command::Snapshot).await;

        match rx.try_recv().unwrap() {
            Notification::AudioSources { sources } => {
                assert_eq!(sources.len(), 4);
            }
            other => panic!("unexpected notification: {other:?}"),
        }
    }
}
