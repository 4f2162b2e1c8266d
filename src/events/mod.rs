//! Notifications pushed from the daemon to every connected panel
//!
//! These are fire-and-forget broadcasts, never correlated responses. Panels
//! treat them as the only way authoritative state reaches their mirror.

use serde::{Deserialize, Serialize};

use crate::mixer::SourceTable;

/// Push notifications, daemon -> panel
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Notification {
    /// Full table snapshot (startup sync and focus-regain resync)
    AudioSources { sources: SourceTable },

    /// A single source's volume changed; `fromShortcut` marks changes that
    /// did not originate from direct interaction with that card
    VolumeUpdate {
        source: String,
        volume: u8,
        #[serde(rename = "fromShortcut")]
        from_shortcut: bool,
    },

    /// A panel-requested volume change was accepted
    VolumeUpdated { source: String, volume: u8 },

    /// The global mute flag changed via the mute-all path
    MuteUpdate { muted: bool },

    /// A per-source mute toggle was applied (to the shared global flag)
    MuteToggled { source: String, muted: bool },

    /// Every source was reset; carries the full table
    ResetVolumes { sources: SourceTable },

    /// A non-fatal failure, already logged daemon-side
    Error { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mixer::default_sources;

    #[test]
    fn test_wire_tags_are_kebab_case() {
        let n = Notification::VolumeUpdate {
            source: "music".to_string(),
            volume: 45,
            from_shortcut: true,
        };
        let json = serde_json::to_string(&n).unwrap();
        assert!(json.contains(r#""type":"volume-update""#));
        assert!(json.contains(r#""fromShortcut":true"#));

        let n = Notification::MuteToggled {
            source: "master".to_string(),
            muted: true,
        };
        let json = serde_json::to_string(&n).unwrap();
        assert!(json.contains(r#""type":"mute-toggled""#));
    }

    #[test]
    fn test_snapshot_round_trip() {
        let n = Notification::AudioSources {
            sources: default_sources(),
        };
        let json = serde_json::to_string(&n).unwrap();
        assert!(json.contains(r#""type":"audio-sources""#));

        let back: Notification = serde_json::from_str(&json).unwrap();
        match back {
            Notification::AudioSources { sources } => {
                assert_eq!(sources.len(), 4);
                assert_eq!(sources["browser"].name, "Browser");
            }
            other => panic!("unexpected notification: {other:?}"),
        }
    }

    #[test]
    fn test_error_deserialization() {
        let json = r#"{"type":"error","message":"invalid volume value: 150"}"#;
        let n: Notification = serde_json::from_str(json).unwrap();
        assert!(matches!(n, Notification::Error { .. }));
    }
}
