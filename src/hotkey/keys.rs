//! Shortcut key definitions and the key -> command binding table
//!
//! Ten keys are reserved: F13-F20 step the four sources up and down,
//! F21 toggles mute-all and F22 resets every volume. macOS produces no
//! keycode for F21/F22, so the two global actions are rebindable through
//! `VOLDECK_MUTE_ALL_KEY` / `VOLDECK_RESET_ALL_KEY`; an action key takes
//! precedence over a source key bound to the same key.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::SHORTCUT_STEP;
use crate::mixer::{Command, SourceTable};

/// Keys usable as global shortcuts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Key {
    F13,
    F14,
    F15,
    F16,
    F17,
    F18,
    F19,
    F20,
    F21,
    F22,
}

impl Key {
    /// macOS virtual keycode for this key.
    ///
    /// F21 and up have no hardware keycode on macOS; their bindings stay
    /// inactive with a logged warning.
    pub fn keycode(self) -> Option<u16> {
        match self {
            Key::F13 => Some(105),
            Key::F14 => Some(107),
            Key::F15 => Some(113),
            Key::F16 => Some(106),
            Key::F17 => Some(64),
            Key::F18 => Some(79),
            Key::F19 => Some(80),
            Key::F20 => Some(90),
            Key::F21 | Key::F22 => None,
        }
    }

    /// Reverse mapping from a raw event keycode
    pub fn from_keycode(code: i64) -> Option<Self> {
        match code {
            105 => Some(Key::F13),
            107 => Some(Key::F14),
            113 => Some(Key::F15),
            106 => Some(Key::F16),
            64 => Some(Key::F17),
            79 => Some(Key::F18),
            80 => Some(Key::F19),
            90 => Some(Key::F20),
            _ => None,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Key name from config did not match a reserved key
#[derive(Debug, thiserror::Error)]
#[error("unrecognized key name: {0} (expected F13-F22)")]
pub struct ParseKeyError(String);

impl FromStr for Key {
    type Err = ParseKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "F13" => Ok(Key::F13),
            "F14" => Ok(Key::F14),
            "F15" => Ok(Key::F15),
            "F16" => Ok(Key::F16),
            "F17" => Ok(Key::F17),
            "F18" => Ok(Key::F18),
            "F19" => Ok(Key::F19),
            "F20" => Ok(Key::F20),
            "F21" => Ok(Key::F21),
            "F22" => Ok(Key::F22),
            _ => Err(ParseKeyError(s.to_string())),
        }
    }
}

/// Per-binding registration failures; best-effort, never fatal
#[derive(Debug, thiserror::Error)]
pub enum BindingError {
    #[error("key {0} is already bound")]
    Duplicate(Key),

    #[error("key {0} has no keycode on this platform")]
    NoKeycode(Key),
}

/// Key -> command table consulted by the event tap
#[derive(Debug, Default)]
pub struct Bindings {
    map: HashMap<Key, Command>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a key to a command. Fails on a duplicate key or a key this
    /// platform cannot produce; neither failure affects other bindings.
    pub fn register(&mut self, key: Key, command: Command) -> Result<(), BindingError> {
        if self.map.contains_key(&key) {
            return Err(BindingError::Duplicate(key));
        }
        if key.keycode().is_none() {
            return Err(BindingError::NoKeycode(key));
        }
        self.map.insert(key, command);
        Ok(())
    }

    /// Build the full binding table for a source table plus the two
    /// global actions on their configured keys. Actions register first
    /// and win over a source key bound to the same key; failed
    /// registrations are logged and skipped.
    pub fn for_sources(sources: &SourceTable, mute_all: Key, reset_all: Key) -> Self {
        let mut bindings = Self::new();

        bindings.try_register(mute_all, Command::ToggleMuteAll);
        bindings.try_register(reset_all, Command::ResetAll);

        for (id, source) in sources {
            if let Some(key) = source.key_decrease {
                bindings.try_register(
                    key,
                    Command::AdjustVolume {
                        source: id.clone(),
                        delta: -SHORTCUT_STEP,
                    },
                );
            }
            if let Some(key) = source.key_increase {
                bindings.try_register(
                    key,
                    Command::AdjustVolume {
                        source: id.clone(),
                        delta: SHORTCUT_STEP,
                    },
                );
            }
        }

        bindings
    }

    fn try_register(&mut self, key: Key, command: Command) {
        if let Err(e) = self.register(key, command) {
            warn!(error = %e, "shortcut registration failed, skipping binding");
        }
    }

    /// Command bound to a raw event keycode, if any
    pub fn lookup(&self, keycode: i64) -> Option<&Command> {
        Key::from_keycode(keycode).and_then(|key| self.map.get(&key))
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mixer::default_sources;

    #[test]
    fn test_default_table_registers_eight_source_keys() {
        // F21/F22 have no keycode, so only the per-source keys are active
        let bindings = Bindings::for_sources(&default_sources(), Key::F21, Key::F22);
        assert_eq!(bindings.len(), 8);
    }

    #[test]
    fn test_lookup_maps_keycode_to_step_command() {
        let bindings = Bindings::for_sources(&default_sources(), Key::F21, Key::F22);

        // F13 raises the music source
        match bindings.lookup(105) {
            Some(Command::AdjustVolume { source, delta }) => {
                assert_eq!(source, "music");
                assert_eq!(*delta, SHORTCUT_STEP);
            }
            other => panic!("unexpected binding: {other:?}"),
        }

        // F14 lowers it
        match bindings.lookup(107) {
            Some(Command::AdjustVolume { source, delta }) => {
                assert_eq!(source, "music");
                assert_eq!(*delta, -SHORTCUT_STEP);
            }
            other => panic!("unexpected binding: {other:?}"),
        }

        assert!(bindings.lookup(1).is_none());
    }

    #[test]
    fn test_duplicate_binding_rejected() {
        let mut bindings = Bindings::new();
        bindings.register(Key::F13, Command::ToggleMuteAll).unwrap();

        let err = bindings
            .register(Key::F13, Command::ResetAll)
            .unwrap_err();
        assert!(matches!(err, BindingError::Duplicate(Key::F13)));

        // The original binding survives
        assert!(matches!(
            bindings.lookup(105),
            Some(Command::ToggleMuteAll)
        ));
    }

    #[test]
    fn test_unmappable_key_rejected_without_side_effects() {
        let mut bindings = Bindings::new();
        let err = bindings
            .register(Key::F21, Command::ToggleMuteAll)
            .unwrap_err();
        assert!(matches!(err, BindingError::NoKeycode(Key::F21)));
        assert!(bindings.is_empty());
    }

    #[test]
    fn test_rebound_action_keys_are_active_and_win_conflicts() {
        // Mute-all on F19 and reset-all on F20 displace the game source's
        // step bindings and become reachable from real keycodes
        let bindings = Bindings::for_sources(&default_sources(), Key::F19, Key::F20);

        assert!(matches!(bindings.lookup(80), Some(Command::ToggleMuteAll)));
        assert!(matches!(bindings.lookup(90), Some(Command::ResetAll)));
        assert_eq!(bindings.len(), 8);

        // The other sources keep their step bindings
        match bindings.lookup(113) {
            Some(Command::AdjustVolume { source, delta }) => {
                assert_eq!(source, "browser");
                assert_eq!(*delta, SHORTCUT_STEP);
            }
            other => panic!("unexpected binding: {other:?}"),
        }
    }

    #[test]
    fn test_key_parses_from_config_names() {
        assert_eq!("F19".parse::<Key>().unwrap(), Key::F19);
        assert_eq!(" f21 ".parse::<Key>().unwrap(), Key::F21);
        assert!("F12".parse::<Key>().is_err());
        assert!("mute".parse::<Key>().is_err());
    }

    #[test]
    fn test_key_keycode_round_trip() {
        for key in [
            Key::F13,
            Key::F14,
            Key::F15,
            Key::F16,
            Key::F17,
            Key::F18,
            Key::F19,
            Key::F20,
        ] {
            let code = key.keycode().unwrap();
            assert_eq!(Key::from_keycode(code as i64), Some(key));
        }
    }
}
