//! Hotkey module for global shortcut capture
//!
//! Uses macOS CGEventTap to monitor system-wide key-down events and map
//! the reserved keys onto mixer commands, independent of window focus.

mod keys;
mod listener;

pub use keys::{BindingError, Bindings, Key, ParseKeyError};
pub use listener::{HotkeyError, HotkeyListener};
