//! voldeck: per-source volume control for a single master output
//!
//! The crate builds two binaries from this library:
//! - `voldeckd`: privileged daemon owning the source table, the global key
//!   capture, and the only connection to the system volume API
//! - `voldeck-panel`: terminal panel mirroring the table over IPC
//!
//! Every logical source (music, browser, system sounds, games) maps onto the
//! one master volume; the daemon is the single writer, panels are read-only
//! mirrors kept in sync by push notifications.

pub mod config;
pub mod events;
pub mod hotkey;
pub mod ipc;
pub mod lifecycle;
pub mod mixer;
pub mod surface;
pub mod volume;
