//! System volume backend abstraction
//!
//! The daemon talks to exactly one master volume through the four-method
//! `VolumeControl` contract. When the real system backend is unavailable the
//! daemon degrades to the in-memory mock instead of failing.

mod backend;
mod mock;
mod system;

pub use backend::{VolumeControl, VolumeError};
pub use mock::MockVolume;
pub use system::SystemVolume;
