//! IPC module for daemon-panel communication

mod protocol;
mod server;

pub use protocol::{read_frame, write_frame, Intent, MAX_FRAME_LEN};
pub use server::Server;
