//! Control surface logic for the terminal panel
//!
//! Rendering-free: the mirror, status banner, and slider gesture logic
//! live here so they can be tested without a terminal. The panel binary
//! only draws what these types report.

mod banner;
mod client;
mod gesture;
mod mirror;

pub use banner::StatusBanner;
pub use client::{connect, ClientReceiver, ClientSender};
pub use gesture::SliderGesture;
pub use mirror::{Mirror, Status, StatusKind};
