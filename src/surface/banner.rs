//! Transient status banner state machine
//!
//! hidden -> showing (on any message) -> hidden after the fixed timeout.
//! A new message immediately supersedes the current one and restarts the
//! timer.

use std::time::{Duration, Instant};

use crate::config::STATUS_BANNER_MS;

use super::mirror::Status;

#[derive(Debug, Default)]
pub struct StatusBanner {
    current: Option<(Status, Instant)>,
}

impl StatusBanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show a message, replacing whatever is currently visible
    pub fn show(&mut self, status: Status, now: Instant) {
        self.current = Some((status, now));
    }

    /// The currently visible message, if its timer has not expired
    pub fn current(&self, now: Instant) -> Option<&Status> {
        self.current.as_ref().and_then(|(status, shown_at)| {
            (now.duration_since(*shown_at) < Duration::from_millis(STATUS_BANNER_MS))
                .then_some(status)
        })
    }
}
