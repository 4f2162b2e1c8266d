//! Global shortcut listener using macOS CGEventTap
//!
//! Monitors system-wide key-down events regardless of window focus and
//! translates bound keys into mixer commands. Runs on a dedicated thread
//! with its own CFRunLoop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::mixer::Command;

use super::keys::Bindings;

/// Errors that can occur in the hotkey listener
#[derive(Debug, thiserror::Error)]
pub enum HotkeyError {
    #[error("hotkey listener is already running")]
    AlreadyRunning,

    #[error("failed to create event tap - check Accessibility permissions")]
    EventTapCreation,

    #[error("failed to spawn listener thread: {0}")]
    ThreadSpawn(String),

    #[error("global key capture is not supported on this platform")]
    Unsupported,
}

/// Global shortcut listener feeding bound keys into the mixer channel
pub struct HotkeyListener {
    command_tx: mpsc::Sender<Command>,
    bindings: Arc<Bindings>,
    running: Arc<AtomicBool>,
}

impl HotkeyListener {
    pub fn new(command_tx: mpsc::Sender<Command>, bindings: Bindings) -> Self {
        Self {
            command_tx,
            bindings: Arc::new(bindings),
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Start the listener on a dedicated thread.
    ///
    /// The thread runs a CFRunLoop to receive CGEventTap callbacks until
    /// `stop()` is called or the program exits.
    #[cfg(target_os = "macos")]
    pub fn start(&self) -> Result<(), HotkeyError> {
        use tracing::{error, info};

        if self.running.swap(true, Ordering::SeqCst) {
            return Err(HotkeyError::AlreadyRunning);
        }

        let command_tx = self.command_tx.clone();
        let bindings = Arc::clone(&self.bindings);
        let running = Arc::clone(&self.running);

        std::thread::Builder::new()
            .name("hotkey-listener".to_string())
            .spawn(move || {
                info!("hotkey listener thread started");

                if let Err(e) = run_event_loop(command_tx, bindings, running.clone()) {
                    error!(?e, "hotkey listener error");
                }

                running.store(false, Ordering::SeqCst);
                info!("hotkey listener thread stopped");
            })
            .map_err(|e| HotkeyError::ThreadSpawn(e.to_string()))?;

        Ok(())
    }

    #[cfg(not(target_os = "macos"))]
    pub fn start(&self) -> Result<(), HotkeyError> {
        let _ = &self.command_tx;
        let _ = &self.bindings;
        Err(HotkeyError::Unsupported)
    }

    /// Release all global key capture; called once at shutdown. The run
    /// loop notices within its next poll interval and drops the tap.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Check if the listener is currently running
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

/// Run the CFRunLoop with the event tap
#[cfg(target_os = "macos")]
fn run_event_loop(
    command_tx: mpsc::Sender<Command>,
    bindings: Arc<Bindings>,
    running: Arc<AtomicBool>,
) -> Result<(), HotkeyError> {
    use core_foundation::runloop::{kCFRunLoopCommonModes, kCFRunLoopDefaultMode, CFRunLoop};
    use core_graphics::event::{
        CGEvent, CGEventTap, CGEventTapLocation, CGEventTapOptions, CGEventTapPlacement,
        CGEventType, EventField,
    };
    use tracing::{debug, error, info, warn};

    // Channel out of the tap callback; the callback must stay non-blocking
    let (callback_tx, callback_rx) = std::sync::mpsc::channel::<i64>();

    let callback = move |_proxy: core_graphics::event::CGEventTapProxy,
                         event_type: CGEventType,
                         event: &CGEvent|
          -> Option<CGEvent> {
        match event_type {
            CGEventType::KeyDown => {
                let keycode = event.get_integer_value_field(EventField::KEYBOARD_EVENT_KEYCODE);
                let _ = callback_tx.send(keycode);
            }
            CGEventType::TapDisabledByTimeout | CGEventType::TapDisabledByUserInput => {
                warn!("event tap disabled, will re-enable");
            }
            _ => {}
        }
        Some(event.clone())
    };

    let tap = CGEventTap::new(
        CGEventTapLocation::Session,
        CGEventTapPlacement::HeadInsertEventTap,
        CGEventTapOptions::ListenOnly,
        vec![CGEventType::KeyDown],
        callback,
    )
    .map_err(|_| {
        error!("failed to create event tap - is Accessibility permission granted?");
        HotkeyError::EventTapCreation
    })?;

    tap.enable();

    let run_loop_source = tap
        .mach_port
        .create_runloop_source(0)
        .map_err(|_| HotkeyError::EventTapCreation)?;
    let run_loop = CFRunLoop::get_current();

    unsafe {
        run_loop.add_source(&run_loop_source, kCFRunLoopCommonModes);
    }

    info!(bindings = bindings.len(), "event tap created and enabled");

    while running.load(Ordering::SeqCst) {
        // Run the loop for a short interval, then check for new events
        unsafe {
            CFRunLoop::run_in_mode(
                kCFRunLoopDefaultMode,
                std::time::Duration::from_millis(100),
                true,
            );
        }

        while let Ok(keycode) = callback_rx.try_recv() {
            let Some(command) = bindings.lookup(keycode) else {
                continue;
            };

            debug!(keycode, ?command, "global shortcut pressed");

            // Not in an async context here, so send blocking
            if command_tx.blocking_send(command.clone()).is_err() {
                warn!("failed to send shortcut command - channel closed?");
                break;
            }
        }
    }

    // Tap is released when it goes out of scope

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listener_creation() {
        let (tx, _rx) = mpsc::channel(32);
        let listener = HotkeyListener::new(tx, Bindings::new());
        assert!(!listener.is_running());
    }
}
