//! voldeck-panel: terminal control surface for the voldeck daemon
//!
//! Renders one card per audio source from a mirrored copy of the daemon's
//! table and translates key gestures into intents. Local updates (slider
//! drags, mute button styling) are optimistic; authoritative state only
//! ever arrives as pushed notifications, and a focus regain re-requests
//! the full snapshot to catch drift from shortcuts fired while the panel
//! was backgrounded.

use std::io::{stdout, Write};
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::cursor;
use crossterm::event::{
    DisableFocusChange, EnableFocusChange, Event, EventStream, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers,
};
use crossterm::style::Print;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, Clear, ClearType, EnterAlternateScreen,
    LeaveAlternateScreen,
};
use crossterm::execute;
use futures_util::StreamExt;
use tracing_subscriber::EnvFilter;

use voldeck::config::{Config, DEFAULT_VOLUME, MASTER_SOURCE, SLIDER_STEP};
use voldeck::ipc::Intent;
use voldeck::surface::{
    connect, ClientReceiver, ClientSender, Mirror, SliderGesture, Status, StatusBanner, StatusKind,
};

/// Redraw cadence; also how quickly pulses and the banner visibly expire
const REDRAW_INTERVAL_MS: u64 = 100;

struct Panel {
    mirror: Mirror,
    banner: StatusBanner,
    gesture: Option<SliderGesture>,
    selected: usize,
}

impl Panel {
    fn new() -> Self {
        Self {
            mirror: Mirror::new(),
            banner: StatusBanner::new(),
            gesture: None,
            selected: 0,
        }
    }

    fn selected_id(&self) -> Option<String> {
        self.mirror.sources().keys().nth(self.selected).cloned()
    }

    fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    fn select_next(&mut self) {
        let count = self.mirror.sources().len();
        if count > 0 && self.selected + 1 < count {
            self.selected += 1;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let config = Config::load()?;
    let (mut tx, mut rx) = connect(&config.socket_path).await?;

    // Initial sync
    tx.send(&Intent::GetCurrentVolumes).await?;

    enable_raw_mode()?;
    execute!(
        stdout(),
        EnterAlternateScreen,
        EnableFocusChange,
        cursor::Hide
    )?;

    let result = run_panel(&mut tx, &mut rx).await;

    execute!(
        stdout(),
        cursor::Show,
        DisableFocusChange,
        LeaveAlternateScreen
    )?;
    disable_raw_mode()?;

    result
}

async fn run_panel(tx: &mut ClientSender, rx: &mut ClientReceiver) -> Result<()> {
    let mut panel = Panel::new();
    let mut events = EventStream::new();
    let mut redraw = tokio::time::interval(Duration::from_millis(REDRAW_INTERVAL_MS));

    loop {
        draw(&panel)?;

        tokio::select! {
            _ = redraw.tick() => {}

            notification = rx.next() => {
                match notification? {
                    None => {
                        // Daemon closed the connection
                        break;
                    }
                    Some(notification) => {
                        let now = Instant::now();
                        if let Some(status) = panel.mirror.apply(&notification, now) {
                            panel.banner.show(status, now);
                        }
                    }
                }
            }

            event = events.next() => {
                let Some(event) = event else { break };
                match event? {
                    Event::FocusGained => {
                        tx.send(&Intent::GetCurrentVolumes).await?;
                    }
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        if !handle_key(key, &mut panel, tx).await? {
                            break;
                        }
                    }
                    _ => {}
                }
            }
        }
    }

    Ok(())
}

/// Translate one key press into panel state changes and intents.
/// Returns false when the panel should exit.
async fn handle_key(key: KeyEvent, panel: &mut Panel, tx: &mut ClientSender) -> Result<bool> {
    match key.code {
        KeyCode::Char('q') => return Ok(false),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return Ok(false),

        KeyCode::Up => panel.select_prev(),
        KeyCode::Down => panel.select_next(),

        KeyCode::Left | KeyCode::Right => {
            let delta = if key.code == KeyCode::Left {
                -SLIDER_STEP
            } else {
                SLIDER_STEP
            };
            let Some(id) = panel.selected_id() else {
                return Ok(true);
            };
            let current = panel
                .mirror
                .sources()
                .get(&id)
                .map(|s| s.volume)
                .unwrap_or(DEFAULT_VOLUME);

            // Moving to another card abandons the old gesture
            let mut gesture = match panel.gesture.take() {
                Some(g) if g.source() == id => g,
                _ => SliderGesture::begin(&id, current),
            };
            let shown = gesture.nudge(delta);
            panel.mirror.set_displayed_volume(&id, shown);
            panel.gesture = Some(gesture);
        }

        KeyCode::Enter => {
            // Gesture finalizes: the one intent for the whole drag
            if let Some(gesture) = panel.gesture.take() {
                tx.send(&gesture.commit()).await?;
            }
        }

        KeyCode::Esc => {
            if panel.gesture.take().is_some() {
                // Discard the drag and let the daemon restore the display
                tx.send(&Intent::GetCurrentVolumes).await?;
            }
        }

        KeyCode::Char('m') => {
            if let Some(id) = panel.selected_id() {
                // Optimistic flip of the card styling; the real effect is
                // the global flag
                panel.mirror.toggle_local_mute(&id);
                tx.send(&Intent::ToggleMute { source: id }).await?;
            }
        }

        KeyCode::Char('a') => {
            tx.send(&Intent::ToggleMute {
                source: MASTER_SOURCE.to_string(),
            })
            .await?;
            panel
                .banner
                .show(Status::info("Toggling master mute..."), Instant::now());
        }

        KeyCode::Char('r') => {
            let ids: Vec<String> = panel.mirror.sources().keys().cloned().collect();
            for id in ids {
                tx.send(&Intent::SetVolume {
                    source: id,
                    volume: DEFAULT_VOLUME as i32,
                })
                .await?;
            }
            panel.banner.show(
                Status::info(format!("Resetting all volumes to {DEFAULT_VOLUME}%...")),
                Instant::now(),
            );
        }

        _ => {}
    }

    Ok(true)
}

fn draw(panel: &Panel) -> Result<()> {
    let now = Instant::now();
    let mut frame = String::new();

    frame.push_str("voldeck\r\n");
    frame.push_str(&"-".repeat(62));
    frame.push_str("\r\n");

    if panel.mirror.sources().is_empty() {
        frame.push_str("waiting for daemon snapshot...\r\n");
    }

    for (i, (id, source)) in panel.mirror.sources().iter().enumerate() {
        let marker = if i == panel.selected { '>' } else { ' ' };
        let filled = source.volume as usize / 5;
        let bar = format!("{}{}", "#".repeat(filled), "-".repeat(20 - filled));
        let keys = match (source.key_decrease, source.key_increase) {
            (Some(dec), Some(inc)) => format!("{dec}/{inc}"),
            _ => "not assigned".to_string(),
        };
        let muted = if panel.mirror.is_locally_muted(id) {
            " [muted]"
        } else {
            ""
        };
        let pulse = if panel.mirror.is_pulsing(id, now) {
            " *"
        } else {
            ""
        };

        frame.push_str(&format!(
            "{marker} {:<14} [{bar}] {:>3}%  {keys}{muted}{pulse}\r\n",
            source.name, source.volume
        ));
    }

    frame.push_str(&format!(
        "\r\nmaster: {}\r\n",
        if panel.mirror.muted() {
            "muted"
        } else {
            "unmuted"
        }
    ));

    match panel.banner.current(now) {
        Some(status) => {
            let label = match status.kind {
                StatusKind::Info => "info",
                StatusKind::Success => "ok",
                StatusKind::Error => "error",
            };
            frame.push_str(&format!("\r\n[{label}] {}\r\n", status.text));
        }
        None => frame.push_str("\r\n\r\n"),
    }

    frame.push_str("\r\nup/down select  left/right drag  enter commit  esc cancel\r\n");
    frame.push_str("m mute  a mute all  r reset all  q quit\r\n");

    let mut out = stdout();
    execute!(out, cursor::MoveTo(0, 0), Clear(ClearType::All), Print(frame))?;
    out.flush()?;

    Ok(())
}
