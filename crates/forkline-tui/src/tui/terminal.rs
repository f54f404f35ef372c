//! Terminal mode bookkeeping for the viewer.
//!
//! Every mode the viewer switches on is recorded in one bit set, and cleanup
//! only undoes the bits it can clear. That keeps the normal exit, the panic
//! hook and a failed setup from fighting over the same terminal.

use ratatui::crossterm::{
    event::{DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture},
    execute,
    terminal::{
        EnterAlternateScreen, LeaveAlternateScreen, SetTitle, disable_raw_mode, enable_raw_mode,
    },
};
use std::io::{self, Write};
use std::sync::atomic::{AtomicU8, Ordering};
use strum::Display;
use tracing::debug;

const TITLE: &str = "forkline";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Mode {
    Raw,
    AlternateScreen,
    /// Pastes go into the edit draft
    BracketedPaste,
    /// Wheel scrolling, minimap clicks and marker hover
    MouseCapture,
}

/// Enabled in this order, disabled in reverse
const MODES: [Mode; 4] = [
    Mode::Raw,
    Mode::AlternateScreen,
    Mode::BracketedPaste,
    Mode::MouseCapture,
];

static ENABLED: AtomicU8 = AtomicU8::new(0);

impl Mode {
    const fn bit(self) -> u8 {
        1 << self as u8
    }

    fn enable<W: Write>(self, w: &mut W) -> io::Result<()> {
        match self {
            Mode::Raw => enable_raw_mode(),
            Mode::AlternateScreen => execute!(w, EnterAlternateScreen, SetTitle(TITLE)),
            Mode::BracketedPaste => execute!(w, EnableBracketedPaste),
            Mode::MouseCapture => execute!(w, EnableMouseCapture),
        }
    }

    fn disable<W: Write>(self, w: &mut W) -> io::Result<()> {
        match self {
            Mode::Raw => disable_raw_mode(),
            Mode::AlternateScreen => execute!(w, LeaveAlternateScreen),
            Mode::BracketedPaste => execute!(w, DisableBracketedPaste),
            Mode::MouseCapture => execute!(w, DisableMouseCapture),
        }
    }

    fn mark_enabled(self) {
        ENABLED.fetch_or(self.bit(), Ordering::SeqCst);
    }

    /// Clears the bit; true if this call was the one to clear it
    fn take(self) -> bool {
        ENABLED.fetch_and(!self.bit(), Ordering::SeqCst) & self.bit() != 0
    }

    pub fn is_enabled(self) -> bool {
        ENABLED.load(Ordering::SeqCst) & self.bit() != 0
    }
}

/// Switch the terminal into viewer mode. A mode is recorded only once its
/// escape sequence went out, so a partial setup is still undone exactly.
pub fn setup<W: Write>(w: &mut W) -> io::Result<()> {
    for mode in MODES {
        mode.enable(w)?;
        mode.mark_enabled();
        debug!(target: "tui.terminal", %mode, "Enabled terminal mode");
    }
    Ok(())
}

/// Undo whatever `setup` managed to enable, writing to `writer`
pub fn cleanup_with_writer<W: Write>(writer: &mut W) {
    for mode in MODES.into_iter().rev() {
        if !mode.take() {
            continue;
        }
        if let Err(e) = mode.disable(writer) {
            debug!(target: "tui.terminal", %mode, error = %e, "Failed to restore terminal mode");
        }
    }
    let _ = writer.flush();
}

/// Best-effort cleanup on stdout, falling back to the controlling tty
pub fn cleanup() {
    cleanup_with_writer(&mut io::stdout());

    #[cfg(not(windows))]
    if let Ok(mut tty) = std::fs::OpenOptions::new().write(true).open("/dev/tty") {
        cleanup_with_writer(&mut tty);
    }
}

/// Restores the terminal if `Tui::new` bails out before the viewer takes over
pub struct SetupGuard {
    armed: bool,
}

impl Default for SetupGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl SetupGuard {
    pub fn new() -> Self {
        Self { armed: true }
    }

    pub fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for SetupGuard {
    fn drop(&mut self) {
        if self.armed {
            cleanup();
        }
    }
}
