//! Terminal mode switching
//!
//! The terminal's mode is process-wide state. It is captured as a value
//! before any change and handed back to [`RawModeTerminal::restore_mode`],
//! with [`RawModeGuard`] making sure that happens exactly once.

use std::io;
use std::os::fd::AsFd;

use log::{debug, warn};
use nix::sys::termios::{self, SetArg, Termios};

/// A terminal whose input mode can be captured, switched to raw, and restored.
pub trait RawModeTerminal {
    /// Snapshot of the terminal configuration.
    type Mode;

    fn capture_mode(&mut self) -> io::Result<Self::Mode>;

    /// Switches to raw mode, deriving the raw configuration from `original`.
    fn enter_raw_mode(&mut self, original: &Self::Mode) -> io::Result<()>;

    fn restore_mode(&mut self, mode: &Self::Mode) -> io::Result<()>;
}

/// The terminal attached to the process's standard input, driven through termios.
pub struct StdinTerminal {
    stdin: io::Stdin,
}

impl StdinTerminal {
    pub fn new() -> Self {
        Self { stdin: io::stdin() }
    }
}

impl Default for StdinTerminal {
    fn default() -> Self {
        Self::new()
    }
}

impl RawModeTerminal for StdinTerminal {
    type Mode = Termios;

    fn capture_mode(&mut self) -> io::Result<Termios> {
        Ok(termios::tcgetattr(self.stdin.as_fd())?)
    }

    fn enter_raw_mode(&mut self, original: &Termios) -> io::Result<()> {
        let mut raw = original.clone();
        termios::cfmakeraw(&mut raw);
        termios::tcsetattr(self.stdin.as_fd(), SetArg::TCSANOW, &raw)?;
        Ok(())
    }

    fn restore_mode(&mut self, mode: &Termios) -> io::Result<()> {
        termios::tcsetattr(self.stdin.as_fd(), SetArg::TCSANOW, mode)?;
        Ok(())
    }
}

/// Keeps a terminal in raw mode and restores the captured mode when
/// released or dropped, whichever comes first.
pub struct RawModeGuard<'a, T: RawModeTerminal> {
    terminal: &'a mut T,
    original: Option<T::Mode>,
}

impl<'a, T: RawModeTerminal> RawModeGuard<'a, T> {
    /// Switches `terminal` to raw mode. On failure the terminal is left as
    /// it was and nothing will be restored.
    pub fn enter(terminal: &'a mut T, original: T::Mode) -> io::Result<Self> {
        terminal.enter_raw_mode(&original)?;
        debug!("terminal switched to raw mode");
        Ok(Self {
            terminal,
            original: Some(original),
        })
    }

    /// Restores the captured mode now, reporting any failure.
    pub fn release(mut self) -> io::Result<()> {
        self.restore()
    }

    fn restore(&mut self) -> io::Result<()> {
        match self.original.take() {
            Some(mode) => {
                self.terminal.restore_mode(&mode)?;
                debug!("terminal mode restored");
                Ok(())
            }
            None => Ok(()),
        }
    }
}

impl<T: RawModeTerminal> Drop for RawModeGuard<'_, T> {
    fn drop(&mut self) {
        if let Err(e) = self.restore() {
            warn!("failed to restore terminal mode: {}", e);
        }
    }
}
