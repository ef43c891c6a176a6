//! Masked line reading
//!
//! The terminal is put into raw mode so that nothing the user types is
//! echoed by the terminal itself. Each accepted character is answered with
//! a mask glyph instead, so the user still sees how much has been typed.

use std::io::{self, Write};

use log::{debug, warn};
use zeroize::Zeroizing;

use crate::error::{ErrorCategory, ErrorKind, PromptError, Result};
use crate::keys::{self, InterruptPolicy, KeyClass};
use crate::source::{CharSource, Utf8CharSource};
use crate::terminal::{RawModeGuard, RawModeTerminal, StdinTerminal};

/// Clears the current line and returns the cursor to column 0.
pub const CLEAR_LINE: &str = "\x1b[2K\x1b[0G\r";

/// Moves back over one glyph, blanks it, and moves back again.
const ERASE_GLYPH: &str = "\x08 \x08";

/// How a prompt gives feedback and reacts to Ctrl+C.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptOptions {
    /// Glyph echoed per typed character. `None` gives no feedback at all.
    pub mask: Option<char>,
    pub interrupt: InterruptPolicy,
}

impl PromptOptions {
    pub fn masked(mask: char) -> Self {
        Self {
            mask: Some(mask),
            interrupt: InterruptPolicy::default(),
        }
    }

    pub fn unmasked() -> Self {
        Self {
            mask: None,
            interrupt: InterruptPolicy::default(),
        }
    }

    pub fn with_interrupt_policy(mut self, interrupt: InterruptPolicy) -> Self {
        self.interrupt = interrupt;
        self
    }
}

impl Default for PromptOptions {
    fn default() -> Self {
        Self::masked('*')
    }
}

/// Prompts on stdout and reads a line from the terminal on stdin, echoing
/// `mask` for every character typed.
///
/// Ctrl+C cancels the prompt with a [`ErrorKind::UserInterrupted`] error.
/// The terminal mode in effect before the call is restored before this
/// returns, whatever the outcome.
pub fn read_masked_line(prompt: &str, mask: char) -> Result<Zeroizing<String>> {
    let stdin = io::stdin();
    let mut source = Utf8CharSource::new(stdin.lock());
    read_masked_line_with(
        &mut StdinTerminal::new(),
        &mut source,
        &mut io::stdout().lock(),
        prompt,
        &PromptOptions::masked(mask),
    )
}

/// Same as [`read_masked_line`], with every terminal capability supplied by
/// the caller.
pub fn read_masked_line_with<T, S, W>(
    terminal: &mut T,
    source: &mut S,
    output: &mut W,
    prompt: &str,
    options: &PromptOptions,
) -> Result<Zeroizing<String>>
where
    T: RawModeTerminal,
    S: CharSource + ?Sized,
    W: Write + ?Sized,
{
    emit(output, prompt)?;

    let original = terminal.capture_mode().map_err(|e| {
        PromptError::with_kind_and_source(
            ErrorCategory::Internal,
            ErrorKind::TerminalState,
            format!("cannot read terminal state: {}", e),
            e,
        )
    })?;
    let guard = RawModeGuard::enter(terminal, original).map_err(|e| {
        PromptError::with_kind_and_source(
            ErrorCategory::Internal,
            ErrorKind::TerminalMode,
            format!("cannot switch terminal to raw mode: {}", e),
            e,
        )
    })?;

    let line = read_line(source, output, options);

    // Every exit leaves a clean line behind, whether or not input completed.
    let cleared = emit(output, "\n").and_then(|()| emit(output, CLEAR_LINE));

    if let Err(e) = guard.release() {
        warn!("failed to restore terminal mode: {}", e);
    }

    let line = line?;
    cleared?;
    Ok(line)
}

fn read_line<S, W>(
    source: &mut S,
    output: &mut W,
    options: &PromptOptions,
) -> Result<Zeroizing<String>>
where
    S: CharSource + ?Sized,
    W: Write + ?Sized,
{
    let mut line = Zeroizing::new(String::with_capacity(64));
    let mask = options.mask.map(String::from);

    loop {
        let ch = match source.next_char() {
            Ok(Some(ch)) => ch,
            Ok(None) => return Err(read_failed(io::Error::from(io::ErrorKind::UnexpectedEof))),
            Err(e) => return Err(read_failed(e)),
        };

        match keys::classify(ch, options.interrupt) {
            KeyClass::Terminator => return Ok(line),
            KeyClass::Interrupt => {
                debug!("prompt interrupted by user");
                return Err(PromptError::interrupted());
            }
            KeyClass::Backspace => {
                if line.pop().is_some() && mask.is_some() {
                    emit(output, ERASE_GLYPH)?;
                }
            }
            KeyClass::Ordinary => {
                push_secret(&mut line, ch);
                if let Some(mask) = &mask {
                    emit(output, mask)?;
                }
            }
        }
    }
}

/// Appends `ch` to a secret buffer. When the buffer is full the contents
/// move to a larger zeroizing buffer so the outgrown allocation is wiped
/// rather than released by `String`'s own reallocation.
pub(crate) fn push_secret(line: &mut Zeroizing<String>, ch: char) {
    let needed = line.len() + ch.len_utf8();
    if needed > line.capacity() {
        let capacity = (line.capacity() * 2).max(needed).max(64);
        let mut grown = Zeroizing::new(String::with_capacity(capacity));
        grown.push_str(line.as_str());
        *line = grown;
    }
    line.push(ch);
}

fn read_failed(e: io::Error) -> PromptError {
    PromptError::with_kind_and_source(
        ErrorCategory::Internal,
        ErrorKind::InputRead,
        format!("error reading input: {}", e),
        e,
    )
}

/// Writes and flushes immediately; raw mode gives no line buffering to rely on.
fn emit<W: Write + ?Sized>(output: &mut W, text: &str) -> Result<()> {
    output
        .write_all(text.as_bytes())
        .and_then(|()| output.flush())
        .map_err(PromptError::write_failed)
}
