//! Passphrase reading functionality

use crate::error::{ErrorCategory, ErrorKind, PromptError, Result};
use crate::prompt::{self, PromptOptions, push_secret};
use crate::source::{CharSource, Utf8CharSource};
use crate::terminal::StdinTerminal;
use log::debug;
use std::io::{self, IsTerminal, Read, Write};
use zeroize::Zeroizing;

/// Trait for reading passphrases from various sources
pub trait PassphraseReader {
    /// Read a passphrase.
    ///
    /// Returns the passphrase wrapped in `Zeroizing` to ensure it is securely
    /// wiped from memory when dropped.
    fn read_passphrase(&mut self) -> Result<Zeroizing<String>>;
}

/// Returns a fixed passphrase (for testing)
pub struct ConstantPassphraseReader {
    passphrase: Zeroizing<String>,
}

impl ConstantPassphraseReader {
    pub fn new(passphrase: impl Into<String>) -> Self {
        Self {
            passphrase: Zeroizing::new(passphrase.into()),
        }
    }
}

impl PassphraseReader for ConstantPassphraseReader {
    fn read_passphrase(&mut self) -> Result<Zeroizing<String>> {
        Ok(self.passphrase.clone())
    }
}

/// Reads the first line from any io::Read source
///
/// The line terminator (`\n` or `\r\n`) is not part of the passphrase. A
/// final line without a terminator is accepted; an empty stream is an error.
pub struct ReaderPassphraseReader {
    source: Utf8CharSource<Box<dyn Read>>,
}

impl ReaderPassphraseReader {
    pub fn new(reader: Box<dyn Read>) -> Self {
        Self {
            source: Utf8CharSource::new(reader),
        }
    }
}

impl PassphraseReader for ReaderPassphraseReader {
    fn read_passphrase(&mut self) -> Result<Zeroizing<String>> {
        let mut line = Zeroizing::new(String::new());
        let mut saw_input = false;
        loop {
            let next = self.source.next_char().map_err(|e| {
                PromptError::with_kind_and_source(
                    ErrorCategory::Internal,
                    ErrorKind::InputRead,
                    format!("error reading passphrase: {}", e),
                    e,
                )
            })?;
            match next {
                Some('\n') => break,
                Some(ch) => {
                    saw_input = true;
                    push_secret(&mut line, ch);
                }
                None if saw_input => break,
                None => {
                    return Err(PromptError::with_kind(
                        ErrorCategory::Internal,
                        ErrorKind::InputRead,
                        "error reading passphrase: input is empty",
                    ));
                }
            }
        }
        if line.ends_with('\r') {
            line.pop();
        }
        Ok(line)
    }
}

/// Stream that receives the prompt, mask glyphs and clearing sequences
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PromptOutput {
    #[default]
    Stdout,
    /// Keeps stdout free for the secret itself, e.g. in `$(...)` captures.
    Stderr,
}

/// Reads passphrase from the terminal, echoing a mask glyph per keystroke
pub struct MaskedTerminalPassphraseReader {
    prompt: String,
    options: PromptOptions,
    output: PromptOutput,
}

impl MaskedTerminalPassphraseReader {
    pub fn new(prompt: impl Into<String>, options: PromptOptions) -> Self {
        Self {
            prompt: prompt.into(),
            options,
            output: PromptOutput::default(),
        }
    }

    pub fn with_output(mut self, output: PromptOutput) -> Self {
        self.output = output;
        self
    }

    pub fn options(&self) -> &PromptOptions {
        &self.options
    }

    pub fn output(&self) -> PromptOutput {
        self.output
    }
}

impl Default for MaskedTerminalPassphraseReader {
    fn default() -> Self {
        Self::new("Password: ", PromptOptions::default())
    }
}

impl PassphraseReader for MaskedTerminalPassphraseReader {
    fn read_passphrase(&mut self) -> Result<Zeroizing<String>> {
        if !io::stdin().is_terminal() {
            return Err(PromptError::with_kind(
                ErrorCategory::User,
                ErrorKind::PassphraseUnavailable,
                "cannot read passphrase from terminal - stdin is not a terminal",
            ));
        }

        debug!("prompting for passphrase on terminal ({:?})", self.output);
        let stdin = io::stdin();
        let mut source = Utf8CharSource::new(stdin.lock());
        let mut stdout;
        let mut stderr;
        let output: &mut dyn Write = match self.output {
            PromptOutput::Stdout => {
                stdout = io::stdout().lock();
                &mut stdout
            }
            PromptOutput::Stderr => {
                stderr = io::stderr().lock();
                &mut stderr
            }
        };

        prompt::read_masked_line_with(
            &mut StdinTerminal::new(),
            &mut source,
            output,
            &self.prompt,
            &self.options,
        )
        .map_err(|e| {
            let msg = format!("failed to read passphrase: {}", e.message());
            e.with_context(msg)
        })
    }
}

/// Wraps another PassphraseReader and caches the result
///
/// Provides "at most once" semantics - the upstream reader is called
/// only on the first successful invocation, and subsequent calls return
/// the cached value. The cached passphrase is wrapped in `Zeroizing` and
/// will be securely wiped when this reader is dropped.
pub struct CachingPassphraseReader {
    upstream: Box<dyn PassphraseReader>,
    cached: Option<Zeroizing<String>>,
}

impl CachingPassphraseReader {
    pub fn new(upstream: Box<dyn PassphraseReader>) -> Self {
        Self {
            upstream,
            cached: None,
        }
    }
}

impl PassphraseReader for CachingPassphraseReader {
    fn read_passphrase(&mut self) -> Result<Zeroizing<String>> {
        if let Some(cached) = &self.cached {
            return Ok(cached.clone());
        }
        let passphrase = self.upstream.read_passphrase()?;
        self.cached = Some(passphrase.clone());
        Ok(passphrase)
    }
}
