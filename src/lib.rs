//! maskpass - read passwords from a terminal with masked feedback
//!
//! [`read_masked_line`] is the entry point for one-off prompts. Callers that
//! need to choose between a terminal and a pipe, or reuse an answer, go
//! through the [`passphrase::PassphraseReader`] implementations.

#![forbid(unsafe_code)]

pub mod error;
pub mod keys;
pub mod passphrase;
pub mod prompt;
pub mod source;
pub mod terminal;

pub use error::{ErrorCategory, ErrorKind, PromptError, Result};
pub use keys::InterruptPolicy;
pub use prompt::{PromptOptions, read_masked_line, read_masked_line_with};
