use std::error::Error as StdError;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorCategory {
    /// Any failure that cannot be confidently attributed to any other error
    /// category in this enum.
    Internal,

    /// The user cancelled the prompt or the environment is unusable for
    /// interactive input (e.g. stdin is not a terminal).
    User,
}

/// Fine-grained condition flags for consumers that want to branch on error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The current terminal mode could not be queried.
    TerminalState,
    /// The terminal could not be switched into raw mode.
    TerminalMode,
    /// Reading from the input stream failed or the stream ended before a
    /// line terminator was seen.
    InputRead,
    /// The user pressed the interrupt key (Ctrl+C).
    UserInterrupted,
    /// Writing the prompt, mask glyphs or control sequences failed.
    TerminalWrite,
    /// No interactive terminal is available to read from.
    PassphraseUnavailable,
}

#[derive(Debug, Error)]
#[error("{msg}")]
pub struct PromptError {
    /// Broad error category, always provided.
    pub category: ErrorCategory,
    /// Optional specific condition tag. Any code consuming errors MUST
    /// handle the absence of a defined kind.
    pub kind: Option<ErrorKind>,
    #[source]
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
    msg: String,
}

impl PromptError {
    /// Creates a new error that also tags the failure with a kind.
    pub fn with_kind(category: ErrorCategory, kind: ErrorKind, msg: impl Into<String>) -> Self {
        Self {
            category,
            kind: Some(kind),
            source: None,
            msg: msg.into(),
        }
    }

    /// Creates a new error that carries both a kind tag and the originating source error.
    pub fn with_kind_and_source(
        category: ErrorCategory,
        kind: ErrorKind,
        msg: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self {
            category,
            kind: Some(kind),
            source: Some(Box::new(source)),
            msg: msg.into(),
        }
    }

    pub(crate) fn interrupted() -> Self {
        Self::with_kind(
            ErrorCategory::User,
            ErrorKind::UserInterrupted,
            "operation interrupted by user (Ctrl+C)",
        )
    }

    pub(crate) fn write_failed(e: std::io::Error) -> Self {
        Self::with_kind_and_source(
            ErrorCategory::Internal,
            ErrorKind::TerminalWrite,
            format!("error writing to terminal: {}", e),
            e,
        )
    }

    /// The user-facing message carried by the error.
    pub fn message(&self) -> &str {
        &self.msg
    }

    /// Returns the preserved source error if present.
    pub fn source_error(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.source.as_deref()
    }

    /// True when the user cancelled the prompt with the interrupt key.
    pub fn is_interrupted(&self) -> bool {
        self.kind == Some(ErrorKind::UserInterrupted)
    }

    /// Wraps the current error with a higher-level message while preserving the original as source.
    pub fn with_context(self, msg: impl Into<String>) -> Self {
        let category = self.category;
        let kind = self.kind;
        Self {
            category,
            kind,
            source: Some(Box::new(self)),
            msg: msg.into(),
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, PromptError>;
