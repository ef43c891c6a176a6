//! Classification of keystrokes read while a prompt is active

/// ETX, sent by the terminal for Ctrl+C when ISIG is off.
pub const INTERRUPT: char = '\u{3}';
pub const BACKSPACE: char = '\u{8}';
pub const DELETE: char = '\u{7f}';

/// How the interrupt key (Ctrl+C) is treated while reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InterruptPolicy {
    /// Abort the prompt with a `UserInterrupted` error.
    #[default]
    Cancel,
    /// Accept the key as part of the secret, like any other character.
    Literal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyClass {
    /// Enter: `\n` or `\r`.
    Terminator,
    Interrupt,
    /// Backspace or DEL; terminals disagree on which one the key sends.
    Backspace,
    Ordinary,
}

pub fn classify(ch: char, policy: InterruptPolicy) -> KeyClass {
    match ch {
        '\n' | '\r' => KeyClass::Terminator,
        INTERRUPT if policy == InterruptPolicy::Cancel => KeyClass::Interrupt,
        BACKSPACE | DELETE => KeyClass::Backspace,
        _ => KeyClass::Ordinary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminators() {
        assert_eq!(classify('\n', InterruptPolicy::Cancel), KeyClass::Terminator);
        assert_eq!(classify('\r', InterruptPolicy::Literal), KeyClass::Terminator);
    }

    #[test]
    fn test_backspace_and_delete() {
        assert_eq!(classify('\u{8}', InterruptPolicy::Cancel), KeyClass::Backspace);
        assert_eq!(classify('\u{7f}', InterruptPolicy::Cancel), KeyClass::Backspace);
    }

    #[test]
    fn test_interrupt_depends_on_policy() {
        assert_eq!(classify(INTERRUPT, InterruptPolicy::Cancel), KeyClass::Interrupt);
        assert_eq!(classify(INTERRUPT, InterruptPolicy::Literal), KeyClass::Ordinary);
    }

    #[test]
    fn test_ordinary() {
        for ch in ['a', ' ', '*', 'é', '\u{1b}', '\t'] {
            assert_eq!(classify(ch, InterruptPolicy::Cancel), KeyClass::Ordinary);
        }
    }
}
