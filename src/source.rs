//! Character-at-a-time input

use std::collections::VecDeque;
use std::io::{self, Read};
use std::ops::RangeInclusive;

/// Yields decoded characters one at a time.
pub trait CharSource {
    /// Returns the next character, or `None` once the stream has ended.
    fn next_char(&mut self) -> io::Result<Option<char>>;
}

/// Decodes UTF-8 from a byte stream without reading ahead of the current
/// character.
///
/// Each byte that cannot be part of a valid sequence decodes to its own
/// U+FFFD. When a sequence breaks off, only its lead byte is replaced and
/// the bytes read after it are decoded again from the start.
pub struct Utf8CharSource<R> {
    reader: R,
    pending: VecDeque<u8>,
}

impl<R: Read> Utf8CharSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            pending: VecDeque::with_capacity(4),
        }
    }

    fn next_byte(&mut self) -> io::Result<Option<u8>> {
        if let Some(byte) = self.pending.pop_front() {
            return Ok(Some(byte));
        }
        let mut byte = [0u8; 1];
        loop {
            match self.reader.read(&mut byte) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(byte[0])),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }
}

/// Length of the sequence introduced by `first` and the range its second
/// byte must fall in, or `None` if `first` cannot start a sequence.
///
/// The narrowed ranges after 0xe0, 0xed, 0xf0 and 0xf4 reject overlong
/// forms, surrogates and code points above U+10FFFF.
fn sequence_shape(first: u8) -> Option<(usize, RangeInclusive<u8>)> {
    match first {
        0x00..=0x7f => Some((1, 0x00..=0x00)),
        0xc2..=0xdf => Some((2, 0x80..=0xbf)),
        0xe0 => Some((3, 0xa0..=0xbf)),
        0xed => Some((3, 0x80..=0x9f)),
        0xe1..=0xef => Some((3, 0x80..=0xbf)),
        0xf0 => Some((4, 0x90..=0xbf)),
        0xf4 => Some((4, 0x80..=0x8f)),
        0xf1..=0xf3 => Some((4, 0x80..=0xbf)),
        _ => None,
    }
}

impl<R: Read> CharSource for Utf8CharSource<R> {
    fn next_char(&mut self) -> io::Result<Option<char>> {
        let Some(first) = self.next_byte()? else {
            return Ok(None);
        };
        let (len, second) = match sequence_shape(first) {
            None => return Ok(Some(char::REPLACEMENT_CHARACTER)),
            Some((1, _)) => return Ok(Some(char::from(first))),
            Some(shape) => shape,
        };

        let mut buf = [first, 0, 0, 0];
        for i in 1..len {
            let next = self.next_byte()?;
            let allowed = match next {
                Some(byte) if i == 1 => second.contains(&byte),
                Some(byte) => (0x80..=0xbf).contains(&byte),
                None => false,
            };
            if !allowed {
                for byte in next.into_iter().chain(buf[1..i].iter().rev().copied()) {
                    self.pending.push_front(byte);
                }
                return Ok(Some(char::REPLACEMENT_CHARACTER));
            }
            buf[i] = next.unwrap_or_default();
        }

        let decoded = std::str::from_utf8(&buf[..len])
            .ok()
            .and_then(|s| s.chars().next())
            .unwrap_or(char::REPLACEMENT_CHARACTER);
        Ok(Some(decoded))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_all(bytes: &[u8]) -> Vec<char> {
        let mut source = Utf8CharSource::new(bytes);
        let mut out = Vec::new();
        while let Some(ch) = source.next_char().unwrap() {
            out.push(ch);
        }
        out
    }

    #[test]
    fn test_ascii_and_control_bytes() {
        assert_eq!(decode_all(b"a\x03\x7f\r"), vec!['a', '\u{3}', '\u{7f}', '\r']);
    }

    #[test]
    fn test_multibyte() {
        assert_eq!(decode_all("pä€😀".as_bytes()), vec!['p', 'ä', '€', '😀']);
    }

    #[test]
    fn test_invalid_lead_byte() {
        assert_eq!(decode_all(&[0xff, b'a']), vec!['\u{fffd}', 'a']);
    }

    #[test]
    fn test_broken_sequence_keeps_next_byte() {
        // 0xc3 expects one continuation byte; 'x' is not one.
        assert_eq!(decode_all(&[0xc3, b'x', b'\n']), vec!['\u{fffd}', 'x', '\n']);
    }

    #[test]
    fn test_truncated_sequence_at_end() {
        assert_eq!(
            decode_all(&[b'a', 0xe2, 0x82]),
            vec!['a', '\u{fffd}', '\u{fffd}']
        );
    }

    #[test]
    fn test_surrogate_is_one_replacement_per_byte() {
        assert_eq!(
            decode_all(&[0xed, 0xa0, 0x80, b'!']),
            vec!['\u{fffd}', '\u{fffd}', '\u{fffd}', '!']
        );
    }

    #[test]
    fn test_overlong_is_one_replacement_per_byte() {
        assert_eq!(
            decode_all(&[0xe0, 0x80, 0x80]),
            vec!['\u{fffd}', '\u{fffd}', '\u{fffd}']
        );
        assert_eq!(decode_all(&[0xc0, 0xaf]), vec!['\u{fffd}', '\u{fffd}']);
    }

    #[test]
    fn test_above_unicode_range_is_rejected() {
        assert_eq!(
            decode_all(&[0xf4, 0x90, 0x80, 0x80]),
            vec!['\u{fffd}'; 4]
        );
    }

    #[test]
    fn test_sequence_broken_after_valid_continuation() {
        // 0xe2 0x82 starts a valid three-byte sequence; 'y' cuts it short.
        assert_eq!(
            decode_all(&[0xe2, 0x82, b'y', 0xe2, 0x82, 0xac]),
            vec!['\u{fffd}', '\u{fffd}', 'y', '€']
        );
    }

    #[test]
    fn test_does_not_read_ahead() {
        let data = b"ab\ncd";
        let mut reader = &data[..];
        {
            let mut source = Utf8CharSource::new(&mut reader);
            assert_eq!(source.next_char().unwrap(), Some('a'));
            assert_eq!(source.next_char().unwrap(), Some('b'));
            assert_eq!(source.next_char().unwrap(), Some('\n'));
        }
        assert_eq!(reader, b"cd");
    }

    #[test]
    fn test_retries_interrupted_reads() {
        struct Flaky {
            interrupted: bool,
        }

        impl Read for Flaky {
            fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
                if !self.interrupted {
                    self.interrupted = true;
                    return Err(io::Error::from(io::ErrorKind::Interrupted));
                }
                buf[0] = b'z';
                Ok(1)
            }
        }

        let mut source = Utf8CharSource::new(Flaky { interrupted: false });
        assert_eq!(source.next_char().unwrap(), Some('z'));
    }

    #[test]
    fn test_propagates_read_errors() {
        struct Broken;

        impl Read for Broken {
            fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::other("device gone"))
            }
        }

        let err = Utf8CharSource::new(Broken).next_char().unwrap_err();
        assert_eq!(err.to_string(), "device gone");
    }
}
