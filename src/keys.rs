//! Key decoding: raw terminal bytes → logical keys.
//!
//! Terminals encode navigation keys as escape sequences (`ESC [ A`, `ESC [ 5 ~`, `ESC O H`, ...).
//! A lone `ESC` byte is also a key of its own, so after reading `ESC` we wait a short time for
//! the rest of a sequence and fall back to `Key::Escape` if nothing (or nothing we know) arrives.
//!
//! The decoding itself is a small state machine ([`DecodeState`] + [`step`]) with no I/O, so it
//! can be tested byte by byte. [`read_key`] drives it from a [`ByteSource`].

use std::collections::VecDeque;
use std::io;
use std::time::Duration;

const ESC: u8 = 0x1b;
const DEL: u8 = 127;

/// A logical key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Any single byte that is not part of an escape sequence: printable characters, `\r`,
    /// Ctrl-letter codes, tabs.
    Char(u8),
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Home,
    End,
    PageUp,
    PageDown,
    Delete,
    Backspace,
    Escape,
}

/// The byte a terminal sends for `Ctrl` + `c`.
pub const fn ctrl(c: u8) -> u8 {
    c & 0x1f
}

/// Decoder states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeState {
    Idle,
    /// Saw `ESC`.
    Escape,
    /// Saw `ESC [`.
    Bracket,
    /// Saw `ESC [ <digit>`; waiting for `~`.
    BracketDigit(u8),
    /// Saw `ESC O`.
    Ss3,
}

/// Result of feeding one input (a byte, or `None` for a timed-out read) to the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Emit(Key),
    Next(DecodeState),
    /// Nothing arrived while idle.
    Wait,
}

/// Pure transition function of the decoder.
pub fn step(state: DecodeState, input: Option<u8>) -> Step {
    use DecodeState::{Bracket, BracketDigit, Escape, Idle, Ss3};

    match (state, input) {
        (Idle, None) => Step::Wait,
        (Idle, Some(ESC)) => Step::Next(Escape),
        (Idle, Some(DEL)) => Step::Emit(Key::Backspace),
        (Idle, Some(b)) => Step::Emit(Key::Char(b)),

        (Escape, Some(b'[')) => Step::Next(Bracket),
        (Escape, Some(b'O')) => Step::Next(Ss3),

        (Bracket, Some(d @ b'0'..=b'9')) => Step::Next(BracketDigit(d)),
        (Bracket, Some(b'A')) => Step::Emit(Key::ArrowUp),
        (Bracket, Some(b'B')) => Step::Emit(Key::ArrowDown),
        (Bracket, Some(b'C')) => Step::Emit(Key::ArrowRight),
        (Bracket, Some(b'D')) => Step::Emit(Key::ArrowLeft),
        (Bracket, Some(b'H')) => Step::Emit(Key::Home),
        (Bracket, Some(b'F')) => Step::Emit(Key::End),

        (BracketDigit(d), Some(b'~')) => Step::Emit(match d {
            b'1' | b'7' => Key::Home,
            b'3' => Key::Delete,
            b'4' | b'8' => Key::End,
            b'5' => Key::PageUp,
            b'6' => Key::PageDown,
            _ => Key::Escape,
        }),

        (Ss3, Some(b'H')) => Step::Emit(Key::Home),
        (Ss3, Some(b'F')) => Step::Emit(Key::End),

        // Timeouts and unknown sequences inside an escape degrade to a bare Escape.
        (Escape | Bracket | BracketDigit(_) | Ss3, _) => Step::Emit(Key::Escape),
    }
}

/// Something we can pull single bytes from, with a timeout.
pub trait ByteSource {
    /// Read one byte, waiting at most `timeout`. `Ok(None)` means the timeout expired.
    fn read_byte(&mut self, timeout: Duration) -> io::Result<Option<u8>>;
}

/// In-memory source: pops bytes from the front, times out when empty.
impl ByteSource for VecDeque<u8> {
    fn read_byte(&mut self, _timeout: Duration) -> io::Result<Option<u8>> {
        Ok(self.pop_front())
    }
}

/// Read one logical key.
///
/// Returns `Ok(None)` if no byte arrived within `idle`, so the caller can redraw (e.g. to expire
/// the status message). Bytes following an `ESC` are waited for at most `escape` each.
pub fn read_key<S: ByteSource + ?Sized>(
    src: &mut S,
    idle: Duration,
    escape: Duration,
) -> io::Result<Option<Key>> {
    let mut state = DecodeState::Idle;
    loop {
        let timeout = if state == DecodeState::Idle { idle } else { escape };
        let input = src.read_byte(timeout)?;
        match step(state, input) {
            Step::Emit(key) => {
                if key == Key::Escape && input.is_some() {
                    log::debug!("unrecognized escape sequence (state {state:?}, input {input:?})");
                }
                return Ok(Some(key));
            }
            Step::Next(next) => state = next,
            Step::Wait => return Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(bytes: &[u8]) -> Option<Key> {
        let mut src: VecDeque<u8> = bytes.iter().copied().collect();
        read_key(&mut src, Duration::ZERO, Duration::ZERO).unwrap()
    }

    fn decode_all(bytes: &[u8]) -> Vec<Key> {
        let mut src: VecDeque<u8> = bytes.iter().copied().collect();
        let mut keys = Vec::new();
        while let Some(k) = read_key(&mut src, Duration::ZERO, Duration::ZERO).unwrap() {
            keys.push(k);
        }
        keys
    }

    // ==================== transition function ====================

    #[test]
    fn idle_timeout_waits() {
        assert_eq!(step(DecodeState::Idle, None), Step::Wait);
    }

    #[test]
    fn escape_timeout_is_bare_escape() {
        assert_eq!(step(DecodeState::Escape, None), Step::Emit(Key::Escape));
        assert_eq!(step(DecodeState::Bracket, None), Step::Emit(Key::Escape));
        assert_eq!(step(DecodeState::BracketDigit(b'5'), None), Step::Emit(Key::Escape));
        assert_eq!(step(DecodeState::Ss3, None), Step::Emit(Key::Escape));
    }

    #[test]
    fn bracket_digit_requires_tilde() {
        assert_eq!(
            step(DecodeState::BracketDigit(b'3'), Some(b'~')),
            Step::Emit(Key::Delete)
        );
        assert_eq!(
            step(DecodeState::BracketDigit(b'3'), Some(b'x')),
            Step::Emit(Key::Escape)
        );
    }

    // ==================== full sequences ====================

    #[test]
    fn plain_bytes() {
        assert_eq!(decode(b"a"), Some(Key::Char(b'a')));
        assert_eq!(decode(b"\r"), Some(Key::Char(b'\r')));
        assert_eq!(decode(&[ctrl(b'q')]), Some(Key::Char(17)));
        assert_eq!(decode(&[127]), Some(Key::Backspace));
    }

    #[test]
    fn nothing_available() {
        assert_eq!(decode(b""), None);
    }

    #[test]
    fn arrows_home_end() {
        assert_eq!(decode(b"\x1b[A"), Some(Key::ArrowUp));
        assert_eq!(decode(b"\x1b[B"), Some(Key::ArrowDown));
        assert_eq!(decode(b"\x1b[C"), Some(Key::ArrowRight));
        assert_eq!(decode(b"\x1b[D"), Some(Key::ArrowLeft));
        assert_eq!(decode(b"\x1b[H"), Some(Key::Home));
        assert_eq!(decode(b"\x1b[F"), Some(Key::End));
        assert_eq!(decode(b"\x1bOH"), Some(Key::Home));
        assert_eq!(decode(b"\x1bOF"), Some(Key::End));
    }

    #[test]
    fn tilde_sequences() {
        assert_eq!(decode(b"\x1b[1~"), Some(Key::Home));
        assert_eq!(decode(b"\x1b[7~"), Some(Key::Home));
        assert_eq!(decode(b"\x1b[4~"), Some(Key::End));
        assert_eq!(decode(b"\x1b[8~"), Some(Key::End));
        assert_eq!(decode(b"\x1b[3~"), Some(Key::Delete));
        assert_eq!(decode(b"\x1b[5~"), Some(Key::PageUp));
        assert_eq!(decode(b"\x1b[6~"), Some(Key::PageDown));
    }

    #[test]
    fn lone_and_truncated_escape() {
        assert_eq!(decode(b"\x1b"), Some(Key::Escape));
        assert_eq!(decode(b"\x1b["), Some(Key::Escape));
        assert_eq!(decode(b"\x1b[5"), Some(Key::Escape));
    }

    #[test]
    fn unknown_sequences_degrade_to_escape() {
        assert_eq!(decode(b"\x1b[Z"), Some(Key::Escape));
        assert_eq!(decode(b"\x1b[2~"), Some(Key::Escape));
        assert_eq!(decode(b"\x1bOP"), Some(Key::Escape));
    }

    #[test]
    fn decoder_keeps_no_state_between_calls() {
        assert_eq!(
            decode_all(b"x\x1b[Cy\x1b[6~"),
            vec![Key::Char(b'x'), Key::ArrowRight, Key::Char(b'y'), Key::PageDown]
        );
    }

    #[test]
    fn escape_followed_by_other_byte_consumes_it() {
        // `ESC x` is not a sequence we know; both bytes are swallowed as one Escape.
        assert_eq!(decode_all(b"\x1bxa"), vec![Key::Escape, Key::Char(b'a')]);
    }

    struct FailingSource;

    impl ByteSource for FailingSource {
        fn read_byte(&mut self, _timeout: Duration) -> io::Result<Option<u8>> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "gone"))
        }
    }

    #[test]
    fn read_errors_propagate() {
        let err = read_key(&mut FailingSource, Duration::ZERO, Duration::ZERO).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }
}
