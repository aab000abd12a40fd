// SPDX-License-Identifier: MIT
//
// Key decoding — raw stdin bytes to logical key events.
//
// Terminal escape sequences are variable-length and only disambiguated
// by position-dependent bytes, so a lone ESC byte (0x1B) is ambiguous:
// a standalone Escape keypress or the start of a sequence. The terminal
// is configured with a 1-decisecond inter-byte timeout, and "no further
// byte arrived in time" is the deciding signal — every state of the
// decoder resolves a timeout to a plain Escape event rather than
// stalling for bytes that never come.
//
// The decoder is an explicit state machine (GOT_ESC, GOT_BRACKET,
// GOT_DIGIT, GOT_O) driven one byte at a time through the `RawTty`
// capability, which keeps it testable against synthetic byte scripts
// without a real terminal.

use crate::error::Result;
use crate::tty::RawTty;

const ESC: u8 = 0x1b;

/// A decoded key event.
///
/// Produced fresh per [`read_key`] call; carries no identity beyond its
/// value. Bytes that are not part of an escape sequence come through
/// verbatim as [`Char`](Key::Char) or, for values below 0x20 and for
/// 0x7F, as [`Ctrl`](Key::Ctrl) with the raw byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// A printable byte, unchanged.
    Char(u8),
    /// A control byte (value < 0x20 or == 0x7F), unchanged.
    Ctrl(u8),
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Delete,
    Home,
    End,
    PageUp,
    PageDown,
    /// A standalone Escape keypress, or an unrecognized sequence.
    Escape,
}

impl Key {
    /// Whether this event is the control byte for `Ctrl+<ch>`.
    ///
    /// `ch` is the plain letter, e.g. `key.is_ctrl(b'q')` for Ctrl-Q.
    #[must_use]
    pub const fn is_ctrl(self, ch: u8) -> bool {
        matches!(self, Self::Ctrl(byte) if byte == ch & 0x1f)
    }
}

/// Decoder state after the initial ESC byte.
#[derive(Clone, Copy)]
enum State {
    /// Seen `ESC`.
    GotEsc,
    /// Seen `ESC [`.
    GotBracket,
    /// Seen `ESC [ <digit>`; a `~` terminator must follow.
    GotDigit(u8),
    /// Seen `ESC O` (SS3).
    GotO,
}

/// Read one key event, blocking until a byte arrives.
///
/// The underlying reads return after at most one decisecond; a timeout
/// before the first byte simply retries (a benign would-block), so this
/// call blocks indefinitely for the first byte but never stalls in the
/// middle of an escape sequence.
///
/// # Errors
///
/// [`Error::Io`](crate::Error::Io) on any read failure other than a
/// benign would-block.
pub fn read_key(tty: &mut impl RawTty) -> Result<Key> {
    let first = loop {
        if let Some(byte) = tty.read_byte()? {
            break byte;
        }
    };

    if first == ESC {
        decode_escape(tty)
    } else {
        Ok(classify(first))
    }
}

/// Classify a non-escape byte as printable or control.
const fn classify(byte: u8) -> Key {
    if byte < 0x20 || byte == 0x7f {
        Key::Ctrl(byte)
    } else {
        Key::Char(byte)
    }
}

/// Run the escape-sequence state machine.
///
/// Every state treats a read timeout as "this was a lone Escape after
/// all", and every unrecognized byte resolves to [`Key::Escape`] as
/// well — nothing is pushed back or buffered.
fn decode_escape(tty: &mut impl RawTty) -> Result<Key> {
    let mut state = State::GotEsc;

    loop {
        let Some(byte) = tty.read_byte()? else {
            return Ok(Key::Escape);
        };

        state = match (state, byte) {
            (State::GotEsc, b'[') => State::GotBracket,
            (State::GotEsc, b'O') => State::GotO,
            (State::GotEsc, _) => return Ok(Key::Escape),

            (State::GotBracket, digit @ b'0'..=b'9') => State::GotDigit(digit),
            (State::GotBracket, byte) => return Ok(csi_key(byte)),

            (State::GotDigit(digit), b'~') => return Ok(tilde_key(digit)),
            (State::GotDigit(_), _) => return Ok(Key::Escape),

            (State::GotO, byte) => return Ok(ss3_key(byte)),
        };
    }
}

/// `ESC [ <byte>` — letter-final CSI navigation keys.
const fn csi_key(byte: u8) -> Key {
    match byte {
        b'A' => Key::ArrowUp,
        b'B' => Key::ArrowDown,
        b'C' => Key::ArrowRight,
        b'D' => Key::ArrowLeft,
        b'H' => Key::Home,
        b'F' => Key::End,
        _ => Key::Escape,
    }
}

/// `ESC [ <digit> ~` — tilde-terminated editing keys.
const fn tilde_key(digit: u8) -> Key {
    match digit {
        b'1' | b'7' => Key::Home,
        b'3' => Key::Delete,
        b'4' | b'8' => Key::End,
        b'5' => Key::PageUp,
        b'6' => Key::PageDown,
        _ => Key::Escape,
    }
}

/// `ESC O <byte>` — SS3 variants some terminals send for Home/End.
const fn ss3_key(byte: u8) -> Key {
    match byte {
        b'H' => Key::Home,
        b'F' => Key::End,
        _ => Key::Escape,
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::error::Error;
    use crate::tty::test_support::ScriptTty;

    /// Helper: decode one key from a fully scripted byte sequence.
    fn decode(bytes: &[u8]) -> Key {
        let mut tty = ScriptTty::new();
        tty.feed(bytes);
        let key = read_key(&mut tty).unwrap();
        assert_eq!(tty.unread(), 0, "decoder left unconsumed script entries");
        key
    }

    // ── Plain bytes ─────────────────────────────────────────────────────

    #[test]
    fn printable_byte_verbatim() {
        assert_eq!(decode(b"a"), Key::Char(b'a'));
        assert_eq!(decode(b"~"), Key::Char(b'~'));
        assert_eq!(decode(b" "), Key::Char(b' '));
    }

    #[test]
    fn control_byte_classified() {
        assert_eq!(decode(b"\x11"), Key::Ctrl(0x11)); // Ctrl-Q
        assert_eq!(decode(b"\x01"), Key::Ctrl(0x01));
        assert_eq!(decode(b"\x7f"), Key::Ctrl(0x7f));
        assert_eq!(decode(b"\r"), Key::Ctrl(b'\r'));
    }

    #[test]
    fn classification_boundary() {
        assert_eq!(decode(&[0x1f]), Key::Ctrl(0x1f));
        assert_eq!(decode(&[0x20]), Key::Char(0x20));
        assert_eq!(decode(&[0x7e]), Key::Char(0x7e));
        assert_eq!(decode(&[0x80]), Key::Char(0x80));
    }

    #[test]
    fn is_ctrl_matches_masked_letter() {
        assert!(Key::Ctrl(0x11).is_ctrl(b'q'));
        assert!(!Key::Ctrl(0x11).is_ctrl(b'x'));
        assert!(!Key::Char(b'q').is_ctrl(b'q'));
    }

    // ── Blocking and errors ─────────────────────────────────────────────

    #[test]
    fn retries_until_first_byte_arrives() {
        let mut tty = ScriptTty::new();
        tty.feed_timeout();
        tty.feed_timeout();
        tty.feed(b"x");
        assert_eq!(read_key(&mut tty).unwrap(), Key::Char(b'x'));
    }

    #[test]
    fn hard_read_failure_propagates() {
        let mut tty = ScriptTty::new();
        tty.feed_error();
        assert!(matches!(read_key(&mut tty), Err(Error::Io(_))));
    }

    #[test]
    fn hard_failure_mid_sequence_propagates() {
        let mut tty = ScriptTty::new();
        tty.feed(b"\x1b[");
        tty.feed_error();
        assert!(matches!(read_key(&mut tty), Err(Error::Io(_))));
    }

    // ── Lone Escape ─────────────────────────────────────────────────────

    #[test]
    fn lone_escape_on_timeout() {
        let mut tty = ScriptTty::new();
        tty.feed(b"\x1b");
        tty.feed_timeout();
        assert_eq!(read_key(&mut tty).unwrap(), Key::Escape);
        assert_eq!(tty.unread(), 0, "consumed bytes beyond the first");
    }

    #[test]
    fn escape_then_timeout_after_bracket() {
        let mut tty = ScriptTty::new();
        tty.feed(b"\x1b[");
        tty.feed_timeout();
        assert_eq!(read_key(&mut tty).unwrap(), Key::Escape);
    }

    #[test]
    fn escape_then_timeout_after_digit() {
        let mut tty = ScriptTty::new();
        tty.feed(b"\x1b[5");
        tty.feed_timeout();
        assert_eq!(read_key(&mut tty).unwrap(), Key::Escape);
    }

    #[test]
    fn escape_with_unknown_second_byte() {
        assert_eq!(decode(b"\x1bx"), Key::Escape);
    }

    // ── CSI letter finals ───────────────────────────────────────────────

    #[test]
    fn arrow_keys() {
        assert_eq!(decode(b"\x1b[A"), Key::ArrowUp);
        assert_eq!(decode(b"\x1b[B"), Key::ArrowDown);
        assert_eq!(decode(b"\x1b[C"), Key::ArrowRight);
        assert_eq!(decode(b"\x1b[D"), Key::ArrowLeft);
    }

    #[test]
    fn home_end_letter_finals() {
        assert_eq!(decode(b"\x1b[H"), Key::Home);
        assert_eq!(decode(b"\x1b[F"), Key::End);
    }

    #[test]
    fn unknown_csi_final_is_escape() {
        assert_eq!(decode(b"\x1b[Z"), Key::Escape);
    }

    // ── Tilde sequences ─────────────────────────────────────────────────

    #[test]
    fn tilde_navigation_keys() {
        assert_eq!(decode(b"\x1b[1~"), Key::Home);
        assert_eq!(decode(b"\x1b[3~"), Key::Delete);
        assert_eq!(decode(b"\x1b[4~"), Key::End);
        assert_eq!(decode(b"\x1b[5~"), Key::PageUp);
        assert_eq!(decode(b"\x1b[6~"), Key::PageDown);
        assert_eq!(decode(b"\x1b[7~"), Key::Home);
        assert_eq!(decode(b"\x1b[8~"), Key::End);
    }

    #[test]
    fn unknown_digit_is_escape() {
        assert_eq!(decode(b"\x1b[2~"), Key::Escape);
        assert_eq!(decode(b"\x1b[9~"), Key::Escape);
        assert_eq!(decode(b"\x1b[0~"), Key::Escape);
    }

    #[test]
    fn missing_tilde_terminator_is_escape() {
        assert_eq!(decode(b"\x1b[3x"), Key::Escape);
        assert_eq!(decode(b"\x1b[55"), Key::Escape);
    }

    // ── SS3 sequences ───────────────────────────────────────────────────

    #[test]
    fn ss3_home_end() {
        assert_eq!(decode(b"\x1bOH"), Key::Home);
        assert_eq!(decode(b"\x1bOF"), Key::End);
    }

    #[test]
    fn ss3_unknown_is_escape() {
        assert_eq!(decode(b"\x1bOA"), Key::Escape);
    }

    // ── Sequential decoding ─────────────────────────────────────────────

    #[test]
    fn consecutive_keys_decode_independently() {
        let mut tty = ScriptTty::new();
        tty.feed(b"\x1b[Aq");
        assert_eq!(read_key(&mut tty).unwrap(), Key::ArrowUp);
        assert_eq!(read_key(&mut tty).unwrap(), Key::Char(b'q'));
    }
}
