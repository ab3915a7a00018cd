// SPDX-License-Identifier: MIT
//
// Terminal input parser.
//
// Turns raw stdin bytes into key events. Covers what a keyboard-driven game
// receives from a terminal in raw mode:
//
// - Printable ASCII and UTF-8 multi-byte characters
// - Control characters (Ctrl+letter, Enter, Tab, Backspace)
// - CSI sequences: arrows with xterm modifier parameters, Home/End,
//   tilde-terminated editing and function keys, Shift+Tab
// - SS3 sequences (application cursor mode arrows, F1-F4)
// - Alt+key (ESC followed by a printable character)
//
// # Design
//
// The parser keeps a small byte buffer because a sequence can span two
// `read()` calls. Feed bytes with [`Parser::advance`] and collect the
// returned events. A lone ESC stays pending until more bytes arrive or the
// caller decides the user really pressed Escape and calls [`Parser::flush`].

use bitflags::bitflags;

// ─── Event Types ────────────────────────────────────────────────────────────

/// A parsed terminal input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// A key press.
    Key(KeyEvent),
}

/// A key press with its modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// Which key was pressed.
    pub code: KeyCode,
    /// Active modifier keys.
    pub modifiers: Modifiers,
}

impl KeyEvent {
    /// A key press with the given modifiers.
    #[must_use]
    pub const fn new(code: KeyCode, modifiers: Modifiers) -> Self {
        Self { code, modifiers }
    }

    /// A key press with no modifiers.
    #[must_use]
    pub const fn plain(code: KeyCode) -> Self {
        Self::new(code, Modifiers::empty())
    }

    /// Whether this is Ctrl plus the given lowercase letter.
    #[must_use]
    pub fn is_ctrl(&self, letter: char) -> bool {
        self.modifiers.contains(Modifiers::CTRL) && self.code == KeyCode::Char(letter)
    }
}

/// Identity of a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A Unicode character.
    Char(char),
    Enter,
    Tab,
    BackTab,
    Backspace,
    Escape,
    Insert,
    Delete,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    /// F1 through F12.
    F(u8),
}

bitflags! {
    /// Keyboard modifier flags, in xterm's CSI encoding (`param = 1 + bits`).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0001;
        const ALT   = 0b0010;
        const CTRL  = 0b0100;
        const SUPER = 0b1000;
    }
}

// ─── Parser ─────────────────────────────────────────────────────────────────

const ESC: u8 = 0x1B;

/// Incremental key parser.
///
/// # Escape vs escape-sequence ambiguity
///
/// A bare ESC byte is either the Escape key or the first byte of a sequence.
/// The parser holds it back. After a short quiet period with no new bytes,
/// the caller should call [`flush`](Parser::flush) to emit it as Escape.
#[derive(Debug, Default)]
pub struct Parser {
    buf: Vec<u8>,
}

impl Parser {
    /// Create a new parser with an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(32),
        }
    }

    /// Feed raw bytes and return every event they complete.
    ///
    /// Bytes that form an incomplete sequence stay buffered and are combined
    /// with the next call.
    pub fn advance(&mut self, data: &[u8]) -> Vec<Event> {
        self.buf.extend_from_slice(data);
        let mut events = Vec::new();
        let mut pos = 0;

        while pos < self.buf.len() {
            match try_parse(&self.buf[pos..]) {
                Parsed::Key(key, consumed) => {
                    events.push(Event::Key(key));
                    pos += consumed;
                }
                Parsed::Incomplete => break,
                Parsed::Skip(n) => {
                    tracing::trace!(bytes = ?&self.buf[pos..pos + n], "unrecognized input");
                    pos += n;
                }
            }
        }

        self.buf.drain(..pos);
        events
    }

    /// Are there buffered bytes waiting for more input?
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.buf.is_empty()
    }

    /// Resolve pending bytes as literal keys.
    ///
    /// A lone ESC becomes Escape; `ESC [` becomes Alt+`[`. Anything else left
    /// over was a truncated sequence and is dropped.
    pub fn flush(&mut self) -> Vec<Event> {
        let events = match self.buf.as_slice() {
            [ESC] => vec![Event::Key(KeyEvent::plain(KeyCode::Escape))],
            [ESC, b] if b.is_ascii_graphic() => vec![Event::Key(KeyEvent::new(
                KeyCode::Char(char::from(*b)),
                Modifiers::ALT,
            ))],
            _ => Vec::new(),
        };
        self.buf.clear();
        events
    }
}

// ─── Stateless Parsing Functions ────────────────────────────────────────────

/// Result of trying to parse one key from the front of the buffer.
enum Parsed {
    /// A key, and how many bytes it consumed.
    Key(KeyEvent, usize),
    /// The buffer ends mid-sequence.
    Incomplete,
    /// Unrecognized bytes to drop.
    Skip(usize),
}

fn try_parse(buf: &[u8]) -> Parsed {
    match buf[0] {
        ESC => parse_escape(buf),
        b => control_or_ascii(b).map_or_else(|| parse_utf8(buf), |key| Parsed::Key(key, 1)),
    }
}

/// Single-byte keys: control characters and printable ASCII.
fn control_or_ascii(byte: u8) -> Option<KeyEvent> {
    let key = match byte {
        0x08 | 0x7F => KeyEvent::plain(KeyCode::Backspace),
        0x09 => KeyEvent::plain(KeyCode::Tab),
        0x0A | 0x0D => KeyEvent::plain(KeyCode::Enter),
        0x00 => KeyEvent::new(KeyCode::Char('@'), Modifiers::CTRL),
        b @ 0x01..=0x1A => KeyEvent::new(KeyCode::Char(char::from(b + b'a' - 1)), Modifiers::CTRL),
        b @ 0x20..=0x7E => KeyEvent::plain(KeyCode::Char(char::from(b))),
        _ => return None,
    };
    Some(key)
}

fn parse_escape(buf: &[u8]) -> Parsed {
    let Some(&next) = buf.get(1) else {
        return Parsed::Incomplete;
    };

    match next {
        b'[' => parse_csi(buf),
        b'O' => parse_ss3(buf),
        ESC => Parsed::Key(KeyEvent::new(KeyCode::Escape, Modifiers::ALT), 2),
        b @ 0x20..=0x7E => Parsed::Key(
            KeyEvent::new(KeyCode::Char(char::from(b)), Modifiers::ALT),
            2,
        ),
        // Not a sequence we know: the ESC was a key on its own.
        _ => Parsed::Key(KeyEvent::plain(KeyCode::Escape), 1),
    }
}

/// `ESC [ params final`. Parameter bytes are 0x30..=0x3F, intermediates
/// 0x20..=0x2F, the final byte 0x40..=0x7E.
fn parse_csi(buf: &[u8]) -> Parsed {
    let Some(offset) = buf[2..].iter().position(|b| !(0x20..=0x3F).contains(b)) else {
        return Parsed::Incomplete;
    };
    let end = offset + 2;
    let final_byte = buf[end];
    let consumed = end + 1;

    if !(0x40..=0x7E).contains(&final_byte) {
        return Parsed::Skip(consumed);
    }

    let params = parse_params(&buf[2..end]);
    let modifiers = params.get(1).map_or(Modifiers::empty(), |&p| decode_modifiers(p));

    let code = match final_byte {
        b'A' => KeyCode::Up,
        b'B' => KeyCode::Down,
        b'C' => KeyCode::Right,
        b'D' => KeyCode::Left,
        b'H' => KeyCode::Home,
        b'F' => KeyCode::End,
        b'P' => KeyCode::F(1),
        b'Q' => KeyCode::F(2),
        b'R' => KeyCode::F(3),
        b'S' => KeyCode::F(4),
        b'Z' => KeyCode::BackTab,
        b'~' => match tilde_key(params.first().copied().unwrap_or(0)) {
            Some(code) => code,
            None => return Parsed::Skip(consumed),
        },
        _ => return Parsed::Skip(consumed),
    };

    Parsed::Key(KeyEvent::new(code, modifiers), consumed)
}

/// `ESC O final`: application cursor mode arrows and F1-F4.
fn parse_ss3(buf: &[u8]) -> Parsed {
    let Some(&final_byte) = buf.get(2) else {
        return Parsed::Incomplete;
    };

    let code = match final_byte {
        b'A' => KeyCode::Up,
        b'B' => KeyCode::Down,
        b'C' => KeyCode::Right,
        b'D' => KeyCode::Left,
        b'H' => KeyCode::Home,
        b'F' => KeyCode::End,
        b'P' => KeyCode::F(1),
        b'Q' => KeyCode::F(2),
        b'R' => KeyCode::F(3),
        b'S' => KeyCode::F(4),
        _ => return Parsed::Skip(3),
    };

    Parsed::Key(KeyEvent::plain(code), 3)
}

/// The key named by the first parameter of a `CSI n ~` sequence.
const fn tilde_key(n: u16) -> Option<KeyCode> {
    let code = match n {
        1 | 7 => KeyCode::Home,
        2 => KeyCode::Insert,
        3 => KeyCode::Delete,
        4 | 8 => KeyCode::End,
        5 => KeyCode::PageUp,
        6 => KeyCode::PageDown,
        15 => KeyCode::F(5),
        17 => KeyCode::F(6),
        18 => KeyCode::F(7),
        19 => KeyCode::F(8),
        20 => KeyCode::F(9),
        21 => KeyCode::F(10),
        23 => KeyCode::F(11),
        24 => KeyCode::F(12),
        _ => return None,
    };
    Some(code)
}

fn parse_utf8(buf: &[u8]) -> Parsed {
    let expected = utf8_char_len(buf[0]);
    if expected == 0 {
        return Parsed::Skip(1);
    }
    if buf.len() < expected {
        return Parsed::Incomplete;
    }

    std::str::from_utf8(&buf[..expected])
        .ok()
        .and_then(|s| s.chars().next())
        .map_or(Parsed::Skip(1), |ch| {
            Parsed::Key(KeyEvent::plain(KeyCode::Char(ch)), expected)
        })
}

// ─── Helpers ────────────────────────────────────────────────────────────────

/// Semicolon-separated numeric parameters. Empty fields read as 0; any
/// colon sub-parameter is ignored.
fn parse_params(raw: &[u8]) -> Vec<u16> {
    if raw.is_empty() {
        return Vec::new();
    }
    raw.split(|&b| b == b';')
        .map(|field| {
            field
                .iter()
                .take_while(|b| b.is_ascii_digit())
                .fold(0u16, |acc, &b| {
                    acc.saturating_mul(10).saturating_add(u16::from(b - b'0'))
                })
        })
        .collect()
}

/// Decode an xterm modifier parameter (`1 + bitmask`; 0 and 1 mean none).
#[allow(clippy::cast_possible_truncation)] // Only the low bits carry flags.
const fn decode_modifiers(param: u16) -> Modifiers {
    let val = if param > 0 { param - 1 } else { 0 };
    Modifiers::from_bits_truncate(val as u8)
}

/// Expected byte length of a UTF-8 character from its lead byte.
/// Returns 0 for continuation bytes and invalid leads.
const fn utf8_char_len(lead: u8) -> usize {
    match lead {
        0x00..=0x7F => 1,
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF7 => 4,
        _ => 0,
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
