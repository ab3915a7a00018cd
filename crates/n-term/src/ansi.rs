// SPDX-License-Identifier: MIT
//
// ANSI escape sequence generation.
//
// Pure functions that write escape sequences to any `impl Write`. No state,
// no decisions about when to emit; that is the renderer's job. This module
// just knows the byte-level encoding of every terminal command we need.
//
// All cursor positions are 0-indexed in our API and converted to 1-indexed
// for the terminal (ANSI standard uses 1-based coordinates).
//
// All functions return `io::Result` propagated from the underlying writer.
// In practice they never fail when writing to `OutputBuffer` (backed by a Vec).
use std::io::{self, Write};

use crate::color::Rgb;
use crate::tag::FG_RESET;

// ─── Cursor ──────────────────────────────────────────────────────────────────

/// Move the cursor to `(x, y)` using the CUP (Cursor Position) sequence.
///
/// Our coordinates are 0-indexed; ANSI CUP is 1-indexed.
#[inline]
pub fn cursor_to(w: &mut impl Write, x: u16, y: u16) -> io::Result<()> {
    write!(w, "\x1b[{};{}H", u32::from(y) + 1, u32::from(x) + 1)
}

/// Hide the cursor (DECTCEM reset).
#[inline]
pub fn cursor_hide(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25l")
}

/// Show the cursor (DECTCEM set).
#[inline]
pub fn cursor_show(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25h")
}

// ─── Screen ──────────────────────────────────────────────────────────────────

/// Clear the entire screen (ED 2).
#[inline]
pub fn clear_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[2J")
}

/// Clear from the cursor to the end of the line (EL 0).
#[inline]
pub fn clear_line(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[K")
}

/// Reset all SGR attributes to terminal defaults (SGR 0).
#[inline]
pub fn reset(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[0m")
}

// ─── Foreground Color ────────────────────────────────────────────────────────

/// Set the foreground (text) color as 24-bit `TrueColor`.
#[inline]
pub fn fg(w: &mut impl Write, color: Rgb) -> io::Result<()> {
    let Rgb(r, g, b) = color;
    write!(w, "\x1b[38;2;{r};{g};{b}m")
}

/// Restore the terminal's default foreground (SGR 39).
#[inline]
pub fn fg_reset(w: &mut impl Write) -> io::Result<()> {
    w.write_all(FG_RESET.as_bytes())
}

/// Wrap `text` in a truecolor foreground and a foreground reset.
///
/// This is the only styling shape the board produces, and the shape the
/// line differ's tag bookkeeping is exact for.
///
/// ```
/// use n_term::{ansi::paint_fg, color::Rgb};
///
/// assert_eq!(paint_fg("2", Rgb(255, 0, 0)), "\x1b[38;2;255;0;0m2\x1b[39m");
/// ```
#[must_use]
pub fn paint_fg(text: &str, color: Rgb) -> String {
    let mut out = Vec::with_capacity(text.len() + 24);
    // Writing into a Vec cannot fail.
    let _ = fg(&mut out, color);
    out.extend_from_slice(text.as_bytes());
    let _ = fg_reset(&mut out);
    String::from_utf8_lossy(&out).into_owned()
}

// ─── Synchronized Output ─────────────────────────────────────────────────────

/// Begin synchronized output (DEC Private Mode 2026).
///
/// Tells the terminal to buffer all subsequent output until [`end_sync`].
/// This prevents partial frame updates from causing visible flicker.
/// Terminals without support ignore it.
#[inline]
pub fn begin_sync(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?2026h")
}

/// End synchronized output; the terminal renders the buffered frame.
#[inline]
pub fn end_sync(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?2026l")
}

// ─── Alternate Screen ───────────────────────────────────────────────────────

/// Enter the alternate screen buffer (DEC Private Mode 1049).
///
/// The alternate screen preserves the original terminal content; on exit the
/// shell prompt and scrollback come back untouched.
#[inline]
pub fn enter_alt_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?1049h")
}

/// Exit the alternate screen buffer and restore original content.
#[inline]
pub fn exit_alt_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?1049l")
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tag::{self, TagKind};

    /// Helper: run an ANSI function and return its output as a string.
    fn emit<F>(f: F) -> String
    where
        F: FnOnce(&mut Vec<u8>) -> io::Result<()>,
    {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    // ── Cursor ──────────────────────────────────────────────────────────

    #[test]
    fn cursor_to_origin() {
        assert_eq!(emit(|w| cursor_to(w, 0, 0)), "\x1b[1;1H");
    }

    #[test]
    fn cursor_to_position() {
        assert_eq!(emit(|w| cursor_to(w, 9, 4)), "\x1b[5;10H");
    }

    #[test]
    fn cursor_to_max_does_not_overflow() {
        assert_eq!(emit(|w| cursor_to(w, u16::MAX, u16::MAX)), "\x1b[65536;65536H");
    }

    #[test]
    fn cursor_visibility() {
        assert_eq!(emit(|w| cursor_hide(w)), "\x1b[?25l");
        assert_eq!(emit(|w| cursor_show(w)), "\x1b[?25h");
    }

    // ── Screen ──────────────────────────────────────────────────────────

    #[test]
    fn clear_sequences() {
        assert_eq!(emit(|w| clear_screen(w)), "\x1b[2J");
        assert_eq!(emit(|w| clear_line(w)), "\x1b[K");
    }

    #[test]
    fn reset_sequence() {
        assert_eq!(emit(|w| reset(w)), "\x1b[0m");
    }

    // ── Foreground ──────────────────────────────────────────────────────

    #[test]
    fn fg_rgb() {
        assert_eq!(emit(|w| fg(w, Rgb(255, 128, 0))), "\x1b[38;2;255;128;0m");
    }

    #[test]
    fn fg_reset_is_the_close_tag() {
        let out = emit(|w| fg_reset(w));
        assert_eq!(out, "\x1b[39m");
        assert_eq!(tag::scan(&out, 0).map(|t| t.kind), Some(TagKind::Close));
    }

    #[test]
    fn paint_fg_produces_one_open_and_one_close() {
        let painted = paint_fg("2048", Rgb(0xF5, 0x82, 0x31));
        assert_eq!(painted, "\x1b[38;2;245;130;49m2048\x1b[39m");

        let open = tag::scan(&painted, 0).unwrap();
        assert_eq!(open.kind, TagKind::Open);
        let close = tag::scan(&painted, painted.len() - FG_RESET.len()).unwrap();
        assert_eq!(close.kind, TagKind::Close);
        assert_eq!(tag::visible_width(&painted), 4);
    }

    #[test]
    fn paint_fg_is_fg_then_text_then_reset() {
        let color = Rgb(0x3C, 0x3A, 0x32);
        let expected = format!("{}2 k{}", emit(|w| fg(w, color)), emit(|w| fg_reset(w)));
        assert_eq!(paint_fg("2 k", color), expected);
        assert_eq!(paint_fg("", color), emit(|w| fg(w, color)) + FG_RESET);
    }

    // ── Sync / Alt Screen ───────────────────────────────────────────────

    #[test]
    fn sync_sequences() {
        assert_eq!(emit(|w| begin_sync(w)), "\x1b[?2026h");
        assert_eq!(emit(|w| end_sync(w)), "\x1b[?2026l");
    }

    #[test]
    fn alt_screen_sequences() {
        assert_eq!(emit(|w| enter_alt_screen(w)), "\x1b[?1049h");
        assert_eq!(emit(|w| exit_alt_screen(w)), "\x1b[?1049l");
    }

    #[test]
    fn multiple_sequences_compose() {
        let mut buf = Vec::new();
        cursor_to(&mut buf, 5, 3).unwrap();
        fg(&mut buf, Rgb(255, 0, 0)).unwrap();
        fg_reset(&mut buf).unwrap();
        let s = String::from_utf8(buf).unwrap();
        assert_eq!(s, "\x1b[4;6H\x1b[38;2;255;0;0m\x1b[39m");
    }
}
