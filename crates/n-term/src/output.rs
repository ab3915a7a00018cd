// SPDX-License-Identifier: MIT
//
// Output buffering and stateful span placement.
//
// Two components work together to minimize terminal I/O:
//
//   OutputBuffer accumulates all ANSI bytes in memory so the entire frame
//   can be written in a single write() syscall. This eliminates per-escape
//   overhead and keeps the terminal's input parser happy.
//
//   SpanWriter places update spans and whole lines on screen. It remembers
//   where the terminal cursor was left after the last write and skips the
//   cursor move when the next span starts exactly there.

use std::io::{self, Write};

use crate::ansi;
use crate::diff::UpdateSpan;
use crate::tag;

// ─── OutputBuffer ────────────────────────────────────────────────────────────

/// A byte buffer that accumulates ANSI output for a single `write()` syscall.
///
/// Default capacity: 16 KB, enough for a full board redraw without
/// reallocation.
pub struct OutputBuffer {
    buf: Vec<u8>,
}

const DEFAULT_CAPACITY: usize = 16_384;

impl OutputBuffer {
    /// Create an empty buffer with default capacity (16 KB).
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(DEFAULT_CAPACITY),
        }
    }

    /// Number of bytes accumulated.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether the buffer is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// The accumulated bytes (for testing and debugging).
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Append a string verbatim, escape sequences included.
    #[inline]
    pub fn push_str(&mut self, s: &str) {
        self.buf.extend_from_slice(s.as_bytes());
    }

    /// Clear the buffer for reuse (keeps allocated capacity).
    #[inline]
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// Write accumulated output to stdout and clear the buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to stdout fails.
    pub fn flush_stdout(&mut self) -> io::Result<()> {
        if !self.buf.is_empty() {
            let mut stdout = io::stdout().lock();
            stdout.write_all(&self.buf)?;
            stdout.flush()?;
            self.buf.clear();
        }
        Ok(())
    }

    /// Write accumulated output to an arbitrary writer and clear the buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `w` fails.
    pub fn flush_to(&mut self, w: &mut impl Write) -> io::Result<()> {
        if !self.buf.is_empty() {
            w.write_all(&self.buf)?;
            w.flush()?;
            self.buf.clear();
        }
        Ok(())
    }
}

impl Write for OutputBuffer {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        // Real flushing goes through flush_stdout() / flush_to().
        Ok(())
    }
}

impl Default for OutputBuffer {
    fn default() -> Self {
        Self::new()
    }
}

// ─── SpanWriter ──────────────────────────────────────────────────────────────

/// Places text on screen at explicit positions, tracking the cursor.
///
/// Every placement is relative to an origin, the screen cell where the
/// frame's column 0 of row 0 lands. After writing, the writer knows the
/// cursor sits just past the last visible column it printed; a following
/// span that starts there needs no cursor move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpanWriter {
    origin: (u16, u16),
    cursor: Option<(u16, u16)>,
}

impl SpanWriter {
    /// A writer for a frame whose top-left corner sits at `(x, y)`.
    #[must_use]
    pub const fn new(x: u16, y: u16) -> Self {
        Self {
            origin: (x, y),
            cursor: None,
        }
    }

    /// The frame origin on screen.
    #[must_use]
    pub const fn origin(&self) -> (u16, u16) {
        self.origin
    }

    /// Forget the tracked cursor. Call after anything else moved it.
    pub const fn reset_state(&mut self) {
        self.cursor = None;
    }

    /// Write one update span of frame row `row`.
    pub fn write_span(&mut self, out: &mut OutputBuffer, row: usize, span: &UpdateSpan) {
        self.place(out, span.column, row, &span.text);
    }

    /// Write a whole frame row starting at column 0.
    pub fn write_line(&mut self, out: &mut OutputBuffer, row: usize, line: &str) {
        self.place(out, 0, row, line);
    }

    fn place(&mut self, out: &mut OutputBuffer, column: usize, row: usize, text: &str) {
        let x = self.origin.0.saturating_add(clamp_u16(column));
        let y = self.origin.1.saturating_add(clamp_u16(row));

        if self.cursor != Some((x, y)) {
            ansi::cursor_to(out, x, y).ok();
        }
        out.push_str(text);

        let advance = clamp_u16(tag::visible_width(text));
        self.cursor = Some((x.saturating_add(advance), y));
    }
}

impl Default for SpanWriter {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

fn clamp_u16(n: usize) -> u16 {
    u16::try_from(n).unwrap_or(u16::MAX)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
