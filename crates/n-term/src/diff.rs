// SPDX-License-Identifier: MIT
//
// Escape-aware line differ, the core of frame rendering performance.
//
// Instead of redrawing the whole board after every move, we compare each
// row of the new frame against the same row of the previous frame and emit
// only the column ranges that changed. A move in 2048 typically touches a
// handful of tiles; differential rendering turns a full repaint into a few
// short writes.
//
// The catch is that rows are strings, not cell grids. They interleave
// visible characters with zero-width SGR sequences, so raw byte offsets and
// screen columns drift apart as soon as a row carries color. The differ
// walks both rows in lockstep with two raw cursors and one shared visible
// column:
//
//   1. Step each cursor over any escape sequences at its position, keeping
//      a per-row stack of currently open tags.
//   2. Compare the next visible character of each row. The position matches
//      when the characters are equal and both rows have the same tags open.
//   3. A mismatch opens a run at the current column. The next match closes
//      it, emitting the new row's text for the run verbatim (escapes and all).
//   4. Advance the column by the character's display width.
//
// Runs are self-contained: a run that starts inside a styled region is
// prefixed with the tags that were already open, and a run that ends inside
// one is suffixed with a foreground reset, so the writer can drop each
// span onto the screen without knowing what surrounds it.
//
// Rows are compared strictly by position. There is no line matching, no
// insertion or deletion of rows.

use unicode_width::UnicodeWidthChar;

use crate::tag::{self, FG_RESET, TagStack};

// ─── UpdateSpan ──────────────────────────────────────────────────────────────

/// "Starting at this visible column, write this text."
///
/// `text` is copied from the new row and may carry escape sequences. The
/// writer emits it literally after moving the cursor to `column`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UpdateSpan {
    /// Visible column (0-indexed), independent of any escape bytes.
    pub column: usize,
    /// Literal replacement text.
    pub text: String,
}

impl UpdateSpan {
    /// Create a span.
    #[must_use]
    pub fn new(column: usize, text: impl Into<String>) -> Self {
        Self {
            column,
            text: text.into(),
        }
    }

    /// Visible columns this span covers once written.
    #[must_use]
    pub fn width(&self) -> usize {
        tag::visible_width(&self.text)
    }
}

// ─── Engine ──────────────────────────────────────────────────────────────────

/// Diff two frames row by row.
///
/// Row `i` of `old` is compared with row `i` of `new`; the result holds one
/// span list per row. Both frames must have the same number of rows. That is
/// the caller's contract; extra rows on either side are ignored.
#[must_use]
pub fn diff<A, B>(old: &[A], new: &[B]) -> Vec<Vec<UpdateSpan>>
where
    A: AsRef<str>,
    B: AsRef<str>,
{
    debug_assert_eq!(
        old.len(),
        new.len(),
        "frames must have the same number of rows"
    );

    old.iter()
        .zip(new)
        .map(|(o, n)| diff_line(o.as_ref(), n.as_ref()))
        .collect()
}

/// Compute the update spans that turn the rendering of `old` into `new`.
///
/// Spans come back in increasing, non-overlapping column order. Identical
/// rows produce no spans.
///
/// ```
/// use n_term::diff::{diff_line, UpdateSpan};
///
/// assert_eq!(diff_line("abcdef", "abxyzf"), [UpdateSpan::new(2, "xyz")]);
/// assert!(diff_line("\x1b[31mabc\x1b[39m", "\x1b[31mabc\x1b[39m").is_empty());
/// ```
#[must_use]
pub fn diff_line(old: &str, new: &str) -> Vec<UpdateSpan> {
    let mut scan = LineScan::new(old, new);
    while !scan.exhausted() {
        scan.step();
    }
    scan.finish()
}

// ─── LineScan ────────────────────────────────────────────────────────────────

/// A run of mismatched columns that has been opened but not yet emitted.
#[derive(Debug)]
struct PendingRun {
    /// Visible column where the run starts.
    column: usize,
    /// Byte offset in the new row where the run's text starts.
    start: usize,
    /// Tags open at `start`, re-emitted so the run carries its own style.
    prefix: String,
}

/// The loop state of one `diff_line` call.
///
/// `pos_old` and `pos_new` are byte cursors into each row. `column` is the
/// visible column both cursors stand on.
struct LineScan<'a> {
    old: &'a str,
    new: &'a str,
    pos_old: usize,
    pos_new: usize,
    column: usize,
    pending: Option<PendingRun>,
    stack_old: TagStack<'a>,
    stack_new: TagStack<'a>,
    spans: Vec<UpdateSpan>,
}

impl<'a> LineScan<'a> {
    const fn new(old: &'a str, new: &'a str) -> Self {
        Self {
            old,
            new,
            pos_old: 0,
            pos_new: 0,
            column: 0,
            pending: None,
            stack_old: TagStack::new(),
            stack_new: TagStack::new(),
            spans: Vec::new(),
        }
    }

    /// Either row has run out.
    const fn exhausted(&self) -> bool {
        self.pos_old >= self.old.len() || self.pos_new >= self.new.len()
    }

    /// Consume the tags at both cursors, then one visible column.
    fn step(&mut self) {
        // Where the new row stood before this column's tags. A run that
        // closes here ends before them: they style on-screen text.
        let mark = self.pos_new;
        let depth_at_mark = self.stack_new.depth();

        while let Some(t) = tag::scan(self.old, self.pos_old) {
            self.pos_old += self.stack_old.apply(t);
        }
        while let Some(t) = tag::scan(self.new, self.pos_new) {
            self.pos_new += self.stack_new.apply(t);
        }

        let ch_old = self.old[self.pos_old..].chars().next();
        let ch_new = self.new[self.pos_new..].chars().next();

        if ch_old == ch_new && self.stack_old == self.stack_new {
            if let Some(run) = self.pending.take() {
                let mut text = run.prefix;
                text.push_str(&self.new[run.start..mark]);
                for _ in 0..depth_at_mark {
                    text.push_str(FG_RESET);
                }
                self.spans.push(UpdateSpan {
                    column: run.column,
                    text,
                });
            }
        } else if self.pending.is_none() {
            self.pending = Some(PendingRun {
                column: self.column,
                start: self.pos_new,
                prefix: self.stack_new.iter().collect(),
            });
        }

        self.column += ch_new.or(ch_old).map_or(1, display_width);
        self.pos_old = ch_old.map_or(self.old.len(), |c| self.pos_old + c.len_utf8());
        self.pos_new = ch_new.map_or(self.new.len(), |c| self.pos_new + c.len_utf8());
    }

    /// Close whatever is still open once a row has run out.
    fn finish(mut self) -> Vec<UpdateSpan> {
        if let Some(run) = self.pending.take() {
            let rest = &self.new[run.start..];
            // Rows that differ only in trailing tags change nothing visible.
            if tag::visible_width(rest) > 0 {
                let mut text = run.prefix;
                text.push_str(rest);
                self.spans.push(UpdateSpan {
                    column: run.column,
                    text,
                });
            }
        } else if self.pos_new < self.new.len() {
            // The new row is longer than the old one: its visible tail has
            // never been on screen.
            let rest = &self.new[self.pos_new..];
            if tag::visible_width(rest) > 0 {
                let mut text: String = self.stack_new.iter().collect();
                text.push_str(rest);
                self.spans.push(UpdateSpan {
                    column: self.column,
                    text,
                });
            }
        }
        self.spans
    }
}

/// Terminal columns occupied by `ch`. Control characters count as one, so a
/// dangling ESC compared as text still occupies a column.
fn display_width(ch: char) -> usize {
    UnicodeWidthChar::width(ch).unwrap_or(1)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
