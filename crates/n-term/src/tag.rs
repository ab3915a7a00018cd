// SPDX-License-Identifier: MIT
//
// SGR tag scanner. Recognizes styling escape sequences inside a line.
//
// A rendered line interleaves visible characters with zero-width SGR
// sequences (`ESC [ ... m`). The differ needs to step over those sequences
// without counting them as columns, and it needs to know whether a sequence
// opens a styled region or closes one. That is all this module does: it
// never interprets what a sequence means ("red", "bold"), it only finds
// where one starts and ends and sorts it into Open or Close.
//
// Only the foreground reset (`ESC [ 39 m`) counts as a close. Every other
// terminated sequence is an open. The board renderer emits exactly those two
// shapes (truecolor foreground + foreground reset), so the bookkeeping is
// exact for our own output.
//
// A lone ESC with no terminating `m` before the end of the line is not a
// tag. The differ then compares the ESC byte like any other character.

use unicode_width::UnicodeWidthChar;

/// The foreground-reset sequence. The only sequence classified as a close.
pub const FG_RESET: &str = "\x1b[39m";

/// The ESC control byte that starts every SGR sequence.
const ESC: u8 = 0x1B;

/// Whether a tag opens or closes a styled region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagKind {
    /// Any terminated escape sequence other than [`FG_RESET`].
    Open,
    /// The foreground reset, [`FG_RESET`].
    Close,
}

/// One recognized escape sequence, borrowed from the scanned line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tag<'a> {
    /// Full literal text, from the ESC through the terminating `m`.
    pub value: &'a str,
    /// Open or close.
    pub kind: TagKind,
}

impl Tag<'_> {
    /// Length of the tag in bytes (how far a cursor skips over it).
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.value.len()
    }

    /// Tags always hold at least the ESC and the `m`.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}

/// Recognize an escape sequence starting at byte offset `index` of `line`.
///
/// Returns `None` when the byte at `index` is not ESC, when no `m` follows
/// before the end of the line, or when `index` is out of range.
///
/// ```
/// use n_term::tag::{scan, TagKind};
///
/// let line = "\x1b[31mabc\x1b[39m";
/// assert_eq!(scan(line, 0).map(|t| t.kind), Some(TagKind::Open));
/// assert_eq!(scan(line, 8).map(|t| t.kind), Some(TagKind::Close));
/// assert!(scan(line, 5).is_none());
/// ```
#[must_use]
pub fn scan(line: &str, index: usize) -> Option<Tag<'_>> {
    let bytes = line.as_bytes();
    if bytes.get(index) != Some(&ESC) {
        return None;
    }

    // ESC and `m` are both ASCII, so both ends land on char boundaries.
    let end = bytes[index + 1..].iter().position(|&b| b == b'm')? + index + 1;
    let value = &line[index..=end];

    let kind = if value.ends_with(FG_RESET) {
        TagKind::Close
    } else {
        TagKind::Open
    };

    Some(Tag { value, kind })
}

/// Visible columns `line` occupies once its escape sequences are stripped.
#[must_use]
pub fn visible_width(line: &str) -> usize {
    visible_chars(line)
        .map(|ch| UnicodeWidthChar::width(ch).unwrap_or(1))
        .sum()
}

/// The characters of `line` that reach the screen, in order.
pub fn visible_chars(line: &str) -> impl Iterator<Item = char> + '_ {
    let mut pos = 0;
    std::iter::from_fn(move || {
        while let Some(tag) = scan(line, pos) {
            pos += tag.len();
        }
        let ch = line[pos..].chars().next()?;
        pos += ch.len_utf8();
        Some(ch)
    })
}

// ─── TagStack ────────────────────────────────────────────────────────────────

/// Open tags seen but not yet closed, scoped to one scan of one line.
///
/// The differ only asks two questions of it: "is anything open?" and "is
/// the same thing open on both sides?". The stored values also let a
/// replacement run that begins inside a styled region re-establish the
/// style before its first character.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagStack<'a> {
    open: Vec<&'a str>,
}

impl<'a> TagStack<'a> {
    /// An empty stack.
    #[must_use]
    pub const fn new() -> Self {
        Self { open: Vec::new() }
    }

    /// Record a tag: opens push, closes pop. Returns the tag's byte length.
    pub fn apply(&mut self, tag: Tag<'a>) -> usize {
        match tag.kind {
            TagKind::Open => self.push(tag.value),
            TagKind::Close => {
                self.pop();
            }
        }
        tag.len()
    }

    /// Push an open tag's value.
    pub fn push(&mut self, value: &'a str) {
        self.open.push(value);
    }

    /// Pop the most recent open tag. A close with nothing open is a no-op.
    pub fn pop(&mut self) -> Option<&'a str> {
        self.open.pop()
    }

    /// Whether no tag is currently open.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.open.is_empty()
    }

    /// Number of currently open tags.
    #[inline]
    #[must_use]
    pub fn depth(&self) -> usize {
        self.open.len()
    }

    /// Open tags from the outermost (oldest) to the innermost.
    pub fn iter(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.open.iter().copied()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const RED_ABC: &str = "\x1b[31mabc\x1b[39m";

    // ── Classification ──────────────────────────────────────────────────

    #[test]
    fn open_tag_at_start() {
        assert_eq!(
            scan(RED_ABC, 0),
            Some(Tag {
                value: "\x1b[31m",
                kind: TagKind::Open
            })
        );
    }

    #[test]
    fn close_tag_after_payload() {
        assert_eq!(
            scan(RED_ABC, 8),
            Some(Tag {
                value: "\x1b[39m",
                kind: TagKind::Close
            })
        );
    }

    #[test]
    fn every_other_index_is_none() {
        for index in (1..8).chain(9..13) {
            assert_eq!(scan(RED_ABC, index), None, "index {index}");
        }
    }

    #[test]
    fn truecolor_open_tag() {
        let line = "\x1b[38;2;66;134;244mabc\x1b[39m";
        let tag = scan(line, 0).unwrap();
        assert_eq!(tag.value, "\x1b[38;2;66;134;244m");
        assert_eq!(tag.kind, TagKind::Open);
        assert_eq!(tag.len(), 18);
    }

    #[test]
    fn other_resets_are_open() {
        // Only the foreground reset closes.
        assert_eq!(scan("\x1b[0m", 0).unwrap().kind, TagKind::Open);
        assert_eq!(scan("\x1b[49m", 0).unwrap().kind, TagKind::Open);
    }

    // ── Degenerate input ────────────────────────────────────────────────

    #[test]
    fn unterminated_escape_is_none() {
        assert_eq!(scan("\x1b[31", 0), None);
        assert_eq!(scan("ab\x1b", 2), None);
    }

    #[test]
    fn out_of_range_is_none() {
        assert_eq!(scan("abc", 3), None);
        assert_eq!(scan("", 0), None);
    }

    #[test]
    fn tag_ends_at_first_m() {
        let tag = scan("\x1b[1mm", 0).unwrap();
        assert_eq!(tag.value, "\x1b[1m");
    }

    #[test]
    fn scan_after_multibyte_prefix() {
        let line = "│\x1b[31mx\x1b[39m";
        let tag = scan(line, '│'.len_utf8()).unwrap();
        assert_eq!(tag.value, "\x1b[31m");
    }

    // ── Visible text ────────────────────────────────────────────────────

    #[test]
    fn visible_width_skips_tags() {
        assert_eq!(visible_width(RED_ABC), 3);
        assert_eq!(visible_width("┌──────┐"), 8);
        assert_eq!(visible_width(""), 0);
    }

    #[test]
    fn visible_width_counts_dangling_escape() {
        assert_eq!(visible_width("ab\x1b"), 3);
    }

    #[test]
    fn visible_chars_strips_tags() {
        let text: String = visible_chars("x\x1b[1m\x1b[31mab\x1b[39m").collect();
        assert_eq!(text, "xab");
    }

    // ── TagStack ────────────────────────────────────────────────────────

    #[test]
    fn stack_push_pop_is_lifo() {
        let mut stack = TagStack::new();
        stack.push("a");
        stack.push("b");
        assert_eq!(stack.depth(), 2);
        assert_eq!(stack.pop(), Some("b"));
        assert_eq!(stack.pop(), Some("a"));
        assert!(stack.is_empty());
    }

    #[test]
    fn stack_pop_empty_is_noop() {
        let mut stack = TagStack::new();
        assert_eq!(stack.pop(), None);
        assert!(stack.is_empty());
    }

    #[test]
    fn stack_apply_tracks_open_and_close() {
        let mut stack = TagStack::new();
        let open = scan(RED_ABC, 0).unwrap();
        let close = scan(RED_ABC, 8).unwrap();

        assert_eq!(stack.apply(open), 5);
        assert_eq!(stack.iter().collect::<Vec<_>>(), ["\x1b[31m"]);
        assert_eq!(stack.apply(close), 5);
        assert!(stack.is_empty());
    }

    #[test]
    fn stacks_compare_by_content() {
        let mut a = TagStack::new();
        let mut b = TagStack::new();
        a.push("\x1b[31m");
        b.push("\x1b[32m");
        assert_ne!(a, b);
        b.pop();
        b.push("\x1b[31m");
        assert_eq!(a, b);
    }
}
