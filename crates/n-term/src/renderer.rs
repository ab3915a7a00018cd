// SPDX-License-Identifier: MIT
//
// Screen renderer: frames of styled lines in, minimal terminal output out.
//
// A frame is a list of lines, each possibly carrying SGR tags. The renderer
// keeps the previous frame and, per render:
//
//   1. Decides between a full redraw (first frame, forced, or the row count
//      changed) and a differential update.
//   2. For a differential update, runs the line differ over every row pair
//      and hands the resulting spans to the SpanWriter. Rows with no spans
//      produce no output at all.
//   3. Wraps the frame in synchronized output and resets SGR state at the
//      end, so nothing leaks into the terminal after the frame.
//
// All output is accumulated in an OutputBuffer; flush() issues the single
// write() syscall.

use std::io::{self, Write};

use crate::ansi;
use crate::diff;
use crate::output::{OutputBuffer, SpanWriter};
use crate::tag;

// ─── RenderStats ─────────────────────────────────────────────────────────────

/// Statistics from a render pass, for profiling and debugging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderStats {
    /// Rows that produced at least one write.
    pub rows_changed: usize,
    /// Rows that matched the previous frame and were skipped.
    pub rows_skipped: usize,
    /// Update spans written (a full redraw counts one per row).
    pub spans_written: usize,
    /// Total bytes of ANSI output generated.
    pub bytes_written: usize,
    /// Whether the frame was drawn from scratch.
    pub full_redraw: bool,
}

impl RenderStats {
    /// Total rows processed (changed + skipped).
    #[inline]
    #[must_use]
    pub const fn total_rows(&self) -> usize {
        self.rows_changed + self.rows_skipped
    }
}

// ─── ScreenRenderer ──────────────────────────────────────────────────────────

/// Differential renderer for frames of styled lines.
///
/// # Usage
///
/// ```no_run
/// use n_term::renderer::ScreenRenderer;
///
/// let mut renderer = ScreenRenderer::new();
/// let frame = vec!["score 0".to_string(), "┌──────┐".to_string()];
///
/// let stats = renderer.render(&frame);
/// renderer.flush().unwrap();
/// assert!(stats.full_redraw);
/// ```
pub struct ScreenRenderer {
    output: OutputBuffer,
    writer: SpanWriter,
    previous: Option<Vec<String>>,
}

impl ScreenRenderer {
    /// Create a renderer with no previous frame (first render draws everything).
    #[must_use]
    pub fn new() -> Self {
        Self {
            output: OutputBuffer::new(),
            writer: SpanWriter::new(0, 0),
            previous: None,
        }
    }

    /// Move the frame's top-left corner on screen. Forces a full redraw when
    /// the origin actually changes.
    pub fn set_origin(&mut self, x: u16, y: u16) {
        if self.writer.origin() != (x, y) {
            self.writer = SpanWriter::new(x, y);
            self.force_redraw();
        }
    }

    /// Compare `frame` with the previous one and generate ANSI output.
    ///
    /// After calling this, use [`flush`](Self::flush) or
    /// [`flush_to`](Self::flush_to) to write the output to the terminal,
    /// or [`output_bytes`](Self::output_bytes) to inspect it.
    pub fn render<S: AsRef<str>>(&mut self, frame: &[S]) -> RenderStats {
        self.output.clear();
        self.writer.reset_state();

        let mut stats = RenderStats::default();

        ansi::begin_sync(&mut self.output).ok();

        match self.previous.as_deref() {
            Some(previous) if previous.len() == frame.len() => {
                let updates = diff::diff(previous, frame);
                for (row, (spans, (old, new))) in
                    updates.iter().zip(previous.iter().zip(frame)).enumerate()
                {
                    let new = new.as_ref();
                    let shrunk = tag::visible_width(new) < tag::visible_width(old);
                    if spans.is_empty() && !shrunk {
                        stats.rows_skipped += 1;
                        continue;
                    }

                    if shrunk {
                        // The differ never emits clearing spans; rewrite the
                        // row and erase what the old line left past its end.
                        self.writer.write_line(&mut self.output, row, new);
                        ansi::clear_line(&mut self.output).ok();
                        stats.spans_written += 1;
                    } else {
                        for span in spans {
                            self.writer.write_span(&mut self.output, row, span);
                        }
                        stats.spans_written += spans.len();
                    }
                    stats.rows_changed += 1;
                }
            }
            previous => {
                if let Some(previous) = previous {
                    tracing::debug!(
                        old_rows = previous.len(),
                        new_rows = frame.len(),
                        "row count changed, redrawing"
                    );
                }
                stats.full_redraw = true;
                ansi::clear_screen(&mut self.output).ok();
                for (row, line) in frame.iter().enumerate() {
                    self.writer.write_line(&mut self.output, row, line.as_ref());
                }
                stats.rows_changed = frame.len();
                stats.spans_written = frame.len();
            }
        }

        // Reset terminal state at frame end so nothing leaks into the
        // terminal's default rendering.
        ansi::reset(&mut self.output).ok();
        ansi::end_sync(&mut self.output).ok();

        stats.bytes_written = self.output.len();
        tracing::trace!(
            rows_changed = stats.rows_changed,
            rows_skipped = stats.rows_skipped,
            spans = stats.spans_written,
            bytes = stats.bytes_written,
            full = stats.full_redraw,
            "frame rendered"
        );

        self.store_frame(frame);
        stats
    }

    /// The raw ANSI bytes from the last render (for testing and debugging).
    #[must_use]
    pub fn output_bytes(&self) -> &[u8] {
        self.output.as_bytes()
    }

    /// Write accumulated output to stdout and clear the buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to stdout fails.
    pub fn flush(&mut self) -> io::Result<()> {
        self.output.flush_stdout()
    }

    /// Write accumulated output to an arbitrary writer and clear the buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `w` fails.
    pub fn flush_to(&mut self, w: &mut impl Write) -> io::Result<()> {
        self.output.flush_to(w)
    }

    /// Discard the previous frame so the next render draws everything.
    ///
    /// Used after a terminal resize or when the user asks for a refresh.
    pub fn force_redraw(&mut self) {
        self.previous = None;
    }

    /// Keep `frame` for the next comparison, reusing line allocations.
    fn store_frame<S: AsRef<str>>(&mut self, frame: &[S]) {
        let previous = self.previous.get_or_insert_with(Vec::new);
        previous.truncate(frame.len());
        for (slot, line) in previous.iter_mut().zip(frame) {
            slot.clear();
            slot.push_str(line.as_ref());
        }
        let kept = previous.len();
        previous.extend(frame[kept..].iter().map(|line| line.as_ref().to_owned()));
    }
}

impl Default for ScreenRenderer {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const GREEN: &str = "\x1b[38;2;0;255;0m";

    /// Helper: render a frame and return (stats, output_string).
    fn render_frame(renderer: &mut ScreenRenderer, frame: &[&str]) -> (RenderStats, String) {
        let stats = renderer.render(frame);
        let output = String::from_utf8(renderer.output_bytes().to_vec()).unwrap();
        (stats, output)
    }

    // ── First Render ────────────────────────────────────────────────────

    #[test]
    fn first_render_draws_every_row() {
        let mut renderer = ScreenRenderer::new();
        let (stats, output) = render_frame(&mut renderer, &["ab", "cd", "ef"]);

        assert!(stats.full_redraw);
        assert_eq!(stats.rows_changed, 3);
        assert_eq!(stats.rows_skipped, 0);
        assert!(output.contains("\x1b[2J"));
        assert!(output.contains("\x1b[1;1Hab\x1b[2;1Hcd\x1b[3;1Hef"));
    }

    #[test]
    fn first_render_has_sync_markers_and_reset() {
        let mut renderer = ScreenRenderer::new();
        let (_, output) = render_frame(&mut renderer, &["x"]);

        assert!(output.starts_with("\x1b[?2026h"));
        assert!(output.ends_with("\x1b[0m\x1b[?2026l"));
    }

    // ── Differential Updates ────────────────────────────────────────────

    #[test]
    fn identical_frames_skip_every_row() {
        let mut renderer = ScreenRenderer::new();
        renderer.render(&["ab", "cd"]);
        let (stats, output) = render_frame(&mut renderer, &["ab", "cd"]);

        assert!(!stats.full_redraw);
        assert_eq!(stats.rows_changed, 0);
        assert_eq!(stats.rows_skipped, 2);
        assert_eq!(stats.total_rows(), 2);
        assert_eq!(output, "\x1b[?2026h\x1b[0m\x1b[?2026l");
    }

    #[test]
    fn changed_cell_writes_only_its_span() {
        let mut renderer = ScreenRenderer::new();
        renderer.render(&["abc", "def"]);
        let (stats, output) = render_frame(&mut renderer, &["abc", "dxf"]);

        assert_eq!(stats.rows_changed, 1);
        assert_eq!(stats.rows_skipped, 1);
        assert_eq!(stats.spans_written, 1);
        assert_eq!(output, "\x1b[?2026h\x1b[2;2Hx\x1b[0m\x1b[?2026l");
    }

    #[test]
    fn styled_tile_change_keeps_its_color() {
        let old = format!("│ {GREEN}2   \x1b[39m │");
        let new = format!("│ {GREEN}4   \x1b[39m │");
        let mut renderer = ScreenRenderer::new();
        renderer.render(&[old.as_str()]);
        let (_, output) = render_frame(&mut renderer, &[new.as_str()]);

        // Only the digit differs; it is re-established inside its color.
        assert_eq!(
            output,
            format!("\x1b[?2026h\x1b[1;3H{GREEN}4\x1b[39m\x1b[0m\x1b[?2026l")
        );
    }

    #[test]
    fn shrinking_row_is_cleared_past_its_end() {
        let mut renderer = ScreenRenderer::new();
        renderer.render(&["abcd"]);
        let (stats, output) = render_frame(&mut renderer, &["ab"]);

        assert_eq!(stats.rows_changed, 1);
        assert_eq!(output, "\x1b[?2026h\x1b[1;1Hab\x1b[K\x1b[0m\x1b[?2026l");
    }

    #[test]
    fn row_count_change_redraws() {
        let mut renderer = ScreenRenderer::new();
        renderer.render(&["ab"]);
        let (stats, output) = render_frame(&mut renderer, &["ab", "cd"]);

        assert!(stats.full_redraw);
        assert!(output.contains("\x1b[2J"));
    }

    #[test]
    fn force_redraw_draws_everything_again() {
        let mut renderer = ScreenRenderer::new();
        renderer.render(&["ab"]);
        renderer.force_redraw();
        let (stats, _) = render_frame(&mut renderer, &["ab"]);

        assert!(stats.full_redraw);
        assert_eq!(stats.rows_changed, 1);
    }

    #[test]
    fn origin_change_redraws_at_new_position() {
        let mut renderer = ScreenRenderer::new();
        renderer.render(&["ab"]);
        renderer.set_origin(3, 2);
        let (stats, output) = render_frame(&mut renderer, &["ab"]);

        assert!(stats.full_redraw);
        assert!(output.contains("\x1b[3;4Hab"));
    }

    #[test]
    fn same_origin_keeps_differential_mode() {
        let mut renderer = ScreenRenderer::new();
        renderer.set_origin(3, 2);
        renderer.render(&["ab"]);
        renderer.set_origin(3, 2);
        let (stats, _) = render_frame(&mut renderer, &["ab"]);

        assert!(!stats.full_redraw);
    }

    #[test]
    fn bytes_written_matches_output() {
        let mut renderer = ScreenRenderer::new();
        let (stats, output) = render_frame(&mut renderer, &["hello"]);
        assert_eq!(stats.bytes_written, output.len());
    }

    #[test]
    fn flush_to_drains_output() {
        let mut renderer = ScreenRenderer::new();
        renderer.render(&["ab"]);
        let mut dest = Vec::new();
        renderer.flush_to(&mut dest).unwrap();
        assert!(!dest.is_empty());
        assert!(renderer.output_bytes().is_empty());
    }

    #[test]
    fn previous_frame_tracks_shrinking_and_growing_frames() {
        let mut renderer = ScreenRenderer::new();
        renderer.render(&["a", "b", "c"]);
        renderer.render(&["a"]);
        renderer.render(&["a", "z"]);
        let (stats, _) = render_frame(&mut renderer, &["a", "z"]);
        assert_eq!(stats.rows_skipped, 2);
    }
}
