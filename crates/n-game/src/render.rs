//! Board → frame lines.
//!
//! A frame is a header line, three lines per grid row (box top, value, box
//! bottom), and a footer line. All lines have the same visible width, and
//! the line count depends only on the grid size, so consecutive frames of
//! one game can always be diffed row by row.
//!
//! ```text
//! score 24  best 16  moves 9
//!  ┌──────┐┌──────┐┌──────┐┌──────┐
//!  │ 2    ││      ││ 16   ││ 4    │
//!  └──────┘└──────┘└──────┘└──────┘
//!  ...
//! arrows move  r restart  q quit
//! ```

use std::fmt::Write as _;

use n_term::ansi;

use crate::game::{Game, Status};
use crate::grid::Tile;
use crate::palette;

/// Visible columns of one tile box, borders included.
pub const TILE_WIDTH: usize = 8;

/// Visible columns of a tile's label.
pub const LABEL_WIDTH: usize = 4;

/// Narrowest frame, wide enough for every footer message.
pub const MIN_WIDTH: usize = 34;

const TILE_TOP: &str = "┌──────┐";
const TILE_BOTTOM: &str = "└──────┘";

const HELP: &str = "arrows move  r restart  q quit";
const GAME_OVER: &str = "game over  r restart  q quit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Paint tile labels in their palette colour.
    pub color: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { color: true }
    }
}

/// Number of lines [`render_board`] produces for a grid of `size`.
#[must_use]
pub const fn frame_height(size: usize) -> usize {
    size * 3 + 2
}

/// Visible width of every line [`render_board`] produces for a grid of `size`.
#[must_use]
pub const fn frame_width(size: usize) -> usize {
    let board = size * TILE_WIDTH;
    if board > MIN_WIDTH { board } else { MIN_WIDTH }
}

/// Render `game` as frame lines.
#[must_use]
pub fn render_board(game: &Game, options: &RenderOptions) -> Vec<String> {
    let size = game.grid().size();
    let width = frame_width(size);
    let left = (width - size * TILE_WIDTH) / 2;
    let right = width - size * TILE_WIDTH - left;

    let mut lines = Vec::with_capacity(frame_height(size));
    lines.push(fit(
        &format!(
            "score {}  best {}  moves {}",
            game.score(),
            game.best_tile(),
            game.moves()
        ),
        width,
    ));

    let top = TILE_TOP.repeat(size);
    let bottom = TILE_BOTTOM.repeat(size);
    for row in game.grid().rows() {
        lines.push(pad(&top, left, right));
        lines.push(pad(&value_line(row, options), left, right));
        lines.push(pad(&bottom, left, right));
    }

    lines.push(fit(&footer(game), width));
    lines
}

/// The label shown inside a tile, at most [`LABEL_WIDTH`] columns.
///
/// ```
/// use n_game::render::tile_label;
///
/// assert_eq!(tile_label(None), "");
/// assert_eq!(tile_label(Some(2048)), "2048");
/// assert_eq!(tile_label(Some(16384)), "16k");
/// ```
#[must_use]
pub fn tile_label(tile: Tile) -> String {
    match tile {
        None => String::new(),
        Some(v) if v < 10_000 => v.to_string(),
        Some(v) if v < 1_000_000 => format!("{}k", v / 1_000),
        Some(v) if v < 1_000_000_000 => format!("{}m", v / 1_000_000),
        Some(v) => format!("{}g", v / 1_000_000_000),
    }
}

fn value_line(row: &[Tile], options: &RenderOptions) -> String {
    let mut line = String::new();
    for &tile in row {
        let label = format!("{:<LABEL_WIDTH$}", tile_label(tile));
        let label = if options.color {
            ansi::paint_fg(&label, palette::tile_color(tile))
        } else {
            label
        };
        let _ = write!(line, "│ {label} │");
    }
    line
}

fn footer(game: &Game) -> String {
    match game.status() {
        Status::Playing => HELP.to_owned(),
        Status::Won => format!("{} reached! c continue  q quit", game.target()),
        Status::Over => GAME_OVER.to_owned(),
    }
}

/// Pad or cut plain ASCII text to exactly `width` columns.
fn fit(text: &str, width: usize) -> String {
    let cut: String = text.chars().take(width).collect();
    format!("{cut:<width$}")
}

fn pad(line: &str, left: usize, right: usize) -> String {
    format!("{}{line}{}", " ".repeat(left), " ".repeat(right))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
