//! The square board and the slide-and-merge rule.
//!
//! A [`Grid`] is `size × size` cells, each empty or holding a tile value.
//! Coordinates are `(x, y)`, 0-indexed, `x` growing to the right and `y`
//! growing downward, so row 0 is the top of the board.
//!
//! Every move reduces to one operation on a single line of cells,
//! [`slide_line`]: pack the tiles toward the front, then merge equal
//! neighbours once each. [`Grid::shift`] reads each row or column in the
//! direction of travel, slides it, and writes it back.

use thiserror::Error;

/// Smallest supported board edge.
pub const MIN_SIZE: usize = 2;
/// Largest supported board edge.
pub const MAX_SIZE: usize = 8;
/// The classic board.
pub const DEFAULT_SIZE: usize = 4;

/// A cell: empty, or a tile value (a power of two).
pub type Tile = Option<u32>;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("grid size {0} is out of range ({MIN_SIZE}..={MAX_SIZE})")]
    InvalidSize(usize),
    #[error("row {row} has {len} cells, expected {size}")]
    NotSquare { row: usize, len: usize, size: usize },
    #[error("cell ({x}, {y}) is outside a {size}x{size} grid")]
    OutOfBounds { x: usize, y: usize, size: usize },
}

// ---------------------------------------------------------------------------
// Direction
// ---------------------------------------------------------------------------

/// The way tiles travel on a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Self; 4] = [Self::Up, Self::Down, Self::Left, Self::Right];
}

// ---------------------------------------------------------------------------
// slide_line
// ---------------------------------------------------------------------------

/// The result of sliding one line toward index 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideResult {
    /// The line after the slide, same length as the input.
    pub cells: Vec<Tile>,
    /// Sum of the values created by merges.
    pub score: u64,
    /// Indices in `cells` that hold a freshly merged tile.
    pub merged: Vec<usize>,
}

/// Slide `line` toward index 0.
///
/// Tiles pack together in order; each pair of equal neighbours merges into
/// one tile of twice the value, and a merged tile does not merge again in
/// the same slide. Scanning starts at the front, so `[2, 2, 2]` becomes
/// `[4, 2]` and `[2, 2, 4, 4]` becomes `[4, 8]`.
///
/// ```
/// use n_game::grid::slide_line;
///
/// let out = slide_line(&[Some(2), None, Some(2), Some(4)]);
/// assert_eq!(out.cells, [Some(4), Some(4), None, None]);
/// assert_eq!(out.score, 4);
/// assert_eq!(out.merged, [0]);
/// ```
#[must_use]
pub fn slide_line(line: &[Tile]) -> SlideResult {
    let mut cells: Vec<Tile> = Vec::with_capacity(line.len());
    let mut merged = Vec::new();
    let mut score = 0;
    let mut last_was_merge = false;

    for value in line.iter().flatten().copied() {
        match cells.last_mut() {
            Some(Some(prev)) if *prev == value && !last_was_merge => {
                *prev = value.saturating_mul(2);
                score += u64::from(*prev);
                merged.push(cells.len() - 1);
                last_was_merge = true;
            }
            _ => {
                cells.push(Some(value));
                last_was_merge = false;
            }
        }
    }

    cells.resize(line.len(), None);
    SlideResult {
        cells,
        score,
        merged,
    }
}

// ---------------------------------------------------------------------------
// Grid
// ---------------------------------------------------------------------------

/// What a [`Grid::shift`] did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MoveOutcome {
    /// Whether any cell changed.
    pub moved: bool,
    /// Points scored by merges.
    pub score: u64,
    /// `(x, y)` of every tile created by a merge.
    pub merged: Vec<(usize, usize)>,
}

/// A square board of tiles, stored row-major.
#[derive(Clone, PartialEq, Eq)]
pub struct Grid {
    size: usize,
    cells: Vec<Tile>,
}

impl Grid {
    /// An empty `size × size` grid.
    ///
    /// # Errors
    ///
    /// [`GridError::InvalidSize`] unless `MIN_SIZE <= size <= MAX_SIZE`.
    pub fn new(size: usize) -> Result<Self, GridError> {
        if !(MIN_SIZE..=MAX_SIZE).contains(&size) {
            return Err(GridError::InvalidSize(size));
        }
        Ok(Self {
            size,
            cells: vec![None; size * size],
        })
    }

    /// A grid from explicit rows, top to bottom.
    ///
    /// # Errors
    ///
    /// [`GridError::InvalidSize`] for a bad row count,
    /// [`GridError::NotSquare`] when a row's length differs from the count.
    pub fn from_rows<R: AsRef<[Tile]>>(rows: &[R]) -> Result<Self, GridError> {
        let mut grid = Self::new(rows.len())?;
        for (y, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != grid.size {
                return Err(GridError::NotSquare {
                    row: y,
                    len: row.len(),
                    size: grid.size,
                });
            }
            grid.cells[y * grid.size..(y + 1) * grid.size].copy_from_slice(row);
        }
        Ok(grid)
    }

    /// Edge length.
    #[inline]
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// The tile at `(x, y)`; `None` when empty or out of bounds.
    #[must_use]
    pub fn get(&self, x: usize, y: usize) -> Tile {
        if x < self.size && y < self.size {
            self.cells[y * self.size + x]
        } else {
            None
        }
    }

    /// Put `value` at `(x, y)`, replacing whatever was there.
    ///
    /// # Errors
    ///
    /// [`GridError::OutOfBounds`] for coordinates past the edge.
    pub fn place(&mut self, x: usize, y: usize, value: u32) -> Result<(), GridError> {
        if x >= self.size || y >= self.size {
            return Err(GridError::OutOfBounds {
                x,
                y,
                size: self.size,
            });
        }
        self.cells[y * self.size + x] = Some(value);
        Ok(())
    }

    /// Empty every cell.
    pub fn clear(&mut self) {
        self.cells.fill(None);
    }

    /// Rows top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Tile]> {
        self.cells.chunks(self.size)
    }

    /// `(x, y)` of every empty cell, row by row.
    #[must_use]
    pub fn empty_cells(&self) -> Vec<(usize, usize)> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.is_none())
            .map(|(i, _)| (i % self.size, i / self.size))
            .collect()
    }

    /// The largest tile on the board.
    #[must_use]
    pub fn max_tile(&self) -> Option<u32> {
        self.cells.iter().flatten().copied().max()
    }

    /// Sum of all tile values.
    #[must_use]
    pub fn tile_sum(&self) -> u64 {
        self.cells.iter().flatten().map(|&v| u64::from(v)).sum()
    }

    /// Whether some move would change the board: an empty cell exists, or two
    /// equal tiles touch horizontally or vertically.
    #[must_use]
    pub fn has_moves(&self) -> bool {
        if self.cells.iter().any(Option::is_none) {
            return true;
        }
        (0..self.size).any(|y| {
            (0..self.size).any(|x| {
                let here = self.get(x, y);
                (x + 1 < self.size && here == self.get(x + 1, y))
                    || (y + 1 < self.size && here == self.get(x, y + 1))
            })
        })
    }

    /// Slide every line toward `direction`.
    pub fn shift(&mut self, direction: Direction) -> MoveOutcome {
        let mut outcome = MoveOutcome::default();

        for lane in 0..self.size {
            let coords = self.lane(direction, lane);
            let line: Vec<Tile> = coords.iter().map(|&(x, y)| self.get(x, y)).collect();
            let slid = slide_line(&line);

            if slid.cells != line {
                outcome.moved = true;
                for (&(x, y), &cell) in coords.iter().zip(&slid.cells) {
                    self.cells[y * self.size + x] = cell;
                }
            }
            outcome.score += slid.score;
            outcome.merged.extend(slid.merged.iter().map(|&i| coords[i]));
        }

        outcome
    }

    /// Coordinates of lane `index`, ordered from the edge tiles travel
    /// toward.
    fn lane(&self, direction: Direction, index: usize) -> Vec<(usize, usize)> {
        let n = self.size;
        match direction {
            Direction::Left => (0..n).map(|x| (x, index)).collect(),
            Direction::Right => (0..n).rev().map(|x| (x, index)).collect(),
            Direction::Up => (0..n).map(|y| (index, y)).collect(),
            Direction::Down => (0..n).rev().map(|y| (index, y)).collect(),
        }
    }
}

impl std::fmt::Debug for Grid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Grid {}x{}", self.size, self.size)?;
        for row in self.rows() {
            for cell in row {
                match cell {
                    Some(v) => write!(f, "{v:>6}")?,
                    None => write!(f, "{:>6}", ".")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Parse a compact line: `"2 . 2 4"` → `[Some(2), None, Some(2), Some(4)]`.
    fn line(s: &str) -> Vec<Tile> {
        s.split_whitespace()
            .map(|t| if t == "." { None } else { Some(t.parse().unwrap()) })
            .collect()
    }

    fn grid(rows: &[&str]) -> Grid {
        let rows: Vec<Vec<Tile>> = rows.iter().map(|r| line(r)).collect();
        Grid::from_rows(&rows).unwrap()
    }

    // -- slide_line ---------------------------------------------------------

    #[test]
    fn slide_packs_toward_front() {
        assert_eq!(slide_line(&line(". 2 . 4")).cells, line("2 4 . ."));
    }

    #[test]
    fn slide_merges_pair() {
        let out = slide_line(&line("2 2 . ."));
        assert_eq!(out.cells, line("4 . . ."));
        assert_eq!(out.score, 4);
        assert_eq!(out.merged, [0]);
    }

    #[test]
    fn slide_merges_two_pairs() {
        let out = slide_line(&line("2 2 4 4"));
        assert_eq!(out.cells, line("4 8 . ."));
        assert_eq!(out.score, 12);
        assert_eq!(out.merged, [0, 1]);
    }

    #[test]
    fn slide_three_equal_merges_front_pair() {
        assert_eq!(slide_line(&line("2 2 2 .")).cells, line("4 2 . ."));
    }

    #[test]
    fn slide_four_equal_makes_two_merges() {
        assert_eq!(slide_line(&line("2 2 2 2")).cells, line("4 4 . ."));
    }

    #[test]
    fn merged_tile_does_not_merge_again() {
        let out = slide_line(&line("4 4 8 ."));
        assert_eq!(out.cells, line("8 8 . ."));
        assert_eq!(out.score, 8);
    }

    #[test]
    fn slide_across_gaps() {
        assert_eq!(slide_line(&line("2 . . 2")).cells, line("4 . . ."));
    }

    #[test]
    fn slide_unequal_neighbours_stay() {
        let out = slide_line(&line("2 4 2 4"));
        assert_eq!(out.cells, line("2 4 2 4"));
        assert_eq!(out.score, 0);
        assert!(out.merged.is_empty());
    }

    #[test]
    fn slide_empty_line() {
        assert_eq!(slide_line(&line(". . . .")).cells, line(". . . ."));
    }

    // -- construction -------------------------------------------------------

    #[test]
    fn new_rejects_bad_sizes() {
        assert_eq!(Grid::new(1), Err(GridError::InvalidSize(1)));
        assert_eq!(Grid::new(9), Err(GridError::InvalidSize(9)));
        assert!(Grid::new(MIN_SIZE).is_ok());
        assert!(Grid::new(MAX_SIZE).is_ok());
    }

    #[test]
    fn from_rows_rejects_ragged_rows() {
        let rows = vec![line("2 ."), line("2")];
        assert_eq!(
            Grid::from_rows(&rows),
            Err(GridError::NotSquare { row: 1, len: 1, size: 2 })
        );
    }

    #[test]
    fn place_and_get() {
        let mut g = Grid::new(4).unwrap();
        g.place(3, 1, 8).unwrap();
        assert_eq!(g.get(3, 1), Some(8));
        assert_eq!(g.get(1, 3), None);
        assert_eq!(g.get(9, 9), None);
        assert_eq!(
            g.place(4, 0, 2),
            Err(GridError::OutOfBounds { x: 4, y: 0, size: 4 })
        );
    }

    #[test]
    fn error_messages() {
        assert_eq!(
            GridError::InvalidSize(12).to_string(),
            "grid size 12 is out of range (2..=8)"
        );
    }

    // -- queries ------------------------------------------------------------

    #[test]
    fn empty_cells_in_row_order() {
        let g = grid(&["2 .", ". 4"]);
        assert_eq!(g.empty_cells(), [(1, 0), (0, 1)]);
    }

    #[test]
    fn max_tile_and_sum() {
        let g = grid(&["2 .", "16 4"]);
        assert_eq!(g.max_tile(), Some(16));
        assert_eq!(g.tile_sum(), 22);
        assert_eq!(Grid::new(2).unwrap().max_tile(), None);
    }

    #[test]
    fn has_moves_with_empty_cell() {
        assert!(grid(&["2 4", "8 ."]).has_moves());
    }

    #[test]
    fn has_moves_with_horizontal_pair() {
        assert!(grid(&["2 2", "4 8"]).has_moves());
    }

    #[test]
    fn has_moves_with_vertical_pair() {
        assert!(grid(&["2 4", "2 8"]).has_moves());
    }

    #[test]
    fn locked_board_has_no_moves() {
        assert!(!grid(&["2 4", "4 2"]).has_moves());
    }

    // -- shift --------------------------------------------------------------

    #[test]
    fn shift_left() {
        let mut g = grid(&["2 2 . 4", ". . . .", "4 . 4 4", "2 4 8 16"]);
        let out = g.shift(Direction::Left);
        assert_eq!(g, grid(&["4 4 . .", ". . . .", "8 4 . .", "2 4 8 16"]));
        assert!(out.moved);
        assert_eq!(out.score, 12);
        assert_eq!(out.merged, [(0, 0), (0, 2)]);
    }

    #[test]
    fn shift_right() {
        let mut g = grid(&["2 2 . 4", "4 . 4 4", ". . . .", ". . . ."]);
        g.shift(Direction::Right);
        assert_eq!(g, grid(&[". . 4 4", ". . 4 8", ". . . .", ". . . ."]));
    }

    #[test]
    fn shift_up() {
        let mut g = grid(&["2 .", "2 4"]);
        let out = g.shift(Direction::Up);
        assert_eq!(g, grid(&["4 4", ". ."]));
        assert_eq!(out.merged, [(0, 0)]);
    }

    #[test]
    fn shift_down() {
        let mut g = grid(&["2 4 .", "2 . .", ". . ."]);
        let out = g.shift(Direction::Down);
        assert_eq!(g, grid(&[". . .", ". . .", "4 4 ."]));
        assert_eq!(out.merged, [(0, 2)]);
    }

    #[test]
    fn blocked_shift_reports_no_move() {
        let mut g = grid(&["2 4", ". ."]);
        let before = g.clone();
        let out = g.shift(Direction::Up);
        assert_eq!(out, MoveOutcome::default());
        assert_eq!(g, before);
    }

    // -- properties ---------------------------------------------------------

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn tile() -> impl Strategy<Value = Tile> {
            prop_oneof![
                2 => Just(None),
                3 => (1u32..=6).prop_map(|e| Some(1 << e)),
            ]
        }

        fn any_grid() -> impl Strategy<Value = Grid> {
            (MIN_SIZE..=5).prop_flat_map(|n| {
                proptest::collection::vec(proptest::collection::vec(tile(), n), n)
                    .prop_map(|rows| Grid::from_rows(&rows).unwrap())
            })
        }

        fn direction() -> impl Strategy<Value = Direction> {
            proptest::sample::select(Direction::ALL.to_vec())
        }

        proptest! {
            #[test]
            fn shift_conserves_tile_sum(mut g in any_grid(), dir in direction()) {
                let before = g.tile_sum();
                g.shift(dir);
                prop_assert_eq!(g.tile_sum(), before);
            }

            #[test]
            fn moved_iff_changed(mut g in any_grid(), dir in direction()) {
                let before = g.clone();
                let out = g.shift(dir);
                prop_assert_eq!(out.moved, g != before);
            }

            #[test]
            fn each_merge_removes_one_tile(mut g in any_grid(), dir in direction()) {
                let count = |g: &Grid| g.rows().flatten().flatten().count();
                let before = count(&g);
                let out = g.shift(dir);
                prop_assert_eq!(count(&g) + out.merged.len(), before);
            }

            #[test]
            fn score_is_sum_of_merged_tiles(mut g in any_grid(), dir in direction()) {
                let out = g.shift(dir);
                let merged: u64 = out
                    .merged
                    .iter()
                    .map(|&(x, y)| u64::from(g.get(x, y).unwrap()))
                    .sum();
                prop_assert_eq!(out.score, merged);
            }

            #[test]
            fn has_moves_agrees_with_shift(g in any_grid()) {
                prop_assume!(g.max_tile().is_some());
                let any_moves = Direction::ALL.iter().any(|&dir| g.clone().shift(dir).moved);
                prop_assert_eq!(g.has_moves(), any_moves);
            }
        }
    }
}
