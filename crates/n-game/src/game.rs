//! One game of 2048: a grid plus the rules around it.
//!
//! [`Game`] owns the board, the random source for spawns, and the running
//! totals. A move goes through [`Game::step`], which shifts the grid, spawns
//! a tile if anything moved, and updates [`Status`].
//!
//! Randomness comes from a seeded [`StdRng`]. The seed is either given in
//! [`GameConfig`] or drawn once from the OS and logged, so any game can be
//! replayed.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::grid::{DEFAULT_SIZE, Direction, Grid, GridError};

/// The classic winning tile.
pub const DEFAULT_TARGET: u32 = 2048;

/// Tiles on a fresh board.
pub const INITIAL_TILES: usize = 2;

/// Chance that a spawned tile is a 2 rather than a 4.
pub const SPAWN_TWO_PROBABILITY: f64 = 0.9;

// ---------------------------------------------------------------------------
// Config / status
// ---------------------------------------------------------------------------

/// Parameters fixed for the lifetime of a [`Game`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameConfig {
    pub size: usize,
    pub target: u32,
    /// `None` draws a seed from the OS.
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_SIZE,
            target: DEFAULT_TARGET,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    Playing,
    /// The target tile was reached. Moves are ignored until
    /// [`Game::keep_playing`] or [`Game::restart`].
    Won,
    /// No move can change the board.
    Over,
}

/// What a [`Game::step`] did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepOutcome {
    pub moved: bool,
    /// Points gained by this step.
    pub gained: u64,
    /// `(x, y)` of tiles created by merges.
    pub merged: Vec<(usize, usize)>,
    /// `(x, y, value)` of the spawned tile.
    pub spawned: Option<(usize, usize, u32)>,
    /// Status after the step.
    pub status: Status,
}

// ---------------------------------------------------------------------------
// Game
// ---------------------------------------------------------------------------

pub struct Game {
    grid: Grid,
    rng: StdRng,
    seed: u64,
    score: u64,
    moves: u32,
    status: Status,
    target: u32,
    /// Set once the target has been reached, so the win is announced once.
    reached_target: bool,
    last_spawn: Option<(usize, usize)>,
}

impl Game {
    /// A fresh game with [`INITIAL_TILES`] tiles on the board.
    ///
    /// # Errors
    ///
    /// [`GridError::InvalidSize`] when `config.size` is out of range.
    pub fn new(config: GameConfig) -> Result<Self, GridError> {
        let grid = Grid::new(config.size)?;
        let seed = config.seed.unwrap_or_else(rand::random);
        tracing::info!(size = config.size, target_tile = config.target, seed, "new game");

        let mut game = Self::from_grid(grid, config.target, seed);
        game.populate();
        Ok(game)
    }

    /// Resume play on an existing board with zero score and move count.
    #[must_use]
    pub fn from_grid(grid: Grid, target: u32, seed: u64) -> Self {
        let mut game = Self {
            grid,
            rng: StdRng::seed_from_u64(seed),
            seed,
            score: 0,
            moves: 0,
            status: Status::Playing,
            target,
            reached_target: false,
            last_spawn: None,
        };
        game.refresh_status();
        game
    }

    // -- accessors ----------------------------------------------------------

    #[inline]
    #[must_use]
    pub const fn grid(&self) -> &Grid {
        &self.grid
    }

    #[inline]
    #[must_use]
    pub const fn score(&self) -> u64 {
        self.score
    }

    #[inline]
    #[must_use]
    pub const fn moves(&self) -> u32 {
        self.moves
    }

    #[inline]
    #[must_use]
    pub const fn status(&self) -> Status {
        self.status
    }

    #[inline]
    #[must_use]
    pub const fn target(&self) -> u32 {
        self.target
    }

    #[inline]
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Where the most recent tile appeared.
    #[inline]
    #[must_use]
    pub const fn last_spawn(&self) -> Option<(usize, usize)> {
        self.last_spawn
    }

    /// Largest tile on the board, 0 when empty.
    #[must_use]
    pub fn best_tile(&self) -> u32 {
        self.grid.max_tile().unwrap_or(0)
    }

    // -- play ---------------------------------------------------------------

    /// Play one move.
    ///
    /// Outside [`Status::Playing`] this does nothing. A shift that changes no
    /// cell counts for nothing: no score, no spawn, no move.
    pub fn step(&mut self, direction: Direction) -> StepOutcome {
        if self.status != Status::Playing {
            return StepOutcome {
                status: self.status,
                ..StepOutcome::default()
            };
        }

        let shift = self.grid.shift(direction);
        if !shift.moved {
            tracing::trace!(?direction, "blocked move");
            return StepOutcome {
                status: self.status,
                ..StepOutcome::default()
            };
        }

        self.score += shift.score;
        self.moves += 1;
        let spawned = self.spawn();
        self.refresh_status();

        tracing::debug!(
            ?direction,
            gained = shift.score,
            score = self.score,
            merges = shift.merged.len(),
            ?spawned,
            status = ?self.status,
            "move"
        );

        StepOutcome {
            moved: true,
            gained: shift.score,
            merged: shift.merged,
            spawned,
            status: self.status,
        }
    }

    /// Continue after a win. The win is not announced again.
    pub fn keep_playing(&mut self) {
        if self.status == Status::Won {
            self.status = if self.grid.has_moves() {
                Status::Playing
            } else {
                Status::Over
            };
            tracing::debug!(status = ?self.status, "continuing past target");
        }
    }

    /// Start over on an empty board of the same size.
    ///
    /// The random source carries on, so the new board differs from the
    /// first one.
    pub fn restart(&mut self) {
        self.grid.clear();
        self.score = 0;
        self.moves = 0;
        self.status = Status::Playing;
        self.reached_target = false;
        self.last_spawn = None;
        self.populate();
        tracing::info!("restart");
    }

    // -- internals ----------------------------------------------------------

    fn populate(&mut self) {
        for _ in 0..INITIAL_TILES {
            self.spawn();
        }
        self.refresh_status();
    }

    /// Put a 2 (or occasionally a 4) on a random empty cell.
    fn spawn(&mut self) -> Option<(usize, usize, u32)> {
        let &(x, y) = self.grid.empty_cells().choose(&mut self.rng)?;
        let value = if self.rng.gen_bool(SPAWN_TWO_PROBABILITY) { 2 } else { 4 };
        self.grid.place(x, y, value).ok()?;
        self.last_spawn = Some((x, y));
        Some((x, y, value))
    }

    fn refresh_status(&mut self) {
        if !self.reached_target && self.best_tile() >= self.target {
            self.reached_target = true;
            self.status = Status::Won;
            tracing::info!(target_tile = self.target, score = self.score, "target reached");
        } else if !self.grid.has_moves() {
            self.status = Status::Over;
            tracing::info!(score = self.score, moves = self.moves, "game over");
        }
    }
}

impl std::fmt::Debug for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Game")
            .field("score", &self.score)
            .field("moves", &self.moves)
            .field("status", &self.status)
            .field("target", &self.target)
            .field("seed", &self.seed)
            .field("grid", &self.grid)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
