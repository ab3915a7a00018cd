//! The 2048 game model.
//!
//! [`grid`] holds the board and the slide-and-merge rule, [`game`] wraps it
//! with spawns, score and win/lose tracking, and [`render`] turns a game into
//! styled frame lines for `n_term`'s renderer, coloured by [`palette`].

pub mod game;
pub mod grid;
pub mod palette;
pub mod render;

pub use game::{Game, GameConfig, Status, StepOutcome};
pub use grid::{Direction, Grid, GridError};
pub use render::{RenderOptions, render_board};
