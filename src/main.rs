// SPDX-License-Identifier: MIT
//
// n-2048: 2048 in the terminal.
//
// This is the main binary that wires together the two crates:
//
//   n-game → grid, moves, spawns, score, board-to-lines rendering
//   n-term → terminal control, line diffing, input parsing, event loop
//
// GameApp implements n-term's App trait. Each keypress flows through:
//
//   stdin → parser → on_event → Game::step
//   paint → render_board → line diff → changed spans → terminal
//
// Layout (centered on screen):
//
//   score 24  best 16  moves 9          ← header
//   ┌──────┐┌──────┐┌──────┐┌──────┐
//   │ 2    ││      ││ 16   ││ 4    │    ← 3 rows per grid row
//   └──────┘└──────┘└──────┘└──────┘
//   ...
//   arrows move  r restart  q quit      ← footer

mod app;
mod config;
mod error;
mod logging;

use std::process;

use clap::Parser;

use n_game::game::Game;
use n_term::event_loop::EventLoop;
use n_term::terminal;

use crate::app::GameApp;
use crate::config::Config;
use crate::error::AppError;

fn main() {
    let config = Config::parse();

    if let Err(e) = run(&config) {
        eprintln!("n-2048: {e}");
        process::exit(1);
    }
}

fn run(config: &Config) -> Result<(), AppError> {
    config.validate()?;
    let _guard = logging::init(config)?;

    if !terminal::is_tty() {
        return Err(AppError::NotATerminal);
    }

    let game = Game::new(config.game_config())?;
    let mut app = GameApp::new(game, config.render_options());

    let mut event_loop = EventLoop::new();
    let size = event_loop.size();
    tracing::debug!(cols = size.cols, rows = size.rows, "terminal ready");

    event_loop.run(&mut app)?;

    let game = app.game();
    tracing::info!(
        score = game.score(),
        moves = game.moves(),
        best = game.best_tile(),
        "exit"
    );
    Ok(())
}
