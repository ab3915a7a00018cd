// SPDX-License-Identifier: MIT
//
// GameApp: the glue between the event loop and the game model.
//
// Keys map to a small command set; commands drive `Game`; `paint` hands
// the board's lines to the renderer, which diffs them against the previous
// frame. The app never touches the terminal itself.

use n_game::game::{Game, Status};
use n_game::grid::Direction;
use n_game::render::{RenderOptions, render_board};

use n_term::event_loop::{Action, App};
use n_term::input::{Event, KeyCode, KeyEvent, Modifiers};

/// What a key asks the game to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Move(Direction),
    Restart,
    KeepPlaying,
    Quit,
}

impl Command {
    /// Arrows, `wasd` and `hjkl` move; `r` restarts; `c` continues after a
    /// win; `q`, Esc and Ctrl-C quit. Other Ctrl/Alt chords are ignored.
    fn from_key(key: &KeyEvent) -> Option<Self> {
        if key.is_ctrl('c') {
            return Some(Self::Quit);
        }
        if key.modifiers.intersects(Modifiers::CTRL | Modifiers::ALT | Modifiers::SUPER) {
            return None;
        }

        let command = match key.code {
            KeyCode::Up | KeyCode::Char('w' | 'k') => Self::Move(Direction::Up),
            KeyCode::Down | KeyCode::Char('s' | 'j') => Self::Move(Direction::Down),
            KeyCode::Left | KeyCode::Char('a' | 'h') => Self::Move(Direction::Left),
            KeyCode::Right | KeyCode::Char('d' | 'l') => Self::Move(Direction::Right),
            KeyCode::Char('r') => Self::Restart,
            KeyCode::Char('c') => Self::KeepPlaying,
            KeyCode::Char('q') | KeyCode::Escape => Self::Quit,
            _ => return None,
        };
        Some(command)
    }
}

pub struct GameApp {
    game: Game,
    options: RenderOptions,
}

impl GameApp {
    #[must_use]
    pub const fn new(game: Game, options: RenderOptions) -> Self {
        Self { game, options }
    }

    #[must_use]
    pub const fn game(&self) -> &Game {
        &self.game
    }

    fn apply(&mut self, command: Command) -> Action {
        match command {
            Command::Move(direction) => {
                let outcome = self.game.step(direction);
                tracing::debug!(
                    ?direction,
                    moved = outcome.moved,
                    gained = outcome.gained,
                    score = self.game.score(),
                    status = ?outcome.status,
                    "key move"
                );
            }
            Command::Restart => self.game.restart(),
            Command::KeepPlaying => {
                if self.game.status() == Status::Won {
                    self.game.keep_playing();
                }
            }
            Command::Quit => {
                tracing::info!(
                    score = self.game.score(),
                    moves = self.game.moves(),
                    best = self.game.best_tile(),
                    "quit"
                );
                return Action::Quit;
            }
        }
        Action::Continue
    }
}

impl App for GameApp {
    fn on_event(&mut self, event: &Event) -> Action {
        let Event::Key(key) = event;
        match Command::from_key(key) {
            Some(command) => self.apply(command),
            None => {
                tracing::trace!(?key, "unbound key");
                Action::Continue
            }
        }
    }

    fn paint(&mut self) -> Vec<String> {
        render_board(&self.game, &self.options)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
