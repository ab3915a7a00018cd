// SPDX-License-Identifier: MIT
//
// Top-level error: everything that can stop the game before or while it
// runs. `main` prints it once and exits with status 1.

use std::io;

use thiserror::Error;

use n_game::grid::GridError;

use crate::config::ConfigError;
use crate::logging::LogError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Logging(#[from] LogError),
    #[error(transparent)]
    Game(#[from] GridError),
    #[error("stdin is not a terminal")]
    NotATerminal,
    #[error("terminal: {0}")]
    Terminal(#[from] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn messages() {
        assert_eq!(
            AppError::from(ConfigError::Size(12)).to_string(),
            "--size must be between 2 and 8, got 12"
        );
        assert_eq!(
            AppError::from(io::Error::other("raw mode failed")).to_string(),
            "terminal: raw mode failed"
        );
        assert_eq!(AppError::NotATerminal.to_string(), "stdin is not a terminal");
    }
}
