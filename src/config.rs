// SPDX-License-Identifier: MIT
//
// Command-line configuration.
//
// Everything the game can be told at startup comes in as flags. Parsing is
// clap's job; `validate` then checks the rules clap can't express (a target
// that is a power of two, a grid size the model supports) before any of it
// reaches the terminal.

use std::path::PathBuf;

use clap::Parser;
use thiserror::Error;

use n_game::game::{DEFAULT_TARGET, GameConfig};
use n_game::grid::{DEFAULT_SIZE, MAX_SIZE, MIN_SIZE};
use n_game::render::RenderOptions;

/// Environment variable that overrides `--log-level`.
pub const LOG_ENV: &str = "N2048_LOG";

/// Smallest winning tile accepted by `--target`.
pub const MIN_TARGET: u32 = 8;

#[derive(Debug, Clone, Parser)]
#[command(name = "n-2048", version, about = "2048 in the terminal")]
pub struct Config {
    /// Board edge length.
    #[arg(long, short = 's', value_name = "N", default_value_t = DEFAULT_SIZE)]
    pub size: usize,

    /// Tile that wins the game (a power of two, at least 8).
    #[arg(long, short = 't', value_name = "TILE", default_value_t = DEFAULT_TARGET)]
    pub target: u32,

    /// Seed for tile spawns. Random when omitted; the seed in use is logged.
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// Draw the board without colours. `NO_COLOR` has the same effect.
    #[arg(long = "no-color", default_value_t = false)]
    pub no_color: bool,

    /// Append logs to this file. Nothing is logged without it.
    #[arg(long = "log-file", value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `info,n_term=trace`. `N2048_LOG` wins
    /// over this flag.
    #[arg(long = "log-level", value_name = "FILTER", default_value = "info")]
    pub log_level: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("--size must be between {MIN_SIZE} and {MAX_SIZE}, got {0}")]
    Size(usize),
    #[error("--target must be a power of two of at least {MIN_TARGET}, got {0}")]
    Target(u32),
}

impl Config {
    /// Check the values clap accepted but the game can't use.
    ///
    /// # Errors
    ///
    /// The first offending flag, as a [`ConfigError`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_SIZE..=MAX_SIZE).contains(&self.size) {
            return Err(ConfigError::Size(self.size));
        }
        if self.target < MIN_TARGET || !self.target.is_power_of_two() {
            return Err(ConfigError::Target(self.target));
        }
        Ok(())
    }

    #[must_use]
    pub const fn game_config(&self) -> GameConfig {
        GameConfig {
            size: self.size,
            target: self.target,
            seed: self.seed,
        }
    }

    #[must_use]
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            color: !self.no_color && std::env::var_os("NO_COLOR").is_none_or(|v| v.is_empty()),
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
