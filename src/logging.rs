// SPDX-License-Identifier: MIT
//
// Logging setup.
//
// The game owns the whole screen, so log output can never go to stdout or
// stderr. With `--log-file` set, events go to that file through a
// non-blocking writer; without it no subscriber is installed and every
// `tracing` event is dropped at the call site.
//
// The filter comes from `N2048_LOG` when that is set and valid, else from
// `--log-level`.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::{Config, LOG_ENV};

#[derive(Debug, Error)]
pub enum LogError {
    #[error("invalid log filter: {0}")]
    Filter(#[from] ParseError),
    #[error("log file path {} has no file name", .0.display())]
    BadPath(PathBuf),
    #[error("cannot open log file {}: {source}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: InitError,
    },
    #[error(transparent)]
    Install(#[from] TryInitError),
}

/// Install the global subscriber described by `config`.
///
/// Returns the writer's guard; dropping it flushes and stops the background
/// writer, so keep it alive until the program exits. `None` when logging is
/// off.
///
/// # Errors
///
/// A bad filter, an unusable log path, or a subscriber already installed.
pub fn init(config: &Config) -> Result<Option<WorkerGuard>, LogError> {
    let Some(path) = &config.log_file else {
        return Ok(None);
    };

    let filter = build_filter(std::env::var(LOG_ENV).ok().as_deref(), &config.log_level)?;
    let appender = file_appender(path)?;
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_thread_names(true),
        )
        .try_init()?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), log = %path.display(), "logging started");
    Ok(Some(guard))
}

/// The env override wins when it parses; otherwise `fallback` must.
fn build_filter(env_value: Option<&str>, fallback: &str) -> Result<EnvFilter, ParseError> {
    if let Some(filter) = env_value.and_then(|v| EnvFilter::try_new(v).ok()) {
        return Ok(filter);
    }
    EnvFilter::try_new(fallback)
}

/// A single never-rotating file at `path`, appended to.
fn file_appender(path: &Path) -> Result<RollingFileAppender, LogError> {
    let name = path
        .file_name()
        .ok_or_else(|| LogError::BadPath(path.to_path_buf()))?;
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(name.to_string_lossy())
        .build(dir)
        .map_err(|source| LogError::File {
            path: path.to_path_buf(),
            source,
        })
}

// ─── Tests ───────────────────────────────────────────────────────────────────
