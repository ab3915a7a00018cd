// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Event loop: stdin bytes in, frames out.
//
// Bytes flow in from the background reader and get parsed into key events.
// The application handles them and paints its frame as a list of styled
// lines. The screen renderer then writes only what changed.
//
// # The 120 Hz Hybrid Model
//
// The loop blocks on the stdin channel with an 8.3ms timeout. A keypress
// arrives on the channel immediately and is rendered in the same iteration.
// With nothing happening, `recv_timeout` parks the thread and the process
// idles at 0% CPU. The timeout still fires 120 times per second so that
// `on_tick` and the escape timeout get a steady clock. Painting only
// happens when something marked the frame dirty.
//
// # SIGWINCH Handling
//
// A SIGWINCH handler sets an `AtomicBool`. The loop checks it each
// iteration, re-queries the size, re-centers the frame and redraws it from
// scratch (the terminal may have reflowed or cleared the old content).
//
// # Escape Timeout
//
// A lone ESC is either the Escape key or the start of a sequence. The parser
// holds it; when a timeout passes with no further bytes, the loop flushes it
// as a real Escape.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Duration;

use crate::input::{Event, Parser};
use crate::reader::StdinReader;
use crate::renderer::ScreenRenderer;
use crate::tag;
use crate::terminal::{Size, Terminal};

// ─── SIGWINCH ────────────────────────────────────────────────────────────────

/// Global flag set by the SIGWINCH handler. Checked each loop iteration.
static SIGWINCH_RECEIVED: AtomicBool = AtomicBool::new(false);

/// Install a signal handler for SIGWINCH (terminal resize).
///
/// The handler only stores to an atomic, which is async-signal-safe.
#[cfg(unix)]
fn install_sigwinch_handler() {
    unsafe {
        let mut sa: libc::sigaction = std::mem::zeroed();
        sa.sa_sigaction = sigwinch_handler as *const () as usize;
        sa.sa_flags = libc::SA_RESTART;
        libc::sigemptyset(&raw mut sa.sa_mask);
        libc::sigaction(libc::SIGWINCH, &raw const sa, std::ptr::null_mut());
    }
}

#[cfg(unix)]
extern "C" fn sigwinch_handler(_sig: libc::c_int) {
    SIGWINCH_RECEIVED.store(true, Ordering::Relaxed);
}

#[cfg(not(unix))]
fn install_sigwinch_handler() {}

// ─── App Trait ───────────────────────────────────────────────────────────────

/// What the application tells the event loop to do after handling an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Continue running.
    Continue,
    /// Exit the event loop cleanly.
    Quit,
}

/// Application interface for the event loop.
///
/// Per iteration the loop calls [`on_event`](App::on_event) for each parsed
/// event, [`on_resize`](App::on_resize) when the terminal size changed,
/// [`on_tick`](App::on_tick), and finally [`paint`](App::paint) if anything
/// made the frame dirty. Only `paint` is required.
pub trait App {
    /// Handle a parsed input event.
    ///
    /// Return [`Action::Quit`] to exit the event loop.
    fn on_event(&mut self, _event: &Event) -> Action {
        Action::Continue
    }

    /// Handle terminal resize.
    fn on_resize(&mut self, _size: Size) {}

    /// Called every loop iteration, even when no input arrived. Return
    /// `true` if state changed and a repaint is needed.
    fn on_tick(&mut self) -> bool {
        false
    }

    /// The current frame, one string per screen row, SGR tags allowed.
    ///
    /// Frames should keep a constant row count; a change in row count makes
    /// the renderer fall back to a full redraw.
    fn paint(&mut self) -> Vec<String>;
}

// ─── Frame Loop Config ───────────────────────────────────────────────────────

/// Configuration for the event loop timing and placement.
#[derive(Debug, Clone, Copy)]
pub struct LoopConfig {
    /// Timeout for the channel `recv_timeout` call (microseconds).
    ///
    /// This controls both the tick rate and the escape sequence timeout.
    /// Default: 8333μs (120 Hz).
    pub tick_interval_us: u64,
    /// Center the frame on screen instead of pinning it to the top left.
    pub center: bool,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            tick_interval_us: 8333,
            center: true,
        }
    }
}

// ─── EventLoop ───────────────────────────────────────────────────────────────

/// The terminal event loop.
///
/// Owns the terminal, parser and renderer. Call [`run`](Self::run) to enter
/// the loop; it returns when the application signals [`Action::Quit`] or
/// stdin closes.
///
/// # Example
///
/// ```no_run
/// use n_term::event_loop::{Action, App, EventLoop};
/// use n_term::input::{Event, KeyCode, KeyEvent};
///
/// struct Hello;
///
/// impl App for Hello {
///     fn on_event(&mut self, event: &Event) -> Action {
///         let Event::Key(KeyEvent { code, .. }) = event;
///         if *code == KeyCode::Char('q') {
///             return Action::Quit;
///         }
///         Action::Continue
///     }
///
///     fn paint(&mut self) -> Vec<String> {
///         vec!["hello, press q".to_string()]
///     }
/// }
///
/// let mut event_loop = EventLoop::new();
/// event_loop.run(&mut Hello)?;
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct EventLoop {
    terminal: Terminal,
    parser: Parser,
    renderer: ScreenRenderer,
    config: LoopConfig,
}

impl Default for EventLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl EventLoop {
    /// Create a new event loop with default configuration. The terminal is
    /// left alone until [`run`](Self::run).
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(LoopConfig::default())
    }

    #[must_use]
    pub fn with_config(config: LoopConfig) -> Self {
        Self {
            terminal: Terminal::new(),
            parser: Parser::new(),
            renderer: ScreenRenderer::new(),
            config,
        }
    }

    /// The current terminal size.
    #[inline]
    #[must_use]
    pub const fn size(&self) -> Size {
        self.terminal.size()
    }

    /// Run the event loop until the application returns [`Action::Quit`].
    ///
    /// Enters game mode, installs the SIGWINCH handler, spawns the stdin
    /// reader and runs the loop. The terminal is restored on exit, also
    /// when the loop fails.
    ///
    /// # Errors
    ///
    /// Returns an error if terminal enter/leave or rendering fails.
    pub fn run(&mut self, app: &mut impl App) -> io::Result<()> {
        self.terminal.enter()?;
        install_sigwinch_handler();

        let (mut reader, rx) = StdinReader::spawn();
        let result = self.run_inner(app, &rx);

        reader.stop();
        self.terminal.leave()?;
        result
    }

    fn run_inner(&mut self, app: &mut impl App, rx: &Receiver<Vec<u8>>) -> io::Result<()> {
        let mut dirty = true;
        let timeout = Duration::from_micros(self.config.tick_interval_us);

        loop {
            // ── Input ──
            let events = match rx.recv_timeout(timeout) {
                Ok(bytes) => self.parser.advance(&bytes),
                Err(RecvTimeoutError::Timeout) if self.parser.has_pending() => self.parser.flush(),
                Err(RecvTimeoutError::Timeout) => Vec::new(),
                Err(RecvTimeoutError::Disconnected) => {
                    tracing::info!("input closed, leaving event loop");
                    return Ok(());
                }
            };
            if !events.is_empty() {
                dirty = true;
                if dispatch(app, &events) == Action::Quit {
                    return Ok(());
                }
            }

            // ── Resize ──
            if SIGWINCH_RECEIVED.swap(false, Ordering::Relaxed) {
                let size = self.terminal.refresh_size();
                tracing::debug!(cols = size.cols, rows = size.rows, "terminal resized");
                self.renderer.force_redraw();
                app.on_resize(size);
                dirty = true;
            }

            // ── Tick ──
            if app.on_tick() {
                dirty = true;
            }

            // ── Render ──
            if dirty {
                let frame = app.paint();
                if self.config.center {
                    let (x, y) = frame_origin(self.terminal.size(), &frame);
                    self.renderer.set_origin(x, y);
                }
                self.renderer.render(&frame);
                self.renderer.flush()?;
                dirty = false;
            }
        }
    }
}

/// Hand `events` to the app in order, stopping at the first quit.
fn dispatch(app: &mut impl App, events: &[Event]) -> Action {
    for event in events {
        if app.on_event(event) == Action::Quit {
            return Action::Quit;
        }
    }
    Action::Continue
}

/// Where a frame's top-left corner goes to sit centered on `size`.
fn frame_origin<S: AsRef<str>>(size: Size, frame: &[S]) -> (u16, u16) {
    let width = frame
        .iter()
        .map(|line| tag::visible_width(line.as_ref()))
        .max()
        .unwrap_or(0);
    let width = u16::try_from(width).unwrap_or(u16::MAX);
    let height = u16::try_from(frame.len()).unwrap_or(u16::MAX);
    size.centered_origin(width, height)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
