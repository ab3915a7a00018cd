// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// The screen the board is drawn on.
//
// While a game runs the terminal is in a "session": stdin in raw mode so
// each key arrives at once, the alternate screen so the shell's content
// comes back afterwards, and the cursor hidden. `Terminal::enter` opens
// the session and `Terminal::leave` (or drop) closes it.
//
// A panic inside a session must not leave the user's shell in raw mode. The
// saved termios is therefore also parked in a global, and a panic hook
// writes `PANIC_RESTORE` straight to fd 1 (never through the stdout lock,
// which the panicking frame flush may hold) before restoring termios and
// running the previous hook.

use std::io::{self, Write};
use std::sync::Once;

use crate::ansi;

/// Size assumed when the OS can't tell us (pipes, CI).
const FALLBACK_SIZE: Size = Size { cols: 80, rows: 24 };

// ─── Size ───────────────────────────────────────────────────────────────────

/// Screen dimensions in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    pub cols: u16,
    pub rows: u16,
}

impl Size {
    /// Top-left corner that centers a `width × height` block on screen.
    ///
    /// A block larger than the screen along an axis is pinned to 0 there.
    #[must_use]
    pub const fn centered_origin(self, width: u16, height: u16) -> (u16, u16) {
        (
            self.cols.saturating_sub(width) / 2,
            self.rows.saturating_sub(height) / 2,
        )
    }
}

/// The screen size from `ioctl(TIOCGWINSZ)` on stdout, if it has one.
#[cfg(unix)]
#[must_use]
pub fn get_size() -> Option<Size> {
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
    let ok = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &raw mut ws) } == 0;
    (ok && ws.ws_col > 0 && ws.ws_row > 0).then_some(Size {
        cols: ws.ws_col,
        rows: ws.ws_row,
    })
}

#[cfg(not(unix))]
#[must_use]
pub fn get_size() -> Option<Size> {
    None
}

/// Whether stdin is a terminal. Without one there are no keys to read.
#[cfg(unix)]
#[must_use]
pub fn is_tty() -> bool {
    unsafe { libc::isatty(libc::STDIN_FILENO) != 0 }
}

#[cfg(not(unix))]
#[must_use]
pub fn is_tty() -> bool {
    false
}

// ─── Raw mode ───────────────────────────────────────────────────────────────

#[cfg(unix)]
mod raw {
    use std::io;
    use std::sync::Mutex;

    /// Saved cooked-mode settings, for the panic hook.
    pub(super) static SAVED: Mutex<Option<libc::termios>> = Mutex::new(None);

    /// Put stdin in raw mode. Returns the settings to restore, or `None`
    /// when stdin is not a terminal and nothing was changed.
    pub(super) fn enable() -> io::Result<Option<libc::termios>> {
        if !super::is_tty() {
            return Ok(None);
        }

        let mut cooked: libc::termios = unsafe { std::mem::zeroed() };
        if unsafe { libc::tcgetattr(libc::STDIN_FILENO, &raw mut cooked) } != 0 {
            return Err(io::Error::last_os_error());
        }

        let mut raw = cooked;
        unsafe { libc::cfmakeraw(&raw mut raw) };
        raw.c_cc[libc::VMIN] = 1;
        raw.c_cc[libc::VTIME] = 0;
        if unsafe { libc::tcsetattr(libc::STDIN_FILENO, libc::TCSAFLUSH, &raw const raw) } != 0 {
            return Err(io::Error::last_os_error());
        }

        if let Ok(mut saved) = SAVED.lock() {
            *saved = Some(cooked);
        }
        Ok(Some(cooked))
    }

    pub(super) fn restore(cooked: &libc::termios) -> io::Result<()> {
        if unsafe { libc::tcsetattr(libc::STDIN_FILENO, libc::TCSAFLUSH, cooked) } != 0 {
            return Err(io::Error::last_os_error());
        }
        if let Ok(mut saved) = SAVED.lock() {
            *saved = None;
        }
        Ok(())
    }

    /// Panic path: best effort, never blocks on a poisoned lock.
    pub(super) fn restore_saved() {
        let cooked = match SAVED.try_lock() {
            Ok(saved) => *saved,
            Err(_) => None,
        };
        if let Some(cooked) = cooked {
            unsafe { libc::tcsetattr(libc::STDIN_FILENO, libc::TCSANOW, &raw const cooked) };
        }
    }
}

// ─── Panic restore ──────────────────────────────────────────────────────────

/// End sync output, reset SGR, show the cursor, leave the alternate screen.
/// The screen switch is last so the shell reappears clean.
const PANIC_RESTORE: &[u8] = b"\x1b[?2026l\x1b[0m\x1b[?25h\x1b[?1049l";

static PANIC_HOOK: Once = Once::new();

fn install_panic_hook() {
    PANIC_HOOK.call_once(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            write_panic_restore();
            #[cfg(unix)]
            raw::restore_saved();
            previous(info);
        }));
    });
}

fn write_panic_restore() {
    #[cfg(unix)]
    unsafe {
        libc::write(
            libc::STDOUT_FILENO,
            PANIC_RESTORE.as_ptr().cast(),
            PANIC_RESTORE.len(),
        );
    }

    #[cfg(not(unix))]
    {
        let _ = io::stdout().write_all(PANIC_RESTORE);
        let _ = io::stdout().flush();
    }
}

// ─── Terminal ───────────────────────────────────────────────────────────────

/// An open session: what `leave` has to undo.
struct Session {
    #[cfg(unix)]
    cooked: Option<libc::termios>,
}

/// Terminal handle. The session, if open, is closed on drop.
///
/// ```no_run
/// use n_term::terminal::Terminal;
///
/// let mut term = Terminal::new();
/// term.enter()?;
/// // ... draw frames ...
/// term.leave()?;
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct Terminal {
    size: Size,
    session: Option<Session>,
}

impl Terminal {
    /// A handle with the current screen size. Nothing is changed until
    /// [`enter`](Self::enter).
    #[must_use]
    pub fn new() -> Self {
        Self {
            size: get_size().unwrap_or(FALLBACK_SIZE),
            session: None,
        }
    }

    #[inline]
    #[must_use]
    pub const fn size(&self) -> Size {
        self.size
    }

    /// Re-read the size after SIGWINCH. Keeps the old size if the query
    /// fails.
    pub fn refresh_size(&mut self) -> Size {
        if let Some(size) = get_size() {
            self.size = size;
        }
        self.size
    }

    /// Open a session: raw mode, alternate screen, hidden cursor, cleared
    /// screen. A no-op when one is already open.
    ///
    /// # Errors
    ///
    /// termios or stdout failures.
    pub fn enter(&mut self) -> io::Result<()> {
        if self.session.is_some() {
            return Ok(());
        }

        install_panic_hook();
        let session = Session {
            #[cfg(unix)]
            cooked: raw::enable()?,
        };

        let mut out = io::stdout().lock();
        ansi::enter_alt_screen(&mut out)?;
        ansi::cursor_hide(&mut out)?;
        ansi::clear_screen(&mut out)?;
        out.flush()?;

        self.session = Some(session);
        tracing::debug!(cols = self.size.cols, rows = self.size.rows, "terminal session opened");
        Ok(())
    }

    /// Close the session and give the screen back. A no-op without one.
    ///
    /// # Errors
    ///
    /// termios or stdout failures.
    pub fn leave(&mut self) -> io::Result<()> {
        let Some(session) = self.session.take() else {
            return Ok(());
        };

        {
            let mut out = io::stdout().lock();
            ansi::end_sync(&mut out)?;
            ansi::reset(&mut out)?;
            ansi::cursor_show(&mut out)?;
            ansi::exit_alt_screen(&mut out)?;
            out.flush()?;
        }

        #[cfg(unix)]
        if let Some(cooked) = &session.cooked {
            raw::restore(cooked)?;
        }
        #[cfg(not(unix))]
        let _ = session;

        tracing::debug!("terminal session closed");
        Ok(())
    }
}

impl Default for Terminal {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        let _ = self.leave();
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    // ── Size ──────────────────────────────────────────────────────────

    #[test]
    fn centered_origin_splits_the_margin() {
        let screen = Size { cols: 80, rows: 24 };
        assert_eq!(screen.centered_origin(34, 14), (23, 5));
    }

    #[test]
    fn centered_origin_pins_oversized_blocks() {
        let screen = Size { cols: 20, rows: 10 };
        assert_eq!(screen.centered_origin(34, 14), (0, 0));
        assert_eq!(screen.centered_origin(10, 14), (5, 0));
    }

    #[test]
    fn new_terminal_has_a_usable_size() {
        let term = Terminal::new();
        assert!(term.size().cols > 0 && term.size().rows > 0);
        assert!(term.session.is_none());
    }

    // ── Panic restore ─────────────────────────────────────────────────

    #[test]
    fn panic_restore_undoes_the_session() {
        assert_eq!(
            std::str::from_utf8(PANIC_RESTORE).unwrap(),
            "\x1b[?2026l\x1b[0m\x1b[?25h\x1b[?1049l"
        );
    }

    // ── Session ───────────────────────────────────────────────────────

    #[test]
    fn enter_and_leave_are_idempotent() {
        let mut term = Terminal::new();
        term.leave().unwrap();
        assert!(term.session.is_none());

        term.enter().unwrap();
        term.enter().unwrap();
        assert!(term.session.is_some());

        term.leave().unwrap();
        term.leave().unwrap();
        assert!(term.session.is_none());
    }
}
