// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Background input reader: collects raw key bytes from the terminal.
//
// `read()` on stdin blocks, while the event loop has to keep ticking for
// escape timeouts and resize handling. So a dedicated thread owns the
// blocking side and ships byte chunks over an mpsc channel; the main loop
// waits on that channel with `recv_timeout()`.
//
// Shutdown: the thread polls its descriptor with a short timeout and checks
// an `AtomicBool` stop flag between polls, so it never sits in a `read()`
// that nobody will ever satisfy. It also exits on EOF, a read error, or a
// dropped receiver; in every case the channel closes behind it, which the
// event loop treats as "no more input".

#[cfg(unix)]
use std::os::unix::io::RawFd;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Bytes read per `read()` call. A keypress is 1-6 bytes; auto-repeat on a
/// held arrow key can queue a few dozen.
const READ_BUF_SIZE: usize = 1024;

/// How often the reader thread checks the stop flag (milliseconds).
const POLL_TIMEOUT_MS: i32 = 50;

/// Background reader thread.
///
/// # Example
///
/// ```no_run
/// use n_term::reader::StdinReader;
///
/// let (reader, rx) = StdinReader::spawn();
/// while let Ok(bytes) = rx.recv() {
///     println!("got {} bytes", bytes.len());
/// }
/// drop(reader);
/// ```
pub struct StdinReader {
    /// The reader thread handle. `None` after `stop()` joins it.
    handle: Option<JoinHandle<()>>,
    /// Shared flag to signal the thread to exit.
    stop: Arc<AtomicBool>,
}

impl StdinReader {
    /// Spawn a reader on stdin.
    ///
    /// Each received `Vec<u8>` is a non-empty chunk of raw input. The
    /// channel closes when the reader is stopped or stdin hits EOF.
    ///
    /// # Panics
    ///
    /// Panics if the OS cannot spawn a new thread.
    #[must_use]
    pub fn spawn() -> (Self, Receiver<Vec<u8>>) {
        #[cfg(unix)]
        {
            Self::spawn_fd(libc::STDIN_FILENO)
        }
        #[cfg(not(unix))]
        {
            Self::start(move |tx, stop| blocking_loop(&tx, &stop))
        }
    }

    /// Spawn a reader on an arbitrary readable descriptor.
    ///
    /// The descriptor must stay open for as long as the reader runs.
    ///
    /// # Panics
    ///
    /// Panics if the OS cannot spawn a new thread.
    #[cfg(unix)]
    #[must_use]
    pub fn spawn_fd(fd: RawFd) -> (Self, Receiver<Vec<u8>>) {
        Self::start(move |tx, stop| poll_loop(fd, &tx, &stop))
    }

    fn start<F>(body: F) -> (Self, Receiver<Vec<u8>>)
    where
        F: FnOnce(Sender<Vec<u8>>, Arc<AtomicBool>) + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);

        let handle = thread::Builder::new()
            .name("input-reader".into())
            .spawn(move || body(tx, stop_flag))
            .expect("failed to spawn input reader thread");

        (
            Self {
                handle: Some(handle),
                stop,
            },
            rx,
        )
    }

    /// Signal the reader thread to stop and wait for it to exit.
    ///
    /// Idempotent: calling `stop()` after the thread has already
    /// exited is a no-op.
    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for StdinReader {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Poll `fd` for readability, read what is there, forward it.
#[cfg(unix)]
fn poll_loop(fd: RawFd, tx: &Sender<Vec<u8>>, stop: &AtomicBool) {
    let mut buf = [0u8; READ_BUF_SIZE];

    while !stop.load(Ordering::Relaxed) {
        let ready = unsafe {
            let mut pfd = libc::pollfd {
                fd,
                events: libc::POLLIN,
                revents: 0,
            };
            libc::poll(&raw mut pfd, 1, POLL_TIMEOUT_MS)
        };

        // Timeout or EINTR (SIGWINCH lands here): check the flag again.
        if ready <= 0 {
            continue;
        }

        let n = unsafe { libc::read(fd, buf.as_mut_ptr().cast(), buf.len()) };
        if n <= 0 {
            tracing::debug!(fd, "input reader reached EOF");
            break;
        }

        #[allow(clippy::cast_sign_loss)] // n > 0 checked above.
        let chunk = buf[..n as usize].to_vec();
        if tx.send(chunk).is_err() {
            break;
        }
    }
}

/// Blocking fallback without poll. Shutdown waits for the next keypress.
#[cfg(not(unix))]
fn blocking_loop(tx: &Sender<Vec<u8>>, stop: &AtomicBool) {
    use std::io::Read;

    let stdin = std::io::stdin();
    let mut buf = [0u8; READ_BUF_SIZE];

    while !stop.load(Ordering::Relaxed) {
        match stdin.lock().read(&mut buf) {
            Ok(n) if n > 0 => {
                if tx.send(buf[..n].to_vec()).is_err() {
                    break;
                }
            }
            _ => break,
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::time::Duration;

    /// A pipe whose read end feeds a reader and whose write end the test owns.
    struct Pipe {
        read: RawFd,
        write: RawFd,
    }

    impl Pipe {
        fn new() -> Self {
            let mut fds = [0 as RawFd; 2];
            assert_eq!(unsafe { libc::pipe(fds.as_mut_ptr()) }, 0);
            Self {
                read: fds[0],
                write: fds[1],
            }
        }

        fn send(&self, bytes: &[u8]) {
            let n = unsafe { libc::write(self.write, bytes.as_ptr().cast(), bytes.len()) };
            assert_eq!(n, bytes.len() as isize);
        }

        fn close_write(&mut self) {
            if self.write >= 0 {
                unsafe { libc::close(self.write) };
                self.write = -1;
            }
        }
    }

    impl Drop for Pipe {
        fn drop(&mut self) {
            self.close_write();
            unsafe { libc::close(self.read) };
        }
    }

    fn collect(rx: &Receiver<Vec<u8>>) -> Vec<u8> {
        let mut out = Vec::new();
        while let Ok(chunk) = rx.recv_timeout(Duration::from_millis(500)) {
            out.extend(chunk);
        }
        out
    }

    #[test]
    fn forwards_bytes_from_descriptor() {
        let mut pipe = Pipe::new();
        let (_reader, rx) = StdinReader::spawn_fd(pipe.read);

        pipe.send(b"\x1b[A");
        pipe.send(b"q");
        pipe.close_write();

        assert_eq!(collect(&rx), b"\x1b[Aq");
    }

    #[test]
    fn channel_closes_on_eof() {
        let mut pipe = Pipe::new();
        let (_reader, rx) = StdinReader::spawn_fd(pipe.read);
        pipe.close_write();

        assert!(rx.recv_timeout(Duration::from_secs(2)).is_err());
    }

    #[test]
    fn stop_with_idle_descriptor_does_not_hang() {
        let pipe = Pipe::new();
        let (mut reader, rx) = StdinReader::spawn_fd(pipe.read);
        reader.stop();

        assert!(rx.recv_timeout(Duration::from_millis(50)).is_err());
    }

    #[test]
    fn stop_is_idempotent() {
        let pipe = Pipe::new();
        let (mut reader, _rx) = StdinReader::spawn_fd(pipe.read);
        reader.stop();
        reader.stop();
    }

    #[test]
    fn drop_stops_reader() {
        let pipe = Pipe::new();
        let (reader, _rx) = StdinReader::spawn_fd(pipe.read);
        drop(reader);
    }
}
