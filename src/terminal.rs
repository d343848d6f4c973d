//! Terminal setup and teardown, byte input and window geometry.

use crate::error::FatalError;
use crate::keys::{read_key, ByteSource, Key};
use anyhow::{Context, Result};
use crossterm::{terminal, ExecutableCommand};
use std::io::{self, Stdout, Write};
use std::time::Duration;

/// RAII guard for terminal state.
///
/// Enables raw mode and the alternate screen in `new()` and restores both in `Drop`, so the
/// terminal is usable again however the editor exits (including a panic unwind).
pub struct TerminalGuard;

impl TerminalGuard {
    pub fn new(stdout: &mut Stdout) -> Result<Self> {
        terminal::enable_raw_mode().map_err(FatalError::TerminalMode)?;
        stdout
            .execute(terminal::EnterAlternateScreen)
            .context("entering alternate screen")?;
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let mut stdout = io::stdout();
        let _ = stdout.execute(terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
        let _ = stdout.flush();
    }
}

/// Raw bytes from stdin.
///
/// On Unix the descriptor is polled and read directly: going through `std::io::Stdin` would
/// pull a whole escape sequence into its buffer, where `poll` can no longer see it.
pub struct StdinBytes {
    #[cfg(unix)]
    fd: libc::c_int,
    #[cfg(not(unix))]
    stdin: io::Stdin,
}

impl StdinBytes {
    #[cfg(unix)]
    pub fn new() -> Self {
        Self {
            fd: libc::STDIN_FILENO,
        }
    }

    #[cfg(not(unix))]
    pub fn new() -> Self {
        Self { stdin: io::stdin() }
    }

    #[cfg(all(test, unix))]
    fn from_fd(fd: libc::c_int) -> Self {
        Self { fd }
    }
}

impl ByteSource for StdinBytes {
    #[cfg(unix)]
    fn read_byte(&mut self, timeout: Duration) -> io::Result<Option<u8>> {
        let mut pfd = libc::pollfd {
            fd: self.fd,
            events: libc::POLLIN,
            revents: 0,
        };
        let ms = libc::c_int::try_from(timeout.as_millis()).unwrap_or(libc::c_int::MAX);

        // SAFETY: `pfd` is a valid pollfd and we pass a count of exactly one.
        let ready = unsafe { libc::poll(&mut pfd, 1, ms) };
        if ready < 0 {
            return interrupted_or(io::Error::last_os_error());
        }
        if ready == 0 {
            return Ok(None);
        }

        let mut b = 0u8;
        // SAFETY: reads at most one byte into `b`, which outlives the call.
        let n = unsafe { libc::read(self.fd, std::ptr::addr_of_mut!(b).cast(), 1) };
        match n {
            1 => Ok(Some(b)),
            0 => Ok(None),
            _ => interrupted_or(io::Error::last_os_error()),
        }
    }

    // Without poll() we cannot time out; block for the next byte.
    #[cfg(not(unix))]
    fn read_byte(&mut self, _timeout: Duration) -> io::Result<Option<u8>> {
        use std::io::Read;

        let mut b = [0u8; 1];
        match self.stdin.lock().read(&mut b)? {
            1 => Ok(Some(b[0])),
            _ => Ok(None),
        }
    }
}

/// A signal or a non-blocking descriptor with nothing to read counts as a timeout.
#[cfg(unix)]
fn interrupted_or(err: io::Error) -> io::Result<Option<u8>> {
    match err.kind() {
        io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock => Ok(None),
        _ => Err(err),
    }
}

/// Parse a cursor position report `ESC [ <row> ; <col> R` into `(rows, cols)`.
pub fn parse_cursor_report(reply: &[u8]) -> Option<(usize, usize)> {
    let body = reply.strip_prefix(b"\x1b[")?;
    let body = body.strip_suffix(b"R").unwrap_or(body);
    let s = std::str::from_utf8(body).ok()?;
    let (rows, cols) = s.split_once(';')?;
    Some((rows.parse().ok()?, cols.parse().ok()?))
}

/// Window size as `(rows, cols)`.
///
/// Asks the OS first; if that fails (or reports zero columns) the cursor is pushed to the
/// bottom-right corner and its position is queried with `ESC [ 6 n`.
pub fn window_size<W: Write, S: ByteSource>(
    out: &mut W,
    input: &mut S,
    timeout: Duration,
) -> Result<(usize, usize)> {
    match terminal::size() {
        Ok((cols, rows)) if cols > 0 => return Ok((rows.into(), cols.into())),
        Ok(_) => log::debug!("window size reported zero columns, querying cursor position"),
        Err(e) => log::debug!("window size query failed ({e}), querying cursor position"),
    }
    query_cursor_position(out, input, timeout)
}

/// Push the cursor to the bottom-right corner and read back its position report.
fn query_cursor_position<W: Write, S: ByteSource>(
    out: &mut W,
    input: &mut S,
    timeout: Duration,
) -> Result<(usize, usize)> {
    out.write_all(b"\x1b[999C\x1b[999B\x1b[6n")?;
    out.flush()?;

    let mut reply = Vec::with_capacity(16);
    while reply.len() < 32 {
        match input.read_byte(timeout).map_err(FatalError::Read)? {
            Some(b'R') | None => break,
            Some(b) => reply.push(b),
        }
    }
    parse_cursor_report(&reply).ok_or_else(|| FatalError::WindowSize.into())
}

/// The editor's view of the terminal: keys in, frames out.
pub trait Console {
    /// Wait for one key. `Ok(None)` means the idle timeout passed without input.
    fn read_key(&mut self) -> Result<Option<Key>>;
    /// Write a complete frame in one go.
    fn write_frame(&mut self, frame: &[u8]) -> Result<()>;
}

/// The real terminal.
pub struct TermConsole {
    input: StdinBytes,
    out: Stdout,
    idle: Duration,
    escape: Duration,
}

impl TermConsole {
    pub fn new(input: StdinBytes, out: Stdout, idle: Duration, escape: Duration) -> Self {
        Self {
            input,
            out,
            idle,
            escape,
        }
    }
}

impl Console for TermConsole {
    fn read_key(&mut self) -> Result<Option<Key>> {
        let key = read_key(&mut self.input, self.idle, self.escape).map_err(FatalError::Read)?;
        Ok(key)
    }

    fn write_frame(&mut self, frame: &[u8]) -> Result<()> {
        self.out.write_all(frame)?;
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    // ==================== cursor position report ====================

    #[test]
    fn parses_cursor_report() {
        assert_eq!(parse_cursor_report(b"\x1b[24;80R"), Some((24, 80)));
        assert_eq!(parse_cursor_report(b"\x1b[50;132"), Some((50, 132)));
    }

    #[test]
    fn rejects_malformed_reports() {
        assert_eq!(parse_cursor_report(b"24;80R"), None);
        assert_eq!(parse_cursor_report(b"\x1b[24R"), None);
        assert_eq!(parse_cursor_report(b"\x1b[a;bR"), None);
        assert_eq!(parse_cursor_report(b""), None);
    }

    #[test]
    fn cursor_query_writes_request_and_reads_reply() {
        let mut out = Vec::new();
        let mut input: VecDeque<u8> = b"\x1b[24;80Rleft".iter().copied().collect();
        let size = query_cursor_position(&mut out, &mut input, Duration::ZERO).unwrap();
        assert_eq!(size, (24, 80));
        assert_eq!(out, b"\x1b[999C\x1b[999B\x1b[6n");
        // Bytes after the report are left for the key decoder.
        assert_eq!(input.iter().copied().collect::<Vec<u8>>(), b"left");
    }

    #[test]
    fn cursor_query_without_reply_is_fatal() {
        let mut out = Vec::new();
        for reply in [&b""[..], b"\x1b[24", b"garbage"] {
            let mut input: VecDeque<u8> = reply.iter().copied().collect();
            let err = query_cursor_position(&mut out, &mut input, Duration::ZERO).unwrap_err();
            assert!(matches!(err.downcast_ref::<FatalError>(), Some(FatalError::WindowSize)));
        }
    }

    // ==================== stdin bytes ====================

    #[cfg(unix)]
    struct Pipe {
        read: libc::c_int,
        write: libc::c_int,
    }

    #[cfg(unix)]
    impl Pipe {
        fn new() -> Self {
            let mut fds = [0; 2];
            assert_eq!(unsafe { libc::pipe(fds.as_mut_ptr()) }, 0);
            Self {
                read: fds[0],
                write: fds[1],
            }
        }

        fn send(&self, bytes: &[u8]) {
            let n = unsafe { libc::write(self.write, bytes.as_ptr().cast(), bytes.len()) };
            assert_eq!(usize::try_from(n).unwrap(), bytes.len());
        }
    }

    #[cfg(unix)]
    impl Drop for Pipe {
        fn drop(&mut self) {
            unsafe {
                libc::close(self.read);
                libc::close(self.write);
            }
        }
    }

    #[cfg(unix)]
    #[test]
    fn escape_sequences_arriving_in_one_write_decode_whole() {
        let pipe = Pipe::new();
        let mut src = StdinBytes::from_fd(pipe.read);
        let idle = Duration::from_millis(200);
        let escape = Duration::from_millis(100);

        pipe.send(b"\x1b[A\x1b[6~x");
        assert_eq!(read_key(&mut src, idle, escape).unwrap(), Some(Key::ArrowUp));
        assert_eq!(read_key(&mut src, idle, escape).unwrap(), Some(Key::PageDown));
        assert_eq!(read_key(&mut src, idle, escape).unwrap(), Some(Key::Char(b'x')));
        assert_eq!(read_key(&mut src, Duration::ZERO, escape).unwrap(), None);
    }

    #[cfg(unix)]
    #[test]
    fn lone_escape_times_out_as_escape() {
        let pipe = Pipe::new();
        let mut src = StdinBytes::from_fd(pipe.read);
        pipe.send(b"\x1b");
        let key = read_key(&mut src, Duration::from_millis(200), Duration::from_millis(20)).unwrap();
        assert_eq!(key, Some(Key::Escape));
    }
}
