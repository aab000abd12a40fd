// SPDX-License-Identifier: MIT
//
// Raw terminal I/O capability interface.
//
// The core's logic — key decoding, geometry probing, frame flushing —
// is written against the narrow `RawTty` trait so it can run against a
// scripted in-memory terminal in tests. `UnixTty` is the only
// platform-specific code in the crate: termios for the line discipline,
// ioctl(TIOCGWINSZ) for the native size query, and raw fd reads/writes.
//
// Safety: the Unix backend necessarily uses `unsafe` for termios
// (tcgetattr, tcsetattr), ioctl, and raw fd I/O. These are the standard
// POSIX interfaces for terminal control — there is no safe alternative.
// Each unsafe block is minimal.
#![allow(unsafe_code)]

use crate::error::Result;

/// Byte-level access to one controlling terminal.
///
/// Four capabilities: a read with the configured inter-byte timeout, a
/// single-syscall write, the driver's window size, and the line
/// discipline switch. Everything else in the crate is built on these.
pub trait RawTty {
    /// Read one byte. `Ok(None)` means the inter-byte timeout expired
    /// (or the read would have blocked) with no byte available.
    fn read_byte(&mut self) -> Result<Option<u8>>;

    /// Write `bytes` in one system call, returning how many were written.
    ///
    /// Callers that must not split an escape sequence treat a short
    /// count as fatal; no retry happens at this layer.
    fn write(&mut self, bytes: &[u8]) -> Result<usize>;

    /// Window size as `(rows, cols)` reported by the driver, or `None`
    /// when the query fails or reports zero columns.
    fn window_size(&mut self) -> Option<(u16, u16)>;

    /// Capture the current line discipline and switch to raw mode.
    fn set_raw(&mut self) -> Result<()>;

    /// Restore the captured line discipline. Idempotent: with no
    /// captured snapshot this is a no-op.
    fn restore(&mut self) -> Result<()>;
}

#[cfg(unix)]
pub use self::unix::UnixTty;

#[cfg(unix)]
mod unix {
    use std::io;
    use std::sync::{Mutex, Once};

    use super::RawTty;
    use crate::error::{Error, Result};

    /// Termios snapshot reachable from the panic hook.
    ///
    /// [`UnixTty`] owns its own copy, but the panic hook can't access
    /// it. This global backup — behind a [`Mutex`], not `static mut` —
    /// lets the hook restore the line discipline without the struct.
    static TERMIOS_BACKUP: Mutex<Option<libc::termios>> = Mutex::new(None);

    /// Panic hook guard — the hook is installed at most once per process.
    static PANIC_HOOK_INSTALLED: Once = Once::new();

    /// Screen cleanup written before the termios restore when a panic
    /// unwinds in raw mode: erase display, cursor home, show cursor.
    const PANIC_RESTORE: &[u8] = b"\x1b[2J\x1b[H\x1b[?25h";

    /// Install a panic hook that restores the terminal before the error
    /// prints.
    ///
    /// Without this, a panic in raw mode leaves the user's terminal
    /// broken: no echo, no line editing, no way to read the message.
    /// The hook writes [`PANIC_RESTORE`] directly to fd 1 (bypassing
    /// Rust's stdout lock to avoid deadlock), restores termios from the
    /// global backup, then delegates to the original handler so the
    /// message prints to a working terminal.
    fn install_panic_hook() {
        PANIC_HOOK_INSTALLED.call_once(|| {
            let original = std::panic::take_hook();
            std::panic::set_hook(Box::new(move |info| {
                unsafe {
                    let _ = libc::write(
                        libc::STDOUT_FILENO,
                        PANIC_RESTORE.as_ptr().cast::<libc::c_void>(),
                        PANIC_RESTORE.len(),
                    );
                }

                if let Ok(guard) = TERMIOS_BACKUP.lock() {
                    if let Some(ref saved) = *guard {
                        unsafe {
                            let _ = libc::tcsetattr(libc::STDIN_FILENO, libc::TCSAFLUSH, saved);
                        }
                    }
                }

                original(info);
            }));
        });
    }

    /// Terminal I/O on stdin/stdout with termios line-discipline control.
    pub struct UnixTty {
        /// Original termios saved by [`set_raw`](RawTty::set_raw),
        /// `None` once restored.
        original: Option<libc::termios>,
    }

    impl UnixTty {
        /// Create a handle. Does not touch the terminal until
        /// [`set_raw`](RawTty::set_raw).
        #[must_use]
        pub const fn new() -> Self {
            Self { original: None }
        }
    }

    impl Default for UnixTty {
        fn default() -> Self {
            Self::new()
        }
    }

    impl RawTty for UnixTty {
        fn read_byte(&mut self) -> Result<Option<u8>> {
            let mut byte = 0u8;
            let n = unsafe {
                libc::read(libc::STDIN_FILENO, (&raw mut byte).cast::<libc::c_void>(), 1)
            };
            match n {
                1 => Ok(Some(byte)),
                // VTIME expired with no byte available.
                0 => Ok(None),
                _ => {
                    let err = io::Error::last_os_error();
                    if err.kind() == io::ErrorKind::WouldBlock {
                        Ok(None)
                    } else {
                        Err(Error::Io(err))
                    }
                }
            }
        }

        fn write(&mut self, bytes: &[u8]) -> Result<usize> {
            let n = unsafe {
                libc::write(
                    libc::STDOUT_FILENO,
                    bytes.as_ptr().cast::<libc::c_void>(),
                    bytes.len(),
                )
            };
            if n < 0 {
                return Err(Error::Io(io::Error::last_os_error()));
            }
            #[allow(clippy::cast_sign_loss)] // n >= 0 checked above.
            Ok(n as usize)
        }

        fn window_size(&mut self) -> Option<(u16, u16)> {
            let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
            let result = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &raw mut ws) };

            if result == 0 && ws.ws_col > 0 && ws.ws_row > 0 {
                Some((ws.ws_row, ws.ws_col))
            } else {
                None
            }
        }

        fn set_raw(&mut self) -> Result<()> {
            install_panic_hook();

            unsafe {
                let mut termios: libc::termios = std::mem::zeroed();
                if libc::tcgetattr(libc::STDIN_FILENO, &raw mut termios) != 0 {
                    return Err(Error::TerminalQuery(io::Error::last_os_error()));
                }

                self.original = Some(termios);
                if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
                    *guard = Some(termios);
                }

                // Raw mode: no break signal, no CR translation, no parity
                // check, no 8th-bit strip, no flow control, no output
                // post-processing, 8-bit chars, no echo, no canonical
                // buffering, no signal keys, no extended input.
                termios.c_iflag &=
                    !(libc::BRKINT | libc::ICRNL | libc::INPCK | libc::ISTRIP | libc::IXON);
                termios.c_oflag &= !libc::OPOST;
                termios.c_cflag |= libc::CS8;
                termios.c_lflag &= !(libc::ECHO | libc::ICANON | libc::IEXTEN | libc::ISIG);

                // VMIN=0, VTIME=1: each read returns after at most one
                // decisecond, with or without a byte.
                termios.c_cc[libc::VMIN] = 0;
                termios.c_cc[libc::VTIME] = 1;

                if libc::tcsetattr(libc::STDIN_FILENO, libc::TCSAFLUSH, &raw const termios) != 0 {
                    return Err(Error::TerminalConfig(io::Error::last_os_error()));
                }
            }

            Ok(())
        }

        fn restore(&mut self) -> Result<()> {
            let Some(original) = self.original else {
                return Ok(());
            };

            unsafe {
                if libc::tcsetattr(libc::STDIN_FILENO, libc::TCSAFLUSH, &raw const original) != 0 {
                    return Err(Error::TerminalConfig(io::Error::last_os_error()));
                }
            }

            self.original = None;
            if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
                *guard = None;
            }

            Ok(())
        }
    }
}

// ─── Test support ────────────────────────────────────────────────────────────


// ─── Tests ───────────────────────────────────────────────────────────────────
