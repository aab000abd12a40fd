// SPDX-License-Identifier: MIT
//
// Terminal session — raw mode lifecycle and geometry probing.
//
// `Terminal` is the explicitly owned session object for the one
// controlling terminal of the process: it wraps a `RawTty` backend,
// tracks whether raw mode is active, and guarantees the original line
// discipline comes back on every exit path — the caller's explicit
// `disable_raw`, this struct's `Drop`, or (for panics) the hook the
// Unix backend installs when raw mode is first enabled.
//
// Geometry is probed once at startup. The primary strategy asks the
// driver; the fallback drives the cursor to the bottom-right corner
// (the terminal clamps the move) and reads back a cursor position
// report. The core does not watch for resizes — re-probing is the
// caller's business.

use crate::ansi;
use crate::error::{Error, Result};
use crate::frame::Frame;
use crate::input::{self, Key};
use crate::tty::RawTty;

/// Longest cursor position report we accept before giving up.
const REPORT_MAX_LEN: usize = 32;

/// Terminal dimensions in character cells. Both are ≥ 1 once probed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    /// Number of rows (height in character cells).
    pub rows: u16,
    /// Number of columns (width in character cells).
    pub cols: u16,
}

/// The one terminal session of the process.
///
/// # Example
///
/// ```no_run
/// use glint_term::terminal::Terminal;
/// use glint_term::tty::UnixTty;
///
/// let mut term = Terminal::new(UnixTty::new());
/// term.enable_raw()?;
/// let geometry = term.probe_geometry()?;
/// // ... render frames, read keys ...
/// // Raw mode is restored automatically on drop.
/// # Ok::<(), glint_term::Error>(())
/// ```
pub struct Terminal<T: RawTty> {
    tty: T,
    raw_active: bool,
}

impl<T: RawTty> Terminal<T> {
    /// Wrap a backend. Does not touch the terminal yet.
    pub const fn new(tty: T) -> Self {
        Self {
            tty,
            raw_active: false,
        }
    }

    /// Whether raw mode is currently active.
    #[inline]
    #[must_use]
    pub const fn is_raw(&self) -> bool {
        self.raw_active
    }

    /// The underlying backend (mainly for tests against a scripted tty).
    pub const fn backend(&self) -> &T {
        &self.tty
    }

    /// Capture the current line discipline and enter raw mode.
    ///
    /// Idempotent: enabling while already raw is a no-op.
    ///
    /// # Errors
    ///
    /// [`Error::TerminalQuery`] if the attribute query fails,
    /// [`Error::TerminalConfig`] if applying the raw set fails.
    pub fn enable_raw(&mut self) -> Result<()> {
        if self.raw_active {
            return Ok(());
        }
        self.tty.set_raw()?;
        self.raw_active = true;
        Ok(())
    }

    /// Restore the captured line discipline.
    ///
    /// Idempotent: disabling while not raw is a no-op. On failure the
    /// session still counts as raw, so `Drop` makes one more attempt.
    ///
    /// # Errors
    ///
    /// [`Error::TerminalConfig`] if the restore fails.
    pub fn disable_raw(&mut self) -> Result<()> {
        if !self.raw_active {
            return Ok(());
        }
        self.tty.restore()?;
        self.raw_active = false;
        Ok(())
    }

    /// Determine the terminal's dimensions.
    ///
    /// Asks the driver first; when that fails or reports zero columns,
    /// falls back to the cursor-report probe. The fallback leaves the
    /// cursor at the bottom-right corner — the caller's first render
    /// repositions it.
    ///
    /// # Errors
    ///
    /// [`Error::GeometryUnavailable`] when both strategies fail,
    /// [`Error::MalformedResponse`] when the report does not parse,
    /// [`Error::Io`] on a hard read/write failure.
    pub fn probe_geometry(&mut self) -> Result<Geometry> {
        if let Some((rows, cols)) = self.tty.window_size() {
            if rows > 0 && cols > 0 {
                return Ok(Geometry { rows, cols });
            }
        }
        self.probe_by_cursor_report()
    }

    /// Fallback probe: park the cursor at the bottom-right corner, then
    /// ask the terminal where the cursor ended up.
    fn probe_by_cursor_report(&mut self) -> Result<Geometry> {
        // The cursor move and the report request go out as two separate
        // writes, each checked for completeness.
        let mut seq = Vec::with_capacity(16);
        ansi::cursor_to_limit(&mut seq)?;
        if self.tty.write(&seq)? != seq.len() {
            return Err(Error::GeometryUnavailable);
        }

        seq.clear();
        ansi::request_cursor_report(&mut seq)?;
        if self.tty.write(&seq)? != seq.len() {
            return Err(Error::GeometryUnavailable);
        }

        // The report arrives on stdin: ESC [ rows ; cols R.
        let mut response = Vec::with_capacity(16);
        while response.len() < REPORT_MAX_LEN {
            match self.tty.read_byte()? {
                Some(b'R') | None => break,
                Some(byte) => response.push(byte),
            }
        }

        parse_cursor_report(&response)
    }

    /// Read and decode one key event.
    ///
    /// # Errors
    ///
    /// [`Error::Io`] on a hard read failure.
    pub fn read_key(&mut self) -> Result<Key> {
        input::read_key(&mut self.tty)
    }

    /// Flush a composed frame to the terminal in one write.
    ///
    /// # Errors
    ///
    /// [`Error::Io`] if the write fails or comes up short.
    pub fn present(&mut self, frame: Frame) -> Result<()> {
        frame.flush(&mut self.tty)
    }
}

impl<T: RawTty> Drop for Terminal<T> {
    fn drop(&mut self) {
        if self.raw_active {
            if let Err(err) = self.tty.restore() {
                // Too late to propagate; still must not vanish silently.
                eprintln!("failed to restore terminal mode: {err}");
            }
        }
    }
}

/// Parse `ESC [ rows ; cols` (the trailing `R` already consumed).
fn parse_cursor_report(response: &[u8]) -> Result<Geometry> {
    let rest = response
        .strip_prefix(b"\x1b[")
        .ok_or(Error::MalformedResponse)?;

    let (rows, rest) = parse_u16(rest).ok_or(Error::MalformedResponse)?;
    let rest = rest.strip_prefix(b";").ok_or(Error::MalformedResponse)?;
    let (cols, _) = parse_u16(rest).ok_or(Error::MalformedResponse)?;

    if rows == 0 || cols == 0 {
        return Err(Error::GeometryUnavailable);
    }
    Ok(Geometry { rows, cols })
}

/// Parse a decimal u16 prefix. `None` when no leading digit.
fn parse_u16(buf: &[u8]) -> Option<(u16, &[u8])> {
    let mut val: u16 = 0;
    let mut pos = 0;

    while pos < buf.len() && buf[pos].is_ascii_digit() {
        val = val
            .saturating_mul(10)
            .saturating_add(u16::from(buf[pos] - b'0'));
        pos += 1;
    }

    if pos == 0 {
        None
    } else {
        Some((val, &buf[pos..]))
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
