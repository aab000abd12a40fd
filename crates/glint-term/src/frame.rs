// SPDX-License-Identifier: MIT
//
// Frame composition — one full-screen update, one write() syscall.
//
// Issuing many small direct writes per screen element causes visible
// tearing on slow or emulated terminals. A `Frame` accumulates every
// byte of a refresh — cursor visibility, row content, erase-to-EOL
// markers, the final cursor position — and `flush` hands the whole
// thing to the terminal in a single write, so the update is perceived
// atomically. A frame is single-use: it is consumed by the flush.

use std::io::{self, Write};

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::ansi;
use crate::error::{Error, Result};
use crate::terminal::Geometry;
use crate::tty::RawTty;

/// Room for a typical 80×24 frame without reallocation.
const DEFAULT_CAPACITY: usize = 4096;

/// A cursor position in screen cells, 0-indexed, owned by the caller.
///
/// The frame only reads it to emit the 1-based positioning sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    pub x: u16,
    pub y: u16,
}

/// What the content provider has for one screen row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowContent<'a> {
    /// A line of text (possibly empty). Truncated to the screen width
    /// by display columns.
    Text(&'a str),
    /// No content for this row — render the filler marker.
    Filler,
}

/// An append-only byte buffer holding exactly one full-screen update.
pub struct Frame {
    buf: Vec<u8>,
}

impl Frame {
    /// Start an empty frame.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(DEFAULT_CAPACITY),
        }
    }

    /// Bytes accumulated so far.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether nothing has been appended yet.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// The accumulated bytes (for testing and debugging).
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Append raw bytes to the frame.
    ///
    /// All-or-nothing: the reservation happens up front, so a failed
    /// allocation leaves the frame exactly as it was and the caller may
    /// keep appending other fragments.
    ///
    /// # Errors
    ///
    /// [`Error::Io`] with [`io::ErrorKind::OutOfMemory`] if the buffer
    /// cannot grow.
    pub fn append(&mut self, bytes: &[u8]) -> Result<()> {
        self.buf.try_reserve(bytes.len()).map_err(|_| {
            Error::Io(io::Error::new(
                io::ErrorKind::OutOfMemory,
                "frame buffer growth failed",
            ))
        })?;
        self.buf.extend_from_slice(bytes);
        Ok(())
    }

    /// Append the erase-entire-display sequence.
    pub fn clear_screen(&mut self) -> Result<()> {
        ansi::clear_screen(self)?;
        Ok(())
    }

    /// Append the cursor-hide sequence.
    pub fn hide_cursor(&mut self) -> Result<()> {
        ansi::cursor_hide(self)?;
        Ok(())
    }

    /// Append the cursor-show sequence.
    pub fn show_cursor(&mut self) -> Result<()> {
        ansi::cursor_show(self)?;
        Ok(())
    }

    /// Append the sequence repositioning to row 1, column 1.
    pub fn move_home(&mut self) -> Result<()> {
        ansi::cursor_home(self)?;
        Ok(())
    }

    /// Append a 1-based positioning sequence for the given cursor.
    pub fn position_cursor(&mut self, cursor: Cursor) -> Result<()> {
        ansi::cursor_to(self, cursor.x, cursor.y)?;
        Ok(())
    }

    /// Compose the content area: one line per screen row.
    ///
    /// For each row index from 0 to `geometry.rows - 1`, the content
    /// provider supplies the line; rows beyond available content render
    /// the `~` filler. When `banner` is `Some` — the caller passes it
    /// only when there is no content at all — the filler row a third of
    /// the way down shows the banner centered behind a leading `~`.
    ///
    /// Every row is truncated to the screen width and followed by an
    /// erase-to-end-of-line, with a line break after every row except
    /// the last (writing past the bottom row would scroll the screen).
    pub fn draw_rows<'a, F>(
        &mut self,
        geometry: Geometry,
        banner: Option<&str>,
        mut content: F,
    ) -> Result<()>
    where
        F: FnMut(usize) -> RowContent<'a>,
    {
        let rows = usize::from(geometry.rows);
        let cols = usize::from(geometry.cols);

        for y in 0..rows {
            match content(y) {
                RowContent::Text(line) => {
                    self.append(truncate_to_width(line, cols).as_bytes())?;
                }
                RowContent::Filler => match banner {
                    Some(text) if y == rows / 3 => self.draw_banner(text, cols)?,
                    _ => self.append(b"~")?,
                },
            }

            ansi::erase_line(self)?;
            if y + 1 < rows {
                self.append(b"\r\n")?;
            }
        }

        Ok(())
    }

    /// Center the banner on a filler row, `~` in column 0 like every
    /// other filler row.
    fn draw_banner(&mut self, text: &str, cols: usize) -> Result<()> {
        let text = truncate_to_width(text, cols);
        let mut padding = (cols - text.width()) / 2;

        if padding > 0 {
            self.append(b"~")?;
            padding -= 1;
        }
        self.append(" ".repeat(padding).as_bytes())?;
        self.append(text.as_bytes())
    }

    /// Write the whole frame to the terminal in one system call.
    ///
    /// No partial-write retry: escape sequences must not be split
    /// across writes, so a short count is fatal for this frame. The
    /// frame is consumed either way.
    ///
    /// # Errors
    ///
    /// [`Error::Io`] if the write fails or writes fewer bytes than the
    /// frame holds.
    pub fn flush(self, tty: &mut impl RawTty) -> Result<()> {
        let written = tty.write(&self.buf)?;
        if written != self.buf.len() {
            return Err(Error::Io(io::Error::new(
                io::ErrorKind::WriteZero,
                "short frame write",
            )));
        }
        Ok(())
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::new()
    }
}

impl Write for Frame {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        // Intentionally a no-op: real flushing is Frame::flush.
        Ok(())
    }
}

/// Longest prefix of `line` that fits in `cols` display columns.
fn truncate_to_width(line: &str, cols: usize) -> &str {
    let mut width = 0;
    let mut end = 0;

    for (i, ch) in line.char_indices() {
        let w = ch.width().unwrap_or(0);
        if width + w > cols {
            break;
        }
        width += w;
        end = i + ch.len_utf8();
    }

    &line[..end]
}

// ─── Tests ───────────────────────────────────────────────────────────────────
