// SPDX-License-Identifier: MIT
//
// ANSI escape sequence generation.
//
// Pure functions that write byte-exact sequences to any `impl Write`.
// No state, no decisions about when to emit — that's the frame
// builder's job. This module just knows the encoding of every terminal
// command we issue.
//
// Cursor positions are 0-indexed in our API and converted to 1-indexed
// for the terminal (ANSI uses 1-based coordinates).
//
// All functions return `io::Result` propagated from the underlying
// writer. In practice they never fail when writing into a `Frame`
// (backed by a Vec).

use std::io::{self, Write};

/// Erase the entire display (ED 2).
#[inline]
pub fn clear_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[2J")
}

/// Move the cursor to row 1, column 1 (CUP with no parameters).
#[inline]
pub fn cursor_home(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[H")
}

/// Hide the cursor (DECTCEM reset).
#[inline]
pub fn cursor_hide(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25l")
}

/// Show the cursor (DECTCEM set).
#[inline]
pub fn cursor_show(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25h")
}

/// Erase from the cursor to the end of the line (EL 0).
#[inline]
pub fn erase_line(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[K")
}

/// Move the cursor to `(x, y)` using the CUP (Cursor Position) sequence.
///
/// Our coordinates are 0-indexed; ANSI CUP is 1-indexed.
#[inline]
pub fn cursor_to(w: &mut impl Write, x: u16, y: u16) -> io::Result<()> {
    write!(w, "\x1b[{};{}H", u32::from(y) + 1, u32::from(x) + 1)
}

/// Request a cursor position report (DSR 6).
///
/// The terminal answers on stdin with `ESC [ rows ; cols R`.
#[inline]
pub fn request_cursor_report(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[6n")
}

/// Drive the cursor toward the bottom-right corner (CUF 999 + CUD 999).
///
/// The terminal clamps both moves to its actual size, which is what
/// makes the cursor-report geometry fallback work.
#[inline]
pub fn cursor_to_limit(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[999C\x1b[999B")
}

// ─── Tests ───────────────────────────────────────────────────────────────────
