// SPDX-License-Identifier: MIT
//
// glint — a minimal screen-oriented terminal text viewer.
//
// The heavy lifting lives in glint-term: raw mode, geometry probing,
// key decoding, atomic frame output. This binary is the thin session
// around it: load an optional file into lines, then loop render →
// decode one key → move the cursor, until Ctrl-Q.
//
// Every exit path runs through terminal-mode restoration: the normal
// quit and the fatal-error path below both disable raw mode explicitly
// (with `Terminal`'s drop and the panic hook as backstops), and a
// fatal error clears the screen first so the diagnostic prints onto a
// clean terminal instead of mid-frame.

use std::env;
use std::fs;
use std::process::ExitCode;

use anyhow::Context;

use glint_term::frame::{Cursor, Frame, RowContent};
use glint_term::input::Key;
use glint_term::terminal::{Geometry, Terminal};
use glint_term::tty::{RawTty, UnixTty};

const VERSION: &str = env!("CARGO_PKG_VERSION");

// ─── Viewer state ────────────────────────────────────────────────────────────

/// Cursor position plus the loaded lines.
///
/// Cursor bounds are clamped to the viewport, not to line contents —
/// this viewer has no editing model, so the screen is the only
/// authority on where the cursor may go.
struct Viewer {
    rows: Vec<String>,
    cursor: Cursor,
    geometry: Geometry,
}

impl Viewer {
    const fn new(rows: Vec<String>, geometry: Geometry) -> Self {
        Self {
            rows,
            cursor: Cursor { x: 0, y: 0 },
            geometry,
        }
    }

    /// Compose and flush one full-screen frame.
    fn refresh(&self, term: &mut Terminal<impl RawTty>) -> glint_term::Result<()> {
        let banner = format!("glint viewer -- version {VERSION}");

        let mut frame = Frame::new();
        frame.hide_cursor()?;
        frame.move_home()?;
        frame.draw_rows(
            self.geometry,
            self.rows.is_empty().then_some(banner.as_str()),
            |y| {
                self.rows
                    .get(y)
                    .map_or(RowContent::Filler, |line| RowContent::Text(line.as_str()))
            },
        )?;
        frame.position_cursor(self.cursor)?;
        frame.show_cursor()?;
        term.present(frame)
    }

    /// Apply one key event. Returns `false` on the quit key.
    fn handle_key(&mut self, key: Key) -> bool {
        match key {
            key if key.is_ctrl(b'q') => return false,
            Key::ArrowUp => self.cursor.y = self.cursor.y.saturating_sub(1),
            Key::ArrowDown => {
                if self.cursor.y + 1 < self.geometry.rows {
                    self.cursor.y += 1;
                }
            }
            Key::ArrowLeft => self.cursor.x = self.cursor.x.saturating_sub(1),
            Key::ArrowRight => {
                if self.cursor.x + 1 < self.geometry.cols {
                    self.cursor.x += 1;
                }
            }
            Key::Home => self.cursor.x = 0,
            Key::End => self.cursor.x = self.geometry.cols - 1,
            Key::PageUp => self.cursor.y = 0,
            Key::PageDown => self.cursor.y = self.geometry.rows - 1,
            _ => {}
        }
        true
    }
}

// ─── Session ─────────────────────────────────────────────────────────────────

/// Render, read, dispatch — strictly sequential until quit.
fn session(viewer: &mut Viewer, term: &mut Terminal<impl RawTty>) -> glint_term::Result<()> {
    loop {
        viewer.refresh(term)?;
        let key = term.read_key()?;
        if !viewer.handle_key(key) {
            break;
        }
    }

    // Leave the screen clean on a normal quit.
    clear_terminal(term)
}

/// Erase the display and park the cursor at the home position.
fn clear_terminal(term: &mut Terminal<impl RawTty>) -> glint_term::Result<()> {
    let mut frame = Frame::new();
    frame.clear_screen()?;
    frame.move_home()?;
    term.present(frame)
}

fn load_lines(path: &str) -> anyhow::Result<Vec<String>> {
    let text = fs::read_to_string(path).with_context(|| format!("failed to open {path}"))?;
    Ok(text.lines().map(str::to_owned).collect())
}

fn run() -> anyhow::Result<()> {
    let rows = match env::args().nth(1) {
        Some(path) => load_lines(&path)?,
        None => Vec::new(),
    };

    let mut term = Terminal::new(UnixTty::new());
    term.enable_raw()?;
    let geometry = term.probe_geometry()?;

    let mut viewer = Viewer::new(rows, geometry);
    let outcome = session(&mut viewer, &mut term);

    if outcome.is_err() {
        // Don't leave the diagnostic to print into a half-drawn frame.
        let _ = clear_terminal(&mut term);
    }
    if let Err(restore_err) = term.disable_raw() {
        // Reported, but never allowed to mask the session's own error.
        eprintln!("glint: failed to restore terminal mode: {restore_err}");
    }

    outcome.map_err(Into::into)
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("glint: {err:#}");
            ExitCode::FAILURE
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn viewer() -> Viewer {
        Viewer::new(Vec::new(), Geometry { rows: 24, cols: 80 })
    }

    #[test]
    fn quit_key_stops_the_session() {
        let mut v = viewer();
        assert!(!v.handle_key(Key::Ctrl(0x11)));
        assert!(v.handle_key(Key::Char(b'q')));
    }

    #[test]
    fn arrows_clamp_to_viewport() {
        let mut v = viewer();

        assert!(v.handle_key(Key::ArrowUp));
        assert!(v.handle_key(Key::ArrowLeft));
        assert_eq!(v.cursor, Cursor { x: 0, y: 0 });

        for _ in 0..200 {
            v.handle_key(Key::ArrowDown);
            v.handle_key(Key::ArrowRight);
        }
        assert_eq!(v.cursor, Cursor { x: 79, y: 23 });
    }

    #[test]
    fn home_end_page_keys_jump_to_extremes() {
        let mut v = viewer();

        v.handle_key(Key::End);
        v.handle_key(Key::PageDown);
        assert_eq!(v.cursor, Cursor { x: 79, y: 23 });

        v.handle_key(Key::Home);
        v.handle_key(Key::PageUp);
        assert_eq!(v.cursor, Cursor { x: 0, y: 0 });
    }

    #[test]
    fn unhandled_keys_leave_state_alone() {
        let mut v = viewer();
        v.handle_key(Key::ArrowDown);
        let before = v.cursor;

        assert!(v.handle_key(Key::Escape));
        assert!(v.handle_key(Key::Delete));
        assert!(v.handle_key(Key::Char(b'z')));
        assert_eq!(v.cursor, before);
    }
}
