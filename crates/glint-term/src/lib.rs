// SPDX-License-Identifier: MIT
//
// glint-term — terminal control core for glint.
//
// Everything needed to own one controlling terminal for the lifetime
// of one process: raw-mode entry and guaranteed restore, a geometry
// probe with a cursor-report fallback, a key decoder that collapses
// escape sequences into logical events, and a frame builder that
// composes a full-screen update into a single atomic write.
//
// This crate intentionally avoids terminal frameworks (crossterm,
// ratatui) in favor of direct control via ANSI escape sequences and
// raw termios. The platform-specific surface is confined to the narrow
// `RawTty` capability in `tty`; all logic above it runs against a
// scripted terminal in tests.

pub mod ansi;
pub mod error;
pub mod frame;
pub mod input;
pub mod terminal;
pub mod tty;

pub use error::{Error, Result};
pub use frame::{Cursor, Frame, RowContent};
pub use input::{Key, read_key};
pub use terminal::{Geometry, Terminal};
pub use tty::RawTty;
#[cfg(unix)]
pub use tty::UnixTty;
