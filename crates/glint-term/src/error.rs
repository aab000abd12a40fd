// SPDX-License-Identifier: MIT
//
// Crate error type.
//
// Every failure in this crate is unrecoverable at the point it occurs:
// the caller clears the screen, restores the terminal, prints the
// diagnostic, and exits non-zero. The variants exist so the diagnostic
// can say which stage failed, not to support recovery. The only retry
// anywhere is the benign would-block retry inside `input::read_key`.

use std::io;

use thiserror::Error;

/// Errors produced by the terminal core.
#[derive(Debug, Error)]
pub enum Error {
    /// Querying the terminal's current attributes failed.
    #[error("failed to query terminal attributes")]
    TerminalQuery(#[source] io::Error),

    /// Applying the raw attribute set (or restoring the original) failed.
    #[error("failed to configure terminal attributes")]
    TerminalConfig(#[source] io::Error),

    /// Both the native size query and the cursor-report fallback failed.
    #[error("terminal geometry unavailable")]
    GeometryUnavailable,

    /// The cursor position report did not parse as `ESC [ rows ; cols R`.
    #[error("malformed cursor position report")]
    MalformedResponse,

    /// A read or write failed with something other than a benign would-block.
    #[error("terminal I/O failed")]
    Io(#[from] io::Error),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;
