//! Error types.
//!
//! Shaped on `saorsa-tui::error::SaorsaTuiError` (one `thiserror` variant per
//! failure domain, an `#[from] io::Error` arm, a crate-local `Result` alias).
//! Out-of-bounds access has deliberately no variant here: it is silently
//! clipped rather than surfaced as an error.

use std::io;

/// Errors the engine surfaces. Anything recoverable locally (clipping,
/// style fallback) never reaches this type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// stdin/stdout is not a TTY, or raw-mode entry failed.
    #[error("terminal unavailable: {0}")]
    TerminalUnavailable(String),

    /// A terminal write failed after one retry.
    #[error("write to terminal failed: {0}")]
    WriteFailed(#[from] io::Error),

    /// A buffer was constructed with width or height of zero.
    #[error("invalid geometry: width={width} height={height}")]
    InvalidGeometry { width: u16, height: u16 },

    /// `build_serial` encountered a node referencing a nil state handle.
    #[error("compile failure: {0}")]
    CompileFailure(String),

    /// The buffer pool's background clear worker panicked or hung up.
    #[error("background clear worker failed: {0}")]
    BackgroundClearFailure(String),
}

pub type Result<T> = std::result::Result<T, Error>;
