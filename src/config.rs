//! Terminal environment hints: reads `TERM`, `COLORTERM`, `LINES`, `COLUMNS`
//! as hints and falls back to an ioctl terminal-size query.
//!
//! Grounded on `saorsa-tui`'s configuration conventions in spirit (plain
//! struct, no persistence) but deliberately does NOT add `toml`/`serde`/
//! `dirs` the way that crate's on-disk config does — there is no persistent
//! state on disk for this engine to load or save.

use crossterm::terminal;

use crate::error::{Error, Result};

/// What the environment told us, or what we fell back to querying.
#[derive(Debug, Clone)]
pub struct TerminalHints {
    pub term: Option<String>,
    pub colorterm: Option<String>,
    pub width: u16,
    pub height: u16,
}

impl TerminalHints {
    /// Read `TERM`/`COLORTERM`/`LINES`/`COLUMNS`; any dimension not present
    /// (or unparsable) falls back to an ioctl terminal-size query.
    pub fn detect() -> Result<Self> {
        let term = std::env::var("TERM").ok();
        let colorterm = std::env::var("COLORTERM").ok();

        let env_width = std::env::var("COLUMNS").ok().and_then(|v| v.parse::<u16>().ok());
        let env_height = std::env::var("LINES").ok().and_then(|v| v.parse::<u16>().ok());

        let (width, height) = match (env_width, env_height) {
            (Some(w), Some(h)) => (w, h),
            _ => {
                let (w, h) = terminal::size().map_err(|e| Error::TerminalUnavailable(e.to_string()))?;
                (env_width.unwrap_or(w), env_height.unwrap_or(h))
            }
        };

        Ok(Self { term, colorterm, width, height })
    }

    /// True if `COLORTERM` advertises 24-bit color support.
    pub fn truecolor(&self) -> bool {
        matches!(self.colorterm.as_deref(), Some("truecolor") | Some("24bit"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truecolor_detects_known_values() {
        let hints = TerminalHints { term: None, colorterm: Some("truecolor".into()), width: 80, height: 24 };
        assert!(hints.truecolor());
        let hints = TerminalHints { term: None, colorterm: Some("256color".into()), width: 80, height: 24 };
        assert!(!hints.truecolor());
    }
}
