//! The boundary between terminal input bytes and a key-sequence router.
//! Matching, counts, and handler dispatch live on the application side of
//! that boundary; this module defines the key identifier vocabulary and
//! translates `crossterm` events into it; it does not implement matching,
//! counts, or handler dispatch.
//!
//! Grounded on `packages/spark-tui/rust/input/keyboard.rs`'s `dispatch_key`
//! event classification (Ctrl+C, Tab/Shift+Tab, arrow/page/home/end), but
//! narrowed to translation only — this engine hands key identifiers to the
//! app's own router rather than owning a handler table.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// A canonical key identifier string: `"q"`, `"<C-n>"`, `"<Esc>"`, `"<Up>"`,
/// `"<Enter>"`, `"<BS>"`, `"<Space>"`, `"<tab>"`.
pub type KeyId = String;

/// Translate a `crossterm` key event into its canonical identifier.
pub fn key_id(event: KeyEvent) -> KeyId {
    let ctrl = event.modifiers.contains(KeyModifiers::CONTROL);

    match event.code {
        KeyCode::Char(c) if ctrl => format!("<C-{c}>"),
        KeyCode::Char(' ') => "<Space>".to_string(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Esc => "<Esc>".to_string(),
        KeyCode::Enter => "<Enter>".to_string(),
        KeyCode::Backspace => "<BS>".to_string(),
        KeyCode::Tab => "<tab>".to_string(),
        KeyCode::Up => "<Up>".to_string(),
        KeyCode::Down => "<Down>".to_string(),
        KeyCode::Left => "<Left>".to_string(),
        KeyCode::Right => "<Right>".to_string(),
        KeyCode::Home => "<Home>".to_string(),
        KeyCode::End => "<End>".to_string(),
        KeyCode::PageUp => "<PgUp>".to_string(),
        KeyCode::PageDown => "<PgDn>".to_string(),
        KeyCode::F(n) => format!("<F{n}>"),
        _ => String::new(),
    }
}

/// A render-request source. The app loop coalesces any number of these
/// between two frames into a single frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderCause {
    Input,
    Explicit,
    Resize,
    Tick,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ev(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn plain_char_is_itself() {
        assert_eq!(key_id(ev(KeyCode::Char('q'), KeyModifiers::NONE)), "q");
    }

    #[test]
    fn ctrl_char_uses_angle_bracket_form() {
        assert_eq!(key_id(ev(KeyCode::Char('n'), KeyModifiers::CONTROL)), "<C-n>");
    }

    #[test]
    fn named_keys_use_their_canonical_form() {
        assert_eq!(key_id(ev(KeyCode::Esc, KeyModifiers::NONE)), "<Esc>");
        assert_eq!(key_id(ev(KeyCode::Up, KeyModifiers::NONE)), "<Up>");
        assert_eq!(key_id(ev(KeyCode::Enter, KeyModifiers::NONE)), "<Enter>");
        assert_eq!(key_id(ev(KeyCode::Char(' '), KeyModifiers::NONE)), "<Space>");
    }
}
