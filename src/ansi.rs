//! ANSI/CSI escape-sequence encoding for terminal output.
//!
//! Grounded on `packages/spark-tui/rust/renderer/ansi.rs`'s function-per-
//! sequence shape (`cursor_to`, `cursor_hide`/`show`, save/restore); the SGR
//! composer is new (that file does cursor control only, not style codes)
//! and is grounded instead on `rust/src/renderer/output.rs`'s style-diffing.

use crate::cell::{Attr, Style};
use crate::color::Color;
use std::fmt::Write as _;

/// `ESC [ y ; x H`, 1-based.
pub fn cursor_to(out: &mut String, x: u16, y: u16) {
    let _ = write!(out, "\x1b[{};{}H", y + 1, x + 1);
}

pub fn cursor_hide(out: &mut String) {
    out.push_str("\x1b[?25l");
}

pub fn cursor_show(out: &mut String) {
    out.push_str("\x1b[?25h");
}

pub fn alt_screen_enter(out: &mut String) {
    out.push_str("\x1b[?1049h");
}

pub fn alt_screen_leave(out: &mut String) {
    out.push_str("\x1b[?1049l");
}

pub fn clear_screen(out: &mut String) {
    out.push_str("\x1b[2J");
}

pub fn sgr_reset(out: &mut String) {
    out.push_str("\x1b[0m");
}

/// Append the SGR codes for `style`, e.g. `ESC[1;32;40m`. Always includes a
/// leading reset code (`0`) so attributes never leak from a prior run.
pub fn sgr(out: &mut String, style: Style) {
    let mut codes: Vec<u16> = vec![0];
    if style.attr.contains(Attr::BOLD) {
        codes.push(1);
    }
    if style.attr.contains(Attr::DIM) {
        codes.push(2);
    }
    if style.attr.contains(Attr::ITALIC) {
        codes.push(3);
    }
    if style.attr.contains(Attr::UNDERLINE) {
        codes.push(4);
    }
    if style.attr.contains(Attr::BLINK) {
        codes.push(5);
    }
    if style.attr.contains(Attr::REVERSE) {
        codes.push(7);
    }
    push_color_codes(&mut codes, style.fg, false);
    push_color_codes(&mut codes, style.bg, true);

    out.push_str("\x1b[");
    for (i, code) in codes.iter().enumerate() {
        if i > 0 {
            out.push(';');
        }
        let _ = write!(out, "{code}");
    }
    out.push('m');
}

fn push_color_codes(codes: &mut Vec<u16>, color: Color, background: bool) {
    match color {
        Color::Default => {}
        Color::Named(index) => {
            codes.push(if background { crate::color::named_sgr_bg(index) } else { crate::color::named_sgr_fg(index) });
        }
        Color::Palette(index) => {
            codes.push(if background { 48 } else { 38 });
            codes.push(5);
            codes.push(index as u16);
        }
        Color::Rgb(r, g, b) => {
            codes.push(if background { 48 } else { 38 });
            codes.push(2);
            codes.push(r as u16);
            codes.push(g as u16);
            codes.push(b as u16);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_to_is_one_based() {
        let mut out = String::new();
        cursor_to(&mut out, 0, 0);
        assert_eq!(out, "\x1b[1;1H");
    }

    #[test]
    fn sgr_default_style_emits_only_reset() {
        let mut out = String::new();
        sgr(&mut out, Style::default());
        assert_eq!(out, "\x1b[0m");
    }

    #[test]
    fn sgr_composes_bold_and_named_colors() {
        let mut out = String::new();
        sgr(&mut out, Style::new(Color::RED, Color::BLACK, Attr::BOLD));
        assert_eq!(out, "\x1b[0;1;31;40m");
    }

    #[test]
    fn sgr_rgb_uses_38_2_form() {
        let mut out = String::new();
        sgr(&mut out, Style::new(Color::rgb(10, 20, 30), Color::Default, Attr::NONE));
        assert_eq!(out, "\x1b[0;38;2;10;20;30m");
    }
}
