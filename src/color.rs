//! Terminal color model.
//!
//! Grounded on the color handling in `src/types.rs::Rgba`, but reshaped as a
//! real tagged union instead of `Rgba`'s sentinel-encoded `i16` fields
//! (`r == -1` for default, `r == -2` for an ANSI index). An enum lets the
//! differ and the ANSI writer match exhaustively instead of checking
//! sentinels.

/// A terminal color.
///
/// `Default` defers to whatever the terminal's current foreground/background
/// is (no SGR color code emitted). `Named` covers the 16 standard ANSI
/// colors, `Palette` the 256-color cube, `RGB` true color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Color {
    #[default]
    Default,
    /// Standard ANSI color index, 0-15 (0-7 normal, 8-15 bright).
    Named(u8),
    /// 256-color palette index.
    Palette(u8),
    /// 24-bit true color.
    Rgb(u8, u8, u8),
}

impl Color {
    pub const BLACK: Color = Color::Named(0);
    pub const RED: Color = Color::Named(1);
    pub const GREEN: Color = Color::Named(2);
    pub const YELLOW: Color = Color::Named(3);
    pub const BLUE: Color = Color::Named(4);
    pub const MAGENTA: Color = Color::Named(5);
    pub const CYAN: Color = Color::Named(6);
    pub const WHITE: Color = Color::Named(7);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color::Rgb(r, g, b)
    }
}

/// Foreground/background SGR codes for a named color, split so callers can
/// pick the fg (30..37 / 90..97) or bg (40..47 / 100..107) base.
pub(crate) fn named_sgr_fg(index: u8) -> u16 {
    if index < 8 {
        30 + index as u16
    } else {
        90 + (index - 8) as u16
    }
}

pub(crate) fn named_sgr_bg(index: u8) -> u16 {
    if index < 8 {
        40 + index as u16
    } else {
        100 + (index - 8) as u16
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_sgr_splits_normal_and_bright() {
        assert_eq!(named_sgr_fg(0), 30);
        assert_eq!(named_sgr_fg(7), 37);
        assert_eq!(named_sgr_fg(8), 90);
        assert_eq!(named_sgr_fg(15), 97);
        assert_eq!(named_sgr_bg(0), 40);
        assert_eq!(named_sgr_bg(15), 107);
    }

    #[test]
    fn default_color_is_default_variant() {
        assert_eq!(Color::default(), Color::Default);
    }
}
