//! Cell & style — the atomic unit of terminal rendering.
//!
//! Grounded on `types.rs::Cell`/`Attr` and `Attr`'s bitflags shape; the
//! `char: u32` field plus `bitflags` attribute set carry over directly,
//! `fg`/`bg` are retyped onto [`crate::color::Color`].

use crate::color::Color;

bitflags::bitflags! {
    /// Text attributes as a bitfield so multiple attributes compose cheaply
    /// (`Attr::BOLD | Attr::UNDERLINE`).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Attr: u8 {
        const NONE = 0;
        const BOLD = 1 << 0;
        const DIM = 1 << 1;
        const ITALIC = 1 << 2;
        const UNDERLINE = 1 << 3;
        const BLINK = 1 << 4;
        const REVERSE = 1 << 5;
    }
}

/// A single terminal cell: glyph + style.
///
/// Two cells are equal iff all four fields match (derived `PartialEq`); the
/// differ uses this equality directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    /// Unicode codepoint. Space (`0x20`) for an empty cell.
    pub glyph: u32,
    pub fg: Color,
    pub bg: Color,
    pub attr: Attr,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            glyph: b' ' as u32,
            fg: Color::Default,
            bg: Color::Default,
            attr: Attr::NONE,
        }
    }
}

impl Cell {
    pub fn new(glyph: char, fg: Color, bg: Color, attr: Attr) -> Self {
        Self {
            glyph: glyph as u32,
            fg,
            bg,
            attr,
        }
    }

    /// The style half of a cell (used when comparing "did the style change"
    /// independent of the glyph, in the differ's run-length emission).
    pub fn style(&self) -> Style {
        Style {
            fg: self.fg,
            bg: self.bg,
            attr: self.attr,
        }
    }

    pub fn ch(&self) -> Option<char> {
        char::from_u32(self.glyph)
    }
}

/// Foreground/background/attribute triple, independent of glyph.
///
/// Composing a `Style` onto a default style acts as an override: explicit
/// fields replace the base, and the default style acts as identity when
/// composed with another style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Style {
    pub fg: Color,
    pub bg: Color,
    pub attr: Attr,
}

impl Style {
    pub const fn new(fg: Color, bg: Color, attr: Attr) -> Self {
        Self { fg, bg, attr }
    }

    /// Overlay `other` on top of `self`: non-default fields in `other` win.
    pub fn merge(self, other: Style) -> Style {
        Style {
            fg: if other.fg == Color::Default { self.fg } else { other.fg },
            bg: if other.bg == Color::Default { self.bg } else { other.bg },
            attr: self.attr | other.attr,
        }
    }
}
