//! The cell buffer: a grid of styled glyphs with dirty-row tracking.
//!
//! Grounded on `rust/src/renderer/buffer.rs::FrameBuffer` (flat `Vec<Cell>`
//! storage, row-major indexing, bounds-checked `get`/`set`, `draw_text`,
//! `draw_border`), plus a `dirty_rows` bitset so the differ can skip
//! untouched rows in O(1), and a `revision` counter that tracks total
//! mutations.

use crate::cell::{Attr, Cell};
use crate::error::{Error, Result};

/// A width×height grid of [`Cell`]s.
///
/// Invariant: `cells.len() == width as usize * height as usize`; row `y`
/// spans `[y*width, (y+1)*width)`.
#[derive(Debug, Clone)]
pub struct Buffer {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
    dirty_rows: Vec<bool>,
    revision: u64,
}

impl Buffer {
    pub fn new(width: u16, height: u16) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidGeometry { width, height });
        }
        let size = width as usize * height as usize;
        Ok(Self {
            width,
            height,
            cells: vec![Cell::default(); size],
            dirty_rows: vec![false; height as usize],
            revision: 0,
        })
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    #[inline]
    fn index(&self, x: u16, y: u16) -> usize {
        y as usize * self.width as usize + x as usize
    }

    #[inline]
    fn in_bounds(&self, x: u16, y: u16) -> bool {
        x < self.width && y < self.height
    }

    /// Bounds-checked read. Out-of-range coordinates return the default
    /// cell rather than panicking — layout errors should not crash a UI.
    pub fn get(&self, x: u16, y: u16) -> Cell {
        if self.in_bounds(x, y) {
            self.cells[self.index(x, y)]
        } else {
            Cell::default()
        }
    }

    /// Bounds-checked write. A no-op if out of range. Marks row `y` dirty
    /// iff the new cell differs from the old one.
    pub fn set(&mut self, x: u16, y: u16, cell: Cell) {
        if !self.in_bounds(x, y) {
            return;
        }
        let idx = self.index(x, y);
        if self.cells[idx] != cell {
            self.cells[idx] = cell;
            self.dirty_rows[y as usize] = true;
            self.revision += 1;
        }
    }

    /// Write `text` left-to-right starting at `(x, y)`, clipping at
    /// `max_width` cells and at the row edge. Every code point counts as
    /// width 1 — East-Asian-wide and emoji glyphs are not measured against
    /// a real width table in this version.
    pub fn write_string(&mut self, x: u16, y: u16, text: &str, style: crate::cell::Style, max_width: u16) {
        let mut col = x;
        let limit = x.saturating_add(max_width).min(self.width);
        for ch in text.chars() {
            if col >= limit {
                break;
            }
            self.set(
                col,
                y,
                Cell {
                    glyph: ch as u32,
                    fg: style.fg,
                    bg: style.bg,
                    attr: style.attr,
                },
            );
            col += 1;
        }
    }

    /// Overwrite every cell with the default; marks all rows dirty.
    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            *cell = Cell::default();
        }
        for dirty in &mut self.dirty_rows {
            *dirty = true;
        }
        self.revision += 1;
    }

    /// Overwrite every cell with the default but do NOT mark rows dirty.
    ///
    /// Used by [`crate::pool::BufferPool`] when the caller intends to
    /// redraw the whole frame: a cell written back to the value it held in
    /// the *displayed* buffer then produces no diff emission, which is how
    /// the differ achieves minimal output across a swap.
    pub fn clear_dirty(&mut self) {
        for cell in &mut self.cells {
            *cell = Cell::default();
        }
    }

    pub fn dirty_rows(&self) -> &[bool] {
        &self.dirty_rows
    }

    pub fn clear_dirty_rows(&mut self) {
        for dirty in &mut self.dirty_rows {
            *dirty = false;
        }
    }

    pub fn mark_row_dirty(&mut self, y: u16) {
        if (y as usize) < self.dirty_rows.len() {
            self.dirty_rows[y as usize] = true;
        }
    }

    /// Resize in place. Contents are truncated or padded with default cells;
    /// existing cells retained at the same (x, y) are preserved.
    pub fn resize(&mut self, width: u16, height: u16) {
        if width == self.width && height == self.height {
            return;
        }
        let mut next = vec![Cell::default(); width as usize * height as usize];
        let copy_w = width.min(self.width);
        let copy_h = height.min(self.height);
        for y in 0..copy_h {
            for x in 0..copy_w {
                next[y as usize * width as usize + x as usize] = self.cells[self.index(x, y)];
            }
        }
        self.cells = next;
        self.width = width;
        self.height = height;
        self.dirty_rows = vec![true; height as usize];
        self.revision += 1;
    }

    /// A writable view onto a sub-rectangle, clipped against these bounds.
    /// Writes through the view are translated into parent coordinates.
    pub fn sub_region(&mut self, x: u16, y: u16, w: u16, h: u16) -> RegionView<'_> {
        let clip_w = w.min(self.width.saturating_sub(x));
        let clip_h = h.min(self.height.saturating_sub(y));
        RegionView {
            buffer: self,
            origin_x: x,
            origin_y: y,
            width: clip_w,
            height: clip_h,
        }
    }

    pub fn hline(&mut self, x: u16, y: u16, w: u16, glyph: char, style: crate::cell::Style) {
        for i in 0..w {
            self.set(x + i, y, Cell { glyph: glyph as u32, fg: style.fg, bg: style.bg, attr: style.attr });
        }
    }

    pub fn vline(&mut self, x: u16, y: u16, h: u16, glyph: char, style: crate::cell::Style) {
        for i in 0..h {
            self.set(x, y + i, Cell { glyph: glyph as u32, fg: style.fg, bg: style.bg, attr: style.attr });
        }
    }

    /// Draw a bordered panel, optionally with a title truncated to fit into
    /// the top border.
    pub fn draw_panel(
        &mut self,
        x: u16,
        y: u16,
        w: u16,
        h: u16,
        border: crate::node::BorderStyle,
        title: Option<&str>,
        style: crate::cell::Style,
    ) {
        if w < 2 || h < 2 || border == crate::node::BorderStyle::None {
            return;
        }
        let (horiz, vert, tl, tr, br, bl) = border.chars();
        let x2 = x + w - 1;
        let y2 = y + h - 1;

        self.set(x, y, glyph_cell(tl, style));
        self.set(x2, y, glyph_cell(tr, style));
        self.set(x2, y2, glyph_cell(br, style));
        self.set(x, y2, glyph_cell(bl, style));
        for col in (x + 1)..x2 {
            self.set(col, y, glyph_cell(horiz, style));
            self.set(col, y2, glyph_cell(horiz, style));
        }
        for row in (y + 1)..y2 {
            self.set(x, row, glyph_cell(vert, style));
            self.set(x2, row, glyph_cell(vert, style));
        }

        if let Some(title) = title {
            let inner_w = x2.saturating_sub(x + 1);
            if inner_w > 0 {
                self.write_string(x + 1, y, title, style, inner_w);
            }
        }
    }
}

fn glyph_cell(glyph: &str, style: crate::cell::Style) -> Cell {
    let ch = glyph.chars().next().unwrap_or(' ');
    Cell { glyph: ch as u32, fg: style.fg, bg: style.bg, attr: style.attr }
}

/// A writable view onto a rectangular sub-region of a [`Buffer`]. Writes are
/// translated into parent coordinates and clipped against the region's
/// bounds, which are themselves already clipped against the parent's.
pub struct RegionView<'a> {
    buffer: &'a mut Buffer,
    origin_x: u16,
    origin_y: u16,
    width: u16,
    height: u16,
}

impl RegionView<'_> {
    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn set(&mut self, x: u16, y: u16, cell: Cell) {
        if x < self.width && y < self.height {
            self.buffer.set(self.origin_x + x, self.origin_y + y, cell);
        }
    }

    pub fn write_string(&mut self, x: u16, y: u16, text: &str, style: crate::cell::Style, max_width: u16) {
        if y >= self.height {
            return;
        }
        let clipped = max_width.min(self.width.saturating_sub(x));
        self.buffer.write_string(self.origin_x + x, self.origin_y + y, text, style, clipped);
    }
}

/// Width in terminal cells of a single code point.
///
/// Spec §9's open question: this version treats every code point as width 1,
/// including East-Asian-wide and emoji. A future version consulting a width
/// table would change only this function and [`string_width`].
pub fn char_width(_c: char) -> usize {
    1
}

pub fn string_width(s: &str) -> usize {
    s.chars().map(char_width).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Style;
    use crate::color::Color;

    #[test]
    fn set_then_get_roundtrips_in_bounds() {
        let mut b = Buffer::new(10, 5).unwrap();
        let cell = Cell::new('x', Color::RED, Color::Default, Attr::BOLD);
        b.set(3, 2, cell);
        assert_eq!(b.get(3, 2), cell);
    }

    #[test]
    fn out_of_bounds_get_returns_default() {
        let b = Buffer::new(4, 4).unwrap();
        assert_eq!(b.get(100, 100), Cell::default());
    }

    #[test]
    fn out_of_bounds_set_is_noop() {
        let mut b = Buffer::new(4, 4).unwrap();
        b.set(100, 100, Cell::new('x', Color::RED, Color::Default, Attr::NONE));
        assert_eq!(b.dirty_rows().iter().filter(|&&d| d).count(), 0);
    }

    #[test]
    fn set_marks_row_dirty_only_on_change() {
        let mut b = Buffer::new(4, 4).unwrap();
        assert!(!b.dirty_rows()[1]);
        b.set(0, 1, Cell::default());
        // Same value as default: no change, no dirty.
        assert!(!b.dirty_rows()[1]);
        b.set(0, 1, Cell::new('x', Color::Default, Color::Default, Attr::NONE));
        assert!(b.dirty_rows()[1]);
    }

    #[test]
    fn clear_marks_all_dirty() {
        let mut b = Buffer::new(4, 4).unwrap();
        b.clear_dirty_rows();
        b.clear();
        assert!(b.dirty_rows().iter().all(|&d| d));
    }

    #[test]
    fn clear_dirty_does_not_mark_rows() {
        let mut b = Buffer::new(4, 4).unwrap();
        b.set(0, 0, Cell::new('x', Color::Default, Color::Default, Attr::NONE));
        b.clear_dirty_rows();
        b.clear_dirty();
        assert!(b.dirty_rows().iter().all(|&d| !d));
        assert_eq!(b.get(0, 0), Cell::default());
    }

    #[test]
    fn write_string_clips_at_max_width_and_row_edge() {
        let mut b = Buffer::new(5, 1).unwrap();
        b.write_string(2, 0, "hello", Style::default(), 10);
        assert_eq!(b.get(2, 0).ch(), Some('h'));
        assert_eq!(b.get(3, 0).ch(), Some('e'));
        assert_eq!(b.get(4, 0).ch(), Some('l'));
    }

    #[test]
    fn invalid_geometry_rejected() {
        assert!(Buffer::new(0, 5).is_err());
        assert!(Buffer::new(5, 0).is_err());
    }

    #[test]
    fn sub_region_translates_coordinates_and_clips() {
        let mut b = Buffer::new(10, 10).unwrap();
        {
            let mut region = b.sub_region(2, 2, 3, 3);
            region.set(0, 0, Cell::new('a', Color::Default, Color::Default, Attr::NONE));
            region.set(10, 10, Cell::new('z', Color::Default, Color::Default, Attr::NONE));
        }
        assert_eq!(b.get(2, 2).ch(), Some('a'));
        assert_eq!(b.get(12, 12), Cell::default());
    }

    #[test]
    fn resize_preserves_overlapping_cells() {
        let mut b = Buffer::new(4, 4).unwrap();
        b.set(1, 1, Cell::new('x', Color::Default, Color::Default, Attr::NONE));
        b.resize(2, 2);
        assert_eq!(b.get(1, 1).ch(), Some('x'));
        b.resize(6, 6);
        assert_eq!(b.get(1, 1).ch(), Some('x'));
        assert_eq!(b.get(5, 5), Cell::default());
    }

    #[test]
    fn draw_panel_draws_corners_and_title() {
        let mut b = Buffer::new(10, 4).unwrap();
        b.draw_panel(0, 0, 10, 4, crate::node::BorderStyle::Single, Some("hi"), Style::default());
        assert_eq!(b.get(0, 0).ch(), Some('┌'));
        assert_eq!(b.get(9, 0).ch(), Some('┐'));
        assert_eq!(b.get(1, 0).ch(), Some('h'));
    }
}
