//! Minimal-patch diffing between two buffers.
//!
//! Grounded on `src/renderer/diff.rs`'s row-scan-and-run-length shape, with
//! the row skip driven by [`crate::buffer::Buffer::dirty_rows`] — critical
//! for large screens where most rows don't change between frames.

use crate::ansi;
use crate::buffer::Buffer;
use crate::cell::Style;

/// Compares `current` against `displayed` and writes the minimal ANSI patch
/// into `out`. Only rows `current` marks dirty are scanned. After emission
/// the caller is responsible for syncing `displayed` to `current` (done by
/// [`diff_and_sync`]) and clearing dirty bits.
pub fn diff(current: &Buffer, displayed: &Buffer, out: &mut String) {
    let _span = tracing::trace_span!("diff", width = current.width(), height = current.height()).entered();
    debug_assert_eq!(current.width(), displayed.width());
    debug_assert_eq!(current.height(), displayed.height());

    let width = current.width();
    let mut last_style: Option<Style> = None;

    for y in 0..current.height() {
        if !current.dirty_rows()[y as usize] {
            continue;
        }
        let mut x = 0u16;
        while x < width {
            let cur = current.get(x, y);
            let old = displayed.get(x, y);
            if cur == old {
                x += 1;
                continue;
            }
            // Start of a differing run: walk until cells match again.
            let run_start = x;
            let mut glyphs = String::new();
            let mut run_style = cur.style();
            while x < width {
                let cur = current.get(x, y);
                let old = displayed.get(x, y);
                if cur == old {
                    break;
                }
                if cur.style() != run_style && !glyphs.is_empty() {
                    break;
                }
                run_style = cur.style();
                if let Some(ch) = cur.ch() {
                    glyphs.push(ch);
                }
                x += 1;
            }
            ansi::cursor_to(out, run_start, y);
            if last_style != Some(run_style) {
                ansi::sgr(out, run_style);
                last_style = Some(run_style);
            }
            out.push_str(&glyphs);
        }
    }
}

/// Run [`diff`], then sync `displayed` to `current` and clear `current`'s
/// dirty bits — the whole per-frame flush step.
pub fn diff_and_sync(current: &mut Buffer, displayed: &mut Buffer, out: &mut String) {
    diff(current, displayed, out);
    for y in 0..current.height() {
        if !current.dirty_rows()[y as usize] {
            continue;
        }
        for x in 0..current.width() {
            displayed.set(x, y, current.get(x, y));
        }
    }
    current.clear_dirty_rows();
    tracing::debug!(patch_bytes = out.len(), "diff_and_sync complete");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::{Attr, Cell};
    use crate::color::Color;

    #[test]
    fn identical_buffers_with_no_dirty_rows_emit_nothing() {
        let a = Buffer::new(10, 5).unwrap();
        let b = Buffer::new(10, 5).unwrap();
        let mut out = String::new();
        diff(&a, &b, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn single_changed_cell_emits_cursor_and_glyph() {
        let mut a = Buffer::new(10, 5).unwrap();
        let b = Buffer::new(10, 5).unwrap();
        a.set(2, 1, Cell::new('x', Color::Default, Color::Default, Attr::NONE));
        let mut out = String::new();
        diff(&a, &b, &mut out);
        assert!(out.contains("\x1b[2;3H"));
        assert!(out.contains('x'));
    }

    #[test]
    fn row_not_dirty_is_skipped_even_if_cells_differ() {
        let mut a = Buffer::new(10, 5).unwrap();
        let b = Buffer::new(10, 5).unwrap();
        a.set(2, 1, Cell::new('x', Color::Default, Color::Default, Attr::NONE));
        a.clear_dirty_rows();
        let mut out = String::new();
        diff(&a, &b, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn same_style_run_emits_one_sgr_code() {
        let mut a = Buffer::new(10, 1).unwrap();
        let b = Buffer::new(10, 1).unwrap();
        let style = crate::cell::Style::new(Color::RED, Color::Default, Attr::NONE);
        a.write_string(0, 0, "abc", style, 10);
        let mut out = String::new();
        diff(&a, &b, &mut out);
        assert_eq!(out.matches("\x1b[0;31m").count(), 1);
        assert!(out.contains("abc"));
    }

    #[test]
    fn diff_and_sync_updates_displayed_and_clears_dirty() {
        let mut a = Buffer::new(4, 4).unwrap();
        let mut b = Buffer::new(4, 4).unwrap();
        a.set(0, 0, Cell::new('z', Color::Default, Color::Default, Attr::NONE));
        let mut out = String::new();
        diff_and_sync(&mut a, &mut b, &mut out);
        assert_eq!(b.get(0, 0).ch(), Some('z'));
        assert!(!out.is_empty());
        assert!(a.dirty_rows().iter().all(|&d| !d));
    }
}
