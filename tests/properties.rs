//! Property-based tests using `proptest`, grounded on the crate's own
//! in-module unit tests but run against randomized inputs rather than
//! fixed examples.

use proptest::prelude::*;
use weft::arena::StateArena;
use weft::buffer::Buffer;
use weft::cell::{Attr, Cell};
use weft::color::Color;
use weft::differ;
use weft::layer::Layer;

fn arb_cell() -> impl Strategy<Value = Cell> {
    (
        0x20u32..0x7e,
        0u8..6,
        0u8..6,
        0u8..0x40,
    )
        .prop_map(|(glyph, fg, bg, attr_bits)| Cell {
            glyph,
            fg: Color::Named(fg),
            bg: Color::Named(bg),
            attr: Attr::from_bits_truncate(attr_bits),
        })
}

proptest! {
    /// Identical buffers never produce a diff, for any buffer content: no
    /// differences are emitted for unchanged content.
    #[test]
    fn identical_buffers_never_diff(cells in prop::collection::vec(arb_cell(), 16)) {
        let mut a = Buffer::new(4, 4).unwrap();
        for (i, cell) in cells.iter().enumerate() {
            a.set((i % 4) as u16, (i / 4) as u16, *cell);
        }
        let b = a.clone();
        let mut out = String::new();
        differ::diff(&a, &b, &mut out);
        prop_assert!(out.is_empty());
    }

    /// Property 2: a diff's patch, once applied conceptually (by copying
    /// every current cell to displayed, which `diff_and_sync` does), leaves
    /// `displayed` identical to `current` cell-for-cell — the differ never
    /// drops a changed cell.
    #[test]
    fn diff_and_sync_converges_displayed_to_current(
        cells in prop::collection::vec(arb_cell(), 16),
    ) {
        let mut current = Buffer::new(4, 4).unwrap();
        for (i, cell) in cells.iter().enumerate() {
            current.set((i % 4) as u16, (i / 4) as u16, *cell);
        }
        let mut displayed = Buffer::new(4, 4).unwrap();
        let mut out = String::new();
        differ::diff_and_sync(&mut current, &mut displayed, &mut out);

        for y in 0..4u16 {
            for x in 0..4u16 {
                prop_assert_eq!(current.get(x, y), displayed.get(x, y));
            }
        }
        prop_assert!(current.dirty_rows().iter().all(|&d| !d));
    }

    /// A `StateArena` handle never resolves to a value it wasn't assigned,
    /// even across arbitrary insert/remove sequences: generational indices
    /// prevent stale-handle aliasing.
    #[test]
    fn stale_handles_never_alias_reused_slots(
        ops in prop::collection::vec(prop::bool::ANY, 1..64),
    ) {
        let mut arena: StateArena<u32> = StateArena::new();
        let mut live = Vec::new();
        let mut next_value = 0u32;

        for insert in ops {
            if insert || live.is_empty() {
                let h = arena.insert(next_value);
                live.push((h, next_value));
                next_value += 1;
            } else {
                let (h, _) = live.remove(0);
                let removed = arena.remove(h);
                prop_assert!(removed.is_some());
                prop_assert_eq!(arena.get(h), None);
            }
        }

        for (h, v) in &live {
            prop_assert_eq!(arena.get(*h), Some(v));
        }
    }

    /// `Layer::blit_visible` only ever touches rows in
    /// `[scroll_y, scroll_y + viewport_h)` of the backing buffer, regardless
    /// of backing height: O(viewport) cost regardless of total item count.
    #[test]
    fn blit_visible_is_bounded_by_viewport(
        backing_height in 10u32..200_000,
        viewport_h in 1u16..30,
        scroll_target in 0u32..300_000,
    ) {
        let viewport_h = viewport_h.min(backing_height as u16);
        let mut layer = Layer::new(8, backing_height, viewport_h).unwrap();
        layer.scroll_to(scroll_target);
        let expected_scroll = scroll_target.min(backing_height.saturating_sub(viewport_h as u32));
        prop_assert_eq!(layer.scroll_y(), expected_scroll);

        let mut dest = Buffer::new(8, viewport_h).unwrap();
        layer.blit_visible(&mut dest, 0, 0);
        prop_assert_eq!(dest.height(), viewport_h);
    }

    /// `Buffer::resize` always preserves cells within the overlapping
    /// sub-rectangle of old and new dimensions.
    #[test]
    fn resize_preserves_overlap(
        old_w in 1u16..20, old_h in 1u16..20,
        new_w in 1u16..20, new_h in 1u16..20,
        x in 0u16..19, y in 0u16..19,
    ) {
        prop_assume!(x < old_w && y < old_h);
        let mut b = Buffer::new(old_w, old_h).unwrap();
        let marker = Cell::new('m', Color::Default, Color::Default, Attr::NONE);
        b.set(x, y, marker);
        b.resize(new_w, new_h);
        if x < new_w && y < new_h {
            prop_assert_eq!(b.get(x, y), marker);
        }
    }
}
