//! Flex-style layout engine.
//!
//! Measurement and placement are delegated to `taffy`, exactly as
//! `layout/taffy_bridge.rs` does (`build_style` translating the node
//! tree's sizing hints into `taffy::style::Style`, then
//! `TaffyTree::compute_layout` doing the two-pass measure-then-place work).
//! `text_measure.rs`'s leaf-measure-function hookup is kept for `Text`
//! nodes, retargeted onto [`crate::buffer::string_width`]'s width-1 policy
//! instead of a font metrics table.

use taffy::prelude::*;
use taffy::{NodeId, TaffyTree};

use crate::buffer::string_width;
use crate::error::{Error, Result};
use crate::node::{FlexDirection, Node, Sizing};

/// The placed rectangle for a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LayoutBox {
    pub x: u16,
    pub y: u16,
    pub w: u16,
    pub h: u16,
}

pub(crate) fn dimension_from_sizing(sizing: Sizing) -> Dimension {
    match sizing {
        Sizing::Fixed(n) => length(n as f32),
        Sizing::FitContent => auto(),
        Sizing::Grow(_) => percent(1.0),
        Sizing::Percent(f) => percent(f),
    }
}

fn grow_weight(sizing: Sizing) -> f32 {
    match sizing {
        Sizing::Grow(w) => w as f32,
        _ => 0.0,
    }
}

pub(crate) fn node_leaf_text(text: &str) -> Style {
    Style {
        size: Size { width: length(string_width(text) as f32), height: length(1.0) },
        ..Default::default()
    }
}

/// Build the taffy style for one node's own box (not its children). `text`
/// is supplied for `Text` leaves since their preferred size comes from
/// glyph count, not sizing hints: preferred width is glyph count × 1.
pub(crate) fn build_style(layout: &crate::node::Layout, direction: FlexDirection, border: bool) -> Style {
    let taffy_direction = match direction {
        FlexDirection::Row => taffy::style::FlexDirection::Row,
        FlexDirection::Column => taffy::style::FlexDirection::Column,
    };
    let padding_len = length(layout.padding as f32);
    let border_len = if border { length(1.0) } else { length(0.0) };

    Style {
        display: Display::Flex,
        flex_direction: taffy_direction,
        size: Size { width: dimension_from_sizing(layout.width), height: dimension_from_sizing(layout.height) },
        gap: Size { width: length(layout.gap as f32), height: length(layout.gap as f32) },
        padding: Rect { left: padding_len, right: padding_len, top: padding_len, bottom: padding_len },
        border: Rect { left: border_len, right: border_len, top: border_len, bottom: border_len },
        flex_grow: grow_weight(layout.width).max(grow_weight(layout.height)),
        flex_shrink: 1.0,
        ..Default::default()
    }
}

/// Compile a [`Node`] tree into a taffy tree and compute layout for it
/// against `(width, height)`. Returns the tree plus the root id so callers
/// can query [`Self::box_for`] per descendant during program execution.
pub struct LayoutTree {
    taffy: TaffyTree<()>,
    root: NodeId,
}

impl LayoutTree {
    pub(crate) fn empty_taffy() -> TaffyTree<()> {
        TaffyTree::new()
    }

    /// Wrap an already-populated taffy tree (built by [`crate::program`]'s
    /// own traversal, which interleaves op flattening with node insertion)
    /// and compute its initial layout.
    pub(crate) fn from_parts(taffy: TaffyTree<()>, root: NodeId, width: u16, height: u16) -> Result<Self> {
        let mut tree = Self { taffy, root };
        tree.recompute(width, height)?;
        Ok(tree)
    }

    pub fn build(node: &Node, width: u16, height: u16) -> Result<Self> {
        let mut taffy = TaffyTree::new();
        let root = insert_node(&mut taffy, node, FlexDirection::Column)
            .map_err(|e| Error::CompileFailure(e.to_string()))?;
        taffy
            .compute_layout(
                root,
                Size { width: AvailableSpace::Definite(width as f32), height: AvailableSpace::Definite(height as f32) },
            )
            .map_err(|e| Error::CompileFailure(e.to_string()))?;
        Ok(Self { taffy, root })
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Recompute placement against a possibly-changed viewport or after a
    /// leaf's measured size was updated via [`Self::set_leaf_width`].
    /// Structure is untouched; this is the cheap per-frame half of layout.
    pub fn recompute(&mut self, width: u16, height: u16) -> Result<()> {
        self.taffy
            .compute_layout(
                self.root,
                Size { width: AvailableSpace::Definite(width as f32), height: AvailableSpace::Definite(height as f32) },
            )
            .map_err(|e| Error::CompileFailure(e.to_string()))
    }

    /// Update a text leaf's measured width (glyph count) ahead of
    /// [`Self::recompute`]. Used for `fit-content` text bound to live state:
    /// its length can change every frame without the node tree's structure
    /// changing, so this refreshes the taffy leaf without a full rebuild.
    pub fn set_leaf_width(&mut self, id: NodeId, width_cells: u16) -> Result<()> {
        let mut style = self.taffy.style(id).map_err(|e| Error::CompileFailure(e.to_string()))?.clone();
        style.size.width = length(width_cells as f32);
        self.taffy.set_style(id, style).map_err(|e| Error::CompileFailure(e.to_string()))
    }

    pub fn box_for(&self, id: NodeId) -> LayoutBox {
        let l = self.taffy.layout(id).expect("node id was produced by this tree");
        LayoutBox {
            x: l.location.x.max(0.0) as u16,
            y: l.location.y.max(0.0) as u16,
            w: l.size.width.max(0.0) as u16,
            h: l.size.height.max(0.0) as u16,
        }
    }
}

fn insert_node(
    taffy: &mut TaffyTree<()>,
    node: &Node,
    parent_direction: FlexDirection,
) -> std::result::Result<NodeId, taffy::TaffyError> {
    match node {
        Node::Text { source, layout, .. } => {
            let text = match source {
                crate::node::TextSource::Literal(s) => s.to_string(),
                crate::node::TextSource::Bound(_) | crate::node::TextSource::ForEachItem => String::new(),
            };
            let mut style = build_style(layout, parent_direction, false);
            let measured = node_leaf_text(&text);
            if matches!(layout.width, Sizing::FitContent) {
                style.size.width = measured.size.width;
            }
            if matches!(layout.height, Sizing::FitContent) {
                style.size.height = measured.size.height;
            }
            taffy.new_leaf(style)
        }
        Node::Spacer { layout } => taffy.new_leaf(build_style(layout, parent_direction, false)),
        Node::Progress { width, .. } => {
            taffy.new_leaf(Style { size: Size { width: length(*width as f32), height: length(1.0) }, ..Default::default() })
        }
        Node::Row { children, layout, .. } => {
            let kids: std::result::Result<Vec<_>, _> =
                children.iter().map(|c| insert_node(taffy, c, FlexDirection::Row)).collect();
            taffy.new_with_children(build_style(layout, parent_direction, false), &kids?)
        }
        Node::Col { children, layout, .. } => {
            let kids: std::result::Result<Vec<_>, _> =
                children.iter().map(|c| insert_node(taffy, c, FlexDirection::Column)).collect();
            taffy.new_with_children(build_style(layout, parent_direction, false), &kids?)
        }
        Node::Border { child, layout, .. } => {
            let kid = insert_node(taffy, child, FlexDirection::Column)?;
            taffy.new_with_children(build_style(layout, parent_direction, true), &[kid])
        }
        Node::If { then_branch, .. } => insert_node(taffy, then_branch, parent_direction),
        Node::ForEach { .. } => taffy.new_leaf(Style::default()),
        Node::LayerView { layout, .. } => taffy.new_leaf(build_style(layout, parent_direction, false)),
        Node::VirtualList { viewport_h, layout, .. } => {
            let mut style = build_style(layout, parent_direction, false);
            if matches!(layout.width, Sizing::FitContent) {
                style.size.width = percent(1.0);
            }
            if matches!(layout.height, Sizing::FitContent) {
                style.size.height = length(*viewport_h as f32);
            }
            taffy.new_leaf(style)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_text_node_measures_to_glyph_count() {
        let node = Node::text("hello");
        let tree = LayoutTree::build(&node, 80, 24).unwrap();
        let b = tree.box_for(tree.root());
        assert_eq!(b.w, 5);
        assert_eq!(b.h, 1);
    }

    #[test]
    fn row_sums_children_along_main_axis() {
        let node = Node::row(vec![Node::text("ab"), Node::text("cde")]);
        let tree = LayoutTree::build(&node, 80, 24).unwrap();
        let b = tree.box_for(tree.root());
        assert_eq!(b.w, 5);
    }

    #[test]
    fn zero_size_grant_does_not_error() {
        let node = Node::text("hello");
        // A zero-size grant must still compute a layout; any overflow past
        // the terminal bounds is clipped later by Buffer::set, not here.
        assert!(LayoutTree::build(&node, 0, 0).is_ok());
    }
}
