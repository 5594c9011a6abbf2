//! The declarative node tree.
//!
//! A tagged variant, not a trait object hierarchy, so [`crate::program`] can
//! flatten the tree into a cache-friendly op array at compile time. Grounded
//! on `src/types.rs::ComponentType`'s tag-per-kind shape and
//! `src/primitives/*`'s attribute fields (sizing, gap, padding, border,
//! style overrides), but state is referenced through
//! [`crate::arena::Handle`] rather than a signal object graph.

use crate::arena::Handle;
use crate::cell::{Attr, Style};
use crate::color::Color;

/// Border glyph set for [`Node::Border`] / [`crate::buffer::Buffer::draw_panel`].
///
/// Grounded on `src/types.rs::BorderStyle`'s 10-variant enum and its
/// `chars()` accessor, kept verbatim rather than narrowed to the styles
/// this crate's own node tree actually constructs — a caller building
/// nodes by hand can reach any of the ten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum BorderStyle {
    #[default]
    None = 0,
    /// ─ │ ┌ ┐ └ ┘
    Single = 1,
    /// ═ ║ ╔ ╗ ╚ ╝
    Double = 2,
    /// ─ │ ╭ ╮ ╰ ╯
    Rounded = 3,
    /// ━ ┃ ┏ ┓ ┗ ┛
    Bold = 4,
    /// ┄ ┆ ┌ ┐ └ ┘
    Dashed = 5,
    /// · · · · · ·
    Dotted = 6,
    /// - | + + + +
    Ascii = 7,
    /// █ █ █ █ █ █
    Block = 8,
    /// ═ │ ╒ ╕ ╘ ╛ (double horizontal, single vertical)
    DoubleHorz = 9,
    /// ─ ║ ╓ ╖ ╙ ╜ (single horizontal, double vertical)
    DoubleVert = 10,
}

impl BorderStyle {
    /// Border characters for this style: (horizontal, vertical, top_left,
    /// top_right, bottom_right, bottom_left).
    pub const fn chars(&self) -> (&'static str, &'static str, &'static str, &'static str, &'static str, &'static str) {
        match self {
            Self::None => (" ", " ", " ", " ", " ", " "),
            Self::Single => ("─", "│", "┌", "┐", "┘", "└"),
            Self::Double => ("═", "║", "╔", "╗", "╝", "╚"),
            Self::Rounded => ("─", "│", "╭", "╮", "╯", "╰"),
            Self::Bold => ("━", "┃", "┏", "┓", "┛", "┗"),
            Self::Dashed => ("┄", "┆", "┌", "┐", "┘", "└"),
            Self::Dotted => ("·", "·", "·", "·", "·", "·"),
            Self::Ascii => ("-", "|", "+", "+", "+", "+"),
            Self::Block => ("█", "█", "█", "█", "█", "█"),
            Self::DoubleHorz => ("═", "│", "╒", "╕", "╛", "╘"),
            Self::DoubleVert => ("─", "║", "╓", "╖", "╜", "╙"),
        }
    }
}

/// How a node's extent along a given axis is determined.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sizing {
    Fixed(u16),
    FitContent,
    Grow(u16),
    Percent(f32),
}

impl Default for Sizing {
    fn default() -> Self {
        Sizing::FitContent
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FlexDirection {
    #[default]
    Column,
    Row,
}

/// Spacing and sizing attributes shared by every container/leaf node.
#[derive(Debug, Clone, Default)]
pub struct Layout {
    pub width: Sizing,
    pub height: Sizing,
    pub gap: u16,
    pub padding: u16,
}

/// Either an owned literal or a handle into a [`crate::arena::StateArena`]:
/// `Text` holds either an owned string literal or a reference to a
/// caller-owned string.
///
/// `ForEachItem` is a sentinel: a `ForEach` template is built once
/// referencing this sentinel; at execution the current slice element is
/// bound in its place for each iteration, without re-invoking the template
/// closure.
#[derive(Debug, Clone, Copy)]
pub enum TextSource {
    Literal(&'static str),
    Bound(Handle<String>),
    ForEachItem,
}

#[derive(Debug, Clone, Copy)]
pub enum NumberSource {
    Literal(f64),
    Bound(Handle<f64>),
}

#[derive(Debug, Clone, Copy)]
pub enum BoolSource {
    Literal(bool),
    Bound(Handle<bool>),
}

/// A declarative UI node: `Text`, `Row`, `Col`, `Progress`, `Spacer`,
/// `Border`, `If`/`Else`, `ForEach<T>`, `LayerView`, `VirtualList<T>`.
///
/// `Clone` is cheap: containers clone their (usually small) child vectors,
/// and `VirtualList`'s `render` closure clones as a shared `Rc`, not a
/// re-capture — [`crate::app::App`] keeps an owned copy around so it can
/// recompile against a new terminal size after a resize.
#[derive(Clone)]
pub enum Node {
    Text { source: TextSource, style: Style, layout: Layout },
    Row { children: Vec<Node>, style: Style, layout: Layout },
    Col { children: Vec<Node>, style: Style, layout: Layout },
    Progress { value: NumberSource, width: u16, filled_style: Style, empty_style: Style },
    Spacer { layout: Layout },
    Border { style: BorderStyle, title: Option<&'static str>, child: Box<Node>, layout: Layout },
    If { cond: BoolSource, then_branch: Box<Node>, else_branch: Option<Box<Node>> },
    ForEach { items: Handle<Vec<String>>, template: Box<Node> },
    LayerView { layer: Handle<crate::layer::Layer>, layout: Layout },
    VirtualList {
        len: usize,
        viewport_h: u16,
        overscan: usize,
        start: Handle<u32>,
        render: std::rc::Rc<dyn Fn(usize) -> Node>,
        layout: Layout,
    },
}

impl Node {
    pub fn text(literal: &'static str) -> Self {
        Node::Text { source: TextSource::Literal(literal), style: Style::default(), layout: Layout::default() }
    }

    pub fn text_bound(handle: Handle<String>) -> Self {
        Node::Text { source: TextSource::Bound(handle), style: Style::default(), layout: Layout::default() }
    }

    pub fn with_style(mut self, style: Style) -> Self {
        match &mut self {
            Node::Text { style: s, .. } | Node::Row { style: s, .. } | Node::Col { style: s, .. } => *s = style,
            _ => {}
        }
        self
    }

    pub fn row(children: Vec<Node>) -> Self {
        Node::Row { children, style: Style::default(), layout: Layout::default() }
    }

    pub fn col(children: Vec<Node>) -> Self {
        Node::Col { children, style: Style::default(), layout: Layout::default() }
    }

    pub fn progress(value: NumberSource, width: u16) -> Self {
        Node::Progress {
            value,
            width,
            filled_style: Style::new(Color::Default, Color::WHITE, Attr::NONE),
            empty_style: Style::default(),
        }
    }

    pub fn bordered(style: BorderStyle, title: Option<&'static str>, child: Node) -> Self {
        Node::Border { style, title, child: Box::new(child), layout: Layout::default() }
    }

    /// Build a `ForEach`, invoking `template` exactly once against the
    /// sentinel element to produce the compiled template tree — the
    /// closure is never invoked again per frame or per element.
    pub fn for_each(items: Handle<Vec<String>>, template: impl FnOnce() -> Node) -> Self {
        Node::ForEach { items, template: Box::new(template()) }
    }

    /// Build a `VirtualList` over `len` items, rendering at most
    /// `viewport_h + overscan` of them per frame starting at the offset
    /// held by `start`. `render` is invoked once per visible (plus
    /// overscanned) index every frame — it is not compiled ahead of time,
    /// since the node it returns can vary per index.
    pub fn virtual_list(
        start: Handle<u32>,
        len: usize,
        viewport_h: u16,
        overscan: usize,
        render: impl Fn(usize) -> Node + 'static,
    ) -> Self {
        Node::VirtualList { len, viewport_h, overscan, start, render: std::rc::Rc::new(render), layout: Layout::default() }
    }
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Node::Text { .. } => write!(f, "Text"),
            Node::Row { children, .. } => write!(f, "Row({})", children.len()),
            Node::Col { children, .. } => write!(f, "Col({})", children.len()),
            Node::Progress { width, .. } => write!(f, "Progress(width={width})"),
            Node::Spacer { .. } => write!(f, "Spacer"),
            Node::Border { style, .. } => write!(f, "Border({style:?})"),
            Node::If { .. } => write!(f, "If"),
            Node::ForEach { .. } => write!(f, "ForEach"),
            Node::LayerView { .. } => write!(f, "LayerView"),
            Node::VirtualList { len, .. } => write!(f, "VirtualList(len={len})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_literal_builds_plain_node() {
        let n = Node::text("hi");
        match n {
            Node::Text { source: TextSource::Literal("hi"), .. } => {}
            _ => panic!("expected literal text node"),
        }
    }

    #[test]
    fn default_sizing_is_fit_content() {
        assert_eq!(Sizing::default(), Sizing::FitContent);
    }

    #[test]
    fn border_style_chars_returns_matched_corner_glyphs() {
        let (horiz, vert, tl, tr, br, bl) = BorderStyle::Single.chars();
        assert_eq!((horiz, vert, tl, tr, br, bl), ("─", "│", "┌", "┐", "┘", "└"));
        assert_eq!(BorderStyle::default(), BorderStyle::None);
    }

    #[test]
    fn row_and_col_wrap_children() {
        let n = Node::row(vec![Node::text("a"), Node::text("b")]);
        match n {
            Node::Row { children, .. } => assert_eq!(children.len(), 2),
            _ => panic!("expected row"),
        }
    }
}
