//! The serialized draw program — the engine's core performance idea:
//! compile a node tree to a flat op sequence once, then re-execute it every
//! frame against live state without re-walking node objects.
//!
//! Grounded on `pipeline/frame_buffer_derived.rs`'s derived-computation
//! shape (a value recomputed from upstream state without re-deriving its
//! own structure), generalized from `spark_signals::derived` onto an
//! explicit `compile` / `execute` pair over [`crate::context::Context`].

use taffy::NodeId;

use crate::buffer::Buffer;
use crate::cell::{Attr, Cell, Style};
use crate::context::Context;
use crate::error::{Error, Result};
use crate::layout::{self, LayoutTree};
use crate::node::{BoolSource, BorderStyle, Node, NumberSource, TextSource};

/// One flattened drawing instruction. Positions are resolved at execution
/// time against the compiled [`LayoutTree`] via `node`, not baked in here —
/// only layout recomputation is needed on resize, never recompilation.
enum Op {
    WriteText { node: NodeId, source: TextSource, style: Style },
    DrawBar { node: NodeId, value: NumberSource, width: u16, filled_style: Style, empty_style: Style },
    Panel { node: NodeId, border: BorderStyle, title: Option<&'static str>, style: Style, child_start: usize, child_len: usize },
    /// Both branches are compiled inline; only one executes per frame. Both
    /// draw into the same layout slot, `node` — a simplification this engine
    /// makes for conditional content (see DESIGN.md).
    Branch { cond: BoolSource, node: NodeId, then_start: usize, then_len: usize, else_start: usize, else_len: usize },
    ForEachBegin { items: crate::arena::Handle<Vec<String>>, node: NodeId, template_start: usize, template_len: usize },
    LayerBlit { node: NodeId, layer: crate::arena::Handle<crate::layer::Layer> },
    /// `render` is invoked fresh for each visible (plus overscanned) index
    /// every frame and compiled on the spot — there is no template to
    /// compile once, since the node it returns can differ per index.
    VirtualList {
        node: NodeId,
        len: usize,
        viewport_h: u16,
        overscan: usize,
        start: crate::arena::Handle<u32>,
        render: std::rc::Rc<dyn Fn(usize) -> Node>,
    },
}

/// A compiled node tree: a taffy layout tree plus the flat op sequence.
/// Built once via [`Self::compile`]; re-executed every frame via
/// [`Self::execute`] without rebuilding either.
pub struct SerializedProgram {
    layout: LayoutTree,
    ops: Vec<Op>,
    dynamic_text: Vec<(NodeId, TextSource)>,
}

impl SerializedProgram {
    pub fn compile(node: &Node, width: u16, height: u16) -> Result<Self> {
        let mut taffy = LayoutTree::empty_taffy();
        let mut ops = Vec::new();
        let mut dynamic_text = Vec::new();
        let root = compile_node(&mut taffy, node, crate::node::FlexDirection::Column, &mut ops, &mut dynamic_text)?;
        let layout = LayoutTree::from_parts(taffy, root, width, height)?;
        Ok(Self { layout, ops, dynamic_text })
    }

    /// Re-run layout (cheap) and then every op, writing into `buffer`.
    /// State mutation alone never requires recompiling `self`.
    pub fn execute(&mut self, buffer: &mut Buffer, width: u16, height: u16, ctx: &Context) -> Result<()> {
        for (node, source) in &self.dynamic_text {
            if let TextSource::Bound(_) = source {
                let text = ctx.resolve_text(*source, None);
                self.layout.set_leaf_width(*node, crate::buffer::string_width(text) as u16)?;
            }
        }
        self.layout.recompute(width, height)?;
        execute_ops(&self.ops, 0, self.ops.len(), &self.layout, buffer, ctx, None, 0);
        Ok(())
    }
}

fn execute_ops(
    ops: &[Op],
    start: usize,
    len: usize,
    layout: &LayoutTree,
    buffer: &mut Buffer,
    ctx: &Context,
    current_item: Option<&str>,
    row_offset: u16,
) {
    for op in &ops[start..start + len] {
        match op {
            Op::WriteText { node, source, style } => {
                let b = layout.box_for(*node);
                let text = ctx.resolve_text(*source, current_item);
                buffer.write_string(b.x, b.y + row_offset, text, *style, b.w);
            }
            Op::DrawBar { node, value, width, filled_style, empty_style } => {
                let b = layout.box_for(*node);
                let v = ctx.resolve_number(*value).clamp(0.0, 100.0);
                let filled = ((*width as f64) * v / 100.0).round() as u16;
                for i in 0..*width {
                    let (style, reverse) =
                        if i < filled { (*filled_style, Attr::REVERSE) } else { (*empty_style, Attr::NONE) };
                    buffer.set(b.x + i, b.y + row_offset, Cell::new(' ', style.fg, style.bg, style.attr | reverse));
                }
            }
            Op::Panel { node, border, title, style, child_start, child_len } => {
                let b = layout.box_for(*node);
                buffer.draw_panel(b.x, b.y + row_offset, b.w, b.h, *border, *title, *style);
                execute_ops(ops, *child_start, *child_len, layout, buffer, ctx, current_item, row_offset);
            }
            Op::Branch { cond, then_start, then_len, else_start, else_len, .. } => {
                if ctx.resolve_bool(*cond) {
                    execute_ops(ops, *then_start, *then_len, layout, buffer, ctx, current_item, row_offset);
                } else {
                    execute_ops(ops, *else_start, *else_len, layout, buffer, ctx, current_item, row_offset);
                }
            }
            Op::ForEachBegin { items, template_start, template_len, .. } => {
                if let Some(list) = ctx.lists.get(*items) {
                    for (i, item) in list.iter().enumerate() {
                        execute_ops(
                            ops,
                            *template_start,
                            *template_len,
                            layout,
                            buffer,
                            ctx,
                            Some(item.as_str()),
                            row_offset + i as u16,
                        );
                    }
                }
            }
            Op::LayerBlit { node, layer } => {
                let b = layout.box_for(*node);
                if let Some(layer) = ctx.layers.get(*layer) {
                    layer.blit_visible(buffer, b.x, b.y + row_offset);
                }
            }
            Op::VirtualList { node, len, viewport_h, overscan, start, render } => {
                let b = layout.box_for(*node);
                let len = *len;
                let overscan = *overscan;
                if len == 0 || b.w == 0 {
                    continue;
                }
                let visible = (*viewport_h as usize).min(len);
                let start_index = (ctx.starts.get(*start).copied().unwrap_or(0) as usize).min(len - visible);
                let fetch_end = (start_index + visible + overscan).min(len);

                for (row, i) in (start_index..fetch_end).enumerate() {
                    let row_node = (render)(i);
                    let Ok(mut row_program) = SerializedProgram::compile(&row_node, b.w, 1) else { continue };
                    let Ok(mut row_buffer) = Buffer::new(b.w, 1) else { continue };
                    if row_program.execute(&mut row_buffer, b.w, 1, ctx).is_err() {
                        continue;
                    }
                    if row >= *viewport_h as usize {
                        // Overscanned row: rendered to prime any per-row
                        // state but not blitted, since it falls outside the
                        // laid-out box.
                        continue;
                    }
                    for x in 0..b.w {
                        buffer.set(b.x + x, b.y + row_offset + row as u16, row_buffer.get(x, 0));
                    }
                }
            }
        }
    }
}

fn compile_node(
    taffy: &mut taffy::TaffyTree<()>,
    node: &Node,
    dir: crate::node::FlexDirection,
    ops: &mut Vec<Op>,
    dynamic_text: &mut Vec<(NodeId, TextSource)>,
) -> Result<NodeId> {
    use crate::node::FlexDirection;
    let to_taffy_err = |e: taffy::TaffyError| Error::CompileFailure(e.to_string());

    match node {
        Node::Text { source, style, layout: lay } => {
            let mut taffy_style = layout::build_style(lay, dir, false);
            if matches!(lay.height, crate::node::Sizing::FitContent) {
                taffy_style.size.height = taffy::prelude::length(1.0);
            }
            match source {
                TextSource::Literal(s) if matches!(lay.width, crate::node::Sizing::FitContent) => {
                    taffy_style.size.width = layout::node_leaf_text(s).size.width;
                }
                // Bound text is re-measured every frame in `execute` once the
                // referenced value is known; ForEach items vary per row and
                // can never be measured at compile time — both default to
                // filling whatever width the parent grants.
                TextSource::Bound(_) | TextSource::ForEachItem if matches!(lay.width, crate::node::Sizing::FitContent) => {
                    taffy_style.size.width = taffy::prelude::percent(1.0);
                }
                _ => {}
            }
            let id = taffy.new_leaf(taffy_style).map_err(to_taffy_err)?;
            if matches!(source, TextSource::Bound(_)) {
                dynamic_text.push((id, *source));
            }
            ops.push(Op::WriteText { node: id, source: *source, style: *style });
            Ok(id)
        }
        Node::Spacer { layout: lay } => taffy.new_leaf(layout::build_style(lay, dir, false)).map_err(to_taffy_err),
        Node::Progress { value, width, filled_style, empty_style } => {
            let style = taffy::prelude::Style {
                size: taffy::prelude::Size { width: taffy::prelude::length(*width as f32), height: taffy::prelude::length(1.0) },
                ..Default::default()
            };
            let id = taffy.new_leaf(style).map_err(to_taffy_err)?;
            ops.push(Op::DrawBar { node: id, value: *value, width: *width, filled_style: *filled_style, empty_style: *empty_style });
            Ok(id)
        }
        Node::Row { children, layout: lay, .. } => {
            let mut kids = Vec::with_capacity(children.len());
            for child in children {
                kids.push(compile_node(taffy, child, FlexDirection::Row, ops, dynamic_text)?);
            }
            taffy.new_with_children(layout::build_style(lay, dir, false), &kids).map_err(to_taffy_err)
        }
        Node::Col { children, layout: lay, .. } => {
            let mut kids = Vec::with_capacity(children.len());
            for child in children {
                kids.push(compile_node(taffy, child, FlexDirection::Column, ops, dynamic_text)?);
            }
            taffy.new_with_children(layout::build_style(lay, dir, false), &kids).map_err(to_taffy_err)
        }
        Node::Border { style, title, child, layout: lay } => {
            let insert_at = ops.len();
            let child_id = compile_node(taffy, child, FlexDirection::Column, ops, dynamic_text)?;
            let child_len = ops.len() - insert_at;
            let id = taffy.new_with_children(layout::build_style(lay, dir, true), &[child_id]).map_err(to_taffy_err)?;
            ops.insert(
                insert_at,
                Op::Panel { node: id, border: *style, title: *title, style: Style::default(), child_start: insert_at + 1, child_len },
            );
            Ok(id)
        }
        Node::If { cond, then_branch, else_branch } => {
            let insert_at = ops.len();
            let slot = compile_node(taffy, then_branch, dir, ops, dynamic_text)?;
            let then_len = ops.len() - insert_at;
            let else_start_before_insert = ops.len();
            if let Some(else_node) = else_branch {
                compile_leaf_ops_for_slot(else_node, slot, ops, dynamic_text)?;
            }
            let else_len = ops.len() - else_start_before_insert;
            ops.insert(
                insert_at,
                Op::Branch {
                    cond: *cond,
                    node: slot,
                    then_start: insert_at + 1,
                    then_len,
                    else_start: else_start_before_insert + 1,
                    else_len,
                },
            );
            Ok(slot)
        }
        Node::ForEach { items, template } => {
            let insert_at = ops.len();
            let slot = compile_node(taffy, template, dir, ops, dynamic_text)?;
            let template_len = ops.len() - insert_at;
            ops.insert(
                insert_at,
                Op::ForEachBegin { items: *items, node: slot, template_start: insert_at + 1, template_len },
            );
            Ok(slot)
        }
        Node::LayerView { layer, layout: lay } => {
            let id = taffy.new_leaf(layout::build_style(lay, dir, false)).map_err(to_taffy_err)?;
            ops.push(Op::LayerBlit { node: id, layer: *layer });
            Ok(id)
        }
        Node::VirtualList { len, viewport_h, overscan, start, render, layout: lay } => {
            let mut taffy_style = layout::build_style(lay, dir, false);
            // A virtual list has no taffy children to size itself from, so
            // `FitContent` (auto) would collapse it to zero — it always
            // wants the height of its viewport and the full width available
            // to it, the same default a bound/ForEach text leaf gets.
            if matches!(lay.width, crate::node::Sizing::FitContent) {
                taffy_style.size.width = taffy::prelude::percent(1.0);
            }
            if matches!(lay.height, crate::node::Sizing::FitContent) {
                taffy_style.size.height = taffy::prelude::length(*viewport_h as f32);
            }
            let id = taffy.new_leaf(taffy_style).map_err(to_taffy_err)?;
            ops.push(Op::VirtualList {
                node: id,
                len: *len,
                viewport_h: *viewport_h,
                overscan: *overscan,
                start: *start,
                render: std::rc::Rc::clone(render),
            });
            Ok(id)
        }
    }
}

/// `If`/`Else` branches share one taffy layout slot (a simplification: the
/// alternate branch must be a single leaf node, since no extra taffy
/// geometry is reserved for it). Supports `Text` and `Progress` leaves.
fn compile_leaf_ops_for_slot(
    node: &Node,
    slot: NodeId,
    ops: &mut Vec<Op>,
    dynamic_text: &mut Vec<(NodeId, TextSource)>,
) -> Result<()> {
    match node {
        Node::Text { source, style, .. } => {
            if matches!(source, TextSource::Bound(_)) {
                dynamic_text.push((slot, *source));
            }
            ops.push(Op::WriteText { node: slot, source: *source, style: *style });
            Ok(())
        }
        Node::Progress { value, width, filled_style, empty_style } => {
            ops.push(Op::DrawBar { node: slot, value: *value, width: *width, filled_style: *filled_style, empty_style: *empty_style });
            Ok(())
        }
        other => Err(Error::CompileFailure(format!("unsupported else-branch leaf: {other:?}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;

    #[test]
    fn static_text_executes_into_buffer() {
        let node = Node::text("hi");
        let mut program = SerializedProgram::compile(&node, 80, 24).unwrap();
        let ctx = Context::new();
        let mut buf = Buffer::new(80, 24).unwrap();
        program.execute(&mut buf, 80, 24, &ctx).unwrap();
        assert_eq!(buf.get(0, 0).ch(), Some('h'));
        assert_eq!(buf.get(1, 0).ch(), Some('i'));
    }

    #[test]
    fn execute_is_deterministic_given_same_state() {
        let node = Node::row(vec![Node::text("a"), Node::text("b")]);
        let mut program = SerializedProgram::compile(&node, 80, 24).unwrap();
        let ctx = Context::new();
        let mut buf1 = Buffer::new(80, 24).unwrap();
        let mut buf2 = Buffer::new(80, 24).unwrap();
        program.execute(&mut buf1, 80, 24, &ctx).unwrap();
        program.execute(&mut buf2, 80, 24, &ctx).unwrap();
        assert_eq!(buf1.get(0, 0), buf2.get(0, 0));
        assert_eq!(buf1.get(1, 0), buf2.get(1, 0));
    }

    #[test]
    fn bound_text_reflects_state_mutation_without_recompile() {
        let mut ctx = Context::new();
        let handle = ctx.bind_string("B");
        let node = Node::text_bound(handle);
        let mut program = SerializedProgram::compile(&node, 80, 24).unwrap();
        let mut buf = Buffer::new(80, 24).unwrap();
        program.execute(&mut buf, 80, 24, &ctx).unwrap();
        assert_eq!(buf.get(0, 0).ch(), Some('B'));

        ctx.strings.set(handle, "BB".to_string());
        let mut buf2 = Buffer::new(80, 24).unwrap();
        program.execute(&mut buf2, 80, 24, &ctx).unwrap();
        assert_eq!(buf2.get(0, 0).ch(), Some('B'));
        assert_eq!(buf2.get(1, 0).ch(), Some('B'));
    }

    #[test]
    fn progress_bar_fills_proportionally() {
        let mut ctx = Context::new();
        let h = ctx.bind_number(50.0);
        let node = Node::progress(NumberSource::Bound(h), 10);
        let mut program = SerializedProgram::compile(&node, 80, 24).unwrap();
        let mut buf = Buffer::new(80, 24).unwrap();
        program.execute(&mut buf, 80, 24, &ctx).unwrap();
        assert!(buf.get(0, 0).attr.contains(Attr::REVERSE));
        assert!(!buf.get(9, 0).attr.contains(Attr::REVERSE));
    }

    #[test]
    fn for_each_renders_each_item_on_its_own_row() {
        let mut ctx = Context::new();
        let items = ctx.bind_list(vec!["A".to_string(), "B".to_string(), "C".to_string()]);
        let node = Node::for_each(items, || Node::Text {
            source: TextSource::ForEachItem,
            style: Style::default(),
            layout: crate::node::Layout::default(),
        });
        let mut program = SerializedProgram::compile(&node, 80, 24).unwrap();
        let mut buf = Buffer::new(80, 24).unwrap();
        program.execute(&mut buf, 80, 24, &ctx).unwrap();
        assert_eq!(buf.get(0, 0).ch(), Some('A'));
        assert_eq!(buf.get(0, 1).ch(), Some('B'));
        assert_eq!(buf.get(0, 2).ch(), Some('C'));
    }
}
