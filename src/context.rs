//! Per-frame execution context: the arenas a compiled program resolves
//! handles against.
//!
//! One arena per bound value kind, grounded on the same free-list shape as
//! [`crate::arena::StateArena`] itself — this module just bundles the
//! kinds [`crate::node::Node`] needs (strings, numbers, flags, item lists,
//! layers) behind one handle so [`crate::program`] doesn't thread five
//! separate arena references through every call.

use crate::arena::{Handle, StateArena};
use crate::layer::Layer;
use crate::node::{BoolSource, NumberSource, TextSource};

#[derive(Default)]
pub struct Context {
    pub strings: StateArena<String>,
    pub numbers: StateArena<f64>,
    pub bools: StateArena<bool>,
    pub lists: StateArena<Vec<String>>,
    pub layers: StateArena<Layer>,
    /// Scroll/start offsets for `VirtualList` nodes.
    pub starts: StateArena<u32>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind_string(&mut self, value: impl Into<String>) -> Handle<String> {
        self.strings.insert(value.into())
    }

    pub fn bind_number(&mut self, value: f64) -> Handle<f64> {
        self.numbers.insert(value)
    }

    pub fn bind_bool(&mut self, value: bool) -> Handle<bool> {
        self.bools.insert(value)
    }

    pub fn bind_list(&mut self, value: Vec<String>) -> Handle<Vec<String>> {
        self.lists.insert(value)
    }

    pub fn bind_layer(&mut self, layer: Layer) -> Handle<Layer> {
        self.layers.insert(layer)
    }

    pub fn bind_start(&mut self, value: u32) -> Handle<u32> {
        self.starts.insert(value)
    }

    /// Resolve a [`TextSource`] to borrowed text. `current_item` supplies
    /// the active slice element when resolving inside a `ForEach` template.
    pub fn resolve_text<'a>(&'a self, source: TextSource, current_item: Option<&'a str>) -> &'a str {
        match source {
            TextSource::Literal(s) => s,
            TextSource::Bound(h) => self.strings.get(h).map(String::as_str).unwrap_or(""),
            TextSource::ForEachItem => current_item.unwrap_or(""),
        }
    }

    pub fn resolve_number(&self, source: NumberSource) -> f64 {
        match source {
            NumberSource::Literal(v) => v,
            NumberSource::Bound(h) => self.numbers.get(h).copied().unwrap_or(0.0),
        }
    }

    pub fn resolve_bool(&self, source: BoolSource) -> bool {
        match source {
            BoolSource::Literal(v) => v,
            BoolSource::Bound(h) => self.bools.get(h).copied().unwrap_or(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bound_text_resolves_through_arena() {
        let mut ctx = Context::new();
        let h = ctx.bind_string("hi");
        assert_eq!(ctx.resolve_text(TextSource::Bound(h), None), "hi");
    }

    #[test]
    fn for_each_item_resolves_from_current_item() {
        let ctx = Context::new();
        assert_eq!(ctx.resolve_text(TextSource::ForEachItem, Some("row")), "row");
        assert_eq!(ctx.resolve_text(TextSource::ForEachItem, None), "");
    }

    #[test]
    fn mutating_bound_number_is_visible_next_resolve() {
        let mut ctx = Context::new();
        let h = ctx.bind_number(0.0);
        assert_eq!(ctx.resolve_number(NumberSource::Bound(h)), 0.0);
        *ctx.numbers.get_mut(h).unwrap() = 50.0;
        assert_eq!(ctx.resolve_number(NumberSource::Bound(h)), 50.0);
    }
}
