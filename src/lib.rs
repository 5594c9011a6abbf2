//! # weft
//!
//! A retained-mode terminal UI rendering and reactivity engine.
//!
//! A caller declares a tree of [`node::Node`]s whose leaves bind to
//! application state by handle, not by value. [`program::SerializedProgram`]
//! compiles that tree once into a flat op sequence and [`layout::LayoutTree`]
//! lays it out via `taffy`; every frame, [`app::App`] re-executes the
//! program into a [`buffer::Buffer`], [`differ`] computes the minimal ANSI
//! patch against what's actually on screen, and the patch is written to the
//! terminal.
//!
//! ## Pipeline
//!
//! ```text
//! Node tree --compile--> SerializedProgram --execute(Context)--> Buffer
//!     --diff against displayed Buffer--> ANSI patch --write--> terminal
//! ```
//!
//! State lives in a [`arena::StateArena`]; nodes reference it through
//! [`arena::Handle`]s resolved each frame via [`context::Context`]. Mutating
//! a handle's value never requires recompiling the program — only a change
//! to the node tree's structure does.

pub mod ansi;
pub mod app;
pub mod arena;
pub mod buffer;
pub mod cell;
pub mod color;
pub mod config;
pub mod context;
pub mod differ;
pub mod error;
pub mod input;
pub mod layer;
pub mod layout;
pub mod logging;
pub mod node;
pub mod pool;
pub mod program;

pub use app::{App, Mode};
pub use arena::{Handle, StateArena};
pub use buffer::{Buffer, RegionView};
pub use cell::{Attr, Cell, Style};
pub use color::Color;
pub use config::TerminalHints;
pub use context::Context;
pub use error::{Error, Result};
pub use layer::Layer;
pub use layout::{LayoutBox, LayoutTree};
pub use node::{BoolSource, BorderStyle, Node, NumberSource, Sizing, TextSource};
pub use pool::BufferPool;
pub use program::SerializedProgram;
