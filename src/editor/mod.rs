//! Markdown input editor.
//!
//! A rope-backed text buffer with cursor management, driven by TEA messages.

mod buffer;

pub use buffer::{Cursor, Direction, EditorBuffer};
