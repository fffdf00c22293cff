// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. convert::ConvertError)
    clippy::module_name_repetitions
)]

//! # mdconvert
//!
//! A terminal Markdown to HTML converter with a live preview.
//!
//! The screen is split in two: a Markdown editor on the left and an output
//! panel on the right. The output panel has two tabs:
//! - **Preview**: the converted document laid out for the terminal
//! - **HTML**: the raw HTML, syntax highlighted
//!
//! Edits are debounced before conversion. The HTML can be copied to the
//! clipboard or written to `converted.html`.
//!
//! ## Architecture
//!
//! mdconvert uses The Elm Architecture (TEA) pattern:
//! - **Model**: Application state
//! - **Message**: Events and actions
//! - **Update**: Pure state transitions
//! - **View**: Render to terminal
//!
//! ## Modules
//!
//! - [`app`]: Main application loop and state
//! - [`convert`]: Markdown parsing and terminal layout of the HTML
//! - [`pipeline`]: Debounced rendering into the two output targets
//! - [`editor`]: The Markdown text buffer
//! - [`theme`]: Color themes, preview styles, and the theme preference
//! - [`resize`]: The draggable split between panes
//! - [`ui`]: Terminal UI components
//! - [`highlight`]: Syntax highlighting
//! - [`clipboard`]: Clipboard writes with a terminal fallback
//! - [`export`]: Atomic file writes for the download actions

pub mod app;
pub mod clipboard;
pub mod config;
pub mod convert;
pub mod editor;
pub mod export;
pub mod highlight;
pub mod perf;
pub mod pipeline;
pub mod resize;
pub mod theme;
pub mod ui;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::app::{App, Message, Model};
    pub use crate::convert::{ComrakParser, MarkdownParser};
    pub use crate::pipeline::RenderPipeline;
    pub use crate::ui::viewport::Viewport;
}
