//! Terminal UI components.
//!
//! - [`viewport`]: Scroll position of each output tab
//! - [`style`]: Theme palettes and preview-style colors

pub mod style;
pub mod viewport;

mod overlays;
mod render;
mod status;

pub use render::{PaneLayout, output_content_width, pane_layout, render, tab_at};

/// Blank columns between the divider and the output text.
pub const OUTPUT_LEFT_PADDING: u16 = 1;

#[cfg(test)]
mod tests;
