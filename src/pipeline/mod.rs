//! The live render pipeline.
//!
//! Editor changes schedule a debounced render; style and theme changes
//! render immediately. Each render rewrites both display targets from
//! scratch: the preview gets the wrapped HTML and a terminal layout of the
//! text, the code view gets the raw HTML and is then highlighted.

use std::fmt;

use thiserror::Error;

use crate::convert::{
    ComrakParser, ConvertError, MarkdownParser, RenderedLine, layout_preview, wrap_preview,
};
use crate::highlight::{HighlightError, HighlightedLines, Highlighter, SyntectHighlighter, plain_lines};
use crate::theme::{PreviewStyle, Theme};

/// Quiet period before a typing burst is rendered.
pub const DEFAULT_DEBOUNCE_MS: u64 = 120;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Convert(#[from] ConvertError),
    #[error(transparent)]
    Highlight(#[from] HighlightError),
}

/// Single pending render timer. Scheduling again replaces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderDebouncer {
    delay_ms: u64,
    pending: Option<u64>,
}

impl RenderDebouncer {
    pub const fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            pending: None,
        }
    }

    pub const fn schedule(&mut self, now_ms: u64) {
        self.pending = Some(now_ms);
    }

    /// True once the quiet period since the last schedule has elapsed.
    /// Clears the pending timer when it fires.
    pub fn take_due(&mut self, now_ms: u64) -> bool {
        let Some(queued_at) = self.pending else {
            return false;
        };
        if now_ms.saturating_sub(queued_at) >= self.delay_ms {
            self.pending = None;
            true
        } else {
            false
        }
    }

    pub const fn cancel(&mut self) {
        self.pending = None;
    }

    pub const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub const fn delay_ms(&self) -> u64 {
        self.delay_ms
    }
}

impl Default for RenderDebouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE_MS)
    }
}

/// The rendered preview: wrapped HTML plus its terminal layout.
#[derive(Debug, Clone, Default)]
pub struct PreviewTarget {
    wrapped_html: String,
    markdown: String,
    lines: Vec<RenderedLine>,
    layout_width: u16,
}

impl PreviewTarget {
    /// Replace the whole target with a new render.
    pub fn replace(&mut self, wrapped_html: String, markdown: &str, width: u16) {
        self.wrapped_html = wrapped_html;
        markdown.clone_into(&mut self.markdown);
        self.lines = layout_preview(&self.markdown, width);
        self.layout_width = width;
    }

    /// Re-layout for a new width. No-op when the width is unchanged.
    pub fn ensure_layout(&mut self, width: u16) {
        if width == self.layout_width {
            return;
        }
        self.lines = layout_preview(&self.markdown, width);
        self.layout_width = width;
    }

    pub fn wrapped_html(&self) -> &str {
        &self.wrapped_html
    }

    pub fn lines(&self) -> &[RenderedLine] {
        &self.lines
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }
}

/// The HTML code view. Holds the raw HTML and its highlighted lines.
#[derive(Debug, Clone, Default)]
pub struct CodeTarget {
    source: String,
    lines: HighlightedLines,
    highlighted: bool,
}

impl CodeTarget {
    /// Replace the source text. Lines are plain until highlighted.
    pub fn replace(&mut self, source: &str) {
        source.clone_into(&mut self.source);
        self.lines = plain_lines(source);
        self.highlighted = false;
    }

    pub fn set_highlighted(&mut self, lines: HighlightedLines) {
        self.lines = lines;
        self.highlighted = true;
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn lines(&self) -> &HighlightedLines {
        &self.lines
    }

    pub const fn is_highlighted(&self) -> bool {
        self.highlighted
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }
}

/// Output of the last successful render.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderOutput {
    /// Raw HTML from the parser.
    pub html: String,
    /// HTML wrapped in the preview-style container.
    pub wrapped: String,
}

pub struct RenderPipeline {
    parser: Box<dyn MarkdownParser>,
    highlighter: Box<dyn Highlighter>,
    debouncer: RenderDebouncer,
    preview: PreviewTarget,
    code: CodeTarget,
    output: RenderOutput,
    preview_width: u16,
    render_count: u64,
}

impl fmt::Debug for RenderPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderPipeline")
            .field("debouncer", &self.debouncer)
            .field("preview_width", &self.preview_width)
            .field("render_count", &self.render_count)
            .finish_non_exhaustive()
    }
}

impl Default for RenderPipeline {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE_MS)
    }
}

impl RenderPipeline {
    pub fn new(debounce_ms: u64) -> Self {
        Self {
            parser: Box::new(ComrakParser),
            highlighter: Box::new(SyntectHighlighter),
            debouncer: RenderDebouncer::new(debounce_ms),
            preview: PreviewTarget::default(),
            code: CodeTarget::default(),
            output: RenderOutput::default(),
            preview_width: 80,
            render_count: 0,
        }
    }

    #[must_use]
    pub fn with_parser(mut self, parser: Box<dyn MarkdownParser>) -> Self {
        self.parser = parser;
        self
    }

    #[must_use]
    pub fn with_highlighter(mut self, highlighter: Box<dyn Highlighter>) -> Self {
        self.highlighter = highlighter;
        self
    }

    /// Replace any pending render with one due after the quiet period.
    pub fn schedule_render(&mut self, now_ms: u64) {
        self.debouncer.schedule(now_ms);
    }

    /// True when the scheduled render should run now.
    pub fn take_due(&mut self, now_ms: u64) -> bool {
        self.debouncer.take_due(now_ms)
    }

    pub const fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Render `text` synchronously, cancelling any pending debounce.
    ///
    /// # Errors
    ///
    /// Returns the parser error, in which case neither target is touched,
    /// or the highlighter error, in which case both targets hold the new
    /// render and the code view is left unhighlighted.
    pub fn render_now(
        &mut self,
        text: &str,
        style: PreviewStyle,
        theme: Theme,
    ) -> Result<(), RenderError> {
        let _scope = crate::perf::scope("pipeline.render_now");
        self.debouncer.cancel();

        let html = self.parser.parse_to_html(text)?;
        let wrapped = wrap_preview(&html, style.name());

        self.preview
            .replace(wrapped.clone(), text, self.preview_width);
        self.code.replace(&html);
        self.output = RenderOutput { html, wrapped };
        self.render_count += 1;
        crate::perf::log_event(
            "pipeline.render",
            format!(
                "count={} text_bytes={} html_bytes={} style={} theme={}",
                self.render_count,
                text.len(),
                self.output.html.len(),
                style.name(),
                theme.name()
            ),
        );

        self.highlighter.highlight(&mut self.code, theme)?;
        Ok(())
    }

    /// Width the preview is laid out at. Re-lays out the current preview
    /// when it changes.
    pub fn set_preview_width(&mut self, width: u16) {
        let width = width.max(1);
        self.preview_width = width;
        self.preview.ensure_layout(width);
    }

    pub const fn output(&self) -> &RenderOutput {
        &self.output
    }

    pub const fn preview(&self) -> &PreviewTarget {
        &self.preview
    }

    pub const fn code(&self) -> &CodeTarget {
        &self.code
    }

    pub const fn render_count(&self) -> u64 {
        self.render_count
    }
}
