use std::path::PathBuf;
use std::time::{Duration, Instant};

use ratatui::layout::Rect;

use crate::convert::SAMPLE_MARKDOWN;
use crate::editor::EditorBuffer;
use crate::pipeline::{DEFAULT_DEBOUNCE_MS, RenderError, RenderPipeline};
use crate::resize::SplitController;
use crate::theme::ThemeManager;
use crate::ui::viewport::Viewport;

/// How long a toast stays up unless the caller picks a duration.
const DEFAULT_TOAST_DURATION: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
struct Toast {
    level: ToastLevel,
    message: String,
    expires_at: Instant,
}

/// The two output panel tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputTab {
    #[default]
    Preview,
    Code,
}

impl OutputTab {
    pub const ALL: [Self; 2] = [Self::Preview, Self::Code];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Preview => "Preview",
            Self::Code => "HTML",
        }
    }

    pub const fn other(self) -> Self {
        match self {
            Self::Preview => Self::Code,
            Self::Code => Self::Preview,
        }
    }
}

/// Which output tab is showing. Exactly one is visible and selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TabState {
    active: OutputTab,
}

impl TabState {
    pub const fn activate(&mut self, tab: OutputTab) {
        self.active = tab;
    }

    pub const fn toggle(&mut self) {
        self.active = self.active.other();
    }

    pub const fn active(&self) -> OutputTab {
        self.active
    }

    pub fn is_visible(&self, tab: OutputTab) -> bool {
        self.active == tab
    }

    pub fn is_selected(&self, tab: OutputTab) -> bool {
        self.active == tab
    }
}

/// A pending yes/no question. While one is open, all other input is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmPrompt {
    ResetContent,
}

impl ConfirmPrompt {
    pub const fn message(self) -> &'static str {
        match self {
            Self::ResetContent => "Clear all content and reset?",
        }
    }
}

/// The complete application state.
pub struct Model {
    /// Markdown source being edited
    pub editor: EditorBuffer,
    /// First editor line shown
    pub editor_scroll: usize,
    /// First editor display column shown
    pub editor_hscroll: usize,
    /// Parser, highlighter, debounce timer, and both display targets
    pub pipeline: RenderPipeline,
    /// Active theme and preview style
    pub themes: ThemeManager,
    pub tabs: TabState,
    pub split: SplitController,
    pub preview_viewport: Viewport,
    pub code_viewport: Viewport,
    pub terminal_size: (u16, u16),
    /// Open confirmation modal, if any
    pub confirm: Option<ConfirmPrompt>,
    pub help_visible: bool,
    pub should_quit: bool,
    /// Directory the download actions write into
    pub output_dir: PathBuf,
    /// Global config path shown in help
    pub config_global_path: Option<PathBuf>,
    /// Local override path shown in help
    pub config_local_path: Option<PathBuf>,
    toast: Option<Toast>,
    /// Editor revision the pipeline last saw
    seen_revision: u64,
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("editor", &self.editor)
            .field("tabs", &self.tabs)
            .field("split", &self.split)
            .field("theme", &self.themes.theme())
            .field("preview_style", &self.themes.preview_style())
            .field("confirm", &self.confirm)
            .finish_non_exhaustive()
    }
}

impl Model {
    pub fn new(text: &str, terminal_size: (u16, u16), themes: ThemeManager) -> Self {
        let mut model = Self {
            editor: EditorBuffer::from_text(text),
            terminal_size,
            themes,
            ..Self::default()
        };
        model.seen_revision = model.editor.revision();
        model.sync_layout();
        model
    }

    #[must_use]
    pub fn with_pipeline(mut self, pipeline: RenderPipeline) -> Self {
        self.pipeline = pipeline;
        self.sync_layout();
        self
    }

    /// Render the current text right away, cancelling any pending debounce.
    ///
    /// # Errors
    ///
    /// Returns the parser or highlighter error from the pipeline.
    pub fn render_now(&mut self) -> Result<(), RenderError> {
        self.seen_revision = self.editor.revision();
        let text = self.editor.text();
        let result = self.pipeline.render_now(
            &text,
            self.themes.preview_style(),
            self.themes.theme(),
        );
        self.sync_output_viewports();
        result
    }

    /// Schedule a debounced render if the text changed since the last one.
    pub fn schedule_render_if_edited(&mut self, now_ms: u64) -> bool {
        let revision = self.editor.revision();
        if revision == self.seen_revision {
            return false;
        }
        self.seen_revision = revision;
        self.pipeline.schedule_render(now_ms);
        true
    }

    /// True when the editor holds text the pipeline has not rendered yet.
    pub const fn render_outdated(&self) -> bool {
        self.pipeline.is_pending() || self.seen_revision != self.editor.revision()
    }

    /// Restore the built-in sample text.
    pub fn reset_content(&mut self) {
        self.editor.set_text(SAMPLE_MARKDOWN);
        self.editor_scroll = 0;
        self.editor_hscroll = 0;
        self.preview_viewport.go_to_top();
        self.code_viewport.go_to_top();
    }

    pub fn area(&self) -> Rect {
        Rect::new(0, 0, self.terminal_size.0, self.terminal_size.1)
    }

    pub fn pane_layout(&self) -> crate::ui::PaneLayout {
        crate::ui::pane_layout(self.area(), &self.split)
    }

    /// Push pane sizes into the pipeline and viewports.
    pub fn sync_layout(&mut self) {
        let layout = self.pane_layout();
        self.pipeline
            .set_preview_width(crate::ui::output_content_width(&layout));
        self.preview_viewport
            .resize(layout.output.width, layout.output.height);
        self.code_viewport
            .resize(layout.output.width, layout.output.height);
        self.sync_output_viewports();
        self.ensure_cursor_visible();
    }

    pub(super) fn sync_output_viewports(&mut self) {
        self.preview_viewport
            .set_total_lines(self.pipeline.preview().line_count());
        self.code_viewport
            .set_total_lines(self.pipeline.code().line_count());
    }

    /// Viewport of the active output tab.
    pub const fn active_viewport(&self) -> &Viewport {
        match self.tabs.active() {
            OutputTab::Preview => &self.preview_viewport,
            OutputTab::Code => &self.code_viewport,
        }
    }

    pub(super) const fn active_viewport_mut(&mut self) -> &mut Viewport {
        match self.tabs.active() {
            OutputTab::Preview => &mut self.preview_viewport,
            OutputTab::Code => &mut self.code_viewport,
        }
    }

    /// Scroll the editor so the cursor is on screen.
    pub(super) fn ensure_cursor_visible(&mut self) {
        let layout = self.pane_layout();
        let height = usize::from(layout.editor.height);
        let width = usize::from(layout.editor.width);
        let cursor = self.editor.cursor();

        if height == 0 {
            self.editor_scroll = cursor.line;
        } else if cursor.line < self.editor_scroll {
            self.editor_scroll = cursor.line;
        } else if cursor.line >= self.editor_scroll + height {
            self.editor_scroll = cursor.line + 1 - height;
        }

        let col = self.editor.cursor_display_col();
        if width == 0 {
            self.editor_hscroll = col;
        } else if col < self.editor_hscroll {
            self.editor_hscroll = col;
        } else if col >= self.editor_hscroll + width {
            self.editor_hscroll = col + 1 - width;
        }
    }

    pub(super) fn max_editor_scroll(&self) -> usize {
        let height = usize::from(self.pane_layout().editor.height);
        self.editor.line_count().saturating_sub(height.max(1))
    }

    pub(super) fn show_toast(&mut self, level: ToastLevel, message: impl Into<String>) {
        self.show_toast_for(level, message, DEFAULT_TOAST_DURATION);
    }

    /// Show a toast, replacing any current one and its expiry.
    pub(super) fn show_toast_for(
        &mut self,
        level: ToastLevel,
        message: impl Into<String>,
        duration: Duration,
    ) {
        self.toast = Some(Toast {
            level,
            message: message.into(),
            expires_at: Instant::now() + duration,
        });
    }

    pub(super) fn expire_toast(&mut self, now: Instant) -> bool {
        if self
            .toast
            .as_ref()
            .is_some_and(|toast| toast.expires_at <= now)
        {
            self.toast = None;
            return true;
        }
        false
    }

    pub fn active_toast(&self) -> Option<(&str, ToastLevel)> {
        self.toast
            .as_ref()
            .map(|toast| (toast.message.as_str(), toast.level))
    }

    /// Remaining time on the current toast.
    pub fn toast_remaining(&self, now: Instant) -> Option<Duration> {
        self.toast
            .as_ref()
            .map(|toast| toast.expires_at.saturating_duration_since(now))
    }
}

// Implement Default for Model to allow std::mem::take
impl Default for Model {
    fn default() -> Self {
        Self {
            editor: EditorBuffer::default(),
            editor_scroll: 0,
            editor_hscroll: 0,
            pipeline: RenderPipeline::new(DEFAULT_DEBOUNCE_MS),
            themes: ThemeManager::default(),
            tabs: TabState::default(),
            split: SplitController::default(),
            preview_viewport: Viewport::new(80, 22, 0),
            code_viewport: Viewport::new(80, 22, 0),
            terminal_size: (80, 24),
            confirm: None,
            help_visible: false,
            should_quit: false,
            output_dir: PathBuf::from("."),
            config_global_path: None,
            config_local_path: None,
            toast: None,
            seen_revision: 0,
        }
    }
}
