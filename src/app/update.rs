use crate::app::Model;
use crate::app::model::{ConfirmPrompt, OutputTab};
use crate::editor::Direction;
use crate::resize::StepDirection;
use crate::theme::{PreviewStyle, Theme};

/// Spaces inserted by the Tab key.
const TAB_TEXT: &str = "  ";

/// All possible events and actions in the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    // Editor
    /// Insert a character at the cursor
    EditorInsertChar(char),
    /// Insert pasted text at the cursor
    EditorInsertText(String),
    /// Insert indentation (Tab)
    EditorInsertTab,
    /// Delete character before cursor (Backspace)
    EditorDeleteBack,
    /// Delete character at cursor (Delete)
    EditorDeleteForward,
    /// Split line at cursor (Enter)
    EditorSplitLine,
    EditorMoveCursor(Direction),
    EditorMoveHome,
    EditorMoveEnd,
    EditorMoveWordLeft,
    EditorMoveWordRight,
    EditorMoveToStart,
    EditorMoveToEnd,
    EditorPageUp,
    EditorPageDown,
    /// Move cursor to a line and on-screen column, e.g. from a mouse click
    EditorMoveTo(usize, usize),
    EditorScrollUp(usize),
    EditorScrollDown(usize),

    // Output panel
    OutputScrollUp(usize),
    OutputScrollDown(usize),
    OutputPageUp,
    OutputPageDown,
    ActivateTab(OutputTab),
    ToggleTab,

    // Theme and style
    CycleTheme,
    SetTheme(Theme),
    CyclePreviewStyle,
    SetPreviewStyle(PreviewStyle),

    // Actions
    /// Copy the raw HTML to the clipboard
    CopyHtml,
    /// Write `converted.html`
    DownloadHtml,
    /// Write `converted-styled.html`
    ExportStyled,
    /// Ask before restoring the sample text
    RequestReset,
    ConfirmReset,
    CancelReset,

    // Split
    /// Pointer pressed at a column
    SplitDragStart(u16),
    /// Pointer moved to a column
    SplitDragMove(u16),
    SplitDragEnd,
    SplitStep(StepDirection),

    // Window
    ToggleHelp,
    HideHelp,
    /// Terminal resized
    Resize(u16, u16),
    Redraw,

    /// Quit the application
    Quit,
}

impl Message {
    /// Whether this message can change the editor text.
    pub const fn edits_text(&self) -> bool {
        matches!(
            self,
            Self::EditorInsertChar(_)
                | Self::EditorInsertText(_)
                | Self::EditorInsertTab
                | Self::EditorDeleteBack
                | Self::EditorDeleteForward
                | Self::EditorSplitLine
        )
    }
}

/// Pure function that updates the model based on a message.
///
/// All state transitions happen here. Rendering, clipboard, file writes, and
/// theme persistence happen afterwards in the side-effect handler.
pub fn update(mut model: Model, msg: Message) -> Model {
    let follow_cursor = is_editor_navigation(&msg);
    match msg {
        Message::EditorInsertChar(ch) => model.editor.insert_char(ch),
        Message::EditorInsertText(text) => model.editor.insert_str(&text),
        Message::EditorInsertTab => model.editor.insert_str(TAB_TEXT),
        Message::EditorDeleteBack => {
            model.editor.delete_back();
        }
        Message::EditorDeleteForward => {
            model.editor.delete_forward();
        }
        Message::EditorSplitLine => model.editor.split_line(),
        Message::EditorMoveCursor(dir) => model.editor.move_cursor(dir),
        Message::EditorMoveHome => model.editor.move_home(),
        Message::EditorMoveEnd => model.editor.move_end(),
        Message::EditorMoveWordLeft => model.editor.move_word_left(),
        Message::EditorMoveWordRight => model.editor.move_word_right(),
        Message::EditorMoveToStart => model.editor.move_to_start(),
        Message::EditorMoveToEnd => model.editor.move_to_end(),
        Message::EditorPageUp | Message::EditorPageDown => {
            let page = usize::from(model.pane_layout().editor.height.max(1));
            let delta = isize::try_from(page).unwrap_or(isize::MAX);
            let delta = if matches!(msg, Message::EditorPageUp) {
                -delta
            } else {
                delta
            };
            model.editor.move_vertical(delta);
        }
        Message::EditorMoveTo(line, display_col) => {
            model.editor.move_to_display_col(line, display_col);
        }
        Message::EditorScrollUp(n) => {
            model.editor_scroll = model.editor_scroll.saturating_sub(n);
        }
        Message::EditorScrollDown(n) => {
            model.editor_scroll = (model.editor_scroll + n).min(model.max_editor_scroll());
        }

        Message::OutputScrollUp(n) => model.active_viewport_mut().scroll_up(n),
        Message::OutputScrollDown(n) => model.active_viewport_mut().scroll_down(n),
        Message::OutputPageUp => model.active_viewport_mut().page_up(),
        Message::OutputPageDown => model.active_viewport_mut().page_down(),
        Message::ActivateTab(tab) => model.tabs.activate(tab),
        Message::ToggleTab => model.tabs.toggle(),

        Message::CyclePreviewStyle => {
            let next = model.themes.preview_style().next();
            model.themes.apply_preview_style(next);
        }
        Message::SetPreviewStyle(style) => model.themes.apply_preview_style(style),

        Message::RequestReset => model.confirm = Some(ConfirmPrompt::ResetContent),
        Message::ConfirmReset => {
            if model.confirm.take().is_some() {
                model.reset_content();
            }
        }
        Message::CancelReset => model.confirm = None,

        Message::SplitDragStart(x) => {
            let layout = model.pane_layout();
            model.split.pointer_down(x, layout.divider.x);
        }
        Message::SplitDragMove(x) => {
            let area = model.area();
            if model.split.pointer_move(x, area.x, area.width) {
                model.sync_layout();
            }
        }
        Message::SplitDragEnd => model.split.pointer_up(),
        Message::SplitStep(direction) => {
            let width = model.area().width;
            if model.split.step(direction, width) {
                model.sync_layout();
            }
        }

        Message::ToggleHelp => model.help_visible = !model.help_visible,
        Message::HideHelp => model.help_visible = false,
        Message::Resize(width, height) => {
            model.terminal_size = (width, height);
            model.sync_layout();
        }

        Message::Quit => model.should_quit = true,

        // Handled as side effects.
        Message::CycleTheme
        | Message::SetTheme(_)
        | Message::CopyHtml
        | Message::DownloadHtml
        | Message::ExportStyled
        | Message::Redraw => {}
    }

    if follow_cursor {
        model.ensure_cursor_visible();
    }
    model
}

fn is_editor_navigation(msg: &Message) -> bool {
    msg.edits_text()
        || matches!(
            msg,
            Message::EditorMoveCursor(_)
                | Message::EditorMoveHome
                | Message::EditorMoveEnd
                | Message::EditorMoveWordLeft
                | Message::EditorMoveWordRight
                | Message::EditorMoveToStart
                | Message::EditorMoveToEnd
                | Message::EditorPageUp
                | Message::EditorPageDown
                | Message::EditorMoveTo(..)
                | Message::ConfirmReset
        )
}
