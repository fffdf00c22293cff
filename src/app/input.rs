use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::Frame;
use ratatui::layout::Rect;

use crate::app::model::OutputTab;
use crate::app::{App, Message, Model};
use crate::editor::Direction;
use crate::resize::StepDirection;

/// Lines moved per mouse wheel notch.
const WHEEL_LINES: usize = 3;

impl App {
    pub(super) fn handle_event(event: &Event, model: &Model) -> Option<Message> {
        match event {
            Event::Key(key) => Self::handle_key(*key, model),
            Event::Mouse(mouse) => Self::handle_mouse(*mouse, model),
            Event::Paste(text) if model.confirm.is_none() && !model.help_visible => {
                Some(Message::EditorInsertText(text.clone()))
            }
            Event::Resize(w, h) => {
                crate::perf::log_event("event.resize", format!("width={w} height={h}"));
                Some(Message::Resize(*w, *h))
            }
            _ => None,
        }
    }

    pub(super) fn handle_key(key: KeyEvent, model: &Model) -> Option<Message> {
        if key.kind == KeyEventKind::Release {
            return None;
        }

        // A confirmation prompt swallows everything but its answer.
        if model.confirm.is_some() {
            return match key.code {
                KeyCode::Char('y' | 'Y') | KeyCode::Enter => Some(Message::ConfirmReset),
                KeyCode::Char('n' | 'N') | KeyCode::Esc => Some(Message::CancelReset),
                _ => None,
            };
        }

        if model.help_visible {
            return match key.code {
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    Some(Message::Quit)
                }
                _ => Some(Message::HideHelp),
            };
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let alt = key.modifiers.contains(KeyModifiers::ALT);

        if ctrl {
            return match key.code {
                KeyCode::Char('q' | 'c') => Some(Message::Quit),
                KeyCode::Char('k' | 'y') => Some(Message::CopyHtml),
                KeyCode::Char('d') => Some(Message::DownloadHtml),
                KeyCode::Char('e') => Some(Message::ExportStyled),
                KeyCode::Char('r') => Some(Message::RequestReset),
                KeyCode::Char('t') => Some(Message::CycleTheme),
                KeyCode::Char('p') => Some(Message::CyclePreviewStyle),
                KeyCode::Char('o') => Some(Message::ToggleTab),
                KeyCode::Left => Some(Message::EditorMoveWordLeft),
                KeyCode::Right => Some(Message::EditorMoveWordRight),
                KeyCode::Home => Some(Message::EditorMoveToStart),
                KeyCode::End => Some(Message::EditorMoveToEnd),
                _ => None,
            };
        }

        if alt {
            return match key.code {
                KeyCode::Left => Some(Message::SplitStep(StepDirection::Shrink)),
                KeyCode::Right => Some(Message::SplitStep(StepDirection::Grow)),
                KeyCode::Up => Some(Message::OutputScrollUp(1)),
                KeyCode::Down => Some(Message::OutputScrollDown(1)),
                KeyCode::PageUp => Some(Message::OutputPageUp),
                KeyCode::PageDown => Some(Message::OutputPageDown),
                _ => None,
            };
        }

        match key.code {
            KeyCode::F(1) => Some(Message::ToggleHelp),
            KeyCode::F(2) => Some(Message::ActivateTab(OutputTab::Preview)),
            KeyCode::F(3) => Some(Message::ActivateTab(OutputTab::Code)),

            KeyCode::Char(c) => Some(Message::EditorInsertChar(c)),
            KeyCode::Tab => Some(Message::EditorInsertTab),
            KeyCode::Enter => Some(Message::EditorSplitLine),
            KeyCode::Backspace => Some(Message::EditorDeleteBack),
            KeyCode::Delete => Some(Message::EditorDeleteForward),

            KeyCode::Left => Some(Message::EditorMoveCursor(Direction::Left)),
            KeyCode::Right => Some(Message::EditorMoveCursor(Direction::Right)),
            KeyCode::Up => Some(Message::EditorMoveCursor(Direction::Up)),
            KeyCode::Down => Some(Message::EditorMoveCursor(Direction::Down)),
            KeyCode::Home => Some(Message::EditorMoveHome),
            KeyCode::End => Some(Message::EditorMoveEnd),
            KeyCode::PageUp => Some(Message::EditorPageUp),
            KeyCode::PageDown => Some(Message::EditorPageDown),

            _ => None,
        }
    }

    pub(super) fn handle_mouse(mouse: MouseEvent, model: &Model) -> Option<Message> {
        if model.confirm.is_some() || model.help_visible {
            return None;
        }

        let layout = model.pane_layout();

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if point_in_rect(mouse.column, mouse.row, layout.divider) {
                    return Some(Message::SplitDragStart(mouse.column));
                }
                if let Some(tab) = crate::ui::tab_at(&layout, mouse.column, mouse.row) {
                    return Some(Message::ActivateTab(tab));
                }
                if point_in_rect(mouse.column, mouse.row, layout.editor) {
                    let line = model.editor_scroll + usize::from(mouse.row - layout.editor.y);
                    let col = model.editor_hscroll + usize::from(mouse.column - layout.editor.x);
                    return Some(Message::EditorMoveTo(line, col));
                }
                None
            }
            MouseEventKind::Drag(MouseButton::Left) if model.split.is_dragging() => {
                Some(Message::SplitDragMove(mouse.column))
            }
            MouseEventKind::Up(MouseButton::Left) if model.split.is_dragging() => {
                Some(Message::SplitDragEnd)
            }
            MouseEventKind::ScrollDown => {
                if point_in_rect(mouse.column, mouse.row, layout.output) {
                    Some(Message::OutputScrollDown(WHEEL_LINES))
                } else if point_in_rect(mouse.column, mouse.row, layout.editor) {
                    Some(Message::EditorScrollDown(WHEEL_LINES))
                } else {
                    None
                }
            }
            MouseEventKind::ScrollUp => {
                if point_in_rect(mouse.column, mouse.row, layout.output) {
                    Some(Message::OutputScrollUp(WHEEL_LINES))
                } else if point_in_rect(mouse.column, mouse.row, layout.editor) {
                    Some(Message::EditorScrollUp(WHEEL_LINES))
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    pub(super) fn view(model: &Model, frame: &mut Frame) {
        crate::ui::render(model, frame);
    }
}

fn point_in_rect(col: u16, row: u16, rect: Rect) -> bool {
    col >= rect.x
        && col < rect.x.saturating_add(rect.width)
        && row >= rect.y
        && row < rect.y.saturating_add(rect.height)
}
