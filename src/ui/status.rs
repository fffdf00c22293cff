use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::app::{Model, OutputTab, ToastLevel};

use super::style::Palette;

pub fn render_status_bar(model: &Model, frame: &mut Frame, area: Rect, palette: &Palette) {
    if area.height == 0 {
        return;
    }
    let cursor = model.editor.cursor();
    let viewport = model.active_viewport();
    let pending = if model.render_outdated() {
        " [rendering]"
    } else {
        ""
    };
    let view = match model.tabs.active() {
        OutputTab::Preview => format!("style: {}", model.themes.preview_style().name()),
        OutputTab::Code => format!("{} html lines", model.pipeline.code().line_count()),
    };

    let status = format!(
        " mdconvert  theme: {}  {}  Ln {}, Col {}  [{}%]{}  F1:help",
        model.themes.theme().name(),
        view,
        cursor.line + 1,
        cursor.col + 1,
        viewport.scroll_percent(),
        pending,
    );

    let status_bar = Paragraph::new(status)
        .style(Style::default().bg(palette.status_bg).fg(palette.status_fg));
    frame.render_widget(status_bar, area);
}

pub fn render_toast_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let Some((message, level)) = model.active_toast() else {
        return;
    };
    let (prefix, style) = match level {
        ToastLevel::Info => (
            "[info]",
            Style::default().bg(Color::DarkGray).fg(Color::White),
        ),
        ToastLevel::Warning => (
            "[warn]",
            Style::default().bg(Color::Yellow).fg(Color::Black),
        ),
        ToastLevel::Error => ("[error]", Style::default().bg(Color::Red).fg(Color::White)),
    };
    let toast = Paragraph::new(format!("{prefix} {message}")).style(style);
    frame.render_widget(toast, area);
}
