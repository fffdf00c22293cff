use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Padding, Paragraph};

use crate::app::{ConfirmPrompt, Model};

use super::style::Palette;

const HELP_KEYS: &[(&str, &[(&str, &str)])] = &[
    (
        "Editor",
        &[
            ("Arrows, Home/End", "Move cursor"),
            ("Ctrl+Left/Right", "Word movement"),
            ("Ctrl+Home/End", "Start / end of text"),
            ("PageUp/PageDown", "Page through text"),
            ("Tab", "Indent"),
        ],
    ),
    (
        "Output",
        &[
            ("F2 / F3", "Preview / HTML tab"),
            ("Ctrl+O", "Toggle tab"),
            ("Alt+Up/Down", "Scroll output"),
            ("Alt+PageUp/PageDown", "Page output"),
            ("Alt+Left/Right", "Resize split"),
            ("Mouse", "Drag divider, click tab, wheel"),
        ],
    ),
    (
        "Actions",
        &[
            ("Ctrl+K / Ctrl+Y", "Copy HTML"),
            ("Ctrl+D", "Download converted.html"),
            ("Ctrl+E", "Export converted-styled.html"),
            ("Ctrl+R", "Reset to sample text"),
            ("Ctrl+T", "Cycle theme"),
            ("Ctrl+P", "Cycle preview style"),
            ("F1", "Toggle help"),
            ("Ctrl+Q / Ctrl+C", "Quit"),
        ],
    ),
];

pub fn render_help_overlay(model: &Model, frame: &mut Frame, area: Rect, palette: &Palette) {
    let popup_width = area.width.saturating_sub(12).max(48);
    let popup_height = area.height.saturating_sub(4).max(12);
    let popup = centered_popup_rect(popup_width, popup_height, area);

    let section_style = Style::default()
        .fg(palette.accent)
        .add_modifier(Modifier::BOLD);
    let dim_style = Style::default().fg(palette.muted);

    let mut lines: Vec<Line> = Vec::new();
    for (section, keys) in HELP_KEYS {
        lines.push(Line::styled(*section, section_style));
        for (key, action) in *keys {
            lines.push(Line::raw(format!("  {key:<22}{action}")));
        }
        lines.push(Line::raw(""));
    }

    let global_cfg = model
        .config_global_path
        .as_ref()
        .map_or_else(|| "<unknown>".to_string(), |p| p.display().to_string());
    let local_cfg = model
        .config_local_path
        .as_ref()
        .map_or_else(|| "<none>".to_string(), |p| p.display().to_string());
    let prefs = model
        .themes
        .store()
        .path()
        .map_or_else(|| "<not saved>".to_string(), |p| p.display().to_string());
    lines.push(Line::styled("Config", section_style));
    lines.push(Line::raw(format!("  Global: {global_cfg}")));
    lines.push(Line::raw(format!("  Local override: {local_cfg}")));
    lines.push(Line::raw(format!("  Theme preference: {prefs}")));
    lines.push(Line::raw(""));
    lines.push(Line::styled("Any key closes", dim_style));

    let block = Block::default()
        .title("Help")
        .borders(Borders::ALL)
        .padding(Padding::uniform(1))
        .style(Style::default().bg(palette.status_bg).fg(palette.status_fg));

    frame.render_widget(Clear, popup);
    frame.render_widget(Paragraph::new(lines).block(block), popup);
}

pub fn render_confirm_overlay(
    prompt: ConfirmPrompt,
    frame: &mut Frame,
    area: Rect,
    palette: &Palette,
) {
    let message = prompt.message();
    let width = u16::try_from(message.len() + 8).unwrap_or(u16::MAX).max(36);
    let popup = centered_popup_rect(width, 7, area);

    let lines = vec![
        Line::raw(message),
        Line::raw(""),
        Line::from(vec![
            Span::styled(
                "[y]",
                Style::default()
                    .fg(palette.accent)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" Yes   "),
            Span::styled(
                "[n]",
                Style::default()
                    .fg(palette.accent)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" No"),
        ]),
    ];

    let block = Block::default()
        .title("Confirm")
        .borders(Borders::ALL)
        .padding(Padding::horizontal(2))
        .style(Style::default().bg(palette.status_bg).fg(palette.status_fg));

    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(lines)
            .block(block)
            .alignment(Alignment::Center),
        popup,
    );
}

pub fn centered_popup_rect(width: u16, height: u16, area: Rect) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(w) / 2);
    let y = area.y + (area.height.saturating_sub(h) / 2);
    Rect::new(x, y, w, h)
}
