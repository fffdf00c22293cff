use ratatui::prelude::*;
use ratatui::widgets::{Block, Clear, Padding, Paragraph};
use unicode_width::UnicodeWidthChar;

use crate::app::{Model, OutputTab};
use crate::resize::SplitController;

use super::style::{self, Palette, PreviewAccent};
use super::{OUTPUT_LEFT_PADDING, overlays, status};

/// Screen regions: a header row, the two panes with the divider between
/// them, and a status row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaneLayout {
    pub header: Rect,
    pub editor: Rect,
    pub divider: Rect,
    pub output: Rect,
    pub status: Rect,
}

pub fn pane_layout(area: Rect, split: &SplitController) -> PaneLayout {
    let body_height = area.height.saturating_sub(2);
    let body_y = area.y + area.height.min(1);
    let (editor_width, output_width) = split.widths(area.width);
    let gutter = area
        .width
        .saturating_sub(editor_width)
        .saturating_sub(output_width);

    let header = Rect::new(area.x, area.y, area.width, area.height.min(1));
    let editor = Rect::new(area.x, body_y, editor_width, body_height);
    let divider = Rect::new(area.x + editor_width, body_y, gutter, body_height);
    let output = Rect::new(
        divider.x + gutter,
        body_y,
        output_width,
        body_height,
    );
    let status = Rect::new(
        area.x,
        area.y + area.height.saturating_sub(1),
        area.width,
        area.height.saturating_sub(1).min(1),
    );
    PaneLayout {
        header,
        editor,
        divider,
        output,
        status,
    }
}

/// Columns the preview is laid out in.
pub fn output_content_width(layout: &PaneLayout) -> u16 {
    layout
        .output
        .width
        .saturating_sub(OUTPUT_LEFT_PADDING)
        .max(1)
}

fn tab_label(tab: OutputTab) -> String {
    format!(" {} ", tab.label())
}

/// Header cells of each tab label: `(tab, x, width)`.
fn tab_bounds(layout: &PaneLayout) -> Vec<(OutputTab, u16, u16)> {
    let mut x = layout.output.x;
    let mut bounds = Vec::with_capacity(OutputTab::ALL.len());
    for tab in OutputTab::ALL {
        let width = u16::try_from(tab_label(tab).len()).unwrap_or(u16::MAX);
        bounds.push((tab, x, width));
        x = x.saturating_add(width + 1);
    }
    bounds
}

/// The tab whose header label covers `(x, y)`.
pub fn tab_at(layout: &PaneLayout, x: u16, y: u16) -> Option<OutputTab> {
    if layout.header.height == 0 || y != layout.header.y {
        return None;
    }
    tab_bounds(layout)
        .into_iter()
        .find(|&(_, start, width)| x >= start && x < start.saturating_add(width))
        .map(|(tab, _, _)| tab)
}

/// Render the complete UI.
pub fn render(model: &Model, frame: &mut Frame) {
    let area = frame.area();
    let layout = model.pane_layout();
    let palette = Palette::for_theme(model.themes.theme());

    render_header(model, frame, &layout, &palette);
    render_editor(model, frame, layout.editor);
    render_divider(model, frame, layout.divider, &palette);
    match model.tabs.active() {
        OutputTab::Preview => render_preview(model, frame, layout.output, &palette),
        OutputTab::Code => render_code(model, frame, layout.output, &palette),
    }

    if model.active_toast().is_some() && layout.editor.height > 0 {
        let toast_area = Rect {
            y: layout.status.y.saturating_sub(1),
            height: 1,
            ..layout.status
        };
        status::render_toast_bar(model, frame, toast_area);
    }
    status::render_status_bar(model, frame, layout.status, &palette);

    if let Some(prompt) = model.confirm {
        overlays::render_confirm_overlay(prompt, frame, area, &palette);
    } else if model.help_visible {
        overlays::render_help_overlay(model, frame, area, &palette);
    }
}

fn render_header(model: &Model, frame: &mut Frame, layout: &PaneLayout, palette: &Palette) {
    if layout.header.height == 0 {
        return;
    }
    let bar = Style::default().bg(palette.status_bg).fg(palette.status_fg);
    frame.render_widget(Paragraph::new("").style(bar), layout.header);

    let title = Rect {
        width: layout.editor.width,
        ..layout.header
    };
    frame.render_widget(
        Paragraph::new(" Markdown").style(bar.add_modifier(Modifier::BOLD)),
        title,
    );

    let mut spans = Vec::new();
    for (idx, tab) in OutputTab::ALL.into_iter().enumerate() {
        if idx > 0 {
            spans.push(Span::styled(" ", bar));
        }
        let style = if model.tabs.is_selected(tab) {
            Style::default()
                .bg(palette.accent)
                .fg(palette.background)
                .add_modifier(Modifier::BOLD)
        } else {
            bar
        };
        spans.push(Span::styled(tab_label(tab), style));
    }
    let tabs = Rect {
        x: layout.output.x,
        width: layout.output.width,
        ..layout.header
    };
    frame.render_widget(Paragraph::new(Line::from(spans)).style(bar), tabs);
}

fn render_editor(model: &Model, frame: &mut Frame, area: Rect) {
    let base = style::editor_style(model.themes.theme());
    let cursor_style = base.add_modifier(Modifier::REVERSED);
    let cursor = model.editor.cursor();
    let width = usize::from(area.width);

    let start = model.editor_scroll;
    let end = (start + usize::from(area.height)).min(model.editor.line_count());
    let content: Vec<Line> = (start..end)
        .map(|line_idx| {
            let text = model.editor.line_at(line_idx).unwrap_or_default();
            let cursor_col = (line_idx == cursor.line).then_some(cursor.col);
            editor_line(&text, model.editor_hscroll, width, cursor_col, cursor_style)
        })
        .collect();

    frame.render_widget(Clear, area);
    frame.render_widget(Paragraph::new(content).style(base), area);
}

/// One editor row, scrolled horizontally by display columns, with the cursor
/// cell reversed.
fn editor_line(
    text: &str,
    hscroll: usize,
    width: usize,
    cursor_col: Option<usize>,
    cursor_style: Style,
) -> Line<'static> {
    let mut spans = Vec::new();
    let mut run = String::new();
    let mut col = 0;
    let mut cursor_drawn = false;

    for (idx, ch) in text.chars().enumerate() {
        let ch_width = ch.width().unwrap_or(0);
        if col >= hscroll + width {
            break;
        }
        let visible = col >= hscroll && col + ch_width <= hscroll + width;
        if cursor_col == Some(idx) && col >= hscroll {
            if !run.is_empty() {
                spans.push(Span::raw(std::mem::take(&mut run)));
            }
            let cell = if ch_width == 0 { ' ' } else { ch };
            spans.push(Span::styled(cell.to_string(), cursor_style));
            cursor_drawn = true;
        } else if visible && ch_width > 0 {
            run.push(ch);
        }
        col += ch_width;
    }
    if !run.is_empty() {
        spans.push(Span::raw(run));
    }
    if !cursor_drawn && cursor_col.is_some() && col >= hscroll && col < hscroll + width {
        spans.push(Span::styled(" ", cursor_style));
    }
    Line::from(spans)
}

fn render_divider(model: &Model, frame: &mut Frame, area: Rect, palette: &Palette) {
    if area.width == 0 {
        return;
    }
    let color = if model.split.is_dragging() {
        palette.accent
    } else {
        palette.border
    };
    let lines: Vec<Line> = (0..area.height).map(|_| Line::raw("\u{2502}")).collect();
    frame.render_widget(
        Paragraph::new(lines).style(Style::default().fg(color).bg(palette.background)),
        area,
    );
}

fn render_preview(model: &Model, frame: &mut Frame, area: Rect, palette: &Palette) {
    let accent = PreviewAccent::for_style(model.themes.preview_style());
    let base = style::preview_base(palette, &accent);
    let lines = model.pipeline.preview().lines();
    let range = model.preview_viewport.visible_range();

    let content: Vec<Line> = lines
        .get(range)
        .unwrap_or_default()
        .iter()
        .map(|line| {
            let line_style = style::style_for_line_type(line.line_type(), palette, &accent);
            match line.spans() {
                Some(spans) => Line::from(
                    spans
                        .iter()
                        .map(|span| {
                            Span::styled(
                                span.text().to_string(),
                                style::style_for_inline(line_style, span.style(), palette, &accent),
                            )
                        })
                        .collect::<Vec<_>>(),
                ),
                None => Line::styled(line.content().to_string(), line_style),
            }
        })
        .collect();

    let block = Block::default()
        .padding(Padding::left(OUTPUT_LEFT_PADDING))
        .style(base);
    frame.render_widget(Clear, area);
    frame.render_widget(Paragraph::new(content).block(block), area);
}

fn render_code(model: &Model, frame: &mut Frame, area: Rect, palette: &Palette) {
    let base = Style::default().fg(palette.foreground).bg(palette.code_bg);
    let lines = model.pipeline.code().lines();
    let range = model.code_viewport.visible_range();

    let content: Vec<Line> = lines
        .get(range)
        .unwrap_or_default()
        .iter()
        .map(|spans| {
            Line::from(
                spans
                    .iter()
                    .map(|span| {
                        let style = span
                            .style()
                            .fg
                            .map_or(base, |fg| base.fg(style::terminal_color(fg)));
                        Span::styled(span.text().to_string(), style)
                    })
                    .collect::<Vec<_>>(),
            )
        })
        .collect();

    let block = Block::default()
        .padding(Padding::left(OUTPUT_LEFT_PADDING))
        .style(base);
    frame.render_widget(Clear, area);
    frame.render_widget(Paragraph::new(content).block(block), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_editor_line_reverses_cursor_cell() {
        let cursor = Style::default().add_modifier(Modifier::REVERSED);
        let line = editor_line("abc", 0, 10, Some(1), cursor);
        assert_eq!(line_text(&line), "abc");
        assert_eq!(line.spans[1].content, "b");
        assert_eq!(line.spans[1].style, cursor);
    }

    #[test]
    fn test_editor_line_cursor_past_end_is_a_space() {
        let cursor = Style::default().add_modifier(Modifier::REVERSED);
        let line = editor_line("ab", 0, 10, Some(2), cursor);
        assert_eq!(line_text(&line), "ab ");
    }

    #[test]
    fn test_editor_line_scrolls_by_display_columns() {
        let line = editor_line("日本語abc", 2, 4, None, Style::default());
        assert_eq!(line_text(&line), "本語");
    }

    #[test]
    fn test_tab_bounds_follow_labels() {
        let layout = pane_layout(Rect::new(0, 0, 100, 30), &SplitController::default());
        let x = layout.output.x;
        assert_eq!(tab_at(&layout, x, 0), Some(OutputTab::Preview));
        assert_eq!(tab_at(&layout, x + 8, 0), Some(OutputTab::Preview));
        assert_eq!(tab_at(&layout, x + 9, 0), None);
        assert_eq!(tab_at(&layout, x + 10, 0), Some(OutputTab::Code));
        assert_eq!(tab_at(&layout, x + 15, 0), Some(OutputTab::Code));
        assert_eq!(tab_at(&layout, x + 16, 0), None);
        assert_eq!(tab_at(&layout, x, 1), None);
    }
}
