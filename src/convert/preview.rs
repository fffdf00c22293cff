//! Terminal layout of markdown for the preview tab.
//!
//! Walks the same comrak AST the HTML renderer uses (same extensions, same
//! hard-break handling) and produces wrapped, styled lines.

use comrak::nodes::{AstNode, ListDelimType, ListType, NodeValue, TableAlignment};
use comrak::{Arena, Options, parse_document};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use super::apply_conversion_options;
use super::types::{InlineSpan, InlineStyle, LineType, RenderedLine};

const CODE_RIGHT_PADDING: usize = 3;

/// Lay out markdown as styled lines wrapped to `width` columns.
pub fn layout_preview(text: &str, width: u16) -> Vec<RenderedLine> {
    let _scope = crate::perf::scope("preview.layout");
    let arena = Arena::new();
    let mut options = Options::default();
    apply_conversion_options(&mut options);
    let root = parse_document(&arena, text, &options);

    let mut lines = Vec::new();
    let wrap_width = usize::from(width.max(1));
    for child in root.children() {
        layout_block(child, &mut lines, 0, wrap_width, None);
    }
    while lines
        .last()
        .is_some_and(|line: &RenderedLine| *line.line_type() == LineType::Empty)
    {
        lines.pop();
    }
    lines
}

fn layout_block<'a>(
    node: &'a AstNode<'a>,
    lines: &mut Vec<RenderedLine>,
    depth: usize,
    wrap_width: usize,
    list_marker: Option<String>,
) {
    match &node.data.borrow().value {
        NodeValue::Heading(heading) => {
            if !lines.is_empty() {
                ensure_trailing_empty_lines(lines, 1);
            }
            let level = heading.level;
            let spans = collect_inline_spans(node);
            for line_spans in wrap_spans(&spans, wrap_width, "", "") {
                lines.push(RenderedLine::from_spans(LineType::Heading(level), line_spans));
            }
            if level <= 2 {
                let rule = if level == 1 { "═" } else { "─" };
                let underline = rule.repeat(wrap_width.min(48));
                lines.push(RenderedLine::new(underline, LineType::Heading(level)));
            }
            lines.push(RenderedLine::new(String::new(), LineType::Empty));
        }

        NodeValue::Paragraph => {
            let spans = collect_inline_spans(node);
            push_wrapped(lines, &spans, wrap_width, "", "", LineType::Paragraph);
            lines.push(RenderedLine::new(String::new(), LineType::Empty));
        }

        NodeValue::CodeBlock(code_block) => {
            let language = code_block
                .info
                .split_whitespace()
                .next()
                .filter(|s| !s.is_empty())
                .map(ToString::to_string);
            layout_code_block(lines, language.as_deref(), &code_block.literal, wrap_width);
            lines.push(RenderedLine::new(String::new(), LineType::Empty));
        }

        NodeValue::HtmlBlock(block) => {
            for raw in block.literal.lines() {
                lines.push(RenderedLine::new(
                    truncate_text(raw, wrap_width),
                    LineType::Html,
                ));
            }
            lines.push(RenderedLine::new(String::new(), LineType::Empty));
        }

        NodeValue::List(list) => {
            let list_depth = depth + 1;
            let delimiter = match list.delimiter {
                ListDelimType::Paren => ')',
                ListDelimType::Period => '.',
            };
            let max_number = list.start + node.children().count().saturating_sub(1);
            let number_width = max_number.to_string().len();

            for (index, child) in node.children().enumerate() {
                let marker = match list.list_type {
                    ListType::Bullet => "• ".to_string(),
                    ListType::Ordered => format!(
                        "{:>number_width$}{delimiter} ",
                        list.start + index
                    ),
                };
                layout_block(child, lines, list_depth, wrap_width, Some(marker));
            }
            if depth == 0 {
                lines.push(RenderedLine::new(String::new(), LineType::Empty));
            }
        }

        NodeValue::Item(_) | NodeValue::TaskItem(_) => {
            layout_list_item(node, lines, depth, wrap_width, list_marker);
        }

        NodeValue::BlockQuote => {
            layout_blockquote(node, lines, wrap_width, 1);
            lines.push(RenderedLine::new(String::new(), LineType::Empty));
        }

        NodeValue::ThematicBreak => {
            lines.push(RenderedLine::new(
                "─".repeat(wrap_width.min(48)),
                LineType::HorizontalRule,
            ));
            lines.push(RenderedLine::new(String::new(), LineType::Empty));
        }

        NodeValue::Table(_) => {
            for line in layout_table(node, wrap_width) {
                lines.push(RenderedLine::new(line, LineType::Table));
            }
            lines.push(RenderedLine::new(String::new(), LineType::Empty));
        }

        _ => {
            for child in node.children() {
                layout_block(child, lines, depth, wrap_width, list_marker.clone());
            }
        }
    }
}

fn layout_list_item<'a>(
    node: &'a AstNode<'a>,
    lines: &mut Vec<RenderedLine>,
    depth: usize,
    wrap_width: usize,
    list_marker: Option<String>,
) {
    let indent = "  ".repeat(depth.saturating_sub(1));
    let marker = match &node.data.borrow().value {
        NodeValue::TaskItem(symbol) => {
            if symbol.is_some() { "✓ " } else { "□ " }.to_string()
        }
        _ => list_marker.unwrap_or_else(|| "• ".to_string()),
    };
    let prefix_first = format!("{indent}{marker}");
    let prefix_next = format!("{indent}{}", " ".repeat(marker.chars().count()));
    let mut rendered_paragraphs = 0usize;

    for child in node.children() {
        if matches!(child.data.borrow().value, NodeValue::Paragraph) {
            if rendered_paragraphs > 0 {
                lines.push(RenderedLine::new(String::new(), LineType::ListItem(depth)));
            }
            let prefix = if rendered_paragraphs == 0 {
                &prefix_first
            } else {
                &prefix_next
            };
            let spans = collect_inline_spans(child);
            push_wrapped(
                lines,
                &spans,
                wrap_width,
                prefix,
                &prefix_next,
                LineType::ListItem(depth),
            );
            rendered_paragraphs += 1;
        } else {
            layout_block(child, lines, depth, wrap_width, None);
        }
    }

    if rendered_paragraphs == 0 && node.children().next().is_none() {
        lines.push(RenderedLine::new(prefix_first, LineType::ListItem(depth)));
    }
}

fn layout_code_block(
    lines: &mut Vec<RenderedLine>,
    language: Option<&str>,
    literal: &str,
    wrap_width: usize,
) {
    let content_width = literal
        .lines()
        .map(UnicodeWidthStr::width)
        .max()
        .unwrap_or(0)
        .min(wrap_width.saturating_sub(4 + CODE_RIGHT_PADDING).max(1));
    let label = format!(" {} ", language.unwrap_or("code"));
    let frame_inner_width = content_width + 2 + CODE_RIGHT_PADDING;
    let visible_label = truncate_text(&label, frame_inner_width);
    lines.push(RenderedLine::new(
        format!(
            "┌{visible_label}{}┐",
            "─".repeat(frame_inner_width.saturating_sub(display_width(&visible_label)))
        ),
        LineType::CodeBlock,
    ));

    let mut code_style = InlineStyle::default();
    code_style.code = true;
    for raw_line in literal.lines() {
        let body = truncate_text(raw_line, content_width);
        let padding =
            " ".repeat(content_width.saturating_sub(display_width(&body)) + CODE_RIGHT_PADDING);
        lines.push(RenderedLine::from_spans(
            LineType::CodeBlock,
            vec![
                InlineSpan::plain("│ "),
                InlineSpan::new(body, code_style),
                InlineSpan::plain(format!("{padding} │")),
            ],
        ));
    }

    lines.push(RenderedLine::new(
        format!("└{}┘", "─".repeat(frame_inner_width)),
        LineType::CodeBlock,
    ));
}

fn layout_blockquote<'a>(
    node: &'a AstNode<'a>,
    lines: &mut Vec<RenderedLine>,
    wrap_width: usize,
    quote_depth: usize,
) {
    let prefix = "│ ".repeat(quote_depth);

    for child in node.children() {
        match &child.data.borrow().value {
            NodeValue::BlockQuote => {
                layout_blockquote(child, lines, wrap_width, quote_depth + 1);
            }
            NodeValue::Paragraph => {
                let spans = collect_inline_spans(child);
                push_wrapped(lines, &spans, wrap_width, &prefix, &prefix, LineType::BlockQuote);
            }
            _ => {
                let mut nested = Vec::new();
                layout_block(child, &mut nested, 0, wrap_width.saturating_sub(prefix.len()), None);
                for line in nested {
                    if *line.line_type() == LineType::Empty {
                        continue;
                    }
                    lines.push(RenderedLine::new(
                        format!("{prefix}{}", line.content()),
                        LineType::BlockQuote,
                    ));
                }
            }
        }
    }
}

fn layout_table<'a>(table_node: &'a AstNode<'a>, wrap_width: usize) -> Vec<String> {
    let alignments = match &table_node.data.borrow().value {
        NodeValue::Table(table) => table.alignments.clone(),
        _ => Vec::new(),
    };

    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut has_header = false;
    for row_node in table_node.children() {
        let NodeValue::TableRow(is_header) = row_node.data.borrow().value else {
            continue;
        };
        has_header |= is_header;
        let cells = row_node
            .children()
            .filter(|cell| matches!(cell.data.borrow().value, NodeValue::TableCell))
            .map(|cell| {
                extract_text(cell)
                    .split_whitespace()
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect();
        rows.push(cells);
    }

    let num_cols = rows.iter().map(Vec::len).max().unwrap_or(0);
    if num_cols == 0 {
        return Vec::new();
    }

    let mut col_widths = vec![1_usize; num_cols];
    for row in &rows {
        for (idx, cell) in row.iter().enumerate() {
            col_widths[idx] = col_widths[idx].max(display_width(cell));
        }
    }

    // Row width is 1 + sum(col_width + 3).
    let max_table_width = wrap_width.max(4);
    while 1 + col_widths.iter().sum::<usize>() + (3 * num_cols) > max_table_width {
        let Some((widest, _)) = col_widths.iter().enumerate().max_by_key(|(_, w)| **w) else {
            break;
        };
        if col_widths[widest] <= 1 {
            break;
        }
        col_widths[widest] -= 1;
    }

    let mut out = vec![table_border(&col_widths, '┌', '┬', '┐')];
    for (idx, row) in rows.iter().enumerate() {
        out.push(table_row(row, &col_widths, &alignments));
        if has_header && idx == 0 {
            out.push(table_border(&col_widths, '├', '┼', '┤'));
        }
    }
    out.push(table_border(&col_widths, '└', '┴', '┘'));
    out
}

fn table_border(widths: &[usize], left: char, middle: char, right: char) -> String {
    let inner = widths
        .iter()
        .map(|width| "─".repeat(width + 2))
        .collect::<Vec<_>>()
        .join(&middle.to_string());
    format!("{left}{inner}{right}")
}

fn table_row(cells: &[String], widths: &[usize], alignments: &[TableAlignment]) -> String {
    let mut out = String::from("│");
    for (idx, width) in widths.iter().enumerate() {
        let content = truncate_text(cells.get(idx).map_or("", String::as_str), *width);
        let padding = width.saturating_sub(display_width(&content));
        let (left, right) = match alignments.get(idx).copied().unwrap_or(TableAlignment::None) {
            TableAlignment::Right => (padding, 0),
            TableAlignment::Center => (padding / 2, padding - padding / 2),
            TableAlignment::Left | TableAlignment::None => (0, padding),
        };
        out.push(' ');
        out.push_str(&" ".repeat(left));
        out.push_str(&content);
        out.push_str(&" ".repeat(right));
        out.push_str(" │");
    }
    out
}

fn ensure_trailing_empty_lines(lines: &mut Vec<RenderedLine>, count: usize) {
    let existing = lines
        .iter()
        .rev()
        .take_while(|line| *line.line_type() == LineType::Empty)
        .count();
    for _ in existing..count {
        lines.push(RenderedLine::new(String::new(), LineType::Empty));
    }
}

fn push_wrapped(
    lines: &mut Vec<RenderedLine>,
    spans: &[InlineSpan],
    wrap_width: usize,
    prefix_first: &str,
    prefix_next: &str,
    line_type: LineType,
) {
    for line_spans in wrap_spans(spans, wrap_width, prefix_first, prefix_next) {
        lines.push(RenderedLine::from_spans(line_type, line_spans));
    }
}

fn extract_text<'a>(node: &'a AstNode<'a>) -> String {
    let mut text = String::new();
    for span in collect_inline_spans(node) {
        text.push_str(span.text());
    }
    text
}

fn collect_inline_spans<'a>(node: &'a AstNode<'a>) -> Vec<InlineSpan> {
    let mut spans = Vec::new();
    for child in node.children() {
        collect_inline_spans_recursive(child, InlineStyle::default(), &mut spans);
    }
    spans
}

fn collect_inline_spans_recursive<'a>(
    node: &'a AstNode<'a>,
    style: InlineStyle,
    spans: &mut Vec<InlineSpan>,
) {
    let mut next = style;
    match &node.data.borrow().value {
        NodeValue::List(_) | NodeValue::Item(_) => return,
        NodeValue::Text(t) => {
            spans.push(InlineSpan::new(t.to_string(), style));
            return;
        }
        NodeValue::Code(code) => {
            let mut code_style = InlineStyle::default();
            code_style.code = true;
            code_style.link = style.link;
            spans.push(InlineSpan::new(code.literal.clone(), code_style));
            return;
        }
        NodeValue::HtmlInline(raw) => {
            spans.push(InlineSpan::new(raw.clone(), style));
            return;
        }
        // Soft breaks are hard breaks in this renderer.
        NodeValue::SoftBreak | NodeValue::LineBreak => {
            spans.push(InlineSpan::new("\n".to_string(), style));
            return;
        }
        NodeValue::Image(image) => {
            let alt = extract_text(node);
            let label = if alt.is_empty() { image.url.clone() } else { alt };
            spans.push(InlineSpan::new(format!("[Image: {label}]"), style));
            return;
        }
        NodeValue::Emph => next.emphasis = true,
        NodeValue::Strong => next.strong = true,
        NodeValue::Strikethrough => next.strikethrough = true,
        NodeValue::Link(_) => next.link = true,
        _ => {}
    }
    for child in node.children() {
        collect_inline_spans_recursive(child, next, spans);
    }
}

/// Greedy word wrap over styled spans. A `"\n"` token forces a break.
fn wrap_spans(
    spans: &[InlineSpan],
    width: usize,
    prefix_first: &str,
    prefix_next: &str,
) -> Vec<Vec<InlineSpan>> {
    let tokens: Vec<InlineSpan> = spans.iter().flat_map(split_inline_tokens).collect();

    let mut lines: Vec<Vec<InlineSpan>> = Vec::new();
    let mut current: Vec<InlineSpan> = Vec::new();
    let mut current_len = 0usize;
    let mut has_word = false;

    let start_line = |prefix: &str, current: &mut Vec<InlineSpan>, current_len: &mut usize| {
        current.clear();
        *current_len = display_width(prefix);
        if !prefix.is_empty() {
            current.push(InlineSpan::plain(prefix));
        }
    };

    start_line(prefix_first, &mut current, &mut current_len);

    for token in tokens {
        if token.text() == "\n" {
            lines.push(std::mem::take(&mut current));
            start_line(prefix_next, &mut current, &mut current_len);
            has_word = false;
            continue;
        }

        let token_len = display_width(token.text());
        let token_is_ws = token.text().chars().all(char::is_whitespace);

        if current_len + token_len > width && has_word {
            lines.push(std::mem::take(&mut current));
            start_line(prefix_next, &mut current, &mut current_len);
            has_word = false;
        }

        // Drop leading whitespace at wrapped line starts.
        if token_is_ws && !has_word {
            continue;
        }

        current_len += token_len;
        current.push(token);
        has_word = true;
    }

    lines.push(current);
    lines
}

fn split_inline_tokens(span: &InlineSpan) -> Vec<InlineSpan> {
    let mut out = Vec::new();
    let mut buf = String::new();
    let mut ws_state: Option<bool> = None;

    for ch in span.text().chars() {
        if ch == '\n' {
            if !buf.is_empty() {
                out.push(InlineSpan::new(std::mem::take(&mut buf), span.style()));
            }
            out.push(InlineSpan::new("\n".to_string(), span.style()));
            ws_state = None;
            continue;
        }
        let is_ws = ch.is_whitespace();
        if ws_state.is_some_and(|state| state != is_ws) {
            out.push(InlineSpan::new(std::mem::take(&mut buf), span.style()));
        }
        buf.push(ch);
        ws_state = Some(is_ws);
    }

    if !buf.is_empty() {
        out.push(InlineSpan::new(buf, span.style()));
    }
    out
}

fn truncate_text(text: &str, max_width: usize) -> String {
    let mut out = String::new();
    let mut width = 0usize;
    for ch in text.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if width + ch_width > max_width {
            break;
        }
        out.push(ch);
        width += ch_width;
    }
    out
}

fn display_width(text: &str) -> usize {
    UnicodeWidthStr::width(text)
}
