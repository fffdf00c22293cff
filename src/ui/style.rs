//! Colors for the three application themes and the preview styles.
//!
//! A [`Palette`] is picked from the active [`Theme`]. The preview tab layers
//! a [`PreviewAccent`] on top of it, carrying the colors of the active
//! preview style's rule block so the terminal preview tracks the HTML one.

use ratatui::style::{Color, Modifier, Style};

use crate::convert::{InlineColor, InlineStyle, LineType};
use crate::theme::{PreviewStyle, Theme};

/// Colors for one application theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: Color,
    pub foreground: Color,
    /// Secondary text: hints, rules, code frames
    pub muted: Color,
    pub h1: Color,
    pub h2: Color,
    pub h3: Color,
    pub code_bg: Color,
    pub inline_code: Color,
    pub quote: Color,
    pub link: Color,
    pub list_marker: Color,
    pub border: Color,
    pub image: Color,
    pub status_bg: Color,
    pub status_fg: Color,
    /// Selected tab and the divider while dragging
    pub accent: Color,
}

impl Palette {
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Light => Self {
                background: rgb(0xff, 0xff, 0xff),
                foreground: rgb(0x24, 0x29, 0x2e),
                muted: rgb(0x6a, 0x73, 0x7d),
                h1: rgb(0x05, 0x50, 0xae),
                h2: rgb(0x11, 0x63, 0x29),
                h3: rgb(0x95, 0x38, 0x00),
                code_bg: rgb(0xf6, 0xf8, 0xfa),
                inline_code: rgb(0xcf, 0x22, 0x2e),
                quote: rgb(0x57, 0x60, 0x6a),
                link: rgb(0x09, 0x69, 0xda),
                list_marker: rgb(0x95, 0x38, 0x00),
                border: rgb(0xd0, 0xd7, 0xde),
                image: rgb(0x82, 0x50, 0xdf),
                status_bg: rgb(0xea, 0xee, 0xf2),
                status_fg: rgb(0x24, 0x29, 0x2e),
                accent: rgb(0x09, 0x69, 0xda),
            },
            Theme::Dark => Self {
                background: rgb(0x21, 0x21, 0x21),
                foreground: rgb(0xee, 0xff, 0xff),
                muted: rgb(0x6a, 0x6a, 0x6a),
                h1: rgb(0x82, 0xaa, 0xff),
                h2: rgb(0xc3, 0xe8, 0x8d),
                h3: rgb(0xff, 0xcb, 0x6b),
                code_bg: rgb(0x2b, 0x2b, 0x2b),
                inline_code: rgb(0xf0, 0x71, 0x78),
                quote: rgb(0xb2, 0xcc, 0xd6),
                link: rgb(0x89, 0xdd, 0xff),
                list_marker: rgb(0xff, 0xcb, 0x6b),
                border: rgb(0x42, 0x42, 0x42),
                image: rgb(0xc7, 0x92, 0xea),
                status_bg: rgb(0x1a, 0x1a, 0x1a),
                status_fg: rgb(0xb0, 0xbe, 0xc5),
                accent: rgb(0x82, 0xaa, 0xff),
            },
            Theme::Vibrant => Self {
                background: rgb(0x1b, 0x10, 0x33),
                foreground: rgb(0xf8, 0xf8, 0xf2),
                muted: rgb(0x8a, 0x7f, 0xb0),
                h1: rgb(0xff, 0x79, 0xc6),
                h2: rgb(0x50, 0xfa, 0x7b),
                h3: rgb(0xf1, 0xfa, 0x8c),
                code_bg: rgb(0x2a, 0x1b, 0x4d),
                inline_code: rgb(0xff, 0xb8, 0x6c),
                quote: rgb(0xbd, 0x93, 0xf9),
                link: rgb(0x8b, 0xe9, 0xfd),
                list_marker: rgb(0xff, 0x79, 0xc6),
                border: rgb(0x5a, 0x4b, 0x8a),
                image: rgb(0xff, 0x79, 0xc6),
                status_bg: rgb(0xff, 0x79, 0xc6),
                status_fg: rgb(0x1b, 0x10, 0x33),
                accent: rgb(0xff, 0x79, 0xc6),
            },
        }
    }

    /// Plain pane text on the pane background.
    pub fn base(&self) -> Style {
        Style::default().fg(self.foreground).bg(self.background)
    }
}

/// Editor colors for the theme's editor scheme.
pub fn editor_style(theme: Theme) -> Style {
    match theme.editor_scheme() {
        "material-darker" => Style::default()
            .fg(rgb(0xee, 0xff, 0xff))
            .bg(rgb(0x21, 0x21, 0x21)),
        _ => Style::default()
            .fg(rgb(0x00, 0x00, 0x00))
            .bg(rgb(0xff, 0xff, 0xff)),
    }
}

/// Preview colors taken from a preview style's rule block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PreviewAccent {
    pub background: Option<Color>,
    pub foreground: Option<Color>,
    /// `h1` and `h2`
    pub heading: Option<Color>,
    pub quote: Option<Color>,
    pub link: Option<Color>,
    pub code: Option<Color>,
}

impl PreviewAccent {
    pub fn for_style(style: PreviewStyle) -> Self {
        match style {
            PreviewStyle::Default => Self::default(),
            PreviewStyle::Article => Self {
                background: Some(rgb(0xff, 0xf8, 0xf2)),
                foreground: Some(rgb(0x24, 0x29, 0x2e)),
                heading: Some(rgb(0xee, 0x85, 0x41)),
                quote: Some(rgb(0xe0, 0x51, 0x88)),
                ..Self::default()
            },
            PreviewStyle::Technical => Self {
                background: Some(rgb(0x16, 0x18, 0x29)),
                foreground: Some(rgb(0xc2, 0xd7, 0xff)),
                link: Some(rgb(0x5a, 0xd6, 0xff)),
                code: Some(rgb(0xfc, 0xf6, 0xff)),
                ..Self::default()
            },
            PreviewStyle::Elegant => Self {
                background: Some(rgb(0xfa, 0xf8, 0xf6)),
                foreground: Some(rgb(0x3c, 0x2d, 0x28)),
                heading: Some(rgb(0xaa, 0x6f, 0x37)),
                quote: Some(rgb(0xb5, 0x89, 0x00)),
                ..Self::default()
            },
        }
    }
}

/// Base style of the preview pane.
pub fn preview_base(palette: &Palette, accent: &PreviewAccent) -> Style {
    Style::default()
        .fg(accent.foreground.unwrap_or(palette.foreground))
        .bg(accent.background.unwrap_or(palette.background))
}

/// Style for a whole preview line, on top of [`preview_base`].
pub fn style_for_line_type(
    line_type: &LineType,
    palette: &Palette,
    accent: &PreviewAccent,
) -> Style {
    let base = preview_base(palette, accent);
    match line_type {
        LineType::Heading(1) => base
            .fg(accent.heading.unwrap_or(palette.h1))
            .add_modifier(Modifier::BOLD),
        LineType::Heading(2) => base
            .fg(accent.heading.unwrap_or(palette.h2))
            .add_modifier(Modifier::BOLD),
        LineType::Heading(_) => base.fg(palette.h3).add_modifier(Modifier::BOLD),
        LineType::CodeBlock => base.fg(accent.code.unwrap_or(palette.muted)),
        LineType::BlockQuote => base
            .fg(accent.quote.unwrap_or(palette.quote))
            .add_modifier(Modifier::ITALIC),
        LineType::HorizontalRule => base.fg(palette.muted),
        LineType::Html => base.fg(palette.muted).add_modifier(Modifier::ITALIC),
        LineType::Image => base.fg(palette.image).add_modifier(Modifier::ITALIC),
        LineType::ListItem(_) | LineType::Table | LineType::Paragraph | LineType::Empty => base,
    }
}

/// Style for an inline span, merged with its line style.
pub fn style_for_inline(
    line: Style,
    inline: InlineStyle,
    palette: &Palette,
    accent: &PreviewAccent,
) -> Style {
    let mut style = line;

    if inline.emphasis {
        style = style.add_modifier(Modifier::ITALIC);
    }
    if inline.strong {
        style = style.add_modifier(Modifier::BOLD);
    }
    if inline.strikethrough {
        style = style.add_modifier(Modifier::CROSSED_OUT);
    }
    if inline.link {
        style = style
            .fg(accent.link.unwrap_or(palette.link))
            .add_modifier(Modifier::UNDERLINED);
    }
    if inline.code {
        style = style
            .fg(accent.code.unwrap_or(palette.inline_code))
            .bg(palette.code_bg);
    }
    if let Some(fg) = inline.fg {
        style = style.fg(terminal_color(fg));
    }

    style
}

/// Map a highlighter color to what the terminal can show.
pub fn terminal_color(color: InlineColor) -> Color {
    rgb(color.r, color.g, color.b)
}

fn rgb(r: u8, g: u8, b: u8) -> Color {
    if supports_truecolor() {
        Color::Rgb(r, g, b)
    } else {
        Color::Indexed(rgb_to_xterm_256(r, g, b))
    }
}

fn supports_truecolor() -> bool {
    if let Ok(force) = std::env::var("MDCONVERT_TRUECOLOR") {
        let value = force.to_ascii_lowercase();
        return matches!(value.as_str(), "1" | "true" | "yes" | "on");
    }
    supports_truecolor_from_env(
        std::env::var("COLORTERM").ok().as_deref(),
        std::env::var("TERM").ok().as_deref(),
    )
}

fn supports_truecolor_from_env(colorterm: Option<&str>, term: Option<&str>) -> bool {
    if let Some(ct) = colorterm {
        let lower = ct.to_ascii_lowercase();
        if lower.contains("truecolor") || lower.contains("24bit") {
            return true;
        }
    }
    if let Some(t) = term {
        let lower = t.to_ascii_lowercase();
        if lower.contains("direct") || lower.contains("truecolor") {
            return true;
        }
    }
    false
}

fn rgb_to_xterm_256(r: u8, g: u8, b: u8) -> u8 {
    // Result is always 0-5, fits in u8
    #[allow(clippy::cast_possible_truncation)]
    let to_cube = |v: u8| ((u16::from(v) * 5) / 255) as u8;
    16 + (36 * to_cube(r)) + (6 * to_cube(g)) + to_cube(b)
}
