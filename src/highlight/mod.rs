//! Syntax highlighting for the HTML code view.
//!
//! Uses syntect with the bundled Sublime Text syntax definitions. The
//! syntect color theme follows the active app [`Theme`].

use std::sync::OnceLock;

use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme as SyntectTheme, ThemeSet};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;
use thiserror::Error;

use crate::convert::{InlineColor, InlineSpan, InlineStyle};
use crate::pipeline::CodeTarget;
use crate::theme::Theme;

/// Highlighted output: one span list per source line.
pub type HighlightedLines = Vec<Vec<InlineSpan>>;

#[derive(Debug, Error)]
pub enum HighlightError {
    #[error("syntax highlighting failed: {0}")]
    Syntect(#[from] syntect::Error),
}

/// Decorates the code view with highlighting spans in place.
pub trait Highlighter {
    /// Highlight `target`'s source for `theme`.
    ///
    /// # Errors
    ///
    /// Returns an error if the highlighter fails on the source text.
    fn highlight(&self, target: &mut CodeTarget, theme: Theme) -> Result<(), HighlightError>;
}

/// Default highlighter, treating the code view as HTML.
#[derive(Debug, Default, Clone, Copy)]
pub struct SyntectHighlighter;

impl Highlighter for SyntectHighlighter {
    fn highlight(&self, target: &mut CodeTarget, theme: Theme) -> Result<(), HighlightError> {
        let _scope = crate::perf::scope("highlight.code_view");
        let lines = highlight_code(Some("html"), target.source(), theme)?;
        target.set_highlighted(lines);
        Ok(())
    }
}

/// Highlight `code` as `language` with the syntect theme matching `theme`.
///
/// Unknown or missing languages produce plain code-styled spans.
///
/// # Errors
///
/// Returns an error if syntect fails to parse a line.
pub fn highlight_code(
    language: Option<&str>,
    code: &str,
    theme: Theme,
) -> Result<HighlightedLines, HighlightError> {
    let syntax_set = syntax_set();
    let syntax = language
        .and_then(|lang| syntax_set.find_syntax_by_token(lang))
        .or_else(|| language.and_then(|lang| syntax_set.find_syntax_by_name(lang)));

    let Some(syntax) = syntax else {
        return Ok(plain_lines(code));
    };

    let mut highlighter = HighlightLines::new(syntax, syntect_theme(theme));
    let mut lines = Vec::new();
    for line in LinesWithEndings::from(code) {
        let ranges = highlighter.highlight_line(line, syntax_set)?;
        let mut spans = Vec::new();
        for (style, text) in ranges {
            let text = text.trim_end_matches(['\n', '\r']);
            if text.is_empty() {
                continue;
            }
            let mut inline_style = InlineStyle::default();
            inline_style.code = true;
            let fg = InlineColor::new(style.foreground.r, style.foreground.g, style.foreground.b);
            inline_style.fg = Some(adjust_fg_for_background(fg, theme));
            spans.push(InlineSpan::new(text.to_string(), inline_style));
        }
        lines.push(spans);
    }
    Ok(lines)
}

/// Unhighlighted code lines, used before the first highlight pass.
pub fn plain_lines(code: &str) -> HighlightedLines {
    let mut style = InlineStyle::default();
    style.code = true;
    code.lines()
        .map(|line| vec![InlineSpan::new(line.to_string(), style)])
        .collect()
}

fn syntax_set() -> &'static SyntaxSet {
    static SYNTAX_SET: OnceLock<SyntaxSet> = OnceLock::new();
    SYNTAX_SET.get_or_init(|| {
        let _scope = crate::perf::scope("highlight.syntax_set.load_defaults");
        SyntaxSet::load_defaults_newlines()
    })
}

fn theme_set() -> &'static ThemeSet {
    static THEME_SET: OnceLock<ThemeSet> = OnceLock::new();
    THEME_SET.get_or_init(|| {
        let _scope = crate::perf::scope("highlight.theme_set.load_defaults");
        ThemeSet::load_defaults()
    })
}

fn syntect_theme(theme: Theme) -> &'static SyntectTheme {
    static FALLBACK: OnceLock<SyntectTheme> = OnceLock::new();
    let preferred = match theme {
        Theme::Light => ["InspiredGitHub", "Solarized (light)", "base16-ocean.light"].as_slice(),
        Theme::Dark => ["base16-ocean.dark", "Solarized (dark)", "base16-mocha.dark"].as_slice(),
        Theme::Vibrant => ["base16-eighties.dark", "base16-mocha.dark", "base16-ocean.dark"].as_slice(),
    };

    let themes = &theme_set().themes;
    preferred
        .iter()
        .find_map(|name| themes.get(*name))
        .or_else(|| themes.values().next())
        .unwrap_or_else(|| FALLBACK.get_or_init(SyntectTheme::default))
}

fn adjust_fg_for_background(color: InlineColor, theme: Theme) -> InlineColor {
    if !theme.is_light() {
        return color;
    }
    let luma = 0.0722f32.mul_add(
        f32::from(color.b),
        0.2126f32.mul_add(f32::from(color.r), 0.7152 * f32::from(color.g)),
    );
    if luma < 155.0 {
        return color;
    }
    InlineColor::new(darken(color.r), darken(color.g), darken(color.b))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn darken(channel: u8) -> u8 {
    (f32::from(channel) * 0.42).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn luma(color: InlineColor) -> f32 {
        (0.2126 * f32::from(color.r)) + (0.7152 * f32::from(color.g)) + (0.0722 * f32::from(color.b))
    }

    #[test]
    fn test_highlight_html_produces_colored_spans() {
        let code = "<h1>Hi</h1>\n<p><strong>bold</strong></p>\n";
        let lines = highlight_code(Some("html"), code, Theme::Dark).unwrap();

        assert_eq!(lines.len(), 2);
        let has_color = lines
            .iter()
            .flatten()
            .any(|span| span.style().fg.is_some());
        assert!(has_color, "Expected at least one colored span for HTML");
    }

    #[test]
    fn test_highlight_keeps_line_text() {
        let code = "<p>a</p>\n<p>b</p>\n";
        let lines = highlight_code(Some("html"), code, Theme::Light).unwrap();
        let texts: Vec<String> = lines
            .iter()
            .map(|spans| spans.iter().map(InlineSpan::text).collect())
            .collect();
        assert_eq!(texts, vec!["<p>a</p>", "<p>b</p>"]);
    }

    #[test]
    fn test_highlight_unknown_language_falls_back_to_plain() {
        let lines = highlight_code(Some("nope"), "just text", Theme::Dark).unwrap();

        assert_eq!(lines.len(), 1);
        let has_color = lines
            .iter()
            .flatten()
            .any(|span| span.style().fg.is_some());
        assert!(!has_color, "Unknown language should not colorize");
    }

    #[test]
    fn test_plain_lines_set_code_style() {
        let lines = plain_lines("plain");
        assert!(lines[0].iter().all(|span| span.style().code));
    }

    #[test]
    fn test_each_theme_resolves_its_preferred_syntect_theme() {
        let themes = &theme_set().themes;
        for (theme, name) in [
            (Theme::Light, "InspiredGitHub"),
            (Theme::Dark, "base16-ocean.dark"),
            (Theme::Vibrant, "base16-eighties.dark"),
        ] {
            let expected = themes.get(name).expect("bundled theme");
            assert!(std::ptr::eq(syntect_theme(theme), expected), "{name}");
        }
    }

    #[test]
    fn test_highlighter_fills_code_target() {
        let mut target = CodeTarget::default();
        target.replace("<p>x</p>\n");
        SyntectHighlighter
            .highlight(&mut target, Theme::Vibrant)
            .unwrap();
        assert!(target.is_highlighted());
        assert_eq!(target.lines().len(), 1);
    }

    #[test]
    fn test_light_theme_darkens_bright_fg() {
        let bright = InlineColor::new(240, 230, 120);
        let adjusted = adjust_fg_for_background(bright, Theme::Light);
        assert!(adjusted.r < bright.r);
        assert!(adjusted.g < bright.g);
        assert!(adjusted.b < bright.b);
        assert!(luma(adjusted) < 120.0, "Adjusted color still too bright");
    }

    #[test]
    fn test_dark_themes_keep_fg() {
        let bright = InlineColor::new(240, 230, 120);
        assert_eq!(adjust_fg_for_background(bright, Theme::Dark), bright);
        assert_eq!(adjust_fg_for_background(bright, Theme::Vibrant), bright);
    }
}
