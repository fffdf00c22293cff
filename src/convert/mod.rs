//! Markdown to HTML conversion.
//!
//! This module handles:
//! - Rendering markdown to an HTML string with comrak (GFM, hard line breaks)
//! - Wrapping HTML in the preview-style container
//! - Building the standalone documents written by the download actions
//! - Laying out markdown as styled terminal lines for the preview tab

mod preview;
mod types;

use comrak::{Arena, Options, format_html, parse_document};
use thiserror::Error;

pub use preview::layout_preview;
pub use types::{InlineColor, InlineSpan, InlineStyle, LineType, RenderedLine};

/// File name used by the download action.
pub const DOWNLOAD_FILE_NAME: &str = "converted.html";

/// File name used by the styled export action.
pub const STYLED_EXPORT_FILE_NAME: &str = "converted-styled.html";

/// Built-in sample document shown at startup and restored by reset.
pub const SAMPLE_MARKDOWN: &str = r#"# Welcome to the Markdown to HTML Converter

This is a **beautiful** and *functional* tool for converting Markdown to HTML.

## Features
- Real-time conversion
- Multiple themes
- Live preview
- Syntax highlighting
- Export options

### Code Example

```javascript
function convertMarkdown(text) {
  return marked.parse(text);
}
```

> This converter makes working with Markdown a joy!

[Learn more about Markdown](https://daringfireball.net/projects/markdown/)

1. Type your Markdown
2. See instant preview
3. Copy or download HTML

---

**Happy converting!**
"#;

const DOWNLOAD_STYLESHEET: &str = "    body { font-family: Inter, sans-serif; max-width: 700px; margin: 2.5em auto; background: #fff; }
    h1,h2,h3,h4,h5,h6 { font-family: inherit; }
    pre, code { font-family: JetBrains Mono, Fira Mono, monospace; background: #f6f6ff; color: #24195d; }
    blockquote { color: #6e2cb3; border-left: 3px solid #a7b3d8; padding-left: 1em; margin: 0.7em 0; }
    img { max-width: 98%; }";

/// Errors produced while turning markdown into HTML.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("failed to format HTML: {0}")]
    Format(#[from] std::io::Error),
    #[error("formatter produced invalid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Converts markdown text into an HTML fragment.
///
/// Implementations must be pure: the same input always yields the same output.
pub trait MarkdownParser {
    /// Render `text` to HTML.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTML could not be produced.
    fn parse_to_html(&self, text: &str) -> Result<String, ConvertError>;
}

/// The default parser, backed by comrak.
#[derive(Debug, Default, Clone, Copy)]
pub struct ComrakParser;

impl MarkdownParser for ComrakParser {
    fn parse_to_html(&self, text: &str) -> Result<String, ConvertError> {
        let arena = Arena::new();
        let mut options = Options::default();
        apply_conversion_options(&mut options);
        let root = parse_document(&arena, text, &options);

        let mut out = Vec::with_capacity(text.len() * 2);
        format_html(root, &options, &mut out)?;
        Ok(String::from_utf8(out)?)
    }
}

/// Configure comrak the way the converter renders: GitHub-flavored
/// extensions on, soft breaks rendered as `<br />`, raw HTML passed through.
pub(crate) fn apply_conversion_options(options: &mut Options) {
    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;
    options.extension.tasklist = true;
    options.render.hardbreaks = true;
    options.render.unsafe_ = true;
}

/// Wrap rendered HTML in the preview container tagged with a style class.
///
/// ```
/// let wrapped = mdconvert::convert::wrap_preview("<p>x</p>\n", "article");
/// assert!(wrapped.starts_with("<div class=\"md-preview-style article\">\n"));
/// assert!(wrapped.ends_with("\n</div>"));
/// ```
pub fn wrap_preview(html: &str, style_class: &str) -> String {
    format!("<div class=\"md-preview-style {style_class}\">\n{html}\n</div>")
}

/// Embed rendered HTML in the standalone document written by the download action.
pub fn standalone_document(html: &str) -> String {
    document_with_styles(html, DOWNLOAD_STYLESHEET)
}

/// Like [`standalone_document`], but also carrying the injected preview-style
/// rules so the exported page matches the preview.
pub fn styled_document(wrapped_html: &str, preview_css: &str) -> String {
    let css = preview_css.trim_matches('\n');
    if css.trim().is_empty() {
        return document_with_styles(wrapped_html, DOWNLOAD_STYLESHEET);
    }
    document_with_styles(wrapped_html, &format!("{DOWNLOAD_STYLESHEET}\n{css}"))
}

fn document_with_styles(body: &str, styles: &str) -> String {
    format!(
        "
<!DOCTYPE html>
<html lang=\"en\">
<head>
  <meta charset=\"UTF-8\" />
  <title>Converted Markdown</title>
  <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\" />
  <style>
{styles}
  </style>
</head>
<body>
{body}
</body>
</html>
"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn html(text: &str) -> String {
        ComrakParser.parse_to_html(text).unwrap()
    }

    #[test]
    fn test_heading_and_bold_render() {
        let out = html("# Hi\n\n**bold**");
        assert!(out.contains("<h1>Hi</h1>"), "got: {out}");
        assert!(out.contains("<strong>bold</strong>"), "got: {out}");
    }

    #[test]
    fn test_soft_break_becomes_hard_break() {
        let out = html("first\nsecond");
        assert!(out.contains("first<br />"), "got: {out}");
        assert!(out.contains("second"));
    }

    #[test]
    fn test_gfm_strikethrough_and_table() {
        let out = html("~~gone~~\n\n| a | b |\n|---|---|\n| 1 | 2 |\n");
        assert!(out.contains("<del>gone</del>"), "got: {out}");
        assert!(out.contains("<table>"), "got: {out}");
    }

    #[test]
    fn test_gfm_autolink_and_tasklist() {
        let out = html("see https://example.com\n\n- [x] done\n- [ ] todo\n");
        assert!(
            out.contains("<a href=\"https://example.com\">"),
            "got: {out}"
        );
        assert!(out.contains("type=\"checkbox\""), "got: {out}");
    }

    #[test]
    fn test_raw_html_passes_through() {
        let out = html("<span class=\"x\">hi</span>\n");
        assert!(out.contains("<span class=\"x\">hi</span>"), "got: {out}");
    }

    #[test]
    fn test_render_is_deterministic() {
        assert_eq!(html(SAMPLE_MARKDOWN), html(SAMPLE_MARKDOWN));
    }

    #[test]
    fn test_empty_text_renders_empty_html() {
        assert_eq!(html(""), "");
    }

    #[test]
    fn test_wrap_preview_exact_shape() {
        assert_eq!(
            wrap_preview("<p>x</p>", "default"),
            "<div class=\"md-preview-style default\">\n<p>x</p>\n</div>"
        );
    }

    #[test]
    fn test_standalone_document_embeds_html_in_template() {
        let doc = standalone_document("<h1>Hi</h1>\n");
        assert!(doc.starts_with("\n<!DOCTYPE html>\n<html lang=\"en\">"));
        assert!(doc.contains("<title>Converted Markdown</title>"));
        assert!(doc.contains("<meta charset=\"UTF-8\" />"));
        assert!(doc.contains("max-width: 700px"));
        assert!(doc.contains("<body>\n<h1>Hi</h1>\n\n</body>"));
        assert!(doc.ends_with("</html>\n"));
    }

    #[test]
    fn test_styled_document_appends_preview_rules() {
        let doc = styled_document("<div>x</div>", "\n.md-preview-style.article { color: red; }\n");
        assert!(doc.contains("img { max-width: 98%; }\n.md-preview-style.article"));
        assert!(doc.contains("<div>x</div>"));
    }

    #[test]
    fn test_styled_document_without_rules_matches_plain_template() {
        assert_eq!(styled_document("<p>a</p>", ""), standalone_document("<p>a</p>"));
    }

    #[test]
    fn test_sample_markdown_renders_expected_structure() {
        let out = html(SAMPLE_MARKDOWN);
        assert!(out.contains("<h1>Welcome to the Markdown to HTML Converter</h1>"));
        assert!(out.contains("<blockquote>"));
        assert!(out.contains("<hr />"));
        assert!(out.contains("<ol>"));
        assert!(out.contains("language-javascript"));
    }
}
