use mdconvert::convert::{
    ComrakParser, DOWNLOAD_FILE_NAME, MarkdownParser, STYLED_EXPORT_FILE_NAME,
    standalone_document, styled_document, wrap_preview,
};
use mdconvert::export::write_export;
use mdconvert::theme::PreviewStyle;

#[test]
fn test_download_writes_template_around_html() {
    let dir = tempfile::tempdir().unwrap();
    let html = ComrakParser.parse_to_html("# Hi\n\n**bold**").unwrap();
    let path = write_export(dir.path(), DOWNLOAD_FILE_NAME, &standalone_document(&html)).unwrap();

    assert_eq!(path, dir.path().join("converted.html"));
    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.starts_with("\n<!DOCTYPE html>\n<html lang=\"en\">\n<head>"));
    assert!(written.contains("<title>Converted Markdown</title>"));
    assert!(written.ends_with("</body>\n</html>\n"));
    assert!(written.contains(&html));
}

#[test]
fn test_download_overwrites_and_leaves_no_temp_files() {
    let dir = tempfile::tempdir().unwrap();
    write_export(dir.path(), DOWNLOAD_FILE_NAME, "old").unwrap();
    write_export(dir.path(), DOWNLOAD_FILE_NAME, "new").unwrap();

    let entries = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name())
        .collect::<Vec<_>>();
    assert_eq!(entries, vec![std::ffi::OsString::from(DOWNLOAD_FILE_NAME)]);
    assert_eq!(
        std::fs::read_to_string(dir.path().join(DOWNLOAD_FILE_NAME)).unwrap(),
        "new"
    );
}

#[test]
fn test_download_into_missing_dir_fails() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope");
    assert!(write_export(&missing, DOWNLOAD_FILE_NAME, "x").is_err());
    assert!(!missing.exists());
}

#[test]
fn test_styled_export_includes_style_rules() {
    let dir = tempfile::tempdir().unwrap();
    let html = ComrakParser.parse_to_html("> quoted").unwrap();
    let wrapped = wrap_preview(&html, PreviewStyle::Technical.name());
    let doc = styled_document(&wrapped, PreviewStyle::Technical.css());
    let path = write_export(dir.path(), STYLED_EXPORT_FILE_NAME, &doc).unwrap();

    let written = std::fs::read_to_string(path).unwrap();
    assert!(written.contains(".md-preview-style.technical"));
    assert!(written.contains("<div class=\"md-preview-style technical\">"));
}

#[test]
fn test_default_style_export_matches_plain_template_styles() {
    let wrapped = wrap_preview("<p>x</p>\n", PreviewStyle::Default.name());
    let doc = styled_document(&wrapped, PreviewStyle::Default.css());
    assert_eq!(doc, standalone_document(&wrapped));
}
