use super::*;
use crate::app::{ConfirmPrompt, Model, OutputTab};
use crate::theme::{Theme, ThemeManager, ThemeStore};
use ratatui::Terminal;
use ratatui::backend::TestBackend;

const WIDTH: u16 = 80;
const HEIGHT: u16 = 24;

fn create_model(text: &str) -> Model {
    let themes = ThemeManager::load_theme(ThemeStore::in_memory(), None);
    let mut model = Model::new(text, (WIDTH, HEIGHT), themes);
    model.render_now().unwrap();
    model
}

fn draw(model: &Model) -> Terminal<TestBackend> {
    let mut terminal = Terminal::new(TestBackend::new(WIDTH, HEIGHT)).unwrap();
    terminal.draw(|frame| render(model, frame)).unwrap();
    terminal
}

fn screen_text(terminal: &Terminal<TestBackend>) -> String {
    terminal
        .backend()
        .buffer()
        .content()
        .iter()
        .map(ratatui::buffer::Cell::symbol)
        .collect()
}

fn row_text(terminal: &Terminal<TestBackend>, y: u16) -> String {
    let buffer = terminal.backend().buffer();
    (0..WIDTH).map(|x| buffer[(x, y)].symbol()).collect()
}

#[test]
fn test_header_shows_editor_title_and_both_tabs() {
    let model = create_model("# Hi");
    let terminal = draw(&model);
    let header = row_text(&terminal, 0);
    assert!(header.contains("Markdown"));
    assert!(header.contains(" Preview "));
    assert!(header.contains(" HTML "));
}

#[test]
fn test_editor_pane_shows_source_text() {
    let model = create_model("# Hi\n\n**bold**");
    let terminal = draw(&model);
    assert!(row_text(&terminal, 1).starts_with("# Hi"));
    assert!(row_text(&terminal, 3).starts_with("**bold**"));
}

#[test]
fn test_preview_tab_shows_rendered_text() {
    let model = create_model("# Hi\n\n**bold**");
    let terminal = draw(&model);
    let layout = model.pane_layout();
    let first = row_text(&terminal, layout.output.y);
    let output_part: String = first.chars().skip(usize::from(layout.output.x)).collect();
    assert!(output_part.contains("Hi"));
    assert!(!output_part.contains('#'));
    assert!(screen_text(&terminal).contains("bold"));
    assert!(!screen_text(&terminal).contains("<strong>"));
}

#[test]
fn test_code_tab_shows_raw_html() {
    let mut model = create_model("# Hi\n\n**bold**");
    model.tabs.activate(OutputTab::Code);
    let terminal = draw(&model);
    let text = screen_text(&terminal);
    assert!(text.contains("<h1>Hi</h1>"));
    assert!(text.contains("<strong>bold</strong>"));
}

#[test]
fn test_divider_drawn_between_panes() {
    let model = create_model("text");
    let terminal = draw(&model);
    let layout = model.pane_layout();
    let buffer = terminal.backend().buffer();
    assert_eq!(buffer[(layout.divider.x, layout.divider.y)].symbol(), "\u{2502}");
    assert_eq!(
        layout.editor.width + layout.divider.width + layout.output.width,
        WIDTH
    );
}

#[test]
fn test_status_bar_shows_theme_and_cursor() {
    let mut model = create_model("text");
    model.themes.apply_theme(Theme::Vibrant).unwrap();
    let terminal = draw(&model);
    let status = row_text(&terminal, HEIGHT - 1);
    assert!(status.contains("theme: vibrant"));
    assert!(status.contains("Ln 1, Col 1"));
    assert!(status.contains("style: default"));
}

#[test]
fn test_help_overlay_lists_actions_and_config() {
    let mut model = create_model("text");
    model.help_visible = true;
    let text = screen_text(&draw(&model));
    assert!(text.contains("Copy HTML"));
    assert!(text.contains("Reset to sample text"));
    assert!(text.contains("Local override"));
}

#[test]
fn test_confirm_overlay_shows_prompt() {
    let mut model = create_model("text");
    model.confirm = Some(ConfirmPrompt::ResetContent);
    let text = screen_text(&draw(&model));
    assert!(text.contains("Clear all content and reset?"));
    assert!(text.contains("[y] Yes"));
}

#[test]
fn test_render_survives_tiny_terminal() {
    let themes = ThemeManager::load_theme(ThemeStore::in_memory(), None);
    let mut model = Model::new("# Hi", (10, 3), themes);
    model.render_now().unwrap();
    let mut terminal = Terminal::new(TestBackend::new(10, 3)).unwrap();
    terminal.draw(|frame| render(&model, frame)).unwrap();
}

#[test]
fn test_output_content_width_leaves_padding() {
    let model = create_model("text");
    let layout = model.pane_layout();
    assert_eq!(
        output_content_width(&layout),
        layout.output.width - OUTPUT_LEFT_PADDING
    );
}
