use super::*;
use crate::app::{Mode, Model};
use crate::document::{BlockKind, Editor, HostEditor, InlineItem, PartialBlock, Schema};
use crate::workspace::{CLEAR_PROMPT, Workspace, WorkspaceOptions};
use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui::buffer::Buffer;
use ratatui::style::Color;

fn create_test_terminal() -> Terminal<TestBackend> {
    let backend = TestBackend::new(80, 24);
    Terminal::new(backend).unwrap()
}

fn seed_model() -> Model {
    Model::new(Workspace::with_seed(WorkspaceOptions::default()).unwrap(), None)
}

fn model_with(blocks: Vec<PartialBlock>) -> Model {
    let editor = Editor::with_blocks(Schema::with_inline_button(), blocks).unwrap();
    Model::new(Workspace::new(editor, WorkspaceOptions::default()), None)
}

fn screen_text(buffer: &Buffer) -> String {
    let mut out = String::new();
    for row in 0..buffer.area.height {
        for col in 0..buffer.area.width {
            out.push_str(buffer[(col, row)].symbol());
        }
        out.push('\n');
    }
    out
}

fn draw(model: &Model) -> Terminal<TestBackend> {
    let mut terminal = create_test_terminal();
    terminal.draw(|frame| render(model, frame)).unwrap();
    terminal
}

#[test]
fn test_render_shows_name_and_status() {
    let model = seed_model();
    let terminal = draw(&model);
    let text = screen_text(terminal.backend().buffer());
    assert!(text.contains("Name: Untitled Document"));
    assert!(text.contains("unsaved"));
    assert!(text.contains("blocks"));
}

#[test]
fn test_buttons_render_white_on_blue() {
    let model = model_with(vec![
        PartialBlock::new(BlockKind::Paragraph)
            .with_items(vec![InlineItem::text("Go "), InlineItem::button("Hector")]),
    ]);
    let terminal = draw(&model);
    let buffer = terminal.backend().buffer();
    let text = screen_text(buffer);
    assert!(text.contains("Go  Hector "));

    let row = 1;
    let hector_cells: Vec<_> = (0..buffer.area.width)
        .map(|col| &buffer[(col, row)])
        .filter(|cell| cell.bg == Color::Blue)
        .collect();
    assert_eq!(hector_cells.len(), " Hector ".len());
    assert!(hector_cells.iter().all(|cell| cell.fg == Color::White));
}

#[test]
fn test_block_line_marks_list_items() {
    let schema = Schema::with_inline_button();
    let editor = Editor::with_blocks(
        schema.clone(),
        vec![
            PartialBlock::new(BlockKind::BulletListItem).with_text("one"),
            PartialBlock::new(BlockKind::NumberedListItem).with_text("first"),
            PartialBlock::new(BlockKind::NumberedListItem).with_text("second"),
            PartialBlock::new(BlockKind::Heading)
                .with_prop("level", 2)
                .with_text("Title"),
        ],
    )
    .unwrap();
    let (lines, _) = document_lines(editor.top_level_blocks(), &schema, None);
    let rendered: Vec<String> = lines.iter().map(ToString::to_string).collect();
    assert_eq!(rendered, vec!["\u{2022} one", "1. first", "2. second", "## Title"]);
}

#[test]
fn test_cursor_line_is_reported() {
    let schema = Schema::with_inline_button();
    let editor = Editor::with_blocks(
        schema.clone(),
        vec![
            PartialBlock::new(BlockKind::Paragraph).with_text("a"),
            PartialBlock::new(BlockKind::Paragraph).with_text("b"),
        ],
    )
    .unwrap();
    let (lines, cursor_line) =
        document_lines(editor.top_level_blocks(), &schema, editor.cursor());
    assert_eq!(cursor_line, Some(1));
    assert_eq!(lines[1].to_string(), "b ");
}

#[test]
fn test_image_block_renders_url() {
    let schema = Schema::with_inline_button();
    let editor = Editor::with_blocks(
        schema.clone(),
        vec![PartialBlock::new(BlockKind::Image).with_prop("url", "https://example.com/a.png")],
    )
    .unwrap();
    let line = block_line(&editor.top_level_blocks()[0], &schema, None, 0);
    assert_eq!(line.to_string(), "[image] https://example.com/a.png");
}

#[test]
fn test_empty_document_shows_hint() {
    let model = model_with(Vec::new());
    let text = screen_text(draw(&model).backend().buffer());
    assert!(text.contains("Empty document"));
}

#[test]
fn test_confirm_overlay_shows_clear_prompt() {
    let mut model = seed_model();
    model.mode = Mode::ConfirmClear;
    let text = screen_text(draw(&model).backend().buffer());
    assert!(text.contains(CLEAR_PROMPT));
}

#[test]
fn test_prompt_overlay_shows_input() {
    let mut model = seed_model();
    model.mode = Mode::RenamingDocument;
    model.input = "Weekly notes".to_string();
    let text = screen_text(draw(&model).backend().buffer());
    assert!(text.contains("Document name"));
    assert!(text.contains("Weekly notes"));
}
