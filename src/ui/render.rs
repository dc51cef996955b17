use ratatui::prelude::*;
use ratatui::widgets::{Clear, Padding, Paragraph};

use crate::app::{Mode, Model};
use crate::document::{Block, BlockKind, Cursor, HostEditor, InlineItem, Schema};

use super::{DOCUMENT_LEFT_PADDING, overlays, status};

fn button_style() -> Style {
    Style::default().bg(Color::Blue).fg(Color::White)
}

fn cursor_style() -> Style {
    Style::default().bg(Color::White).fg(Color::Black)
}

/// Render the complete UI.
pub fn render(model: &Model, frame: &mut Frame) {
    let area = frame.area();
    let toast_active = model.active_toast().is_some();
    let footer_rows = 1 + u16::from(toast_active);

    let name_area = Rect { height: 1, ..area };
    let doc_area = Rect {
        y: area.y + 1,
        height: area.height.saturating_sub(1 + footer_rows),
        ..area
    };
    let toast_area = Rect {
        y: area.y + area.height.saturating_sub(footer_rows),
        height: 1,
        ..area
    };
    let status_area = Rect {
        y: area.y + area.height.saturating_sub(1),
        height: 1,
        ..area
    };

    status::render_name_bar(model, frame, name_area);
    render_document(model, frame, doc_area);
    if toast_active {
        status::render_toast_bar(model, frame, toast_area);
    }
    status::render_status_bar(model, frame, status_area);

    if model.help_visible {
        overlays::render_help_overlay(model, frame, area);
    } else if model.mode == Mode::ConfirmClear {
        overlays::render_confirm_overlay(frame, area);
    } else if model.mode.is_prompt() {
        overlays::render_prompt_overlay(model, frame, area);
    }
}

fn render_document(model: &Model, frame: &mut Frame, area: Rect) {
    let editor = model.editor();
    let show_cursor = model.mode == Mode::Editing && !model.help_visible;
    let cursor = editor.cursor().filter(|_| show_cursor);
    let (lines, cursor_line) = document_lines(editor.top_level_blocks(), editor.schema(), cursor);

    let visible = area.height as usize;
    let scroll = cursor_line.map_or(0, |line| (line + 1).saturating_sub(visible));

    let doc = Paragraph::new(lines)
        .block(
            ratatui::widgets::Block::default().padding(Padding::left(DOCUMENT_LEFT_PADDING)),
        )
        .scroll((u16::try_from(scroll).unwrap_or(u16::MAX), 0));
    frame.render_widget(Clear, area);
    frame.render_widget(doc, area);
}

/// One line per block, children indented under their parent. Returns the
/// lines and the index of the line holding the cursor.
pub fn document_lines(
    blocks: &[Block],
    schema: &Schema,
    cursor: Option<&Cursor>,
) -> (Vec<Line<'static>>, Option<usize>) {
    let mut lines = Vec::new();
    let mut cursor_line = None;
    push_blocks(blocks, schema, cursor, 0, &mut lines, &mut cursor_line);
    if lines.is_empty() {
        lines.push(Line::styled(
            "Empty document. Start typing.",
            Style::default().fg(Color::DarkGray),
        ));
    }
    (lines, cursor_line)
}

fn push_blocks(
    blocks: &[Block],
    schema: &Schema,
    cursor: Option<&Cursor>,
    depth: usize,
    lines: &mut Vec<Line<'static>>,
    cursor_line: &mut Option<usize>,
) {
    let mut number = 0;
    for block in blocks {
        number = if block.kind == BlockKind::NumberedListItem {
            number + 1
        } else {
            0
        };
        let offset = cursor.filter(|c| c.block == block.id).map(|c| c.offset);
        if offset.is_some() {
            *cursor_line = Some(lines.len());
        }
        let mut line = block_line(block, schema, offset, number);
        line.spans.insert(0, Span::raw("  ".repeat(depth)));
        lines.push(line);
        push_blocks(&block.children, schema, cursor, depth + 1, lines, cursor_line);
    }
}

/// Render one block. `cursor` is the inline offset to draw the cursor at;
/// `number` is the position within a run of numbered list items.
pub fn block_line(
    block: &Block,
    schema: &Schema,
    cursor: Option<usize>,
    number: usize,
) -> Line<'static> {
    let (marker, base) = block_marker(block, number);
    let mut spans = Vec::new();
    if !marker.is_empty() {
        spans.push(Span::styled(marker, base.add_modifier(Modifier::DIM)));
    }

    let Some(items) = &block.content else {
        let url = block.props.get("url").and_then(|v| v.as_str()).unwrap_or("");
        spans.push(Span::styled(
            format!("[image] {url}"),
            Style::default().fg(Color::DarkGray),
        ));
        return Line::from(spans);
    };

    let mut position = 0;
    let mut cursor_drawn = false;
    for item in items {
        let width = item.width();
        let at = cursor
            .filter(|&c| !cursor_drawn && c >= position && c < position + width)
            .map(|c| c - position);
        match item {
            InlineItem::Text { text, .. } => match at {
                Some(at) => {
                    let split = text.char_indices().nth(at).map_or(text.len(), |(i, _)| i);
                    let (before, rest) = text.split_at(split);
                    let mut rest = rest.chars();
                    let under = rest.next().map_or_else(|| " ".to_string(), String::from);
                    if !before.is_empty() {
                        spans.push(Span::styled(before.to_string(), base));
                    }
                    spans.push(Span::styled(under, cursor_style()));
                    let after: String = rest.collect();
                    if !after.is_empty() {
                        spans.push(Span::styled(after, base));
                    }
                    cursor_drawn = true;
                }
                None => spans.push(Span::styled(text.clone(), base)),
            },
            InlineItem::InlineButton { props } => {
                let style = if at.is_some() {
                    cursor_drawn = true;
                    button_style().add_modifier(Modifier::REVERSED)
                } else {
                    button_style()
                };
                spans.push(Span::styled(format!(" {} ", schema.render_widget(props)), style));
            }
        }
        position += width;
    }
    if cursor.is_some() && !cursor_drawn {
        spans.push(Span::styled(" ", cursor_style()));
    }
    Line::from(spans)
}

fn block_marker(block: &Block, number: usize) -> (String, Style) {
    let plain = Style::default();
    match block.kind {
        BlockKind::Heading => {
            let level = block
                .props
                .get("level")
                .and_then(serde_json::Value::as_u64)
                .unwrap_or(1)
                .clamp(1, 6);
            let hashes = "#".repeat(usize::try_from(level).unwrap_or(1));
            (
                format!("{hashes} "),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
        }
        BlockKind::BulletListItem => ("\u{2022} ".to_string(), plain),
        BlockKind::NumberedListItem => (format!("{number}. "), plain),
        BlockKind::CheckListItem => {
            let checked = block
                .props
                .get("checked")
                .and_then(serde_json::Value::as_bool)
                .unwrap_or(false);
            (if checked { "[x] " } else { "[ ] " }.to_string(), plain)
        }
        BlockKind::Quote => ("\u{2502} ".to_string(), Style::default().fg(Color::Cyan)),
        BlockKind::CodeBlock => (String::new(), Style::default().fg(Color::Green)),
        BlockKind::Paragraph | BlockKind::Image => (String::new(), plain),
    }
}
