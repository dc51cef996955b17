use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Padding, Paragraph};

use crate::app::Model;
use crate::workspace::CLEAR_PROMPT;

fn popup_block(title: &str) -> Block<'_> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .padding(Padding::horizontal(1))
        .style(Style::default().bg(Color::Black).fg(Color::White))
}

pub fn render_prompt_overlay(model: &Model, frame: &mut Frame, area: Rect) {
    let popup_width = area.width.saturating_sub(12).clamp(30, 72);
    let popup = centered_popup_rect(popup_width, 5, area);
    let dim_style = Style::default().fg(Color::Indexed(245));

    let lines = vec![
        Line::from(vec![
            Span::raw(model.input.clone()),
            Span::styled(" ", Style::default().bg(Color::White)),
        ]),
        Line::styled("Enter accepts \u{2502} Esc cancels", dim_style),
    ];

    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(lines).block(popup_block(model.mode.prompt_title())),
        popup,
    );
}

pub fn render_confirm_overlay(frame: &mut Frame, area: Rect) {
    let width = u16::try_from(CLEAR_PROMPT.len() + 4).unwrap_or(u16::MAX);
    let popup = centered_popup_rect(width, 5, area);
    let lines = vec![
        Line::raw(CLEAR_PROMPT),
        Line::styled(
            "y: clear \u{2502} n/Esc: keep",
            Style::default().fg(Color::Indexed(245)),
        ),
    ];
    frame.render_widget(Clear, popup);
    frame.render_widget(Paragraph::new(lines).block(popup_block("Clear")), popup);
}

pub fn render_help_overlay(model: &Model, frame: &mut Frame, area: Rect) {
    let popup_width = area.width.saturating_sub(12).max(48);
    let popup_height = area.height.saturating_sub(4).max(12);
    let popup = centered_popup_rect(popup_width, popup_height, area);

    let global_cfg = model
        .config_global_path
        .as_ref()
        .map_or_else(|| "<unknown>".to_string(), |p| p.display().to_string());
    let local_cfg = model
        .config_local_path
        .as_ref()
        .map_or_else(|| "<none>".to_string(), |p| p.display().to_string());

    let section_style = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);
    let dim_style = Style::default().fg(Color::Indexed(245));

    let lines = vec![
        Line::styled("Editing", section_style),
        Line::raw("  [label] + Space     Turn the label into a button"),
        Line::raw("  Enter               New paragraph"),
        Line::raw("  Arrows, Home, End   Move the cursor"),
        Line::raw("  Ctrl-B              Insert a button"),
        Line::raw(""),
        Line::styled("Document", section_style),
        Line::raw("  Ctrl-S              Save as <name>.json"),
        Line::raw("  Ctrl-O              Open a document"),
        Line::raw("  Ctrl-L              Clear all content"),
        Line::raw("  F2                  Rename"),
        Line::raw("  Ctrl-W              Toggle file watching"),
        Line::raw("  Ctrl-Q              Quit"),
        Line::raw(""),
        Line::styled("Config", section_style),
        Line::styled(format!("  global: {global_cfg}"), dim_style),
        Line::styled(format!("  local:  {local_cfg}"), dim_style),
        Line::raw(""),
        Line::styled("Esc closes", dim_style),
    ];

    let block = Block::default()
        .title("Help")
        .borders(Borders::ALL)
        .padding(Padding::uniform(1))
        .style(Style::default().bg(Color::Black).fg(Color::White));
    frame.render_widget(Clear, popup);
    frame.render_widget(Paragraph::new(lines).block(block), popup);
}

fn centered_popup_rect(width: u16, height: u16, area: Rect) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(w) / 2);
    let y = area.y + (area.height.saturating_sub(h) / 2);
    Rect::new(x, y, w, h)
}
