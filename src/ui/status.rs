use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::app::Model;

pub fn render_name_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let line = Line::from(vec![
        Span::styled(" Name: ", Style::default().fg(Color::Indexed(245))),
        Span::styled(
            model.workspace.document_name().to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::styled("  (F2 to rename)", Style::default().fg(Color::Indexed(245))),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

pub fn render_status_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let filename = model.file_path.as_ref().and_then(|p| p.file_name()).map_or_else(
        || "unsaved".to_string(),
        |s| s.to_string_lossy().to_string(),
    );
    let blocks = model.block_count();
    let dirty_indicator = if model.dirty { " [modified]" } else { "" };
    let watch_indicator = if model.watch_enabled {
        " [watching]"
    } else {
        ""
    };
    let scan_indicator = if model.workspace.scan_pending() {
        " [...]"
    } else {
        ""
    };

    let status = format!(
        " {filename}  {blocks} blocks{dirty_indicator}{watch_indicator}{scan_indicator}  Ctrl-S:save  F1:help"
    );

    let status_bar =
        Paragraph::new(status).style(Style::default().bg(Color::DarkGray).fg(Color::White));

    frame.render_widget(status_bar, area);
}

pub fn render_toast_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let Some((message, level)) = model.active_toast() else {
        return;
    };
    let (prefix, style) = match level {
        crate::app::ToastLevel::Info => (
            "[info]",
            Style::default().bg(Color::DarkGray).fg(Color::White),
        ),
        crate::app::ToastLevel::Warning => (
            "[warn]",
            Style::default().bg(Color::Yellow).fg(Color::Black),
        ),
        crate::app::ToastLevel::Error => {
            ("[error]", Style::default().bg(Color::Red).fg(Color::White))
        }
    };
    let toast = Paragraph::new(format!("{prefix} {message}")).style(style);
    frame.render_widget(toast, area);
}
