use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::app::Model;

use super::style;

pub fn render_status_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let filename = model
        .file_path
        .as_ref()
        .and_then(|path| path.file_name())
        .map_or_else(
            || "untitled".to_string(),
            |s| s.to_string_lossy().to_string(),
        );
    let dirty_indicator = if model.answer_is_dirty() {
        " [modified]"
    } else {
        ""
    };
    let cursor = model.answer.cursor();
    let hints = if model.modal.is_open() {
        "Ctrl+D:insert  Esc:cancel  F1:help"
    } else {
        "Ctrl+K:formula  Ctrl+S:save  F1:help"
    };

    let status = format!(
        " {filename}{dirty_indicator}  Ln {}, Col {}  {hints}",
        cursor.line + 1,
        cursor.col + 1
    );
    let status_bar =
        Paragraph::new(status).style(Style::default().bg(Color::DarkGray).fg(Color::White));
    frame.render_widget(status_bar, area);
}

pub fn render_toast_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let Some((message, level)) = model.active_toast() else {
        return;
    };
    let (prefix, style) = style::toast_style(level);
    let toast = Paragraph::new(format!("{prefix} {message}")).style(style);
    frame.render_widget(toast, area);
}
