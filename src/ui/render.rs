use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::app::Model;
use crate::markup::{SegmentKind, segment};

use super::{main_layout, overlays, status, style};

/// Render the complete UI.
pub fn render(model: &Model, frame: &mut Frame) {
    let area = frame.area();
    let layout = main_layout(area);

    render_answer(model, frame, layout.answer);
    render_preview(model, frame, layout.preview);
    status::render_status_bar(model, frame, layout.status);
    if model.active_toast().is_some() {
        status::render_toast_bar(model, frame, layout.toast);
    }

    if model.modal.is_open() {
        overlays::render_formula_modal(model, frame, area);
    }
    if model.help_visible {
        overlays::render_help_overlay(model, frame, area);
    }
}

fn render_answer(model: &Model, frame: &mut Frame, area: Rect) {
    let buf = &model.answer;
    let total_lines = buf.line_count();
    let gutter_width = line_number_width(total_lines);

    let visible_height = area.height.saturating_sub(2) as usize;
    let start = model.answer_scroll_offset;
    let end = (start + visible_height).min(total_lines);
    let cursor = buf.cursor();
    let show_cursor = !model.modal.is_open();

    let mut content: Vec<Line> = Vec::new();
    for line_idx in start..end {
        let line_text = buf.line_at(line_idx).unwrap_or_default();
        let line_num = format!("{:>width$} ", line_idx + 1, width = gutter_width as usize);
        let mut spans = vec![Span::styled(line_num, Style::default().fg(Color::DarkGray))];
        let cursor_col = (show_cursor && line_idx == cursor.line).then_some(cursor.col);
        spans.extend(answer_line_spans(&line_text, cursor_col));
        content.push(Line::from(spans));
    }

    let title = if model.editing_span.is_some() {
        "Answer (editing formula)"
    } else {
        "Answer"
    };
    let block = Block::default().title(title).borders(Borders::ALL);
    frame.render_widget(Clear, area);
    frame.render_widget(Paragraph::new(content).block(block), area);
}

/// Spans of one answer line with formula markup highlighted and the
/// cursor, when given, drawn as a reversed cell.
fn answer_line_spans(line: &str, cursor_col: Option<usize>) -> Vec<Span<'static>> {
    let mut pieces: Vec<(usize, usize, Style)> = Vec::new();
    let mut start = 0;
    for seg in segment(line) {
        let end = start + seg.to_markup().len();
        let piece_style = if seg.is_math() {
            style::formula_markup_style()
        } else {
            Style::default()
        };
        pieces.push((start, end, piece_style));
        start = end;
    }

    let mut spans = Vec::with_capacity(pieces.len() + 2);
    for (from, to, piece_style) in pieces {
        match cursor_col.filter(|&col| from <= col && col < to) {
            Some(col) => {
                let cursor_end = line[col..]
                    .chars()
                    .next()
                    .map_or(col, |ch| col + ch.len_utf8());
                if col > from {
                    spans.push(Span::styled(line[from..col].to_string(), piece_style));
                }
                spans.push(Span::styled(
                    line[col..cursor_end].to_string(),
                    style::cursor_style(),
                ));
                if cursor_end < to {
                    spans.push(Span::styled(line[cursor_end..to].to_string(), piece_style));
                }
            }
            None => spans.push(Span::styled(line[from..to].to_string(), piece_style)),
        }
    }
    if cursor_col.is_some_and(|col| col >= line.len()) {
        spans.push(Span::styled(" ", style::cursor_style()));
    }
    spans
}

fn render_preview(model: &Model, frame: &mut Frame, area: Rect) {
    let mut lines: Vec<Line> = Vec::new();
    let mut current: Vec<Span> = Vec::new();

    for item in &model.preview {
        let item_style = style::style_for_segment(item.kind, item.failed);
        if item.kind == SegmentKind::Block {
            if !current.is_empty() {
                lines.push(Line::from(std::mem::take(&mut current)));
            }
            lines.push(Line::styled(item.text.clone(), item_style).centered());
            continue;
        }
        let mut parts = item.text.split('\n');
        if let Some(first) = parts.next()
            && !first.is_empty()
        {
            current.push(Span::styled(first.to_string(), item_style));
        }
        for part in parts {
            lines.push(Line::from(std::mem::take(&mut current)));
            if !part.is_empty() {
                current.push(Span::styled(part.to_string(), item_style));
            }
        }
    }
    if !current.is_empty() {
        lines.push(Line::from(current));
    }

    let block = Block::default().title("Preview").borders(Borders::ALL);
    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false }),
        area,
    );
}

/// Calculate the width needed for line numbers.
pub const fn line_number_width(total_lines: usize) -> u16 {
    if total_lines < 10 {
        1
    } else if total_lines < 100 {
        2
    } else if total_lines < 1_000 {
        3
    } else if total_lines < 10_000 {
        4
    } else {
        5
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_of(spans: &[Span<'_>]) -> String {
        spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_answer_line_spans_keep_text() {
        let spans = answer_line_spans("water is $H_2O$.", None);
        assert_eq!(text_of(&spans), "water is $H_2O$.");
        assert_eq!(spans[1].style, style::formula_markup_style());
    }

    #[test]
    fn test_cursor_inside_formula_splits_span() {
        let spans = answer_line_spans("a $x$", Some(3));
        assert_eq!(text_of(&spans), "a $x$");
        assert!(spans.iter().any(|s| s.content == "x" && s.style == style::cursor_style()));
    }

    #[test]
    fn test_cursor_at_end_adds_cell() {
        let spans = answer_line_spans("ab", Some(2));
        assert_eq!(text_of(&spans), "ab ");
    }

    #[test]
    fn test_line_number_width() {
        assert_eq!(line_number_width(9), 1);
        assert_eq!(line_number_width(10), 2);
        assert_eq!(line_number_width(12_000), 5);
    }
}
