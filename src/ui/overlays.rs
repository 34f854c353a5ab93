use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Padding, Paragraph};
use unicode_width::UnicodeWidthStr;

use crate::app::{ModalFocus, Model};
use crate::markup::SegmentKind;
use crate::modal::Tab;
use crate::preview::{MathRenderer, MathStyle, UnicodeRenderer};

use super::{ModalLayout, centered_popup_rect, history_window, key_rects, modal_layout, style};

pub fn render_formula_modal(model: &Model, frame: &mut Frame, area: Rect) {
    let layout = modal_layout(area);
    let block = Block::default()
        .title(" Chemistry Formula ")
        .borders(Borders::ALL)
        .style(Style::default().bg(Color::Black).fg(Color::White));
    frame.render_widget(Clear, layout.popup);
    frame.render_widget(block, layout.popup);

    render_tabs(model, frame, &layout);
    match model.modal.tab() {
        Tab::Editor => {
            render_field(model, frame, layout.field);
            render_formula_preview(model, frame, layout.preview);
            render_keyboard(model, frame, layout.keyboard);
        }
        Tab::History => render_history(model, frame, layout.history),
    }
    render_modal_footer(model, frame, layout.footer);
}

fn render_tabs(model: &Model, frame: &mut Frame, layout: &ModalLayout) {
    let active = model.modal.tab();
    let half = layout.tabs.width / 2;
    let editor = Rect {
        width: half,
        ..layout.tabs
    };
    let history = Rect {
        x: layout.tabs.x + half,
        width: layout.tabs.width - half,
        ..layout.tabs
    };
    let count = model.modal.history().len();
    frame.render_widget(
        Paragraph::new("Editor")
            .style(style::tab_style(active == Tab::Editor))
            .centered(),
        editor,
    );
    frame.render_widget(
        Paragraph::new(format!("History ({count})"))
            .style(style::tab_style(active == Tab::History))
            .centered(),
        history,
    );
}

fn render_field(model: &Model, frame: &mut Frame, area: Rect) {
    let field = model.surface.borrow();
    let focused = model.modal_focus == ModalFocus::Field;
    let border_style = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        style::dim_style()
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style);
    let inner_width = block.inner(area).width as usize;

    let content = field.content();
    let cursor = field.cursor().min(content.len());
    let before = visible_tail(&content[..cursor], inner_width.saturating_sub(1));
    let (at, after) = match content[cursor..].chars().next() {
        Some(ch) => content[cursor..].split_at(ch.len_utf8()),
        None => (" ", ""),
    };

    let mut spans = vec![Span::raw(before.to_string())];
    if focused {
        spans.push(Span::styled(at.to_string(), style::cursor_style()));
    } else {
        spans.push(Span::raw(at.to_string()));
    }
    spans.push(Span::raw(after.to_string()));
    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

/// The longest suffix of `text` that fits in `width` columns.
fn visible_tail(text: &str, width: usize) -> &str {
    if text.width() <= width {
        return text;
    }
    let mut start = text.len();
    for (idx, _) in text.char_indices().rev() {
        if text[idx..].width() > width {
            break;
        }
        start = idx;
    }
    &text[start..]
}

fn render_formula_preview(model: &Model, frame: &mut Frame, area: Rect) {
    let latex = model.modal.session().latex();
    let line = if latex.trim().is_empty() {
        Line::styled("Type a formula or use the keys below", style::dim_style())
    } else {
        match UnicodeRenderer::new().render(latex, MathStyle::Inline) {
            Ok(rendered) => {
                Line::styled(rendered, style::style_for_segment(SegmentKind::Inline, false))
            }
            Err(err) => Line::styled(
                format!("[Invalid Input] {err}"),
                style::style_for_segment(SegmentKind::Inline, true),
            ),
        }
    };
    frame.render_widget(Paragraph::new(line).centered(), area);
}

fn render_keyboard(model: &Model, frame: &mut Frame, area: Rect) {
    let commands = model.commands().all_commands();
    let keyboard_focused = model.modal_focus == ModalFocus::Keyboard;
    for (idx, rect) in key_rects(area, model.commands()) {
        let command = &commands[idx];
        let key_style = style::key_style(idx == model.keyboard_selected, keyboard_focused);
        let label_width = rect.width.saturating_sub(1);
        let mut spans = vec![Span::styled(
            format!("{:^width$}", command.label, width = label_width as usize),
            key_style,
        )];
        let badge = command
            .shortcut_hint()
            .map_or_else(|| " ".to_string(), |key| key.to_string());
        spans.push(Span::styled(badge, style::badge_style(key_style)));
        frame.render_widget(Paragraph::new(Line::from(spans)), rect);
    }
}

fn render_history(model: &Model, frame: &mut Frame, area: Rect) {
    let history = model.modal.history();
    if history.is_empty() {
        frame.render_widget(
            Paragraph::new(Line::styled("No formulas yet", style::dim_style())),
            area,
        );
        return;
    }
    let renderer = UnicodeRenderer::new();
    let window = history_window(history.len(), model.history_selected, area.height);
    let lines: Vec<Line> = window
        .map(|idx| {
            let entry = history.get(idx).unwrap_or_default();
            let rendered = renderer
                .render(entry, MathStyle::Inline)
                .unwrap_or_else(|_| entry.to_string());
            let marker = if idx == model.history_selected { ">" } else { " " };
            let line_style = if idx == model.history_selected {
                Style::default().add_modifier(Modifier::REVERSED)
            } else {
                Style::default()
            };
            Line::from(vec![
                Span::styled(format!("{marker} {rendered}"), line_style),
                Span::styled(format!("  {entry}"), style::dim_style()),
            ])
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_modal_footer(model: &Model, frame: &mut Frame, area: Rect) {
    let insert_style = if model.modal.session().can_commit() {
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
    } else {
        style::disabled_style()
    };
    let tooltip = (model.modal.tab() == Tab::Editor && model.modal_focus == ModalFocus::Keyboard)
        .then(|| model.commands().get(model.keyboard_selected))
        .flatten()
        .and_then(|command| command.tooltip(model.platform));
    let line = match tooltip {
        Some(tip) => Line::styled(tip, style::dim_style()),
        None => Line::from(vec![
            Span::styled("Ctrl+D insert", insert_style),
            Span::styled("  Esc cancel  Tab keys  F2 history", style::dim_style()),
        ]),
    };
    frame.render_widget(Paragraph::new(line), area);
}

pub fn render_help_overlay(model: &Model, frame: &mut Frame, area: Rect) {
    let popup_width = area.width.saturating_sub(12).max(48);
    let popup_height = area.height.saturating_sub(2).max(12);
    let popup = centered_popup_rect(popup_width, popup_height, area);

    let show_path = |path: Option<&std::path::PathBuf>, missing: &str| {
        path.map_or_else(|| missing.to_string(), |p| p.display().to_string())
    };
    let global_cfg = show_path(model.config_global_path.as_ref(), "<unknown>");
    let local_cfg = show_path(model.config_local_path.as_ref(), "<none>");
    let history_file = show_path(model.history_path.as_ref(), "<memory only>");
    let alt = model.platform.alt_label();

    let section_style = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);

    let mut lines: Vec<Line> = Vec::new();
    lines.push(Line::styled("Answer", section_style));
    lines.push(Line::raw("  Arrows, Home/End    Move cursor"));
    lines.push(Line::raw("  Ctrl+K              Formula editor (edits formula under cursor)"));
    lines.push(Line::raw("  Ctrl+S              Save"));
    lines.push(Line::raw("  Ctrl+Q / Ctrl+C     Quit"));
    lines.push(Line::raw(""));
    lines.push(Line::styled("Formula editor", section_style));
    lines.push(Line::raw("  Ctrl+D              Insert formula"));
    lines.push(Line::raw("  Esc                 Cancel"));
    lines.push(Line::raw("  Ctrl+H / F2         Editor / history tab"));
    lines.push(Line::raw("  Tab                 Field / on-screen keys"));
    lines.push(Line::raw("  Enter, Space, click Press key or recall entry"));
    lines.push(Line::raw(format!("  {alt}+Shift+=  +      {alt}+Shift+6  superscript")));
    lines.push(Line::raw(format!("  {alt}+Shift+-  sub    {alt}+Shift+.  →")));
    lines.push(Line::raw(format!("  {alt}+Shift+,  ⇌")));
    lines.push(Line::raw(""));
    lines.push(Line::styled("Config", section_style));
    lines.push(Line::raw(format!("  Global: {global_cfg}")));
    lines.push(Line::raw(format!("  Local override: {local_cfg}")));
    lines.push(Line::raw(format!("  History: {history_file}")));

    let block = Block::default()
        .title("Help")
        .borders(Borders::ALL)
        .padding(Padding::horizontal(1))
        .style(Style::default().bg(Color::Black).fg(Color::White));

    frame.render_widget(Clear, popup);
    frame.render_widget(Paragraph::new(lines).block(block), popup);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visible_tail_keeps_short_text() {
        assert_eq!(visible_tail("H_2O", 10), "H_2O");
    }

    #[test]
    fn test_visible_tail_drops_front() {
        assert_eq!(visible_tail("\\rightarrow", 5), "arrow");
        assert_eq!(visible_tail("abc", 0), "");
    }
}
