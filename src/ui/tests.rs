use super::*;
use crate::app::{Message, Model, update};
use crate::editor::AnswerBuffer;
use crate::history::HistoryStore;
use crate::shortcut::Platform;
use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui::buffer::Buffer;

fn create_test_terminal() -> Terminal<TestBackend> {
    let backend = TestBackend::new(80, 24);
    Terminal::new(backend).unwrap()
}

fn create_test_model(text: &str) -> Model {
    Model::new(AnswerBuffer::from_text(text), HistoryStore::in_memory(), (80, 24))
        .with_platform(Platform::Other)
}

fn buffer_text(buffer: &Buffer) -> String {
    let area = buffer.area;
    let mut out = String::new();
    for y in area.y..area.y + area.height {
        for x in area.x..area.x + area.width {
            out.push_str(buffer[(x, y)].symbol());
        }
        out.push('\n');
    }
    out
}

fn draw(model: &Model) -> String {
    let mut terminal = create_test_terminal();
    terminal.draw(|frame| render(model, frame)).unwrap();
    buffer_text(terminal.backend().buffer())
}

#[test]
fn test_render_shows_answer_and_preview() {
    let model = create_test_model("Water is $H_2O$.");
    let text = draw(&model);
    assert!(text.contains("Water is $H_2O$."));
    assert!(text.contains("Water is H₂O."));
    assert!(text.contains("Ctrl+K:formula"));
}

#[test]
fn test_render_marks_invalid_formula() {
    let model = create_test_model("bad $\\frac{1$ here");
    let text = draw(&model);
    assert!(text.contains("[Invalid Input]"));
}

#[test]
fn test_render_modal_editor_tab() {
    let model = update(create_test_model(""), Message::OpenModal);
    let text = draw(&model);
    assert!(text.contains("Chemistry Formula"));
    assert!(text.contains("Editor"));
    assert!(text.contains("History (0)"));
    assert!(text.contains("Clear"));
    assert!(text.contains("Bksp"));
    assert!(text.contains("Type a formula"));
}

#[test]
fn test_render_modal_preview_follows_session() {
    let model = update(create_test_model(""), Message::OpenModal);
    let model = update(model, Message::SetInitialLatex("SO_4^{2-}".into()));
    let text = draw(&model);
    assert!(text.contains("SO_4^{2-}"));
    assert!(text.contains("SO₄²⁻"));
}

#[test]
fn test_render_history_tab_lists_entries() {
    let mut history = HistoryStore::in_memory();
    history.add("CO_2");
    let model = Model::new(AnswerBuffer::empty(), history, (80, 24));
    let model = update(model, Message::OpenModal);
    let model = update(model, Message::ToggleTab);
    let text = draw(&model);
    assert!(text.contains("History (1)"));
    assert!(text.contains("CO₂"));
    assert!(text.contains("CO_2"));
}

#[test]
fn test_render_help_shows_history_path() {
    let mut model = create_test_model("");
    model.history_path = Some("/tmp/chemKeyboardHistory.json".into());
    let model = update(model, Message::ToggleHelp);
    let text = draw(&model);
    assert!(text.contains("Help"));
    assert!(text.contains("History: /tmp/chemKeyboardHistory.json"));
}

#[test]
fn test_render_toast() {
    let model = update(create_test_model(""), Message::PressKey(0));
    let text = draw(&model);
    assert!(text.contains("[warn]"));
}

#[test]
fn test_render_survives_tiny_terminal() {
    let model = update(create_test_model("a $x$"), Message::OpenModal);
    let mut terminal = Terminal::new(TestBackend::new(10, 4)).unwrap();
    terminal.draw(|frame| render(&model, frame)).unwrap();
}

#[test]
fn test_main_layout_reserves_status_row() {
    let layout = main_layout(Rect::new(0, 0, 80, 24));
    assert_eq!(layout.status, Rect::new(0, 23, 80, 1));
    assert_eq!(layout.toast.y, 22);
    assert_eq!(layout.answer.height + layout.preview.height, 23);
    assert_eq!(answer_visible_rows((80, 24)), layout.answer.height as usize - 2);
}

#[test]
fn test_modal_layout_fits_keyboard() {
    let layout = modal_layout(Rect::new(0, 0, 80, 24));
    assert_eq!(layout.popup.width, MODAL_WIDTH);
    assert_eq!(layout.keyboard.height, 9);
    let table = CommandTable::chemistry();
    assert_eq!(key_rects(layout.keyboard, table).len(), table.len());
}

#[test]
fn test_wide_keys_cover_their_columns() {
    let layout = modal_layout(Rect::new(0, 0, 80, 24));
    let table = CommandTable::chemistry();
    let rects = key_rects(layout.keyboard, table);
    let last_row: Vec<Rect> = rects
        .iter()
        .filter(|(_, r)| r.y == layout.keyboard.y + 8)
        .map(|(_, r)| *r)
        .collect();
    assert_eq!(last_row.len(), 4);
    let right_edge = last_row[3].x + last_row[3].width;
    let first_row_edge = rects
        .iter()
        .filter(|(_, r)| r.y == layout.keyboard.y)
        .map(|(_, r)| r.x + r.width)
        .max()
        .unwrap();
    assert_eq!(right_edge, first_row_edge);
}

#[test]
fn test_key_at_finds_key_and_misses_gaps() {
    let layout = modal_layout(Rect::new(0, 0, 80, 24));
    let table = CommandTable::chemistry();
    let (idx, rect) = key_rects(layout.keyboard, table)[1];
    assert_eq!(key_at(layout.keyboard, table, rect.x + 1, rect.y), Some(idx));
    assert_eq!(key_at(layout.keyboard, table, rect.x, rect.y + 1), None);
    assert_eq!(key_at(layout.keyboard, table, rect.x - 1, rect.y), None);
}

#[test]
fn test_tab_at_splits_row() {
    let tabs = Rect::new(10, 5, 40, 1);
    assert_eq!(tab_at(tabs, 10, 5), Some(Tab::Editor));
    assert_eq!(tab_at(tabs, 49, 5), Some(Tab::History));
    assert_eq!(tab_at(tabs, 49, 6), None);
}

#[test]
fn test_history_window_keeps_selection_visible() {
    assert_eq!(history_window(15, 0, 14), 0..14);
    assert_eq!(history_window(15, 14, 14), 1..15);
    assert_eq!(history_window(3, 2, 14), 0..3);
    assert_eq!(history_window(3, 0, 0), 0..0);
}

#[test]
fn test_history_row_at_maps_rows() {
    let area = Rect::new(0, 10, 30, 5);
    assert_eq!(history_row_at(area, 3, 0, 2, 11), Some(1));
    assert_eq!(history_row_at(area, 3, 0, 2, 14), None);
    assert_eq!(history_row_at(area, 8, 7, 2, 10), Some(3));
}
