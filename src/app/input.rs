use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::Frame;
use ratatui::layout::Rect;

use crate::app::model::ModalFocus;
use crate::app::{App, Message, Model};
use crate::editor::Direction;
use crate::modal::Tab;
use crate::shortcut::{KeyPress, KeyTarget};

use super::event_loop::ResizeDebouncer;

impl App {
    pub(super) fn handle_event(
        &self,
        event: &Event,
        model: &Model,
        now_ms: u64,
        resize_debouncer: &mut ResizeDebouncer,
    ) -> Option<Message> {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(*key, model),
            Event::Mouse(mouse) => self.handle_mouse(*mouse, model),
            Event::Resize(w, h) => {
                tracing::trace!(width = w, height = h, "resize queued");
                resize_debouncer.queue(*w, *h, now_ms);
                None
            }
            _ => None,
        }
    }

    pub(super) fn handle_key(&self, key: KeyEvent, model: &Model) -> Option<Message> {
        let _ = self;
        if model.help_visible {
            return Some(Message::HideHelp);
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('c' | 'q') if ctrl => return Some(Message::Quit),
            KeyCode::F(1) => return Some(Message::ToggleHelp),
            _ => {}
        }

        if model.modal.is_open() {
            return modal_key(key, model);
        }

        match key.code {
            KeyCode::Char('k') if ctrl => Some(Message::OpenModal),
            KeyCode::Char('s') if ctrl => Some(Message::AnswerSave),
            KeyCode::Left => Some(Message::AnswerMoveCursor(Direction::Left)),
            KeyCode::Right => Some(Message::AnswerMoveCursor(Direction::Right)),
            KeyCode::Up => Some(Message::AnswerMoveCursor(Direction::Up)),
            KeyCode::Down => Some(Message::AnswerMoveCursor(Direction::Down)),
            KeyCode::Home => Some(Message::AnswerMoveHome),
            KeyCode::End => Some(Message::AnswerMoveEnd),
            KeyCode::Backspace => Some(Message::AnswerDeleteBack),
            KeyCode::Delete => Some(Message::AnswerDeleteForward),
            KeyCode::Enter => Some(Message::AnswerSplitLine),
            KeyCode::Tab => Some(Message::AnswerInsertChar('\t')),
            KeyCode::Char(c)
                if !ctrl && !key.modifiers.contains(KeyModifiers::ALT) =>
            {
                Some(Message::AnswerInsertChar(c))
            }
            _ => None,
        }
    }

    pub(super) fn handle_mouse(&self, mouse: MouseEvent, model: &Model) -> Option<Message> {
        let _ = self;
        if model.help_visible {
            return matches!(mouse.kind, MouseEventKind::Up(MouseButton::Left))
                .then_some(Message::HideHelp);
        }
        if !model.modal.is_open() || !matches!(mouse.kind, MouseEventKind::Up(MouseButton::Left)) {
            return None;
        }

        let (width, height) = model.terminal_size;
        let layout = crate::ui::modal_layout(Rect::new(0, 0, width, height));
        let (column, row) = (mouse.column, mouse.row);
        if !crate::ui::point_in_rect(column, row, layout.popup) {
            return Some(Message::CloseModal);
        }
        if let Some(tab) = crate::ui::tab_at(layout.tabs, column, row) {
            return Some(Message::SelectTab(tab));
        }
        match model.modal.tab() {
            Tab::Editor => {
                crate::ui::key_at(layout.keyboard, model.commands(), column, row)
                    .map(Message::PressKey)
            }
            Tab::History => crate::ui::history_row_at(
                layout.history,
                model.modal.history().len(),
                model.history_selected,
                column,
                row,
            )
            .map(Message::RecallHistory),
        }
    }

    pub(super) fn view(&self, model: &Model, frame: &mut Frame) {
        let _ = self;
        crate::ui::render(model, frame);
    }
}

/// Keys while the formula modal is open.
///
/// Anything not claimed here goes through the modal's listeners, which see
/// Escape and the symbol shortcuts.
fn modal_key(key: KeyEvent, model: &Model) -> Option<Message> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('d') if ctrl => return Some(Message::CommitFormula),
        // Some terminals report Ctrl+H as Backspace, F2 always works
        KeyCode::Char('h') if ctrl => return Some(Message::ToggleTab),
        KeyCode::F(2) => return Some(Message::ToggleTab),
        _ => {}
    }

    match model.modal.tab() {
        Tab::History => match key.code {
            KeyCode::Up => Some(Message::HistoryUp),
            KeyCode::Down => Some(Message::HistoryDown),
            KeyCode::Enter => Some(Message::RecallHistory(model.history_selected)),
            _ => Some(Message::ModalKey(KeyPress::from_event(key, KeyTarget::Elsewhere))),
        },
        Tab::Editor => {
            if matches!(key.code, KeyCode::Tab | KeyCode::BackTab) {
                return Some(Message::CycleFocus);
            }
            match model.modal_focus {
                ModalFocus::Keyboard => match key.code {
                    KeyCode::Left => Some(Message::KeyboardMove(Direction::Left)),
                    KeyCode::Right => Some(Message::KeyboardMove(Direction::Right)),
                    KeyCode::Up => Some(Message::KeyboardMove(Direction::Up)),
                    KeyCode::Down => Some(Message::KeyboardMove(Direction::Down)),
                    KeyCode::Enter | KeyCode::Char(' ') => {
                        Some(Message::PressKey(model.keyboard_selected))
                    }
                    _ => Some(Message::ModalKey(KeyPress::from_event(
                        key,
                        KeyTarget::Elsewhere,
                    ))),
                },
                ModalFocus::Field => Some(Message::ModalKey(KeyPress::from_event(
                    key,
                    KeyTarget::Surface,
                ))),
            }
        }
    }
}
