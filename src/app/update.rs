use crossterm::event::{KeyCode, KeyModifiers};

use crate::app::Model;
use crate::app::model::{ModalFocus, ToastLevel};
use crate::editor::Direction;
use crate::modal::{KeyOutcome, Tab};
use crate::session::ApplyOutcome;
use crate::shortcut::{KeyPress, KeyTarget, Resolution, ShortcutResolver};

/// All possible events and actions in the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    // Answer area
    /// Insert a character at the answer cursor
    AnswerInsertChar(char),
    /// Backspace in the answer
    AnswerDeleteBack,
    /// Delete in the answer
    AnswerDeleteForward,
    /// Enter in the answer
    AnswerSplitLine,
    AnswerMoveCursor(Direction),
    AnswerMoveHome,
    AnswerMoveEnd,
    /// Write the answer back to its file
    AnswerSave,

    // Formula modal
    /// Open the modal, seeded from the formula under the answer cursor
    OpenModal,
    /// Discard the formula and close (click outside the modal)
    CloseModal,
    /// The host's initial value changed while the modal is open.
    ///
    /// The terminal host seeds the modal through [`Message::OpenModal`] and
    /// never sends this. It is the entry point for embedders whose value can
    /// change underneath an open modal.
    SetInitialLatex(String),
    /// A key press routed through the modal's listeners
    ModalKey(KeyPress),
    /// Switch between the editor and history tabs
    ToggleTab,
    SelectTab(Tab),
    /// Move focus between the formula field and the on-screen keyboard
    CycleFocus,
    /// Move the on-screen keyboard highlight
    KeyboardMove(Direction),
    /// Click the on-screen key with this command index
    PressKey(usize),
    HistoryUp,
    HistoryDown,
    /// Load the history entry at this index into the editor
    RecallHistory(usize),
    /// Insert the formula into the answer and close the modal
    CommitFormula,

    // Other
    ToggleHelp,
    HideHelp,
    /// Terminal resized
    Resize(u16, u16),
    Quit,
}

/// Pure function that updates the model based on a message.
///
/// File and history writes happen in `App::handle_message_side_effects`.
pub fn update(mut model: Model, msg: Message) -> Model {
    if !matches!(msg, Message::Quit | Message::AnswerSave) {
        model.quit_confirmed = false;
    }

    match msg {
        Message::AnswerInsertChar(ch) => {
            model.answer.insert_char(ch);
            answer_edited(&mut model);
        }
        Message::AnswerDeleteBack => {
            if model.answer.delete_back() {
                answer_edited(&mut model);
            }
        }
        Message::AnswerDeleteForward => {
            if model.answer.delete_forward() {
                answer_edited(&mut model);
            }
        }
        Message::AnswerSplitLine => {
            model.answer.split_line();
            answer_edited(&mut model);
        }
        Message::AnswerMoveCursor(dir) => {
            model.answer.move_cursor(dir);
            model.ensure_answer_cursor_visible();
        }
        Message::AnswerMoveHome => model.answer.move_home(),
        Message::AnswerMoveEnd => model.answer.move_end(),

        Message::OpenModal => {
            model.editing_span = model.answer.formula_at_cursor();
            model.initial_latex = model
                .editing_span
                .as_ref()
                .map(|span| span.latex.clone())
                .unwrap_or_default();
            let surface = model.surface_handle();
            model
                .modal
                .open(&model.initial_latex, &surface, &model.listeners);
            model.modal_focus = ModalFocus::Field;
            model.history_selected = 0;
            model.help_visible = false;
        }
        Message::CloseModal => close_modal(&mut model),
        Message::SetInitialLatex(latex) => {
            model.modal.set_initial(&latex);
            model.initial_latex = latex;
        }
        Message::ModalKey(press) => {
            let resolver = ShortcutResolver::new(model.commands(), model.platform);
            let shortcut_key = match resolver.resolve(&press) {
                Resolution::Consume(command) => model.commands().position(command),
                Resolution::PassThrough => None,
            };
            match model.modal.handle_key(&press, &resolver, &model.listeners) {
                KeyOutcome::Closed => close_modal(&mut model),
                KeyOutcome::Applied(outcome) => {
                    if let Some(idx) = shortcut_key {
                        model.keyboard_selected = idx;
                    }
                    report_apply(&mut model, &outcome, "shortcut");
                }
                KeyOutcome::PassThrough => field_key(&mut model, press),
            }
        }
        Message::ToggleTab => {
            let tab = model.modal.tab().toggled();
            select_tab(&mut model, tab);
        }
        Message::SelectTab(tab) => select_tab(&mut model, tab),
        Message::CycleFocus => {
            model.modal_focus = match model.modal_focus {
                ModalFocus::Field => ModalFocus::Keyboard,
                ModalFocus::Keyboard => ModalFocus::Field,
            };
            let mut surface = model.surface.borrow_mut();
            if model.modal_focus == ModalFocus::Field {
                crate::surface::MathSurface::focus(&mut *surface);
            } else {
                surface.blur();
            }
        }
        Message::KeyboardMove(dir) => model.move_keyboard_selection(dir),
        Message::PressKey(idx) => {
            if let Some(command) = model.commands().get(idx) {
                model.keyboard_selected = idx;
                let outcome = model.modal.apply(command);
                report_apply(&mut model, &outcome, &command.label);
            }
        }
        Message::HistoryUp => {
            model.history_selected = model.history_selected.saturating_sub(1);
        }
        Message::HistoryDown => {
            let last = model.modal.history().len().saturating_sub(1);
            model.history_selected = (model.history_selected + 1).min(last);
        }
        Message::RecallHistory(idx) => {
            if model.modal.recall(idx) {
                model.history_selected = idx;
                model.modal_focus = ModalFocus::Field;
            }
        }
        // Handled in side effects
        Message::CommitFormula | Message::AnswerSave => {}

        Message::ToggleHelp => model.help_visible = !model.help_visible,
        Message::HideHelp => model.help_visible = false,
        Message::Resize(width, height) => {
            model.terminal_size = (width, height);
            model.ensure_answer_cursor_visible();
        }
        Message::Quit => {
            if model.answer_is_dirty() && model.file_path.is_some() && !model.quit_confirmed {
                model.show_toast(
                    ToastLevel::Warning,
                    "Unsaved changes! Press Ctrl+Q again to quit, or Ctrl+S to save",
                );
                model.quit_confirmed = true;
            } else {
                model.should_quit = true;
            }
        }
    }
    model
}

fn answer_edited(model: &mut Model) {
    model.refresh_preview();
    model.ensure_answer_cursor_visible();
}

fn close_modal(model: &mut Model) {
    model.modal.close();
    model.editing_span = None;
    model.modal_focus = ModalFocus::Field;
}

fn select_tab(model: &mut Model, tab: Tab) {
    model.modal.select_tab(tab);
    let last = model.modal.history().len().saturating_sub(1);
    model.history_selected = model.history_selected.min(last);
}

/// Surface a failed command as a toast; the session itself stays usable.
fn report_apply(model: &mut Model, outcome: &ApplyOutcome, label: &str) {
    match outcome {
        ApplyOutcome::Applied => {}
        ApplyOutcome::Failed(err) => {
            model.show_toast(ToastLevel::Error, format!("Could not apply {label}: {err}"));
        }
        ApplyOutcome::Unmounted => {
            model.show_toast(ToastLevel::Warning, "Formula editor is not open");
        }
    }
}

/// Default handling of keys aimed at the formula field.
fn field_key(model: &mut Model, press: KeyPress) {
    if press.target != KeyTarget::Surface
        || press
            .modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
    {
        return;
    }
    let keystroke = match press.code {
        KeyCode::Char(ch) => {
            let text = ch.to_string();
            let outcome = model.modal.edit(|surface| {
                if matches!(ch, '^' | '_') {
                    surface.insert_command(&text)
                } else {
                    surface.type_text(&text)
                }
            });
            report_apply(model, &outcome, &format!("'{ch}'"));
            return;
        }
        KeyCode::Left => "Left",
        KeyCode::Right => "Right",
        KeyCode::Home => "Home",
        KeyCode::End => "End",
        KeyCode::Backspace => "Backspace",
        KeyCode::Delete => "Delete",
        _ => return,
    };
    let outcome = model.modal.edit(|surface| surface.keystroke(keystroke));
    report_apply(model, &outcome, keystroke);
}
