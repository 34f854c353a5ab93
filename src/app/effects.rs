use std::fs;

use crate::app::{App, Message, Model, ToastLevel};

impl App {
    pub(super) fn handle_message_side_effects(&self, model: &mut Model, msg: &Message) {
        match msg {
            Message::CommitFormula => self.commit_formula(model),
            Message::AnswerSave => self.save_answer(model),
            _ => {}
        }
    }

    fn commit_formula(&self, model: &mut Model) {
        let _ = self;
        let span = model.editing_span.take();
        let answer = &mut model.answer;
        let mut replaced = false;
        let committed = model.modal.commit(|latex| {
            replaced = span
                .as_ref()
                .is_some_and(|span| answer.replace_formula(span, latex));
            if !replaced {
                answer.insert_formula(latex);
            }
        });

        let Some(latex) = committed else {
            model.editing_span = span;
            if model.modal.is_open() {
                model.show_toast(ToastLevel::Info, "Nothing to insert");
            }
            return;
        };
        tracing::info!(%latex, replaced, "formula committed");
        model.refresh_preview();
        model.ensure_answer_cursor_visible();

        if let Some(err) = model.modal.history().last_persist_error() {
            let message = format!("Inserted, but history was not saved: {err}");
            model.show_toast(ToastLevel::Warning, message);
        } else if replaced {
            model.show_toast(ToastLevel::Info, "Formula updated");
        } else {
            model.show_toast(ToastLevel::Info, "Formula inserted");
        }
    }

    fn save_answer(&self, model: &mut Model) {
        let _ = self;
        let Some(path) = model.file_path.clone() else {
            model.show_toast(ToastLevel::Warning, "No file to save to (start with a FILE)");
            return;
        };
        match fs::write(&path, model.answer.text()) {
            Ok(()) => {
                model.answer.mark_clean();
                model.quit_confirmed = false;
                tracing::info!(path = %path.display(), "answer saved");
                model.show_toast(ToastLevel::Info, format!("Saved {}", path.display()));
            }
            Err(err) => {
                tracing::error!(path = %path.display(), %err, "save failed");
                model.show_toast(ToastLevel::Error, format!("Save failed: {err}"));
            }
        }
    }
}
