use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::{Duration, Instant};

use crate::commands::{CommandTable, keyboard_rows};
use crate::editor::{AnswerBuffer, Direction, FormulaSpan};
use crate::history::HistoryStore;
use crate::markup::segment;
use crate::modal::FormulaModal;
use crate::preview::{PreviewItem, UnicodeRenderer, render_segments};
use crate::session::SurfaceHandle;
use crate::shortcut::{KeyListeners, Platform};
use crate::surface::MathField;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
struct Toast {
    level: ToastLevel,
    message: String,
    expires_at: Instant,
}

/// Which part of the editor tab receives keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModalFocus {
    #[default]
    Field,
    Keyboard,
}

/// The complete application state.
pub struct Model {
    /// The answer text formulas are inserted into
    pub answer: AnswerBuffer,
    /// First answer line shown
    pub answer_scroll_offset: usize,
    /// File the answer was loaded from and is saved to
    pub file_path: Option<PathBuf>,
    /// Rendered answer, refreshed after every edit
    pub preview: Vec<PreviewItem>,
    pub modal: FormulaModal,
    /// Editing surface shared with the modal's session
    pub surface: Rc<RefCell<MathField>>,
    pub listeners: KeyListeners,
    /// Platform used for shortcut labels
    pub platform: Platform,
    /// Value the modal opens with
    pub initial_latex: String,
    /// Answer formula being edited, replaced on commit
    pub editing_span: Option<FormulaSpan>,
    pub modal_focus: ModalFocus,
    /// Command index of the highlighted on-screen key
    pub keyboard_selected: usize,
    pub history_selected: usize,
    pub help_visible: bool,
    /// Global config path shown in help
    pub config_global_path: Option<PathBuf>,
    /// Local override path shown in help
    pub config_local_path: Option<PathBuf>,
    /// History file shown in help, `None` for memory-only history
    pub history_path: Option<PathBuf>,
    pub terminal_size: (u16, u16),
    toast: Option<Toast>,
    pub should_quit: bool,
    /// Set after a first quit attempt with unsaved changes
    pub quit_confirmed: bool,
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("file_path", &self.file_path)
            .field("answer", &self.answer)
            .field("modal_open", &self.modal.is_open())
            .field("modal_focus", &self.modal_focus)
            .finish_non_exhaustive()
    }
}

impl Model {
    pub fn new(answer: AnswerBuffer, history: HistoryStore, terminal_size: (u16, u16)) -> Self {
        let mut model = Self {
            answer,
            answer_scroll_offset: 0,
            file_path: None,
            preview: Vec::new(),
            modal: FormulaModal::new(history),
            surface: Rc::new(RefCell::new(MathField::new())),
            listeners: KeyListeners::new(),
            platform: Platform::current(),
            initial_latex: String::new(),
            editing_span: None,
            modal_focus: ModalFocus::Field,
            keyboard_selected: 0,
            history_selected: 0,
            help_visible: false,
            config_global_path: None,
            config_local_path: None,
            history_path: None,
            terminal_size,
            toast: None,
            should_quit: false,
            quit_confirmed: false,
        };
        model.refresh_preview();
        model
    }

    #[must_use]
    pub fn with_file_path(mut self, path: Option<PathBuf>) -> Self {
        self.file_path = path;
        self
    }

    #[must_use]
    pub const fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn surface_handle(&self) -> SurfaceHandle {
        self.surface.clone()
    }

    pub fn commands(&self) -> &'static CommandTable {
        CommandTable::chemistry()
    }

    pub fn answer_is_dirty(&self) -> bool {
        self.answer.is_dirty()
    }

    pub(super) fn refresh_preview(&mut self) {
        self.preview = render_segments(&segment(&self.answer.text()), &UnicodeRenderer::new());
    }

    /// Keep the answer cursor inside the visible rows.
    pub(super) fn ensure_answer_cursor_visible(&mut self) {
        let line = self.answer.cursor().line;
        let rows = crate::ui::answer_visible_rows(self.terminal_size);
        if rows == 0 {
            self.answer_scroll_offset = line;
        } else if line < self.answer_scroll_offset {
            self.answer_scroll_offset = line;
        } else if line >= self.answer_scroll_offset + rows {
            self.answer_scroll_offset = line + 1 - rows;
        }
    }

    pub(super) fn move_keyboard_selection(&mut self, direction: Direction) {
        self.keyboard_selected = step_keyboard(self.commands(), self.keyboard_selected, direction);
    }

    pub(super) fn show_toast(&mut self, level: ToastLevel, message: impl Into<String>) {
        let message = message.into();
        match level {
            ToastLevel::Error => tracing::error!(%message, "toast"),
            ToastLevel::Warning => tracing::warn!(%message, "toast"),
            ToastLevel::Info => tracing::debug!(%message, "toast"),
        }
        self.toast = Some(Toast {
            level,
            message,
            expires_at: Instant::now() + Duration::from_secs(4),
        });
    }

    pub(super) fn expire_toast(&mut self, now: Instant) -> bool {
        if self
            .toast
            .as_ref()
            .is_some_and(|toast| toast.expires_at <= now)
        {
            self.toast = None;
            return true;
        }
        false
    }

    pub fn active_toast(&self) -> Option<(&str, ToastLevel)> {
        self.toast
            .as_ref()
            .map(|toast| (toast.message.as_str(), toast.level))
    }
}

/// Move through the on-screen keyboard grid.
///
/// Left/Right stay within a row; Up/Down land on the key covering the same
/// grid column in the neighbouring row.
pub(super) fn step_keyboard(table: &CommandTable, selected: usize, direction: Direction) -> usize {
    let commands = table.all_commands();
    let rows = keyboard_rows(commands);
    let Some((row_idx, pos)) = rows.iter().enumerate().find_map(|(r, row)| {
        row.iter()
            .position(|&idx| idx == selected)
            .map(|pos| (r, pos))
    }) else {
        return rows.first().and_then(|row| row.first()).copied().unwrap_or(0);
    };
    let row: &[usize] = &rows[row_idx];
    let column_of = |row: &[usize], pos: usize| -> u16 {
        row[..pos].iter().map(|&idx| commands[idx].span).sum()
    };
    match direction {
        Direction::Left => row[pos.saturating_sub(1)],
        Direction::Right => row[(pos + 1).min(row.len() - 1)],
        Direction::Up | Direction::Down => {
            let target = if direction == Direction::Up {
                row_idx.checked_sub(1)
            } else {
                Some(row_idx + 1).filter(|&r| r < rows.len())
            };
            let Some(target) = target else {
                return selected;
            };
            let column = column_of(row, pos);
            let target_row = &rows[target];
            let mut start = 0;
            for &idx in target_row {
                let span = commands[idx].span;
                if column < start + span {
                    return idx;
                }
                start += span;
            }
            target_row.last().copied().unwrap_or(selected)
        }
    }
}

// Implement Default for Model to allow std::mem::take
impl Default for Model {
    fn default() -> Self {
        Self::new(AnswerBuffer::empty(), HistoryStore::in_memory(), (80, 24))
    }
}
