//! The formula modal: one editing session per opening, plus the history it
//! feeds.
//!
//! While open, the modal holds guards for its Escape and shortcut
//! listeners, so closing (or dropping) the modal removes them.

use crate::commands::SymbolCommand;
use crate::history::HistoryStore;
use crate::session::{ApplyOutcome, FormulaSession, SurfaceHandle};
use crate::shortcut::{
    KeyListeners, KeyPress, ListenerGuard, ListenerKind, Resolution, ShortcutResolver,
};
use crate::surface::{MathSurface, SurfaceError};

use crossterm::event::KeyCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Editor,
    History,
}

impl Tab {
    pub const fn toggled(self) -> Self {
        match self {
            Self::Editor => Self::History,
            Self::History => Self::Editor,
        }
    }
}

/// What the modal did with a key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Escape closed the modal
    Closed,
    /// A shortcut ran a symbol command
    Applied(ApplyOutcome),
    /// Not handled here
    PassThrough,
}

#[derive(Debug)]
pub struct FormulaModal {
    open: bool,
    tab: Tab,
    session: FormulaSession,
    history: HistoryStore,
    guards: Vec<ListenerGuard>,
}

impl FormulaModal {
    pub fn new(history: HistoryStore) -> Self {
        Self {
            open: false,
            tab: Tab::Editor,
            session: FormulaSession::default(),
            history,
            guards: Vec::new(),
        }
    }

    /// Open with a fresh session seeded from `initial`.
    ///
    /// Opening an already open modal restarts it from `initial`.
    pub fn open(&mut self, initial: &str, surface: &SurfaceHandle, listeners: &KeyListeners) {
        if self.open {
            self.close();
        }
        let mut session = FormulaSession::new(initial);
        session.mount(surface);
        self.session = session;
        self.tab = Tab::Editor;
        self.guards = vec![
            listeners.register(ListenerKind::Escape),
            listeners.register(ListenerKind::Shortcuts),
        ];
        self.open = true;
        tracing::debug!(initial, "formula modal opened");
    }

    /// Discard the session and remove the modal's listeners.
    pub fn close(&mut self) {
        if !self.open {
            return;
        }
        self.session.unmount();
        self.session = FormulaSession::default();
        self.guards.clear();
        self.open = false;
        tracing::debug!("formula modal closed");
    }

    pub const fn is_open(&self) -> bool {
        self.open
    }

    pub const fn tab(&self) -> Tab {
        self.tab
    }

    pub fn select_tab(&mut self, tab: Tab) {
        self.tab = tab;
    }

    pub const fn session(&self) -> &FormulaSession {
        &self.session
    }

    pub const fn history(&self) -> &HistoryStore {
        &self.history
    }

    /// Follow a change of the host's initial value while open.
    pub fn set_initial(&mut self, initial: &str) -> bool {
        self.open && self.session.set_initial(initial)
    }

    /// Route a key press through the modal's listeners.
    pub fn handle_key(
        &mut self,
        press: &KeyPress,
        resolver: &ShortcutResolver<'_>,
        listeners: &KeyListeners,
    ) -> KeyOutcome {
        if !self.open {
            return KeyOutcome::PassThrough;
        }
        if press.code == KeyCode::Esc && listeners.is_active(ListenerKind::Escape) {
            self.close();
            return KeyOutcome::Closed;
        }
        if listeners.is_active(ListenerKind::Shortcuts)
            && let Resolution::Consume(command) = resolver.resolve(press)
        {
            return KeyOutcome::Applied(self.apply(command));
        }
        KeyOutcome::PassThrough
    }

    /// A click on an on-screen key.
    pub fn apply(&mut self, command: &SymbolCommand) -> ApplyOutcome {
        if !self.open {
            return ApplyOutcome::Unmounted;
        }
        self.session.apply(command)
    }

    /// Direct editing of the field (typing, cursor keys).
    pub fn edit<F>(&mut self, edit: F) -> ApplyOutcome
    where
        F: FnOnce(&mut dyn MathSurface) -> Result<(), SurfaceError>,
    {
        if !self.open {
            return ApplyOutcome::Unmounted;
        }
        self.session.edit_surface(edit)
    }

    /// Insert the current formula into the host and close.
    ///
    /// The formula goes to history first, then `on_insert` runs exactly once.
    /// Nothing happens while closed or while the formula is blank.
    pub fn commit<F>(&mut self, on_insert: F) -> Option<String>
    where
        F: FnOnce(&str),
    {
        if !self.open {
            return None;
        }
        let latex = self.session.commit()?;
        self.history.add(&latex);
        on_insert(&latex);
        self.close();
        Some(latex)
    }

    /// Load a history entry into the editor.
    pub fn recall(&mut self, index: usize) -> bool {
        if !self.open {
            return false;
        }
        let Some(entry) = self.history.get(index).map(str::to_owned) else {
            return false;
        };
        self.session.load(&entry);
        self.tab = Tab::Editor;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::CommandTable;
    use crate::history::MemoryBackend;
    use crate::shortcut::{KeyTarget, Platform};
    use crate::surface::MathField;
    use crossterm::event::KeyModifiers;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Host {
        surface: SurfaceHandle,
        listeners: KeyListeners,
        resolver: ShortcutResolver<'static>,
    }

    fn host() -> Host {
        Host {
            surface: Rc::new(RefCell::new(MathField::new())),
            listeners: KeyListeners::new(),
            resolver: ShortcutResolver::new(CommandTable::chemistry(), Platform::Other),
        }
    }

    fn key(label: &str) -> &'static SymbolCommand {
        CommandTable::chemistry()
            .all_commands()
            .iter()
            .find(|c| c.label == label)
            .unwrap()
    }

    fn chord(ch: char) -> KeyPress {
        KeyPress::new(
            KeyCode::Char(ch),
            KeyModifiers::ALT | KeyModifiers::SHIFT,
            KeyTarget::Surface,
        )
    }

    #[test]
    fn test_click_arrow_then_commit() {
        let host = host();
        let mut modal = FormulaModal::new(HistoryStore::in_memory());
        modal.open("H_2O", &host.surface, &host.listeners);
        assert_eq!(modal.apply(key("→")), ApplyOutcome::Applied);

        let mut inserted = Vec::new();
        let committed = modal.commit(|latex| inserted.push(latex.to_string()));
        assert_eq!(committed.as_deref(), Some("H_2O\\rightarrow"));
        assert_eq!(inserted, ["H_2O\\rightarrow"]);
        assert_eq!(modal.history().get(0), Some("H_2O\\rightarrow"));
        assert!(!modal.is_open());
    }

    #[test]
    fn test_same_formula_in_two_sessions_is_stored_once() {
        let host = host();
        let mut modal = FormulaModal::new(HistoryStore::in_memory());
        for _ in 0..2 {
            modal.open("NaCl", &host.surface, &host.listeners);
            modal.commit(|_| {});
        }
        assert_eq!(modal.history().len(), 1);
    }

    #[test]
    fn test_commit_is_noop_when_blank_or_closed() {
        let host = host();
        let mut modal = FormulaModal::new(HistoryStore::in_memory());
        let mut calls = 0;
        assert_eq!(modal.commit(|_| calls += 1), None);

        modal.open("  ", &host.surface, &host.listeners);
        assert_eq!(modal.commit(|_| calls += 1), None);
        assert!(modal.is_open());
        assert_eq!(calls, 0);
        assert!(modal.history().is_empty());
    }

    #[test]
    fn test_commit_runs_callback_once_per_open() {
        let host = host();
        let mut modal = FormulaModal::new(HistoryStore::in_memory());
        modal.open("O_2", &host.surface, &host.listeners);
        let mut calls = 0;
        modal.commit(|_| calls += 1);
        modal.commit(|_| calls += 1);
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_listeners_live_only_while_open() {
        let host = host();
        let mut modal = FormulaModal::new(HistoryStore::in_memory());
        modal.open("", &host.surface, &host.listeners);
        assert!(host.listeners.is_active(ListenerKind::Escape));
        assert!(host.listeners.is_active(ListenerKind::Shortcuts));
        modal.open("H", &host.surface, &host.listeners);
        assert_eq!(host.listeners.count(), 2);
        modal.close();
        assert_eq!(host.listeners.count(), 0);
    }

    #[test]
    fn test_dropping_modal_removes_listeners() {
        let host = host();
        let mut modal = FormulaModal::new(HistoryStore::in_memory());
        modal.open("", &host.surface, &host.listeners);
        drop(modal);
        assert_eq!(host.listeners.count(), 0);
    }

    #[test]
    fn test_escape_closes() {
        let host = host();
        let mut modal = FormulaModal::new(HistoryStore::in_memory());
        modal.open("H_2", &host.surface, &host.listeners);
        let esc = KeyPress::new(KeyCode::Esc, KeyModifiers::NONE, KeyTarget::Elsewhere);
        assert_eq!(
            modal.handle_key(&esc, &host.resolver, &host.listeners),
            KeyOutcome::Closed
        );
        assert!(!modal.is_open());
        assert_eq!(
            modal.handle_key(&esc, &host.resolver, &host.listeners),
            KeyOutcome::PassThrough
        );
    }

    #[test]
    fn test_shortcut_applies_command() {
        let host = host();
        let mut modal = FormulaModal::new(HistoryStore::in_memory());
        modal.open("A", &host.surface, &host.listeners);
        assert_eq!(
            modal.handle_key(&chord('>'), &host.resolver, &host.listeners),
            KeyOutcome::Applied(ApplyOutcome::Applied)
        );
        assert_eq!(modal.session().latex(), "A\\rightarrow");

        let plain = KeyPress::new(KeyCode::Char('x'), KeyModifiers::NONE, KeyTarget::Surface);
        assert_eq!(
            modal.handle_key(&plain, &host.resolver, &host.listeners),
            KeyOutcome::PassThrough
        );
    }

    #[test]
    fn test_reopen_discards_previous_edits() {
        let host = host();
        let mut modal = FormulaModal::new(HistoryStore::in_memory());
        modal.open("H", &host.surface, &host.listeners);
        modal.apply(key("2"));
        modal.close();
        modal.open("H", &host.surface, &host.listeners);
        assert_eq!(modal.session().latex(), "H");
        assert_eq!(host.surface.borrow().latex(), "H");
    }

    #[test]
    fn test_recall_loads_entry_and_switches_tab() {
        let backend = MemoryBackend::new();
        let mut history = HistoryStore::open(backend);
        history.add("CH_4");
        history.add("CO_2");
        let host = host();
        let mut modal = FormulaModal::new(history);
        modal.open("", &host.surface, &host.listeners);
        modal.select_tab(Tab::History);
        assert!(modal.recall(1));
        assert_eq!(modal.tab(), Tab::Editor);
        assert_eq!(modal.session().latex(), "CH_4");
        assert_eq!(host.surface.borrow().latex(), "CH_4");
        assert!(!modal.recall(7));
    }

    #[test]
    fn test_edit_types_into_field() {
        let host = host();
        let mut modal = FormulaModal::new(HistoryStore::in_memory());
        assert_eq!(modal.edit(|s| s.write("x")), ApplyOutcome::Unmounted);
        modal.open("", &host.surface, &host.listeners);
        assert_eq!(modal.edit(|s| s.write("Fe")), ApplyOutcome::Applied);
        assert_eq!(modal.session().latex(), "Fe");
    }

    #[test]
    fn test_initial_change_reaches_open_modal_only() {
        let host = host();
        let mut modal = FormulaModal::new(HistoryStore::in_memory());
        assert!(!modal.set_initial("X"));
        modal.open("H_2O", &host.surface, &host.listeners);
        assert!(modal.set_initial("CO_2"));
        assert_eq!(modal.session().latex(), "CO_2");
    }
}
