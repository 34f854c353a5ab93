//! The formula session: the LaTeX value being edited in one modal opening.
//!
//! The session owns the current `latex` string and mediates between the
//! host's initial value and the editing surface. While a surface is
//! mounted, the surface is the source of truth: every primitive is
//! followed by a change notification carrying the surface's own LaTeX.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::commands::{OperationKind, SymbolCommand};
use crate::surface::{MathSurface, SurfaceError};

/// Shared handle to an editing surface owned by the host.
pub type SurfaceHandle = Rc<RefCell<dyn MathSurface>>;

/// Result of applying a symbol command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    /// The surface rejected the operation; the session is unchanged
    Failed(SurfaceError),
    /// No surface is mounted; nothing happened
    Unmounted,
}

#[derive(Default)]
pub struct FormulaSession {
    latex: String,
    /// Last initial value seen from the host
    initial: String,
    surface: Option<Weak<RefCell<dyn MathSurface>>>,
}

impl std::fmt::Debug for FormulaSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormulaSession")
            .field("latex", &self.latex)
            .field("initial", &self.initial)
            .field("mounted", &self.is_mounted())
            .finish()
    }
}

impl FormulaSession {
    /// Start a session from the host's initial value.
    pub fn new(initial: &str) -> Self {
        Self {
            latex: initial.to_string(),
            initial: initial.to_string(),
            surface: None,
        }
    }

    /// Attach the surface and load the session's value into it.
    ///
    /// Only a weak reference is kept; the host owns the surface.
    pub fn mount(&mut self, surface: &SurfaceHandle) {
        surface.borrow_mut().set_latex(&self.latex);
        self.surface = Some(Rc::downgrade(surface));
    }

    pub fn unmount(&mut self) {
        self.surface = None;
    }

    pub fn is_mounted(&self) -> bool {
        self.surface().is_some()
    }

    fn surface(&self) -> Option<SurfaceHandle> {
        self.surface.as_ref().and_then(Weak::upgrade)
    }

    pub fn latex(&self) -> &str {
        &self.latex
    }

    /// Dispatch a symbol command to the surface.
    ///
    /// Surface failures are logged and dropped; they never escape.
    pub fn apply(&mut self, command: &SymbolCommand) -> ApplyOutcome {
        let Some(surface) = self.surface() else {
            if command.kind == OperationKind::Clear {
                self.latex.clear();
            }
            tracing::debug!(label = %command.label, "surface not mounted, command ignored");
            return ApplyOutcome::Unmounted;
        };

        let result = {
            let mut surface = surface.borrow_mut();
            surface.focus();
            match command.kind {
                OperationKind::InsertCommand => surface.insert_command(&command.payload),
                OperationKind::WriteText => surface.write(&command.payload),
                OperationKind::Keystroke => surface.keystroke(&command.payload),
                OperationKind::Clear => {
                    surface.set_latex("");
                    Ok(())
                }
            }
        };

        match result {
            Ok(()) => {
                if command.kind == OperationKind::Clear {
                    self.latex.clear();
                }
                let latex = surface.borrow().latex();
                self.on_surface_changed(latex);
                ApplyOutcome::Applied
            }
            Err(err) => {
                tracing::error!(
                    label = %command.label,
                    payload = %command.payload,
                    error = %err,
                    "surface rejected command"
                );
                ApplyOutcome::Failed(err)
            }
        }
    }

    /// Run a direct edit (typing into the field) and pick up its result.
    pub fn edit_surface<F>(&mut self, edit: F) -> ApplyOutcome
    where
        F: FnOnce(&mut dyn MathSurface) -> Result<(), SurfaceError>,
    {
        let Some(surface) = self.surface() else {
            return ApplyOutcome::Unmounted;
        };
        let result = edit(&mut *surface.borrow_mut());
        match result {
            Ok(()) => {
                let latex = surface.borrow().latex();
                self.on_surface_changed(latex);
                ApplyOutcome::Applied
            }
            Err(err) => {
                tracing::error!(error = %err, "surface rejected edit");
                ApplyOutcome::Failed(err)
            }
        }
    }

    /// Change notification from the surface.
    pub fn on_surface_changed(&mut self, latex: String) {
        self.latex = latex;
    }

    /// Whether there is something worth inserting.
    pub fn can_commit(&self) -> bool {
        !self.latex.trim().is_empty()
    }

    /// The value to insert, or `None` while blank.
    pub fn commit(&self) -> Option<String> {
        self.can_commit().then(|| self.latex.clone())
    }

    /// Follow a change of the host's initial value.
    ///
    /// Only a value that differs from the previous initial value counts as
    /// a change, so an unchanged (stale) initial value never overwrites user
    /// edits. Returns `true` when the session adopted the new value.
    pub fn set_initial(&mut self, initial: &str) -> bool {
        if initial == self.initial {
            return false;
        }
        self.initial = initial.to_string();
        if initial == self.latex {
            return false;
        }
        self.replace(initial);
        true
    }

    /// Replace the session value, e.g. with a recalled history entry.
    pub fn load(&mut self, latex: &str) {
        if latex != self.latex {
            self.replace(latex);
        }
    }

    fn replace(&mut self, latex: &str) {
        self.latex = latex.to_string();
        if let Some(surface) = self.surface() {
            let mut surface = surface.borrow_mut();
            if surface.latex() != latex {
                surface.set_latex(latex);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::CommandTable;
    use crate::surface::MathField;
    use proptest::prelude::*;

    fn mounted(initial: &str) -> (FormulaSession, Rc<RefCell<MathField>>) {
        let field = Rc::new(RefCell::new(MathField::new()));
        let handle: SurfaceHandle = field.clone();
        let mut session = FormulaSession::new(initial);
        session.mount(&handle);
        (session, field)
    }

    fn key(label: &str) -> &'static SymbolCommand {
        CommandTable::chemistry()
            .all_commands()
            .iter()
            .find(|c| c.label == label)
            .unwrap()
    }

    #[test]
    fn test_mount_loads_initial_into_surface() {
        let (session, field) = mounted("H_2O");
        assert_eq!(field.borrow().latex(), "H_2O");
        assert!(session.is_mounted());
    }

    #[test]
    fn test_write_text_updates_latex_from_surface() {
        let (mut session, field) = mounted("H_2O");
        let arrow = SymbolCommand::write("→", "\\rightarrow");
        assert_eq!(session.apply(&arrow), ApplyOutcome::Applied);
        assert_eq!(session.latex(), "H_2O\\rightarrow");
        assert!(field.borrow().is_focused());
    }

    #[test]
    fn test_structural_insert_and_keystroke() {
        let (mut session, _field) = mounted("H");
        session.apply(key("Sub"));
        session.apply(key("2"));
        session.apply(key("→"));
        assert_eq!(session.latex(), "H_{2\\rightarrow}");
        session.apply(&SymbolCommand::keystroke("Bksp", "Backspace"));
        session.apply(&SymbolCommand::keystroke("→", "Right"));
        session.apply(key("O"));
        assert_eq!(session.latex(), "H_2O");
    }

    #[test]
    fn test_clear_empties_session_and_surface() {
        let (mut session, field) = mounted("CO_2");
        assert_eq!(session.apply(key("Clear")), ApplyOutcome::Applied);
        assert_eq!(session.latex(), "");
        assert_eq!(field.borrow().latex(), "");
    }

    #[test]
    fn test_surface_failure_is_swallowed() {
        let (mut session, _field) = mounted("H");
        let bad = SymbolCommand::command("bad", "\\frac{");
        assert!(matches!(session.apply(&bad), ApplyOutcome::Failed(_)));
        assert_eq!(session.latex(), "H");
        assert_eq!(session.apply(key("2")), ApplyOutcome::Applied);
        assert_eq!(session.latex(), "H2");
    }

    #[test]
    fn test_unmounted_operations_are_noops() {
        let mut session = FormulaSession::new("H");
        assert_eq!(session.apply(key("2")), ApplyOutcome::Unmounted);
        assert_eq!(session.latex(), "H");
        assert_eq!(
            session.edit_surface(|s| s.write("x")),
            ApplyOutcome::Unmounted
        );
    }

    #[test]
    fn test_dropped_surface_counts_as_unmounted() {
        let (mut session, field) = mounted("H");
        drop(field);
        assert!(!session.is_mounted());
        assert_eq!(session.apply(key("2")), ApplyOutcome::Unmounted);
    }

    #[test]
    fn test_commit_is_disabled_while_blank() {
        let session = FormulaSession::new("   ");
        assert!(!session.can_commit());
        assert_eq!(session.commit(), None);
        let session = FormulaSession::new("O_2");
        assert_eq!(session.commit().as_deref(), Some("O_2"));
    }

    #[test]
    fn test_initial_change_resyncs_surface() {
        let (mut session, field) = mounted("H_2O");
        assert!(session.set_initial("CO_2"));
        assert_eq!(session.latex(), "CO_2");
        assert_eq!(field.borrow().latex(), "CO_2");
    }

    #[test]
    fn test_stale_initial_does_not_override_edits() {
        let (mut session, _field) = mounted("H_2O");
        session.apply(key("+"));
        assert!(!session.set_initial("H_2O"));
        assert_eq!(session.latex(), "H_2O+");
    }

    #[test]
    fn test_initial_equal_to_current_is_not_propagated() {
        let (mut session, field) = mounted("H");
        session.apply(key("2"));
        field.borrow_mut().keystroke("Left").unwrap();
        assert!(!session.set_initial("H2"));
        // Surface untouched, so the cursor stays where the user put it.
        assert_eq!(field.borrow().cursor(), 1);
    }

    #[test]
    fn test_edit_surface_notifies_change() {
        let (mut session, _field) = mounted("N");
        assert_eq!(
            session.edit_surface(|s| s.write("H_3")),
            ApplyOutcome::Applied
        );
        assert_eq!(session.latex(), "NH_3");
    }

    proptest! {
        #[test]
        fn clear_always_empties(indices in proptest::collection::vec(0..34usize, 0..40)) {
            let (mut session, _field) = mounted("H_2O");
            let table = CommandTable::chemistry();
            for idx in indices {
                session.apply(table.get(idx).unwrap());
            }
            session.apply(key("Clear"));
            prop_assert_eq!(session.latex(), "");
        }
    }
}
