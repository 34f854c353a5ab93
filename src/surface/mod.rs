//! The math editing surface.
//!
//! [`MathSurface`] is the cursor-based editing component the formula
//! session drives. [`MathField`] is the implementation the terminal host
//! mounts: a LaTeX string with a token-aware cursor.

mod field;
mod tokens;

pub use field::MathField;

/// Failure reported by a surface primitive.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SurfaceError {
    #[error("empty structural command")]
    EmptyCommand,
    #[error("unknown structural command `{0}`")]
    UnknownCommand(String),
    #[error("unknown keystroke `{0}`")]
    UnknownKeystroke(String),
    #[error("unbalanced braces in `{0}`")]
    UnbalancedBraces(String),
}

/// Cursor-relative editing primitives of a structured math field.
pub trait MathSurface {
    /// Insert LaTeX text at the cursor.
    fn write(&mut self, text: &str) -> Result<(), SurfaceError>;

    /// Insert a structural template such as `^`, `_`, `(` or `\frac`.
    fn insert_command(&mut self, command: &str) -> Result<(), SurfaceError>;

    /// Insert one typed key.
    ///
    /// Surfaces that understand hand-typed LaTeX can override this; the
    /// default treats the key like [`Self::write`].
    fn type_text(&mut self, text: &str) -> Result<(), SurfaceError> {
        self.write(text)
    }

    /// Replay a named keystroke (`Left`, `Right`, `Backspace`, ...).
    fn keystroke(&mut self, key: &str) -> Result<(), SurfaceError>;

    /// The current content as LaTeX.
    fn latex(&self) -> String;

    /// Replace the whole content.
    fn set_latex(&mut self, latex: &str);

    fn focus(&mut self);
}
