// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. history::HistoryStore)
    clippy::module_name_repetitions
)]

//! # Chemkey
//!
//! A chemistry formula keyboard for the terminal.
//!
//! Chemkey edits an answer text that may contain `$...$` formulas, and
//! opens a formula editor over it with:
//! - An on-screen symbol keyboard (digits, elements, phases, arrows,
//!   super/subscript, navigation)
//! - Alt+Shift shortcuts for the common symbols
//! - A persisted, deduplicated history of inserted formulas
//! - A live Unicode preview of the answer and the formula
//!
//! ## Architecture
//!
//! The terminal host uses The Elm Architecture (TEA) pattern:
//! - **Model**: Application state
//! - **Message**: Events and actions
//! - **Update**: Pure state transitions
//! - **View**: Render to terminal
//!
//! ## Modules
//!
//! - [`commands`]: The symbol command table and shortcut chords
//! - [`shortcut`]: Key press to command resolution and listener guards
//! - [`surface`]: The math editing surface
//! - [`session`]: One formula editing session
//! - [`history`]: Formula history and its storage
//! - [`markup`]: Splitting text into prose and `$...$` formulas
//! - [`preview`]: Rendering formulas for display
//! - [`modal`]: The formula modal tying session, listeners and history together
//! - [`editor`]: The answer text area
//! - [`app`]: Main application loop and state
//! - [`ui`]: Terminal UI components
//! - [`config`]: Saved command-line defaults

pub mod app;
pub mod commands;
pub mod config;
pub mod editor;
pub mod history;
pub mod markup;
pub mod modal;
pub mod preview;
pub mod session;
pub mod shortcut;
pub mod surface;
pub mod ui;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::app::{App, Message, Model};
    pub use crate::commands::{CommandTable, SymbolCommand};
    pub use crate::history::HistoryStore;
    pub use crate::markup::{Segment, segment};
    pub use crate::modal::FormulaModal;
    pub use crate::session::FormulaSession;
    pub use crate::surface::{MathField, MathSurface};
}
