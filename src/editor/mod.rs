//! Rope-backed answer text area that committed formulas are inserted into.

mod buffer;

pub use buffer::{AnswerBuffer, Cursor, Direction, FormulaSpan};
