use ropey::Rope;

use crate::markup::{SegmentKind, segment};

/// Position in the answer text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    /// Zero-based line index.
    pub line: usize,
    /// Zero-based byte offset within the line.
    pub col: usize,
    /// Column to return to when moving vertically through short lines.
    sticky_col: usize,
}

impl Cursor {
    pub const fn at(line: usize, col: usize) -> Self {
        Self {
            line,
            col,
            sticky_col: col,
        }
    }

    const fn set_col(&mut self, col: usize) {
        self.col = col;
        self.sticky_col = col;
    }
}

/// A `$...$` or `$$...$$` formula on one line of the answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormulaSpan {
    pub line: usize,
    /// Byte range of the formula, delimiters included.
    pub start: usize,
    pub end: usize,
    pub latex: String,
    pub block: bool,
}

impl FormulaSpan {
    fn markup(&self, latex: &str) -> String {
        if self.block {
            format!("$${latex}$$")
        } else {
            format!("${latex}$")
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// The host text area formulas are inserted into.
pub struct AnswerBuffer {
    rope: Rope,
    cursor: Cursor,
    dirty: bool,
}

impl AnswerBuffer {
    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
            cursor: Cursor::default(),
            dirty: false,
        }
    }

    pub fn empty() -> Self {
        Self::from_text("")
    }

    pub const fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Modified since loading or the last save.
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub const fn mark_clean(&mut self) {
        self.dirty = false;
    }

    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// A line without its line ending.
    pub fn line_at(&self, idx: usize) -> Option<String> {
        if idx >= self.rope.len_lines() {
            return None;
        }
        let line = self.rope.line(idx).to_string();
        Some(line.trim_end_matches(['\n', '\r']).to_string())
    }

    pub fn line_len(&self, idx: usize) -> usize {
        self.line_at(idx).map_or(0, |s| s.len())
    }

    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    pub fn insert_char(&mut self, ch: char) {
        let idx = self.char_index();
        self.rope.insert_char(idx, ch);
        self.cursor.set_col(self.cursor.col + ch.len_utf8());
        self.dirty = true;
    }

    /// Insert text at the cursor and leave the cursor after it.
    pub fn insert_str(&mut self, s: &str) {
        if s.is_empty() {
            return;
        }
        let idx = self.char_index();
        self.rope.insert(idx, s);
        match s.rsplit_once('\n') {
            Some((head, tail)) => {
                self.cursor.line += head.matches('\n').count() + 1;
                self.cursor.set_col(tail.len());
            }
            None => self.cursor.set_col(self.cursor.col + s.len()),
        }
        self.dirty = true;
    }

    /// Insert a committed formula as inline math, `${latex}$`.
    ///
    /// Surrounding whitespace of the formula is dropped; a blank formula
    /// inserts nothing.
    pub fn insert_formula(&mut self, latex: &str) -> bool {
        let latex = latex.trim();
        if latex.is_empty() {
            return false;
        }
        self.insert_str(&format!("${latex}$"));
        true
    }

    /// The formula the cursor sits inside, if any.
    ///
    /// A cursor on the opening delimiter is outside the formula.
    pub fn formula_at_cursor(&self) -> Option<FormulaSpan> {
        let line = self.line_at(self.cursor.line)?;
        let col = self.cursor.col;
        let mut start = 0;
        for seg in segment(&line) {
            let end = start + seg.to_markup().len();
            if seg.is_math() && start < col && col < end {
                return Some(FormulaSpan {
                    line: self.cursor.line,
                    start,
                    end,
                    latex: seg.content,
                    block: seg.kind == SegmentKind::Block,
                });
            }
            start = end;
        }
        None
    }

    /// Replace a formula found by [`Self::formula_at_cursor`].
    ///
    /// Returns `false`, leaving the text alone, when the span no longer
    /// matches the text or `latex` is blank.
    pub fn replace_formula(&mut self, span: &FormulaSpan, latex: &str) -> bool {
        let latex = latex.trim();
        let Some(line) = self.line_at(span.line) else {
            return false;
        };
        if latex.is_empty() || line.get(span.start..span.end) != Some(span.markup(&span.latex).as_str())
        {
            return false;
        }
        let line_start = self.rope.line_to_char(span.line);
        let from = line_start + line[..span.start].chars().count();
        let to = line_start + line[..span.end].chars().count();
        let markup = span.markup(latex);
        self.rope.remove(from..to);
        self.rope.insert(from, &markup);
        self.cursor.line = span.line;
        self.cursor.set_col(span.start + markup.len());
        self.dirty = true;
        true
    }

    pub fn split_line(&mut self) {
        let idx = self.char_index();
        self.rope.insert_char(idx, '\n');
        self.cursor.line += 1;
        self.cursor.set_col(0);
        self.dirty = true;
    }

    /// Backspace. Returns `false` at the start of the text.
    pub fn delete_back(&mut self) -> bool {
        let idx = self.char_index();
        if idx == 0 {
            return false;
        }
        if self.cursor.col == 0 {
            let joined_col = self.line_len(self.cursor.line - 1);
            self.rope.remove(self.line_break_before(idx)..idx);
            self.cursor.line -= 1;
            self.cursor.set_col(joined_col);
        } else {
            let prev = self.prev_char_len();
            self.rope.remove(idx - 1..idx);
            self.cursor.set_col(self.cursor.col - prev);
        }
        self.dirty = true;
        true
    }

    /// Delete. Returns `false` at the end of the text.
    pub fn delete_forward(&mut self) -> bool {
        let idx = self.char_index();
        if idx >= self.rope.len_chars() {
            return false;
        }
        let end = if self.rope.char(idx) == '\r' && self.rope.get_char(idx + 1) == Some('\n') {
            idx + 2
        } else {
            idx + 1
        };
        self.rope.remove(idx..end);
        self.dirty = true;
        true
    }

    pub fn move_cursor(&mut self, direction: Direction) {
        match direction {
            Direction::Left => {
                if self.cursor.col > 0 {
                    let prev = self.prev_char_len();
                    self.cursor.set_col(self.cursor.col - prev);
                } else if self.cursor.line > 0 {
                    self.cursor.line -= 1;
                    self.cursor.set_col(self.line_len(self.cursor.line));
                }
            }
            Direction::Right => {
                let line = self.line_at(self.cursor.line).unwrap_or_default();
                if let Some(next) = line[self.cursor.col.min(line.len())..].chars().next() {
                    self.cursor.set_col(self.cursor.col + next.len_utf8());
                } else if self.cursor.line + 1 < self.line_count() {
                    self.cursor.line += 1;
                    self.cursor.set_col(0);
                }
            }
            Direction::Up => {
                if self.cursor.line > 0 {
                    self.cursor.line -= 1;
                    self.cursor.col = self.sticky_col_on(self.cursor.line);
                }
            }
            Direction::Down => {
                if self.cursor.line + 1 < self.line_count() {
                    self.cursor.line += 1;
                    self.cursor.col = self.sticky_col_on(self.cursor.line);
                }
            }
        }
    }

    pub const fn move_home(&mut self) {
        self.cursor.set_col(0);
    }

    pub fn move_end(&mut self) {
        self.cursor.set_col(self.line_len(self.cursor.line));
    }

    /// Place the cursor, clamped to the text.
    pub fn move_to(&mut self, line: usize, col: usize) {
        self.cursor.line = line.min(self.line_count().saturating_sub(1));
        let text = self.line_at(self.cursor.line).unwrap_or_default();
        let mut col = col.min(text.len());
        while !text.is_char_boundary(col) {
            col -= 1;
        }
        self.cursor.set_col(col);
    }

    pub fn move_to_end(&mut self) {
        let last = self.line_count().saturating_sub(1);
        self.cursor.line = last;
        self.cursor.set_col(self.line_len(last));
    }

    fn sticky_col_on(&self, line: usize) -> usize {
        let text = self.line_at(line).unwrap_or_default();
        let mut col = self.cursor.sticky_col.min(text.len());
        while !text.is_char_boundary(col) {
            col -= 1;
        }
        col
    }

    fn prev_char_len(&self) -> usize {
        let line = self.line_at(self.cursor.line).unwrap_or_default();
        line[..self.cursor.col.min(line.len())]
            .chars()
            .next_back()
            .map_or(1, char::len_utf8)
    }

    /// Rope char index of the cursor.
    /// Start of the line break ending at char `idx`, covering a whole `\r\n`.
    fn line_break_before(&self, idx: usize) -> usize {
        if idx >= 2 && self.rope.char(idx - 1) == '\n' && self.rope.char(idx - 2) == '\r' {
            idx - 2
        } else {
            idx - 1
        }
    }

    fn char_index(&self) -> usize {
        let start = self.rope.line_to_char(self.cursor.line);
        let line = self.line_at(self.cursor.line).unwrap_or_default();
        start + line[..self.cursor.col.min(line.len())].chars().count()
    }
}

impl std::fmt::Debug for AnswerBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnswerBuffer")
            .field("lines", &self.rope.len_lines())
            .field("cursor", &self.cursor)
            .field("dirty", &self.dirty)
            .finish()
    }
}

impl Default for AnswerBuffer {
    fn default() -> Self {
        Self::empty()
    }
}
