use std::ops::Range;

use super::tokens::{braces_balanced, collapse_single_groups, ends_with_control_word, token_ranges};
use super::{MathSurface, SurfaceError};

/// Control words that take brace arguments, with their arity.
const TEMPLATE_COMMANDS: &[(&str, usize)] = &[
    ("frac", 2),
    ("sqrt", 1),
    ("ce", 1),
    ("text", 1),
    ("mathrm", 1),
    ("overset", 2),
    ("underset", 2),
    ("xrightarrow", 1),
    ("vec", 1),
    ("bar", 1),
    ("hat", 1),
    ("dot", 1),
];

/// `\left(`-style delimiter atom, as opposed to `\leftarrow`.
fn is_delimiter(token: &str, side: &str) -> bool {
    token
        .strip_prefix(side)
        .is_some_and(|rest| !rest.is_empty() && !rest.starts_with(|c: char| c.is_ascii_alphabetic()))
}

/// A LaTeX editing field with a token-aware cursor.
///
/// The cursor is a byte offset into the raw content and always sits on an
/// atom boundary after every primitive (see [`token_ranges`]).
#[derive(Debug, Clone, Default)]
pub struct MathField {
    content: String,
    cursor: usize,
    focused: bool,
    /// A control word is being typed key by key
    typing_word: bool,
}

impl MathField {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a field holding `latex` with the cursor at the end.
    pub fn with_latex(latex: &str) -> Self {
        Self {
            content: latex.to_string(),
            cursor: latex.len(),
            focused: false,
            typing_word: false,
        }
    }

    /// The raw content, without single-group collapsing.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Cursor byte offset into [`Self::content`].
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    pub const fn is_focused(&self) -> bool {
        self.focused
    }

    pub const fn blur(&mut self) {
        self.focused = false;
    }

    fn snap_cursor(&mut self) {
        let limit = self.cursor.min(self.content.len());
        self.cursor = token_ranges(&self.content)
            .into_iter()
            .map(|r| r.start)
            .chain(std::iter::once(self.content.len()))
            .filter(|&b| b <= limit)
            .max()
            .unwrap_or(0);
    }

    fn token_before(&self) -> Option<Range<usize>> {
        token_ranges(&self.content)
            .into_iter()
            .find(|r| r.end == self.cursor)
    }

    fn token_after(&self) -> Option<Range<usize>> {
        token_ranges(&self.content)
            .into_iter()
            .find(|r| r.start == self.cursor)
    }

    /// Insert `text` and leave the cursor `offset` bytes into it.
    fn insert(&mut self, text: &str, offset: usize) {
        let start = self.cursor;
        self.content.insert_str(start, text);
        self.cursor = start + offset.min(text.len());
    }

    fn insert_template(&mut self, head: &str, arity: usize) {
        let mut text = head.to_string();
        for _ in 0..arity {
            text.push_str("{}");
        }
        let offset = if arity > 0 { head.len() + 1 } else { text.len() };
        self.insert(&text, offset);
    }

    fn write_text(&mut self, text: &str) {
        if text.starts_with(|c: char| c.is_ascii_alphabetic())
            && ends_with_control_word(&self.content[..self.cursor])
        {
            self.insert(" ", 1);
        }
        self.insert(text, text.len());
    }

    fn move_left(&mut self) {
        if let Some(prev) = self.token_before() {
            self.cursor = prev.start;
        }
    }

    fn move_right(&mut self) {
        if let Some(next) = self.token_after() {
            self.cursor = next.end;
        }
    }

    fn remove(&mut self, range: Range<usize>) {
        self.cursor = range.start;
        self.content.replace_range(range, "");
    }

    /// Span of an all-empty structure (`^{}`, `\frac{}{}`) around the
    /// brace opening at `brace`.
    fn empty_structure_at(&self, brace: usize) -> Option<Range<usize>> {
        let mut start = brace;
        while self.content[..start].ends_with("{}") {
            start -= 2;
        }
        let mut end = brace;
        while self.content[end..].starts_with("{}") {
            end += 2;
        }
        if self.content[end..].starts_with('{') {
            return None;
        }
        let owner = token_ranges(&self.content)
            .into_iter()
            .find(|r| r.end == start)?;
        let owner_text = self.content[owner.clone()].trim_end();
        let structural = matches!(owner_text, "^" | "_")
            || (owner_text.len() > 1
                && owner_text.starts_with('\\')
                && owner_text[1..].bytes().all(|b| b.is_ascii_alphabetic()));
        structural.then_some(owner.start..end)
    }

    fn backspace(&mut self) {
        let Some(prev) = self.token_before() else {
            return;
        };
        let text = &self.content[prev.clone()];
        if text == "{" {
            if !self.content[self.cursor..].starts_with('}') {
                self.cursor = prev.start;
            } else if let Some(span) = self.empty_structure_at(prev.start) {
                self.remove(span);
            } else {
                self.cursor = prev.start;
            }
        } else if text == "}" || is_delimiter(text, "\\right") {
            self.cursor = prev.start;
        } else if is_delimiter(text, "\\left") {
            match self.token_after() {
                Some(next) if is_delimiter(&self.content[next.clone()], "\\right") => {
                    self.remove(prev.start..next.end);
                }
                _ => self.cursor = prev.start,
            }
        } else {
            self.remove(prev);
        }
    }

    fn delete_forward(&mut self) {
        let Some(next) = self.token_after() else {
            return;
        };
        let text = &self.content[next.clone()];
        if matches!(text, "{" | "}") || is_delimiter(text, "\\left") || is_delimiter(text, "\\right")
        {
            return;
        }
        self.remove(next);
    }

    fn close_bracket(&mut self, close: char) {
        let closing = format!("\\right{close}");
        if self.content[self.cursor..].starts_with(&closing) {
            self.cursor += closing.len();
        } else {
            let mut buf = [0; 4];
            self.insert(close.encode_utf8(&mut buf), close.len_utf8());
        }
    }
}

impl MathSurface for MathField {
    fn write(&mut self, text: &str) -> Result<(), SurfaceError> {
        self.typing_word = false;
        if !braces_balanced(text) {
            return Err(SurfaceError::UnbalancedBraces(text.to_string()));
        }
        self.snap_cursor();
        if !text.is_empty() {
            self.write_text(text);
        }
        Ok(())
    }

    fn insert_command(&mut self, command: &str) -> Result<(), SurfaceError> {
        self.typing_word = false;
        self.snap_cursor();
        match command {
            "" => return Err(SurfaceError::EmptyCommand),
            "^" | "_" => self.insert_template(command, 1),
            "(" => self.insert("\\left(\\right)", "\\left(".len()),
            "[" => self.insert("\\left[\\right]", "\\left[".len()),
            "|" => self.insert("\\left|\\right|", "\\left|".len()),
            ")" => self.close_bracket(')'),
            "]" => self.close_bracket(']'),
            _ => {
                let name = command.strip_prefix('\\').unwrap_or(command);
                if name.is_empty() || !name.bytes().all(|b| b.is_ascii_alphabetic()) {
                    return Err(SurfaceError::UnknownCommand(command.to_string()));
                }
                let arity = TEMPLATE_COMMANDS
                    .iter()
                    .find(|(known, _)| *known == name)
                    .map_or(0, |&(_, arity)| arity);
                let head = format!("\\{name}");
                if arity == 0 {
                    self.write_text(&head);
                } else {
                    self.insert_template(&head, arity);
                }
            }
        }
        Ok(())
    }

    /// `{` opens an empty group, `}` steps out of one, and letters typed
    /// right after `\` extend that control word.
    fn type_text(&mut self, text: &str) -> Result<(), SurfaceError> {
        self.snap_cursor();
        let extends_word = self.typing_word && text.bytes().all(|b| b.is_ascii_alphabetic());
        self.typing_word = text == "\\" || extends_word;
        match text {
            "" => {}
            "{" => self.insert("{}", 1),
            "}" => {
                if !self.content[self.cursor..].starts_with('}') {
                    return Err(SurfaceError::UnbalancedBraces(text.to_string()));
                }
                self.cursor += 1;
            }
            _ if extends_word || text == "\\" => self.insert(text, text.len()),
            _ => {
                if !braces_balanced(text) {
                    return Err(SurfaceError::UnbalancedBraces(text.to_string()));
                }
                self.write_text(text);
            }
        }
        Ok(())
    }

    fn keystroke(&mut self, key: &str) -> Result<(), SurfaceError> {
        self.typing_word = false;
        self.snap_cursor();
        match key {
            "Left" => self.move_left(),
            "Right" => self.move_right(),
            "Home" => self.cursor = 0,
            "End" => self.cursor = self.content.len(),
            "Backspace" => self.backspace(),
            "Del" | "Delete" => self.delete_forward(),
            _ => return Err(SurfaceError::UnknownKeystroke(key.to_string())),
        }
        Ok(())
    }

    fn latex(&self) -> String {
        collapse_single_groups(&self.content)
    }

    fn set_latex(&mut self, latex: &str) {
        self.typing_word = false;
        self.content = latex.to_string();
        self.cursor = self.content.len();
    }

    fn focus(&mut self) {
        self.focused = true;
    }
}
