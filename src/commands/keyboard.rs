use super::{ChordSpec, SymbolCommand};

/// Width of the on-screen keyboard grid.
pub const KEYBOARD_COLUMNS: u16 = 7;

/// The chemistry keyboard, row by row.
pub fn chemistry_keyboard() -> Vec<SymbolCommand> {
    vec![
        // Digits, plus, brackets, superscript
        SymbolCommand::write("7", "7"),
        SymbolCommand::write("8", "8"),
        SymbolCommand::write("9", "9"),
        SymbolCommand::write("+", "+").with_shortcut(ChordSpec::alt_shift('=')),
        SymbolCommand::command("(", "("),
        SymbolCommand::command(")", ")"),
        SymbolCommand::command("Sup", "^")
            .with_title("Superscript xʸ")
            .with_shortcut(ChordSpec::alt_shift('6')),
        // Digits, charge, subscript, arrows
        SymbolCommand::write("4", "4"),
        SymbolCommand::write("5", "5"),
        SymbolCommand::write("6", "6"),
        SymbolCommand::write("-", "-"),
        SymbolCommand::command("Sub", "_")
            .with_title("Subscript xᵧ")
            .with_shortcut(ChordSpec::alt_shift('-')),
        SymbolCommand::write("→", "\\rightarrow")
            .with_title("Reaction Arrow")
            .with_shortcut(ChordSpec::alt_shift('.')),
        SymbolCommand::write("⇌", "\\rightleftharpoons")
            .with_title("Reversible Arrow")
            .with_shortcut(ChordSpec::alt_shift(',')),
        // Digits, equals, elements
        SymbolCommand::write("1", "1"),
        SymbolCommand::write("2", "2"),
        SymbolCommand::write("3", "3"),
        SymbolCommand::write("=", "="),
        SymbolCommand::write("H", "H"),
        SymbolCommand::write("C", "C"),
        SymbolCommand::write("O", "O"),
        // Zero, dot, phases
        SymbolCommand::write("0", "0"),
        SymbolCommand::write(".", "."),
        SymbolCommand::write("(s)", "(s)"),
        SymbolCommand::write("(l)", "(l)"),
        SymbolCommand::write("(g)", "(g)"),
        SymbolCommand::write("(aq)", "(aq)"),
        SymbolCommand::write("N", "N"),
        // Navigation and control
        SymbolCommand::keystroke("←", "Left"),
        SymbolCommand::keystroke("→", "Right"),
        SymbolCommand::keystroke("Bksp", "Backspace").with_span(2),
        SymbolCommand::clear("Clear").with_span(3),
    ]
}

/// Split the keyboard into grid rows of [`KEYBOARD_COLUMNS`] columns.
///
/// Each row holds command indices; a key never straddles two rows.
pub fn keyboard_rows(commands: &[SymbolCommand]) -> Vec<Vec<usize>> {
    let mut rows = Vec::new();
    let mut row = Vec::new();
    let mut used = 0;
    for (idx, cmd) in commands.iter().enumerate() {
        let span = cmd.span.min(KEYBOARD_COLUMNS);
        if used + span > KEYBOARD_COLUMNS && !row.is_empty() {
            rows.push(std::mem::take(&mut row));
            used = 0;
        }
        row.push(idx);
        used += span;
    }
    if !row.is_empty() {
        rows.push(row);
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chemistry_keyboard_fills_five_rows() {
        let keys = chemistry_keyboard();
        assert_eq!(keys.len(), 34);
        let rows = keyboard_rows(&keys);
        assert_eq!(rows.len(), 5);
        for row in &rows {
            let width: u16 = row.iter().map(|&i| keys[i].span).sum();
            assert_eq!(width, KEYBOARD_COLUMNS);
        }
    }

    #[test]
    fn test_wide_keys_wrap_to_next_row() {
        let keys = vec![
            SymbolCommand::write("a", "a").with_span(4),
            SymbolCommand::write("b", "b").with_span(4),
        ];
        assert_eq!(keyboard_rows(&keys), vec![vec![0], vec![1]]);
    }
}
