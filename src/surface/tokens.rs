use std::ops::Range;

/// Split LaTeX into cursor atoms.
///
/// A control word (`\alpha`) is one atom together with a single trailing
/// separator space; `\left(` and `\right)` are one atom each including
/// their delimiter; every other character is its own atom.
pub fn token_ranges(s: &str) -> Vec<Range<usize>> {
    let bytes = s.as_bytes();
    let mut out = Vec::new();
    let mut i = 0;
    while i < s.len() {
        let start = i;
        if bytes[i] == b'\\' {
            i += 1;
            let letters = bytes[i..]
                .iter()
                .take_while(|b| b.is_ascii_alphabetic())
                .count();
            if letters > 0 {
                let word = &s[i..i + letters];
                i += letters;
                if matches!(word, "left" | "right") && i < s.len() {
                    if bytes[i] == b'\\' && i + 1 < s.len() {
                        i += 1 + char_len(s, i + 1);
                    } else {
                        i += char_len(s, i);
                    }
                } else if bytes.get(i) == Some(&b' ') {
                    i += 1;
                }
            } else if i < s.len() {
                i += char_len(s, i);
            }
        } else {
            i += char_len(s, i);
        }
        out.push(start..i);
    }
    out
}

fn char_len(s: &str, i: usize) -> usize {
    s[i..].chars().next().map_or(1, char::len_utf8)
}

/// Whether `s` ends in a control word such as `\rightarrow`.
pub fn ends_with_control_word(s: &str) -> bool {
    let stem = s.trim_end_matches(|c: char| c.is_ascii_alphabetic());
    stem.len() < s.len() && stem.ends_with('\\') && !stem.ends_with("\\\\")
}

/// Unescaped braces open and close in order and all close.
pub fn braces_balanced(s: &str) -> bool {
    let mut depth = 0_i32;
    let mut escaped = false;
    for ch in s.chars() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' => escaped = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0
}

/// Collapse `^{x}` and `_{x}` to `^x` and `_x` for single alphanumerics.
pub fn collapse_single_groups(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len());
    let mut i = 0;
    while i < chars.len() {
        let ch = chars[i];
        let escaped = i > 0 && chars[i - 1] == '\\';
        if matches!(ch, '^' | '_')
            && !escaped
            && chars.get(i + 1) == Some(&'{')
            && chars.get(i + 2).is_some_and(char::is_ascii_alphanumeric)
            && chars.get(i + 3) == Some(&'}')
        {
            out.push(ch);
            out.push(chars[i + 2]);
            i += 4;
            continue;
        }
        out.push(ch);
        i += 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(s: &str) -> Vec<&str> {
        token_ranges(s).into_iter().map(|r| &s[r]).collect()
    }

    #[test]
    fn test_tokens_group_control_words() {
        assert_eq!(texts("H_2O\\rightarrow"), ["H", "_", "2", "O", "\\rightarrow"]);
        assert_eq!(texts("\\alpha x"), ["\\alpha ", "x"]);
        assert_eq!(texts("\\left(a\\right)"), ["\\left(", "a", "\\right)"]);
        assert_eq!(texts("\\left\\{\\right\\}"), ["\\left\\{", "\\right\\}"]);
        assert_eq!(texts("\\,→"), ["\\,", "→"]);
    }

    #[test]
    fn test_ends_with_control_word() {
        assert!(ends_with_control_word("O\\rightarrow"));
        assert!(!ends_with_control_word("HO"));
        assert!(!ends_with_control_word("a\\\\b"));
    }

    #[test]
    fn test_braces_balanced() {
        assert!(braces_balanced("\\frac{a}{b}"));
        assert!(braces_balanced("\\{"));
        assert!(!braces_balanced("}{"));
        assert!(!braces_balanced("^{2"));
    }

    #[test]
    fn test_collapse_single_groups() {
        assert_eq!(collapse_single_groups("H_{2}O^{2-}"), "H_2O^{2-}");
        assert_eq!(collapse_single_groups("x^{}"), "x^{}");
        assert_eq!(collapse_single_groups("\\_{a}"), "\\_{a}");
    }
}
