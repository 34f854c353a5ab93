//! A plain-text LaTeX renderer for terminal output.
//!
//! Handles the subset chemistry formulas use: scripts, arrows, Greek
//! letters, `\frac`, `\sqrt`, text wrappers and `\ce{}` with its
//! automatic subscripts and charges. Anything outside that subset is an
//! error rather than a guess.

use super::{MathRenderer, MathStyle, RenderError};

#[derive(Debug, Clone, Copy, Default)]
pub struct UnicodeRenderer;

impl UnicodeRenderer {
    pub const fn new() -> Self {
        Self
    }
}

impl MathRenderer for UnicodeRenderer {
    fn render(&self, latex: &str, style: MathStyle) -> Result<String, RenderError> {
        let mut parser = Parser::new(latex);
        let rendered = parser.sequence(Mode::Math, false)?;
        Ok(match style {
            MathStyle::Inline => rendered,
            MathStyle::Block => rendered.trim().to_string(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Math,
    /// Spaces are kept, nothing else changes
    Text,
    /// mhchem: digits after an atom subscript, trailing charges superscript
    Chem,
}

/// Deepest group or command nesting rendered before giving up.
const MAX_NESTING: usize = 256;

struct Parser {
    chars: Vec<char>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn new(src: &str) -> Self {
        Self {
            chars: src.chars().collect(),
            pos: 0,
            depth: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn skip_spaces(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    /// Run `parse` one nesting level deeper.
    fn nested<F>(&mut self, parse: F) -> Result<String, RenderError>
    where
        F: FnOnce(&mut Self) -> Result<String, RenderError>,
    {
        if self.depth >= MAX_NESTING {
            return Err(RenderError::TooDeep(MAX_NESTING));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    /// Parse until end of input, or until the closing `}` when `in_group`.
    fn sequence(&mut self, mode: Mode, in_group: bool) -> Result<String, RenderError> {
        if in_group {
            self.nested(|p| p.sequence_body(mode, true))
        } else {
            self.sequence_body(mode, false)
        }
    }

    fn sequence_body(&mut self, mode: Mode, in_group: bool) -> Result<String, RenderError> {
        let mut out = String::new();
        // Previous raw character, for mhchem subscripting
        let mut prev: Option<char> = None;
        let mut sub_run = false;
        loop {
            let mut subscripted = false;
            let Some(c) = self.bump() else {
                if in_group {
                    return Err(RenderError::UnbalancedBraces);
                }
                return Ok(out);
            };
            match c {
                '}' => {
                    if in_group {
                        return Ok(out);
                    }
                    return Err(RenderError::UnbalancedBraces);
                }
                '{' => out.push_str(&self.sequence(mode, true)?),
                '^' | '_' => {
                    let arg = self.argument(mode, c)?;
                    out.push_str(&script(&arg, c == '^'));
                }
                '\\' => out.push_str(&self.command(mode)?),
                '~' if mode != Mode::Text => out.push(' '),
                c if c.is_whitespace() => {
                    if mode != Mode::Math && !out.ends_with(' ') {
                        out.push(' ');
                    }
                }
                c if mode == Mode::Chem => {
                    if let Some(arrow) = self.chem_arrow(c) {
                        out.push_str(arrow);
                    } else if c.is_ascii_digit()
                        && (sub_run || prev.is_some_and(|p| p.is_ascii_alphabetic() || p == ')'))
                    {
                        out.push_str(&script(&c.to_string(), false));
                        subscripted = true;
                    } else if matches!(c, '+' | '-')
                        && prev.is_some_and(|p| p.is_ascii_alphanumeric() || p == ')')
                        && self.peek().is_none_or(|n| n.is_whitespace() || n == '(')
                    {
                        out.push_str(&script(&c.to_string(), true));
                    } else {
                        out.push(c);
                    }
                }
                '-' if mode == Mode::Math => out.push('−'),
                c => out.push(c),
            }
            prev = Some(c);
            sub_run = subscripted;
        }
    }

    /// mhchem reaction arrows, consuming the rest of the arrow on a match.
    fn chem_arrow(&mut self, first: char) -> Option<&'static str> {
        let rest: String = (0..2).filter_map(|i| self.peek_at(i)).collect();
        let (arrow, len) = match (first, rest.as_str()) {
            ('<', s) if s.starts_with("=>") => ("⇌", 2),
            ('<', s) if s.starts_with("->") => ("↔", 2),
            ('<', s) if s.starts_with('-') => ("←", 1),
            ('-', s) if s.starts_with('>') => ("→", 1),
            _ => return None,
        };
        self.pos += len;
        Some(arrow)
    }

    /// A single required argument: a group, a control sequence, or one char.
    fn argument(&mut self, mode: Mode, owner: char) -> Result<String, RenderError> {
        self.skip_spaces();
        match self.peek() {
            None | Some('}') => Err(RenderError::MissingArgument(owner.to_string())),
            Some('{') => {
                self.pos += 1;
                self.sequence(mode, true)
            }
            Some('\\') => {
                self.pos += 1;
                self.command(mode)
            }
            Some(c) => {
                self.pos += 1;
                Ok(c.to_string())
            }
        }
    }

    fn group_argument(&mut self, name: &str, mode: Mode) -> Result<String, RenderError> {
        self.skip_spaces();
        match self.peek() {
            Some('{') => {
                self.pos += 1;
                self.sequence(mode, true)
            }
            None | Some('}') => Err(RenderError::MissingArgument(format!("\\{name}"))),
            Some(_) => self.argument(mode, '\\'),
        }
    }

    /// Everything after a backslash.
    fn command(&mut self, mode: Mode) -> Result<String, RenderError> {
        self.nested(|p| p.command_body(mode))
    }

    fn command_body(&mut self, mode: Mode) -> Result<String, RenderError> {
        let Some(first) = self.bump() else {
            return Err(RenderError::MissingArgument("\\".to_string()));
        };
        if !first.is_ascii_alphabetic() {
            return Ok(match first {
                ',' | ';' | ':' | ' ' | '!' => " ".to_string(),
                other => other.to_string(),
            });
        }
        let mut name = String::from(first);
        while let Some(c) = self.peek().filter(char::is_ascii_alphabetic) {
            name.push(c);
            self.pos += 1;
        }

        if let Some(symbol) = symbol(&name) {
            return Ok(symbol.to_string());
        }
        match name.as_str() {
            "ce" => self.group_argument(&name, Mode::Chem),
            "text" | "textrm" | "mathrm" | "mathbf" | "mathit" | "operatorname" => {
                self.group_argument(&name, Mode::Text)
            }
            "frac" | "dfrac" | "tfrac" => {
                let num = self.group_argument(&name, mode)?;
                let den = self.group_argument(&name, mode)?;
                Ok(format!("{}/{}", wrap(&num), wrap(&den)))
            }
            "sqrt" => {
                let arg = self.group_argument(&name, mode)?;
                Ok(format!("√{}", wrap(&arg)))
            }
            "left" | "right" | "big" | "Big" | "bigl" | "bigr" => {
                self.skip_spaces();
                match self.bump() {
                    None => Err(RenderError::MissingArgument(format!("\\{name}"))),
                    Some('.') => Ok(String::new()),
                    Some('\\') => self.command(mode),
                    Some(c) => Ok(c.to_string()),
                }
            }
            "quad" | "qquad" => Ok(" ".to_string()),
            _ => Err(RenderError::UnknownCommand(name)),
        }
    }
}

/// Parenthesize multi-character operands.
fn wrap(s: &str) -> String {
    if s.chars().count() <= 1 {
        s.to_string()
    } else {
        format!("({s})")
    }
}

/// Raise or lower `text`, falling back to `^(..)`/`_(..)` when some
/// character has no Unicode script form.
fn script(text: &str, superscript: bool) -> String {
    let map = if superscript { superscript_char } else { subscript_char };
    if let Some(mapped) = text.chars().map(map).collect::<Option<String>>() {
        return mapped;
    }
    let marker = if superscript { '^' } else { '_' };
    if text.chars().count() == 1 {
        format!("{marker}{text}")
    } else {
        format!("{marker}({text})")
    }
}

const fn superscript_char(c: char) -> Option<char> {
    Some(match c {
        '0' => '⁰',
        '1' => '¹',
        '2' => '²',
        '3' => '³',
        '4' => '⁴',
        '5' => '⁵',
        '6' => '⁶',
        '7' => '⁷',
        '8' => '⁸',
        '9' => '⁹',
        '+' => '⁺',
        '-' | '−' => '⁻',
        '=' => '⁼',
        '(' => '⁽',
        ')' => '⁾',
        'n' => 'ⁿ',
        'i' => 'ⁱ',
        '•' | '·' => '•',
        _ => return None,
    })
}

const fn subscript_char(c: char) -> Option<char> {
    Some(match c {
        '0' => '₀',
        '1' => '₁',
        '2' => '₂',
        '3' => '₃',
        '4' => '₄',
        '5' => '₅',
        '6' => '₆',
        '7' => '₇',
        '8' => '₈',
        '9' => '₉',
        '+' => '₊',
        '-' | '−' => '₋',
        '=' => '₌',
        '(' => '₍',
        ')' => '₎',
        'a' => 'ₐ',
        'e' => 'ₑ',
        'h' => 'ₕ',
        'i' => 'ᵢ',
        'j' => 'ⱼ',
        'k' => 'ₖ',
        'l' => 'ₗ',
        'm' => 'ₘ',
        'n' => 'ₙ',
        'o' => 'ₒ',
        'p' => 'ₚ',
        'r' => 'ᵣ',
        's' => 'ₛ',
        't' => 'ₜ',
        'u' => 'ᵤ',
        'v' => 'ᵥ',
        'x' => 'ₓ',
        _ => return None,
    })
}

fn symbol(name: &str) -> Option<&'static str> {
    Some(match name {
        "rightarrow" | "to" => "→",
        "leftarrow" | "gets" => "←",
        "leftrightarrow" => "↔",
        "rightleftharpoons" => "⇌",
        "longrightarrow" => "⟶",
        "longleftarrow" => "⟵",
        "Rightarrow" => "⇒",
        "Leftarrow" => "⇐",
        "uparrow" => "↑",
        "downarrow" => "↓",
        "cdot" => "·",
        "bullet" => "•",
        "times" => "×",
        "div" => "÷",
        "pm" => "±",
        "mp" => "∓",
        "circ" | "degree" => "°",
        "infty" => "∞",
        "approx" => "≈",
        "neq" | "ne" => "≠",
        "leq" | "le" => "≤",
        "geq" | "ge" => "≥",
        "equiv" => "≡",
        "propto" => "∝",
        "partial" => "∂",
        "sum" => "∑",
        "int" => "∫",
        "ldots" | "dots" => "…",
        "cdots" => "⋯",
        "prime" => "′",
        "hbar" => "ℏ",
        "ell" => "ℓ",
        "alpha" => "α",
        "beta" => "β",
        "gamma" => "γ",
        "Gamma" => "Γ",
        "delta" => "δ",
        "Delta" => "Δ",
        "epsilon" | "varepsilon" => "ε",
        "eta" => "η",
        "theta" => "θ",
        "Theta" => "Θ",
        "kappa" => "κ",
        "lambda" => "λ",
        "Lambda" => "Λ",
        "mu" => "μ",
        "nu" => "ν",
        "pi" => "π",
        "Pi" => "Π",
        "rho" => "ρ",
        "sigma" => "σ",
        "Sigma" => "Σ",
        "tau" => "τ",
        "phi" | "varphi" => "φ",
        "Phi" => "Φ",
        "chi" => "χ",
        "psi" => "ψ",
        "Psi" => "Ψ",
        "omega" => "ω",
        "Omega" => "Ω",
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inline(latex: &str) -> Result<String, RenderError> {
        UnicodeRenderer::new().render(latex, MathStyle::Inline)
    }

    #[test]
    fn test_scripts_use_unicode_forms() {
        assert_eq!(inline("H_2O").unwrap(), "H₂O");
        assert_eq!(inline("SO_4^{2-}").unwrap(), "SO₄²⁻");
        assert_eq!(inline("x^{n+1}").unwrap(), "xⁿ⁺¹");
    }

    #[test]
    fn test_scripts_without_unicode_form_fall_back() {
        assert_eq!(inline("E_{act}").unwrap(), "E_(act)");
        assert_eq!(inline("K_b").unwrap(), "K_b");
    }

    #[test]
    fn test_arrows_and_states() {
        assert_eq!(
            inline("2H_2+O_2\\rightarrow 2H_2O(l)").unwrap(),
            "2H₂+O₂→2H₂O(l)"
        );
        assert_eq!(inline("A\\rightleftharpoons B").unwrap(), "A⇌B");
    }

    #[test]
    fn test_ce_subscripts_charges_and_arrows() {
        assert_eq!(
            inline("\\ce{2H2 + O2 -> 2H2O}").unwrap(),
            "2H₂ + O₂ → 2H₂O"
        );
        assert_eq!(
            inline("\\ce{H2O(l) <=> H+(aq) + OH-(aq)}").unwrap(),
            "H₂O(l) ⇌ H⁺(aq) + OH⁻(aq)"
        );
        assert_eq!(inline("\\ce{Ca(OH)2}").unwrap(), "Ca(OH)₂");
        assert_eq!(inline("\\ce{12C6H12O6}").unwrap(), "12C₆H₁₂O₆");
    }

    #[test]
    fn test_frac_sqrt_and_delimiters() {
        assert_eq!(inline("\\frac{1}{2}").unwrap(), "1/2");
        assert_eq!(inline("\\frac{a+b}{c}").unwrap(), "(a+b)/c");
        assert_eq!(inline("\\sqrt{x}").unwrap(), "√x");
        assert_eq!(inline("\\left( x \\right)").unwrap(), "(x)");
        assert_eq!(inline("\\Delta H").unwrap(), "ΔH");
    }

    #[test]
    fn test_text_keeps_spaces() {
        assert_eq!(inline("\\text{rate of k}").unwrap(), "rate of k");
        assert_eq!(inline("a b").unwrap(), "ab");
    }

    #[test]
    fn test_block_output_is_trimmed() {
        let renderer = UnicodeRenderer::new();
        assert_eq!(
            renderer.render(" \\text{ x } ", MathStyle::Block).unwrap(),
            "x"
        );
    }

    #[test]
    fn test_errors() {
        assert_eq!(inline("H_{2"), Err(RenderError::UnbalancedBraces));
        assert_eq!(inline("H}"), Err(RenderError::UnbalancedBraces));
        assert!(matches!(inline("x^"), Err(RenderError::MissingArgument(_))));
        assert_eq!(
            inline("\\nonsense"),
            Err(RenderError::UnknownCommand("nonsense".to_string()))
        );
        assert!(matches!(
            inline("\\frac{1}"),
            Err(RenderError::MissingArgument(_))
        ));
    }

    #[test]
    fn test_deep_nesting_is_an_error() {
        let deep = format!("{}x{}", "{".repeat(200_000), "}".repeat(200_000));
        assert_eq!(inline(&deep), Err(RenderError::TooDeep(MAX_NESTING)));
        let roots = format!("{}x", "\\sqrt".repeat(100_000));
        assert_eq!(inline(&roots), Err(RenderError::TooDeep(MAX_NESTING)));

        let shallow = format!("{}x{}", "{".repeat(100), "}".repeat(100));
        assert_eq!(inline(&shallow).as_deref(), Ok("x"));
    }

    #[test]
    fn test_empty_math_renders_empty() {
        assert_eq!(inline("").unwrap(), "");
    }
}
