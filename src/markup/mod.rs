//! Split free text into literal text and `$`/`$$` delimited math.
//!
//! A single forward scan: `$$...$$` (block) is tried before `$...$`
//! (inline) at each position, inline math never spans a `$` or a newline,
//! and unterminated delimiters stay in the surrounding text.

use std::sync::LazyLock;

use regex::Regex;

static MATH_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\$\$[\s\S]*?\$\$)|(\$[^$\n]*?\$)").expect("math delimiter pattern is valid")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentKind {
    Text,
    Inline,
    Block,
}

/// A contiguous span of the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub kind: SegmentKind,
    /// Text without delimiters
    pub content: String,
}

impl Segment {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            kind: SegmentKind::Text,
            content: content.into(),
        }
    }

    pub fn inline(content: impl Into<String>) -> Self {
        Self {
            kind: SegmentKind::Inline,
            content: content.into(),
        }
    }

    pub fn block(content: impl Into<String>) -> Self {
        Self {
            kind: SegmentKind::Block,
            content: content.into(),
        }
    }

    pub const fn is_math(&self) -> bool {
        !matches!(self.kind, SegmentKind::Text)
    }

    /// The segment as it appeared in the input, delimiters included.
    pub fn to_markup(&self) -> String {
        match self.kind {
            SegmentKind::Text => self.content.clone(),
            SegmentKind::Inline => format!("${}$", self.content),
            SegmentKind::Block => format!("$${}$$", self.content),
        }
    }
}

/// Partition `text` into ordered segments covering all of it.
pub fn segment(text: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut last = 0;
    for caps in MATH_PATTERN.captures_iter(text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        if whole.start() > last {
            segments.push(Segment::text(&text[last..whole.start()]));
        }
        let matched = whole.as_str();
        if caps.get(1).is_some() {
            segments.push(Segment::block(&matched[2..matched.len() - 2]));
        } else {
            segments.push(Segment::inline(&matched[1..matched.len() - 1]));
        }
        last = whole.end();
    }
    if last < text.len() {
        segments.push(Segment::text(&text[last..]));
    }
    segments
}

/// Reassemble segments into markup.
pub fn join(segments: &[Segment]) -> String {
    segments.iter().map(Segment::to_markup).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_segments_mixed_text() {
        let segments = segment("Example: $$H_2O$$ and $SO_4^{2-}$.");
        assert_eq!(
            segments,
            vec![
                Segment::text("Example: "),
                Segment::block("H_2O"),
                Segment::text(" and "),
                Segment::inline("SO_4^{2-}"),
                Segment::text("."),
            ]
        );
    }

    #[test]
    fn test_empty_input_has_no_segments() {
        assert!(segment("").is_empty());
    }

    #[test]
    fn test_plain_text_is_one_segment() {
        assert_eq!(segment("no math  here\n"), vec![Segment::text("no math  here\n")]);
    }

    #[test]
    fn test_block_may_span_lines_inline_may_not() {
        assert_eq!(
            segment("$$a\nb$$"),
            vec![Segment::block("a\nb")]
        );
        assert_eq!(segment("$a\nb$"), vec![Segment::text("$a\nb$")]);
    }

    #[test]
    fn test_unterminated_delimiters_stay_text() {
        assert_eq!(segment("cost $5"), vec![Segment::text("cost $5")]);
        assert_eq!(
            segment("$$H_2 and more"),
            vec![Segment::text("$$H_2 and more")]
        );
    }

    #[test]
    fn test_block_wins_at_same_position() {
        assert_eq!(
            segment("$$x$$ $y$"),
            vec![Segment::block("x"), Segment::text(" "), Segment::inline("y")]
        );
    }

    #[test]
    fn test_adjacent_inline_segments() {
        assert_eq!(
            segment("$a$$b$"),
            vec![Segment::inline("a"), Segment::inline("b")]
        );
    }

    #[test]
    fn test_to_markup_rewraps() {
        assert_eq!(Segment::block("x").to_markup(), "$$x$$");
        assert_eq!(Segment::inline("x").to_markup(), "$x$");
        assert!(Segment::inline("x").is_math());
        assert!(!Segment::text("x").is_math());
    }

    proptest! {
        #[test]
        fn segmentation_round_trips(text in "[ab$\n {}^_]{0,48}") {
            prop_assert_eq!(join(&segment(&text)), text);
        }

        #[test]
        fn segmentation_round_trips_any_text(text in any::<String>()) {
            prop_assert_eq!(join(&segment(&text)), text);
        }

        #[test]
        fn segments_never_empty_text(text in "[ab$\n ]{0,48}") {
            for seg in segment(&text) {
                if seg.kind == SegmentKind::Text {
                    prop_assert!(!seg.content.is_empty());
                }
                if seg.kind == SegmentKind::Inline {
                    prop_assert!(!seg.content.contains('$') && !seg.content.contains('\n'));
                }
            }
        }
    }
}
