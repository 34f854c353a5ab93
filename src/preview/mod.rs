//! Rendering of segmented markup for the preview pane.
//!
//! Each math segment is handed to a [`MathRenderer`] on its own. A segment
//! the renderer rejects is replaced by a visible placeholder; its siblings
//! still render.

mod unicode;

pub use unicode::UnicodeRenderer;

use crate::markup::{Segment, SegmentKind};

/// Placeholder shown for inline math that failed to render.
pub const INLINE_PLACEHOLDER: &str = "$[Invalid Input]$";
/// Placeholder shown for block math that failed to render.
pub const BLOCK_PLACEHOLDER: &str = "$$[Invalid Input]$$";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathStyle {
    Inline,
    Block,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    #[error("unbalanced braces")]
    UnbalancedBraces,
    #[error("`{0}` has no argument")]
    MissingArgument(String),
    #[error("unknown command \\{0}")]
    UnknownCommand(String),
    #[error("nested more than {0} levels deep")]
    TooDeep(usize),
}

/// Turns LaTeX into displayable text.
pub trait MathRenderer {
    fn render(&self, latex: &str, style: MathStyle) -> Result<String, RenderError>;
}

/// One rendered piece of the preview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewItem {
    pub kind: SegmentKind,
    pub text: String,
    /// Rendering failed and `text` is a placeholder
    pub failed: bool,
}

/// Render every segment, isolating failures to the segment that caused them.
pub fn render_segments(segments: &[Segment], renderer: &dyn MathRenderer) -> Vec<PreviewItem> {
    segments
        .iter()
        .map(|segment| {
            let style = match segment.kind {
                SegmentKind::Text => {
                    return PreviewItem {
                        kind: SegmentKind::Text,
                        text: segment.content.clone(),
                        failed: false,
                    };
                }
                SegmentKind::Inline => MathStyle::Inline,
                SegmentKind::Block => MathStyle::Block,
            };
            match renderer.render(&segment.content, style) {
                Ok(text) => PreviewItem {
                    kind: segment.kind,
                    text,
                    failed: false,
                },
                Err(err) => {
                    tracing::error!(
                        math = %segment.content,
                        ?style,
                        error = %err,
                        "math segment failed to render"
                    );
                    let placeholder = match style {
                        MathStyle::Inline => INLINE_PLACEHOLDER,
                        MathStyle::Block => BLOCK_PLACEHOLDER,
                    };
                    PreviewItem {
                        kind: segment.kind,
                        text: placeholder.to_string(),
                        failed: true,
                    }
                }
            }
        })
        .collect()
}
