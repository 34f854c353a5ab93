//! Theming and color definitions.
//!
//! Uses ANSI colors that adapt to the terminal's color palette. A light
//! background is detected from `COLORFGBG` and darkens the accent colors.

use std::sync::LazyLock;

use ratatui::style::{Color, Modifier, Style};

use crate::app::ToastLevel;
use crate::markup::SegmentKind;

static LIGHT_BACKGROUND: LazyLock<bool> = LazyLock::new(|| {
    light_background_from_env(std::env::var("COLORFGBG").ok().as_deref())
});

pub fn is_light_background() -> bool {
    *LIGHT_BACKGROUND
}

/// `COLORFGBG` is `fg;bg` (sometimes `fg;default;bg`); background colors
/// 7 and 9..=15 are light.
fn light_background_from_env(colorfgbg: Option<&str>) -> bool {
    colorfgbg
        .and_then(|value| value.rsplit(';').next())
        .and_then(|bg| bg.trim().parse::<u8>().ok())
        .is_some_and(|bg| bg == 7 || (9..=15).contains(&bg))
}

fn accent(dark: Color, light: Color) -> Color {
    if is_light_background() { light } else { dark }
}

/// Style of one rendered piece of the answer preview.
pub fn style_for_segment(kind: SegmentKind, failed: bool) -> Style {
    if failed {
        return Style::default()
            .fg(accent(Color::Red, Color::Indexed(124)))
            .add_modifier(Modifier::ITALIC);
    }
    match kind {
        SegmentKind::Text => Style::default(),
        SegmentKind::Inline => Style::default().fg(accent(Color::Cyan, Color::Indexed(24))),
        SegmentKind::Block => Style::default()
            .fg(accent(Color::Cyan, Color::Indexed(24)))
            .add_modifier(Modifier::BOLD),
    }
}

/// Formula delimiters in the raw answer text.
pub fn formula_markup_style() -> Style {
    Style::default().fg(accent(Color::Yellow, Color::Indexed(136)))
}

pub fn key_style(selected: bool, focused: bool) -> Style {
    let base = Style::default().bg(Color::Indexed(238)).fg(Color::White);
    match (selected, focused) {
        (true, true) => base.bg(Color::Cyan).fg(Color::Black).add_modifier(Modifier::BOLD),
        (true, false) => base.add_modifier(Modifier::BOLD),
        _ => base,
    }
}

/// The small shortcut marker in a key's corner.
pub fn badge_style(key: Style) -> Style {
    key.fg(Color::Yellow).add_modifier(Modifier::DIM)
}

pub fn tab_style(active: bool) -> Style {
    if active {
        Style::default()
            .fg(accent(Color::Yellow, Color::Indexed(136)))
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
    } else {
        dim_style()
    }
}

pub fn dim_style() -> Style {
    Style::default().fg(Color::Indexed(245))
}

/// An action that cannot run right now.
pub fn disabled_style() -> Style {
    dim_style().add_modifier(Modifier::CROSSED_OUT)
}

pub fn cursor_style() -> Style {
    Style::default().bg(Color::White).fg(Color::Black)
}

pub fn toast_style(level: ToastLevel) -> (&'static str, Style) {
    match level {
        ToastLevel::Info => ("[info]", Style::default().bg(Color::DarkGray).fg(Color::White)),
        ToastLevel::Warning => ("[warn]", Style::default().bg(Color::Yellow).fg(Color::Black)),
        ToastLevel::Error => ("[error]", Style::default().bg(Color::Red).fg(Color::White)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_colorfgbg_light_background() {
        assert!(light_background_from_env(Some("0;15")));
        assert!(light_background_from_env(Some("0;default;7")));
        assert!(!light_background_from_env(Some("15;0")));
        assert!(!light_background_from_env(Some("garbage")));
        assert!(!light_background_from_env(None));
    }

    #[test]
    fn test_failed_segment_is_italic() {
        let style = style_for_segment(SegmentKind::Inline, true);
        assert!(style.add_modifier.contains(Modifier::ITALIC));
    }

    #[test]
    fn test_block_segment_is_bold() {
        let style = style_for_segment(SegmentKind::Block, false);
        assert!(style.add_modifier.contains(Modifier::BOLD));
        assert_eq!(style_for_segment(SegmentKind::Text, false), Style::default());
    }

    #[test]
    fn test_selected_focused_key_is_highlighted() {
        let style = key_style(true, true);
        assert_eq!(style.bg, Some(Color::Cyan));
        assert_ne!(key_style(false, true), style);
    }

    #[test]
    fn test_disabled_is_crossed_out() {
        assert!(disabled_style().add_modifier.contains(Modifier::CROSSED_OUT));
    }
}
