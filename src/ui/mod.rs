//! Terminal UI components.
//!
//! - [`render`]: the answer pane, its rendered preview and the status bar
//! - the formula modal and help overlays
//! - [`style`]: Theming and colors
//!
//! The layout helpers here are shared with mouse handling, so a click is
//! mapped against the same rectangles that were drawn.

pub mod style;

mod overlays;
mod render;
mod status;

use std::ops::Range;

use ratatui::layout::{Constraint, Direction, Layout, Rect};

use crate::commands::{CommandTable, KEYBOARD_COLUMNS, keyboard_rows};
use crate::modal::Tab;

pub use render::render;

/// Formula modal size, borders included.
pub const MODAL_WIDTH: u16 = 54;
pub const MODAL_HEIGHT: u16 = 18;

/// Blank rows between keyboard rows.
const KEY_ROW_GAP: u16 = 1;
/// Blank columns between keys.
const KEY_COL_GAP: u16 = 1;

/// Areas of the main screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MainLayout {
    pub answer: Rect,
    pub preview: Rect,
    /// Row above the status bar, used by toasts
    pub toast: Rect,
    pub status: Rect,
}

pub fn main_layout(area: Rect) -> MainLayout {
    let content = Rect {
        height: area.height.saturating_sub(1),
        ..area
    };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Min(3)])
        .split(content);
    let status = Rect {
        y: area.y + area.height.saturating_sub(1),
        height: area.height.min(1),
        ..area
    };
    let toast = Rect {
        y: status.y.saturating_sub(1),
        height: u16::from(area.height >= 2),
        ..area
    };
    MainLayout {
        answer: chunks[0],
        preview: chunks[1],
        toast,
        status,
    }
}

/// Answer lines that fit in the answer pane at this terminal size.
pub fn answer_visible_rows(terminal_size: (u16, u16)) -> usize {
    let (width, height) = terminal_size;
    let layout = main_layout(Rect::new(0, 0, width, height));
    layout.answer.height.saturating_sub(2) as usize
}

/// Areas of the formula modal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModalLayout {
    pub popup: Rect,
    pub tabs: Rect,
    /// The bordered formula field
    pub field: Rect,
    /// One line showing the formula as it will render
    pub preview: Rect,
    pub keyboard: Rect,
    /// The history list, covering field, preview and keyboard
    pub history: Rect,
    pub footer: Rect,
}

pub fn modal_layout(area: Rect) -> ModalLayout {
    let popup = centered_popup_rect(MODAL_WIDTH, MODAL_HEIGHT, area);
    // Border plus two columns of horizontal padding
    let inner = Rect::new(
        popup.x + 3,
        popup.y + 1,
        popup.width.saturating_sub(6),
        popup.height.saturating_sub(2),
    );
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(inner);
    let history = Rect {
        height: chunks[1].height + chunks[2].height + chunks[3].height + chunks[4].height,
        ..chunks[1]
    };
    ModalLayout {
        popup,
        tabs: chunks[0],
        field: chunks[1],
        preview: chunks[2],
        keyboard: chunks[4],
        history,
        footer: chunks[5],
    }
}

/// Screen rectangle of every on-screen key, by command index.
///
/// Keys are clipped to `keyboard`; keys that do not fit at all are left out.
pub fn key_rects(keyboard: Rect, table: &CommandTable) -> Vec<(usize, Rect)> {
    let commands = table.all_commands();
    let key_width = keyboard
        .width
        .saturating_sub(KEY_COL_GAP * (KEYBOARD_COLUMNS - 1))
        / KEYBOARD_COLUMNS;
    let key_width = key_width.max(1);
    let mut rects = Vec::with_capacity(commands.len());
    for (row_idx, row) in keyboard_rows(commands).iter().enumerate() {
        let Ok(row_idx) = u16::try_from(row_idx) else {
            break;
        };
        let y = keyboard.y + row_idx * (1 + KEY_ROW_GAP);
        if y >= keyboard.y + keyboard.height {
            break;
        }
        let mut column = 0;
        for &idx in row {
            let span = commands[idx].span;
            let x = keyboard.x + column * (key_width + KEY_COL_GAP);
            let width = span * key_width + span.saturating_sub(1) * KEY_COL_GAP;
            let rect = Rect::new(x, y, width, 1).intersection(keyboard);
            if !rect.is_empty() {
                rects.push((idx, rect));
            }
            column += span;
        }
    }
    rects
}

/// Command index of the on-screen key at a screen position.
pub fn key_at(keyboard: Rect, table: &CommandTable, column: u16, row: u16) -> Option<usize> {
    key_rects(keyboard, table)
        .into_iter()
        .find(|(_, rect)| point_in_rect(column, row, *rect))
        .map(|(idx, _)| idx)
}

/// The tab whose title is at a screen position.
pub fn tab_at(tabs: Rect, column: u16, row: u16) -> Option<Tab> {
    if !point_in_rect(column, row, tabs) {
        return None;
    }
    if column < tabs.x + tabs.width / 2 {
        Some(Tab::Editor)
    } else {
        Some(Tab::History)
    }
}

/// History entries shown in a list of `height` rows, keeping `selected`
/// in view.
pub fn history_window(len: usize, selected: usize, height: u16) -> Range<usize> {
    let height = height as usize;
    if height == 0 {
        return 0..0;
    }
    let start = selected.saturating_sub(height - 1).min(len.saturating_sub(height));
    start..(start + height).min(len)
}

/// History index of the list row at a screen position.
pub fn history_row_at(
    history: Rect,
    len: usize,
    selected: usize,
    column: u16,
    row: u16,
) -> Option<usize> {
    if !point_in_rect(column, row, history) {
        return None;
    }
    let window = history_window(len, selected, history.height);
    let idx = window.start + (row - history.y) as usize;
    window.contains(&idx).then_some(idx)
}

pub const fn point_in_rect(column: u16, row: u16, rect: Rect) -> bool {
    column >= rect.x
        && column < rect.x + rect.width
        && row >= rect.y
        && row < rect.y + rect.height
}

pub(crate) fn centered_popup_rect(width: u16, height: u16, area: Rect) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(w) / 2);
    let y = area.y + (area.height.saturating_sub(h) / 2);
    Rect::new(x, y, w, h)
}

#[cfg(test)]
mod tests;
