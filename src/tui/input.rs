//! Key routing for the dashboard.
//!
//! While the search box is focused, printable keys edit the search input;
//! control chords keep working everywhere.

#![allow(missing_docs)]

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::queue::view::ViewMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    Quit,
    /// Reload the snapshot silently.
    Refresh,
    /// Reload the snapshot and announce it.
    RefreshWithNotice,
    FocusSearch,
    LeaveSearch,
    SearchInsert(char),
    SearchBackspace,
    ToggleView,
    SetView(ViewMode),
    CycleFilter,
    CycleSort,
    Export,
    Scroll(ScrollStep),
}

/// Movement of the queue area viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollStep {
    LineUp,
    LineDown,
    PageUp,
    PageDown,
    Top,
    Bottom,
}

fn scroll_step(code: KeyCode) -> Option<ScrollStep> {
    match code {
        KeyCode::Up => Some(ScrollStep::LineUp),
        KeyCode::Down => Some(ScrollStep::LineDown),
        KeyCode::PageUp => Some(ScrollStep::PageUp),
        KeyCode::PageDown => Some(ScrollStep::PageDown),
        KeyCode::Home => Some(ScrollStep::Top),
        KeyCode::End => Some(ScrollStep::Bottom),
        _ => None,
    }
}

fn is_command_chord(modifiers: KeyModifiers) -> bool {
    modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::SUPER)
}

/// Resolve a key event to an action, if any.
#[must_use]
pub fn resolve_key_event(key: &KeyEvent, search_focused: bool) -> Option<InputAction> {
    if key.kind == KeyEventKind::Release {
        return None;
    }

    if is_command_chord(key.modifiers) {
        return match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(InputAction::Quit)
            }
            KeyCode::Char('r' | 'R') => Some(InputAction::Refresh),
            KeyCode::Char('f' | 'F') => Some(InputAction::FocusSearch),
            _ => None,
        };
    }

    if let Some(step) = scroll_step(key.code) {
        return Some(InputAction::Scroll(step));
    }

    if search_focused {
        return match key.code {
            KeyCode::Esc | KeyCode::Enter => Some(InputAction::LeaveSearch),
            KeyCode::Backspace => Some(InputAction::SearchBackspace),
            KeyCode::Char(c) => Some(InputAction::SearchInsert(c)),
            _ => None,
        };
    }

    match key.code {
        KeyCode::Char('q') => Some(InputAction::Quit),
        KeyCode::Char('/') => Some(InputAction::FocusSearch),
        KeyCode::Char('r') => Some(InputAction::RefreshWithNotice),
        KeyCode::Char('v') => Some(InputAction::ToggleView),
        KeyCode::Char('g') => Some(InputAction::SetView(ViewMode::Grid)),
        KeyCode::Char('l') => Some(InputAction::SetView(ViewMode::List)),
        KeyCode::Char('f') => Some(InputAction::CycleFilter),
        KeyCode::Char('s') => Some(InputAction::CycleSort),
        KeyCode::Char('e') => Some(InputAction::Export),
        KeyCode::Char('j') => Some(InputAction::Scroll(ScrollStep::LineDown)),
        KeyCode::Char('k') => Some(InputAction::Scroll(ScrollStep::LineUp)),
        _ => None,
    }
}

/// Footer hint line.
pub const KEY_HINTS: &str =
    "/ search  v view  f filter  s sort  j/k PgUp/PgDn scroll  r refresh  e export  q quit";
