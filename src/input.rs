//! Key bindings -> input intents.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Discrete intent from a key press; the draw side never sees raw keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    MoveLeft,
    MoveRight,
    ToggleFullscreen,
    Quit,
    None,
}

/// Map a key event to an intent. Arrows and a/d (or vim h/l) move,
/// `f` toggles fullscreen, q/Esc/Ctrl-C quit.
pub fn key_to_intent(key: KeyEvent) -> Intent {
    let KeyEvent { code, modifiers, .. } = key;
    if modifiers == KeyModifiers::CONTROL {
        return match code {
            KeyCode::Char('c') => Intent::Quit,
            _ => Intent::None,
        };
    }
    if !(modifiers.is_empty() || modifiers == KeyModifiers::SHIFT) {
        return Intent::None;
    }
    match code {
        KeyCode::Char('q') | KeyCode::Esc => Intent::Quit,
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('h') => Intent::MoveLeft,
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('l') => Intent::MoveRight,
        KeyCode::Char('f') => Intent::ToggleFullscreen,
        _ => Intent::None,
    }
}
