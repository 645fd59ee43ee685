//! Keyboard mapping for the review session.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// What a keypress asks the session to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionAction {
    /// Keep the current image
    Keep,
    /// Move the current image to the trash
    Trash,
    /// Show scaling info for the current image
    Info,
    /// Show scaling info for the whole batch
    BatchInfo,
    /// Clear the screen and repaint the undecided images
    Redraw,
    /// Re-layout the still-pending members of the current batch
    Restart,
    /// Pull the next batch
    Continue,
    /// Toggle between the two layout modes
    ToggleMode,
    /// Quit the session
    Quit,
    /// No action
    None,
}

/// Maps a key event to a session action.
pub fn handle_key_event(key: KeyEvent) -> SessionAction {
    match (key.code, key.modifiers) {
        (KeyCode::Char('q'), KeyModifiers::NONE) => SessionAction::Quit,
        (KeyCode::Char('c'), KeyModifiers::CONTROL) => SessionAction::Quit,
        (KeyCode::Esc, KeyModifiers::NONE) => SessionAction::Quit,

        (KeyCode::Char('k'), KeyModifiers::NONE) => SessionAction::Keep,
        // b for "bin"
        (KeyCode::Char('b'), KeyModifiers::NONE) => SessionAction::Trash,

        (KeyCode::Char('i'), KeyModifiers::NONE) => SessionAction::Info,
        (KeyCode::Char('I'), KeyModifiers::SHIFT) => SessionAction::BatchInfo,
        (KeyCode::Char('I'), KeyModifiers::NONE) => SessionAction::BatchInfo,

        (KeyCode::Char('l'), KeyModifiers::CONTROL) => SessionAction::Redraw,
        (KeyCode::Char('r'), KeyModifiers::NONE) => SessionAction::Restart,
        (KeyCode::Char('c'), KeyModifiers::NONE) => SessionAction::Continue,
        (KeyCode::Char('m'), KeyModifiers::NONE) => SessionAction::ToggleMode,

        _ => SessionAction::None,
    }
}
