//! Input processing for the CLI client.
//!
//! This module owns the keyboard-to-command mapping so the rest of the
//! application can remain agnostic about concrete key bindings or the
//! specifics of `crossterm` events.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use game_core::Choice;

use crate::state::AppMode;

/// High-level outcome of processing a keyboard event.
#[derive(Debug, PartialEq, Eq)]
pub enum KeyAction {
    /// Exit the application.
    Quit,
    Choose(Choice),
    Connect,
    Disconnect,
    /// Back to Idle ("Play Again").
    Reset,
    EditWager,
    WagerChar(char),
    WagerBackspace,
    SubmitWager,
    CancelWager,
    /// No meaningful command was produced.
    None,
}

/// Translates `KeyEvent`s into commands for the current mode.
#[derive(Debug, Default)]
pub struct InputHandler;

impl InputHandler {
    pub fn new() -> Self {
        Self
    }

    /// Converts a raw key event into a higher-level command.
    pub fn handle_key(&self, key: KeyEvent, mode: &AppMode) -> KeyAction {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return KeyAction::Quit;
        }

        match mode {
            AppMode::Normal => self.normal(key),
            AppMode::EditingWager { .. } => self.editing(key),
        }
    }

    fn normal(&self, key: KeyEvent) -> KeyAction {
        let KeyCode::Char(raw) = key.code else {
            return match key.code {
                KeyCode::Enter => KeyAction::Reset,
                KeyCode::Esc => KeyAction::Quit,
                _ => KeyAction::None,
            };
        };

        match raw.to_ascii_lowercase() {
            'q' => KeyAction::Quit,
            'r' | '1' => KeyAction::Choose(Choice::Rock),
            'p' | '2' => KeyAction::Choose(Choice::Paper),
            's' | '3' => KeyAction::Choose(Choice::Scissors),
            'c' => KeyAction::Connect,
            'd' => KeyAction::Disconnect,
            'n' | ' ' => KeyAction::Reset,
            'b' | 'w' => KeyAction::EditWager,
            _ => KeyAction::None,
        }
    }

    fn editing(&self, key: KeyEvent) -> KeyAction {
        match key.code {
            KeyCode::Enter => KeyAction::SubmitWager,
            KeyCode::Esc => KeyAction::CancelWager,
            KeyCode::Backspace => KeyAction::WagerBackspace,
            KeyCode::Char(ch) => KeyAction::WagerChar(ch),
            _ => KeyAction::None,
        }
    }
}
