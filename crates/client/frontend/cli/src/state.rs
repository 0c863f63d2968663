//! UI-local state that never reaches the runtime.

/// Which keys mean what right now.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum AppMode {
    #[default]
    Normal,
    /// Typing a new wager; the buffer is submitted on Enter.
    EditingWager { buffer: String },
}

#[derive(Clone, Debug, Default)]
pub struct AppState {
    pub mode: AppMode,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_wager_edit(&mut self, current: &str) {
        self.mode = AppMode::EditingWager {
            buffer: current.to_string(),
        };
    }

    pub fn push_wager_char(&mut self, ch: char) {
        if let AppMode::EditingWager { buffer } = &mut self.mode
            && (ch.is_ascii_digit() || ch == '.')
            && buffer.len() < 32
        {
            buffer.push(ch);
        }
    }

    pub fn pop_wager_char(&mut self) {
        if let AppMode::EditingWager { buffer } = &mut self.mode {
            buffer.pop();
        }
    }

    /// Leaves edit mode, returning the typed text.
    pub fn finish_wager_edit(&mut self) -> Option<String> {
        match std::mem::take(&mut self.mode) {
            AppMode::EditingWager { buffer } => Some(buffer),
            AppMode::Normal => None,
        }
    }

    pub fn cancel_wager_edit(&mut self) {
        self.mode = AppMode::Normal;
    }

    pub fn wager_buffer(&self) -> Option<&str> {
        match &self.mode {
            AppMode::EditingWager { buffer } => Some(buffer),
            AppMode::Normal => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wager_edit_accepts_only_decimal_text() {
        let mut state = AppState::new();
        state.begin_wager_edit("0.001");
        state.pop_wager_char();
        state.push_wager_char('5');
        state.push_wager_char('x');
        assert_eq!(state.wager_buffer(), Some("0.005"));

        assert_eq!(state.finish_wager_edit().as_deref(), Some("0.005"));
        assert_eq!(state.mode, AppMode::Normal);
        assert_eq!(state.finish_wager_edit(), None);
    }
}
