//! Ratatui styling for the terminal UI.

use client_frontend_core::message::MessageLevel;
use game_core::{Choice, GamePhase};
use ratatui::style::{Color, Modifier, Style};

/// Consistent color scheme for the CLI.
#[derive(Clone, Copy, Debug, Default)]
pub struct RatatuiTheme;

impl RatatuiTheme {
    pub fn new() -> Self {
        Self
    }

    pub fn glyph(&self, choice: Choice) -> &'static str {
        match choice {
            Choice::Rock => "✊",
            Choice::Paper => "✋",
            Choice::Scissors => "✌",
        }
    }

    /// Hand button style: the picked hand is highlighted, disabled hands dimmed.
    pub fn style_hand(&self, selected: bool, enabled: bool) -> Style {
        let style = if selected {
            Style::default()
                .fg(Color::LightBlue)
                .add_modifier(Modifier::BOLD | Modifier::REVERSED)
        } else {
            Style::default().fg(Color::White)
        };

        if enabled || selected {
            style
        } else {
            style.add_modifier(Modifier::DIM)
        }
    }

    pub fn style_phase(&self, phase: GamePhase) -> Style {
        let color = match phase {
            GamePhase::Idle => Color::Gray,
            GamePhase::Choosing => Color::Yellow,
            GamePhase::Result => Color::Cyan,
        };
        Style::default().fg(color).add_modifier(Modifier::BOLD)
    }

    pub fn style_headline(&self, failed: bool) -> Style {
        if failed {
            Style::default().fg(Color::LightRed)
        } else {
            Style::default()
                .fg(Color::LightGreen)
                .add_modifier(Modifier::BOLD)
        }
    }

    pub fn style_message(&self, level: MessageLevel) -> Style {
        match level {
            MessageLevel::Info => Style::default().fg(Color::White),
            MessageLevel::Success => Style::default().fg(Color::LightGreen),
            MessageLevel::Warning => Style::default().fg(Color::Yellow),
            MessageLevel::Error => Style::default().fg(Color::LightRed),
        }
    }

    pub fn style_label(&self) -> Style {
        Style::default().fg(Color::DarkGray)
    }

    pub fn style_value(&self) -> Style {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    }
}
