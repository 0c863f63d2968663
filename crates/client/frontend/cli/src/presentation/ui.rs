//! UI rendering using the widget set and ViewModel.
//!
//! This module provides the main render entry point that composes all widgets
//! to create the complete terminal UI.
use anyhow::Result;
use ratatui::layout::{Constraint, Direction, Layout};

use crate::{
    presentation::{terminal::Tui, theme::RatatuiTheme, widgets},
    state::AppState,
};
use client_frontend_core::{message::MessageLog, view_model::ViewModel};

/// Rendering context containing all state and configuration needed for UI rendering.
pub struct RenderContext<'a> {
    pub view_model: &'a ViewModel,
    pub messages: &'a MessageLog,
    pub app_state: &'a AppState,
    pub message_panel_height: u16,
}

pub fn render(terminal: &mut Tui, ctx: &RenderContext) -> Result<()> {
    let theme = RatatuiTheme::new();

    terminal.draw(|frame| {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),                        // Header
                Constraint::Length(5),                        // Wallet + score
                Constraint::Min(7),                           // Round
                Constraint::Length(ctx.message_panel_height), // Messages
                Constraint::Length(3),                        // Footer
            ])
            .split(frame.area());

        widgets::header::render(frame, chunks[0], ctx.view_model);
        widgets::wallet::render(frame, chunks[1], ctx.view_model, &theme);
        widgets::round::render(frame, chunks[2], ctx.view_model, ctx.app_state, &theme);

        let recent: Vec<_> = ctx
            .messages
            .recent(ctx.message_panel_height.saturating_sub(2) as usize)
            .cloned()
            .collect();
        widgets::messages::render(frame, chunks[3], &recent, &theme);

        widgets::footer::render(frame, chunks[4], ctx.view_model, ctx.app_state);
    })?;

    Ok(())
}
