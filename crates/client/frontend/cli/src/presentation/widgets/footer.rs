//! Footer widget displaying context-sensitive key bindings.

use client_frontend_core::view_model::{ViewModel, WalletView};
use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::state::{AppMode, AppState};

pub fn render(frame: &mut Frame, area: Rect, view_model: &ViewModel, app_state: &AppState) {
    let text = match &app_state.mode {
        AppMode::EditingWager { .. } => Line::from(vec![
            Span::raw("[0-9 .] Type amount | "),
            Span::raw("[Backspace] Delete | "),
            Span::raw("[Enter] Confirm | "),
            Span::raw("[ESC] Cancel"),
        ]),
        AppMode::Normal => {
            let wallet = match view_model.wallet {
                WalletView::Connected { .. } => "[d] Disconnect | ",
                WalletView::Disconnected => "[c] Connect | ",
                WalletView::NoProvider => "",
            };
            Line::from(vec![
                Span::raw("[r/p/s] Rock/Paper/Scissors | "),
                Span::raw("[b] Bet | "),
                Span::raw("[n/Enter] Play again | "),
                Span::raw(wallet),
                Span::raw("[q] Quit"),
            ])
        }
    };

    let paragraph = Paragraph::new(text).block(Block::default().borders(Borders::ALL));

    frame.render_widget(paragraph, area);
}
