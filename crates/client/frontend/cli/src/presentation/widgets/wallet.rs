//! Wallet panel: account, balance and the running score.

use client_frontend_core::view_model::{ViewModel, WalletView};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::presentation::theme::RatatuiTheme;

pub fn render(frame: &mut Frame, area: Rect, view_model: &ViewModel, theme: &RatatuiTheme) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    let symbol = &view_model.currency_symbol;
    let lines = match &view_model.wallet {
        WalletView::NoProvider => vec![
            Line::from("No wallet provider found."),
            Line::from(Span::styled(
                "Set RPS_RPC_URL to a JSON-RPC endpoint to play.",
                theme.style_label(),
            )),
        ],
        WalletView::Disconnected => vec![
            Line::from("Connect your wallet to play!"),
            Line::from(Span::styled("Press [c] to connect.", theme.style_label())),
        ],
        WalletView::Connected {
            short_account,
            balance,
            ..
        } => vec![
            Line::from(vec![
                Span::styled("Connected: ", theme.style_label()),
                Span::raw(short_account.clone()),
            ]),
            Line::from(vec![
                Span::styled("Balance: ", theme.style_label()),
                Span::styled(
                    format!("{} {symbol}", balance.as_deref().unwrap_or("0")),
                    theme.style_value(),
                ),
            ]),
        ],
    };

    let wallet =
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Wallet"));
    frame.render_widget(wallet, columns[0]);

    let score = Paragraph::new(vec![
        Line::from(vec![
            Span::styled("You: ", theme.style_label()),
            Span::styled(view_model.score.player.to_string(), theme.style_value()),
        ]),
        Line::from(vec![
            Span::styled("Bot: ", theme.style_label()),
            Span::styled(view_model.score.bot.to_string(), theme.style_value()),
        ]),
    ])
    .block(Block::default().borders(Borders::ALL).title("Score"));
    frame.render_widget(score, columns[1]);
}
