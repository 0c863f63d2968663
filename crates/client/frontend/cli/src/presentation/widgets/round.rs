//! Round panel: wager, hand buttons, countdown and result.

use client_frontend_core::view_model::ViewModel;
use game_core::Choice;
use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::{presentation::theme::RatatuiTheme, state::AppState};

pub fn render(
    frame: &mut Frame,
    area: Rect,
    view_model: &ViewModel,
    app_state: &AppState,
    theme: &RatatuiTheme,
) {
    let round = &view_model.round;
    let symbol = &view_model.currency_symbol;

    let wager_line = match app_state.wager_buffer() {
        Some(buffer) => Line::from(vec![
            Span::styled("Bet amount: ", theme.style_label()),
            Span::styled(format!("{buffer}_"), theme.style_value()),
            Span::styled(format!(" {symbol} (min 0.001, step 0.001)"), theme.style_label()),
        ]),
        None => Line::from(vec![
            Span::styled("Bet amount: ", theme.style_label()),
            Span::styled(format!("{} {symbol}", view_model.wager), theme.style_value()),
        ]),
    };

    let mut hands = Vec::new();
    for choice in Choice::ALL {
        let selected = round.player_choice == Some(choice);
        hands.push(Span::styled(
            format!(" {} {} ", theme.glyph(choice), choice),
            theme.style_hand(selected, round.can_choose),
        ));
        hands.push(Span::raw("   "));
    }

    let mut lines = vec![
        wager_line,
        Line::from(""),
        Line::from(hands),
        Line::from(""),
    ];

    if let Some(headline) = &round.headline {
        lines.push(Line::from(Span::styled(
            headline.clone(),
            theme.style_headline(round.failed),
        )));
    }
    if let Some(detail) = &round.detail {
        lines.push(Line::from(detail.clone()));
    }

    let title = Line::from(vec![
        Span::raw("Round "),
        Span::styled(format!("[{:?}]", round.phase), theme.style_phase(round.phase)),
    ]);

    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title(title));

    frame.render_widget(paragraph, area);
}
