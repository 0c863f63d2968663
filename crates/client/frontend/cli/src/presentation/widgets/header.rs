//! Header widget with the title, network and contract.

use client_frontend_core::view_model::ViewModel;
use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

pub fn render(frame: &mut Frame, area: Rect, view_model: &ViewModel) {
    let mut spans = vec![Span::styled(
        "Rock Paper Scissors",
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )];

    if let Some(network) = &view_model.network {
        spans.push(Span::raw(" | Network: "));
        spans.push(Span::styled(
            network.clone(),
            Style::default().fg(Color::LightGreen),
        ));
    }

    spans.push(Span::raw(" | Contract: "));
    spans.push(match &view_model.contract {
        Some(contract) => Span::styled(contract.clone(), Style::default().fg(Color::Yellow)),
        None => Span::styled("not configured", Style::default().fg(Color::LightRed)),
    });

    let paragraph = Paragraph::new(Line::from(spans))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));

    frame.render_widget(paragraph, area);
}
