//! Maintains the CLI message log in response to runtime events.
use runtime::Event;

use client_frontend_core::{
    FrontendConfig,
    event::{EventConsumer, EventImpact},
    format::event_message,
    message::MessageLog,
};

pub struct CliEventConsumer {
    log: MessageLog,
    config: FrontendConfig,
}

impl CliEventConsumer {
    pub fn new(log: MessageLog, config: FrontendConfig) -> Self {
        Self { log, config }
    }
}

impl EventConsumer for CliEventConsumer {
    fn on_event(&mut self, event: &Event) -> EventImpact {
        if let Some(entry) = event_message(event, &self.config) {
            self.log.push(entry);
        }

        // Every event changes either a panel or the log.
        EventImpact::redraw()
    }

    fn message_log(&self) -> &MessageLog {
        &self.log
    }

    fn message_log_mut(&mut self) -> &mut MessageLog {
        &mut self.log
    }
}

#[cfg(test)]
mod tests {
    use game_core::Generation;
    use runtime::{GameEvent, WalletEvent};

    use super::*;

    #[test]
    fn logs_visible_events() {
        let mut consumer = CliEventConsumer::new(MessageLog::new(8), FrontendConfig::default());

        let impact = consumer.on_event(&Event::Game(GameEvent::RoundFailed {
            generation: Generation(2),
            reason: "user rejected the request".to_string(),
        }));
        assert!(impact.requires_redraw);
        consumer.on_event(&Event::Wallet(WalletEvent::Disconnected));

        let texts: Vec<_> = consumer
            .message_log()
            .recent(8)
            .map(|entry| entry.text.clone())
            .collect();
        assert_eq!(
            texts,
            vec![
                "Wallet disconnected".to_string(),
                "Round failed: user rejected the request".to_string(),
            ]
        );
    }

    #[test]
    fn hidden_events_still_redraw() {
        let mut consumer = CliEventConsumer::new(MessageLog::new(8), FrontendConfig::default());

        let impact = consumer.on_event(&Event::Game(GameEvent::CountdownTick {
            generation: Generation(1),
            remaining: 2,
        }));
        assert!(impact.requires_redraw);
        assert!(consumer.message_log().is_empty());
    }
}
