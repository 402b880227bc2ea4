// Common test utilities for integration tests
// This module contains shared code for all integration tests

#![allow(dead_code)]

use std::sync::Once;

use log::LevelFilter;

use mockchat::models::{ChatId, DeliveryStatus, Message, MessageId};
use mockchat::Messenger;

// Initialize logging once
static INIT_LOGGER: Once = Once::new();

/// Set up the logger for the tests
pub fn setup_logging() {
    INIT_LOGGER.call_once(|| {
        env_logger::Builder::new()
            .filter_level(LevelFilter::Debug)
            .is_test(true)
            .init();
    });
}

/// Seeded messenger with default timings and logging on
pub fn setup_messenger() -> Messenger {
    setup_logging();
    Messenger::default()
}

/// Status of a message in a chat, `None` if it is gone or has no status
pub fn status_of(messenger: &Messenger, chat: ChatId, id: MessageId) -> Option<DeliveryStatus> {
    messenger
        .messages(chat)
        .iter()
        .find(|m| m.id == id)
        .and_then(|m| m.status)
}

pub fn incoming(messages: &[Message]) -> Vec<&Message> {
    messages.iter().filter(|m| !m.is_outgoing()).collect()
}

/// Steps the clock one millisecond at a time and records every status the
/// message goes through, collapsing repeats
pub fn observe_statuses(
    messenger: &mut Messenger,
    chat: ChatId,
    id: MessageId,
    until: u64,
) -> Vec<Option<DeliveryStatus>> {
    let mut seen = vec![status_of(messenger, chat, id)];
    while messenger.now() < until {
        messenger.advance_by(1);
        let current = status_of(messenger, chat, id);
        if seen.last() != Some(&current) {
            seen.push(current);
        }
    }
    seen
}
