// Conversation flow tests
// These tests drive the messenger through user intents and the virtual clock

mod common;
use common::{incoming, observe_statuses, setup_messenger, status_of};

use mockchat::config::{AppConfig, DEFAULT_REPLY_TEXT};
use mockchat::models::{ChatId, DeliveryStatus, Direction, MessageBody, MessageKind};
use mockchat::sim::SimTimings;
use mockchat::Messenger;

//------------------------------------------------------------------------------
// SENDING
//------------------------------------------------------------------------------

#[test]
fn test_send_text_reaches_read() {
    let mut messenger = setup_messenger();
    let before = messenger.active_messages().len();

    let message = messenger.send_text("Hello").expect("text should be sent");
    assert_eq!(messenger.active_messages().len(), before + 1);
    assert_eq!(message.body, MessageBody::Text("Hello".to_string()));
    assert_eq!(message.direction, Direction::Outgoing);
    assert_eq!(message.status, Some(DeliveryStatus::Sending));
    assert_eq!(message.time.len(), 5, "time label should be HH:MM");

    messenger.advance_to(3000);
    assert_eq!(status_of(&messenger, ChatId(1), message.id), Some(DeliveryStatus::Read));
}

#[test]
fn test_blank_text_is_ignored() {
    let mut messenger = setup_messenger();
    let before = messenger.active_messages().len();

    assert!(messenger.send_text("").is_none());
    assert!(messenger.send_text("   ").is_none());
    assert!(messenger.send_text("\n\t").is_none());
    assert_eq!(messenger.active_messages().len(), before);

    // No autoreply either
    messenger.advance_to(10_000);
    assert_eq!(messenger.active_messages().len(), before);
}

#[test]
fn test_ids_strictly_increase() {
    let mut messenger = setup_messenger();
    let mut ids = Vec::new();
    for i in 0..5 {
        ids.push(messenger.send_text(&format!("message {}", i)).unwrap().id);
        ids.push(messenger.send_file().unwrap().id);
        messenger.advance_by(700);
    }
    messenger.advance_to(20_000);

    let all: Vec<_> = messenger.active_messages().iter().map(|m| m.id).collect();
    assert!(all.windows(2).all(|w| w[0] < w[1]), "ids out of order: {:?}", all);
    assert!(ids.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_status_progression_has_no_gaps() {
    let mut messenger = setup_messenger();
    let message = messenger.send_file().unwrap();
    assert_eq!(message.kind(), MessageKind::File);

    let seen = observe_statuses(&mut messenger, ChatId(1), message.id, 5000);
    assert_eq!(
        seen,
        DeliveryStatus::PROGRESSION.iter().copied().map(Some).collect::<Vec<_>>()
    );
}

#[test]
fn test_status_at_documented_boundaries() {
    let mut messenger = setup_messenger();
    let id = messenger.send_text("boundaries").unwrap().id;

    let expectations = [
        (499, DeliveryStatus::Sending),
        (500, DeliveryStatus::Sent),
        (1499, DeliveryStatus::Sent),
        (1500, DeliveryStatus::Delivered),
        (2999, DeliveryStatus::Delivered),
        (3000, DeliveryStatus::Read),
        (9000, DeliveryStatus::Read),
    ];
    for (at, expected) in expectations {
        messenger.advance_to(at);
        assert_eq!(status_of(&messenger, ChatId(1), id), Some(expected), "at {}ms", at);
    }
}

//------------------------------------------------------------------------------
// AUTORESPONSE
//------------------------------------------------------------------------------

#[test]
fn test_autoresponse_and_typing_window() {
    let mut messenger = setup_messenger();
    let before = incoming(messenger.active_messages()).len();
    messenger.send_text("Как дела?").unwrap();

    for t in (0..10_000).step_by(250) {
        messenger.advance_to(t);
        let expected = (4000..6000).contains(&t);
        assert_eq!(messenger.is_typing(), expected, "typing at {}ms", t);
    }

    let received = incoming(messenger.active_messages());
    assert_eq!(received.len(), before + 1);
    let reply = received.last().unwrap();
    assert_eq!(reply.text(), Some(DEFAULT_REPLY_TEXT));
    assert_eq!(reply.status, None);
}

#[test]
fn test_autoresponse_arrives_exactly_at_six_seconds() {
    let mut messenger = setup_messenger();
    let before = messenger.active_messages().len();
    messenger.send_text("ping").unwrap();

    messenger.advance_to(5999);
    assert_eq!(messenger.active_messages().len(), before + 1);
    messenger.advance_to(6000);
    assert_eq!(messenger.active_messages().len(), before + 2);
    assert!(!messenger.active_messages().last().unwrap().is_outgoing());
}

#[test]
fn test_voice_and_file_sends_get_no_autoresponse() {
    let mut messenger = setup_messenger();
    let before = incoming(messenger.active_messages()).len();

    messenger.send_file().unwrap();
    messenger.start_recording();
    messenger.advance_by(2000);
    messenger.stop_recording().unwrap();
    messenger.advance_by(20_000);

    assert_eq!(incoming(messenger.active_messages()).len(), before);
    assert!(!messenger.is_typing());
}

#[test]
fn test_reply_lands_in_the_chat_it_was_sent_to() {
    let mut messenger = setup_messenger();
    let sent = messenger.send_text("before switching").unwrap();

    messenger.advance_to(1000);
    messenger.select_chat(ChatId(3)).unwrap();
    let other_before = messenger.active_messages().len();

    messenger.advance_to(4500);
    assert!(!messenger.is_typing(), "typing belongs to the first chat");

    messenger.advance_to(7000);
    assert_eq!(messenger.active_messages().len(), other_before);

    let first_chat = messenger.messages(ChatId(1));
    assert_eq!(first_chat.last().and_then(|m| m.text()), Some(DEFAULT_REPLY_TEXT));
    assert_eq!(status_of(&messenger, ChatId(1), sent.id), Some(DeliveryStatus::Read));
}

#[test]
fn test_configured_reply_and_timings() {
    common::setup_logging();
    let config = AppConfig {
        timings: SimTimings {
            typing_after_ms: 100,
            reply_after_ms: 200,
            ..SimTimings::default()
        },
        reply_text: "ok".to_string(),
        ..AppConfig::default()
    };
    let mut messenger = Messenger::from_config(&config);
    messenger.send_text("quick").unwrap();

    messenger.advance_to(150);
    assert!(messenger.is_typing());
    messenger.advance_to(200);
    assert_eq!(messenger.active_messages().last().and_then(|m| m.text()), Some("ok"));
}

//------------------------------------------------------------------------------
// DELETE AND FORWARD
//------------------------------------------------------------------------------

#[test]
fn test_delete_before_receipts_fire() {
    let mut messenger = setup_messenger();
    let message = messenger.send_file().unwrap();

    messenger.advance_to(600);
    assert_eq!(status_of(&messenger, ChatId(1), message.id), Some(DeliveryStatus::Sent));

    let removed = messenger.delete_message(message.id).unwrap();
    assert_eq!(removed.id, message.id);
    assert!(messenger.delete_message(message.id).is_none());

    messenger.advance_to(10_000);
    assert!(messenger.active_messages().iter().all(|m| m.id != message.id));
}

#[test]
fn test_deleted_id_is_not_resurrected_by_a_later_send() {
    let mut messenger = setup_messenger();
    let doomed = messenger.send_file().unwrap();
    messenger.delete_message(doomed.id).unwrap();

    let next = messenger.send_file().unwrap();
    assert!(next.id > doomed.id);

    // The doomed message's receipts must not touch the new one early
    messenger.advance_to(499);
    assert_eq!(status_of(&messenger, ChatId(1), next.id), Some(DeliveryStatus::Sending));
    assert!(messenger.active_messages().iter().all(|m| m.id != doomed.id));
}

#[test]
fn test_incoming_messages_cannot_be_deleted() {
    let mut messenger = setup_messenger();
    let first = messenger.active_messages()[0].clone();
    assert!(!first.is_outgoing());
    assert!(messenger.delete_message(first.id).is_none());
    assert_eq!(messenger.active_messages()[0], first);
}

#[test]
fn test_forward_copies_payload_with_fresh_identity() {
    let mut messenger = setup_messenger();
    let source = messenger.active_messages()[0].clone();

    messenger.advance_to(12_000);
    let forwarded = messenger.forward_message(source.id).unwrap();

    assert_ne!(forwarded.id, source.id);
    assert!(forwarded.id > source.id);
    assert_eq!(forwarded.body, source.body);
    assert_eq!(forwarded.direction, Direction::Outgoing);
    assert_eq!(forwarded.status, Some(DeliveryStatus::Sending));

    messenger.advance_by(3000);
    assert_eq!(status_of(&messenger, ChatId(1), forwarded.id), Some(DeliveryStatus::Read));
}

#[test]
fn test_forward_voice_keeps_duration() {
    let mut messenger = setup_messenger();
    messenger.start_recording();
    messenger.advance_by(7000);
    let voice = messenger.stop_recording().unwrap();

    let forwarded = messenger.forward_message(voice.id).unwrap();
    assert_eq!(forwarded.body, MessageBody::Voice { duration: "0:07".to_string() });
}

#[test]
fn test_forward_unknown_message_is_a_noop() {
    let mut messenger = setup_messenger();
    let before = messenger.active_messages().len();
    assert!(messenger.forward_message(mockchat::MessageId(404)).is_none());
    assert_eq!(messenger.active_messages().len(), before);
}

//------------------------------------------------------------------------------
// CHAT SELECTION
//------------------------------------------------------------------------------

#[test]
fn test_select_chat_swaps_conversation() {
    let mut messenger = setup_messenger();
    assert_eq!(messenger.list_chats().len(), 6);
    messenger.send_text("for Anna").unwrap();
    let anna_len = messenger.active_messages().len();

    messenger.select_chat(ChatId(2)).unwrap();
    let group = messenger.active_chat().unwrap();
    assert!(group.is_group());
    assert_eq!(group.members().map(|m| m.len()), Some(3));
    assert_eq!(messenger.active_messages().len(), 1);

    messenger.select_chat(ChatId(1)).unwrap();
    assert_eq!(messenger.active_messages().len(), anna_len);
}

#[test]
fn test_select_unknown_chat_keeps_selection() {
    let mut messenger = setup_messenger();
    assert!(messenger.select_chat(ChatId(99)).is_err());
    assert_eq!(messenger.active_chat_id(), ChatId(1));
}
