//! Messenger facade
//!
//! The single owner of the conversation store and the interaction
//! simulator. User intents come in here, get applied to the store, and
//! schedule their simulated follow-ups. The terminal UI only ever reads the
//! view methods at the bottom.

use log::{debug, info};

use crate::config::AppConfig;
use crate::models::{Chat, ChatId, Message, MessageBody, MessageDraft, MessageId};
use crate::sim::{duration_label, Effect, InteractionSimulator, Millis};
use crate::store::{ConversationStore, StoreError};

pub struct Messenger {
    store: ConversationStore,
    sim: InteractionSimulator,
    reply_text: String,
    attachment_name: String,
}

impl Messenger {
    pub fn new(store: ConversationStore, config: &AppConfig) -> Self {
        Messenger {
            store,
            sim: InteractionSimulator::new(config.timings.clone()),
            reply_text: config.reply_text.clone(),
            attachment_name: config.attachment_name.clone(),
        }
    }

    /// Seeded mock chats with the given configuration.
    pub fn from_config(config: &AppConfig) -> Self {
        Messenger::new(ConversationStore::seeded(), config)
    }

    // --- user intents ---

    pub fn select_chat(&mut self, chat_id: ChatId) -> Result<(), StoreError> {
        self.store.select_chat(chat_id)
    }

    /// Sends text to the active chat. Blank input creates nothing.
    pub fn send_text(&mut self, text: &str) -> Option<Message> {
        if text.trim().is_empty() {
            debug!("Ignoring blank text send");
            return None;
        }
        let chat = self.store.active_chat_id();
        let message = self.send_outgoing(chat, MessageBody::Text(text.to_string()))?;
        self.sim.schedule_autoreply(chat);
        Some(message)
    }

    /// Attaches the configured mock file to the active chat.
    pub fn send_file(&mut self) -> Option<Message> {
        let name = self.attachment_name.clone();
        self.send_file_named(&name)
    }

    pub fn send_file_named(&mut self, name: &str) -> Option<Message> {
        let chat = self.store.active_chat_id();
        self.send_outgoing(
            chat,
            MessageBody::File {
                name: name.to_string(),
            },
        )
    }

    /// Returns false if a recording is already running.
    pub fn start_recording(&mut self) -> bool {
        let chat = self.store.active_chat_id();
        let started = self.sim.start_recording(chat);
        if started {
            info!("Recording started in {}", chat);
        }
        started
    }

    /// Stops the recording and posts it as a voice message to the chat it
    /// was started in. `None` when nothing is being recorded. A recording
    /// that hit the limit stays open until this is called.
    pub fn stop_recording(&mut self) -> Option<Message> {
        let finished = self.sim.stop_recording()?;
        info!("Recording stopped after {}s", finished.seconds);
        self.send_outgoing(
            finished.chat,
            MessageBody::Voice {
                duration: duration_label(finished.seconds),
            },
        )
    }

    /// Deletes one of the user's own messages from the active chat and
    /// cancels its pending receipts. Incoming and unknown ids are ignored.
    pub fn delete_message(&mut self, id: MessageId) -> Option<Message> {
        let chat = self.store.active_chat_id();
        if !self.store.message(chat, id)?.is_outgoing() {
            debug!("Refusing to delete incoming message {} in {}", id, chat);
            return None;
        }
        self.sim.forget_message(chat, id);
        self.store.delete_message(chat, id)
    }

    /// Re-sends a copy of any message in the active chat as a new outgoing
    /// message.
    pub fn forward_message(&mut self, id: MessageId) -> Option<Message> {
        let chat = self.store.active_chat_id();
        let draft = self.store.duplicate_for_forward(chat, id)?;
        info!("Forwarding message {} in {}", id, chat);
        self.send_outgoing(chat, draft.body)
    }

    fn send_outgoing(&mut self, chat: ChatId, body: MessageBody) -> Option<Message> {
        let message = self
            .store
            .append_message_to(chat, MessageDraft::outgoing(body))?;
        self.sim.track_outgoing(chat, message.id);
        info!("Sent {:?} message {} to {}", message.kind(), message.id, chat);
        Some(message)
    }

    // --- clock ---

    /// Fires every effect due up to `now`, in order, and leaves the clock at
    /// `now`. Moving backwards does nothing.
    pub fn advance_to(&mut self, now: Millis) {
        while let Some(effect) = self.sim.pop_due(now) {
            self.apply(effect);
        }
        self.sim.settle(now);
    }

    pub fn advance_by(&mut self, delta: Millis) {
        let target = self.sim.now() + delta;
        self.advance_to(target);
    }

    fn apply(&mut self, effect: Effect) {
        match effect {
            Effect::AdvanceStatus {
                chat,
                message,
                status,
            } => {
                self.store.update_message_status(chat, message, status);
            }
            Effect::Autoreply { chat } => {
                let reply = MessageDraft::incoming(MessageBody::Text(self.reply_text.clone()));
                if let Some(message) = self.store.append_message_to(chat, reply) {
                    info!("Autoreply {} arrived in {}", message.id, chat);
                }
            }
            Effect::RecordingLimit => {
                info!("Recording limit reached, waiting for stop");
            }
            Effect::TypingStarted { .. } | Effect::RecordingTick => {}
        }
    }

    // --- view contract ---

    pub fn now(&self) -> Millis {
        self.sim.now()
    }

    pub fn list_chats(&self) -> &[Chat] {
        self.store.chats()
    }

    pub fn active_chat(&self) -> Option<&Chat> {
        self.store.active_chat()
    }

    pub fn active_chat_id(&self) -> ChatId {
        self.store.active_chat_id()
    }

    pub fn active_messages(&self) -> &[Message] {
        self.store.active_messages()
    }

    pub fn messages(&self, chat: ChatId) -> &[Message] {
        self.store.messages(chat)
    }

    /// Whether the other side of the active chat is "typing".
    pub fn is_typing(&self) -> bool {
        self.sim.is_typing(self.store.active_chat_id())
    }

    pub fn is_recording(&self) -> bool {
        self.sim.is_recording()
    }

    pub fn recording_elapsed_seconds(&self) -> u32 {
        self.sim.recording_elapsed_seconds()
    }
}

impl Default for Messenger {
    fn default() -> Self {
        Messenger::from_config(&AppConfig::default())
    }
}
