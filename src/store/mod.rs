//! Conversation store
//!
//! Owns the chat list, the selected chat and one ordered message sequence
//! per chat. Every lookup that misses is a silent no-op, since a scheduled
//! status update may legitimately race a deletion.

use log::{debug, info};
use std::collections::HashMap;
use thiserror::Error;

use crate::models::{
    Chat, ChatId, DeliveryStatus, Direction, Message, MessageBody, MessageDraft, MessageId,
};

pub mod seed;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Unknown chat: {0}")]
    UnknownChat(ChatId),
}

/// Local wall-clock label stamped on new messages, e.g. "14:05".
pub fn time_label() -> String {
    chrono::Local::now().format("%H:%M").to_string()
}

#[derive(Debug, Default)]
struct Conversation {
    messages: Vec<Message>,
    // Highest id ever handed out, so ids survive deleting the newest message.
    last_id: u64,
}

impl Conversation {
    fn from_history(messages: Vec<Message>) -> Self {
        let last_id = messages.iter().map(|m| m.id.0).max().unwrap_or(0);
        Conversation { messages, last_id }
    }

    fn next_id(&mut self) -> MessageId {
        let current_max = self.messages.iter().map(|m| m.id.0).max().unwrap_or(0);
        self.last_id = self.last_id.max(current_max) + 1;
        MessageId(self.last_id)
    }

    fn find_mut(&mut self, id: MessageId) -> Option<&mut Message> {
        self.messages.iter_mut().find(|m| m.id == id)
    }
}

pub struct ConversationStore {
    chats: Vec<Chat>,
    active: ChatId,
    conversations: HashMap<ChatId, Conversation>,
}

impl ConversationStore {
    /// Builds a store over the given chats with empty histories. The first
    /// chat becomes the active one.
    pub fn new(chats: Vec<Chat>) -> Self {
        let active = chats.first().map(|c| c.id).unwrap_or(ChatId(0));
        let conversations = chats
            .iter()
            .map(|c| (c.id, Conversation::default()))
            .collect();
        ConversationStore {
            chats,
            active,
            conversations,
        }
    }

    /// Store seeded with the fixed mock chats and their opening history.
    pub fn seeded() -> Self {
        let chats = seed::mock_chats();
        let mut store = ConversationStore::new(chats);
        for chat in &store.chats {
            let history = seed::mock_history(chat);
            store
                .conversations
                .insert(chat.id, Conversation::from_history(history));
        }
        debug!("Seeded store with {} chats", store.chats.len());
        store
    }

    pub fn chats(&self) -> &[Chat] {
        &self.chats
    }

    pub fn chat(&self, chat_id: ChatId) -> Option<&Chat> {
        self.chats.iter().find(|c| c.id == chat_id)
    }

    pub fn active_chat_id(&self) -> ChatId {
        self.active
    }

    pub fn active_chat(&self) -> Option<&Chat> {
        self.chat(self.active)
    }

    pub fn select_chat(&mut self, chat_id: ChatId) -> Result<(), StoreError> {
        if self.chat(chat_id).is_none() {
            return Err(StoreError::UnknownChat(chat_id));
        }
        if self.active != chat_id {
            info!("Switching active chat from {} to {}", self.active, chat_id);
        }
        self.active = chat_id;
        Ok(())
    }

    pub fn messages(&self, chat_id: ChatId) -> &[Message] {
        self.conversations
            .get(&chat_id)
            .map(|c| c.messages.as_slice())
            .unwrap_or(&[])
    }

    pub fn active_messages(&self) -> &[Message] {
        self.messages(self.active)
    }

    pub fn message(&self, chat_id: ChatId, id: MessageId) -> Option<&Message> {
        self.messages(chat_id).iter().find(|m| m.id == id)
    }

    /// Appends to the active chat.
    pub fn append_message(&mut self, draft: MessageDraft) -> Option<Message> {
        self.append_message_to(self.active, draft)
    }

    pub fn append_message_to(&mut self, chat_id: ChatId, draft: MessageDraft) -> Option<Message> {
        self.append_message_at(chat_id, draft, time_label())
    }

    /// Finalizes a draft with the next id and the given time label and
    /// appends it. Returns `None` when the chat is unknown or the draft is
    /// blank text.
    pub fn append_message_at(
        &mut self,
        chat_id: ChatId,
        draft: MessageDraft,
        time: String,
    ) -> Option<Message> {
        let conversation = match self.conversations.get_mut(&chat_id) {
            Some(conversation) => conversation,
            None => {
                debug!("Dropping message for unknown {}", chat_id);
                return None;
            }
        };
        if let MessageBody::Text(text) = &draft.body {
            if text.trim().is_empty() {
                debug!("Rejecting blank text message for {}", chat_id);
                return None;
            }
        }

        let status = match draft.direction {
            Direction::Outgoing => Some(DeliveryStatus::Sending),
            Direction::Incoming => None,
        };
        let message = Message {
            id: conversation.next_id(),
            body: draft.body,
            time,
            direction: draft.direction,
            status,
        };
        conversation.messages.push(message.clone());
        debug!("Appended message {} to {}", message.id, chat_id);
        Some(message)
    }

    /// Moves a message forward to `status`. Returns whether anything changed:
    /// missing messages, incoming messages and backward moves are ignored.
    pub fn update_message_status(
        &mut self,
        chat_id: ChatId,
        id: MessageId,
        status: DeliveryStatus,
    ) -> bool {
        let message = match self
            .conversations
            .get_mut(&chat_id)
            .and_then(|c| c.find_mut(id))
        {
            Some(message) => message,
            None => {
                debug!("Status update for missing message {} in {} ignored", id, chat_id);
                return false;
            }
        };

        match message.status {
            Some(current) if current.can_advance_to(status) => {
                message.status = Some(status);
                debug!("Message {} in {}: {:?} -> {:?}", id, chat_id, current, status);
                true
            }
            Some(current) => {
                debug!(
                    "Message {} in {} stays {:?}, refusing {:?}",
                    id, chat_id, current, status
                );
                false
            }
            None => false,
        }
    }

    /// Removes a message. Deleting an id that is already gone returns `None`.
    pub fn delete_message(&mut self, chat_id: ChatId, id: MessageId) -> Option<Message> {
        let conversation = self.conversations.get_mut(&chat_id)?;
        let index = conversation.messages.iter().position(|m| m.id == id)?;
        let removed = conversation.messages.remove(index);
        info!("Deleted message {} from {}", id, chat_id);
        Some(removed)
    }

    /// Outgoing copy of a message's payload, ready to be appended.
    pub fn duplicate_for_forward(&self, chat_id: ChatId, id: MessageId) -> Option<MessageDraft> {
        self.message(chat_id, id)
            .map(|source| MessageDraft::outgoing(source.body.clone()))
    }
}
