use std::fmt;

/// Opaque chat identifier, stable for the lifetime of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChatId(pub u32);

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "chat#{}", self.0)
    }
}

/// Message identifier, assigned in increasing order within one conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId(pub u64);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChatKind {
    Direct,
    Group { members: Vec<String> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Chat {
    pub id: ChatId,
    pub name: String,
    pub last_message: String,
    pub time: String,
    pub unread: u32,
    pub online: bool,
    pub kind: ChatKind,
}

impl Chat {
    pub fn is_group(&self) -> bool {
        matches!(self.kind, ChatKind::Group { .. })
    }

    pub fn members(&self) -> Option<&[String]> {
        match &self.kind {
            ChatKind::Group { members } => Some(members),
            ChatKind::Direct => None,
        }
    }

    /// Initials for a direct chat, e.g. "АС" for "Анна Смирнова".
    pub fn initials(&self) -> String {
        self.name
            .split_whitespace()
            .filter_map(|part| part.chars().next())
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Text,
    Voice,
    File,
}

/// Kind-specific payload of a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageBody {
    Text(String),
    Voice { duration: String },
    File { name: String },
}

impl MessageBody {
    pub fn kind(&self) -> MessageKind {
        match self {
            MessageBody::Text(_) => MessageKind::Text,
            MessageBody::Voice { .. } => MessageKind::Voice,
            MessageBody::File { .. } => MessageKind::File,
        }
    }

    /// One-line rendering used by the conversation pane and the chat preview.
    pub fn summary(&self) -> String {
        match self {
            MessageBody::Text(text) => text.clone(),
            MessageBody::Voice { duration } => format!("🎤 Voice message ({})", duration),
            MessageBody::File { name } => format!("📎 {}", name),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Outgoing,
    Incoming,
}

/// Delivery progress of an outgoing message. Variants are ordered, and a
/// message only ever moves to a strictly greater status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DeliveryStatus {
    Sending = 0,
    Sent = 1,
    Delivered = 2,
    Read = 3,
}

impl DeliveryStatus {
    pub const PROGRESSION: [DeliveryStatus; 4] = [
        DeliveryStatus::Sending,
        DeliveryStatus::Sent,
        DeliveryStatus::Delivered,
        DeliveryStatus::Read,
    ];

    /// The status that follows this one, `None` once read.
    pub fn next(self) -> Option<DeliveryStatus> {
        match self {
            DeliveryStatus::Sending => Some(DeliveryStatus::Sent),
            DeliveryStatus::Sent => Some(DeliveryStatus::Delivered),
            DeliveryStatus::Delivered => Some(DeliveryStatus::Read),
            DeliveryStatus::Read => None,
        }
    }

    pub fn can_advance_to(self, target: DeliveryStatus) -> bool {
        target > self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub id: MessageId,
    pub body: MessageBody,
    pub time: String,
    pub direction: Direction,
    pub status: Option<DeliveryStatus>,
}

impl Message {
    pub fn kind(&self) -> MessageKind {
        self.body.kind()
    }

    pub fn is_outgoing(&self) -> bool {
        self.direction == Direction::Outgoing
    }

    pub fn text(&self) -> Option<&str> {
        match &self.body {
            MessageBody::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// A message before the store has given it an id and a timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageDraft {
    pub body: MessageBody,
    pub direction: Direction,
}

impl MessageDraft {
    pub fn outgoing(body: MessageBody) -> Self {
        MessageDraft {
            body,
            direction: Direction::Outgoing,
        }
    }

    pub fn incoming(body: MessageBody) -> Self {
        MessageDraft {
            body,
            direction: Direction::Incoming,
        }
    }
}
