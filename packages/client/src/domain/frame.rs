//! Frames carried by the channel.

use super::ParticipantId;

/// Direct chat message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub from: ParticipantId,
    pub to: ParticipantId,
    pub content: String,
    /// Client-generated display timestamp, not authoritative.
    /// Left empty, it is stamped by the channel at send time.
    pub timestamp: String,
}

impl ChatMessage {
    /// Create a message without a timestamp.
    pub fn new(from: ParticipantId, to: ParticipantId, content: impl Into<String>) -> Self {
        Self {
            from,
            to,
            content: content.into(),
            timestamp: String::new(),
        }
    }

    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = timestamp.into();
        self
    }
}

/// Typing indicator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypingNotice {
    pub from: ParticipantId,
    pub to: ParticipantId,
    pub is_typing: bool,
}

/// A frame sent or received on the channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Presence announcement, always the first frame of a connection
    Handshake { from: ParticipantId },
    Chat(ChatMessage),
    Typing(TypingNotice),
}

impl Frame {
    pub fn sender(&self) -> &ParticipantId {
        match self {
            Self::Handshake { from } => from,
            Self::Chat(message) => &message.from,
            Self::Typing(notice) => &notice.from,
        }
    }

    /// Typing notices are ephemeral and are never held for later delivery.
    pub fn is_ephemeral(&self) -> bool {
        matches!(self, Self::Typing(_))
    }
}

/// Presence entry pushed by the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Presence {
    pub id: ParticipantId,
    pub display_name: String,
    pub online: bool,
}

/// Decoded inbound payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    Frame(Frame),
    Presence(Vec<Presence>),
}
