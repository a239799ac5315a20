//! Turn entity - one visible message of the practice conversation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ChatMessage;
use crate::value_objects::TurnId;

/// Who produced a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sender {
    User,
    #[serde(rename = "AI")]
    Ai,
}

impl Sender {
    pub const fn label(self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Ai => "AI",
        }
    }
}

/// A single immutable turn of the transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    id: TurnId,
    sender: Sender,
    content: String,
    created_at: DateTime<Utc>,
}

impl Turn {
    pub fn new(sender: Sender, content: impl Into<String>) -> Self {
        Self {
            id: TurnId::new(),
            sender,
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    pub const fn id(&self) -> TurnId {
        self.id
    }

    pub const fn sender(&self) -> Sender {
        self.sender
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// The turn as a message for the chat collaborator
    pub fn to_chat_message(&self) -> ChatMessage {
        match self.sender {
            Sender::User => ChatMessage::user(&self.content),
            Sender::Ai => ChatMessage::assistant(&self.content),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::MessageRole;

    #[test]
    fn turn_keeps_sender_and_content() {
        let turn = Turn::new(Sender::User, "Hola");
        assert_eq!(turn.sender(), Sender::User);
        assert_eq!(turn.content(), "Hola");
    }

    #[test]
    fn ai_sender_serializes_as_ai() {
        let json = serde_json::to_string(&Sender::Ai).unwrap();
        assert_eq!(json, "\"AI\"");
    }

    #[test]
    fn converts_to_chat_message() {
        assert_eq!(
            Turn::new(Sender::Ai, "Bonjour").to_chat_message().role,
            MessageRole::Assistant
        );
        assert_eq!(
            Turn::new(Sender::User, "Salut").to_chat_message().role,
            MessageRole::User
        );
    }
}
