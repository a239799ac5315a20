//! Practice session - selection, transcript and the active tutor instruction

use super::{ChatMessage, ConversationLog, SessionSelection};

/// State of the single practice session held by the process
#[derive(Debug, Clone, Default)]
pub struct PracticeSession {
    /// Current selector values
    pub selection: SessionSelection,
    /// Transcript of the conversation
    pub log: ConversationLog,
    /// Instruction sent by the most recent start
    pub instruction: Option<String>,
}

impl PracticeSession {
    pub fn new(selection: SessionSelection) -> Self {
        Self {
            selection,
            ..Self::default()
        }
    }

    /// The instruction followed by every turn of the transcript
    pub fn history(&self) -> Vec<ChatMessage> {
        self.instruction
            .iter()
            .map(ChatMessage::system)
            .chain(self.log.snapshot().map(super::Turn::to_chat_message))
            .collect()
    }
}
