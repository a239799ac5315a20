//! Conversation log - the append-only transcript of a practice session

use std::slice;

use serde::Serialize;

use super::{Sender, Turn};

/// Ordered turns of the active session (oldest first)
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct ConversationLog {
    turns: Vec<Turn>,
}

impl ConversationLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one turn at the end and return it
    pub fn append(&mut self, sender: Sender, content: impl Into<String>) -> &Turn {
        let index = self.turns.len();
        self.turns.push(Turn::new(sender, content));
        &self.turns[index]
    }

    /// Remove every turn
    pub fn clear(&mut self) {
        self.turns.clear();
    }

    /// Iterate the turns in insertion order
    ///
    /// The iterator borrows the log, is `Clone` and can be restarted by
    /// calling `snapshot` again.
    pub fn snapshot(&self) -> slice::Iter<'_, Turn> {
        self.turns.iter()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }
}

impl<'a> IntoIterator for &'a ConversationLog {
    type Item = &'a Turn;
    type IntoIter = slice::Iter<'a, Turn>;

    fn into_iter(self) -> Self::IntoIter {
        self.snapshot()
    }
}
