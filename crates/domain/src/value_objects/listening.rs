//! Listening flag of the speech input

use serde::{Deserialize, Serialize};

/// Whether the microphone is currently capturing an utterance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListeningState {
    #[default]
    Idle,
    Listening,
}

impl ListeningState {
    pub const fn is_listening(self) -> bool {
        matches!(self, Self::Listening)
    }

    /// State after a toggle
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Idle => Self::Listening,
            Self::Listening => Self::Idle,
        }
    }
}
