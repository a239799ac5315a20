//! Conversation topics

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Subject the assistant leads the conversation about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Topic {
    #[default]
    General,
    Science,
    History,
    Art,
}

impl Topic {
    /// All topics in selector order
    pub const ALL: [Self; 4] = [Self::General, Self::Science, Self::History, Self::Art];

    pub const fn label(self) -> &'static str {
        match self {
            Self::General => "General",
            Self::Science => "Science",
            Self::History => "History",
            Self::Art => "Art",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Topic {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|topic| topic.label() == s)
            .ok_or_else(|| DomainError::unknown_option("topic", s))
    }
}
