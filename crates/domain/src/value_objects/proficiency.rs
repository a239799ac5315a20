//! Proficiency levels and their textual constraints

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

const BEGINNER_REQUIREMENT: &str = "maximum of 50 to 100 words. use as basic and simple \
     vocabulary and sentence structures as possible. Must avoid idioms, slang, and complex \
     grammatical constructs.";

const INTERMEDIATE_REQUIREMENT: &str = "maximum of 100 to 150 words. use a wider range of \
     vocabulary and a variety of sentence structures. You can include some idioms and \
     colloquial expressions, but avoid highly technical language or complex literary \
     expressions.";

const ADVANCED_REQUIREMENT: &str = "maximum of 150 to 200 words. use sophisticated \
     vocabulary, complex sentence structures, idioms, colloquial expressions, and technical \
     language where appropriate.";

/// Learner proficiency level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ProficiencyLevel {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl ProficiencyLevel {
    /// All levels in selector order
    pub const ALL: [Self; 3] = [Self::Beginner, Self::Intermediate, Self::Advanced];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Beginner => "Beginner",
            Self::Intermediate => "Intermediate",
            Self::Advanced => "Advanced",
        }
    }

    /// Instruction bounding vocabulary, length and complexity for this level
    pub const fn constraint_text(self) -> &'static str {
        match self {
            Self::Beginner => BEGINNER_REQUIREMENT,
            Self::Intermediate => INTERMEDIATE_REQUIREMENT,
            Self::Advanced => ADVANCED_REQUIREMENT,
        }
    }

    pub const fn profile(self) -> ProficiencyProfile {
        ProficiencyProfile {
            level: self,
            constraint_text: self.constraint_text(),
        }
    }
}

impl fmt::Display for ProficiencyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ProficiencyLevel {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|level| level.label() == s)
            .ok_or_else(|| DomainError::unknown_option("proficiency level", s))
    }
}

/// A level paired with its constraint text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProficiencyProfile {
    pub level: ProficiencyLevel,
    pub constraint_text: &'static str,
}
