//! Target languages offered for practice

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// A practice language and its speech code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Language {
    #[default]
    English,
    German,
    Spanish,
    French,
    Italian,
}

impl Language {
    /// All languages in selector order
    pub const ALL: [Self; 5] = [
        Self::English,
        Self::German,
        Self::Spanish,
        Self::French,
        Self::Italian,
    ];

    /// Human-readable label shown in the selector
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::English => "English",
            Self::German => "German",
            Self::Spanish => "Spanish",
            Self::French => "French",
            Self::Italian => "Italian",
        }
    }

    /// ISO 639-1 code used by speech synthesis and recognition
    pub const fn speech_code(self) -> &'static str {
        match self {
            Self::English => "en",
            Self::German => "de",
            Self::Spanish => "es",
            Self::French => "fr",
            Self::Italian => "it",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Language {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|lang| lang.display_name() == s)
            .ok_or_else(|| DomainError::unknown_option("language", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn speech_codes_match_registry() {
        assert_eq!(Language::English.speech_code(), "en");
        assert_eq!(Language::German.speech_code(), "de");
        assert_eq!(Language::Spanish.speech_code(), "es");
        assert_eq!(Language::French.speech_code(), "fr");
        assert_eq!(Language::Italian.speech_code(), "it");
    }

    #[test]
    fn parses_display_name() {
        assert_eq!("German".parse::<Language>().unwrap(), Language::German);
    }

    #[test]
    fn parse_rejects_unknown_label() {
        let err = "Klingon".parse::<Language>().unwrap_err();
        assert!(matches!(err, DomainError::UnknownOption { .. }));
    }

    #[test]
    fn parse_is_case_sensitive() {
        assert!("german".parse::<Language>().is_err());
    }

    #[test]
    fn default_is_first_option() {
        assert_eq!(Language::default(), Language::ALL[0]);
    }

    #[test]
    fn display_uses_label() {
        assert_eq!(Language::French.to_string(), "French");
    }

    #[test]
    fn serializes_as_label() {
        let json = serde_json::to_string(&Language::Italian).unwrap();
        assert_eq!(json, "\"Italian\"");
    }
}
