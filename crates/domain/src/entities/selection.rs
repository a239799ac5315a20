//! Session selection - the three selector values of the active session

use serde::{Deserialize, Serialize};

use crate::value_objects::{Language, ProficiencyLevel, Topic};

/// Language, topic and proficiency level currently chosen by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SessionSelection {
    pub language: Language,
    pub topic: Topic,
    pub proficiency_level: ProficiencyLevel,
}

/// A change to one or more selector axes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct SelectionChange {
    #[serde(default)]
    pub language: Option<Language>,
    #[serde(default)]
    pub topic: Option<Topic>,
    #[serde(default)]
    pub proficiency_level: Option<ProficiencyLevel>,
}

impl SessionSelection {
    pub const fn new(language: Language, topic: Topic, proficiency_level: ProficiencyLevel) -> Self {
        Self {
            language,
            topic,
            proficiency_level,
        }
    }

    /// Overwrite each axis present in the change, leaving the others intact
    pub fn apply(&mut self, change: SelectionChange) {
        if let Some(language) = change.language {
            self.language = language;
        }
        if let Some(topic) = change.topic {
            self.topic = topic;
        }
        if let Some(level) = change.proficiency_level {
            self.proficiency_level = level;
        }
    }

    pub const fn speech_code(&self) -> &'static str {
        self.language.speech_code()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_selection_uses_first_options() {
        let selection = SessionSelection::default();
        assert_eq!(selection.language, Language::English);
        assert_eq!(selection.topic, Topic::General);
        assert_eq!(selection.proficiency_level, ProficiencyLevel::Beginner);
    }

    #[test]
    fn apply_changes_only_given_axes() {
        let mut selection = SessionSelection::default();
        selection.apply(SelectionChange {
            language: Some(Language::Spanish),
            ..Default::default()
        });
        assert_eq!(selection.language, Language::Spanish);
        assert_eq!(selection.topic, Topic::General);

        selection.apply(SelectionChange {
            topic: Some(Topic::Art),
            proficiency_level: Some(ProficiencyLevel::Advanced),
            ..Default::default()
        });
        assert_eq!(selection.language, Language::Spanish);
        assert_eq!(selection.topic, Topic::Art);
        assert_eq!(selection.proficiency_level, ProficiencyLevel::Advanced);
    }

    #[test]
    fn latest_change_wins() {
        let mut selection = SessionSelection::default();
        selection.apply(SelectionChange {
            language: Some(Language::German),
            ..Default::default()
        });
        selection.apply(SelectionChange {
            language: Some(Language::Italian),
            ..Default::default()
        });
        assert_eq!(selection.language, Language::Italian);
        assert_eq!(selection.speech_code(), "it");
    }

    #[test]
    fn change_deserializes_partial_json() {
        let change: SelectionChange = serde_json::from_str(r#"{"topic":"History"}"#).unwrap();
        assert_eq!(change.topic, Some(Topic::History));
        assert!(change.language.is_none());
    }

    #[test]
    fn change_rejects_unknown_label() {
        let result: Result<SelectionChange, _> = serde_json::from_str(r#"{"language":"Klingon"}"#);
        assert!(result.is_err());
    }
}
