//! Registry of selector options
//!
//! Single source for the language, topic and proficiency option lists and
//! for label lookups.

use serde::Serialize;

use crate::{
    errors::DomainError,
    value_objects::{Language, ProficiencyLevel, Topic},
};

/// A language option as offered to the UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LanguageEntry {
    pub display_name: &'static str,
    pub speech_code: &'static str,
}

/// All selector options in display order
#[derive(Debug, Clone, Serialize)]
pub struct SelectorOptions {
    pub languages: Vec<LanguageEntry>,
    pub topics: Vec<&'static str>,
    pub proficiency_levels: Vec<&'static str>,
}

pub fn language_entries() -> impl Iterator<Item = LanguageEntry> {
    Language::ALL.into_iter().map(|lang| LanguageEntry {
        display_name: lang.display_name(),
        speech_code: lang.speech_code(),
    })
}

pub fn selector_options() -> SelectorOptions {
    SelectorOptions {
        languages: language_entries().collect(),
        topics: Topic::ALL.iter().map(|t| t.label()).collect(),
        proficiency_levels: ProficiencyLevel::ALL.iter().map(|l| l.label()).collect(),
    }
}

/// Speech code for a language display name
pub fn speech_code(display_name: &str) -> Result<&'static str, DomainError> {
    display_name.parse::<Language>().map(Language::speech_code)
}

/// Constraint text for a proficiency name
pub fn constraint_text(level_name: &str) -> Result<&'static str, DomainError> {
    level_name
        .parse::<ProficiencyLevel>()
        .map(ProficiencyLevel::constraint_text)
}
