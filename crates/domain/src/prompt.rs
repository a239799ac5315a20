//! System instruction for the practice conversation

use tera::{Context, Tera};

use crate::{entities::SessionSelection, errors::DomainError};

/// Template with the four named placeholders filled by [`PromptVariables`]
pub const TUTOR_TEMPLATE: &str = "You are an AI language learning assistant dedicated to helping learners practice their {{ language }}.
In this interaction, you will initiate and lead a conversation about a {{ topic }} that the language learner selects.
The conversation's length and complexity will vary based on the proficiency level chosen by the language learner.
You will interact with the human in the role of a {{ proficiency_level }} speaker.
Language Proficiency Requirement: {{ lang_requirement }}";

/// Values substituted into the template
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptVariables<'a> {
    pub language: &'a str,
    pub topic: &'a str,
    pub proficiency_level: &'a str,
    pub lang_requirement: &'a str,
}

impl<'a> PromptVariables<'a> {
    /// Resolve the variables of a selection through the registry
    pub const fn from_selection(selection: &SessionSelection) -> Self {
        Self {
            language: selection.language.display_name(),
            topic: selection.topic.label(),
            proficiency_level: selection.proficiency_level.label(),
            lang_requirement: selection.proficiency_level.constraint_text(),
        }
    }

    const fn named(&self) -> [(&'static str, &'a str); 4] {
        [
            ("language", self.language),
            ("topic", self.topic),
            ("proficiency_level", self.proficiency_level),
            ("lang_requirement", self.lang_requirement),
        ]
    }

    fn context(&self) -> Context {
        let mut context = Context::new();
        for (name, value) in self.named() {
            context.insert(name, value);
        }
        context
    }
}

/// Fill `template` with the variables
///
/// Every variable must be non-empty. Values are inserted verbatim, without
/// HTML escaping.
pub fn render(template: &str, vars: &PromptVariables<'_>) -> Result<String, DomainError> {
    if let Some((name, _)) = vars.named().iter().find(|(_, value)| value.trim().is_empty()) {
        return Err(DomainError::EmptyPromptVariable((*name).to_string()));
    }

    Tera::one_off(template, &vars.context(), false)
        .map_err(|e| DomainError::PromptTemplate(e.to_string()))
}

/// Build the tutor instruction for the current selection
pub fn build_system_prompt(selection: &SessionSelection) -> Result<String, DomainError> {
    render(TUTOR_TEMPLATE, &PromptVariables::from_selection(selection))
}
