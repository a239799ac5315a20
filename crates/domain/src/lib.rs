//! Domain layer for Polyglot
//!
//! Contains the selector registry, the tutor prompt, the conversation log and
//! domain errors. This layer has no I/O and defines the ubiquitous language.

pub mod entities;
pub mod errors;
pub mod prompt;
pub mod registry;
pub mod value_objects;

pub use entities::*;
pub use errors::DomainError;
pub use prompt::{PromptVariables, build_system_prompt};
pub use registry::{LanguageEntry, SelectorOptions, selector_options};
pub use value_objects::*;
