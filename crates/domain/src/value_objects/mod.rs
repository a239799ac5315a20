//! Value Objects - Immutable, identity-less domain primitives

mod audio_format;
mod ids;
mod language;
mod listening;
mod proficiency;
mod topic;

pub use audio_format::AudioFormat;
pub use ids::{ClipId, TurnId};
pub use language::Language;
pub use listening::ListeningState;
pub use proficiency::{ProficiencyLevel, ProficiencyProfile};
pub use topic::Topic;
