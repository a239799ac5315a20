//! Domain entities - Objects with identity and lifecycle

mod chat_message;
mod conversation;
mod selection;
mod session;
mod turn;

pub use chat_message::{ChatMessage, MessageRole};
pub use conversation::ConversationLog;
pub use selection::{SelectionChange, SessionSelection};
pub use session::PracticeSession;
pub use turn::{Sender, Turn};
