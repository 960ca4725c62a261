//! Conversation state machine for the atomchat client.
//!
//! [`Conversation`] owns the message history and pending-request
//! bookkeeping; [`lookup::LookupPanel`] owns the side panel's element
//! lookups. Both turn backend results into state mutations and navigation
//! intents, never into environment side effects.

pub mod conversation;
pub mod lookup;
pub mod message;

pub use conversation::{ANSWER_FALLBACK, Conversation, Phase, QuestionTurn};
pub use lookup::{LookupPanel, LookupTicket};
pub use message::{Message, Role, WELCOME_MESSAGE};
