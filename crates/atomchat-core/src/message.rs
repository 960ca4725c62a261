//! Message history model.

use atomchat_client::Answer;
use serde::{Deserialize, Serialize};

/// Deterministic greeting seeded into a fresh conversation; never fetched
/// from the backend.
pub const WELCOME_MESSAGE: &str = "Welcome! I'm your Periodic Table Facts Bot. Ask me anything about chemical elements, such as:\n\n- \"Tell me about Carbon\"\n- \"What's the electron configuration of Iron?\"\n- \"Why are noble gases unreactive?\"\n- \"Give me a fun fact about Gold\"";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// One entry in the conversation history. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_context: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub is_error: bool,
}

impl Message {
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            element_context: None,
            image_url: None,
            is_error: false,
        }
    }

    #[must_use]
    pub fn assistant_text(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            element_context: None,
            image_url: None,
            is_error: false,
        }
    }

    /// Assistant message carrying a backend answer.
    #[must_use]
    pub fn assistant(answer: Answer) -> Self {
        Self {
            role: Role::Assistant,
            content: answer.answer,
            element_context: answer.element_context,
            image_url: answer.image_url,
            is_error: false,
        }
    }

    /// Assistant-role error entry shown inline in the conversation.
    #[must_use]
    pub fn error(detail: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: detail.into(),
            element_context: None,
            image_url: None,
            is_error: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assistant_message_carries_answer_fields() {
        let message = Message::assistant(Answer {
            answer: "Iron is a transition metal.".to_string(),
            element_context: Some("Element Data for Iron (Fe)".to_string()),
            image_url: Some("https://example.com/table.png".to_string()),
        });
        assert_eq!(message.role, Role::Assistant);
        assert!(!message.is_error);
        assert_eq!(message.element_context.as_deref(), Some("Element Data for Iron (Fe)"));
    }

    #[test]
    fn error_message_is_assistant_role_with_flag() {
        let message = Message::error("Request to AI service timed out");
        assert_eq!(message.role, Role::Assistant);
        assert!(message.is_error);
        assert_eq!(message.element_context, None);
    }

    #[test]
    fn history_entries_round_trip_through_serde() {
        let message = Message::user("Tell me about Carbon");
        let encoded = serde_json::to_string(&message).expect("encode");
        let decoded: Message = serde_json::from_str(&encoded).expect("decode");
        assert_eq!(decoded, message);
    }
}
