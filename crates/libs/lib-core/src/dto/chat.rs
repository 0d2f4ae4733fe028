//! # Chat Data Transfer Objects
//!
//! Structures for direct messages and assistant conversations.

use serde::{Deserialize, Serialize};

use crate::model::store::models::{AiMessage, Message};

/// Body of `POST /api/chat/send/{id}`. At least one of `text`/`image` must
/// be present; `image` is a base64 `data:` URI.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SendMessageRequest {
    pub text: Option<String>,
    pub image: Option<String>,
}

/// A direct message as seen by clients.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: i64,
    pub sender_id: i64,
    pub receiver_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub created_at: String,
}

impl From<Message> for ChatMessage {
    fn from(m: Message) -> Self {
        Self {
            id: m.id,
            sender_id: m.sender_id,
            receiver_id: m.receiver_id,
            text: m.text,
            image: m.image,
            created_at: lib_utils::time::format_time(m.created_at),
        }
    }
}

/// Body of `POST /api/aichat/ai`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AskAiRequest {
    pub question: Option<String>,
    pub image: Option<String>,
}

/// Response of `POST /api/aichat/ai`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiReplyResponse {
    pub success: bool,
    pub reply: String,
}

/// Whose turn a transcript entry belongs to. Derived per request by
/// comparing the row's sender to the requester, never stored.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AiRole {
    User,
    Ai,
}

/// One entry of the assistant transcript.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AiChatEntry {
    pub role: AiRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub timestamp: String,
}

impl AiChatEntry {
    /// Tag a stored row with the requester-relative role.
    pub fn from_row(row: AiMessage, requester_id: i64) -> Self {
        let role = if row.sender_id == requester_id {
            AiRole::User
        } else {
            AiRole::Ai
        };
        Self {
            role,
            content: row.text,
            image: row.image,
            timestamp: lib_utils::time::format_time(row.created_at),
        }
    }
}

/// Response of `GET /api/aichat/history`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiHistoryResponse {
    pub success: bool,
    pub chats: Vec<AiChatEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_message_wire_shape() {
        let msg = ChatMessage {
            id: 1,
            sender_id: 2,
            receiver_id: 3,
            text: Some("hi".to_string()),
            image: None,
            created_at: "2024-01-01T00:00:00+00:00".to_string(),
        };

        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["senderId"], 2);
        assert_eq!(json["receiverId"], 3);
        assert!(json.get("image").is_none());
    }

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&AiRole::Ai).unwrap(), "\"ai\"");
        assert_eq!(serde_json::to_string(&AiRole::User).unwrap(), "\"user\"");
    }
}
