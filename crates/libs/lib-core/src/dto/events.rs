//! # Push Channel Events
//!
//! Server-to-client events delivered over the WebSocket channel. The wire
//! form is `{"event": <name>, "data": <payload>}` with the event names the
//! clients subscribe to: `newMessage`, `messageDeleted`, `getOnlineUsers`.

use serde::{Deserialize, Serialize};

use super::chat::ChatMessage;

/// Payload of a `messageDeleted` event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MessageDeleted {
    pub message_id: i64,
    pub sender_id: i64,
    pub receiver_id: i64,
}

/// An event pushed over a delivery channel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum PushEvent {
    /// A message was created for the receiving user.
    NewMessage(ChatMessage),
    /// A message was deleted by its sender.
    MessageDeleted(MessageDeleted),
    /// The full set of currently connected user ids; sent to every channel
    /// on each presence change.
    GetOnlineUsers(Vec<i64>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names_on_the_wire() {
        let event = PushEvent::GetOnlineUsers(vec![1, 2]);
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "getOnlineUsers");
        assert_eq!(json["data"], serde_json::json!([1, 2]));

        let deleted = PushEvent::MessageDeleted(MessageDeleted {
            message_id: 9,
            sender_id: 1,
            receiver_id: 2,
        });
        let json = serde_json::to_value(&deleted).unwrap();
        assert_eq!(json["event"], "messageDeleted");
        assert_eq!(json["data"]["messageId"], 9);
    }
}
