//! # Chat Store
//!
//! Holds everything a chat UI renders from. Mirrors the server's push
//! semantics: only events that belong to the currently selected conversation
//! change the message list, and presence comes from `getOnlineUsers`
//! broadcasts.

use lib_core::dto::{AiChatEntry, ChatMessage, PushEvent, UserInfo};

/// Client-side chat state.
#[derive(Debug, Default)]
pub struct ChatStore {
    me: i64,
    contacts: Vec<UserInfo>,
    online_users: Vec<i64>,
    selected_user: Option<i64>,
    messages: Vec<ChatMessage>,
    ai_transcript: Vec<AiChatEntry>,
}

impl ChatStore {
    /// A store for the authenticated user `me`.
    pub fn new(me: i64) -> Self {
        Self {
            me,
            ..Default::default()
        }
    }

    // region: --- Contacts & presence

    pub fn set_contacts(&mut self, contacts: Vec<UserInfo>) {
        self.contacts = contacts;
    }

    pub fn contacts(&self) -> &[UserInfo] {
        &self.contacts
    }

    pub fn is_online(&self, user_id: i64) -> bool {
        self.online_users.contains(&user_id)
    }

    pub fn online_users(&self) -> &[i64] {
        &self.online_users
    }

    // endregion: --- Contacts & presence

    // region: --- Conversation

    /// Open a conversation, replacing the message list with the fetched
    /// history.
    pub fn select_conversation(&mut self, user_id: i64, history: Vec<ChatMessage>) {
        self.selected_user = Some(user_id);
        self.messages = history;
    }

    pub fn selected_user(&self) -> Option<i64> {
        self.selected_user
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Append a message the user just sent. The sender renders from the
    /// HTTP response; the push channel only carries it to the other party.
    pub fn push_sent(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    /// Remove a message from this client's view only. Nothing is sent to
    /// the server, the other participant still sees it, and it reappears on
    /// the next history fetch.
    pub fn delete_for_me(&mut self, message_id: i64) {
        self.messages.retain(|m| m.id != message_id);
    }

    // endregion: --- Conversation

    // region: --- Assistant transcript

    pub fn set_ai_transcript(&mut self, transcript: Vec<AiChatEntry>) {
        self.ai_transcript = transcript;
    }

    pub fn ai_transcript(&self) -> &[AiChatEntry] {
        &self.ai_transcript
    }

    // endregion: --- Assistant transcript

    /// Fold a push-channel event into the store.
    pub fn apply_event(&mut self, event: PushEvent) {
        match event {
            PushEvent::NewMessage(message) => {
                if self.belongs_to_selected(message.sender_id, message.receiver_id) {
                    self.messages.push(message);
                }
            }
            PushEvent::MessageDeleted(payload) => {
                if self.belongs_to_selected(payload.sender_id, payload.receiver_id) {
                    self.messages.retain(|m| m.id != payload.message_id);
                }
            }
            PushEvent::GetOnlineUsers(ids) => {
                self.online_users = ids;
            }
        }
    }

    /// Whether a (sender, receiver) pair is the currently open conversation.
    fn belongs_to_selected(&self, sender_id: i64, receiver_id: i64) -> bool {
        match self.selected_user {
            Some(selected) => {
                (sender_id == selected && receiver_id == self.me)
                    || (receiver_id == selected && sender_id == self.me)
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lib_core::dto::MessageDeleted;

    fn msg(id: i64, sender_id: i64, receiver_id: i64, text: &str) -> ChatMessage {
        ChatMessage {
            id,
            sender_id,
            receiver_id,
            text: Some(text.to_string()),
            image: None,
            created_at: "2024-01-01T00:00:00+00:00".to_string(),
        }
    }

    #[test]
    fn test_new_message_for_selected_conversation_is_appended() {
        let mut store = ChatStore::new(1);
        store.select_conversation(2, vec![]);

        store.apply_event(PushEvent::NewMessage(msg(10, 2, 1, "hi")));

        assert_eq!(store.messages().len(), 1);
        assert_eq!(store.messages()[0].id, 10);
    }

    #[test]
    fn test_new_message_for_other_conversation_is_ignored() {
        let mut store = ChatStore::new(1);
        store.select_conversation(2, vec![]);

        // From user 3, while talking to user 2.
        store.apply_event(PushEvent::NewMessage(msg(10, 3, 1, "psst")));

        assert!(store.messages().is_empty());
    }

    #[test]
    fn test_message_deleted_removes_from_open_conversation() {
        let mut store = ChatStore::new(1);
        store.select_conversation(2, vec![msg(10, 2, 1, "oops"), msg(11, 1, 2, "ok")]);

        store.apply_event(PushEvent::MessageDeleted(MessageDeleted {
            message_id: 10,
            sender_id: 2,
            receiver_id: 1,
        }));

        let ids: Vec<i64> = store.messages().iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![11]);
    }

    #[test]
    fn test_delete_for_me_is_local_and_non_durable() {
        let mut store = ChatStore::new(1);
        let history = vec![msg(10, 2, 1, "hi"), msg(11, 1, 2, "yo")];
        store.select_conversation(2, history.clone());

        store.delete_for_me(10);
        assert_eq!(store.messages().len(), 1);

        // The server never heard about it: the next history fetch brings
        // the message back.
        store.select_conversation(2, history);
        assert_eq!(store.messages().len(), 2);
    }

    #[test]
    fn test_online_users_follow_broadcasts() {
        let mut store = ChatStore::new(1);

        store.apply_event(PushEvent::GetOnlineUsers(vec![1, 2]));
        assert!(store.is_online(2));

        store.apply_event(PushEvent::GetOnlineUsers(vec![1]));
        assert!(!store.is_online(2));
    }

    #[test]
    fn test_push_sent_appends_own_message() {
        let mut store = ChatStore::new(1);
        store.select_conversation(2, vec![]);

        store.push_sent(msg(12, 1, 2, "sent"));

        assert_eq!(store.messages().len(), 1);
    }
}
