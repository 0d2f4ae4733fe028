//! # Conversation Service
//!
//! Orchestrates direct messaging: validate participants, persist, then push
//! to the recipient's channel if they are connected. The HTTP response
//! independently confirms creation to the sender; the push goes only to the
//! *other* party so the sender does not double-render.

use lib_core::dto::{ChatMessage, MessageDeleted, PushEvent, SendMessageRequest, UserInfo};
use lib_core::model::store::{MessageRepository, UserRepository};
use lib_core::{AppError, DbPool, Result};
use lib_utils::validation::parse_user_id;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::presence::PresenceRegistry;
use crate::services::assets::AssetStore;

/// Direct-message orchestration.
pub struct ChatService {
    db: DbPool,
    presence: Arc<PresenceRegistry>,
    assets: Arc<dyn AssetStore>,
}

impl ChatService {
    pub fn new(db: DbPool, presence: Arc<PresenceRegistry>, assets: Arc<dyn AssetStore>) -> Self {
        Self {
            db,
            presence,
            assets,
        }
    }

    /// All users except the requester, credential fields stripped.
    pub async fn list_contacts(&self, requester_id: i64) -> Result<Vec<UserInfo>> {
        let users = UserRepository::list_except(&self.db, requester_id).await?;
        Ok(users.into_iter().map(UserInfo::from).collect())
    }

    /// All messages between the requester and `other`, in either direction,
    /// oldest first. Both identifiers must be well-formed; existence is not
    /// checked.
    pub async fn fetch_history(&self, requester_id: i64, other: &str) -> Result<Vec<ChatMessage>> {
        let other_id = parse_user_id(other).map_err(AppError::InvalidIdentifier)?;
        if requester_id <= 0 {
            return Err(AppError::InvalidIdentifier(format!(
                "Invalid user id: {requester_id}"
            )));
        }

        let rows = MessageRepository::find_between(&self.db, requester_id, other_id).await?;
        Ok(rows.into_iter().map(ChatMessage::from).collect())
    }

    /// Persist a message and push it to the receiver's channel if present.
    ///
    /// A message must carry text or an image; when an image is supplied it
    /// is first handed to the asset host and only the durable URL is stored.
    #[instrument(skip(self, req))]
    pub async fn send_message(
        &self,
        sender_id: i64,
        receiver: &str,
        req: SendMessageRequest,
    ) -> Result<ChatMessage> {
        let receiver_id = parse_user_id(receiver).map_err(AppError::InvalidIdentifier)?;

        let text = req.text.filter(|t| !t.trim().is_empty());
        let image = req.image.filter(|i| !i.trim().is_empty());
        if text.is_none() && image.is_none() {
            return Err(AppError::EmptyRequest(
                "Message needs text or an image".to_string(),
            ));
        }

        let image_url = match image {
            Some(image) => Some(self.assets.upload(&image).await?),
            None => None,
        };

        let row = MessageRepository::create(
            &self.db,
            sender_id,
            receiver_id,
            text.as_deref(),
            image_url.as_deref(),
        )
        .await?;
        let message = ChatMessage::from(row);

        let delivered = self
            .presence
            .emit_to_user(receiver_id, PushEvent::NewMessage(message.clone()));
        debug!(receiver_id, delivered, "[CHAT] message persisted");

        Ok(message)
    }

    /// Delete a message "for everyone". Only the original sender may do
    /// this; the other participant is notified over their channel.
    #[instrument(skip(self))]
    pub async fn delete_message(&self, requester_id: i64, message_id: &str) -> Result<()> {
        let message_id = message_id
            .trim()
            .parse::<i64>()
            .map_err(|_| AppError::NotFound("Message not found".to_string()))?;

        let message = MessageRepository::find_by_id(&self.db, message_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Message not found".to_string()))?;

        if message.sender_id != requester_id {
            return Err(AppError::Forbidden(
                "Only the sender can delete a message".to_string(),
            ));
        }

        MessageRepository::delete(&self.db, message.id).await?;

        // Notify whichever participant is not the requester.
        let other = if message.receiver_id == requester_id {
            message.sender_id
        } else {
            message.receiver_id
        };
        self.presence.emit_to_user(
            other,
            PushEvent::MessageDeleted(MessageDeleted {
                message_id: message.id,
                sender_id: message.sender_id,
                receiver_id: message.receiver_id,
            }),
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{setup_test_db, test_user, StaticAssetStore};
    use async_trait::async_trait;
    use tokio::sync::mpsc;
    use uuid::Uuid;

    fn service(db: DbPool, presence: Arc<PresenceRegistry>) -> ChatService {
        ChatService::new(db, presence, Arc::new(StaticAssetStore::default()))
    }

    fn text_req(text: &str) -> SendMessageRequest {
        SendMessageRequest {
            text: Some(text.to_string()),
            image: None,
        }
    }

    /// Register a test delivery channel for a user, draining the
    /// registration broadcast so assertions start clean.
    async fn connect(
        presence: &PresenceRegistry,
        user_id: i64,
    ) -> (Uuid, mpsc::UnboundedReceiver<PushEvent>) {
        let channel = Uuid::new_v4();
        let (tx, mut rx) = mpsc::unbounded_channel();
        presence.register(user_id, channel, tx);
        let _ = rx.recv().await;
        (channel, rx)
    }

    #[tokio::test]
    async fn test_send_persists_and_pushes_to_receiver() {
        let db = setup_test_db().await;
        let u1 = test_user(&db, "u1@example.com", "User One").await;
        let u2 = test_user(&db, "u2@example.com", "User Two").await;
        let presence = Arc::new(PresenceRegistry::new());
        let (_c2, mut rx2) = connect(&presence, u2).await;
        let svc = service(db.clone(), presence);

        let sent = svc
            .send_message(u1, &u2.to_string(), text_req("hi"))
            .await
            .unwrap();

        assert_eq!(sent.sender_id, u1);
        assert_eq!(sent.receiver_id, u2);
        assert_eq!(sent.text.as_deref(), Some("hi"));

        // The receiver's channel got a newMessage push.
        match rx2.recv().await.unwrap() {
            PushEvent::NewMessage(msg) => assert_eq!(msg.id, sent.id),
            other => panic!("unexpected event: {other:?}"),
        }

        // Read-after-write: history for the pair includes it.
        let history = svc.fetch_history(u2, &u1.to_string()).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].id, sent.id);
    }

    #[tokio::test]
    async fn test_send_to_offline_receiver_is_not_an_error() {
        let db = setup_test_db().await;
        let u1 = test_user(&db, "u1@example.com", "User One").await;
        let u2 = test_user(&db, "u2@example.com", "User Two").await;
        let presence = Arc::new(PresenceRegistry::new());

        // u2 connects, receives one message, then disconnects.
        let (c2, mut rx2) = connect(&presence, u2).await;
        let svc = service(db.clone(), presence.clone());

        svc.send_message(u1, &u2.to_string(), text_req("hi"))
            .await
            .unwrap();
        assert!(matches!(
            rx2.recv().await.unwrap(),
            PushEvent::NewMessage(_)
        ));

        presence.unregister(c2);

        // Second send succeeds with no push emitted anywhere.
        let sent = svc
            .send_message(u1, &u2.to_string(), text_req("bye"))
            .await
            .unwrap();
        assert_eq!(sent.text.as_deref(), Some("bye"));
        assert!(presence.lookup(u2).is_none());

        // Both messages appear on the next history fetch.
        let history = svc.fetch_history(u2, &u1.to_string()).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].text.as_deref(), Some("bye"));
    }

    #[tokio::test]
    async fn test_sender_channel_is_not_pushed() {
        let db = setup_test_db().await;
        let u1 = test_user(&db, "u1@example.com", "User One").await;
        let u2 = test_user(&db, "u2@example.com", "User Two").await;
        let presence = Arc::new(PresenceRegistry::new());
        let (_c1, mut rx1) = connect(&presence, u1).await;
        let svc = service(db.clone(), presence);

        svc.send_message(u1, &u2.to_string(), text_req("hi"))
            .await
            .unwrap();

        // The sender updates from the HTTP response, not from the push.
        assert!(rx1.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_send_rejects_empty_message() {
        let db = setup_test_db().await;
        let u1 = test_user(&db, "u1@example.com", "User One").await;
        let u2 = test_user(&db, "u2@example.com", "User Two").await;
        let svc = service(db, Arc::new(PresenceRegistry::new()));

        let err = svc
            .send_message(
                u1,
                &u2.to_string(),
                SendMessageRequest {
                    text: Some("   ".to_string()),
                    image: None,
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::EmptyRequest(_)));
    }

    #[tokio::test]
    async fn test_send_image_stores_uploaded_url() {
        let db = setup_test_db().await;
        let u1 = test_user(&db, "u1@example.com", "User One").await;
        let u2 = test_user(&db, "u2@example.com", "User Two").await;
        let svc = service(db, Arc::new(PresenceRegistry::new()));

        let sent = svc
            .send_message(
                u1,
                &u2.to_string(),
                SendMessageRequest {
                    text: None,
                    image: Some("data:image/png;base64,aGk=".to_string()),
                },
            )
            .await
            .unwrap();

        assert_eq!(
            sent.image.as_deref(),
            Some(StaticAssetStore::UPLOADED_URL),
            "the stored image must be the asset host URL, not the raw upload"
        );
    }

    #[tokio::test]
    async fn test_asset_host_failure_surfaces_as_upstream() {
        struct FailingAssets;
        #[async_trait]
        impl AssetStore for FailingAssets {
            async fn upload(&self, _image: &str) -> lib_core::Result<String> {
                Err(AppError::Upstream("asset host down".to_string()))
            }
        }

        let db = setup_test_db().await;
        let u1 = test_user(&db, "u1@example.com", "User One").await;
        let u2 = test_user(&db, "u2@example.com", "User Two").await;
        let svc = ChatService::new(db.clone(), Arc::new(PresenceRegistry::new()), Arc::new(FailingAssets));

        let err = svc
            .send_message(
                u1,
                &u2.to_string(),
                SendMessageRequest {
                    text: None,
                    image: Some("data:image/png;base64,aGk=".to_string()),
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Upstream(_)));
        // Nothing was persisted.
        let history = svc.fetch_history(u1, &u2.to_string()).await.unwrap();
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_history_rejects_malformed_identifier() {
        let db = setup_test_db().await;
        let u1 = test_user(&db, "u1@example.com", "User One").await;
        let svc = service(db, Arc::new(PresenceRegistry::new()));

        for bad in ["abc", "", "-1", "0"] {
            let err = svc.fetch_history(u1, bad).await.unwrap_err();
            assert!(matches!(err, AppError::InvalidIdentifier(_)), "{bad:?}");
        }
    }

    #[tokio::test]
    async fn test_delete_by_sender_removes_and_notifies_receiver() {
        let db = setup_test_db().await;
        let u1 = test_user(&db, "u1@example.com", "User One").await;
        let u2 = test_user(&db, "u2@example.com", "User Two").await;
        let presence = Arc::new(PresenceRegistry::new());
        let (_c2, mut rx2) = connect(&presence, u2).await;
        let svc = service(db.clone(), presence);

        let sent = svc
            .send_message(u1, &u2.to_string(), text_req("oops"))
            .await
            .unwrap();
        let _ = rx2.recv().await; // the newMessage push

        svc.delete_message(u1, &sent.id.to_string()).await.unwrap();

        match rx2.recv().await.unwrap() {
            PushEvent::MessageDeleted(payload) => {
                assert_eq!(payload.message_id, sent.id);
                assert_eq!(payload.sender_id, u1);
                assert_eq!(payload.receiver_id, u2);
            }
            other => panic!("unexpected event: {other:?}"),
        }

        // Gone for both participants.
        assert!(svc.fetch_history(u1, &u2.to_string()).await.unwrap().is_empty());
        assert!(svc.fetch_history(u2, &u1.to_string()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_by_non_sender_is_forbidden() {
        let db = setup_test_db().await;
        let u1 = test_user(&db, "u1@example.com", "User One").await;
        let u2 = test_user(&db, "u2@example.com", "User Two").await;
        let svc = service(db, Arc::new(PresenceRegistry::new()));

        let sent = svc
            .send_message(u1, &u2.to_string(), text_req("mine"))
            .await
            .unwrap();

        let err = svc
            .delete_message(u2, &sent.id.to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        // The message is untouched.
        let history = svc.fetch_history(u1, &u2.to_string()).await.unwrap();
        assert_eq!(history.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_missing_message_is_not_found() {
        let db = setup_test_db().await;
        let u1 = test_user(&db, "u1@example.com", "User One").await;
        let svc = service(db, Arc::new(PresenceRegistry::new()));

        let err = svc.delete_message(u1, "9999").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let err = svc.delete_message(u1, "not-a-number").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_list_contacts_excludes_requester() {
        let db = setup_test_db().await;
        let u1 = test_user(&db, "u1@example.com", "User One").await;
        let u2 = test_user(&db, "u2@example.com", "User Two").await;
        let svc = service(db, Arc::new(PresenceRegistry::new()));

        let contacts = svc.list_contacts(u1).await.unwrap();

        assert_eq!(contacts.len(), 1);
        assert_eq!(contacts[0].id, u2);
    }
}
