//! # AI Conversation Service
//!
//! A variant of the conversation service where one participant is the fixed
//! synthetic assistant identity. The human's content goes to the external
//! generation API; the exchange is persisted as two independent rows
//! (question, answer) and the answer is pushed to the human's channel.
//!
//! The two writes are not grouped in a transaction: a crash between them
//! leaves an orphaned question with no answer. Accepted limitation.

use lib_core::dto::{AiChatEntry, AskAiRequest, ChatMessage, PushEvent};
use lib_core::model::store::AiMessageRepository;
use lib_core::{AppError, DbPool, Result, AI_ASSISTANT_ID};
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::presence::PresenceRegistry;
use crate::services::assets::AssetStore;
use crate::services::generation::{InlineImage, ReplyGenerator};

/// Assistant conversation orchestration.
pub struct AiChatService {
    db: DbPool,
    presence: Arc<PresenceRegistry>,
    assets: Arc<dyn AssetStore>,
    generator: Arc<dyn ReplyGenerator>,
}

impl AiChatService {
    pub fn new(
        db: DbPool,
        presence: Arc<PresenceRegistry>,
        assets: Arc<dyn AssetStore>,
        generator: Arc<dyn ReplyGenerator>,
    ) -> Self {
        Self {
            db,
            presence,
            assets,
            generator,
        }
    }

    /// Ask the assistant. Requires at least one of question/image; returns
    /// the reply text.
    #[instrument(skip(self, req))]
    pub async fn ask(&self, user_id: i64, req: AskAiRequest) -> Result<String> {
        let question = req.question.filter(|q| !q.trim().is_empty());
        let image = req.image.filter(|i| !i.trim().is_empty());
        if question.is_none() && image.is_none() {
            return Err(AppError::EmptyRequest(
                "Question or image is required".to_string(),
            ));
        }

        // Decode the image into the generation collaborator's inline form
        // and upload it to the asset host for the persisted transcript.
        let inline = image.as_deref().map(InlineImage::from_data_uri).transpose()?;
        let image_url = match image.as_deref() {
            Some(image) => Some(self.assets.upload(image).await?),
            None => None,
        };

        let reply = self
            .generator
            .generate(question.as_deref(), inline.as_ref())
            .await?;

        // Two independent writes: human -> assistant, assistant -> human.
        AiMessageRepository::create(
            &self.db,
            user_id,
            AI_ASSISTANT_ID,
            question.as_deref(),
            image_url.as_deref(),
        )
        .await?;
        let answer =
            AiMessageRepository::create(&self.db, AI_ASSISTANT_ID, user_id, Some(&reply), None)
                .await?;

        let delivered = self.presence.emit_to_user(
            user_id,
            PushEvent::NewMessage(ChatMessage {
                id: answer.id,
                sender_id: answer.sender_id,
                receiver_id: answer.receiver_id,
                text: answer.text,
                image: answer.image,
                created_at: lib_utils::time::format_time(answer.created_at),
            }),
        );
        debug!(user_id, delivered, "[AICHAT] exchange persisted");

        Ok(reply)
    }

    /// The requester's assistant transcript, oldest first, with the role of
    /// each entry derived from its sender.
    pub async fn fetch_history(&self, user_id: i64) -> Result<Vec<AiChatEntry>> {
        let rows = AiMessageRepository::find_for_user(&self.db, user_id).await?;
        Ok(rows
            .into_iter()
            .map(|row| AiChatEntry::from_row(row, user_id))
            .collect())
    }
}
