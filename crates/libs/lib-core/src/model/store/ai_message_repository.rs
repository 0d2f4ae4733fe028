//! # AI Message Repository
//!
//! Persistence for assistant conversations. Rows use the same two-sided
//! lookup pattern as direct messages; one side of every row is the fixed
//! assistant identity ([`crate::AI_ASSISTANT_ID`]).

use super::models::AiMessage;
use super::DbPool;
use crate::AI_ASSISTANT_ID;
use sqlx::query_as;

/// AI message repository for database operations.
pub struct AiMessageRepository;

impl AiMessageRepository {
    /// Persist one side of an exchange. The question and the answer are two
    /// independent writes; there is no transactional grouping.
    pub async fn create(
        pool: &DbPool,
        sender_id: i64,
        receiver_id: i64,
        text: Option<&str>,
        image: Option<&str>,
    ) -> Result<AiMessage, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO ai_messages (sender_id, receiver_id, text, image) VALUES (?, ?, ?, ?)",
        )
        .bind(sender_id)
        .bind(receiver_id)
        .bind(text)
        .bind(image)
        .execute(pool)
        .await?;

        let id = result.last_insert_rowid();

        query_as::<_, AiMessage>("SELECT * FROM ai_messages WHERE id = ?")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// The full assistant transcript for a user, oldest first.
    pub async fn find_for_user(pool: &DbPool, user_id: i64) -> Result<Vec<AiMessage>, sqlx::Error> {
        query_as::<_, AiMessage>(
            r#"
            SELECT *
            FROM ai_messages
            WHERE (sender_id = ? AND receiver_id = ?)
               OR (sender_id = ? AND receiver_id = ?)
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(user_id)
        .bind(AI_ASSISTANT_ID)
        .bind(AI_ASSISTANT_ID)
        .bind(user_id)
        .fetch_all(pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::store::test_support::setup_test_db;

    #[tokio::test]
    async fn test_exchange_is_two_rows() {
        let pool = setup_test_db().await;

        AiMessageRepository::create(&pool, 7, AI_ASSISTANT_ID, Some("2+2?"), None)
            .await
            .unwrap();
        AiMessageRepository::create(&pool, AI_ASSISTANT_ID, 7, Some("4"), None)
            .await
            .unwrap();

        let transcript = AiMessageRepository::find_for_user(&pool, 7).await.unwrap();

        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript[0].sender_id, 7);
        assert_eq!(transcript[0].text.as_deref(), Some("2+2?"));
        assert_eq!(transcript[1].sender_id, AI_ASSISTANT_ID);
        assert_eq!(transcript[1].text.as_deref(), Some("4"));
    }

    #[tokio::test]
    async fn test_transcripts_are_per_user() {
        let pool = setup_test_db().await;

        AiMessageRepository::create(&pool, 7, AI_ASSISTANT_ID, Some("mine"), None)
            .await
            .unwrap();
        AiMessageRepository::create(&pool, 8, AI_ASSISTANT_ID, Some("theirs"), None)
            .await
            .unwrap();

        let transcript = AiMessageRepository::find_for_user(&pool, 7).await.unwrap();

        assert_eq!(transcript.len(), 1);
        assert_eq!(transcript[0].text.as_deref(), Some("mine"));
    }
}
