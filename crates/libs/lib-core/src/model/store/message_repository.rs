//! # Message Repository
//!
//! Persistence for direct messages: create, two-sided history lookup by
//! participant pair, and delete. History ordering (creation time ascending,
//! row id as tiebreak within the same second) is the conversation's only
//! consistency guarantee.

use super::models::Message;
use super::DbPool;
use sqlx::query_as;

/// Message repository for database operations.
pub struct MessageRepository;

impl MessageRepository {
    /// Persist a new message and return it.
    pub async fn create(
        pool: &DbPool,
        sender_id: i64,
        receiver_id: i64,
        text: Option<&str>,
        image: Option<&str>,
    ) -> Result<Message, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO messages (sender_id, receiver_id, text, image) VALUES (?, ?, ?, ?)",
        )
        .bind(sender_id)
        .bind(receiver_id)
        .bind(text)
        .bind(image)
        .execute(pool)
        .await?;

        let id = result.last_insert_rowid();

        query_as::<_, Message>("SELECT * FROM messages WHERE id = ?")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// All messages between a pair of users, in either direction, oldest
    /// first.
    pub async fn find_between(
        pool: &DbPool,
        user_a: i64,
        user_b: i64,
    ) -> Result<Vec<Message>, sqlx::Error> {
        query_as::<_, Message>(
            r#"
            SELECT *
            FROM messages
            WHERE (sender_id = ? AND receiver_id = ?)
               OR (sender_id = ? AND receiver_id = ?)
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(user_a)
        .bind(user_b)
        .bind(user_b)
        .bind(user_a)
        .fetch_all(pool)
        .await
    }

    /// Find a message by id.
    pub async fn find_by_id(pool: &DbPool, id: i64) -> Result<Option<Message>, sqlx::Error> {
        query_as::<_, Message>("SELECT * FROM messages WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Delete a message row. Ownership is enforced at the service boundary,
    /// not here.
    pub async fn delete(pool: &DbPool, id: i64) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM messages WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }
}
