//! # User Repository
//!
//! Database access layer for user records, following the repository pattern:
//! a thin, typed abstraction over SQL queries.

use super::models::{User, UserForCreate};
use super::DbPool;
use chrono::{DateTime, Utc};
use sqlx::query_as;

/// User repository for database operations.
pub struct UserRepository;

impl UserRepository {
    /// Find a user by their email address.
    pub async fn find_by_email(pool: &DbPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        query_as::<_, User>("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by id.
    pub async fn find_by_id(pool: &DbPool, id: i64) -> Result<Option<User>, sqlx::Error> {
        query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Create a new user.
    ///
    /// # Errors
    ///
    /// Returns `sqlx::Error` on a UNIQUE constraint violation (duplicate
    /// email) or any connection failure.
    pub async fn create(pool: &DbPool, user_data: UserForCreate) -> Result<User, sqlx::Error> {
        let result =
            sqlx::query("INSERT INTO users (email, full_name, password_hash) VALUES (?, ?, ?)")
                .bind(&user_data.email)
                .bind(&user_data.full_name)
                .bind(&user_data.password_hash)
                .execute(pool)
                .await?;

        let id = result.last_insert_rowid();

        query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// List every user except the given one, newest first.
    ///
    /// Backs the contact list; callers strip credentials via `UserInfo`.
    pub async fn list_except(pool: &DbPool, user_id: i64) -> Result<Vec<User>, sqlx::Error> {
        query_as::<_, User>("SELECT * FROM users WHERE id != ? ORDER BY created_at DESC, id DESC")
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Store a fresh one-time passcode and its expiry on the user row.
    ///
    /// Overwrites whatever passcode was there before; each login attempt
    /// regenerates.
    pub async fn set_otp(
        pool: &DbPool,
        user_id: i64,
        otp: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE users SET otp = ?, otp_expires_at = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?",
        )
        .bind(otp)
        .bind(expires_at)
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Clear the one-time passcode after a successful verification.
    pub async fn clear_otp(pool: &DbPool, user_id: i64) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE users SET otp = NULL, otp_expires_at = NULL, updated_at = CURRENT_TIMESTAMP WHERE id = ?",
        )
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Update the profile picture URL, returning the updated user.
    pub async fn set_profile_pic(
        pool: &DbPool,
        user_id: i64,
        url: &str,
    ) -> Result<User, sqlx::Error> {
        sqlx::query(
            "UPDATE users SET profile_pic = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?",
        )
        .bind(url)
        .bind(user_id)
        .execute(pool)
        .await?;

        query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_one(pool)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::store::test_support::setup_test_db;
    use lib_auth::hash_password;

    async fn create_test_user(pool: &DbPool, email: &str, name: &str) -> User {
        let password_hash = hash_password("secret-password").unwrap();
        UserRepository::create(
            pool,
            UserForCreate::new(email.to_string(), name.to_string(), password_hash),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_create_user() {
        let pool = setup_test_db().await;

        let user = create_test_user(&pool, "alice@example.com", "Alice").await;

        assert_eq!(user.email, "alice@example.com");
        assert_eq!(user.full_name, "Alice");
        assert_eq!(user.profile_pic, "");
        assert!(user.otp.is_none());
        assert!(user.id >= 1);
    }

    #[tokio::test]
    async fn test_create_user_duplicate_email() {
        let pool = setup_test_db().await;
        create_test_user(&pool, "alice@example.com", "Alice").await;

        let password_hash = hash_password("secret-password").unwrap();
        let result = UserRepository::create(
            &pool,
            UserForCreate::new(
                "alice@example.com".to_string(),
                "Other Alice".to_string(),
                password_hash,
            ),
        )
        .await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_find_by_email_not_found() {
        let pool = setup_test_db().await;

        let found = UserRepository::find_by_email(&pool, "ghost@example.com")
            .await
            .unwrap();

        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_list_except_strips_requester() {
        let pool = setup_test_db().await;
        let alice = create_test_user(&pool, "alice@example.com", "Alice").await;
        let bob = create_test_user(&pool, "bob@example.com", "Bob").await;
        create_test_user(&pool, "carol@example.com", "Carol").await;

        let contacts = UserRepository::list_except(&pool, alice.id).await.unwrap();

        assert_eq!(contacts.len(), 2);
        assert!(contacts.iter().all(|u| u.id != alice.id));
        assert!(contacts.iter().any(|u| u.id == bob.id));
    }

    #[tokio::test]
    async fn test_otp_set_and_clear() {
        let pool = setup_test_db().await;
        let user = create_test_user(&pool, "alice@example.com", "Alice").await;

        let expires_at = lib_utils::time::minutes_from_now(5);
        UserRepository::set_otp(&pool, user.id, "123456", expires_at)
            .await
            .unwrap();

        let stored = UserRepository::find_by_id(&pool, user.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.otp.as_deref(), Some("123456"));
        assert!(stored.otp_expires_at.is_some());

        UserRepository::clear_otp(&pool, user.id).await.unwrap();

        let cleared = UserRepository::find_by_id(&pool, user.id)
            .await
            .unwrap()
            .unwrap();
        assert!(cleared.otp.is_none());
        assert!(cleared.otp_expires_at.is_none());
    }

    #[tokio::test]
    async fn test_set_profile_pic() {
        let pool = setup_test_db().await;
        let user = create_test_user(&pool, "alice@example.com", "Alice").await;

        let updated =
            UserRepository::set_profile_pic(&pool, user.id, "https://assets.example/alice.png")
                .await
                .unwrap();

        assert_eq!(updated.profile_pic, "https://assets.example/alice.png");
    }
}
