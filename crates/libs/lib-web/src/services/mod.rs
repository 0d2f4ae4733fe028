//! # Services Layer
//!
//! Business logic and external collaborators, between the HTTP handlers and
//! the data layer:
//!
//! ```text
//! Handlers (HTTP) → Services → Repositories / Presence / External APIs
//! ```
//!
//! ## Module Organization
//!
//! - [`chat`] - conversation service (contacts, history, send, delete)
//! - [`ai_chat`] - assistant conversation service
//! - [`assets`] - external asset host (image uploads)
//! - [`generation`] - external text/multimodal generation API
//! - [`mailer`] - transactional email (login passcodes)
//!
//! The external collaborators sit behind narrow traits so the services can
//! be exercised with stubs in tests.

pub mod ai_chat;
pub mod assets;
pub mod chat;
pub mod generation;
pub mod mailer;

pub use ai_chat::AiChatService;
pub use assets::{AssetStore, CloudinaryStore};
pub use chat::ChatService;
pub use generation::{GeminiClient, InlineImage, ReplyGenerator};
pub use mailer::{BrevoMailer, Mailer};

#[cfg(test)]
pub(crate) mod test_support {
    //! Shared stubs and fixtures for service tests.

    use super::assets::AssetStore;
    use super::generation::{InlineImage, ReplyGenerator};
    use async_trait::async_trait;
    use lib_core::model::store::models::UserForCreate;
    use lib_core::model::store::UserRepository;
    use lib_core::{AppError, DbPool, Result};
    use sqlx::sqlite::SqlitePoolOptions;

    /// In-memory SQLite database with the full schema.
    pub async fn setup_test_db() -> DbPool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create test database");

        sqlx::migrate!("../../../migrations")
            .run(&pool)
            .await
            .expect("Failed to run migrations");

        pool
    }

    /// Create a user row and return its id.
    pub async fn test_user(pool: &DbPool, email: &str, name: &str) -> i64 {
        UserRepository::create(
            pool,
            UserForCreate::new(email.to_string(), name.to_string(), "test-hash".to_string()),
        )
        .await
        .expect("Failed to create test user")
        .id
    }

    /// Asset host stub that "uploads" everything to one fixed URL.
    #[derive(Default)]
    pub struct StaticAssetStore;

    impl StaticAssetStore {
        pub const UPLOADED_URL: &'static str = "https://assets.example/uploaded.png";
    }

    #[async_trait]
    impl AssetStore for StaticAssetStore {
        async fn upload(&self, _image: &str) -> Result<String> {
            Ok(Self::UPLOADED_URL.to_string())
        }
    }

    /// Generation stub with a canned reply (or a canned failure).
    pub struct StubGenerator {
        reply: Option<String>,
    }

    impl StubGenerator {
        pub fn replying(reply: &str) -> Self {
            Self {
                reply: Some(reply.to_string()),
            }
        }

        pub fn failing() -> Self {
            Self { reply: None }
        }
    }

    #[async_trait]
    impl ReplyGenerator for StubGenerator {
        async fn generate(
            &self,
            _question: Option<&str>,
            _image: Option<&InlineImage>,
        ) -> Result<String> {
            self.reply
                .clone()
                .ok_or_else(|| AppError::Upstream("generation API down".to_string()))
        }
    }
}
