use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// User entity representing a complete user record from the database.
///
/// `password_hash`, `otp` and `otp_expires_at` never leave the store layer;
/// public views go through `dto::UserInfo`.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub profile_pic: String,
    pub otp: Option<String>,
    pub otp_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data structure for creating a new user.
///
/// Password must be hashed before creation.
#[derive(Debug, Clone)]
pub struct UserForCreate {
    pub email: String,
    pub full_name: String,
    pub password_hash: String,
}

impl UserForCreate {
    pub fn new(email: String, full_name: String, password_hash: String) -> Self {
        Self {
            email,
            full_name,
            password_hash,
        }
    }
}

/// A direct message row. Immutable once created.
#[derive(Debug, Clone, FromRow)]
pub struct Message {
    pub id: i64,
    pub sender_id: i64,
    pub receiver_id: i64,
    pub text: Option<String>,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// An assistant conversation row; same shape as [`Message`] but stored in
/// its own table, with one side always the fixed assistant identity.
#[derive(Debug, Clone, FromRow)]
pub struct AiMessage {
    pub id: i64,
    pub sender_id: i64,
    pub receiver_id: i64,
    pub text: Option<String>,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}
