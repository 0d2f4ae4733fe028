//! # Core Library
//!
//! Configuration, error type, DTOs, and the persistence store.

pub mod config;
pub mod dto;
pub mod error;
pub mod model;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, Result};
pub use model::store::{create_pool, DbPool};

/// Fixed synthetic identity for the AI assistant.
///
/// User ids are allocated by SQLite AUTOINCREMENT starting at 1, so 0 never
/// collides with a real account.
pub const AI_ASSISTANT_ID: i64 = 0;
