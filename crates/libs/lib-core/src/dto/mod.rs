//! # Data Transfer Objects (DTOs)
//!
//! Data structures exchanged with clients over the REST API and the push
//! channel. Chat-facing DTOs use **camelCase** field names on the wire.

pub mod auth;
pub mod chat;
pub mod events;

pub use auth::*;
pub use chat::*;
pub use events::*;
