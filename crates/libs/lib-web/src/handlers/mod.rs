//! # HTTP Request Handlers
//!
//! Axum request handlers organized by feature domain. Handlers delegate
//! business logic to [`crate::services`].
//!
//! ## Handler Modules
//!
//! - **[`auth`]**: signup, two-step OTP login, logout, session check,
//!   profile update
//! - **[`chat`]**: contact list, history, send, delete
//! - **[`ai`]**: assistant ask and transcript
//! - **[`ws`]**: the WebSocket delivery channel
//!
//! Protected endpoints run behind [`crate::middleware::mw_auth::require_auth`]
//! and read the verified user id from `Extension<Claims>`.

pub mod ai;
pub mod auth;
pub mod chat;
pub mod ws;

use lib_auth::Claims;
use lib_core::AppError;

/// The verified current user id carried by the auth middleware.
pub(crate) fn current_user_id(claims: &Claims) -> Result<i64, AppError> {
    claims.user_id().map_err(AppError::Unauthorized)
}
