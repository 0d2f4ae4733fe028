//! # Chat Handlers
//!
//! HTTP endpoints for direct messaging.
//!
//! ## Endpoints
//!
//! - `GET    /api/chat/users` - contact list
//! - `GET    /api/chat/{id}` - history with user `{id}`, oldest first
//! - `POST   /api/chat/send/{id}` - send a message to user `{id}`
//! - `DELETE /api/chat/messages/{id}` - delete own message `{id}`

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use lib_auth::Claims;
use lib_core::dto::{ChatMessage, SendMessageRequest, UserInfo};
use lib_core::AppError;
use serde_json::{json, Value};
use tracing::instrument;

use super::current_user_id;
use crate::server::AppState;

/// List contacts: every user except the requester.
pub async fn get_contacts(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<UserInfo>>, AppError> {
    let requester_id = current_user_id(&claims)?;
    let contacts = state.chat.list_contacts(requester_id).await?;
    Ok(Json(contacts))
}

/// Fetch the conversation with user `{id}`, time-ascending.
#[instrument(skip(state, claims), fields(other = %id))]
pub async fn get_messages(
    Path(id): Path<String>,
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<ChatMessage>>, AppError> {
    let requester_id = current_user_id(&claims)?;
    let messages = state.chat.fetch_history(requester_id, &id).await?;
    Ok(Json(messages))
}

/// Send a message to user `{id}`.
///
/// Returns the persisted message to the sender; the push channel carries it
/// to the receiver only.
#[instrument(skip(state, claims, req), fields(receiver = %id))]
pub async fn send_message(
    Path(id): Path<String>,
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<ChatMessage>), AppError> {
    let sender_id = current_user_id(&claims)?;
    let message = state.chat.send_message(sender_id, &id, req).await?;
    Ok((StatusCode::CREATED, Json(message)))
}

/// Delete own message `{id}` for everyone.
#[instrument(skip(state, claims), fields(message = %id))]
pub async fn delete_message(
    Path(id): Path<String>,
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Value>, AppError> {
    let requester_id = current_user_id(&claims)?;
    state.chat.delete_message(requester_id, &id).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Message deleted"
    })))
}
