//! # AI Chat Handlers
//!
//! HTTP endpoints for the assistant conversation.
//!
//! ## Endpoints
//!
//! - `POST /api/aichat/ai` - ask the assistant
//! - `GET  /api/aichat/history` - role-tagged transcript

use axum::{
    extract::{Extension, State},
    Json,
};
use lib_auth::Claims;
use lib_core::dto::{AiHistoryResponse, AiReplyResponse, AskAiRequest};
use lib_core::AppError;
use tracing::instrument;

use super::current_user_id;
use crate::server::AppState;

/// Ask the assistant a question (text and/or image).
#[instrument(skip(state, claims, req))]
pub async fn ask_ai(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<AskAiRequest>,
) -> Result<Json<AiReplyResponse>, AppError> {
    let user_id = current_user_id(&claims)?;
    let reply = state.ai.ask(user_id, req).await?;
    Ok(Json(AiReplyResponse {
        success: true,
        reply,
    }))
}

/// Fetch the requester's assistant transcript.
pub async fn get_history(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<AiHistoryResponse>, AppError> {
    let user_id = current_user_id(&claims)?;
    let chats = state.ai.fetch_history(user_id).await?;
    Ok(Json(AiHistoryResponse {
        success: true,
        chats,
    }))
}
