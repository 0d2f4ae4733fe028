//! # Delivery Channel Handler
//!
//! Owns the live WebSocket connections. On connect the session token is
//! verified and the resulting user identity keys the presence registry; on
//! any disconnect (network drop or explicit close) the channel unregisters
//! itself. Events queued by the registry are serialized and forwarded to the
//! socket; delivery is best-effort with no confirmation.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use lib_auth::decode_jwt;
use lib_core::AppError;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::presence::PresenceRegistry;
use crate::server::AppState;

/// Connect-time metadata: the session token of the already-authenticated
/// page opening the channel. Identity is derived from the verified token,
/// never from a client-supplied user id.
#[derive(Debug, Deserialize)]
pub struct ConnectParams {
    token: String,
}

/// `GET /ws?token=<session token>`: upgrade to the delivery channel.
pub async fn channel_connect(
    ws: WebSocketUpgrade,
    Query(params): Query<ConnectParams>,
    State(state): State<AppState>,
) -> Result<Response, AppError> {
    let claims = decode_jwt(&params.token, &state.config.jwt_secret)
        .map_err(|_| AppError::Unauthorized("Invalid session token".to_string()))?;
    let user_id = claims.user_id().map_err(AppError::Unauthorized)?;

    let presence = state.presence.clone();
    Ok(ws.on_upgrade(move |socket| handle_channel(socket, user_id, presence)))
}

/// Run one delivery channel until the peer goes away.
async fn handle_channel(socket: WebSocket, user_id: i64, presence: Arc<PresenceRegistry>) {
    let channel_id = Uuid::new_v4();
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

    presence.register(user_id, channel_id, tx);
    info!(user_id, %channel_id, "[WS] channel open");

    let (mut sink, mut stream) = socket.split();

    // Forward queued events to the socket.
    let mut send_task = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let json = match serde_json::to_string(&event) {
                Ok(json) => json,
                Err(e) => {
                    error!(error = %e, "[WS] event serialization failed");
                    continue;
                }
            };
            if sink.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    // The channel is server-to-client; inbound frames only matter for
    // detecting the close.
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = stream.next().await {
            match msg {
                Ok(Message::Close(_)) => {
                    debug!(user_id, "[WS] close frame received");
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    debug!(user_id, error = %e, "[WS] transport error");
                    break;
                }
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    // Keyed by channel id: a stale close never clobbers a reconnect.
    presence.unregister(channel_id);
    info!(user_id, %channel_id, "[WS] channel closed");
}
