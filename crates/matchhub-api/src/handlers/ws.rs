//! WebSocket upgrade handler for sync-progress subscriptions.

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use tracing::{debug, info, warn};

use matchhub_core::types::id::UserId;

use crate::error::ApiError;
use crate::extractors::auth;
use crate::state::AppState;

/// Query parameters for WebSocket authentication.
#[derive(Debug, serde::Deserialize)]
pub struct WsQuery {
    /// Bearer JWT.
    pub token: String,
}

/// GET /ws?token={jwt} — WebSocket upgrade.
pub async fn ws_upgrade(
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
    Query(query): Query<WsQuery>,
) -> Result<Response, ApiError> {
    // Authenticate before upgrading.
    let user_id = auth::decode_user(&state.config.auth, &query.token)?;

    Ok(ws.on_upgrade(move |socket| handle_socket(state, user_id, socket)))
}

/// Drives an established WebSocket connection for its whole lifetime.
///
/// One writer task drains the hub's outbound buffer into the socket,
/// serializing all sends to this client; the read loop feeds control
/// frames back to the hub. Every exit path — client close, protocol
/// error, server shutdown — funnels into the same unregister cleanup.
async fn handle_socket(state: AppState, user_id: UserId, socket: WebSocket) {
    let (mut ws_tx, mut ws_rx) = socket.split();

    let (conn_id, mut outbound_rx) = state.hub.register(user_id);

    info!(conn_id = %conn_id, user_id = %user_id, "WebSocket connection established");

    let writer = tokio::spawn(async move {
        while let Some(payload) = outbound_rx.recv().await {
            if ws_tx.send(Message::Text(payload.into())).await.is_err() {
                break;
            }
        }
    });

    let shutdown = state.shutdown.clone();
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                debug!(conn_id = %conn_id, "Server shutdown, closing connection");
                break;
            }
            incoming = ws_rx.next() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => {
                        state.hub.handle_frame(&conn_id, text.as_str());
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {
                        // Ping/pong handled by axum.
                    }
                    Some(Err(e)) => {
                        warn!(conn_id = %conn_id, error = %e, "WebSocket error");
                        break;
                    }
                }
            }
        }
    }

    state.hub.begin_close(&conn_id);
    writer.abort();
    state.hub.unregister(&conn_id);

    info!(conn_id = %conn_id, user_id = %user_id, "WebSocket connection closed");
}
