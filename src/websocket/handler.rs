//! WebSocket Handler
//!
//! Handles WebSocket upgrade requests and drives one connection from
//! registration to deregistration.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use super::hub::ConnectionHub;
use super::messages::Payload;
use super::registry::{Connection, ConnectionId, ConnectionState, SharedState};
use crate::api::AppState;

/// How long the writer may take to drain and send its close frame
const CLOSE_GRACE: Duration = Duration::from_secs(2);

/// WebSocket upgrade handler
///
/// This is the entry point for WebSocket connections on every path that is
/// not a probe. The connection is only registered once the handshake has
/// completed, so no frame can be relayed on its behalf before that.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> Response {
    let hub = state.hub.clone();
    ws.on_upgrade(move |socket| handle_socket(socket, hub))
}

/// Handle an established WebSocket connection
async fn handle_socket(socket: WebSocket, hub: ConnectionHub) {
    let (mut sender, mut receiver) = socket.split();

    // Create channel for payloads relayed to this connection
    let (tx, mut rx) = mpsc::unbounded_channel::<Payload>();
    let connection = Connection::open(tx);
    let state = connection.state_handle();

    let connection_id = match hub.register(connection).await {
        Ok(id) => id,
        Err(e) => {
            tracing::error!(error = %e, "Failed to register WebSocket connection");
            let _ = sender.send(Message::Close(None)).await;
            return;
        }
    };

    // Task to forward relayed payloads from the channel to the socket. The
    // channel ends once the hub drops this connection.
    let mut send_task = tokio::spawn(async move {
        while let Some(payload) = rx.recv().await {
            if sender
                .send(Message::Text(payload.as_str().to_owned()))
                .await
                .is_err()
            {
                tracing::debug!(
                    connection_id = %connection_id,
                    "WebSocket send failed, closing connection"
                );
                break;
            }
        }

        // Flushes the reply to a client close, or starts the handshake ourselves
        let _ = sender.send(Message::Close(None)).await;
    });

    let hub_for_recv = hub.clone();
    let state_for_recv = Arc::clone(&state);

    // Task to receive frames from the socket and hand them to the hub
    let mut recv_task = tokio::spawn(async move {
        while let Some(result) = receiver.next().await {
            match result {
                Ok(msg) => {
                    if !handle_ws_message(&hub_for_recv, connection_id, &state_for_recv, msg).await
                    {
                        break;
                    }
                }
                Err(e) => {
                    tracing::debug!(
                        connection_id = %connection_id,
                        error = %e,
                        "WebSocket receive error"
                    );
                    break;
                }
            }
        }
    });

    // Wait for either task to complete
    let writer_finished = tokio::select! {
        _ = &mut send_task => {
            recv_task.abort();
            true
        }
        _ = &mut recv_task => false,
    };

    // Cleanup: stop relaying to this connection and drop it from the registry
    state.set(ConnectionState::Closed);
    hub.deregister(connection_id);

    // Deregistering closes the outbound channel, letting the writer send its close frame
    if !writer_finished && tokio::time::timeout(CLOSE_GRACE, &mut send_task).await.is_err() {
        send_task.abort();
    }
}

/// Handle a received WebSocket frame
///
/// Returns false if the connection should be closed.
async fn handle_ws_message(
    hub: &ConnectionHub,
    connection_id: ConnectionId,
    state: &SharedState,
    message: Message,
) -> bool {
    match message {
        Message::Text(text) => {
            tracing::debug!(
                connection_id = %connection_id,
                bytes = text.len(),
                "Received message"
            );
            match hub.broadcast(connection_id, Payload::from(text)).await {
                Ok(_) => true,
                Err(e) => {
                    tracing::warn!(
                        connection_id = %connection_id,
                        error = %e,
                        "Dropping connection, relay unavailable"
                    );
                    false
                }
            }
        }
        Message::Binary(data) => {
            // Only text frames are part of the chat
            tracing::debug!(
                connection_id = %connection_id,
                bytes = data.len(),
                "Ignoring binary frame"
            );
            true
        }
        Message::Ping(_) | Message::Pong(_) => {
            // Axum answers pings automatically
            true
        }
        Message::Close(_) => {
            state.set(ConnectionState::Closing);
            tracing::debug!(connection_id = %connection_id, "Client requested close");
            false
        }
    }
}
