//! services/api/src/web/ws_handler.rs
//!
//! Streams session events to a connected browser over a WebSocket.

use crate::web::{protocol::ServerMessage, state::AppState};
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::{
    stream::{SplitSink, StreamExt},
    SinkExt,
};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

/// The handler for upgrading HTTP requests to WebSocket connections.
pub async fn ws_handler(ws: WebSocketUpgrade, State(app_state): State<Arc<AppState>>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, app_state))
}

async fn handle_socket(socket: WebSocket, app_state: Arc<AppState>) {
    info!("New WebSocket observer connected.");
    let (mut sender, mut receiver) = socket.split();

    // Subscribe before taking the snapshot so no event falls between the two.
    let mut events = app_state.session.subscribe();
    let snapshot = app_state.session.snapshot().await;
    if send_message(&mut sender, &ServerMessage::Connected { snapshot }).await.is_err() {
        warn!("Failed to send initial snapshot. Client may have disconnected.");
        return;
    }

    loop {
        tokio::select! {
            event = events.recv() => {
                let message = match event {
                    Ok(event) => ServerMessage::Event { event },
                    Err(RecvError::Lagged(skipped)) => {
                        warn!("WebSocket observer lagged behind by {} events.", skipped);
                        ServerMessage::Lagged { skipped }
                    }
                    Err(RecvError::Closed) => break,
                };
                if send_message(&mut sender, &message).await.is_err() {
                    warn!("Failed to forward session event. Client may have disconnected.");
                    break;
                }
            }
            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Close(_))) | None => break,
                Some(Err(e)) => {
                    warn!("WebSocket receive error: {}", e);
                    break;
                }
                Some(Ok(_)) => {}
            },
        }
    }

    info!("WebSocket observer disconnected.");
}

async fn send_message(
    sender: &mut SplitSink<WebSocket, Message>,
    message: &ServerMessage,
) -> Result<(), axum::Error> {
    let json = serde_json::to_string(message).map_err(axum::Error::new)?;
    sender.send(Message::Text(json.into())).await
}
