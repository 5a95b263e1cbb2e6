//! WebSocket connection handlers.
//!
//! The first text frame of a connection must be a handshake. Its `from`
//! registers the participant; after that chat and typing frames are routed
//! to the participant named in `to`.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, SplitStream, StreamExt},
};
use murmur_shared::wire::{FrameKind, WireInbound, decode_inbound};
use tokio::sync::mpsc;

use crate::state::AppState;

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Spawns a task that receives messages from the rx channel and pushes them to the WebSocket sender.
///
/// Ends when the registry drops the sending half, which happens when a newer
/// session for the same participant supersedes this one.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
        let _ = sender.close().await;
    })
}

/// Wait for the handshake and return the announced participant ID.
async fn await_handshake(receiver: &mut SplitStream<WebSocket>) -> Option<String> {
    while let Some(msg) = receiver.next().await {
        let text = match msg {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) => return None,
            Ok(_) => continue,
            Err(e) => {
                tracing::warn!("WebSocket error before handshake: {}", e);
                return None;
            }
        };

        return match decode_inbound(text.as_str()) {
            Ok(WireInbound::Message(frame))
                if frame.resolved_kind() == FrameKind::Handshake
                    && !frame.from.trim().is_empty() =>
            {
                Some(frame.from.trim().to_string())
            }
            Ok(_) => {
                tracing::warn!("First frame was not a handshake: {}", text);
                None
            }
            Err(e) => {
                tracing::warn!("Malformed handshake: {}", e);
                None
            }
        };
    }
    None
}

/// Route one text frame from `participant` to its recipient.
async fn route_frame(state: &AppState, participant: &str, text: &str) {
    let frame = match decode_inbound(text) {
        Ok(WireInbound::Message(frame)) => frame,
        Ok(WireInbound::Envelope(_)) => {
            tracing::warn!("Ignoring envelope sent by '{}'", participant);
            return;
        }
        Err(e) => {
            tracing::warn!("Malformed frame from '{}': {}", participant, e);
            return;
        }
    };

    match frame.resolved_kind() {
        FrameKind::Handshake => {
            tracing::debug!("Ignoring repeated handshake from '{}'", participant);
        }
        FrameKind::Chat | FrameKind::Typing => {
            if frame.from != participant {
                tracing::warn!(
                    "Dropping frame claiming sender '{}' on the connection of '{}'",
                    frame.from,
                    participant
                );
                return;
            }
            if state.registry.push_to(&frame.to, text).await {
                tracing::info!("Relayed frame from '{}' to '{}'", participant, frame.to);
            } else {
                tracing::info!(
                    "Recipient '{}' is offline, dropping frame from '{}'",
                    frame.to,
                    participant
                );
            }
        }
    }
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (sender, mut receiver) = socket.split();

    let Some(participant) = await_handshake(&mut receiver).await else {
        return;
    };

    let (tx, rx) = mpsc::unbounded_channel();
    let session = state.registry.register(&participant, tx).await;
    tracing::info!("Participant '{}' connected", participant);
    state.registry.broadcast_presence().await;

    let participant_for_recv = participant.clone();
    let state_for_recv = state.clone();

    // Spawn a task to receive frames from this participant
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::error!("WebSocket error: {}", e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    tracing::debug!("Received text: {}", text);
                    route_frame(&state_for_recv, &participant_for_recv, text.as_str()).await;
                }
                Message::Close(_) => {
                    tracing::info!("Participant '{}' requested close", participant_for_recv);
                    break;
                }
                _ => {}
            }
        }
    });

    // Spawn a task to push frames routed to this participant
    let mut send_task = pusher_loop(rx, sender);

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    if state.registry.unregister(&participant, session).await {
        tracing::info!("Participant '{}' disconnected", participant);
        state.registry.broadcast_presence().await;
    } else {
        tracing::debug!("Superseded session of '{}' closed", participant);
    }
}
