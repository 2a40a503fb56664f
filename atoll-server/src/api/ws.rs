//! Viewer WebSocket endpoint
//!
//! The viewer opens one socket and only listens; scene documents are
//! pushed through it when an export runs. Connecting again replaces the
//! previous session in the [`ViewerLink`] slot.

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
    routing::get,
    Router,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::debug;

use atoll_common::push::{Outbound, ViewerLink};

use crate::AppState;

/// GET /ws
pub async fn ws_handler(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| viewer_session(socket, state.viewer.clone()))
}

/// Drive one viewer connection until either side hangs up.
///
/// The socket is split so pushes flow while the read half waits for the
/// client to disconnect. Inbound frames are drained and dropped; this
/// channel is push-only.
async fn viewer_session(socket: WebSocket, viewer: ViewerLink) {
    let (mut sink, mut stream) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<Outbound>();
    let generation = viewer.register(tx).await;
    debug!(generation, "viewer connected");

    let mut writer = tokio::spawn(async move {
        while let Some(outbound) = rx.recv().await {
            match outbound {
                Outbound::Frame(frame) => {
                    if sink.send(Message::Text(frame)).await.is_err() {
                        break;
                    }
                }
                Outbound::Close => {
                    let _ = sink.send(Message::Close(None)).await;
                    break;
                }
            }
        }
    });

    let mut reader = tokio::spawn(async move {
        while let Some(message) = stream.next().await {
            match message {
                Ok(Message::Close(_)) | Err(_) => break,
                Ok(_) => {}
            }
        }
    });

    tokio::select! {
        _ = &mut writer => reader.abort(),
        _ = &mut reader => {}
    }

    // If the slot was already taken over by a newer connection this is a
    // no-op; otherwise it queues a close that ends the writer task.
    viewer.unregister(generation).await;
    debug!(generation, "viewer disconnected");
}

/// Build WebSocket routes
pub fn ws_routes() -> Router<AppState> {
    Router::new().route("/ws", get(ws_handler))
}
