//! WebSocket push channel.
//!
//! Every connected client gets the current snapshot on connect and then each
//! snapshot the engine publishes. Inbound frames are ignored apart from
//! close.

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use crate::state::AppState;

pub async fn upgrade(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| client_session(socket, state))
}

async fn client_session(socket: WebSocket, state: AppState) {
    // Subscribe before reading the status so no update can fall between them.
    let mut updates = state.updates.subscribe();
    let (mut sender, mut receiver) = socket.split();

    let initial = match state.timer.status().await {
        Ok(snapshot) => snapshot,
        Err(e) => {
            warn!(error = %e, "timer unavailable, closing socket");
            return;
        }
    };
    let initial = match serde_json::to_string(&initial) {
        Ok(json) => json,
        Err(e) => {
            warn!(error = %e, "failed to serialize snapshot");
            return;
        }
    };
    if sender.send(Message::Text(initial.into())).await.is_err() {
        return;
    }
    info!("websocket client connected");

    loop {
        tokio::select! {
            update = updates.recv() => match update {
                Ok(json) => {
                    if sender.send(Message::Text(json.into())).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "websocket client lagging, dropped updates");
                }
                Err(RecvError::Closed) => break,
            },
            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }
    info!("websocket client disconnected");
}
