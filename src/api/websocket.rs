use axum::{
    extract::State,
    extract::ws::{Message, WebSocket, WebSocketUpgrade},
    response::Response,
};
use futures::sink::SinkExt;
use futures_util::stream::StreamExt;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;

use crate::api::rest::ApiState;

/// Pushes each published detection cycle to the connected dashboard client.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<ApiState>>,
) -> Response {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<ApiState>) {
    let (mut sender, mut receiver) = socket.split();
    let mut rx = state.publisher.subscribe();

    // Forward published cycles to the client
    let mut send_task = tokio::spawn(async move {
        loop {
            let analyses = match rx.recv().await {
                Ok(analyses) => analyses,
                // a slow client that missed cycles just picks up the next one
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            };

            let msg = match serde_json::to_string(&*analyses) {
                Ok(msg) => msg,
                Err(_) => continue,
            };

            if sender.send(Message::Text(msg)).await.is_err() {
                break;
            }
        }
    });

    // Drain the client side until it disconnects
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Close(_) => break,
                _ => {}
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    }
}
