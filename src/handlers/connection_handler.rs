use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use log::{debug, warn};
use tokio::sync::broadcast::error::RecvError;

use crate::api::AppState;

/// Push side of the notification feed. Every notification accepted by the
/// server is forwarded to each connected socket as one JSON text frame;
/// inbound frames are ignored apart from close handling.
pub async fn handle_connection(stream: WebSocket, state: Arc<AppState>) {
    let (mut ws_sender, mut ws_receiver) = stream.split();

    let mut rx = state.tx.subscribe();

    loop {
        tokio::select! {
            message = rx.recv() => {
                match message {
                    Ok(notification) => {
                        if let Ok(json_msg) = serde_json::to_string(&notification) {
                            if ws_sender.send(Message::Text(json_msg)).await.is_err() {
                                break;
                            }
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!("WebSocket client lagged, {} notifications dropped", skipped);
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            inbound = ws_receiver.next() => {
                match inbound {
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    debug!("WebSocket client disconnected");
}
