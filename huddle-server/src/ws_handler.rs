use crate::hub::Hub;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use huddle_core::{SignalKind, SignalMessage};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

pub async fn ws_handler(ws: WebSocketUpgrade, State(hub): State<Hub>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, hub))
}

async fn handle_socket(socket: WebSocket, hub: Hub) {
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel();

    let peer_id = hub.register(tx);
    info!(peer = %peer_id, "new signaling connection");

    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(msg).await.is_err() {
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn({
        let hub = hub.clone();

        async move {
            while let Some(Ok(msg)) = receiver.next().await {
                match msg {
                    Message::Text(text) => match serde_json::from_str::<SignalMessage>(&text) {
                        Ok(signal) => {
                            let SignalMessage {
                                recipient, kind, ..
                            } = signal;
                            match kind {
                                SignalKind::JoinRoom { room_id, username } => {
                                    hub.join(peer_id, room_id, username);
                                }
                                kind @ (SignalKind::Offer { .. }
                                | SignalKind::Answer { .. }
                                | SignalKind::IceCandidate { .. }) => {
                                    let Some(recipient) = recipient else {
                                        debug!(peer = %peer_id, "directed signal without recipient, dropping");
                                        continue;
                                    };
                                    hub.forward(peer_id, recipient, kind);
                                }
                                SignalKind::Leave => break,
                                other => {
                                    debug!(peer = %peer_id, kind = ?other, "ignoring unexpected message kind");
                                }
                            }
                        }
                        Err(error) => {
                            warn!(peer = %peer_id, "invalid signal message: {error}");
                        }
                    },
                    Message::Close(_) => break,
                    _ => {}
                }
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };

    hub.unregister(peer_id);
    info!(peer = %peer_id, "signaling connection closed");
}
