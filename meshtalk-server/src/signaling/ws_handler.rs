use crate::relay::RelayCommand;
use crate::signaling::SignalingService;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use meshtalk_core::{ChannelName, ClientMessage, PeerId, ServerMessage};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(service): State<SignalingService>,
) -> impl IntoResponse {
    // Identity is transport-assigned: one fresh id per connection.
    let peer_id = PeerId::new();

    ws.on_upgrade(move |socket| handle_socket(socket, peer_id, service))
}

async fn handle_socket(socket: WebSocket, peer_id: PeerId, service: SignalingService) {
    info!("New WebSocket connection: {}", peer_id);

    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel();

    service.add_peer(peer_id.clone(), tx);
    service.send_signal(peer_id.clone(), ServerMessage::Welcome {
        peer_id: peer_id.clone(),
    });

    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(msg).await.is_err() {
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn({
        let service = service.clone();
        let peer_id = peer_id.clone();

        async move {
            while let Some(Ok(msg)) = receiver.next().await {
                match msg {
                    Message::Text(text) => match serde_json::from_str::<ClientMessage>(&text) {
                        Ok(client_msg) => {
                            let Some(cmd) = build_command(&service, &peer_id, client_msg) else {
                                continue;
                            };
                            if let Err(e) = service.relay_cmd_tx.send(cmd).await {
                                error!("Relay died: {}", e);
                                break;
                            }
                        }
                        Err(e) => warn!("Invalid client message from {}: {:?}", peer_id, e),
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

    finish_connection(&service, &peer_id).await;
    info!("WebSocket disconnected: {}", peer_id);
}

/// Teardown shared by every exit path. The writer failing first aborts the
/// reader mid-await, so the disconnect must be reported here, after the
/// `select!`, or the registry would keep the member forever.
async fn finish_connection(service: &SignalingService, peer_id: &PeerId) {
    let _ = service
        .relay_cmd_tx
        .send(RelayCommand::Disconnect {
            peer_id: peer_id.clone(),
        })
        .await;
    service.remove_peer(peer_id);
}

/// Translate a parsed client message into a relay command. Channel names are
/// validated here, at the boundary: an invalid one is answered with an error
/// and never reaches the registry.
fn build_command(
    service: &SignalingService,
    peer_id: &PeerId,
    msg: ClientMessage,
) -> Option<RelayCommand> {
    match msg {
        ClientMessage::Join { channel, user_data } => {
            let channel = validate_channel(service, peer_id, &channel)?;
            Some(RelayCommand::Join {
                peer_id: peer_id.clone(),
                channel,
                user_data,
            })
        }
        ClientMessage::RelaySessionDescription { peer_id: to, sdp } => {
            Some(RelayCommand::SessionDescription {
                from: peer_id.clone(),
                to,
                sdp,
            })
        }
        ClientMessage::RelayIceCandidate {
            peer_id: to,
            candidate,
        } => Some(RelayCommand::IceCandidate {
            from: peer_id.clone(),
            to,
            candidate,
        }),
        ClientMessage::UpdateUserData {
            channel,
            key,
            value,
        } => {
            let channel = validate_channel(service, peer_id, &channel)?;
            Some(RelayCommand::UpdateUserData {
                peer_id: peer_id.clone(),
                channel,
                key,
                value,
            })
        }
    }
}

fn validate_channel(
    service: &SignalingService,
    peer_id: &PeerId,
    raw: &str,
) -> Option<ChannelName> {
    match ChannelName::parse(raw) {
        Ok(channel) => Some(channel),
        Err(e) => {
            warn!("{} sent invalid channel name {:?}: {}", peer_id, raw, e);
            service.send_signal(peer_id.clone(), ServerMessage::Error {
                message: format!("invalid channel name: {e}"),
            });
            None
        }
    }
}
