use crate::registry::{ChannelRegistry, Joined};
use crate::relay::RelayCommand;
use crate::signaling::SignalingOutput;
use meshtalk_core::{ChannelName, PeerId, ServerMessage, UserData};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// The signaling relay event loop.
///
/// Owns the channel registry outright; all mutations happen on this single
/// task, serialized by the command channel. The relay holds no negotiation
/// state and never inspects SDP or ICE payloads.
pub struct Relay {
    registry: ChannelRegistry,
    command_rx: mpsc::Receiver<RelayCommand>,
    signaling: Arc<dyn SignalingOutput>,
}

impl Relay {
    pub fn new(command_rx: mpsc::Receiver<RelayCommand>, signaling: Arc<dyn SignalingOutput>) -> Self {
        Self {
            registry: ChannelRegistry::new(),
            command_rx,
            signaling,
        }
    }

    pub async fn run(mut self) {
        info!("Relay event loop started");

        while let Some(cmd) = self.command_rx.recv().await {
            self.handle_command(cmd).await;
        }

        info!("Relay event loop finished");
    }

    async fn handle_command(&mut self, cmd: RelayCommand) {
        match cmd {
            RelayCommand::Join {
                peer_id,
                channel,
                user_data,
            } => self.handle_join(peer_id, channel, user_data).await,

            RelayCommand::SessionDescription { from, to, sdp } => {
                debug!("Relaying session description {} -> {}", from, to);
                self.signaling
                    .send(to, ServerMessage::SessionDescription { peer_id: from, sdp })
                    .await;
            }

            RelayCommand::IceCandidate {
                from,
                to,
                candidate,
            } => {
                debug!("Relaying ICE candidate {} -> {}", from, to);
                self.signaling
                    .send(to, ServerMessage::IceCandidate {
                        peer_id: from,
                        candidate,
                    })
                    .await;
            }

            RelayCommand::UpdateUserData {
                peer_id,
                channel,
                key,
                value,
            } => {
                self.registry
                    .update_user_data(&channel, &peer_id, &key, value);
            }

            RelayCommand::Disconnect { peer_id } => self.handle_disconnect(peer_id).await,
        }
    }

    async fn handle_join(&mut self, peer_id: PeerId, channel: ChannelName, user_data: UserData) {
        if self.registry.join(channel.clone(), peer_id.clone(), user_data) == Joined::AlreadyMember
        {
            debug!("{} already joined '{}', ignoring", peer_id, channel);
            return;
        }

        info!("{} joined channel '{}'", peer_id, channel);

        let Some(members) = self.registry.snapshot(&channel) else {
            return;
        };

        // Glare avoidance: the later joiner is told to create the offer for
        // each pre-existing member; the other side of the pair waits.
        for existing in members.keys().filter(|id| **id != peer_id) {
            self.signaling
                .send(existing.clone(), ServerMessage::AddPeer {
                    peer_id: peer_id.clone(),
                    should_create_offer: false,
                    members: members.clone(),
                })
                .await;
            self.signaling
                .send(peer_id.clone(), ServerMessage::AddPeer {
                    peer_id: existing.clone(),
                    should_create_offer: true,
                    members: members.clone(),
                })
                .await;
        }
    }

    async fn handle_disconnect(&mut self, peer_id: PeerId) {
        for channel in self.registry.channels_of(&peer_id) {
            self.registry.leave(&channel, &peer_id);
            info!("{} left channel '{}'", peer_id, channel);

            // Both directions: the remaining members forget the departing
            // peer, and the departing side is told to forget each of them.
            // Clients treat duplicate removals as no-ops, so the redundancy
            // is harmless.
            let remaining = self.registry.snapshot(&channel).unwrap_or_default();
            for other in remaining.keys() {
                self.signaling
                    .send(other.clone(), ServerMessage::RemovePeer {
                        peer_id: peer_id.clone(),
                    })
                    .await;
                self.signaling
                    .send(peer_id.clone(), ServerMessage::RemovePeer {
                        peer_id: other.clone(),
                    })
                    .await;
            }
        }
    }
}
