use std::cell::RefCell;
use std::rc::Rc;

use meshtalk_core::ServerMessage;

use crate::MeshEngine;
use crate::engine::{MeshEvent, MeshInner};
use crate::logger::Logger;

impl MeshEngine {
    pub(super) fn handle_signal(inner_rc: &Rc<RefCell<MeshInner>>, text: String) {
        let msg: ServerMessage = match serde_json::from_str(&text) {
            Ok(m) => m,
            Err(e) => {
                Logger::warn(&format!("JSON Error: {}. Text: {}", e, text));
                return;
            }
        };

        let inner = inner_rc.clone();

        match msg {
            ServerMessage::Welcome { peer_id } => {
                Logger::info(&format!("Welcome, our id is {}", peer_id));
                inner.borrow_mut().self_id = Some(peer_id);
            }

            ServerMessage::AddPeer {
                peer_id,
                should_create_offer,
                members,
            } => {
                Self::add_link(&inner, peer_id, should_create_offer, &members);
            }

            ServerMessage::RemovePeer { peer_id } => {
                Self::remove_link(&inner, &peer_id);
            }

            ServerMessage::SessionDescription { peer_id, sdp } => {
                wasm_bindgen_futures::spawn_local(async move {
                    Self::apply_remote_description(inner, peer_id, sdp).await;
                });
            }

            ServerMessage::IceCandidate { peer_id, candidate } => {
                let pc = inner
                    .borrow()
                    .links
                    .get(&peer_id)
                    .map(|link| link.pc.clone());
                let Some(pc) = pc else {
                    Logger::warn(&format!("ICE for unknown peer {}", peer_id));
                    return;
                };

                let init = web_sys::RtcIceCandidateInit::new(&candidate.candidate);
                if let Some(idx) = candidate.sdp_m_line_index {
                    init.set_sdp_m_line_index(Some(idx));
                }

                let promise = pc.add_ice_candidate_with_opt_rtc_ice_candidate_init(Some(&init));
                wasm_bindgen_futures::spawn_local(async move {
                    if let Err(e) = wasm_bindgen_futures::JsFuture::from(promise).await {
                        Logger::warn(&format!("Error adding ICE: {:?}", e));
                    }
                });
            }

            ServerMessage::Error { message } => {
                Logger::warn(&format!("Signal error: {}", message));
                Self::dispatch_event(&inner, MeshEvent::SignalError { message });
            }
        }
    }
}
