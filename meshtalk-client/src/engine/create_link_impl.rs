use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use meshtalk_core::negotiation::{LinkRole, Negotiation};
use meshtalk_core::{ClientMessage, IceCandidatePayload, PeerId, UserData};
use wasm_bindgen::JsValue;
use wasm_bindgen::prelude::*;

use crate::MeshEngine;
use crate::engine::{CONTROL_CHANNEL_LABEL, MeshEvent, MeshInner, PeerLink};
use crate::logger::Logger;

impl MeshEngine {
    pub(super) fn add_link(
        inner_rc: &Rc<RefCell<MeshInner>>,
        peer_id: PeerId,
        should_create_offer: bool,
        members: &HashMap<PeerId, UserData>,
    ) {
        if inner_rc.borrow().links.contains_key(&peer_id) {
            Logger::info(&format!("Already linked to {}, ignoring", peer_id));
            return;
        }

        let pc = match Self::create_pc(inner_rc, peer_id) {
            Ok(pc) => pc,
            Err(e) => {
                Logger::error(&e);
                return;
            }
        };

        // Local tracks go on before the first offer so the initial SDP
        // already describes both directions.
        {
            let inner = inner_rc.borrow();
            if let Some(stream) = &inner.local_stream {
                for track in crate::tracks::stream_tracks(stream) {
                    let _ = pc.add_track(&track, stream, &js_sys::Array::new());
                }
            }
        }

        let dc = pc.create_data_channel(CONTROL_CHANNEL_LABEL);
        Self::setup_control_channel(inner_rc, peer_id, &dc);

        let role = LinkRole::from_should_create_offer(should_create_offer);
        let user_data = members.get(&peer_id).cloned().unwrap_or_default();
        let display_name = user_data.display_name.clone();

        inner_rc.borrow_mut().links.insert(
            peer_id,
            PeerLink {
                pc,
                negotiation: Negotiation::new(role),
                dc,
                remote_dc: None,
                remote_stream: None,
                user_data,
                talk_probe: None,
            },
        );

        Self::dispatch_event(
            inner_rc,
            MeshEvent::PeerAdded {
                peer_id: peer_id.to_string(),
                display_name,
            },
        );

        if should_create_offer {
            Self::start_offer(inner_rc.clone(), peer_id);
        }
    }

    pub(crate) fn create_pc(
        inner_rc: &Rc<RefCell<MeshInner>>,
        peer_id: PeerId,
    ) -> Result<web_sys::RtcPeerConnection, JsValue> {
        let rtc_config = web_sys::RtcConfiguration::new();
        let ice_servers_arr = js_sys::Array::new();

        for server_config in &inner_rc.borrow().ice_servers {
            let rtc_ice_server = web_sys::RtcIceServer::new();

            let urls = js_sys::Array::new();
            for url in &server_config.urls {
                urls.push(&JsValue::from_str(url));
            }
            rtc_ice_server.set_urls(&urls);

            if let Some(username) = &server_config.username {
                rtc_ice_server.set_username(username);
            }
            if let Some(credential) = &server_config.credential {
                rtc_ice_server.set_credential(credential);
            }

            ice_servers_arr.push(&rtc_ice_server);
        }

        rtc_config.set_ice_servers(&ice_servers_arr);

        let pc = web_sys::RtcPeerConnection::new_with_configuration(&rtc_config)?;

        let onice = {
            let inner = inner_rc.clone();
            Closure::wrap(Box::new(move |ev: web_sys::RtcPeerConnectionIceEvent| {
                if let Some(candidate) = ev.candidate() {
                    let msg = ClientMessage::RelayIceCandidate {
                        peer_id,
                        candidate: IceCandidatePayload {
                            sdp_m_line_index: candidate.sdp_m_line_index(),
                            candidate: candidate.candidate(),
                        },
                    };
                    Self::send_signal(&inner, &msg);
                }
            })
                as Box<dyn FnMut(web_sys::RtcPeerConnectionIceEvent)>)
        };
        pc.set_onicecandidate(Some(onice.as_ref().unchecked_ref()));
        onice.forget();

        let ontrack = {
            let inner = inner_rc.clone();
            Closure::wrap(Box::new(move |ev: web_sys::RtcTrackEvent| {
                let Ok(stream) = ev.streams().get(0).dyn_into::<web_sys::MediaStream>() else {
                    return;
                };
                Self::attach_remote_stream(&inner, peer_id, stream);
            }) as Box<dyn FnMut(web_sys::RtcTrackEvent)>)
        };
        pc.set_ontrack(Some(ontrack.as_ref().unchecked_ref()));
        ontrack.forget();

        let ondatachannel = {
            let inner = inner_rc.clone();
            Closure::wrap(Box::new(move |ev: web_sys::RtcDataChannelEvent| {
                let dc = ev.channel();
                Self::setup_control_channel(&inner, peer_id, &dc);
                if let Some(link) = inner.borrow_mut().links.get_mut(&peer_id) {
                    link.remote_dc = Some(dc);
                }
            }) as Box<dyn FnMut(web_sys::RtcDataChannelEvent)>)
        };
        pc.set_ondatachannel(Some(ondatachannel.as_ref().unchecked_ref()));
        ondatachannel.forget();

        let onstate = {
            let inner = inner_rc.clone();
            let pc = pc.clone();
            Closure::wrap(Box::new(move |_: JsValue| {
                use web_sys::RtcIceConnectionState::*;
                match pc.ice_connection_state() {
                    Failed | Disconnected | Closed => {
                        Logger::warn(&format!("Link to {} lost", peer_id));
                        Self::remove_link(&inner, &peer_id);
                    }
                    _ => {}
                }
            }) as Box<dyn FnMut(JsValue)>)
        };
        pc.set_oniceconnectionstatechange(Some(onstate.as_ref().unchecked_ref()));
        onstate.forget();

        Ok(pc)
    }

    fn attach_remote_stream(
        inner_rc: &Rc<RefCell<MeshInner>>,
        peer_id: PeerId,
        stream: web_sys::MediaStream,
    ) {
        let should_probe = {
            let mut inner = inner_rc.borrow_mut();
            let Some(link) = inner.links.get_mut(&peer_id) else {
                return;
            };
            link.remote_stream = Some(stream.clone());
            link.talk_probe.is_none() && stream.get_audio_tracks().length() > 0
        };

        if should_probe {
            match crate::talking::start_probe(inner_rc, peer_id, &stream) {
                Ok(probe) => {
                    if let Some(link) = inner_rc.borrow_mut().links.get_mut(&peer_id) {
                        link.talk_probe = Some(probe);
                    }
                }
                Err(e) => Logger::error(&e),
            }
        }

        let cb = inner_rc.borrow().stream_callback.clone();
        if let Some(cb) = cb {
            let _ = cb.call2(
                &JsValue::NULL,
                &JsValue::from_str(&peer_id.to_string()),
                &stream,
            );
        }
    }

    /// Idempotent teardown of a single peer link.
    pub(crate) fn remove_link(inner_rc: &Rc<RefCell<MeshInner>>, peer_id: &PeerId) {
        let link = inner_rc.borrow_mut().links.remove(peer_id);
        let Some(mut link) = link else {
            return;
        };

        link.negotiation.close();
        if let Some(probe) = link.talk_probe.take() {
            probe.stop();
        }
        link.dc.close();
        if let Some(remote_dc) = link.remote_dc.take() {
            remote_dc.close();
        }
        link.pc.close();

        Self::dispatch_event(
            inner_rc,
            MeshEvent::PeerRemoved {
                peer_id: peer_id.to_string(),
            },
        );
    }

    pub(crate) fn shutdown_mesh(inner_rc: &Rc<RefCell<MeshInner>>) {
        let ids: Vec<PeerId> = inner_rc.borrow().links.keys().copied().collect();
        for id in ids {
            Self::remove_link(inner_rc, &id);
        }
    }
}
