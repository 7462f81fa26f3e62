use std::cell::RefCell;
use std::rc::Rc;

use meshtalk_core::negotiation::{OfferOutcome, RemoteSdpOutcome};
use meshtalk_core::{ClientMessage, PeerId, SdpKind, SessionDescription};
use wasm_bindgen_futures::JsFuture;
use web_sys::{RtcSdpType, RtcSessionDescriptionInit};

use crate::MeshEngine;
use crate::engine::MeshInner;
use crate::logger::Logger;

impl MeshEngine {
    /// Requests an offer toward `peer_id`. The state machine decides whether
    /// it starts now, is coalesced behind the one in flight, or is dropped.
    pub(crate) fn start_offer(inner_rc: Rc<RefCell<MeshInner>>, peer_id: PeerId) {
        let outcome = {
            let mut inner = inner_rc.borrow_mut();
            let Some(link) = inner.links.get_mut(&peer_id) else {
                return;
            };
            link.negotiation.begin_offer()
        };

        match outcome {
            OfferOutcome::Start => {
                wasm_bindgen_futures::spawn_local(async move {
                    Self::send_offer(inner_rc, peer_id).await;
                });
            }
            OfferOutcome::Deferred => {
                Logger::info(&format!("Offer to {} deferred behind one in flight", peer_id));
            }
            OfferOutcome::Rejected => {}
        }
    }

    async fn send_offer(inner_rc: Rc<RefCell<MeshInner>>, peer_id: PeerId) {
        let pc = inner_rc
            .borrow()
            .links
            .get(&peer_id)
            .map(|link| link.pc.clone());
        let Some(pc) = pc else {
            return;
        };

        let offer = match JsFuture::from(pc.create_offer()).await {
            Ok(offer) => offer,
            Err(e) => {
                Logger::error(&e);
                return;
            }
        };
        let Some(sdp) = js_sys::Reflect::get(&offer, &"sdp".into())
            .ok()
            .and_then(|v| v.as_string())
        else {
            Logger::warn(&"Offer without sdp field");
            return;
        };

        let init = RtcSessionDescriptionInit::new(RtcSdpType::Offer);
        init.set_sdp(&sdp);
        if let Err(e) = JsFuture::from(pc.set_local_description(&init)).await {
            Logger::error(&e);
            return;
        }

        Self::send_signal(
            &inner_rc,
            &ClientMessage::RelaySessionDescription {
                peer_id,
                sdp: SessionDescription {
                    kind: SdpKind::Offer,
                    body: sdp,
                },
            },
        );
    }

    pub(super) async fn apply_remote_description(
        inner_rc: Rc<RefCell<MeshInner>>,
        peer_id: PeerId,
        sdp: SessionDescription,
    ) {
        let outcome = {
            let mut inner = inner_rc.borrow_mut();
            let Some(link) = inner.links.get_mut(&peer_id) else {
                Logger::warn(&format!("SDP for unknown peer {}", peer_id));
                return;
            };
            link.negotiation.remote_description(sdp.kind)
        };

        match outcome {
            RemoteSdpOutcome::IgnoreOffer => {
                Logger::info(&format!("Concurrent offer from {} ignored, we keep ours", peer_id));
            }
            RemoteSdpOutcome::UnexpectedSdp => {
                Logger::warn(&format!("Unexpected {:?} from {}", sdp.kind, peer_id));
            }
            RemoteSdpOutcome::AcceptAnswer => {
                Self::apply_answer(&inner_rc, peer_id, &sdp.body).await;
            }
            RemoteSdpOutcome::AcceptOffer { discard_local } => {
                Self::answer_offer(&inner_rc, peer_id, &sdp.body, discard_local).await;
            }
        }
    }

    async fn apply_answer(inner_rc: &Rc<RefCell<MeshInner>>, peer_id: PeerId, sdp: &str) {
        let pc = inner_rc
            .borrow()
            .links
            .get(&peer_id)
            .map(|link| link.pc.clone());
        let Some(pc) = pc else {
            return;
        };

        let init = RtcSessionDescriptionInit::new(RtcSdpType::Answer);
        init.set_sdp(sdp);
        if let Err(e) = JsFuture::from(pc.set_remote_description(&init)).await {
            Logger::error(&e);
            return;
        }

        let deferred = {
            let mut inner = inner_rc.borrow_mut();
            match inner.links.get_mut(&peer_id) {
                Some(link) => link.negotiation.answer_applied(),
                None => false,
            }
        };
        if deferred {
            Self::start_offer(inner_rc.clone(), peer_id);
        }
    }

    async fn answer_offer(
        inner_rc: &Rc<RefCell<MeshInner>>,
        peer_id: PeerId,
        sdp: &str,
        discard_local: bool,
    ) {
        let pc = inner_rc
            .borrow()
            .links
            .get(&peer_id)
            .map(|link| link.pc.clone());
        let Some(pc) = pc else {
            return;
        };

        // Losing side of glare rolls back its own pending offer first.
        if discard_local {
            let rollback = RtcSessionDescriptionInit::new(RtcSdpType::Rollback);
            if let Err(e) = JsFuture::from(pc.set_local_description(&rollback)).await {
                Logger::error(&e);
            }
        }

        let remote = RtcSessionDescriptionInit::new(RtcSdpType::Offer);
        remote.set_sdp(sdp);
        if let Err(e) = JsFuture::from(pc.set_remote_description(&remote)).await {
            Logger::error(&e);
            return;
        }

        let answer = match JsFuture::from(pc.create_answer()).await {
            Ok(answer) => answer,
            Err(e) => {
                Logger::error(&e);
                return;
            }
        };
        let Some(answer_sdp) = js_sys::Reflect::get(&answer, &"sdp".into())
            .ok()
            .and_then(|v| v.as_string())
        else {
            Logger::warn(&"Answer without sdp field");
            return;
        };

        let local = RtcSessionDescriptionInit::new(RtcSdpType::Answer);
        local.set_sdp(&answer_sdp);
        if let Err(e) = JsFuture::from(pc.set_local_description(&local)).await {
            Logger::error(&e);
            return;
        }

        Self::send_signal(
            inner_rc,
            &ClientMessage::RelaySessionDescription {
                peer_id,
                sdp: SessionDescription {
                    kind: SdpKind::Answer,
                    body: answer_sdp,
                },
            },
        );

        let deferred = {
            let mut inner = inner_rc.borrow_mut();
            match inner.links.get_mut(&peer_id) {
                Some(link) => link.negotiation.answer_sent(),
                None => false,
            }
        };
        if deferred {
            Self::start_offer(inner_rc.clone(), peer_id);
        }
    }
}
