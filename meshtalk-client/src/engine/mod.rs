use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use meshtalk_core::negotiation::Negotiation;
use meshtalk_core::utils::default_ice_servers;
use meshtalk_core::{ChannelName, ChatLog, ClientMessage, IceServerConfig, PeerId, UserData};
use wasm_bindgen::prelude::*;

use crate::logger::Logger;
use crate::talking::TalkingProbe;

mod control_channel_impl;
mod create_link_impl;
mod handle_signal_impl;
mod negotiate_impl;
mod ws_setup_impl;

pub(crate) const CONTROL_CHANNEL_LABEL: &str = "mt__control";

#[derive(Clone)]
pub struct MeshConfig {
    pub url: String,
    pub channel: String,
    pub display_name: String,
    pub ice_servers: Option<Vec<IceServerConfig>>,
}

/// Event surfaced to the embedding page through the registered callback.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum MeshEvent {
    PeerAdded { peer_id: String, display_name: String },
    PeerRemoved { peer_id: String },
    PeerRenamed { peer_id: String, display_name: String },
    Chat { name: String, peer_id: String, message: String, date: String },
    Talking { peer_id: String, talking: bool },
    SignalError { message: String },
}

/// One peer connection in the mesh, with its negotiation state machine
/// and the control data channel riding on it.
pub(crate) struct PeerLink {
    pub(crate) pc: web_sys::RtcPeerConnection,
    pub(crate) negotiation: Negotiation,
    pub(crate) dc: web_sys::RtcDataChannel,
    pub(crate) remote_dc: Option<web_sys::RtcDataChannel>,
    pub(crate) remote_stream: Option<web_sys::MediaStream>,
    pub(crate) user_data: UserData,
    pub(crate) talk_probe: Option<TalkingProbe>,
}

pub(crate) struct MeshInner {
    pub(crate) ws: Option<web_sys::WebSocket>,
    pub(crate) channel: ChannelName,
    pub(crate) self_id: Option<PeerId>,
    pub(crate) user_data: UserData,
    pub(crate) links: HashMap<PeerId, PeerLink>,
    pub(crate) local_stream: Option<web_sys::MediaStream>,
    pub(crate) chat: ChatLog,
    pub(crate) ice_servers: Vec<IceServerConfig>,
    pub(crate) event_callback: Option<js_sys::Function>,
    pub(crate) stream_callback: Option<js_sys::Function>,
}

pub struct MeshEngine {
    inner: Rc<RefCell<MeshInner>>,
}

impl MeshEngine {
    pub fn new(config: MeshConfig) -> Result<Self, JsValue> {
        let channel = ChannelName::parse(&config.channel)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        let signature = web_sys::window()
            .and_then(|w| w.navigator().user_agent().ok())
            .unwrap_or_default();
        let user_data = UserData::new(config.display_name.clone(), signature);

        let inner = Rc::new(RefCell::new(MeshInner {
            ws: None,
            channel,
            self_id: None,
            user_data,
            links: HashMap::new(),
            local_stream: None,
            chat: ChatLog::default(),
            ice_servers: config.ice_servers.clone().unwrap_or_else(default_ice_servers),
            event_callback: None,
            stream_callback: None,
        }));

        let engine = MeshEngine { inner };
        engine.ws_setup(&config.url)?;
        Ok(engine)
    }

    pub fn set_event_handler(&self, callback: js_sys::Function) {
        self.inner.borrow_mut().event_callback = Some(callback);
    }

    /// Registers a callback invoked with `(peerId: string, stream: MediaStream)`
    /// whenever a remote stream becomes available.
    pub fn set_stream_handler(&self, callback: js_sys::Function) {
        self.inner.borrow_mut().stream_callback = Some(callback);
    }

    pub fn peer_count(&self) -> usize {
        self.inner.borrow().links.len()
    }

    /// Tears down every peer link and closes the signaling socket.
    pub fn hang_up(&self) {
        Self::shutdown_mesh(&self.inner);
        let ws = self.inner.borrow_mut().ws.take();
        if let Some(ws) = ws {
            let _ = ws.close();
        }
    }

    pub(crate) fn inner_rc(&self) -> Rc<RefCell<MeshInner>> {
        self.inner.clone()
    }

    // The callback is cloned out before invocation so handlers can call
    // back into the engine without hitting a live borrow.
    pub(crate) fn dispatch_event(inner_rc: &Rc<RefCell<MeshInner>>, event: MeshEvent) {
        let cb = inner_rc.borrow().event_callback.clone();
        if let Some(cb) = cb {
            if let Ok(js_val) = serde_wasm_bindgen::to_value(&event) {
                let _ = cb.call1(&JsValue::NULL, &js_val);
            }
        }
    }

    pub(crate) fn send_signal(inner_rc: &Rc<RefCell<MeshInner>>, msg: &ClientMessage) {
        let json = match serde_json::to_string(msg) {
            Ok(json) => json,
            Err(e) => {
                Logger::warn(&format!("failed to encode signal: {}", e));
                return;
            }
        };
        let ws = inner_rc.borrow().ws.clone();
        if let Some(ws) = ws {
            if let Err(e) = ws.send_with_str(&json) {
                Logger::error(&e);
            }
        }
    }
}
