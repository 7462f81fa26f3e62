use std::cell::RefCell;
use std::rc::Rc;

use meshtalk_core::{ClientMessage, ControlMessage, OutboundHalf, PeerId, outbound_half};
use wasm_bindgen::prelude::*;
use web_sys::RtcDataChannelState;

use crate::MeshEngine;
use crate::engine::{MeshEvent, MeshInner};
use crate::logger::Logger;

impl MeshEngine {
    pub(super) fn setup_control_channel(
        inner_rc: &Rc<RefCell<MeshInner>>,
        peer_id: PeerId,
        dc: &web_sys::RtcDataChannel,
    ) {
        let on_msg = {
            let inner = inner_rc.clone();
            Closure::<dyn FnMut(web_sys::MessageEvent)>::wrap(Box::new(
                move |ev: web_sys::MessageEvent| {
                    let Ok(text) = ev.data().dyn_into::<js_sys::JsString>() else {
                        return;
                    };
                    let text: String = text.into();
                    match serde_json::from_str::<ControlMessage>(&text) {
                        Ok(msg) => Self::handle_control(&inner, peer_id, msg),
                        Err(e) => Logger::warn(&format!("Bad control message: {}", e)),
                    }
                },
            ))
        };
        dc.set_onmessage(Some(on_msg.as_ref().unchecked_ref()));
        on_msg.forget();
    }

    pub(super) fn handle_control(
        inner_rc: &Rc<RefCell<MeshInner>>,
        from: PeerId,
        msg: ControlMessage,
    ) {
        // The channel a message arrives on is authoritative for its origin;
        // a claimed sender id that does not match is dropped.
        if *msg.sender() != from {
            Logger::warn(&format!("Control message from {} spoofing {}", from, msg.sender()));
            return;
        }
        if !inner_rc.borrow().links.contains_key(&from) {
            return;
        }

        match msg {
            ControlMessage::Rename { message, .. } => {
                if let Some(link) = inner_rc.borrow_mut().links.get_mut(&from) {
                    link.user_data.display_name = message.clone();
                }
                Self::dispatch_event(
                    inner_rc,
                    MeshEvent::PeerRenamed {
                        peer_id: from.to_string(),
                        display_name: message,
                    },
                );
            }
            ControlMessage::Chat {
                name,
                peer_id,
                message,
                date,
            } => {
                inner_rc.borrow_mut().chat.push(ControlMessage::Chat {
                    name: name.clone(),
                    peer_id,
                    message: message.clone(),
                    date: date.clone(),
                });
                Self::dispatch_event(
                    inner_rc,
                    MeshEvent::Chat {
                        name,
                        peer_id: peer_id.to_string(),
                        message,
                        date,
                    },
                );
            }
        }
    }

    fn fan_out_control(inner_rc: &Rc<RefCell<MeshInner>>, msg: &ControlMessage) {
        let json = match serde_json::to_string(msg) {
            Ok(json) => json,
            Err(e) => {
                Logger::warn(&format!("failed to encode control message: {}", e));
                return;
            }
        };

        // One delivery per link with any open channel.
        let channels: Vec<web_sys::RtcDataChannel> = {
            let inner = inner_rc.borrow();
            inner
                .links
                .values()
                .filter_map(|link| {
                    let local_open = link.dc.ready_state() == RtcDataChannelState::Open;
                    let remote_open = link
                        .remote_dc
                        .as_ref()
                        .is_some_and(|dc| dc.ready_state() == RtcDataChannelState::Open);
                    match outbound_half(local_open, remote_open)? {
                        OutboundHalf::Local => Some(link.dc.clone()),
                        OutboundHalf::Remote => link.remote_dc.clone(),
                    }
                })
                .collect()
        };

        for dc in channels {
            if let Err(e) = dc.send_with_str(&json) {
                Logger::error(&e);
            }
        }
    }

    /// Appends the message to the local log and fans it out to every open
    /// control channel.
    pub fn send_chat(&self, text: &str) {
        let inner_rc = self.inner_rc();
        let (name, self_id) = {
            let inner = inner_rc.borrow();
            let Some(self_id) = inner.self_id else {
                Logger::warn(&"Chat before Welcome, dropped");
                return;
            };
            (inner.user_data.display_name.clone(), self_id)
        };
        let date = now_iso();

        let msg = ControlMessage::Chat {
            name: name.clone(),
            peer_id: self_id,
            message: text.to_string(),
            date: date.clone(),
        };

        inner_rc.borrow_mut().chat.push(msg.clone());
        Self::dispatch_event(
            &inner_rc,
            MeshEvent::Chat {
                name,
                peer_id: self_id.to_string(),
                message: text.to_string(),
                date,
            },
        );
        Self::fan_out_control(&inner_rc, &msg);
    }

    /// Changes our display name: peers learn it over the control channels,
    /// the relay's registry through `updateUserData`.
    pub fn set_display_name(&self, name: &str) {
        let inner_rc = self.inner_rc();
        let (msg, signal) = {
            let mut inner = inner_rc.borrow_mut();
            let Some(self_id) = inner.self_id else {
                Logger::warn(&"Rename before Welcome, dropped");
                return;
            };
            inner.user_data.display_name = name.to_string();
            let msg = ControlMessage::Rename {
                name: name.to_string(),
                peer_id: self_id,
                message: name.to_string(),
                date: now_iso(),
            };
            let signal = ClientMessage::UpdateUserData {
                channel: inner.channel.to_string(),
                key: "displayName".to_string(),
                value: serde_json::Value::String(name.to_string()),
            };
            (msg, signal)
        };

        Self::send_signal(&inner_rc, &signal);
        Self::fan_out_control(&inner_rc, &msg);
    }

    pub fn chat_history(&self) -> Vec<ControlMessage> {
        self.inner_rc().borrow().chat.entries().to_vec()
    }
}

fn now_iso() -> String {
    js_sys::Date::new_0().to_iso_string().into()
}
