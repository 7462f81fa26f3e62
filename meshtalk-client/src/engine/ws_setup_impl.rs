use meshtalk_core::ClientMessage;
use wasm_bindgen::prelude::*;
use wasm_bindgen::{JsValue, prelude::Closure};
use web_sys::WebSocket;

use crate::MeshEngine;
use crate::logger::Logger;

impl MeshEngine {
    pub(crate) fn ws_setup(&self, url: &str) -> Result<(), JsValue> {
        let ws: WebSocket = web_sys::WebSocket::new(url)?;

        let onopen_callback = {
            let inner = self.inner_rc();
            Closure::<dyn FnMut(JsValue)>::wrap(Box::new(move |_| {
                Logger::info(&"WS Open");
                let inner = inner.clone();
                wasm_bindgen_futures::spawn_local(async move {
                    crate::tracks::ensure_local_media(&inner).await;

                    let join_msg = {
                        let inner_ref = inner.borrow();
                        ClientMessage::Join {
                            channel: inner_ref.channel.to_string(),
                            user_data: inner_ref.user_data.clone(),
                        }
                    };
                    Self::send_signal(&inner, &join_msg);
                });
            }))
        };
        ws.set_onopen(Some(onopen_callback.as_ref().unchecked_ref()));
        onopen_callback.forget();

        let onmessage_callback = {
            let inner = self.inner_rc();
            Closure::<dyn FnMut(web_sys::MessageEvent)>::wrap(Box::new(
                move |e: web_sys::MessageEvent| {
                    if let Ok(text) = e.data().dyn_into::<js_sys::JsString>() {
                        let text: String = text.into();
                        Self::handle_signal(&inner, text);
                    }
                },
            ))
        };
        ws.set_onmessage(Some(onmessage_callback.as_ref().unchecked_ref()));
        onmessage_callback.forget();

        // A dropped socket means our membership is gone server-side, so the
        // mesh is torn down and the embedder has to rejoin from scratch.
        let onclose_callback = {
            let inner = self.inner_rc();
            Closure::<dyn FnMut(JsValue)>::wrap(Box::new(move |_| {
                Logger::warn(&"WS Closed, tearing down mesh");
                Self::shutdown_mesh(&inner);
                inner.borrow_mut().ws = None;
            }))
        };
        ws.set_onclose(Some(onclose_callback.as_ref().unchecked_ref()));
        onclose_callback.forget();

        self.inner_rc().borrow_mut().ws = Some(ws);
        Ok(())
    }
}
