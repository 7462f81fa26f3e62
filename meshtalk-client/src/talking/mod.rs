//! Remote talking detection.
//!
//! Each peer with remote audio gets one probe: an `AnalyserNode` sampled on
//! every animation frame. The mean of the byte frequency bins is fed to the
//! pure [`TalkState`] threshold, which only reports changes, so the embedder
//! sees one event per start and one per stop of speech.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use meshtalk_core::PeerId;
use meshtalk_core::talking::{AUDIO_WINDOW_SIZE, TalkState};
use wasm_bindgen::prelude::*;
use web_sys::MediaStream;

use crate::MeshEngine;
use crate::engine::{MeshEvent, MeshInner};
use crate::logger::Logger;

/// Handle to one running probe. Dropping the engine's reference via `stop`
/// ends the animation frame loop and releases the audio context.
pub struct TalkingProbe {
    ctx: web_sys::AudioContext,
    active: Rc<Cell<bool>>,
}

impl TalkingProbe {
    pub fn stop(&self) {
        self.active.set(false);
        let _ = self.ctx.close();
    }
}

pub(crate) fn start_probe(
    inner_rc: &Rc<RefCell<MeshInner>>,
    peer_id: PeerId,
    stream: &MediaStream,
) -> Result<TalkingProbe, JsValue> {
    let ctx = web_sys::AudioContext::new()?;
    let source = ctx.create_media_stream_source(stream)?;
    let analyser = ctx.create_analyser()?;
    analyser.set_fft_size(AUDIO_WINDOW_SIZE);
    source.connect_with_audio_node(&analyser)?;

    let active = Rc::new(Cell::new(true));
    let mut data = vec![0u8; analyser.frequency_bin_count() as usize];
    let mut state = TalkState::default();

    // Self-rescheduling animation frame loop. The closure holds itself
    // through `holder` and drops the cycle once the probe is stopped.
    let holder: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let tick = {
        let holder = holder.clone();
        let inner = inner_rc.clone();
        let active = active.clone();
        Closure::wrap(Box::new(move || {
            if !active.get() {
                holder.borrow_mut().take();
                return;
            }

            analyser.get_byte_frequency_data(&mut data);
            let mean = data.iter().map(|v| *v as f32).sum::<f32>() / data.len() as f32;
            if let Some(talking) = state.update(mean) {
                set_peer_talking(&inner, peer_id, talking);
            }

            let Some(window) = web_sys::window() else {
                return;
            };
            if let Some(cb) = holder.borrow().as_ref() {
                if let Err(e) = window.request_animation_frame(cb.as_ref().unchecked_ref()) {
                    Logger::error(&e);
                }
            }
        }) as Box<dyn FnMut()>)
    };
    *holder.borrow_mut() = Some(tick);

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    if let Some(cb) = holder.borrow().as_ref() {
        window.request_animation_frame(cb.as_ref().unchecked_ref())?;
    }

    Ok(TalkingProbe { ctx, active })
}

fn set_peer_talking(inner_rc: &Rc<RefCell<MeshInner>>, peer_id: PeerId, talking: bool) {
    if let Some(link) = inner_rc.borrow_mut().links.get_mut(&peer_id) {
        link.user_data
            .set("isTalking", serde_json::Value::Bool(talking));
    }
    MeshEngine::dispatch_event(
        inner_rc,
        MeshEvent::Talking {
            peer_id: peer_id.to_string(),
            talking,
        },
    );
}
