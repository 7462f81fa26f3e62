//! Local media acquisition and the publish path.
//!
//! Swapping a track for another of the same kind goes through
//! `RtcRtpSender::replace_track` and needs no SDP exchange; only adding a
//! kind the link has never carried triggers a renegotiation. Muting swaps in
//! a synthetic silent or black track so the senders stay alive.

use std::cell::RefCell;
use std::rc::Rc;

use meshtalk_core::tracks::PublishAction;
use meshtalk_core::{MediaKind, PeerId};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{MediaStream, MediaStreamTrack};

use crate::MeshEngine;
use crate::engine::MeshInner;
use crate::logger::Logger;

impl MeshEngine {
    /// Publishes `track` as our outgoing media of its kind, replacing any
    /// current one on every link.
    pub fn set_local_track(&self, kind: MediaKind, track: MediaStreamTrack) {
        publish_track(&self.inner_rc(), kind, track, true);
    }

    /// Replaces our outgoing media of `kind` with a synthetic blank track.
    /// Links that never carried this kind are left alone.
    pub fn mute_track(&self, kind: MediaKind) {
        let blank = match kind {
            MediaKind::Audio => silent_audio_track(),
            MediaKind::Video => blank_video_track(),
        };
        match blank {
            Ok(track) => publish_track(&self.inner_rc(), kind, track, false),
            Err(e) => Logger::error(&e),
        }
    }
}

pub(crate) fn publish_track(
    inner_rc: &Rc<RefCell<MeshInner>>,
    kind: MediaKind,
    track: MediaStreamTrack,
    add_missing: bool,
) {
    let needs_offer: Vec<PeerId> = {
        let inner = inner_rc.borrow();

        if let Some(stream) = &inner.local_stream {
            for old in tracks_of_kind(stream, kind) {
                old.stop();
                stream.remove_track(&old);
            }
            stream.add_track(&track);
        }

        let mut out = Vec::new();
        for (id, link) in &inner.links {
            let sender = sender_of_kind(&link.pc, kind);
            match PublishAction::decide(sender.is_some(), add_missing) {
                PublishAction::ReplaceSender => {
                    let Some(sender) = sender else { continue };
                    let promise = sender.replace_track(Some(&track));
                    wasm_bindgen_futures::spawn_local(async move {
                        if let Err(e) = JsFuture::from(promise).await {
                            Logger::error(&e);
                        }
                    });
                }
                PublishAction::AddAndOffer => {
                    if let Some(stream) = &inner.local_stream {
                        let _ = link.pc.add_track(&track, stream, &js_sys::Array::new());
                        out.push(*id);
                    }
                }
                PublishAction::Skip => {}
            }
        }
        out
    };

    for id in needs_offer {
        MeshEngine::start_offer(inner_rc.clone(), id);
    }
}

/// Fills `local_stream` if it is still empty: live capture when the user
/// grants it, synthetic blank tracks otherwise. Joining never fails on a
/// denied permission prompt.
pub(crate) async fn ensure_local_media(inner_rc: &Rc<RefCell<MeshInner>>) {
    if inner_rc.borrow().local_stream.is_some() {
        return;
    }

    let stream = match acquire_user_media().await {
        Ok(stream) => stream,
        Err(e) => {
            Logger::warn(&format!("Media capture unavailable ({:?}), using blank tracks", e));
            match blank_stream() {
                Ok(stream) => stream,
                Err(e) => {
                    Logger::error(&e);
                    return;
                }
            }
        }
    };

    inner_rc.borrow_mut().local_stream = Some(stream);
}

async fn acquire_user_media() -> Result<MediaStream, JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let devices = window.navigator().media_devices()?;

    let constraints = web_sys::MediaStreamConstraints::new();
    constraints.set_audio(&JsValue::TRUE);
    constraints.set_video(&JsValue::TRUE);

    let promise = devices.get_user_media_with_constraints(&constraints)?;
    JsFuture::from(promise).await?.dyn_into::<MediaStream>()
}

fn blank_stream() -> Result<MediaStream, JsValue> {
    let tracks = js_sys::Array::new();
    tracks.push(&silent_audio_track()?.into());
    tracks.push(&blank_video_track()?.into());
    MediaStream::new_with_tracks(&tracks)
}

/// Oscillator piped into a stream destination and stopped right away, which
/// leaves a live but silent audio track.
pub(crate) fn silent_audio_track() -> Result<MediaStreamTrack, JsValue> {
    let ctx = web_sys::AudioContext::new()?;
    let oscillator = ctx.create_oscillator()?;
    let destination = ctx.create_media_stream_destination()?;
    oscillator.connect_with_audio_node(&destination)?;
    oscillator.start()?;
    oscillator.stop_with_when(ctx.current_time() + 0.01)?;

    destination
        .stream()
        .get_audio_tracks()
        .get(0)
        .dyn_into::<MediaStreamTrack>()
}

/// Black 640x480 canvas captured at a low frame rate.
pub(crate) fn blank_video_track() -> Result<MediaStreamTrack, JsValue> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let canvas: web_sys::HtmlCanvasElement =
        document.create_element("canvas")?.dyn_into()?;
    canvas.set_width(640);
    canvas.set_height(480);

    let ctx: web_sys::CanvasRenderingContext2d = canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("no 2d context"))?
        .dyn_into()?;
    ctx.set_fill_style_str("black");
    ctx.fill_rect(0.0, 0.0, 640.0, 480.0);

    let stream = canvas.capture_stream_with_frame_request_rate(5.0)?;
    stream
        .get_video_tracks()
        .get(0)
        .dyn_into::<MediaStreamTrack>()
}

pub(crate) fn stream_tracks(stream: &MediaStream) -> Vec<MediaStreamTrack> {
    stream
        .get_tracks()
        .iter()
        .filter_map(|t| t.dyn_into::<MediaStreamTrack>().ok())
        .collect()
}

fn tracks_of_kind(stream: &MediaStream, kind: MediaKind) -> Vec<MediaStreamTrack> {
    stream_tracks(stream)
        .into_iter()
        .filter(|t| t.kind() == kind.as_str())
        .collect()
}

fn sender_of_kind(
    pc: &web_sys::RtcPeerConnection,
    kind: MediaKind,
) -> Option<web_sys::RtcRtpSender> {
    pc.get_senders()
        .iter()
        .filter_map(|s| s.dyn_into::<web_sys::RtcRtpSender>().ok())
        .find(|s| {
            s.track()
                .map(|t| t.kind() == kind.as_str())
                .unwrap_or(false)
        })
}
