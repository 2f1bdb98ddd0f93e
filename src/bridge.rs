//! Bindings to the page-level collaborators: the MediaPipe hand
//! landmarker shim, the webcam, and audio playback.
//!
//! The landmarker itself is opaque. It lives in `assets/landmarker.js`
//! and hands back one JSON payload per processed video frame, which is
//! decoded here into [`FrameDetections`].

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{HtmlAudioElement, HtmlVideoElement, MediaStream, MediaStreamConstraints};

use crate::gesture::hand::{FrameDetections, LANDMARK_COUNT};
use crate::util::clog;

/// Fixed capture resolution; also the game screen size.
pub const CAMERA_WIDTH: u32 = 1280;
pub const CAMERA_HEIGHT: u32 = 720;

pub const MUSIC_SRC: &str = "assets/background-music.mp3";
pub const MUSIC_VOLUME: f64 = 0.5;
pub const POP_SRC: &str = "assets/pop.mp3";

#[wasm_bindgen(raw_module = "/assets/landmarker.js")]
extern "C" {
    /// Loads the tasks-vision fileset and the hand landmarker model
    /// (video mode, two hands, GPU delegate). Must resolve before the
    /// first `detect_hands` call.
    #[wasm_bindgen(js_name = initHandLandmarker, catch)]
    pub async fn init_hand_landmarker() -> Result<JsValue, JsValue>;

    /// Runs detection on the current video frame. Returns JSON:
    /// `{"hands":[{"handedness":0,"landmarks":[{"x":..,"y":..}, ..]}]}`.
    #[wasm_bindgen(js_name = detectHands)]
    pub fn detect_hands(video: &HtmlVideoElement, timestamp_ms: f64) -> String;
}

/// Decode one frame's detection payload. A malformed payload logs and
/// counts as "no hands"; a hand with the wrong landmark count is
/// dropped rather than risking an out-of-range index downstream.
pub fn decode_detections(json: &str) -> FrameDetections {
    let mut frame = match serde_json::from_str::<FrameDetections>(json) {
        Ok(frame) => frame,
        Err(err) => {
            clog(&format!("bad detection payload: {err}"));
            FrameDetections::default()
        }
    };
    frame.hands.retain(|h| h.landmarks.len() == LANDMARK_COUNT);
    frame
}

/// One-time webcam acquisition at the fixed capture size. Resolves once
/// the stream is attached and the element is playing. A rejected
/// permission prompt surfaces here as `Err`; the game never starts.
pub async fn acquire_camera(video: &HtmlVideoElement) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let devices = window.navigator().media_devices()?;

    let size = js_sys::Object::new();
    js_sys::Reflect::set(&size, &"width".into(), &JsValue::from_f64(CAMERA_WIDTH as f64))?;
    js_sys::Reflect::set(&size, &"height".into(), &JsValue::from_f64(CAMERA_HEIGHT as f64))?;
    let constraints = MediaStreamConstraints::new();
    constraints.set_video(&size);

    let stream: MediaStream = JsFuture::from(devices.get_user_media_with_constraints(&constraints)?)
        .await?
        .dyn_into()?;
    video.set_src_object(Some(&stream));
    JsFuture::from(video.play()?).await?;
    Ok(())
}

/// Looping ambient track at half volume. Playback starts with the game
/// and pauses for good on game over.
pub fn background_music() -> Result<HtmlAudioElement, JsValue> {
    let music = HtmlAudioElement::new_with_src(MUSIC_SRC)?;
    music.set_loop(true);
    music.set_volume(MUSIC_VOLUME);
    Ok(music)
}

/// Fire-and-forget pop sound. Each call makes an independent element so
/// rapid pops overlap instead of restarting a shared instance.
pub fn play_pop() {
    if let Ok(audio) = HtmlAudioElement::new_with_src(POP_SRC) {
        let _ = audio.play();
    }
}
