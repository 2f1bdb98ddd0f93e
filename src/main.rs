use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen::closure::Closure;
use wasm_bindgen_futures::spawn_local;
use web_sys::{
    CanvasRenderingContext2d, HtmlAudioElement, HtmlCanvasElement, HtmlImageElement,
    HtmlVideoElement,
};
use yew::prelude::*;

mod bridge;
mod gesture;
mod model;
mod util;

use gesture::{HandTracking, PinchLatch};
use model::{PopHit, SessionAction, SessionState, TARGET_HEIGHT, TARGET_WIDTH};
use util::clog;

/// Fingertip marker overlay, redrawn every frame.
const MARKER_COLOR: &str = "#4ce73c";
const MARKER_RADIUS: f64 = 10.0;
/// Pop-recovery delay. Real time, independent of the tick rate.
const RECOVERY_DELAY_MS: i32 = 250;
/// One 60 Hz frame, the unit `Advance::dt` is measured in.
const FRAME_MS: f64 = 1000.0 / 60.0;

#[derive(PartialEq, Clone, Copy)]
enum Phase {
    Booting,
    Running,
    CameraFailed,
}

/// Per-frame gesture state. Lives beside the reducer, not in it: the
/// latches and the frame-skip watermark are loop bookkeeping, not game
/// state.
struct GesturePipeline {
    tracking: HandTracking,
    left_latch: PinchLatch,
    right_latch: PinchLatch,
    last_video_time: f64,
}

impl GesturePipeline {
    fn new() -> Self {
        Self {
            tracking: HandTracking::default(),
            left_latch: PinchLatch::default(),
            right_latch: PinchLatch::default(),
            // sentinel below any real currentTime so the first frame processes
            last_video_time: -1.0,
        }
    }
}

struct Sprites {
    variants: [HtmlImageElement; 2],
    popped: HtmlImageElement,
}

fn load_sprites() -> Result<Sprites, JsValue> {
    let load = |src: &str| -> Result<HtmlImageElement, JsValue> {
        let img = HtmlImageElement::new()?;
        img.set_src(src);
        Ok(img)
    };
    Ok(Sprites {
        variants: [load("assets/alien1.png")?, load("assets/alien2.png")?],
        popped: load("assets/popped.png")?,
    })
}

fn draw_frame(
    ctx: &CanvasRenderingContext2d,
    video: &HtmlVideoElement,
    state: &SessionState,
    sprites: &Sprites,
    pipeline: &GesturePipeline,
    with_markers: bool,
) {
    let (w, h) = (state.screen.width, state.screen.height);
    // mirrored camera feed as the backdrop; overwrites the previous frame
    ctx.save();
    let _ = ctx.translate(w, 0.0);
    let _ = ctx.scale(-1.0, 1.0);
    let _ = ctx.draw_image_with_html_video_element_and_dw_and_dh(video, 0.0, 0.0, w, h);
    ctx.restore();

    for t in &state.targets {
        let img = if t.is_popped {
            &sprites.popped
        } else {
            &sprites.variants[t.variant as usize % sprites.variants.len()]
        };
        let _ = ctx.draw_image_with_html_image_element_and_dw_and_dh(
            img,
            t.x - TARGET_WIDTH / 2.0,
            t.y - TARGET_HEIGHT / 2.0,
            TARGET_WIDTH,
            TARGET_HEIGHT,
        );
    }

    if with_markers {
        ctx.set_fill_style_str(MARKER_COLOR);
        for sample in [&pipeline.tracking.left, &pipeline.tracking.right] {
            if !sample.present {
                continue;
            }
            for tip in [sample.index_tip, sample.thumb_tip] {
                let p = state.screen.from_camera(tip);
                ctx.begin_path();
                let _ = ctx.arc(p.x, p.y, MARKER_RADIUS, 0.0, std::f64::consts::PI * 2.0);
                ctx.fill();
            }
        }
    }
}

/// Arm the 250 ms recovery for a just-popped target. The generation in
/// `hit` makes the timer self-invalidating: if the target recycles off
/// the bottom first, the reducer drops the stale firing.
fn schedule_recovery(session: &UseReducerHandle<SessionState>, hit: PopHit) {
    let session = session.clone();
    let cb = Closure::once_into_js(move || {
        session.dispatch(SessionAction::Recover {
            index: hit.index,
            generation: hit.generation,
        });
    });
    if let Some(window) = web_sys::window() {
        let _ = window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                cb.unchecked_ref(),
                RECOVERY_DELAY_MS,
            );
    }
}

#[derive(Properties, PartialEq, Clone)]
struct GameViewProps {
    pub session: UseReducerHandle<SessionState>,
}

#[function_component(GameView)]
fn game_view(props: &GameViewProps) -> Html {
    let canvas_ref = use_node_ref();
    let video_ref = use_node_ref();
    let phase = use_state(|| Phase::Booting);
    let pipeline = use_mut_ref(GesturePipeline::new);
    let music_ref = use_mut_ref(|| None::<HtmlAudioElement>);
    let session_ref = use_mut_ref(|| props.session.clone());
    // keep the loop's handle current across re-renders
    *session_ref.borrow_mut() = props.session.clone();

    {
        let canvas_ref = canvas_ref.clone();
        let video_ref = video_ref.clone();
        let phase = phase.clone();
        let pipeline = pipeline.clone();
        let music_ref = music_ref.clone();
        let session_ref = session_ref.clone();
        use_effect_with((), move |_| {
            let window = web_sys::window().expect("no global `window` exists");
            let canvas: HtmlCanvasElement = canvas_ref
                .cast::<HtmlCanvasElement>()
                .expect("canvas_ref not attached to a canvas element");
            let video: HtmlVideoElement = video_ref
                .cast::<HtmlVideoElement>()
                .expect("video_ref not attached to a video element");
            canvas.set_width(bridge::CAMERA_WIDTH);
            canvas.set_height(bridge::CAMERA_HEIGHT);
            video.set_autoplay(true);
            video.set_muted(true);

            let raf_id: Rc<RefCell<Option<i32>>> = Rc::new(RefCell::new(None));
            let raf_id_cleanup = raf_id.clone();
            let music_cleanup = music_ref.clone();

            // One-time bootstrap: camera, then the landmark model, then
            // the render loop. Either failure is terminal for the game.
            spawn_local(async move {
                if let Err(err) = bridge::acquire_camera(&video).await {
                    clog(&format!("Error accessing webcam: {err:?}"));
                    phase.set(Phase::CameraFailed);
                    return;
                }
                if let Err(err) = bridge::init_hand_landmarker().await {
                    clog(&format!("hand landmarker init failed: {err:?}"));
                    phase.set(Phase::CameraFailed);
                    return;
                }
                let sprites = match load_sprites() {
                    Ok(sprites) => sprites,
                    Err(err) => {
                        clog(&format!("sprite load failed: {err:?}"));
                        phase.set(Phase::CameraFailed);
                        return;
                    }
                };
                let ctx = match canvas.get_context("2d").ok().flatten() {
                    Some(c) => c.dyn_into::<CanvasRenderingContext2d>().unwrap(),
                    None => return,
                };
                if let Ok(music) = bridge::background_music() {
                    let _ = music.play();
                    *music_ref.borrow_mut() = Some(music);
                }
                phase.set(Phase::Running);

                // Display-synchronized game loop. Stops rescheduling
                // itself once the session goes terminal.
                let closure_cell: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> =
                    Rc::new(RefCell::new(None));
                let closure_cell_clone = closure_cell.clone();
                let raf_id_loop = raf_id.clone();
                let window_loop = window.clone();
                let last_ts = Rc::new(RefCell::new(None::<f64>));
                *closure_cell.borrow_mut() = Some(Closure::wrap(Box::new(move |ts: f64| {
                    let session = session_ref.borrow().clone();
                    let snapshot = (*session).clone();
                    if snapshot.is_over() {
                        // final frame without hand markers, ambient audio off
                        draw_frame(&ctx, &video, &snapshot, &sprites, &pipeline.borrow(), false);
                        if let Some(music) = music_ref.borrow().as_ref() {
                            let _ = music.pause();
                        }
                        return;
                    }

                    let dt = {
                        let mut last = last_ts.borrow_mut();
                        let dt = last.map_or(1.0, |prev| (ts - prev) / FRAME_MS);
                        *last = Some(ts);
                        dt
                    };
                    session.dispatch(SessionAction::Advance { dt });

                    // run detection only when the camera delivered a new frame
                    let mut pipe = pipeline.borrow_mut();
                    let video_time = video.current_time();
                    if video_time != pipe.last_video_time {
                        pipe.last_video_time = video_time;
                        let frame = bridge::decode_detections(&bridge::detect_hands(&video, ts));
                        pipe.tracking.resolve(&frame);
                        let pipe = &mut *pipe;
                        let starts = [
                            pipe.left_latch.update(&pipe.tracking.left),
                            pipe.right_latch.update(&pipe.tracking.right),
                        ];
                        for midpoint in starts.into_iter().flatten() {
                            let point = snapshot.screen.from_camera(midpoint);
                            for hit in snapshot.hits_at(point) {
                                session.dispatch(SessionAction::Pop {
                                    index: hit.index,
                                    generation: hit.generation,
                                });
                                bridge::play_pop();
                                schedule_recovery(&session, hit);
                            }
                        }
                    }

                    draw_frame(&ctx, &video, &snapshot, &sprites, &pipe, true);
                    drop(pipe);

                    if let Ok(id) = window_loop.request_animation_frame(
                        closure_cell_clone
                            .borrow()
                            .as_ref()
                            .unwrap()
                            .as_ref()
                            .unchecked_ref(),
                    ) {
                        *raf_id_loop.borrow_mut() = Some(id);
                    }
                }) as Box<dyn FnMut(f64)>));
                if let Ok(id) = window.request_animation_frame(
                    closure_cell
                        .borrow()
                        .as_ref()
                        .unwrap()
                        .as_ref()
                        .unchecked_ref(),
                ) {
                    *raf_id.borrow_mut() = Some(id);
                }
            });

            move || {
                if let Some(id) = raf_id_cleanup.borrow_mut().take() {
                    if let Some(window) = web_sys::window() {
                        let _ = window.cancel_animation_frame(id);
                    }
                }
                if let Some(music) = music_cleanup.borrow().as_ref() {
                    let _ = music.pause();
                }
            }
        });
    }

    let snapshot = (*props.session).clone();
    let over = snapshot.is_over();
    html! {
        <div style="position:relative; width:1280px; height:720px; margin:0 auto;">
            <video ref={video_ref} style="display:none;" playsinline=true></video>
            <canvas ref={canvas_ref} id="game-canvas" style="display:block; background:#000;"></canvas>
            <div style="position:absolute; top:8px; left:12px; font-family:Barlow,sans-serif; font-size:40px; color:#000000;">
                <div>{ format!("Score: {}", snapshot.score) }</div>
                <div>{ format!("Lives: {}", snapshot.lives) }</div>
            </div>
            { match *phase {
                Phase::Booting => html! {
                    <div style="position:absolute; top:50%; left:50%; transform:translate(-50%, -50%); background:rgba(0,0,0,0.75); color:#fff; padding:16px 24px; border-radius:8px;">
                        {"Waiting for camera…"}
                    </div>
                },
                Phase::CameraFailed => html! {
                    <div style="position:absolute; top:50%; left:50%; transform:translate(-50%, -50%); background:rgba(0,0,0,0.85); color:#f85149; padding:16px 24px; border-radius:8px;">
                        {"Camera unavailable. The game can't start."}
                    </div>
                },
                Phase::Running => html! {},
            } }
            { if over {
                html! {
                    <div style="position:absolute; top:50%; left:50%; transform:translate(-50%, -50%); background:rgba(0,0,0,0.85); border:2px solid #f85149; padding:24px 32px; border-radius:12px; text-align:center; min-width:280px; color:#fff;">
                        <h2 style="margin:0 0 12px 0; color:#f85149;">{"Game Over"}</h2>
                        <p style="margin:4px 0;">{ format!("Final Score: {}", snapshot.score) }</p>
                    </div>
                }
            } else { html! {} } }
        </div>
    }
}

#[function_component(App)]
fn app() -> Html {
    // wall-clock seed so every session shuffles differently
    let session = use_reducer(|| SessionState::new(js_sys::Date::now() as u64));
    html! { <GameView session={session} /> }
}

fn main() {
    yew::Renderer::<App>::new().render();
}
