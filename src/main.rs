//! Neon Arcade entry point.
//!
//! The wasm build wires one game canvas to a `Session`: input listeners,
//! the cancellable animation-frame loop, HUD DOM updates, audio output and
//! fire-and-forget score submission. The native build runs a deterministic
//! headless pass over every game as a smoke check.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_app {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use wasm_bindgen_futures::spawn_local;
    use web_sys::{HtmlCanvasElement, KeyboardEvent, MouseEvent, TouchEvent};

    use neon_arcade::audio::AudioOutput;
    use neon_arcade::render::{surface_size, Renderer};
    use neon_arcade::scores::{Identity, RestScoreStore, ScoreClient, SubmitOutcome};
    use neon_arcade::session::{ScoreSubmission, Session};
    use neon_arcade::settings::Settings;
    use neon_arcade::sim::{GameEvent, GameKind, GamePhase, TickInput};

    /// Explicit handle to the requestAnimationFrame chain. The loop keeps
    /// re-requesting itself only while this says so; `cancel` both stops the
    /// chain and revokes any frame already scheduled.
    struct RafLoop {
        raf_id: Rc<Cell<Option<i32>>>,
    }

    impl RafLoop {
        fn new() -> Self {
            Self {
                raf_id: Rc::new(Cell::new(None)),
            }
        }

        fn is_running(&self) -> bool {
            self.raf_id.get().is_some()
        }

        fn start(&self, app: Rc<RefCell<App>>) {
            if self.is_running() {
                return;
            }
            let raf_id = self.raf_id.clone();
            let closure: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> =
                Rc::new(RefCell::new(None));
            let closure_handle = closure.clone();
            *closure.borrow_mut() = Some(Closure::new(move |time: f64| {
                // A cancelled loop may still get its last scheduled frame
                if raf_id.get().is_none() {
                    return;
                }
                let keep_going = frame(&app, time);
                if keep_going {
                    let window = web_sys::window().expect("no window");
                    if let Ok(id) = window.request_animation_frame(
                        closure_handle
                            .borrow()
                            .as_ref()
                            .expect("loop closure")
                            .as_ref()
                            .unchecked_ref(),
                    ) {
                        raf_id.set(Some(id));
                    }
                } else {
                    raf_id.set(None);
                }
            }));

            let window = web_sys::window().expect("no window");
            if let Ok(id) = window.request_animation_frame(
                closure.borrow().as_ref().expect("loop closure").as_ref().unchecked_ref(),
            ) {
                self.raf_id.set(Some(id));
            }
            // The closure must outlive the loop; the raf_id guard keeps a
            // stale frame from running after cancel
            std::mem::forget(closure);
        }

        fn cancel(&self) {
            if let Some(id) = self.raf_id.take() {
                if let Some(window) = web_sys::window() {
                    let _ = window.cancel_animation_frame(id);
                }
            }
        }
    }

    struct App {
        session: Session,
        input: TickInput,
        renderer: Renderer,
        audio: AudioOutput,
        settings: Settings,
        identity: Option<Identity>,
        scores: Option<Rc<ScoreClient<RestScoreStore>>>,
        /// Best shown in the HUD; updated optimistically on submission
        best: u64,
        raf: RafLoop,
    }

    impl App {
        fn update_hud(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };

            if let Some(el) = document.get_element_by_id("hud-score") {
                el.set_text_content(Some(&self.session.score().to_string()));
            }
            if let Some(el) = document.get_element_by_id("hud-best") {
                el.set_text_content(Some(&self.best.to_string()));
            }

            let phase = self.session.phase();
            for (id, shown_in) in [
                ("menu-overlay", GamePhase::Menu),
                ("game-over-overlay", GamePhase::GameOver),
                ("level-clear-overlay", GamePhase::LevelClear),
                ("won-overlay", GamePhase::Won),
            ] {
                if let Some(el) = document.get_element_by_id(id) {
                    let class = if phase == shown_in { "overlay" } else { "overlay hidden" };
                    let _ = el.set_attribute("class", class);
                }
            }
            if let Some(el) = document.get_element_by_id("final-score") {
                el.set_text_content(Some(&self.session.score().to_string()));
            }
        }
    }

    /// One animation frame. Returns false when the loop should stop
    /// re-requesting (the session left PLAYING).
    fn frame(app: &Rc<RefCell<App>>, time: f64) -> bool {
        let mut a = app.borrow_mut();
        let input = a.input;
        let audio_now = a.audio.current_time();
        let out = a.session.frame(time, &input, audio_now);

        // One-shot edges are consumed by exactly one tick
        a.input.primary_pressed = false;
        a.input.left_pressed = false;
        a.input.right_pressed = false;
        a.input.up_pressed = false;
        a.input.down_pressed = false;

        for event in &out.events {
            match event {
                GameEvent::Sfx(cue) => a.audio.play(*cue),
                GameEvent::Died => a.audio.play(neon_arcade::audio::SfxCue::GameOver),
                _ => {}
            }
        }
        for note in &out.notes {
            a.audio.play_note(note);
        }

        if let Some(submission) = out.submission {
            a.best = a.best.max(submission.score);
            submit(&a, submission);
        }

        a.renderer.draw(a.session.sim(), &a.settings);
        a.update_hud();

        let playing = a.session.phase() == GamePhase::Playing;
        if !playing {
            // Drop the handle state so a later start() spins a fresh loop
            a.raf.raf_id.set(None);
        }
        playing
    }

    /// Fire-and-forget submission; the run is already over, so failures only
    /// warn and the optimistic HUD best stands.
    fn submit(app: &App, submission: ScoreSubmission) {
        let (Some(identity), Some(client)) = (app.identity.clone(), app.scores.clone()) else {
            log::info!("no identity/backend, score {} not submitted", submission.score);
            return;
        };
        spawn_local(async move {
            match client
                .submit_score(&identity, submission.game_id, submission.score)
                .await
            {
                Ok(SubmitOutcome::NewBest) => {
                    log::info!("new best for {}: {}", submission.game_id, submission.score)
                }
                Ok(SubmitOutcome::NotImproved) => {}
                Err(err) => log::warn!("score submission failed: {err}"),
            }
            refresh_leaderboard(&client, submission.game_id).await;
        });
    }

    async fn refresh_leaderboard(client: &ScoreClient<RestScoreStore>, game_id: &str) {
        let entries = client.leaderboard(game_id, 10).await;
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        let Some(list) = document.get_element_by_id("leaderboard") else {
            return;
        };
        list.set_inner_html("");
        for entry in entries {
            if let Ok(li) = document.create_element("li") {
                li.set_text_content(Some(&format!("{} — {}", entry.username, entry.high_score)));
                let _ = list.append_child(&li);
            }
        }
    }

    fn start_run(app: &Rc<RefCell<App>>) {
        let seed = js_sys::Date::now() as u64;
        {
            let mut a = app.borrow_mut();
            a.audio.resume();
            a.raf.cancel();
            a.session.start(seed);
            a.input = TickInput::default();
        }
        app.borrow().raf.start(app.clone());
        log::info!("run started, seed {seed}");
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("game-canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        let kind = canvas
            .get_attribute("data-game")
            .and_then(|id| GameKind::from_id(&id))
            .unwrap_or(GameKind::Dash);
        let (w, h) = surface_size(kind);
        canvas.set_width(w as u32);
        canvas.set_height(h as u32);

        let ctx = canvas
            .get_context("2d")
            .ok()
            .flatten()
            .expect("no 2d context")
            .dyn_into()
            .expect("not a 2d context");

        // Page-provided identity and backend location
        let identity = match (
            canvas.get_attribute("data-player-id"),
            canvas.get_attribute("data-username"),
        ) {
            (Some(player_id), Some(username)) if !player_id.is_empty() => Some(Identity {
                player_id,
                username,
            }),
            _ => None,
        };
        let scores = match (
            canvas.get_attribute("data-api-url"),
            canvas.get_attribute("data-api-key"),
        ) {
            (Some(url), Some(key)) => {
                Some(Rc::new(ScoreClient::new(RestScoreStore::new(url, key))))
            }
            _ => None,
        };

        let settings = Settings::load();
        let mut audio = AudioOutput::new();
        audio.set_sfx_volume(settings.sfx_volume);
        audio.set_music_volume(settings.music_volume);
        audio.set_muted(settings.muted);

        let seed = js_sys::Date::now() as u64;
        let app = Rc::new(RefCell::new(App {
            session: Session::new(kind, seed),
            input: TickInput::default(),
            renderer: Renderer::new(ctx),
            audio,
            settings,
            identity: identity.clone(),
            scores: scores.clone(),
            best: 0,
            raf: RafLoop::new(),
        }));

        // Stored best for the HUD, degrading to 0
        if let (Some(identity), Some(client)) = (identity, scores) {
            let app = app.clone();
            spawn_local(async move {
                let best = client.user_best(&identity.player_id, kind.id()).await;
                app.borrow_mut().best = best;
                app.borrow().update_hud();
                refresh_leaderboard(&client, kind.id()).await;
            });
        }

        setup_input(&canvas, app.clone());
        setup_buttons(app.clone());
        setup_auto_pause(app.clone());

        // Paint the menu backdrop once; the loop takes over on start
        {
            let a = app.borrow();
            a.renderer.draw(a.session.sim(), &a.settings);
            a.update_hud();
        }

        log::info!("{} ready", kind.title());
    }

    fn apply_key(input: &mut TickInput, key: &str, down: bool) {
        match key {
            "ArrowLeft" | "a" | "A" => {
                if down && !input.left {
                    input.left_pressed = true;
                }
                input.left = down;
            }
            "ArrowRight" | "d" | "D" => {
                if down && !input.right {
                    input.right_pressed = true;
                }
                input.right = down;
            }
            "ArrowUp" | "w" | "W" => {
                if down && !input.up {
                    input.up_pressed = true;
                }
                input.up = down;
            }
            "ArrowDown" | "s" | "S" => {
                if down && !input.down {
                    input.down_pressed = true;
                }
                input.down = down;
            }
            " " | "Enter" => {
                if down && !input.primary {
                    input.primary_pressed = true;
                }
                input.primary = down;
            }
            _ => {}
        }
    }

    fn setup_input(canvas: &HtmlCanvasElement, app: Rc<RefCell<App>>) {
        let window = web_sys::window().expect("no window");

        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let key = event.key();
                let mut a = app.borrow_mut();
                apply_key(&mut a.input, &key, true);
                // Space starts/restarts from any resting screen
                if (key == " " || key == "Enter") && a.session.phase() != GamePhase::Playing {
                    drop(a);
                    start_run(&app);
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                apply_key(&mut app.borrow_mut().input, &event.key(), false);
            });
            let _ =
                window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Pointer: aim plus primary fire
        {
            let app = app.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let rect = canvas_clone.get_bounding_client_rect();
                let mut a = app.borrow_mut();
                a.input.pointer = glam::Vec2::new(
                    event.client_x() as f32 - rect.left() as f32,
                    event.client_y() as f32 - rect.top() as f32,
                );
            });
            let _ = canvas
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let mut a = app.borrow_mut();
                a.input.primary_pressed = true;
                a.input.primary = true;
                if a.session.phase() != GamePhase::Playing {
                    drop(a);
                    start_run(&app);
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                app.borrow_mut().input.primary = false;
            });
            let _ = canvas
                .add_event_listener_with_callback("mouseup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch acts as the primary button
        {
            let app = app.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                let mut a = app.borrow_mut();
                a.input.primary_pressed = true;
                a.input.primary = true;
                if let Some(touch) = event.touches().get(0) {
                    let rect = canvas_clone.get_bounding_client_rect();
                    a.input.pointer = glam::Vec2::new(
                        touch.client_x() as f32 - rect.left() as f32,
                        touch.client_y() as f32 - rect.top() as f32,
                    );
                }
                if a.session.phase() != GamePhase::Playing {
                    drop(a);
                    start_run(&app);
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                app.borrow_mut().input.primary = false;
            });
            let _ = canvas
                .add_event_listener_with_callback("touchend", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_buttons(app: Rc<RefCell<App>>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        for id in ["start-btn", "restart-btn", "next-level-btn"] {
            if let Some(btn) = document.get_element_by_id(id) {
                let app = app.clone();
                let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                    start_run(&app);
                });
                let _ =
                    btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
                closure.forget();
            }
        }

        if let Some(btn) = document.get_element_by_id("mute-btn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let mut a = app.borrow_mut();
                a.settings.muted = !a.settings.muted;
                let muted = a.settings.muted;
                a.audio.set_muted(muted);
                a.settings.save();
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// A hidden tab stops the loop outright; the frame clock forgets the
    /// gap on resume, so no catch-up burst.
    fn setup_auto_pause(app: Rc<RefCell<App>>) {
        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");
        let document_clone = document.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                let a = app.borrow();
                if a.session.phase() == GamePhase::Playing {
                    a.raf.cancel();
                    log::info!("loop cancelled (tab hidden)");
                }
            } else {
                let a = app.borrow();
                if a.session.phase() == GamePhase::Playing && !a.raf.is_running() {
                    a.raf.start(app.clone());
                }
            }
        });
        let _ = document
            .add_event_listener_with_callback("visibilitychange", closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_app::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use neon_arcade::sim::{GameKind, GameSim, TickInput};

    env_logger::init();
    log::info!("Neon Arcade headless smoke run");

    for kind in GameKind::ALL {
        let mut sim = GameSim::new(kind, 0xFEED);
        let mut input = TickInput::default();
        // Keep one-button games airborne now and then
        for frame in 0..3600u32 {
            input.primary_pressed = frame % 45 == 0;
            sim.tick(&input, 1.0);
            sim.drain_events();
        }
        log::info!(
            "{:<14} frames={:<6} score={:<8} alive={}",
            kind.id(),
            sim.common().frames,
            sim.score(),
            sim.common().alive
        );
    }
    println!("smoke run complete");
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
