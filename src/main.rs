//! Cabinet Shooter entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{EventTarget, HtmlCanvasElement, KeyboardEvent, PointerEvent};

    use cabinet_shooter::audio::AudioManager;
    use cabinet_shooter::consts::*;
    use cabinet_shooter::platform::{ControlSurface, Key, KeyValueStore, LocalStorage, MemoryStore, now_ms};
    use cabinet_shooter::renderer::{CabinetRenderer, build_scene};
    use cabinet_shooter::{Screen, Session};

    type WebSession = Session<Box<dyn KeyValueStore>, AudioManager>;

    /// An event listener that is removed again when dropped
    struct Listener {
        target: EventTarget,
        kind: &'static str,
        closure: Closure<dyn FnMut(web_sys::Event)>,
    }

    impl Listener {
        fn new(target: &EventTarget, kind: &'static str, handler: impl FnMut(web_sys::Event) + 'static) -> Self {
            let closure = Closure::<dyn FnMut(web_sys::Event)>::new(handler);
            if let Err(e) = target.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref()) {
                log::warn!("Could not listen for {}: {:?}", kind, e);
            }
            Self {
                target: target.clone(),
                kind,
                closure,
            }
        }
    }

    impl Drop for Listener {
        fn drop(&mut self) {
            let _ = self
                .target
                .remove_event_listener_with_callback(self.kind, self.closure.as_ref().unchecked_ref());
        }
    }

    /// What the HUD currently shows, to skip redundant DOM writes
    #[derive(Clone, Copy, PartialEq)]
    enum HudMode {
        Splash,
        Playing,
        GameOver,
    }

    /// Game instance holding all state
    struct Game {
        session: WebSession,
        controls: ControlSurface,
        renderer: Option<CabinetRenderer>,
        canvas: HtmlCanvasElement,
        last_time: f64,
        hud_mode: Option<HudMode>,
        hud_score: Option<u64>,
        /// Page-lifetime DOM listeners
        _listeners: Vec<Listener>,
    }

    impl Game {
        /// Canvas size in CSS pixels
        fn client_size(&self) -> (f32, f32) {
            (self.canvas.client_width() as f32, self.canvas.client_height() as f32)
        }

        /// Pointer position in CSS pixels relative to the canvas
        fn pointer_pos(&self, event: &PointerEvent) -> Vec2 {
            let rect = self.canvas.get_bounding_client_rect();
            Vec2::new(
                event.client_x() as f32 - rect.left() as f32,
                event.client_y() as f32 - rect.top() as f32,
            )
        }

        fn resize(&mut self) {
            let Some(window) = web_sys::window() else { return };
            let dpr = window.device_pixel_ratio();
            let (w, h) = self.client_size();
            let width = (w as f64 * dpr) as u32;
            let height = (h as f64 * dpr) as u32;

            self.canvas.set_width(width);
            self.canvas.set_height(height);
            if self.session.resize(w, h) {
                self.controls.layout(w, h);
                if let Some(renderer) = self.renderer.as_mut() {
                    renderer.resize(width, height, dpr as f32);
                }
                log::info!("Resized to {}x{} ({}x{} physical)", w, h, width, height);
            }
        }

        fn frame(&mut self, time: f64) {
            let dt = if self.last_time > 0.0 {
                ((time - self.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            self.last_time = time;

            self.session.update(dt, &mut self.controls);
            self.render();
            self.update_hud();
        }

        fn render(&mut self) {
            let Some(renderer) = self.renderer.as_mut() else { return };
            let compositor = self.session.compositor();
            let list = build_scene(self.session.run(), Some(&self.controls), compositor);

            match renderer.render(&list, compositor) {
                Ok(_) => {}
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => renderer.reconfigure(),
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    log::error!("Out of memory!");
                }
                Err(e) => log::warn!("Render error: {:?}", e),
            }
        }

        fn update_hud(&mut self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };

            let (mode, score) = match self.session.screen() {
                Screen::Splash { last_score } => (HudMode::Splash, *last_score),
                Screen::Playing(run) if run.is_over() => (HudMode::GameOver, Some(run.state().score)),
                Screen::Playing(run) => (HudMode::Playing, Some(run.state().score)),
            };

            if score != self.hud_score {
                self.hud_score = score;
                if let Some(el) = document.query_selector("#hud-score .hud-value").ok().flatten() {
                    el.set_text_content(Some(&score.unwrap_or(0).to_string()));
                }
            }

            if Some(mode) == self.hud_mode {
                return;
            }
            self.hud_mode = Some(mode);

            let show = |id: &str, visible: bool| {
                if let Some(el) = document.get_element_by_id(id) {
                    let _ = el.set_attribute("class", if visible { "" } else { "hidden" });
                }
            };
            show("hud", mode != HudMode::Splash);
            show("game-over", mode == HudMode::GameOver);
            show("splash", mode == HudMode::Splash);

            if mode == HudMode::Splash {
                if let Some(el) = document.get_element_by_id("last-score") {
                    let text = score.map(|s| format!("Last score: {}", s)).unwrap_or_default();
                    el.set_text_content(Some(&text));
                }
                if let Some(list) = document.get_element_by_id("high-scores") {
                    let items: String = self
                        .session
                        .splash_lines(now_ms())
                        .iter()
                        .map(|line| format!("<li>{}</li>", line))
                        .collect();
                    list.set_inner_html(&items);
                }
            }
        }
    }

    fn open_store() -> Box<dyn KeyValueStore> {
        match LocalStorage::open() {
            Ok(storage) => Box::new(storage),
            Err(e) => {
                log::warn!("{}; scores will not persist", e);
                Box::new(MemoryStore::new())
            }
        }
    }

    fn js_err(e: impl std::fmt::Display) -> JsValue {
        JsValue::from_str(&e.to_string())
    }

    pub async fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"Logger already initialized".into());
        }

        log::info!("{} starting...", GAME_TITLE);

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }
        if let Some(title) = document.get_element_by_id("splash-title") {
            title.set_text_content(Some(GAME_TITLE));
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or("no canvas")?
            .dyn_into()
            .map_err(|_| "not a canvas")?;

        let dpr = window.device_pixel_ratio();
        let client_w = canvas.client_width() as f32;
        let client_h = canvas.client_height() as f32;
        let width = (client_w as f64 * dpr) as u32;
        let height = (client_h as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        let session = Session::new(client_w, client_h, open_store(), AudioManager::new());
        let touch_device = window.navigator().max_touch_points() > 0;
        let touch_enabled = session.settings().touch_controls_visible(touch_device);
        log::info!("Touch controls {}", if touch_enabled { "on" } else { "off" });

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .map_err(js_err)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(js_err)?;

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let renderer = CabinetRenderer::new(surface, &adapter, width, height, dpr as f32)
            .await
            .map_err(js_err)?;

        let game = Rc::new(RefCell::new(Game {
            session,
            controls: ControlSurface::new(client_w, client_h, touch_enabled),
            renderer: Some(renderer),
            canvas: canvas.clone(),
            last_time: 0.0,
            hud_mode: None,
            hud_score: None,
            _listeners: Vec::new(),
        }));

        let listeners = setup_listeners(&window, &document, &canvas, &game);
        log::debug!("Attached {} listeners", listeners.len());
        game.borrow_mut()._listeners = listeners;

        request_animation_frame(game);

        log::info!("{} running!", GAME_TITLE);
        Ok(())
    }

    fn setup_listeners(
        window: &web_sys::Window,
        document: &web_sys::Document,
        canvas: &HtmlCanvasElement,
        game: &Rc<RefCell<Game>>,
    ) -> Vec<Listener> {
        let mut listeners = Vec::new();

        // Keyboard
        {
            let game = game.clone();
            listeners.push(Listener::new(window, "keydown", move |event| {
                let Some(event) = event.dyn_ref::<KeyboardEvent>() else { return };
                let mut g = game.borrow_mut();
                if let Some(key) = Key::from_dom_key(&event.key()) {
                    event.prevent_default();
                    g.controls.keyboard.key_down(key);
                } else if event.key().eq_ignore_ascii_case("m") && !event.repeat() {
                    let mut settings = g.session.settings().clone();
                    settings.muted = !settings.muted;
                    log::info!("Sound {}", if settings.muted { "muted" } else { "unmuted" });
                    g.session.set_settings(settings);
                }
            }));
        }
        {
            let game = game.clone();
            listeners.push(Listener::new(window, "keyup", move |event| {
                let Some(event) = event.dyn_ref::<KeyboardEvent>() else { return };
                if let Some(key) = Key::from_dom_key(&event.key()) {
                    game.borrow_mut().controls.keyboard.key_up(key);
                }
            }));
        }
        {
            // Keys released while unfocused never send keyup
            let game = game.clone();
            listeners.push(Listener::new(window, "blur", move |_event| {
                game.borrow_mut().controls.keyboard.release_all();
            }));
        }

        // Touch / mouse widgets
        {
            let game = game.clone();
            listeners.push(Listener::new(canvas, "pointerdown", move |event| {
                let Some(event) = event.dyn_ref::<PointerEvent>() else { return };
                let mut g = game.borrow_mut();
                let pos = g.pointer_pos(event);
                g.session.audio().resume();
                if g.controls.pointer_down(event.pointer_id(), pos) {
                    event.prevent_default();
                } else if g.session.tap(pos) {
                    log::info!("Run started from monitor tap");
                }
            }));
        }
        {
            let game = game.clone();
            listeners.push(Listener::new(canvas, "pointermove", move |event| {
                let Some(event) = event.dyn_ref::<PointerEvent>() else { return };
                let mut g = game.borrow_mut();
                let pos = g.pointer_pos(event);
                g.controls.pointer_move(event.pointer_id(), pos);
            }));
        }
        for kind in ["pointerup", "pointercancel"] {
            let game = game.clone();
            listeners.push(Listener::new(canvas, kind, move |event| {
                let Some(event) = event.dyn_ref::<PointerEvent>() else { return };
                game.borrow_mut().controls.pointer_up(event.pointer_id());
            }));
        }

        // Window resize
        {
            let game = game.clone();
            listeners.push(Listener::new(window, "resize", move |_event| {
                game.borrow_mut().resize();
            }));
        }

        // Start button
        if let Some(btn) = document.get_element_by_id("start-btn") {
            let game = game.clone();
            listeners.push(Listener::new(&btn, "click", move |_event| {
                let mut g = game.borrow_mut();
                // First user gesture unlocks audio
                g.session.audio().resume();
                if g.session.start_run() {
                    log::info!("Run started from splash");
                }
            }));
        }

        listeners
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else { return };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        game.borrow_mut().frame(time);
        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    if let Err(e) = wasm_game::run().await {
        log::error!("Startup failed: {:?}", e);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use cabinet_shooter::Session;
    use cabinet_shooter::audio::{RecordingAudio, SoundEvent};
    use cabinet_shooter::consts::*;
    use cabinet_shooter::platform::{FileStore, now_ms};
    use cabinet_shooter::sim::GameEvent;

    env_logger::init();
    log::info!("{} (native) starting...", GAME_TITLE);
    log::info!("Native mode plays a scripted headless run - run with `trunk serve` for the web version");

    let path = std::env::temp_dir().join("cabinet-shooter-scores.json");
    let mut session = Session::new(800.0, 600.0, FileStore::new(&path), RecordingAudio::default());
    session.start_run();

    let mut pilot = Autopilot::default();
    let mut frames = 0;
    while session.is_playing() && frames < 60 * 60 {
        for event in session.update(SIM_DT, &mut pilot) {
            match event {
                GameEvent::GameOver { score } => println!("Game over at score {}", score),
                GameEvent::RunComplete { final_score } => println!("Run complete: {}", final_score),
                _ => {}
            }
        }
        frames += 1;
    }

    println!(
        "Shots fired: {}, scores stored in {}",
        session.audio().count(SoundEvent::Fired),
        path.display()
    );
    println!("\nHigh scores:");
    for line in session.splash_lines(now_ms()) {
        println!("  {}", line);
    }
}

/// Scripted input for the headless run: dodge down-left while shooting,
/// then head straight for the hazard
#[cfg(not(target_arch = "wasm32"))]
#[derive(Default)]
struct Autopilot {
    ticks: u32,
}

#[cfg(not(target_arch = "wasm32"))]
impl cabinet_shooter::platform::InputSource for Autopilot {
    fn snapshot(&mut self) -> cabinet_shooter::sim::TickInput {
        self.ticks += 1;
        let dodging = self.ticks < 90;
        cabinet_shooter::sim::TickInput {
            left: dodging,
            down: dodging,
            right: !dodging,
            up: !dodging,
            fire: self.ticks % 30 == 0,
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {}
