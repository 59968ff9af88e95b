//! Splash / run flow
//!
//! A `Session` lives as long as the page. It shows the splash screen, builds a
//! fresh `GameLoop` for every run, feeds it fixed timesteps from variable
//! frame deltas and records the score when the run completes.

use glam::Vec2;

use crate::audio::{AudioSink, SoundEvent};
use crate::compositor::Compositor;
use crate::consts::*;
use crate::highscores::{HighScores, ScoreBoard};
use crate::platform::input::InputSource;
use crate::platform::storage::KeyValueStore;
use crate::settings::Settings;
use crate::sim::{GameEvent, GameLoop};

/// What the player is looking at
#[derive(Debug)]
pub enum Screen {
    Splash {
        /// Score of the run that just ended
        last_score: Option<u64>,
    },
    Playing(GameLoop),
}

pub struct Session<S: KeyValueStore, A: AudioSink> {
    screen: Screen,
    scores: ScoreBoard<S>,
    audio: A,
    settings: Settings,
    compositor: Compositor,
    accumulator: f32,
}

impl<S: KeyValueStore, A: AudioSink> Session<S, A> {
    pub fn new(width: f32, height: f32, store: S, mut audio: A) -> Self {
        let settings = Settings::load(&store);
        audio.apply_settings(&settings);

        Self {
            screen: Screen::Splash { last_score: None },
            scores: ScoreBoard::new(store),
            audio,
            settings,
            compositor: Compositor::new(width, height),
            accumulator: 0.0,
        }
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn is_playing(&self) -> bool {
        matches!(self.screen, Screen::Playing(_))
    }

    /// The active run, if any
    pub fn run(&self) -> Option<&GameLoop> {
        match &self.screen {
            Screen::Playing(run) => Some(run),
            Screen::Splash { .. } => None,
        }
    }

    pub fn last_score(&self) -> Option<u64> {
        match self.screen {
            Screen::Splash { last_score } => last_score,
            Screen::Playing(_) => None,
        }
    }

    pub fn compositor(&self) -> &Compositor {
        &self.compositor
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    /// Replace the preferences, apply them and persist them
    pub fn set_settings(&mut self, settings: Settings) {
        self.audio.apply_settings(&settings);
        settings.save(self.scores.store_mut());
        self.settings = settings;
    }

    pub fn high_scores(&self) -> HighScores {
        self.scores.get()
    }

    /// Leaderboard lines for the splash screen
    pub fn splash_lines(&self, now_ms: f64) -> Vec<String> {
        self.scores.get().display_lines(now_ms)
    }

    /// Leave the splash screen. Ignored while a run is active.
    pub fn start_run(&mut self) -> bool {
        if self.is_playing() {
            log::debug!("Run already active, ignoring start");
            return false;
        }
        self.accumulator = 0.0;
        self.screen = Screen::Playing(GameLoop::new());
        true
    }

    /// Pointer press not claimed by the controls. Tapping the monitor on the
    /// splash screen starts a run.
    pub fn tap(&mut self, screen: Vec2) -> bool {
        let Some(world) = self.compositor.screen_to_world(screen) else {
            return false;
        };
        if self.is_playing() {
            return false;
        }
        log::debug!("Monitor tapped at world {:?}", world);
        self.start_run()
    }

    pub fn resize(&mut self, width: f32, height: f32) -> bool {
        self.compositor.resize(width, height)
    }

    /// Advance by one display frame. Returns the simulation events it produced.
    ///
    /// On the splash screen a fire press starts a run.
    pub fn update(&mut self, frame_dt: f32, input: &mut dyn InputSource) -> Vec<GameEvent> {
        if !self.is_playing() {
            if input.snapshot().fire {
                self.start_run();
            }
            return Vec::new();
        }
        let Screen::Playing(run) = &mut self.screen else {
            return Vec::new();
        };

        let dt = if frame_dt.is_finite() {
            frame_dt.clamp(0.0, MAX_FRAME_DT)
        } else {
            0.0
        };
        self.accumulator += dt;

        let mut events = Vec::new();
        let mut completed = None;
        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            let tick_input = input.snapshot();
            for event in run.tick(&tick_input, SIM_DT) {
                match event {
                    GameEvent::Fired { .. } => self.audio.play(SoundEvent::Fired),
                    GameEvent::GameOver { .. } => self.audio.play(SoundEvent::RunEnded),
                    GameEvent::RunComplete { final_score } => completed = Some(final_score),
                    _ => {}
                }
                events.push(event);
            }
            self.accumulator -= SIM_DT;
            substeps += 1;

            if completed.is_some() {
                break;
            }
        }

        if let Some(score) = completed {
            self.finish_run(score);
        }
        events
    }

    fn finish_run(&mut self, score: u64) {
        // Dropping the run tears it down
        self.screen = Screen::Splash {
            last_score: Some(score),
        };
        self.accumulator = 0.0;

        match self.scores.add(score, crate::platform::now_ms()) {
            Some(rank) => log::info!("Score {} ranked #{}", score, rank),
            None => log::info!("Score {} did not rank", score),
        }
    }
}
