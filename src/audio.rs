//! Sound effects
//!
//! The game only ever asks for two sounds. On the web they are generated
//! procedurally with the Web Audio API; elsewhere a sink just drops or
//! records them.

use crate::settings::Settings;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundEvent {
    /// Bullet fired
    Fired,
    /// Player touched the hazard
    RunEnded,
}

/// Fire-and-forget sound output
pub trait AudioSink {
    fn play(&mut self, event: SoundEvent);

    /// Pick up volume and mute preferences
    fn apply_settings(&mut self, _settings: &Settings) {}
}

/// Silent sink
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play(&mut self, _event: SoundEvent) {}
}

/// Keeps every requested sound, for headless runs and tests
#[derive(Debug, Clone, Default)]
pub struct RecordingAudio {
    pub played: Vec<SoundEvent>,
}

impl RecordingAudio {
    pub fn count(&self, event: SoundEvent) -> usize {
        self.played.iter().filter(|e| **e == event).count()
    }
}

impl AudioSink for RecordingAudio {
    fn play(&mut self, event: SoundEvent) {
        log::debug!("Sound: {:?}", event);
        self.played.push(event);
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::AudioManager;

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    use super::{AudioSink, SoundEvent};
    use crate::settings::Settings;

    /// Web Audio output
    pub struct AudioManager {
        ctx: Option<AudioContext>,
        volume: f32,
    }

    impl Default for AudioManager {
        fn default() -> Self {
            Self::new()
        }
    }

    impl AudioManager {
        pub fn new() -> Self {
            // Try to create audio context (may fail if not in secure context)
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self {
                ctx,
                volume: Settings::default().effective_volume(),
            }
        }

        /// Resume audio context (required after user gesture)
        pub fn resume(&self) {
            if let Some(ctx) = &self.ctx {
                if ctx.state() == web_sys::AudioContextState::Suspended {
                    let _ = ctx.resume();
                }
            }
        }

        /// Create an oscillator with gain envelope
        fn create_osc(
            &self,
            ctx: &AudioContext,
            freq: f32,
            osc_type: OscillatorType,
        ) -> Option<(OscillatorNode, GainNode)> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;

            osc.set_type(osc_type);
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;

            Some((osc, gain))
        }

        /// Shot - short falling zap
        fn play_shoot(&self, ctx: &AudioContext, vol: f32) {
            let Some((osc, gain)) = self.create_osc(ctx, 900.0, OscillatorType::Square) else {
                return;
            };
            let t = ctx.current_time();

            gain.gain().set_value_at_time(vol * 0.2, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.08)
                .ok();
            osc.frequency().set_value_at_time(900.0, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(250.0, t + 0.08)
                .ok();

            osc.start().ok();
            osc.stop_with_when(t + 0.1).ok();
        }

        /// Boom - low sweep with a crack on top
        fn play_boom(&self, ctx: &AudioContext, vol: f32) {
            let t = ctx.current_time();

            if let Some((osc, gain)) = self.create_osc(ctx, 100.0, OscillatorType::Sawtooth) {
                gain.gain().set_value_at_time(vol * 0.5, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.6)
                    .ok();
                osc.frequency().set_value_at_time(100.0, t).ok();
                osc.frequency()
                    .exponential_ramp_to_value_at_time(25.0, t + 0.6)
                    .ok();
                osc.start().ok();
                osc.stop_with_when(t + 0.7).ok();
            }

            if let Some((osc, gain)) = self.create_osc(ctx, 1500.0, OscillatorType::Square) {
                gain.gain().set_value_at_time(vol * 0.2, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.1)
                    .ok();
                osc.start().ok();
                osc.stop_with_when(t + 0.15).ok();
            }
        }
    }

    impl AudioSink for AudioManager {
        fn play(&mut self, event: SoundEvent) {
            if self.volume <= 0.0 {
                return;
            }
            self.resume();
            let Some(ctx) = &self.ctx else { return };

            match event {
                SoundEvent::Fired => self.play_shoot(ctx, self.volume),
                SoundEvent::RunEnded => self.play_boom(ctx, self.volume),
            }
        }

        fn apply_settings(&mut self, settings: &Settings) {
            self.volume = settings.effective_volume();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_sink() {
        let mut sink = RecordingAudio::default();
        sink.play(SoundEvent::Fired);
        sink.play(SoundEvent::Fired);
        sink.play(SoundEvent::RunEnded);
        assert_eq!(sink.count(SoundEvent::Fired), 2);
        assert_eq!(sink.count(SoundEvent::RunEnded), 1);
    }

    #[test]
    fn test_null_sink_accepts_settings() {
        let mut sink = NullAudio;
        sink.apply_settings(&Settings::default());
        sink.play(SoundEvent::RunEnded);
    }
}
