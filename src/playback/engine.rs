// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::sync::Arc;

use super::position::{Direction, PlaybackState};
use crate::config::EngineSettings;
use crate::modes::{LoopMode, ModeSelector, TriggerMode, NUM_LOOP_MODES};
use crate::samples::SampleStore;
use crate::trigger::{GateDetector, SchmittTrigger};

/// Everything the host feeds the engine for one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TickInputs {
    /// Trigger signal, or `None` when nothing is patched in.
    pub trigger: Option<f32>,
    /// Pitch knob, nominally [0, 1].
    pub pitch_knob: f32,
    /// Pitch CV in volts per octave, or `None` when unpatched.
    pub pitch_cv: Option<f32>,
    /// Trigger mode switch. Above zero selects gate mode.
    pub trigger_mode: f32,
    /// Mode select button. A rising edge advances the loop mode.
    pub mode_select: f32,
}

/// Everything the engine reports back to the host for one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TickOutputs {
    pub audio: f32,
    /// 1.0 while playing, 0.0 otherwise.
    pub playing: f32,
    /// One-hot loop mode indicators.
    pub mode_lights: [f32; NUM_LOOP_MODES],
}

/// Playback rate in frames per tick. A patched CV sets the base rate as
/// 2^cv; the knob adds a linear offset on top.
#[inline]
pub fn playback_rate(pitch_knob: f32, pitch_cv: Option<f32>, knob_divisor: f32) -> f64 {
    let base = match pitch_cv {
        Some(cv) => 2f64.powf(f64::from(cv)),
        None => 1.0,
    };
    base + f64::from(pitch_knob) / f64::from(knob_divisor)
}

/// Turns host inputs into one output sample per tick.
///
/// The engine owns the playback cursor and edge detectors. The sample buffer
/// and loop mode are shared with the control path, which may swap the buffer
/// or change the mode at any time. `tick` never blocks, allocates or logs.
pub struct Engine {
    store: Arc<SampleStore>,
    modes: Arc<ModeSelector>,
    state: PlaybackState,
    trigger: GateDetector,
    mode_button: SchmittTrigger,
    /// The mode selection generation last applied to the cursor.
    applied_generation: u32,
    output_gain: f32,
    knob_divisor: f32,
}

impl Engine {
    pub fn new(store: Arc<SampleStore>, modes: Arc<ModeSelector>, settings: &EngineSettings) -> Engine {
        let (_, applied_generation) = modes.snapshot();
        Engine {
            store,
            modes,
            state: PlaybackState::default(),
            trigger: GateDetector::new(settings.trigger_high(), settings.trigger_low()),
            mode_button: SchmittTrigger::new(settings.trigger_high(), settings.trigger_low()),
            applied_generation,
            output_gain: settings.output_gain(),
            knob_divisor: settings.pitch_knob_divisor(),
        }
    }

    /// Processes a single tick.
    pub fn tick(&mut self, inputs: &TickInputs) -> TickOutputs {
        if self.mode_button.process(inputs.mode_select) {
            self.modes.advance();
        }
        let mode = self.sync_mode();

        if let Some(trigger) = inputs.trigger {
            let edges = self.trigger.process(trigger);
            if edges.rising {
                self.state.start();
            }
            if edges.falling && TriggerMode::from_switch(inputs.trigger_mode) == TriggerMode::Gate {
                self.state.stop();
            }
        }

        let audio = if !self.store.is_loading() && self.state.playing {
            let rate = playback_rate(inputs.pitch_knob, inputs.pitch_cv, self.knob_divisor);
            let buffer = self.store.snapshot();
            let frame_count = buffer.frame_count();
            let sample = buffer.frame_at(self.state.read_index(frame_count));
            self.state.advance(mode, rate, frame_count);
            sample * self.output_gain
        } else {
            self.state.stop();
            0.0
        };

        TickOutputs {
            audio,
            playing: if self.state.playing { 1.0 } else { 0.0 },
            mode_lights: mode.lights(),
        }
    }

    /// Processes a block of ticks. Stops at the shorter of the two slices.
    pub fn process_block(&mut self, inputs: &[TickInputs], outputs: &mut [TickOutputs]) {
        for (input, output) in inputs.iter().zip(outputs.iter_mut()) {
            *output = self.tick(input);
        }
    }

    /// Picks up mode selections from either path. Every selection, even of
    /// the mode already playing, restarts ping-pong travel forward.
    #[inline]
    fn sync_mode(&mut self) -> LoopMode {
        let (mode, generation) = self.modes.snapshot();
        if generation != self.applied_generation {
            self.applied_generation = generation;
            self.state.direction = Direction::Forward;
        }
        mode
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state.playing
    }

    pub fn loop_mode(&self) -> LoopMode {
        self.modes.get()
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("store", &self.store)
            .field("mode", &self.modes.get())
            .field("state", &self.state)
            .field("output_gain", &self.output_gain)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::mpsc::{self, Receiver, Sender};
    use std::sync::Mutex;
    use std::thread;

    use super::*;
    use crate::samples::{DecodedSample, LoadError, SampleBuffer, SampleDecoder, SampleLoader};
    use crate::testutil::write_tone;

    /// A decoder that reports when decoding starts and then waits to be
    /// released, so a test can observe the store mid-load.
    struct HeldDecoder {
        started: Mutex<Sender<()>>,
        release: Mutex<Receiver<()>>,
    }

    impl SampleDecoder for HeldDecoder {
        fn decode(&self, _path: &Path) -> Result<DecodedSample, LoadError> {
            self.started.lock().unwrap().send(()).unwrap();
            self.release.lock().unwrap().recv().unwrap();
            Ok(DecodedSample {
                samples: vec![0.5; 8],
                channels: 1,
                sample_rate: 44100,
            })
        }
    }

    fn engine_with(frames: Vec<f32>, mode: LoopMode) -> (Engine, Arc<SampleStore>, Arc<ModeSelector>) {
        let store = Arc::new(SampleStore::default());
        store.replace(SampleBuffer::new(frames, 44100, 1, "test"));
        let modes = Arc::new(ModeSelector::new(mode));
        let engine = Engine::new(store.clone(), modes.clone(), &EngineSettings::default());
        (engine, store, modes)
    }

    fn trigger(value: f32) -> TickInputs {
        TickInputs {
            trigger: Some(value),
            ..Default::default()
        }
    }

    #[test]
    fn test_playback_rate() {
        assert_eq!(playback_rate(0.0, None, 3.0), 1.0);
        assert_eq!(playback_rate(0.0, Some(0.0), 3.0), 1.0);
        assert_eq!(playback_rate(0.0, Some(1.0), 3.0), 2.0);
        assert_eq!(playback_rate(0.0, Some(-1.0), 3.0), 0.5);
        assert!((playback_rate(1.0, None, 3.0) - 4.0 / 3.0).abs() < 1e-6);
        assert!((playback_rate(0.75, Some(2.0), 3.0) - 4.25).abs() < 1e-6);
    }

    #[test]
    fn test_one_shot_plays_whole_sample_once() {
        let tempdir = tempfile::tempdir().unwrap();
        let path = tempdir.path().join("tone.wav");
        write_tone(path.clone(), 441, 44100).unwrap();

        let store = Arc::new(SampleStore::default());
        store.load(&path).unwrap();
        let modes = Arc::new(ModeSelector::new(LoopMode::Off));
        let mut engine = Engine::new(store, modes, &EngineSettings::default());

        let mut audible = 0;
        let mut last = TickOutputs::default();
        for i in 0..1000 {
            let value = if i < 10 { 10.0 } else { 0.0 };
            last = engine.tick(&trigger(value));
            if last.audio != 0.0 {
                assert_eq!(i, audible, "audio resumed after silence");
                audible += 1;
            }
        }

        assert_eq!(audible, 441);
        assert_eq!(last.audio, 0.0);
        assert_eq!(last.playing, 0.0);
        assert!(!engine.is_playing());
    }

    #[test]
    fn test_output_is_scaled() {
        let (mut engine, _, _) = engine_with(vec![0.5, -0.25], LoopMode::Off);
        assert_eq!(engine.tick(&trigger(1.0)).audio, 2.5);
        assert_eq!(engine.tick(&trigger(1.0)).audio, -1.25);
    }

    #[test]
    fn test_retrigger_restarts() {
        let (mut engine, _, _) = engine_with((1..=10).map(|i| i as f32).collect(), LoopMode::Off);
        engine.tick(&trigger(1.0));
        engine.tick(&trigger(1.0));
        engine.tick(&trigger(0.0));
        assert_eq!(engine.state().position, 3.0);

        // Rising again rewinds to the first frame.
        assert_eq!(engine.tick(&trigger(1.0)).audio, 5.0);
    }

    #[test]
    fn test_gate_mode_stops_on_fall() {
        let (mut engine, _, _) = engine_with(vec![0.5; 100], LoopMode::Loop);
        let gate = |value: f32| TickInputs {
            trigger: Some(value),
            trigger_mode: 1.0,
            ..Default::default()
        };

        for _ in 0..5 {
            assert_eq!(engine.tick(&gate(1.0)).playing, 1.0);
        }
        let output = engine.tick(&gate(0.0));
        assert_eq!(output.audio, 0.0);
        assert_eq!(output.playing, 0.0);
    }

    #[test]
    fn test_one_shot_ignores_fall() {
        let (mut engine, _, _) = engine_with(vec![0.5; 100], LoopMode::Loop);
        engine.tick(&trigger(1.0));
        let output = engine.tick(&trigger(0.0));
        assert_eq!(output.audio, 2.5);
        assert_eq!(output.playing, 1.0);
    }

    #[test]
    fn test_disconnected_trigger_never_starts() {
        let (mut engine, _, _) = engine_with(vec![0.5; 10], LoopMode::Loop);
        let output = engine.tick(&TickInputs::default());
        assert_eq!(output.audio, 0.0);
        assert_eq!(output.playing, 0.0);
    }

    #[test]
    fn test_mode_pulses_cycle() {
        let (mut engine, _, modes) = engine_with(vec![0.5; 10], LoopMode::Off);
        let pulse = |value: f32| TickInputs {
            mode_select: value,
            ..Default::default()
        };

        let mut seen = Vec::new();
        for _ in 0..5 {
            let output = engine.tick(&pulse(1.0));
            seen.push(modes.get());
            assert_eq!(output.mode_lights, modes.get().lights());
            // Holding the button does not advance further.
            engine.tick(&pulse(1.0));
            engine.tick(&pulse(0.0));
        }

        assert_eq!(
            seen,
            vec![
                LoopMode::Loop,
                LoopMode::PingPong,
                LoopMode::CrossfadeLoop,
                LoopMode::Off,
                LoopMode::Loop,
            ]
        );
    }

    #[test]
    fn test_external_mode_change_resets_direction() {
        let (mut engine, _, modes) = engine_with(vec![0.5; 4], LoopMode::PingPong);
        engine.tick(&trigger(1.0));
        for _ in 0..4 {
            engine.tick(&trigger(1.0));
        }
        assert_eq!(engine.state().direction, Direction::Reverse);

        modes.set(LoopMode::Loop);
        engine.tick(&trigger(1.0));
        assert_eq!(engine.state().direction, Direction::Forward);
        assert_eq!(engine.loop_mode(), LoopMode::Loop);
    }

    #[test]
    fn test_empty_store_is_silent() {
        let store = Arc::new(SampleStore::default());
        let modes = Arc::new(ModeSelector::default());
        let mut engine = Engine::new(store, modes, &EngineSettings::default());

        let output = engine.tick(&trigger(1.0));
        assert_eq!(output.audio, 0.0);
        assert_eq!(output.playing, 0.0);
        assert_eq!(output.mode_lights, [1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_swap_mid_playback() {
        let (mut engine, store, _) = engine_with(vec![0.2; 100], LoopMode::Loop);
        engine.tick(&trigger(1.0));
        engine.tick(&trigger(1.0));

        store.replace(SampleBuffer::new(vec![0.4; 3], 44100, 1, "short"));
        for _ in 0..10 {
            let output = engine.tick(&trigger(1.0));
            assert_eq!(output.audio, 2.0);
            assert!(engine.state().position < 3.0);
        }
    }

    #[test]
    fn test_process_block() {
        let (mut engine, _, _) = engine_with(vec![0.1, 0.2, 0.3], LoopMode::Loop);
        let inputs = [trigger(1.0); 4];
        let mut outputs = [TickOutputs::default(); 4];
        engine.process_block(&inputs, &mut outputs);

        let audio: Vec<f32> = outputs.iter().map(|o| o.audio).collect();
        let expected = [0.5, 1.0, 1.5, 0.5];
        for (actual, expected) in audio.iter().zip(expected) {
            assert!((actual - expected).abs() < 1e-6);
        }
    }

    #[test]
    fn test_silent_while_loading() {
        let (started_tx, started_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let decoder = HeldDecoder {
            started: Mutex::new(started_tx),
            release: Mutex::new(release_rx),
        };
        let store = Arc::new(SampleStore::new(SampleLoader::new(Box::new(decoder), None)));
        store.replace(SampleBuffer::new(vec![0.25; 100], 44100, 1, "old"));
        let modes = Arc::new(ModeSelector::new(LoopMode::Loop));
        let mut engine = Engine::new(store.clone(), modes, &EngineSettings::default());

        let output = engine.tick(&trigger(1.0));
        assert_eq!(output.audio, 1.25);
        assert_eq!(output.playing, 1.0);

        let loader_store = store.clone();
        let loader = thread::spawn(move || loader_store.load(Path::new("held.wav")).map(|_| ()));
        started_rx.recv().unwrap();
        assert!(store.is_loading());

        for _ in 0..3 {
            let output = engine.tick(&trigger(1.0));
            assert_eq!(output.audio, 0.0);
            assert_eq!(output.playing, 0.0);
        }

        release_tx.send(()).unwrap();
        loader.join().unwrap().unwrap();
        assert!(!store.is_loading());

        // Playback stays stopped until the next rising edge.
        let output = engine.tick(&trigger(1.0));
        assert_eq!(output.audio, 0.0);
        assert_eq!(output.playing, 0.0);
        engine.tick(&trigger(0.0));

        let output = engine.tick(&trigger(1.0));
        assert_eq!(output.audio, 2.5);
        assert_eq!(output.playing, 1.0);
    }
}
