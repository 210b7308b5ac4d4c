//! Audio: procedurally generated music and sound effects, no external files.
//!
//! The sequencer is portable and testable: it turns an audio-clock reading
//! into a batch of `NoteEvent`s scheduled slightly in the future. Only the
//! wasm backend at the bottom of this file touches Web Audio, rendering each
//! event as a throwaway oscillator + gain envelope.

#[cfg(target_arch = "wasm32")]
use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

use crate::consts::{AUDIO_LOOKAHEAD, AUDIO_RESYNC_SLACK};

/// Oscillator shape for one scheduled note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

/// One note, scheduled against the audio clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoteEvent {
    pub freq: f32,
    pub waveform: Waveform,
    /// Absolute start time on the audio clock (seconds)
    pub start: f64,
    pub duration: f64,
    pub gain: f32,
}

/// Short one-shot sound effects, emitted by the sims as events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SfxCue {
    Jump,
    Flap,
    Score,
    Crash,
    Brick,
    Paddle,
    Wall,
    Shoot,
    EnemyDown,
    Damage,
    Eat,
    LevelClear,
    GameOver,
    Win,
}

// A-minor pentatonic material shared by all six games.
const BASS_LINE: [f32; 4] = [55.0, 55.0, 65.41, 73.42];
const LEAD_SCALE: [f32; 8] = [220.0, 261.63, 293.66, 329.63, 392.0, 440.0, 523.25, 587.33];
const LEAD_PATTERN: [Option<usize>; 16] = [
    Some(0),
    None,
    Some(2),
    None,
    Some(3),
    None,
    Some(4),
    None,
    Some(5),
    None,
    Some(4),
    None,
    Some(3),
    None,
    Some(2),
    None,
];

const STEPS_PER_LOOP: u64 = 16;
const BASE_TEMPO_BPM: f64 = 120.0;

/// Lookahead music scheduler.
///
/// `advance` is called once per animation frame with the *audio* clock's
/// current time, which is the only clock Web Audio honors for scheduling.
/// It emits every note whose start falls inside the lookahead window and
/// moves an absolute-time cursor forward one subdivision at a time, so note
/// spacing depends only on tempo, never on how often the caller shows up.
#[derive(Debug, Clone, Copy)]
pub struct MusicSequencer {
    next_step_time: f64,
    step: u64,
    started: bool,
}

impl MusicSequencer {
    pub fn new() -> Self {
        Self {
            next_step_time: 0.0,
            step: 0,
            started: false,
        }
    }

    /// Restart the pattern; the next `advance` re-anchors to the clock.
    pub fn reset(&mut self) {
        self.started = false;
        self.step = 0;
    }

    /// Tempo rises with the game's difficulty scalar.
    pub fn tempo_bpm(difficulty: f32) -> f64 {
        (BASE_TEMPO_BPM + difficulty as f64 * 5.0).min(200.0)
    }

    /// Schedule all steps due within the lookahead window.
    pub fn advance(&mut self, now: f64, difficulty: f32) -> Vec<NoteEvent> {
        if !self.started {
            self.next_step_time = now;
            self.started = true;
        }
        // After a long stall, resume from now instead of bursting the backlog
        if now - self.next_step_time > AUDIO_RESYNC_SLACK {
            self.next_step_time = now;
        }

        // One step per eighth note
        let subdivision = 60.0 / Self::tempo_bpm(difficulty) / 2.0;
        let mut notes = Vec::new();
        while self.next_step_time < now + AUDIO_LOOKAHEAD {
            self.emit_step(
                (self.step % STEPS_PER_LOOP) as usize,
                self.next_step_time,
                subdivision,
                &mut notes,
            );
            self.step += 1;
            self.next_step_time += subdivision;
        }
        notes
    }

    fn emit_step(&self, step: usize, at: f64, subdivision: f64, out: &mut Vec<NoteEvent>) {
        // Bass on the quarter notes, walking the loop in four beats
        if step % 4 == 0 {
            out.push(NoteEvent {
                freq: BASS_LINE[step / 4],
                waveform: Waveform::Sawtooth,
                start: at,
                duration: subdivision * 1.8,
                gain: 0.12,
            });
        }
        // Lead melody on its pattern slots
        if let Some(idx) = LEAD_PATTERN[step] {
            out.push(NoteEvent {
                freq: LEAD_SCALE[idx],
                waveform: Waveform::Square,
                start: at,
                duration: subdivision * 0.9,
                gain: 0.06,
            });
        }
        // Off-beat hat
        if step % 4 == 2 {
            out.push(NoteEvent {
                freq: 6000.0,
                waveform: Waveform::Triangle,
                start: at,
                duration: 0.03,
                gain: 0.03,
            });
        }
    }
}

impl Default for MusicSequencer {
    fn default() -> Self {
        Self::new()
    }
}

/// Web Audio backend.
#[cfg(target_arch = "wasm32")]
pub struct AudioOutput {
    ctx: Option<AudioContext>,
    music_volume: f32,
    sfx_volume: f32,
    muted: bool,
}

#[cfg(target_arch = "wasm32")]
impl AudioOutput {
    pub fn new() -> Self {
        // May fail outside a secure context
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - audio disabled");
        }
        Self {
            ctx,
            music_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }

    /// Resume the context (required after a user gesture).
    pub fn resume(&self) {
        if let Some(ctx) = &self.ctx {
            let _ = ctx.resume();
        }
    }

    /// Current audio-clock reading, the time domain `NoteEvent.start` uses.
    pub fn current_time(&self) -> f64 {
        self.ctx.as_ref().map(|c| c.current_time()).unwrap_or(0.0)
    }

    pub fn set_music_volume(&mut self, vol: f32) {
        self.music_volume = vol.clamp(0.0, 1.0);
    }

    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Render one sequencer note as an oscillator with a decay envelope.
    /// Fire-and-forget: the nodes free themselves after `stop`.
    pub fn play_note(&self, note: &NoteEvent) {
        let vol = if self.muted { 0.0 } else { self.music_volume };
        if vol <= 0.0 {
            return;
        }
        let Some(ctx) = &self.ctx else { return };
        let Some((osc, gain)) = self.create_osc(ctx, note.freq, waveform_type(note.waveform))
        else {
            return;
        };
        let t = note.start;
        gain.gain().set_value_at_time(vol * note.gain, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.001, t + note.duration)
            .ok();
        osc.start_with_when(t).ok();
        osc.stop_with_when(t + note.duration + 0.05).ok();
    }

    /// Play a one-shot effect cue.
    pub fn play(&self, cue: SfxCue) {
        let vol = if self.muted { 0.0 } else { self.sfx_volume };
        if vol <= 0.0 {
            return;
        }
        let Some(ctx) = &self.ctx else { return };
        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }

        match cue {
            SfxCue::Jump => self.sweep(ctx, vol * 0.3, 300.0, 600.0, 0.1, OscillatorType::Square),
            SfxCue::Flap => self.sweep(ctx, vol * 0.3, 400.0, 700.0, 0.08, OscillatorType::Sine),
            SfxCue::Score => self.chime(ctx, vol, &[600.0, 800.0, 1000.0], 0.06),
            SfxCue::Crash => {
                self.sweep(ctx, vol * 0.5, 120.0, 30.0, 0.4, OscillatorType::Sawtooth)
            }
            SfxCue::Brick => self.sweep(ctx, vol * 0.3, 500.0, 900.0, 0.06, OscillatorType::Square),
            SfxCue::Paddle => self.sweep(ctx, vol * 0.4, 150.0, 60.0, 0.1, OscillatorType::Sine),
            SfxCue::Wall => self.sweep(ctx, vol * 0.25, 400.0, 380.0, 0.06, OscillatorType::Sine),
            SfxCue::Shoot => {
                self.sweep(ctx, vol * 0.25, 900.0, 200.0, 0.08, OscillatorType::Sawtooth)
            }
            SfxCue::EnemyDown => {
                self.sweep(ctx, vol * 0.35, 600.0, 80.0, 0.2, OscillatorType::Square)
            }
            SfxCue::Damage => self.sweep(ctx, vol * 0.4, 200.0, 60.0, 0.15, OscillatorType::Square),
            SfxCue::Eat => self.sweep(ctx, vol * 0.3, 500.0, 800.0, 0.08, OscillatorType::Triangle),
            SfxCue::LevelClear => self.chime(ctx, vol, &[400.0, 500.0, 600.0, 800.0], 0.1),
            SfxCue::GameOver => self.chime(ctx, vol, &[400.0, 350.0, 300.0, 200.0], 0.2),
            SfxCue::Win => self.chime(ctx, vol, &[500.0, 600.0, 700.0, 800.0, 1000.0], 0.08),
        }
    }

    /// Oscillator + gain pair routed to the destination.
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

    /// Frequency sweep with exponential fade-out.
    fn sweep(
        &self,
        ctx: &AudioContext,
        vol: f32,
        from: f32,
        to: f32,
        dur: f64,
        osc_type: OscillatorType,
    ) {
        let Some((osc, gain)) = self.create_osc(ctx, from, osc_type) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(vol, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + dur)
            .ok();
        osc.frequency().set_value_at_time(from, t).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(to.max(1.0), t + dur)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + dur + 0.05).ok();
    }

    /// Staggered sine/triangle tones (pickups, fanfares).
    fn chime(&self, ctx: &AudioContext, vol: f32, freqs: &[f32], gap: f64) {
        for (i, freq) in freqs.iter().enumerate() {
            let delay = i as f64 * gap;
            if let Some((osc, gain)) = self.create_osc(ctx, *freq, OscillatorType::Triangle) {
                let t = ctx.current_time() + delay;
                gain.gain().set_value_at_time(vol * 0.25, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.25)
                    .ok();
                osc.start_with_when(t).ok();
                osc.stop_with_when(t + 0.3).ok();
            }
        }
    }
}

#[cfg(target_arch = "wasm32")]
impl Default for AudioOutput {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(target_arch = "wasm32")]
fn waveform_type(w: Waveform) -> OscillatorType {
    match w {
        Waveform::Sine => OscillatorType::Sine,
        Waveform::Square => OscillatorType::Square,
        Waveform::Sawtooth => OscillatorType::Sawtooth,
        Waveform::Triangle => OscillatorType::Triangle,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notes_never_scheduled_in_the_past() {
        let mut seq = MusicSequencer::new();
        let notes = seq.advance(10.0, 0.0);
        assert!(!notes.is_empty());
        assert!(notes.iter().all(|n| n.start >= 10.0));
    }

    #[test]
    fn step_spacing_matches_subdivision() {
        let mut seq = MusicSequencer::new();
        let subdivision = 60.0 / MusicSequencer::tempo_bpm(0.0) / 2.0;
        let mut starts: Vec<f64> = Vec::new();
        // Irregular call cadence must not disturb the grid
        for now in [0.0, 0.013, 0.051, 0.122, 0.19, 0.31, 0.42] {
            for n in seq.advance(now, 0.0) {
                starts.push(n.start);
            }
        }
        starts.sort_by(|a, b| a.partial_cmp(b).unwrap());
        starts.dedup_by(|a, b| (*a - *b).abs() < 1e-9);
        for pair in starts.windows(2) {
            let gap = pair[1] - pair[0];
            // Gaps are whole multiples of the subdivision (silent steps skip)
            let steps = (gap / subdivision).round();
            assert!(
                (gap - steps * subdivision).abs() < 1e-6,
                "gap {gap} is not on the {subdivision} grid"
            );
        }
    }

    #[test]
    fn stall_resyncs_instead_of_bursting() {
        let mut seq = MusicSequencer::new();
        seq.advance(0.0, 0.0);
        // Tab hidden for ten seconds
        let notes = seq.advance(10.0, 0.0);
        // Only the lookahead window worth of steps, anchored at now
        assert!(notes.iter().all(|n| n.start >= 10.0));
        assert!(notes.iter().all(|n| n.start < 10.0 + AUDIO_LOOKAHEAD));
    }

    #[test]
    fn tempo_rises_with_difficulty_and_caps() {
        assert_eq!(MusicSequencer::tempo_bpm(0.0), 120.0);
        assert_eq!(MusicSequencer::tempo_bpm(4.0), 140.0);
        assert_eq!(MusicSequencer::tempo_bpm(100.0), 200.0);
    }

    #[test]
    fn reset_reanchors_to_the_clock() {
        let mut seq = MusicSequencer::new();
        seq.advance(0.0, 0.0);
        seq.reset();
        let notes = seq.advance(50.0, 0.0);
        assert!(notes.iter().all(|n| n.start >= 50.0));
    }
}
