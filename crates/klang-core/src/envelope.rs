//! Linear ADSR envelope generator.
//!
//! Stage durations are in milliseconds and tracked with a per-stage sample
//! counter, so level is an exact linear function of elapsed time within a
//! stage. Output is always clamped to [0, 1].
//!
//! One deliberate quirk, kept for compatibility with the sound of the
//! original voicing: in the Idle state the envelope outputs level 1.0, i.e.
//! it passes signal through rather than muting it. An un-triggered envelope
//! therefore does not silence a voice; [`AdsrEnvelope::is_playing`] is still
//! `false` in Idle, so voice allocation treats the voice as free.

/// ADSR envelope states.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EnvelopeState {
    /// Envelope is inactive; output level is 1.0 (pass-through, see module docs).
    #[default]
    Idle,
    /// Level ramps linearly from 0 to 1.
    Attack,
    /// Level ramps linearly from 1 toward the sustain level.
    Decay,
    /// Level holds at the sustain level while the key is held.
    Sustain,
    /// Level ramps linearly from the captured level to 0.
    Release,
}

/// Linear ADSR envelope.
///
/// # Example
///
/// ```rust
/// use klang_core::{AdsrEnvelope, EnvelopeState};
///
/// let mut env = AdsrEnvelope::new(48000.0);
/// env.set_attack_ms(10.0);
/// env.set_decay_ms(100.0);
/// env.set_sustain(0.7);
/// env.set_release_ms(200.0);
///
/// env.trigger();
/// let shaped = env.process(0.25);
/// assert!(shaped <= 0.25);
///
/// env.release();
/// assert_eq!(env.state(), EnvelopeState::Release);
/// ```
#[derive(Debug, Clone)]
pub struct AdsrEnvelope {
    state: EnvelopeState,
    sample_rate: f32,
    attack_ms: f32,
    decay_ms: f32,
    sustain: f32,
    release_ms: f32,
    /// Samples elapsed since the current state was entered.
    count: u32,
    /// Last computed level, clamped to [0, 1].
    level: f32,
    /// Level captured when Release was entered; the release ramp starts here.
    release_from: f32,
}

impl AdsrEnvelope {
    /// Create an envelope with default settings (attack 10ms, decay 100ms,
    /// sustain 0.7, release 200ms).
    pub fn new(sample_rate: f32) -> Self {
        Self {
            state: EnvelopeState::Idle,
            sample_rate,
            attack_ms: 10.0,
            decay_ms: 100.0,
            sustain: 0.7,
            release_ms: 200.0,
            count: 0,
            level: 1.0,
            release_from: 1.0,
        }
    }

    /// Set attack time in milliseconds. Zero means the attack completes
    /// immediately.
    pub fn set_attack_ms(&mut self, ms: f32) {
        self.attack_ms = ms.max(0.0);
    }

    /// Attack time in milliseconds.
    pub fn attack_ms(&self) -> f32 {
        self.attack_ms
    }

    /// Set decay time in milliseconds.
    pub fn set_decay_ms(&mut self, ms: f32) {
        self.decay_ms = ms.max(0.0);
    }

    /// Decay time in milliseconds.
    pub fn decay_ms(&self) -> f32 {
        self.decay_ms
    }

    /// Set sustain level (clamped to 0.0..=1.0).
    pub fn set_sustain(&mut self, level: f32) {
        self.sustain = level.clamp(0.0, 1.0);
    }

    /// Sustain level.
    pub fn sustain(&self) -> f32 {
        self.sustain
    }

    /// Set release time in milliseconds.
    pub fn set_release_ms(&mut self, ms: f32) {
        self.release_ms = ms.max(0.0);
    }

    /// Release time in milliseconds.
    pub fn release_ms(&self) -> f32 {
        self.release_ms
    }

    /// Start the envelope: enter Attack and reset the stage counter.
    pub fn trigger(&mut self) {
        self.state = EnvelopeState::Attack;
        self.count = 0;
    }

    /// Release the envelope: enter Release, ramping down from the current
    /// level.
    pub fn release(&mut self) {
        self.release_from = self.level;
        self.state = EnvelopeState::Release;
        self.count = 0;
    }

    /// Current state.
    pub fn state(&self) -> EnvelopeState {
        self.state
    }

    /// Last computed level without advancing.
    pub fn level(&self) -> f32 {
        self.level
    }

    /// Whether the envelope is still shaping a note (any state but Idle).
    pub fn is_playing(&self) -> bool {
        self.state != EnvelopeState::Idle
    }

    /// Advance one sample and return `input` scaled by the current level.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        self.count = self.count.saturating_add(1);
        let elapsed_ms = self.count as f32 * 1000.0 / self.sample_rate;

        let level = match self.state {
            EnvelopeState::Idle => 1.0,

            EnvelopeState::Attack => {
                let out = if self.attack_ms <= 0.0 {
                    1.0
                } else {
                    elapsed_ms / self.attack_ms
                };
                if elapsed_ms >= self.attack_ms {
                    self.enter(EnvelopeState::Decay);
                }
                out
            }

            EnvelopeState::Decay => {
                let out = if self.decay_ms <= 0.0 {
                    self.sustain
                } else {
                    1.0 - (1.0 - self.sustain) * (elapsed_ms / self.decay_ms)
                };
                if elapsed_ms >= self.decay_ms {
                    self.enter(EnvelopeState::Sustain);
                }
                out
            }

            EnvelopeState::Sustain => self.sustain,

            EnvelopeState::Release => {
                let out = if self.release_ms <= 0.0 {
                    0.0
                } else {
                    self.release_from * (1.0 - elapsed_ms / self.release_ms)
                };
                if elapsed_ms >= self.release_ms {
                    self.enter(EnvelopeState::Idle);
                }
                out
            }
        };

        self.level = level.clamp(0.0, 1.0);
        input * self.level
    }

    fn enter(&mut self, state: EnvelopeState) {
        self.state = state;
        self.count = 0;
    }
}
