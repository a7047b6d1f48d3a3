//! A single synthesizer voice: oscillator, filter, envelope amplifier.
//!
//! The oscillator is a 16:16 fixed-point phase accumulator over the shared
//! [`WavetableBank`]; it supports an auto-glide portamento that is armed
//! when a sounding voice is re-targeted to a different note. The filter is
//! a per-voice [`Biquad`] (passthrough unless configured). The amplifier is
//! the ADSR envelope scaled by a fixed 0.5 headroom factor so summed voices
//! do not clip naively.

use klang_core::{AdsrEnvelope, Biquad, Waveform, WavetableBank, note_to_freq};

/// Fixed headroom applied after the envelope so multiple voices can be
/// summed without immediate clipping.
const VOICE_HEADROOM: f32 = 0.5;

/// Wavetable oscillator with fixed-point phase and note-domain portamento.
///
/// Glide runs in note-number space (constant musical rate regardless of
/// register): the current fractional note steps toward the target each
/// sample, and frequency plus phase increment are recomputed from it.
#[derive(Debug, Clone)]
struct Vco {
    waveform: Waveform,
    phase: u32,
    increment: u32,
    /// Currently sounding frequency in Hz.
    freq: f32,
    /// Current (possibly gliding, fractional) note number.
    note: f32,
    target_note: f32,
    detune_cents: f32,
    /// Glide rate in notes per second; 0 disables portamento.
    glide_rate: f32,
    gliding: bool,
}

impl Vco {
    fn new() -> Self {
        Self {
            waveform: Waveform::Sine,
            phase: 0,
            increment: 0,
            freq: 0.0,
            note: 0.0,
            target_note: 0.0,
            detune_cents: 0.0,
            glide_rate: 0.0,
            gliding: false,
        }
    }

    /// Point the oscillator at a note.
    ///
    /// Glide is armed only when the note actually changes, a nonzero glide
    /// rate is configured, and the voice is being re-targeted while it
    /// already sounds (`was_key_on`); otherwise the pitch snaps.
    fn set_note(&mut self, note: u8, was_key_on: bool, bank: &WavetableBank) {
        let target = f32::from(note);
        self.target_note = target;
        let glide = was_key_on && self.glide_rate != 0.0 && (target - self.note).abs() > f32::EPSILON;
        if !glide {
            self.note = target;
        }
        self.gliding = glide;
        self.retune(bank);
    }

    fn set_waveform(&mut self, waveform: Waveform) {
        self.waveform = waveform;
    }

    fn set_detune_cents(&mut self, cents: f32, bank: &WavetableBank) {
        self.detune_cents = cents;
        self.retune(bank);
    }

    fn set_glide_rate(&mut self, notes_per_second: f32) {
        self.glide_rate = notes_per_second.max(0.0);
    }

    /// Advance one sample: step the glide if armed, look up the sample,
    /// accumulate phase.
    #[inline]
    fn advance(&mut self, bank: &WavetableBank) -> f32 {
        if self.gliding {
            let step = self.glide_rate / bank.sample_rate();
            if (self.target_note - self.note).abs() <= step {
                self.note = self.target_note;
                self.gliding = false;
            } else if self.target_note > self.note {
                self.note += step;
            } else {
                self.note -= step;
            }
            self.retune(bank);
        }
        let out = bank.sample(self.waveform, self.freq, self.phase);
        self.phase = self.phase.wrapping_add(self.increment);
        out
    }

    fn retune(&mut self, bank: &WavetableBank) {
        self.freq = note_to_freq(self.note + self.detune_cents / 100.0, bank.tuning_hz());
        // Note-derived frequencies are always positive; the fallible
        // variant exists for raw frequency input.
        self.increment = match bank.phase_increment_for_freq(self.freq) {
            Ok(step) => step,
            Err(_) => 0,
        };
    }
}

/// One polyphonic slot: VCO through VCF through envelope VCA.
///
/// Constructed once as part of the controller's fixed pool and reused for
/// the lifetime of the engine; [`Voice::trigger`] resets what a fresh note
/// needs.
#[derive(Debug, Clone)]
pub struct Voice {
    vco: Vco,
    vcf: Biquad,
    env: AdsrEnvelope,
    note: u8,
    velocity: u8,
    key_on: bool,
}

impl Voice {
    /// Create an idle voice for the given sample rate.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            vco: Vco::new(),
            vcf: Biquad::new(sample_rate),
            env: AdsrEnvelope::new(sample_rate),
            note: 0,
            velocity: 0,
            key_on: false,
        }
    }

    /// Assign note identity and velocity, arming portamento when this is a
    /// re-target of an already-sounding voice. Call before [`Self::trigger`]
    /// so the previous key-on state decides glide-vs-snap.
    pub fn set_note(&mut self, note: u8, velocity: u8, bank: &WavetableBank) {
        self.vco.set_note(note, self.key_on, bank);
        self.note = note;
        self.velocity = velocity;
    }

    /// Arm the envelope and mark the voice key-on.
    pub fn trigger(&mut self) {
        self.env.trigger();
        self.key_on = true;
    }

    /// Send the envelope to Release and clear key-on.
    pub fn release(&mut self) {
        self.env.release();
        self.key_on = false;
    }

    /// Advance one sample: oscillator, filter, envelope amplifier with
    /// headroom.
    #[inline]
    pub fn calc(&mut self, bank: &WavetableBank) -> f32 {
        let osc = self.vco.advance(bank);
        let filtered = self.vcf.process(osc);
        self.env.process(filtered) * VOICE_HEADROOM
    }

    /// Whether the envelope is still shaping sound (including release tail).
    pub fn is_playing(&self) -> bool {
        self.env.is_playing()
    }

    /// Whether the key driving this voice is still down.
    pub fn is_key_on(&self) -> bool {
        self.key_on
    }

    /// Current note number.
    pub fn note(&self) -> u8 {
        self.note
    }

    /// Current velocity.
    pub fn velocity(&self) -> u8 {
        self.velocity
    }

    /// Set the oscillator waveform.
    pub fn set_waveform(&mut self, waveform: Waveform) {
        self.vco.set_waveform(waveform);
    }

    /// Set the oscillator detune in cents (used for unison spread).
    pub fn set_detune_cents(&mut self, cents: f32, bank: &WavetableBank) {
        self.vco.set_detune_cents(cents, bank);
    }

    /// Set the portamento glide rate in notes per second (0 disables).
    pub fn set_glide_rate(&mut self, notes_per_second: f32) {
        self.vco.set_glide_rate(notes_per_second);
    }

    /// Mutable access to the filter stage for configuration.
    pub fn filter_mut(&mut self) -> &mut Biquad {
        &mut self.vcf
    }

    /// Mutable access to the amplitude envelope for configuration.
    pub fn envelope_mut(&mut self) -> &mut AdsrEnvelope {
        &mut self.env
    }

    /// Read access to the amplitude envelope.
    pub fn envelope(&self) -> &AdsrEnvelope {
        &self.env
    }
}
