//! Polyphonic voice controller.
//!
//! Owns the fixed voice pool and the wavetable bank, and reconciles the
//! externally maintained [`KeyState`] into voice triggers and releases once
//! per audio callback. Allocation policy:
//!
//! - **Poly**: release pass over the active list, then a trigger pass over
//!   the newly pressed keys (newest first, capped by the poly limit), with
//!   duplicate-note release, a wrapping scan for the next free voice, and
//!   oldest-first stealing when the pool is exhausted.
//! - **Mono**: the most recent held key drives voice 0 (plus unison
//!   partners); a new key always re-articulates the envelope.
//! - **Legato**: like Mono, but a new key re-articulates only if the voice
//!   is not already sounding; otherwise the pitch glides over the held
//!   envelope.
//!
//! The active list is insertion-ordered (oldest at the front) and tracks
//! key-on voices only; a released voice keeps sounding through its release
//! tail but is immediately eligible for reallocation.

use klang_core::{Waveform, WavetableBank};

use crate::keys::KeyState;
use crate::voice::Voice;

/// Voice allocation modes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PlayMode {
    /// Independent voices per key, up to the poly cap.
    #[default]
    Poly,
    /// Single voice group, every new key re-triggers the envelope.
    Mono,
    /// Single voice group, new keys glide without re-triggering while the
    /// voice already sounds.
    Legato,
}

/// Fixed-pool voice controller.
///
/// `N` is the pool size, fixed at compile time. The poly cap limits how
/// many keys may trigger per reconciliation; the unison count is how many
/// voices each key fans out to, spread symmetrically in cents.
///
/// # Example
///
/// ```rust
/// use klang_core::WavetableBank;
/// use klang_synth::{KeyState, VoiceController};
///
/// let bank = WavetableBank::new(440.0, 48000.0).unwrap();
/// let mut ctrl: VoiceController<8> = VoiceController::new(bank);
/// let mut keys = KeyState::new();
///
/// keys.note_on(60, 100);
/// ctrl.reconcile(&keys);
/// keys.clear_changed();
///
/// let sample = ctrl.render();
/// ```
#[derive(Debug)]
pub struct VoiceController<const N: usize> {
    bank: WavetableBank,
    voices: [Voice; N],
    /// Active (key-on) voice indices, insertion order, oldest first.
    on_order: [usize; N],
    on_len: usize,
    mode: PlayMode,
    poly_cap: usize,
    unison: usize,
    unison_spread_cents: f32,
    /// Wrap-scan start for the next allocation.
    next_idx: usize,
    /// Velocity cache for mono/legato note hand-backs.
    mono_velocity: u8,
}

impl<const N: usize> VoiceController<N> {
    /// Create a controller owning the given bank, all voices idle.
    pub fn new(bank: WavetableBank) -> Self {
        let sample_rate = bank.sample_rate();
        Self {
            bank,
            voices: core::array::from_fn(|_| Voice::new(sample_rate)),
            on_order: [0; N],
            on_len: 0,
            mode: PlayMode::Poly,
            poly_cap: N,
            unison: 1,
            unison_spread_cents: 0.0,
            next_idx: 0,
            mono_velocity: 0,
        }
    }

    /// Set the play mode.
    pub fn set_mode(&mut self, mode: PlayMode) {
        self.mode = mode;
    }

    /// Current play mode.
    pub fn mode(&self) -> PlayMode {
        self.mode
    }

    /// Set the maximum number of keys triggered per reconciliation
    /// (clamped to 1..=N).
    pub fn set_poly_cap(&mut self, cap: usize) {
        self.poly_cap = cap.clamp(1, N);
    }

    /// Set the number of voices triggered per key (clamped to 1..=N).
    pub fn set_unison(&mut self, count: usize) {
        self.unison = count.clamp(1, N);
    }

    /// Set the unison detune spread in cents, distributed symmetrically.
    pub fn set_unison_spread(&mut self, cents: f32) {
        self.unison_spread_cents = cents.max(0.0);
    }

    /// Set the waveform on every voice.
    pub fn set_waveform(&mut self, waveform: Waveform) {
        for voice in &mut self.voices {
            voice.set_waveform(waveform);
        }
    }

    /// Set the portamento glide rate on every voice (notes per second,
    /// 0 disables).
    pub fn set_glide_rate(&mut self, notes_per_second: f32) {
        for voice in &mut self.voices {
            voice.set_glide_rate(notes_per_second);
        }
    }

    /// Configure the ADSR on every voice.
    pub fn set_envelope(&mut self, attack_ms: f32, decay_ms: f32, sustain: f32, release_ms: f32) {
        for voice in &mut self.voices {
            let env = voice.envelope_mut();
            env.set_attack_ms(attack_ms);
            env.set_decay_ms(decay_ms);
            env.set_sustain(sustain);
            env.set_release_ms(release_ms);
        }
    }

    /// The wavetable bank this controller renders from.
    pub fn bank(&self) -> &WavetableBank {
        &self.bank
    }

    /// Read access to the voice pool.
    pub fn voices(&self) -> &[Voice; N] {
        &self.voices
    }

    /// Mutable access to the voice pool for parameter configuration.
    pub fn voices_mut(&mut self) -> &mut [Voice; N] {
        &mut self.voices
    }

    /// Number of key-on voices (length of the active list).
    pub fn active_count(&self) -> usize {
        self.on_len
    }

    /// Reconcile key state into triggers and releases. Call once per audio
    /// callback, before rendering the frames of that callback.
    pub fn reconcile(&mut self, keys: &KeyState) {
        match self.mode {
            PlayMode::Poly => self.reconcile_poly(keys),
            PlayMode::Mono => self.reconcile_mono(keys, false),
            PlayMode::Legato => self.reconcile_mono(keys, true),
        }
    }

    /// Sum one sample over every voice still shaping sound (including
    /// release tails).
    #[inline]
    pub fn render(&mut self) -> f32 {
        let bank = &self.bank;
        let mut out = 0.0;
        for voice in &mut self.voices {
            if voice.is_playing() {
                out += voice.calc(bank);
            }
        }
        out
    }

    fn reconcile_poly(&mut self, keys: &KeyState) {
        // Release pass: drop every active voice whose key is gone.
        let mut i = 0;
        while i < self.on_len {
            let idx = self.on_order[i];
            if keys.velocity(self.voices[idx].note()) == 0 {
                self.voices[idx].release();
                self.remove_on_at(i);
            } else {
                i += 1;
            }
        }

        // Trigger pass: newly pressed keys, newest first, up to the cap.
        let budget = self.poly_cap.min(keys.held_count());
        for k in 0..budget {
            let Some(note) = keys.new_note(k) else {
                break;
            };
            let velocity = keys.velocity(note);
            self.release_duplicates(note);

            // The active list is bounded by the poly cap (in voice-group
            // terms): make room by releasing the oldest group member.
            let max_active = (self.poly_cap * self.unison).min(N);
            for member in 0..self.unison {
                if self.on_len >= max_active {
                    let oldest = self.on_order[0];
                    self.voices[oldest].release();
                    self.remove_on_at(0);
                }
                let Some(idx) = self.allocate() else {
                    // Pool exhausted mid-fanout: later members stay silent
                    // rather than erroring.
                    break;
                };
                let detune = self.unison_detune(member);
                let bank = &self.bank;
                let voice = &mut self.voices[idx];
                voice.set_detune_cents(detune, bank);
                voice.set_note(note, velocity, bank);
                voice.trigger();
                self.push_on(idx);
            }
        }
    }

    fn reconcile_mono(&mut self, keys: &KeyState, legato: bool) {
        if keys.held_count() == 0 {
            while self.on_len > 0 {
                let idx = self.on_order[0];
                self.voices[idx].release();
                self.remove_on_at(0);
            }
            self.mono_velocity = 0;
            return;
        }

        // The most recent held key drives the voice group.
        let Some(note) = keys.held_note(0) else {
            return;
        };
        let is_new = keys.new_note(0) == Some(note);
        // The cached velocity belongs to the last new press; a hand-back to
        // an older key keeps sounding at that velocity rather than adopting
        // the revealed key's stored one.
        if is_new {
            self.mono_velocity = keys.velocity(note);
        }
        let velocity = self.mono_velocity;

        // Mono re-articulates on every new key and on a hand-back to a
        // different note; Legato re-articulates only when the voice is not
        // already sounding, gliding otherwise.
        let retrigger = if legato {
            is_new && !self.voices[0].is_key_on()
        } else {
            is_new || self.voices[0].note() != note
        };

        for member in 0..self.unison.min(N) {
            let already_on = self.voices[member].is_key_on();
            if !is_new && already_on && self.voices[member].note() == note {
                continue;
            }
            let detune = self.unison_detune(member);
            let bank = &self.bank;
            let voice = &mut self.voices[member];
            voice.set_detune_cents(detune, bank);
            voice.set_note(note, velocity, bank);
            if retrigger || !already_on {
                voice.trigger();
            }
            if !already_on {
                self.push_on(member);
            }
        }
    }

    /// Release every active voice already sounding `note` (prevents one
    /// key from sounding twice under rapid re-trigger).
    fn release_duplicates(&mut self, note: u8) {
        let mut i = 0;
        while i < self.on_len {
            let idx = self.on_order[i];
            if self.voices[idx].note() == note && self.voices[idx].is_key_on() {
                self.voices[idx].release();
                self.remove_on_at(i);
            } else {
                i += 1;
            }
        }
    }

    /// Next voice for a trigger: scan forward from the last allocation for
    /// a voice that is not key-on, wrapping; if every voice is key-on,
    /// steal the oldest active entry.
    fn allocate(&mut self) -> Option<usize> {
        for step in 0..N {
            let idx = (self.next_idx + step) % N;
            if !self.voices[idx].is_key_on() {
                self.next_idx = (idx + 1) % N;
                return Some(idx);
            }
        }
        if self.on_len == 0 {
            return None;
        }
        let idx = self.on_order[0];
        self.voices[idx].release();
        self.remove_on_at(0);
        Some(idx)
    }

    fn unison_detune(&self, member: usize) -> f32 {
        if self.unison <= 1 {
            return 0.0;
        }
        let t = 2.0 * member as f32 / (self.unison - 1) as f32 - 1.0;
        self.unison_spread_cents * t
    }

    fn push_on(&mut self, idx: usize) {
        if self.on_order[..self.on_len].contains(&idx) {
            return;
        }
        self.on_order[self.on_len] = idx;
        self.on_len += 1;
    }

    fn remove_on_at(&mut self, pos: usize) {
        self.on_order.copy_within(pos + 1..self.on_len, pos);
        self.on_len -= 1;
    }
}
