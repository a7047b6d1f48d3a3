//! Band-limited wavetable bank.
//!
//! Precomputes one-cycle lookup tables for triangle, saw, and square
//! waveforms across frequency bands, plus a single sine table. Each band's
//! table is built by additive synthesis with only the harmonics that fit
//! below Nyquist for that band, so playback through the matching band never
//! aliases.
//!
//! Phase is 16:16 fixed point: the upper bits index the table, the lower 16
//! bits interpolate between adjacent samples. Wraparound is a bit-mask, not
//! a branch.

#[cfg(not(feature = "std"))]
use alloc::{vec, vec::Vec};

use core::f32::consts::TAU;
use libm::{powf, sinf};

use crate::tuning::{freq_to_note, note_detuned_to_freq};

/// Samples per one-cycle wavetable. Power of two so phase wrap is a mask.
pub const TABLE_LEN: usize = 1024;

/// Fractional bits of the fixed-point phase representation.
pub const PHASE_FRAC_BITS: u32 = 16;

const PHASE_FRAC_SCALE: f32 = (1u32 << PHASE_FRAC_BITS) as f32;
const PHASE_FRAC_MASK: u32 = (1u32 << PHASE_FRAC_BITS) - 1;

/// Lowest frequency of the band sweep used to lay out the tables.
const SWEEP_START_HZ: f32 = 30.0;

/// Number of geometric steps in the band sweep.
const SWEEP_STEPS: usize = 90;

/// Waveform kinds the bank can produce.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Waveform {
    /// Pure sine (single table, no banding needed).
    #[default]
    Sine,
    /// Triangle: odd harmonics at 1/n² with alternating sign.
    Triangle,
    /// Sawtooth: all harmonics at 1/n.
    Saw,
    /// Square: odd harmonics at 1/n, built from two half-cycle-shifted saws.
    Square,
}

/// Errors from bank construction and frequency conversion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BankError {
    /// Sample rate was zero, negative, non-finite, or too low for the sweep.
    InvalidSampleRate(f32),
    /// Tuning reference was zero, negative, or non-finite.
    InvalidTuning(f32),
    /// Requested frequency was zero, negative, or non-finite.
    InvalidFrequency(f32),
}

impl core::fmt::Display for BankError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidSampleRate(sr) => write!(f, "invalid sample rate: {sr} Hz"),
            Self::InvalidTuning(hz) => write!(f, "invalid tuning reference: {hz} Hz"),
            Self::InvalidFrequency(hz) => write!(f, "invalid frequency: {hz} Hz"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for BankError {}

/// One frequency band of the bank.
///
/// Entries are ordered by ascending `freq`. A band serves every request at
/// or below its base frequency without aliasing: `harmonics * freq` never
/// exceeds Nyquist.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableInfo {
    /// Base frequency of the band in Hz (`nyquist / harmonics`).
    pub freq: f32,
    /// Equivalent (fractional) MIDI note number of `freq`.
    pub note: f32,
    /// Number of harmonics present in this band's tables.
    pub harmonics: usize,
}

/// Precomputed band-limited wavetables for one sample rate and tuning.
///
/// Built once at startup; lookup is allocation-free and O(1) apart from the
/// linear band scan (at most a few dozen entries).
#[derive(Debug, Clone, PartialEq)]
pub struct WavetableBank {
    sample_rate: f32,
    tuning_hz: f32,
    infos: Vec<TableInfo>,
    sine: Vec<f32>,
    // One TABLE_LEN run per band, in `infos` order.
    triangle: Vec<f32>,
    saw: Vec<f32>,
    square: Vec<f32>,
}

impl WavetableBank {
    /// Build all tables for the given tuning reference and sample rate.
    ///
    /// Sweeps 30 Hz up to Nyquist in 90 geometric steps, collapsing steps
    /// that share a harmonic count into a single band. Fails if either
    /// parameter cannot support the sweep.
    pub fn new(tuning_hz: f32, sample_rate: f32) -> Result<Self, BankError> {
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            return Err(BankError::InvalidSampleRate(sample_rate));
        }
        if !(tuning_hz.is_finite() && tuning_hz > 0.0) {
            return Err(BankError::InvalidTuning(tuning_hz));
        }
        let nyquist = sample_rate / 2.0;
        if SWEEP_START_HZ >= nyquist {
            return Err(BankError::InvalidSampleRate(sample_rate));
        }

        let mut sine = vec![0.0f32; TABLE_LEN];
        for (i, s) in sine.iter_mut().enumerate() {
            *s = sinf(TAU * i as f32 / TABLE_LEN as f32);
        }

        // Geometric sweep collapsed to unique harmonic counts. Harmonic
        // count is monotone non-increasing along the sweep, so skipping
        // repeats of the previous entry keeps frequencies strictly
        // ascending.
        let mut infos: Vec<TableInfo> = Vec::new();
        let ratio = nyquist / SWEEP_START_HZ;
        for step in 0..SWEEP_STEPS {
            let swept = SWEEP_START_HZ * powf(ratio, step as f32 / SWEEP_STEPS as f32);
            let harmonics = (nyquist / swept) as usize;
            if infos.last().is_some_and(|last| last.harmonics == harmonics) {
                continue;
            }
            let freq = nyquist / harmonics as f32;
            infos.push(TableInfo {
                freq,
                note: freq_to_note(freq, tuning_hz),
                harmonics,
            });
        }

        let mut triangle = vec![0.0f32; infos.len() * TABLE_LEN];
        let mut saw = vec![0.0f32; infos.len() * TABLE_LEN];
        let mut square = vec![0.0f32; infos.len() * TABLE_LEN];
        for (band, info) in infos.iter().enumerate() {
            let base = band * TABLE_LEN;
            fill_triangle(&mut triangle[base..base + TABLE_LEN], info.harmonics);
            fill_saw(&mut saw[base..base + TABLE_LEN], info.harmonics);
            fill_square(&mut square[base..base + TABLE_LEN], info.harmonics);
        }

        Ok(Self {
            sample_rate,
            tuning_hz,
            infos,
            sine,
            triangle,
            saw,
            square,
        })
    }

    /// Sample rate the bank was built for.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Tuning reference (A4) in Hz.
    pub fn tuning_hz(&self) -> f32 {
        self.tuning_hz
    }

    /// The frequency bands, ordered by ascending base frequency.
    pub fn table_infos(&self) -> &[TableInfo] {
        &self.infos
    }

    /// Fixed-point phase increment for a MIDI note with a cent detune.
    ///
    /// One full cycle corresponds to `TABLE_LEN << 16` phase units, so the
    /// increment is `TABLE_LEN * 2^16 * freq / sample_rate`.
    pub fn phase_increment(&self, note: u8, detune_cents: f32) -> u32 {
        let freq = note_detuned_to_freq(note, detune_cents, self.tuning_hz);
        (TABLE_LEN as f32 * PHASE_FRAC_SCALE * freq / self.sample_rate) as u32
    }

    /// Fixed-point phase increment for an arbitrary frequency.
    ///
    /// Fails on zero, negative, or non-finite input; note-derived
    /// frequencies are always positive, so [`Self::phase_increment`] is the
    /// infallible variant.
    pub fn phase_increment_for_freq(&self, freq_hz: f32) -> Result<u32, BankError> {
        if !(freq_hz.is_finite() && freq_hz > 0.0) {
            return Err(BankError::InvalidFrequency(freq_hz));
        }
        Ok((TABLE_LEN as f32 * PHASE_FRAC_SCALE * freq_hz / self.sample_rate) as u32)
    }

    /// Look up one interpolated sample.
    ///
    /// Selects the first band whose base frequency covers `freq_hz` (so the
    /// band's harmonics stay below Nyquist) and linearly interpolates at the
    /// fixed-point `phase`. Frequencies above every band fall back to the
    /// sine table: aliasing-free but harmonically dull, the accepted
    /// degradation at the extreme top of the range.
    #[inline]
    pub fn sample(&self, waveform: Waveform, freq_hz: f32, phase: u32) -> f32 {
        let table = match waveform {
            Waveform::Sine => &self.sine[..],
            Waveform::Triangle => self.band_table(&self.triangle, freq_hz),
            Waveform::Saw => self.band_table(&self.saw, freq_hz),
            Waveform::Square => self.band_table(&self.square, freq_hz),
        };
        lookup(table, phase)
    }

    /// Index of the band serving `freq_hz`, if any band covers it.
    pub fn band_for_freq(&self, freq_hz: f32) -> Option<usize> {
        self.infos.iter().position(|info| info.freq >= freq_hz)
    }

    #[inline]
    fn band_table<'a>(&'a self, tables: &'a [f32], freq_hz: f32) -> &'a [f32] {
        match self.band_for_freq(freq_hz) {
            Some(band) => &tables[band * TABLE_LEN..(band + 1) * TABLE_LEN],
            None => &self.sine,
        }
    }
}

/// Linear interpolation at a 16:16 fixed-point phase into a one-cycle table.
#[inline]
fn lookup(table: &[f32], phase: u32) -> f32 {
    let idx = (phase >> PHASE_FRAC_BITS) as usize & (TABLE_LEN - 1);
    let next = (idx + 1) & (TABLE_LEN - 1);
    let frac = (phase & PHASE_FRAC_MASK) as f32 / PHASE_FRAC_SCALE;
    table[idx] + frac * (table[next] - table[idx])
}

fn fill_triangle(table: &mut [f32], harmonics: usize) {
    // Odd harmonics, 1/n² amplitude, alternating sign (n ≡ 1 mod 4 adds,
    // n ≡ 3 mod 4 subtracts), scaled by 8/π².
    let scale = 8.0 / (core::f32::consts::PI * core::f32::consts::PI);
    for (i, out) in table.iter_mut().enumerate() {
        let phase = TAU * i as f32 / TABLE_LEN as f32;
        let mut acc = 0.0f32;
        let mut n = 1usize;
        while n <= harmonics {
            let term = sinf(n as f32 * phase) / (n * n) as f32;
            if n % 4 == 1 {
                acc += term;
            } else {
                acc -= term;
            }
            n += 2;
        }
        *out = scale * acc;
    }
}

fn fill_saw(table: &mut [f32], harmonics: usize) {
    let scale = 2.0 / core::f32::consts::PI;
    for (i, out) in table.iter_mut().enumerate() {
        let phase = TAU * i as f32 / TABLE_LEN as f32;
        let mut acc = 0.0f32;
        for n in 1..=harmonics {
            acc += sinf(n as f32 * phase) / n as f32;
        }
        *out = scale * acc;
    }
}

fn fill_square(table: &mut [f32], harmonics: usize) {
    // Difference of two saws half a cycle apart: even harmonics cancel,
    // odd harmonics double.
    let scale = 1.0 / core::f32::consts::PI;
    for (i, out) in table.iter_mut().enumerate() {
        let phase = TAU * i as f32 / TABLE_LEN as f32;
        let shifted = TAU * (i + TABLE_LEN / 2) as f32 / TABLE_LEN as f32;
        let mut acc = 0.0f32;
        for n in 1..=harmonics {
            acc += (sinf(n as f32 * phase) - sinf(n as f32 * shifted)) / n as f32;
        }
        *out = scale * acc;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bank() -> WavetableBank {
        WavetableBank::new(440.0, 48000.0).unwrap()
    }

    #[test]
    fn test_rejects_bad_parameters() {
        assert_eq!(
            WavetableBank::new(440.0, 0.0),
            Err(BankError::InvalidSampleRate(0.0))
        );
        assert_eq!(
            WavetableBank::new(440.0, -48000.0),
            Err(BankError::InvalidSampleRate(-48000.0))
        );
        assert_eq!(
            WavetableBank::new(0.0, 48000.0),
            Err(BankError::InvalidTuning(0.0))
        );
        assert!(WavetableBank::new(440.0, f32::NAN).is_err());
    }

    #[test]
    fn test_bands_ascend_with_unique_harmonics() {
        let bank = bank();
        let infos = bank.table_infos();
        assert!(!infos.is_empty());
        for pair in infos.windows(2) {
            assert!(
                pair[0].freq < pair[1].freq,
                "band frequencies must ascend: {} then {}",
                pair[0].freq,
                pair[1].freq
            );
            assert!(
                pair[0].harmonics > pair[1].harmonics,
                "harmonic counts must strictly descend"
            );
        }
    }

    #[test]
    fn test_bands_never_alias() {
        let bank = bank();
        let nyquist = 24000.0;
        for info in bank.table_infos() {
            assert!(
                info.harmonics as f32 * info.freq <= nyquist + 1.0,
                "band at {} Hz with {} harmonics exceeds Nyquist",
                info.freq,
                info.harmonics
            );
        }
    }

    #[test]
    fn test_selection_covers_requested_frequency() {
        let bank = bank();
        for freq in [27.5, 100.0, 440.0, 2000.0, 10000.0] {
            let band = bank.band_for_freq(freq).unwrap();
            let info = bank.table_infos()[band];
            assert!(info.freq >= freq);
            // Anti-aliasing contract at the requested frequency.
            assert!(info.harmonics as f32 * freq <= 24000.0 + 1.0);
        }
    }

    #[test]
    fn test_selection_falls_back_to_sine_above_top_band() {
        let bank = bank();
        let top = bank.table_infos().last().unwrap().freq;
        assert!(bank.band_for_freq(top + 1.0).is_none());
        // Fallback output matches the sine table exactly.
        let phase = 123 << PHASE_FRAC_BITS;
        let fallen = bank.sample(Waveform::Saw, top + 1.0, phase);
        let sine = bank.sample(Waveform::Sine, top + 1.0, phase);
        assert_eq!(fallen, sine);
    }

    #[test]
    fn test_phase_increment_formula() {
        let bank = bank();
        // A4 at 48kHz: 1024 * 65536 * 440 / 48000
        let expected = (1024.0 * 65536.0 * 440.0 / 48000.0) as u32;
        assert_eq!(bank.phase_increment(69, 0.0), expected);
    }

    #[test]
    fn test_phase_increment_note_matches_freq_variant() {
        let bank = bank();
        for note in [21u8, 60, 69, 108] {
            let freq = crate::tuning::note_to_freq(f32::from(note), 440.0);
            assert_eq!(
                bank.phase_increment(note, 0.0),
                bank.phase_increment_for_freq(freq).unwrap(),
                "note {note}"
            );
        }
    }

    #[test]
    fn test_phase_increment_rejects_nonpositive_freq() {
        let bank = bank();
        assert_eq!(
            bank.phase_increment_for_freq(0.0),
            Err(BankError::InvalidFrequency(0.0))
        );
        assert!(bank.phase_increment_for_freq(-1.0).is_err());
    }

    #[test]
    fn test_sine_lookup_quarter_points() {
        let bank = bank();
        let quarter = (TABLE_LEN as u32 / 4) << PHASE_FRAC_BITS;
        assert!((bank.sample(Waveform::Sine, 440.0, 0) - 0.0).abs() < 1e-4);
        assert!((bank.sample(Waveform::Sine, 440.0, quarter) - 1.0).abs() < 1e-4);
        assert!((bank.sample(Waveform::Sine, 440.0, 2 * quarter) - 0.0).abs() < 1e-4);
        assert!((bank.sample(Waveform::Sine, 440.0, 3 * quarter) + 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_interpolation_blends_adjacent_samples() {
        let bank = bank();
        let a = bank.sample(Waveform::Sine, 440.0, 10 << PHASE_FRAC_BITS);
        let b = bank.sample(Waveform::Sine, 440.0, 11 << PHASE_FRAC_BITS);
        let mid = bank.sample(Waveform::Sine, 440.0, (10 << PHASE_FRAC_BITS) + 0x8000);
        assert!((mid - (a + b) / 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_phase_wraps_by_masking() {
        let bank = bank();
        let cycle = (TABLE_LEN as u32) << PHASE_FRAC_BITS;
        let phase = 37 << PHASE_FRAC_BITS;
        assert_eq!(
            bank.sample(Waveform::Sine, 440.0, phase),
            bank.sample(Waveform::Sine, 440.0, phase.wrapping_add(cycle))
        );
    }

    #[test]
    fn test_saw_matches_additive_reference() {
        let bank = bank();
        let band = bank.band_for_freq(440.0).unwrap();
        let harmonics = bank.table_infos()[band].harmonics;
        // Recompute a few samples directly from the Fourier series.
        for i in [0usize, 100, 511, 900] {
            let phase = TAU * i as f32 / TABLE_LEN as f32;
            let mut expected = 0.0f32;
            for n in 1..=harmonics {
                expected += sinf(n as f32 * phase) / n as f32;
            }
            expected *= 2.0 / core::f32::consts::PI;
            let got = bank.sample(Waveform::Saw, 440.0, (i as u32) << PHASE_FRAC_BITS);
            assert!(
                (got - expected).abs() < 1e-4,
                "saw[{i}] = {got}, expected {expected}"
            );
        }
    }

    #[test]
    fn test_square_has_no_even_harmonics() {
        // The two-saw construction cancels even harmonics: the value half a
        // cycle later must be the exact negation.
        let bank = bank();
        let half = (TABLE_LEN as u32 / 2) << PHASE_FRAC_BITS;
        for i in [3u32, 77, 200, 450] {
            let phase = i << PHASE_FRAC_BITS;
            let a = bank.sample(Waveform::Square, 440.0, phase);
            let b = bank.sample(Waveform::Square, 440.0, phase + half);
            assert!((a + b).abs() < 1e-4, "square half-wave symmetry at {i}");
        }
    }

    #[test]
    fn test_triangle_peak_near_quarter_cycle() {
        let bank = bank();
        let quarter = (TABLE_LEN as u32 / 4) << PHASE_FRAC_BITS;
        let peak = bank.sample(Waveform::Triangle, 440.0, quarter);
        assert!((peak - 1.0).abs() < 0.05, "triangle peak = {peak}");
    }
}
