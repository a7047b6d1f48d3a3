//! Equal-temperament pitch math.
//!
//! Converts MIDI note numbers (with optional cent detune) to frequencies
//! relative to a configurable tuning reference. MIDI note 69 (A4) maps to
//! the reference frequency.

use libm::{exp2f, log2f};

/// Default tuning reference for A4 in Hz.
pub const CONCERT_A_HZ: f32 = 440.0;

/// MIDI note number of the tuning reference (A4).
pub const A4_NOTE: f32 = 69.0;

/// Convert a (possibly fractional) MIDI note number to a frequency.
///
/// `freq = tuning * 2^((note - 69) / 12)`. Fractional note numbers
/// express detune: one cent is 1/100 of a note.
#[inline]
pub fn note_to_freq(note: f32, tuning_hz: f32) -> f32 {
    tuning_hz * exp2f((note - A4_NOTE) / 12.0)
}

/// Convert a MIDI note plus a detune offset in cents to a frequency.
#[inline]
pub fn note_detuned_to_freq(note: u8, detune_cents: f32, tuning_hz: f32) -> f32 {
    note_to_freq(f32::from(note) + detune_cents / 100.0, tuning_hz)
}

/// Convert a frequency to a (fractional) MIDI note number.
///
/// Inverse of [`note_to_freq`]. Returns negative infinity for zero input;
/// callers validate frequencies before using the result.
#[inline]
pub fn freq_to_note(freq_hz: f32, tuning_hz: f32) -> f32 {
    A4_NOTE + 12.0 * log2f(freq_hz / tuning_hz)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_a4_is_tuning_reference() {
        assert!((note_to_freq(69.0, 440.0) - 440.0).abs() < 0.001);
        assert!((note_to_freq(69.0, 442.0) - 442.0).abs() < 0.001);
    }

    #[test]
    fn test_octave_doubles_frequency() {
        let a4 = note_to_freq(69.0, 440.0);
        let a5 = note_to_freq(81.0, 440.0);
        assert!((a5 - 2.0 * a4).abs() < 0.01, "A5 = {a5}, expected {}", 2.0 * a4);
    }

    #[test]
    fn test_middle_c() {
        let c4 = note_to_freq(60.0, 440.0);
        assert!((c4 - 261.63).abs() < 0.1, "C4 = {c4}");
    }

    #[test]
    fn test_cent_detune() {
        // +100 cents is exactly one semitone
        let detuned = note_detuned_to_freq(69, 100.0, 440.0);
        let semitone = note_to_freq(70.0, 440.0);
        assert!((detuned - semitone).abs() < 0.01);
    }

    #[test]
    fn test_freq_to_note_round_trip() {
        for note in [21.0, 60.0, 69.0, 108.0] {
            let freq = note_to_freq(note, 440.0);
            let back = freq_to_note(freq, 440.0);
            assert!((back - note).abs() < 0.001, "note {note} -> {freq} Hz -> {back}");
        }
    }
}
