//! Property-based tests for klang-core synthesis primitives.
//!
//! Tests wavetable lookup accuracy, phase-increment consistency, envelope
//! clamping, and biquad stability using proptest for randomized input
//! generation.

use std::sync::OnceLock;

use proptest::prelude::*;

use klang_core::{
    AdsrEnvelope, Biquad, PHASE_FRAC_BITS, TABLE_LEN, Waveform, WavetableBank, note_to_freq,
};

/// Table generation is expensive; build one bank for the whole suite.
fn bank() -> &'static WavetableBank {
    static BANK: OnceLock<WavetableBank> = OnceLock::new();
    BANK.get_or_init(|| WavetableBank::new(440.0, 48000.0).unwrap())
}

/// Biquad configuration indexed 0..8 over all eight response setters.
fn configure_biquad(biquad: &mut Biquad, variant: usize, freq: f32, q: f32) {
    // Reuse q as bandwidth-in-octaves for the bandwidth-parameterized
    // responses; both ranges are sensible filter inputs.
    match variant % 8 {
        0 => biquad.set_lowpass(freq, q),
        1 => biquad.set_highpass(freq, q),
        2 => biquad.set_bandpass(freq, q),
        3 => biquad.set_notch(freq, q),
        4 => biquad.set_low_shelf(freq, 6.0, q),
        5 => biquad.set_high_shelf(freq, -6.0, q),
        6 => biquad.set_peaking(freq, 6.0, q),
        7 => biquad.set_allpass(freq, q),
        _ => unreachable!(),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// For any fixed-point phase, the sine lookup matches the mathematical
    /// sine of the corresponding angle within 1e-4.
    #[test]
    fn sine_lookup_matches_sin(phase in any::<u32>()) {
        let bank = bank();
        let cycle = (TABLE_LEN as f32) * (1u32 << PHASE_FRAC_BITS) as f32;
        let angle = (phase as f32 % cycle) / cycle * std::f32::consts::TAU;
        let expected = angle.sin();
        let got = bank.sample(Waveform::Sine, 440.0, phase);
        prop_assert!(
            (got - expected).abs() < 1e-4,
            "sine at phase {:#x}: got {}, expected {}",
            phase, got, expected
        );
    }

    /// phase_increment(note, 0) agrees with the frequency-direct variant fed
    /// the equal-temperament frequency of the note.
    #[test]
    fn phase_increment_note_freq_consistency(note in 0u8..=127) {
        let bank = bank();
        let freq = note_to_freq(f32::from(note), 440.0);
        prop_assert_eq!(
            bank.phase_increment(note, 0.0),
            bank.phase_increment_for_freq(freq).unwrap()
        );
    }

    /// Every band selected for a representable frequency keeps its harmonics
    /// below Nyquist at that frequency.
    #[test]
    fn band_selection_never_aliases(freq in 30.0f32..20000.0f32) {
        let bank = bank();
        if let Some(band) = bank.band_for_freq(freq) {
            let info = bank.table_infos()[band];
            prop_assert!(
                info.harmonics as f32 * freq <= 24000.0 + 1.0,
                "band {} ({} harmonics) aliases at {} Hz",
                band, info.harmonics, freq
            );
        }
    }

    /// Envelope level stays in [0, 1] for any stage configuration over a
    /// full trigger/release cycle.
    #[test]
    fn envelope_level_always_clamped(
        attack in 0.0f32..50.0,
        decay in 0.0f32..50.0,
        sustain in 0.0f32..=1.0,
        release in 0.0f32..50.0,
    ) {
        let mut env = AdsrEnvelope::new(48000.0);
        env.set_attack_ms(attack);
        env.set_decay_ms(decay);
        env.set_sustain(sustain);
        env.set_release_ms(release);

        env.trigger();
        for _ in 0..8192 {
            env.process(1.0);
            prop_assert!((0.0..=1.0).contains(&env.level()), "level {}", env.level());
        }
        env.release();
        for _ in 0..4096 {
            env.process(1.0);
            prop_assert!((0.0..=1.0).contains(&env.level()), "level {}", env.level());
        }
    }

    /// For any valid cutoff and Q/bandwidth, every biquad response produces
    /// finite output for random finite input.
    #[test]
    fn biquad_stability(
        freq in 20.0f32..20000.0f32,
        q in 0.1f32..10.0f32,
        variant in 0usize..8,
        input in prop::array::uniform32(-1.0f32..=1.0f32),
    ) {
        let mut biquad = Biquad::new(48000.0);
        configure_biquad(&mut biquad, variant, freq, q);

        for &sample in &input {
            let out = biquad.process(sample);
            prop_assert!(
                out.is_finite(),
                "biquad variant {} (freq={}, q={}) produced non-finite output {} for input {}",
                variant % 8, freq, q, out, sample
            );
        }
    }
}
