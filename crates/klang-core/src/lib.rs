//! Klang Core - wavetable synthesis primitives
//!
//! This crate provides the signal-generation building blocks for the klang
//! synthesizer, designed for real-time use: all tables are precomputed at
//! startup and every per-sample operation is allocation-free.
//!
//! # Core Components
//!
//! ## Wavetable Bank
//!
//! Band-limited lookup tables with 16:16 fixed-point phase:
//!
//! - [`WavetableBank`] - Precomputed tables for all bands and waveforms
//! - [`Waveform`] - Waveform kinds (Sine, Triangle, Saw, Square)
//! - [`TableInfo`] - Per-band frequency/harmonic metadata
//!
//! ```rust
//! use klang_core::{WavetableBank, Waveform};
//!
//! let bank = WavetableBank::new(440.0, 48000.0).unwrap();
//! let step = bank.phase_increment(69, 0.0);
//!
//! let mut phase = 0u32;
//! let mut buffer = [0.0f32; 64];
//! for sample in buffer.iter_mut() {
//!     *sample = bank.sample(Waveform::Saw, 440.0, phase);
//!     phase = phase.wrapping_add(step);
//! }
//! ```
//!
//! ## Envelope
//!
//! - [`AdsrEnvelope`] - Linear attack-decay-sustain-release envelope
//! - [`EnvelopeState`] - Envelope stage tracking
//!
//! ## Filter
//!
//! - [`Biquad`] - Second-order IIR filter with all eight RBJ cookbook
//!   responses
//!
//! ## Tuning
//!
//! - [`note_to_freq`] / [`freq_to_note`] - Equal temperament with a
//!   configurable tuning reference
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible (requires `alloc` for table storage).
//! Disable the default `std` feature:
//!
//! ```toml
//! [dependencies]
//! klang-core = { version = "0.1", default-features = false }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod biquad;
pub mod envelope;
pub mod tuning;
pub mod wavetable;

// Re-export main types at crate root
pub use biquad::Biquad;
pub use envelope::{AdsrEnvelope, EnvelopeState};
pub use tuning::{CONCERT_A_HZ, freq_to_note, note_detuned_to_freq, note_to_freq};
pub use wavetable::{BankError, PHASE_FRAC_BITS, TABLE_LEN, TableInfo, Waveform, WavetableBank};
