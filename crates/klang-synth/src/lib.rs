//! Klang Synth - voice management for the klang synthesizer
//!
//! This crate turns the signal primitives of `klang-core` into a playable
//! polyphonic instrument: per-voice oscillator/filter/envelope chains, a
//! fixed-pool voice controller with poly/mono/legato allocation, and the
//! key-state tracker that mediates between the input context and the
//! render context.
//!
//! # Core Components
//!
//! ## Key Tracking
//!
//! - [`KeyState`] - Held/new key tracking with press-order recency
//!
//! ## Voices
//!
//! - [`Voice`] - One oscillator + filter + envelope slot
//!
//! ## Allocation
//!
//! - [`VoiceController`] - Fixed pool, poly cap, unison, voice stealing
//! - [`PlayMode`] - Poly, Mono, or Legato
//!
//! # Example
//!
//! ```rust
//! use klang_core::{Waveform, WavetableBank};
//! use klang_synth::{KeyState, PlayMode, VoiceController};
//!
//! let bank = WavetableBank::new(440.0, 48000.0).unwrap();
//! let mut ctrl: VoiceController<16> = VoiceController::new(bank);
//! ctrl.set_waveform(Waveform::Saw);
//! ctrl.set_poly_cap(8);
//!
//! let mut keys = KeyState::new();
//! keys.note_on(60, 100);
//! keys.note_on(64, 100);
//!
//! // Once per audio callback:
//! ctrl.reconcile(&keys);
//! keys.clear_changed();
//! let mut buffer = [0.0f32; 256];
//! for sample in buffer.iter_mut() {
//!     *sample = ctrl.render();
//! }
//! ```
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible. Disable the default `std` feature:
//!
//! ```toml
//! [dependencies]
//! klang-synth = { version = "0.1", default-features = false }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

pub mod controller;
pub mod keys;
pub mod voice;

// Re-export main types at crate root
pub use controller::{PlayMode, VoiceController};
pub use keys::KeyState;
pub use voice::Voice;

// Re-export commonly used types from klang-core
pub use klang_core::{Waveform, WavetableBank};
