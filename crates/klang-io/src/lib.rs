//! Audio I/O layer for the klang synthesizer.
//!
//! This crate provides:
//!
//! - **Backend abstraction**: [`AudioBackend`] decouples the engine from any
//!   specific platform audio API; [`CpalBackend`] is the default implementation
//! - **Real-time engine**: [`SynthEngine`] owns the voice controller on the
//!   audio thread and accepts [`NoteEvent`]s from the input thread
//! - **Scope buffer**: [`ScopeBuffer`], a lock-free single-producer
//!   single-consumer ring for shipping rendered samples to a reader thread
//! - **Key mapping**: [`key_to_note`] for the QWERTY chromatic keyboard layout
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use klang_io::{CpalBackend, EngineConfig, NoteEvent, SynthEngine};
//!
//! let backend = CpalBackend::new();
//! let engine = SynthEngine::start(&backend, &EngineConfig::default())?;
//!
//! engine.send(NoteEvent::On { note: 60, velocity: 100 });
//! std::thread::sleep(std::time::Duration::from_millis(500));
//! engine.send(NoteEvent::Off { note: 60 });
//! ```

mod backend;
mod cpal_backend;
mod engine;
mod keymap;
mod scope;

pub use backend::{
    AudioBackend, AudioDevice, ErrorCallback, OutputCallback, StreamConfig, StreamHandle,
};
pub use cpal_backend::CpalBackend;
pub use engine::{EngineConfig, NoteEvent, SynthEngine};
pub use keymap::{KEY_VELOCITY, key_to_note};
pub use scope::ScopeBuffer;

/// Error types for audio I/O operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Audio stream setup or runtime error.
    #[error("Audio stream error: {0}")]
    Stream(String),

    /// No audio device available on the system.
    #[error("No audio device available")]
    NoDevice,

    /// The requested audio device was not found.
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    /// Scope buffer capacity was not usable.
    #[error("Invalid scope capacity {0}: must be a non-zero power of two")]
    ScopeCapacity(usize),

    /// Wavetable bank construction failed during engine setup.
    #[error("Synth setup error: {0}")]
    Bank(#[from] klang_core::BankError),
}

/// Convenience result type for audio I/O operations.
pub type Result<T> = std::result::Result<T, Error>;
