//! Real-time synthesizer engine.
//!
//! [`SynthEngine`] owns the voice controller and key tracker on the audio
//! thread. The input thread sends [`NoteEvent`]s through a bounded channel;
//! the audio callback drains the channel, reconciles voices once, then
//! renders the buffer, fanning the mono output to every channel and feeding
//! each sample to the shared [`ScopeBuffer`].

use crate::backend::{AudioBackend, StreamConfig, StreamHandle};
use crate::scope::ScopeBuffer;
use crate::Result;
use klang_core::{Waveform, WavetableBank};
use klang_synth::{KeyState, PlayMode, VoiceController};
use std::sync::Arc;
use std::sync::mpsc::{self, SyncSender, TrySendError};

/// Fixed voice pool size of the engine's controller.
const VOICE_POOL: usize = 32;

/// Depth of the note event channel.
const EVENT_QUEUE_DEPTH: usize = 64;

/// A note message from the input thread to the audio thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteEvent {
    /// Key pressed.
    On {
        /// MIDI note number (0-127).
        note: u8,
        /// Velocity (1-127; 0 is treated as a release).
        velocity: u8,
    },
    /// Key released.
    Off {
        /// MIDI note number (0-127).
        note: u8,
    },
}

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Output stream parameters.
    pub stream: StreamConfig,
    /// Concert pitch for note tuning, in Hz.
    pub tuning_hz: f32,
    /// Oscillator waveform.
    pub waveform: Waveform,
    /// Voice allocation mode.
    pub mode: PlayMode,
    /// Maximum simultaneously triggered notes in poly mode.
    pub poly_cap: usize,
    /// Voices triggered per note.
    pub unison: usize,
    /// Detune spread across unison voices, in cents.
    pub unison_spread_cents: f32,
    /// Portamento rate in notes per second (0 disables).
    pub glide_rate: f32,
    /// ADSR times in ms and sustain level: (attack, decay, sustain, release).
    pub envelope: (f32, f32, f32, f32),
    /// Capacity of the scope ring; must be a non-zero power of two.
    pub scope_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            stream: StreamConfig::default(),
            tuning_hz: 440.0,
            waveform: Waveform::Saw,
            mode: PlayMode::Poly,
            poly_cap: 16,
            unison: 1,
            unison_spread_cents: 10.0,
            glide_rate: 0.0,
            envelope: (10.0, 100.0, 0.7, 200.0),
            scope_capacity: 4096,
        }
    }
}

/// Running synthesizer engine.
///
/// Holds the stream alive; dropping the engine stops audio.
pub struct SynthEngine {
    _stream: StreamHandle,
    events: SyncSender<NoteEvent>,
    scope: Arc<ScopeBuffer>,
    sample_rate: u32,
}

impl SynthEngine {
    /// Build the synthesizer and start streaming on `backend`.
    pub fn start(backend: &dyn AudioBackend, config: &EngineConfig) -> Result<Self> {
        let sample_rate = backend.actual_sample_rate(&config.stream);
        let bank = WavetableBank::new(config.tuning_hz, sample_rate as f32)?;

        let mut controller: VoiceController<VOICE_POOL> = VoiceController::new(bank);
        controller.set_waveform(config.waveform);
        controller.set_mode(config.mode);
        controller.set_poly_cap(config.poly_cap);
        controller.set_unison(config.unison);
        controller.set_unison_spread(config.unison_spread_cents);
        controller.set_glide_rate(config.glide_rate);
        let (attack, decay, sustain, release) = config.envelope;
        controller.set_envelope(attack, decay, sustain, release);

        let scope = Arc::new(ScopeBuffer::new(config.scope_capacity)?);
        let (events, receiver) = mpsc::sync_channel::<NoteEvent>(EVENT_QUEUE_DEPTH);

        let mut keys = KeyState::new();
        let channels = usize::from(config.stream.channels).max(1);
        let callback_scope = Arc::clone(&scope);

        let stream = backend.build_output_stream(
            &config.stream,
            Box::new(move |data: &mut [f32]| {
                while let Ok(event) = receiver.try_recv() {
                    match event {
                        NoteEvent::On { note, velocity } => keys.note_on(note, velocity),
                        NoteEvent::Off { note } => keys.note_off(note),
                    }
                }

                controller.reconcile(&keys);
                keys.clear_changed();

                for frame in data.chunks_mut(channels) {
                    let sample = controller.render();
                    for out in frame.iter_mut() {
                        *out = sample;
                    }
                    callback_scope.put(sample);
                }
            }),
            Box::new(|err| {
                tracing::error!(error = err, "audio stream error");
            }),
        )?;

        tracing::info!(
            backend = backend.name(),
            sample_rate,
            voices = VOICE_POOL,
            "synth engine started"
        );

        Ok(Self {
            _stream: stream,
            events,
            scope,
            sample_rate,
        })
    }

    /// Queue a note event for the audio thread.
    ///
    /// Returns `false` if the event was dropped because the queue is full
    /// or the stream has stopped.
    pub fn send(&self, event: NoteEvent) -> bool {
        match self.events.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                tracing::warn!(?event, "note event dropped: queue full");
                false
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }

    /// Shared handle to the rendered-sample ring.
    pub fn scope(&self) -> Arc<ScopeBuffer> {
        Arc::clone(&self.scope)
    }

    /// Sample rate the stream is actually running at.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}
