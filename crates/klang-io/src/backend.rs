//! Pluggable audio backend abstraction.
//!
//! [`AudioBackend`] decouples the synthesizer engine from any specific
//! platform audio API. The default implementation wraps
//! [cpal](https://crates.io/crates/cpal); alternative backends (plugin-host
//! buffers, WebAudio, a deterministic mock for tests) implement the same
//! trait. The trait uses boxed closures for callbacks so it stays
//! object-safe, and streams come back as a type-erased [`StreamHandle`]
//! that stops playback on drop.

use crate::Result;

/// Audio output device information.
#[derive(Debug, Clone)]
pub struct AudioDevice {
    /// Human-readable device name.
    pub name: String,
    /// Default sample rate in Hz.
    pub default_sample_rate: u32,
}

/// Configuration for building an output stream.
#[derive(Debug, Clone)]
pub struct StreamConfig {
    /// Requested sample rate in Hz.
    pub sample_rate: u32,
    /// Preferred buffer size in frames.
    pub buffer_size: u32,
    /// Number of audio channels.
    pub channels: u16,
    /// Optional device name (uses system default if `None`).
    pub device_name: Option<String>,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48000,
            buffer_size: 256,
            channels: 2,
            device_name: None,
        }
    }
}

/// Type-erased audio stream handle.
///
/// The stream is active while this handle exists; dropping it stops
/// playback. The inner value is `Box<dyn Send>`, keeping backend types out
/// of application code.
pub struct StreamHandle {
    _inner: Box<dyn Send>,
}

impl StreamHandle {
    /// Wrap a backend-specific stream object, keeping it alive until drop.
    pub fn new<T: Send + 'static>(stream: T) -> Self {
        Self {
            _inner: Box::new(stream),
        }
    }
}

impl std::fmt::Debug for StreamHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamHandle").finish_non_exhaustive()
    }
}

/// Audio output callback signature.
///
/// Called on the real-time audio thread with a mutable buffer of
/// interleaved f32 samples to fill. For stereo output the layout is
/// `[L0, R0, L1, R1, ...]` and the buffer length is `frames * channels`.
/// Implementations must not allocate, lock, or perform I/O.
pub type OutputCallback = Box<dyn FnMut(&mut [f32]) + Send>;

/// Error callback signature.
///
/// Called with a human-readable message when the backend encounters a
/// streaming error, such as a buffer underrun.
pub type ErrorCallback = Box<dyn FnMut(&str) + Send>;

/// Pluggable audio output backend.
///
/// Object-safe so applications can select a backend at runtime via
/// `Box<dyn AudioBackend>`.
pub trait AudioBackend: Send {
    /// Human-readable name of this backend (e.g., "cpal", "mock").
    fn name(&self) -> &str;

    /// List all available output devices.
    fn list_devices(&self) -> Result<Vec<AudioDevice>>;

    /// Get the default output device, if any.
    fn default_output_device(&self) -> Result<Option<AudioDevice>>;

    /// Build an output stream.
    ///
    /// `callback` is invoked on the audio thread with a buffer of
    /// interleaved f32 samples to fill. The returned [`StreamHandle`]
    /// keeps the stream alive; dropping it stops playback.
    fn build_output_stream(
        &self,
        config: &StreamConfig,
        callback: OutputCallback,
        error_callback: ErrorCallback,
    ) -> Result<StreamHandle>;

    /// Query the sample rate the backend will actually use for `config`.
    ///
    /// Backends that cannot honor the exact requested rate report the
    /// closest available one here. Defaults to the requested rate.
    fn actual_sample_rate(&self, config: &StreamConfig) -> u32 {
        config.sample_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = StreamConfig::default();
        assert_eq!(config.sample_rate, 48000);
        assert_eq!(config.buffer_size, 256);
        assert_eq!(config.channels, 2);
        assert!(config.device_name.is_none());
    }

    #[test]
    fn stream_handle_debug() {
        let handle = StreamHandle::new(42u32);
        let debug_str = format!("{:?}", handle);
        assert!(debug_str.contains("StreamHandle"));
    }
}
