//! cpal-based audio backend implementation.
//!
//! [`CpalBackend`] is the default [`AudioBackend`], wrapping
//! [cpal](https://crates.io/crates/cpal) for cross-platform output via
//! ALSA (Linux), CoreAudio (macOS), and WASAPI (Windows).

use crate::backend::{
    AudioBackend, AudioDevice, ErrorCallback, OutputCallback, StreamConfig, StreamHandle,
};
use crate::{Error, Result};
use cpal::Host;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

/// Extract device name via `description()` (cpal 0.17+).
fn device_name(device: &cpal::Device) -> std::result::Result<String, cpal::DeviceNameError> {
    device.description().map(|d| d.name().to_string())
}

/// cpal-based audio backend.
///
/// Holds a cpal [`Host`] instance, the connection to the platform's audio
/// system.
pub struct CpalBackend {
    host: Host,
}

impl CpalBackend {
    /// Create a new cpal backend using the platform's default audio host.
    pub fn new() -> Self {
        tracing::info!(
            host = cpal::default_host().id().name(),
            "cpal backend initialized"
        );
        Self {
            host: cpal::default_host(),
        }
    }

    /// Find an output device by case-insensitive partial name match, or
    /// return the default.
    fn find_output_device(&self, name: Option<&str>) -> Result<cpal::Device> {
        match name {
            Some(search) => {
                let search_lower = search.to_lowercase();
                let devices = self
                    .host
                    .output_devices()
                    .map_err(|e| Error::Stream(e.to_string()))?;

                for device in devices {
                    if let Ok(dev_name) = device_name(&device)
                        && dev_name.to_lowercase().contains(search_lower.as_str())
                    {
                        return Ok(device);
                    }
                }
                Err(Error::DeviceNotFound(format!(
                    "no output device matching '{}'",
                    search
                )))
            }
            None => self.host.default_output_device().ok_or(Error::NoDevice),
        }
    }
}

impl Default for CpalBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioBackend for CpalBackend {
    fn name(&self) -> &'static str {
        "cpal"
    }

    fn list_devices(&self) -> Result<Vec<AudioDevice>> {
        let mut devices = Vec::new();
        if let Ok(outputs) = self.host.output_devices() {
            for device in outputs {
                if let Ok(name) = device_name(&device) {
                    let sample_rate = device
                        .default_output_config()
                        .map(|c| c.sample_rate())
                        .unwrap_or(48000);
                    devices.push(AudioDevice {
                        name,
                        default_sample_rate: sample_rate,
                    });
                }
            }
        }
        Ok(devices)
    }

    fn default_output_device(&self) -> Result<Option<AudioDevice>> {
        Ok(self.host.default_output_device().and_then(|d| {
            device_name(&d).ok().map(|name| AudioDevice {
                name,
                default_sample_rate: d
                    .default_output_config()
                    .map(|c| c.sample_rate())
                    .unwrap_or(48000),
            })
        }))
    }

    fn build_output_stream(
        &self,
        config: &StreamConfig,
        mut callback: OutputCallback,
        mut error_callback: ErrorCallback,
    ) -> Result<StreamHandle> {
        let device = self.find_output_device(config.device_name.as_deref())?;

        let stream_config = cpal::StreamConfig {
            channels: config.channels,
            sample_rate: config.sample_rate,
            buffer_size: cpal::BufferSize::Fixed(config.buffer_size),
        };

        let stream = device
            .build_output_stream(
                &stream_config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    callback(data);
                },
                move |err| {
                    error_callback(&err.to_string());
                },
                None,
            )
            .map_err(|e| Error::Stream(e.to_string()))?;

        stream.play().map_err(|e| Error::Stream(e.to_string()))?;
        tracing::info!(
            channels = config.channels,
            sample_rate = config.sample_rate,
            buffer_size = config.buffer_size,
            "output stream started"
        );

        Ok(StreamHandle::new(stream))
    }
}
