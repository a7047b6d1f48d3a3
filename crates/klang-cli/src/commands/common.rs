//! Shared synthesizer options for playback commands.

use clap::{Args, ValueEnum};
use klang_core::Waveform;
use klang_io::{EngineConfig, StreamConfig};
use klang_synth::PlayMode;

/// Oscillator waveform choice.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum WaveformArg {
    /// Pure sine
    Sine,
    /// Band-limited triangle
    Triangle,
    /// Band-limited sawtooth
    Saw,
    /// Band-limited square
    Square,
}

impl From<WaveformArg> for Waveform {
    fn from(arg: WaveformArg) -> Self {
        match arg {
            WaveformArg::Sine => Waveform::Sine,
            WaveformArg::Triangle => Waveform::Triangle,
            WaveformArg::Saw => Waveform::Saw,
            WaveformArg::Square => Waveform::Square,
        }
    }
}

/// Voice allocation mode choice.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ModeArg {
    /// One voice group per held note
    Poly,
    /// Most recent held note only, always retriggered
    Mono,
    /// Most recent held note only, retriggered on fresh presses
    Legato,
}

impl From<ModeArg> for PlayMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Poly => PlayMode::Poly,
            ModeArg::Mono => PlayMode::Mono,
            ModeArg::Legato => PlayMode::Legato,
        }
    }
}

/// Synthesizer and stream options shared by `play` and `demo`.
#[derive(Args)]
pub struct SynthArgs {
    /// Output device name (partial match; system default if omitted)
    #[arg(long)]
    pub device: Option<String>,

    /// Sample rate in Hz
    #[arg(long, default_value = "48000")]
    pub sample_rate: u32,

    /// Buffer size in frames
    #[arg(long, default_value = "256")]
    pub buffer_size: u32,

    /// Oscillator waveform
    #[arg(short, long, value_enum, default_value_t = WaveformArg::Saw)]
    pub waveform: WaveformArg,

    /// Voice allocation mode
    #[arg(short, long, value_enum, default_value_t = ModeArg::Poly)]
    pub mode: ModeArg,

    /// Voices triggered per note
    #[arg(long, default_value = "1")]
    pub unison: usize,

    /// Unison detune spread in cents
    #[arg(long, default_value = "10.0")]
    pub spread: f32,

    /// Portamento rate in notes per second (0 disables)
    #[arg(long, default_value = "0.0")]
    pub glide: f32,

    /// Maximum simultaneous notes in poly mode
    #[arg(long, default_value = "16")]
    pub poly_cap: usize,

    /// Concert pitch in Hz
    #[arg(long, default_value = "440.0")]
    pub tuning: f32,
}

impl SynthArgs {
    /// Translate the CLI options into an engine configuration.
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            stream: StreamConfig {
                sample_rate: self.sample_rate,
                buffer_size: self.buffer_size,
                channels: 2,
                device_name: self.device.clone(),
            },
            tuning_hz: self.tuning,
            waveform: self.waveform.into(),
            mode: self.mode.into(),
            poly_cap: self.poly_cap,
            unison: self.unison,
            unison_spread_cents: self.spread,
            glide_rate: self.glide,
            ..EngineConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        synth: SynthArgs,
    }

    #[test]
    fn defaults_map_to_engine_config() {
        let cli = TestCli::parse_from(["test"]);
        let config = cli.synth.engine_config();
        assert_eq!(config.stream.sample_rate, 48000);
        assert_eq!(config.stream.buffer_size, 256);
        assert_eq!(config.stream.channels, 2);
        assert!(matches!(config.waveform, Waveform::Saw));
        assert!(matches!(config.mode, PlayMode::Poly));
        assert_eq!(config.poly_cap, 16);
        assert_eq!(config.unison, 1);
    }

    #[test]
    fn overrides_are_applied() {
        let cli = TestCli::parse_from([
            "test",
            "--waveform",
            "square",
            "--mode",
            "legato",
            "--glide",
            "24",
            "--unison",
            "3",
            "--tuning",
            "432",
        ]);
        let config = cli.synth.engine_config();
        assert!(matches!(config.waveform, Waveform::Square));
        assert!(matches!(config.mode, PlayMode::Legato));
        assert_eq!(config.glide_rate, 24.0);
        assert_eq!(config.unison, 3);
        assert_eq!(config.tuning_hz, 432.0);
    }
}
