//! Biquad (bi-quadratic) filter.
//!
//! A second-order IIR section with setters for the eight standard RBJ Audio
//! EQ Cookbook responses: low-pass, high-pass, band-pass, notch, low shelf,
//! high shelf, peaking EQ, and all-pass.
//!
//! Band-pass, notch, and peaking take a bandwidth in octaves; the others
//! take a Q factor. Shelves and peaking additionally take a gain in dB.

use core::f32::consts::{LN_2, PI};
use libm::{cosf, powf, sinf, sinhf, sqrtf};

/// Second-order IIR filter with RBJ cookbook coefficient setters.
///
/// Implements the Direct Form I structure:
/// ```text
/// y[n] = b0*x[n] + b1*x[n-1] + b2*x[n-2]
///                - a1*y[n-1] - a2*y[n-2]
/// ```
///
/// Coefficients are normalized by a0 when set, so [`Biquad::process`] is a
/// fixed five-multiply difference equation, O(1) and allocation-free.
#[derive(Debug, Clone)]
pub struct Biquad {
    sample_rate: f32,

    // Normalized coefficients.
    b0: f32,
    b1: f32,
    b2: f32,
    a1: f32,
    a2: f32,

    // Input delay line: x[n-1], x[n-2]
    x1: f32,
    x2: f32,

    // Output delay line: y[n-1], y[n-2]
    y1: f32,
    y2: f32,
}

impl Biquad {
    /// Create a biquad with passthrough coefficients (`y[n] = x[n]`).
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            b0: 1.0,
            b1: 0.0,
            b2: 0.0,
            a1: 0.0,
            a2: 0.0,
            x1: 0.0,
            x2: 0.0,
            y1: 0.0,
            y2: 0.0,
        }
    }

    /// Process one sample through the filter.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let output = self.b0 * input + self.b1 * self.x1 + self.b2 * self.x2
            - self.a1 * self.y1
            - self.a2 * self.y2;

        self.x2 = self.x1;
        self.x1 = input;
        self.y2 = self.y1;
        self.y1 = output;

        output
    }

    /// Clear the delay lines without changing coefficients.
    pub fn clear(&mut self) {
        self.x1 = 0.0;
        self.x2 = 0.0;
        self.y1 = 0.0;
        self.y2 = 0.0;
    }

    /// Configure as a low-pass filter.
    pub fn set_lowpass(&mut self, frequency: f32, q: f32) {
        let (sin_omega, cos_omega) = self.omega(frequency);
        let alpha = sin_omega / (2.0 * q);

        self.apply(
            (1.0 - cos_omega) / 2.0,
            1.0 - cos_omega,
            (1.0 - cos_omega) / 2.0,
            1.0 + alpha,
            -2.0 * cos_omega,
            1.0 - alpha,
        );
    }

    /// Configure as a high-pass filter.
    pub fn set_highpass(&mut self, frequency: f32, q: f32) {
        let (sin_omega, cos_omega) = self.omega(frequency);
        let alpha = sin_omega / (2.0 * q);

        self.apply(
            (1.0 + cos_omega) / 2.0,
            -(1.0 + cos_omega),
            (1.0 + cos_omega) / 2.0,
            1.0 + alpha,
            -2.0 * cos_omega,
            1.0 - alpha,
        );
    }

    /// Configure as a band-pass filter (constant 0 dB peak gain).
    /// `bandwidth` is in octaves.
    pub fn set_bandpass(&mut self, frequency: f32, bandwidth: f32) {
        let (sin_omega, cos_omega) = self.omega(frequency);
        let alpha = bandwidth_alpha(sin_omega, bandwidth, frequency, self.sample_rate);

        self.apply(
            alpha,
            0.0,
            -alpha,
            1.0 + alpha,
            -2.0 * cos_omega,
            1.0 - alpha,
        );
    }

    /// Configure as a notch (band-reject) filter. `bandwidth` is in octaves.
    pub fn set_notch(&mut self, frequency: f32, bandwidth: f32) {
        let (sin_omega, cos_omega) = self.omega(frequency);
        let alpha = bandwidth_alpha(sin_omega, bandwidth, frequency, self.sample_rate);

        self.apply(
            1.0,
            -2.0 * cos_omega,
            1.0,
            1.0 + alpha,
            -2.0 * cos_omega,
            1.0 - alpha,
        );
    }

    /// Configure as a low shelf with the given gain in dB.
    pub fn set_low_shelf(&mut self, frequency: f32, gain_db: f32, q: f32) {
        let a = powf(10.0, gain_db / 40.0);
        let (sin_omega, cos_omega) = self.omega(frequency);
        let beta = sqrtf(a) / q;

        self.apply(
            a * ((a + 1.0) - (a - 1.0) * cos_omega + beta * sin_omega),
            2.0 * a * ((a - 1.0) - (a + 1.0) * cos_omega),
            a * ((a + 1.0) - (a - 1.0) * cos_omega - beta * sin_omega),
            (a + 1.0) + (a - 1.0) * cos_omega + beta * sin_omega,
            -2.0 * ((a - 1.0) + (a + 1.0) * cos_omega),
            (a + 1.0) + (a - 1.0) * cos_omega - beta * sin_omega,
        );
    }

    /// Configure as a high shelf with the given gain in dB.
    pub fn set_high_shelf(&mut self, frequency: f32, gain_db: f32, q: f32) {
        let a = powf(10.0, gain_db / 40.0);
        let (sin_omega, cos_omega) = self.omega(frequency);
        let beta = sqrtf(a) / q;

        self.apply(
            a * ((a + 1.0) + (a - 1.0) * cos_omega + beta * sin_omega),
            -2.0 * a * ((a - 1.0) + (a + 1.0) * cos_omega),
            a * ((a + 1.0) + (a - 1.0) * cos_omega - beta * sin_omega),
            (a + 1.0) - (a - 1.0) * cos_omega + beta * sin_omega,
            2.0 * ((a - 1.0) - (a + 1.0) * cos_omega),
            (a + 1.0) - (a - 1.0) * cos_omega - beta * sin_omega,
        );
    }

    /// Configure as a peaking EQ with the given gain in dB.
    /// `bandwidth` is in octaves.
    pub fn set_peaking(&mut self, frequency: f32, gain_db: f32, bandwidth: f32) {
        let a = powf(10.0, gain_db / 40.0);
        let (sin_omega, cos_omega) = self.omega(frequency);
        let alpha = bandwidth_alpha(sin_omega, bandwidth, frequency, self.sample_rate);

        self.apply(
            1.0 + alpha * a,
            -2.0 * cos_omega,
            1.0 - alpha * a,
            1.0 + alpha / a,
            -2.0 * cos_omega,
            1.0 - alpha / a,
        );
    }

    /// Configure as an all-pass filter (unity magnitude, phase rotation).
    pub fn set_allpass(&mut self, frequency: f32, q: f32) {
        let (sin_omega, cos_omega) = self.omega(frequency);
        let alpha = sin_omega / (2.0 * q);

        self.apply(
            1.0 - alpha,
            -2.0 * cos_omega,
            1.0 + alpha,
            1.0 + alpha,
            -2.0 * cos_omega,
            1.0 - alpha,
        );
    }

    fn omega(&self, frequency: f32) -> (f32, f32) {
        let omega = 2.0 * PI * frequency / self.sample_rate;
        (sinf(omega), cosf(omega))
    }

    fn apply(&mut self, b0: f32, b1: f32, b2: f32, a0: f32, a1: f32, a2: f32) {
        let a0_inv = 1.0 / a0;
        self.b0 = b0 * a0_inv;
        self.b1 = b1 * a0_inv;
        self.b2 = b2 * a0_inv;
        self.a1 = a1 * a0_inv;
        self.a2 = a2 * a0_inv;
    }
}

/// Alpha for the bandwidth-in-octaves parameterization:
/// `sin(ω) * sinh(ln2/2 * bw * ω/sin(ω))`.
fn bandwidth_alpha(sin_omega: f32, bandwidth: f32, frequency: f32, sample_rate: f32) -> f32 {
    let omega = 2.0 * PI * frequency / sample_rate;
    sin_omega * sinhf(LN_2 / 2.0 * bandwidth * omega / sin_omega)
}
