//! Butterworth low-pass filter design and a general-order direct-form IIR to apply it.
//!
//! The original pipeline configured its channel filter from a library call; nothing in this
//! workspace's dependency stack provides Butterworth coefficient synthesis, so this module derives
//! them directly: an analog Butterworth prototype, pre-warped and mapped to the digital domain by
//! the bilinear transform. Runtime application generalizes `sonido-core::biquad::Biquad`'s Direct
//! Form I single-sample loop from a fixed second order to the arbitrary order a filter design
//! produces.

use num_complex::Complex64;

/// `(b, a)` coefficients of a digital IIR filter, both normalized so `a[0] == 1.0`, in descending
/// powers of `z` (equivalently, ascending powers of `z^-1`): `H(z) = (b0 + b1 z^-1 + ...) /
/// (1 + a1 z^-1 + ...)`.
#[derive(Debug, Clone)]
pub struct IirCoeffs {
    /// Feedforward coefficients.
    pub b: Vec<f64>,
    /// Feedback coefficients, `a[0] == 1.0`.
    pub a: Vec<f64>,
}

/// Design an order-`order` Butterworth low-pass with cutoff `cutoff_hz`, sampled at
/// `sample_rate_hz`, via the bilinear transform (§4.2: filter is "Butterworth order 5, low-pass,
/// cutoff = bw/2").
///
/// # Panics
///
/// Panics if `order` is zero.
pub fn design_butterworth_lowpass(order: usize, cutoff_hz: f64, sample_rate_hz: f64) -> IirCoeffs {
    assert!(order >= 1, "Butterworth filter order must be at least 1");

    let fs2 = 2.0 * sample_rate_hz;
    // Pre-warp the cutoff so the bilinear transform's frequency compression lands the digital
    // -3 dB point at the requested analog frequency.
    let warped = fs2 * (std::f64::consts::PI * cutoff_hz / sample_rate_hz).tan();

    let analog_poles: Vec<Complex64> = (0..order)
        .map(|k| {
            let theta =
                std::f64::consts::PI * (2.0 * k as f64 + order as f64 + 1.0) / (2.0 * order as f64);
            Complex64::new(warped * theta.cos(), warped * theta.sin())
        })
        .collect();

    let fs2c = Complex64::new(fs2, 0.0);
    let digital_poles: Vec<Complex64> = analog_poles.iter().map(|&p| (fs2c + p) / (fs2c - p)).collect();
    // The analog prototype's zeros are all at infinity; the bilinear transform maps each to z = -1.
    let digital_zeros = vec![Complex64::new(-1.0, 0.0); order];

    let num_poly = expand_roots(&digital_zeros);
    let den_poly = expand_roots(&digital_poles);

    // Every z^k term equals 1 at z = 1, so summing coefficients evaluates the polynomial there;
    // scale the numerator so the filter has unity gain at DC.
    let num_at_dc: f64 = num_poly.iter().map(|c| c.re).sum();
    let den_at_dc: f64 = den_poly.iter().map(|c| c.re).sum();
    let dc_gain = den_at_dc / num_at_dc;

    let a0 = den_poly[0].re;
    let b: Vec<f64> = num_poly.iter().map(|c| c.re * dc_gain / a0).collect();
    let a: Vec<f64> = den_poly.iter().map(|c| c.re / a0).collect();

    IirCoeffs { b, a }
}

/// Expand `prod_k (z - root_k)` into coefficients ordered from `z^n` down to `z^0`.
fn expand_roots(roots: &[Complex64]) -> Vec<Complex64> {
    let mut coeffs = vec![Complex64::new(1.0, 0.0)];
    for &root in roots {
        let mut next = vec![Complex64::new(0.0, 0.0); coeffs.len() + 1];
        for (i, &c) in coeffs.iter().enumerate() {
            next[i] += c;
            next[i + 1] -= c * root;
        }
        coeffs = next;
    }
    coeffs
}

/// A direct-form II transposed IIR filter of arbitrary order, applied a whole chunk at a time.
///
/// Holds its own delay line, so a fresh [`DirectFormIir`] must be built whenever coefficients
/// change (§4.2: "must not maintain stale internal state across coefficient changes") — there is
/// no in-place coefficient update, deliberately, to make that reset impossible to forget.
pub struct DirectFormIir {
    b: Vec<f64>,
    a: Vec<f64>,
    state: Vec<f64>,
}

impl DirectFormIir {
    /// Build a filter from `coeffs`, with a zeroed delay line.
    pub fn new(coeffs: &IirCoeffs) -> Self {
        let order = coeffs.b.len().max(coeffs.a.len()).saturating_sub(1);
        Self {
            b: coeffs.b.clone(),
            a: coeffs.a.clone(),
            state: vec![0.0; order],
        }
    }

    /// Filter `input` in place order, sample by sample, returning one output per input sample.
    pub fn process(&mut self, input: &[f32]) -> Vec<f32> {
        let mut out = Vec::with_capacity(input.len());
        for &x in input {
            let x = f64::from(x);
            let y = self.b[0] * x + self.state.first().copied().unwrap_or(0.0);

            let last = self.state.len().saturating_sub(1);
            for i in 0..last {
                self.state[i] = self.b.get(i + 1).copied().unwrap_or(0.0) * x
                    - self.a.get(i + 1).copied().unwrap_or(0.0) * y
                    + self.state[i + 1];
            }
            if !self.state.is_empty() {
                self.state[last] =
                    self.b.get(last + 1).copied().unwrap_or(0.0) * x - self.a.get(last + 1).copied().unwrap_or(0.0) * y;
            }

            out.push(y as f32);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn design_produces_normalized_coefficients() {
        let coeffs = design_butterworth_lowpass(5, 5_000.0, 250_000.0);
        assert_eq!(coeffs.a[0], 1.0);
        assert_eq!(coeffs.b.len(), 6);
        assert_eq!(coeffs.a.len(), 6);
    }

    #[test]
    fn dc_gain_is_unity() {
        let coeffs = design_butterworth_lowpass(5, 5_000.0, 250_000.0);
        let mut iir = DirectFormIir::new(&coeffs);
        // Drive with a long DC input; the filter's steady-state output should settle near 1.0.
        let input = vec![1.0_f32; 2000];
        let out = iir.process(&input);
        let tail_mean: f32 = out[out.len() - 100..].iter().sum::<f32>() / 100.0;
        assert!((tail_mean - 1.0).abs() < 0.01, "tail mean was {tail_mean}");
    }

    #[test]
    fn attenuates_well_above_cutoff() {
        let sample_rate = 250_000.0;
        let cutoff = 2_000.0;
        let coeffs = design_butterworth_lowpass(5, cutoff, sample_rate);
        let mut iir = DirectFormIir::new(&coeffs);

        let high_freq = 80_000.0;
        let n = 4000;
        let input: Vec<f32> = (0..n)
            .map(|i| (std::f64::consts::TAU * high_freq * i as f64 / sample_rate).sin() as f32)
            .collect();
        let out = iir.process(&input);

        let input_power: f64 = input[n - 1000..].iter().map(|&x| f64::from(x) * f64::from(x)).sum();
        let output_power: f64 = out[n - 1000..].iter().map(|&x| f64::from(x) * f64::from(x)).sum();
        assert!(output_power < input_power * 0.1);
    }

    #[test]
    fn fresh_filter_has_zeroed_state() {
        let coeffs = design_butterworth_lowpass(5, 5_000.0, 250_000.0);
        let iir = DirectFormIir::new(&coeffs);
        assert!(iir.state.iter().all(|&s| s == 0.0));
    }
}
