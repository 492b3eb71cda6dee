//! Frequency-domain helpers: magnitude spectrum and orthonormal DCT.

use std::fmt;
use std::sync::Arc;

use num_complex::Complex32;
use rustfft::{Fft, FftPlanner};

use crate::config::{SPEC_NUM_FREQS, SPEC_WINDOW_SIZE};

// --- FFT ---

/// One-sided magnitude spectrum of a 320-sample block.
///
/// The FFT plan and its scratch space are allocated once; [`magnitude`]
/// itself only touches fixed-size stack buffers.
///
/// [`magnitude`]: SpectralAnalyzer::magnitude
pub struct SpectralAnalyzer {
    fft: Arc<dyn Fft<f32>>,
    scratch: Vec<Complex32>,
}

impl fmt::Debug for SpectralAnalyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpectralAnalyzer")
            .field("len", &SPEC_WINDOW_SIZE)
            .finish()
    }
}

impl Default for SpectralAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl SpectralAnalyzer {
    pub fn new() -> Self {
        let mut planner = FftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(SPEC_WINDOW_SIZE);
        let scratch = vec![Complex32::default(); fft.get_inplace_scratch_len()];
        Self { fft, scratch }
    }

    /// Magnitude of bins `0..=160` of the 320-point DFT of `input`.
    ///
    /// The result is the true amplitude of the normalized transform scaled
    /// back by the transform length, i.e. `|X[k]|` of the unnormalized DFT.
    ///
    /// Upstream C: dnn/osce_features.c:mag_spec_320_onesided
    pub fn magnitude(&mut self, out: &mut [f32; SPEC_NUM_FREQS], input: &[f32; SPEC_WINDOW_SIZE]) {
        let mut buffer = [Complex32::default(); SPEC_WINDOW_SIZE];
        for (b, &x) in buffer.iter_mut().zip(input.iter()) {
            b.re = x;
        }
        self.fft.process_with_scratch(&mut buffer, &mut self.scratch);
        for (o, c) in out.iter_mut().zip(&buffer[..SPEC_NUM_FREQS]) {
            *o = (c.re as f64).hypot(c.im as f64) as f32;
        }
    }
}

// --- DCT ---

/// Orthonormal type-II DCT over `N` values, with its inverse.
#[derive(Clone, Debug)]
pub struct Dct<const N: usize> {
    /// `table[j][i] = s_i * cos(pi * (j + 0.5) * i / N)`, with the
    /// orthonormal scale `s_0 = sqrt(1/N)`, `s_i = sqrt(2/N)` folded in.
    table: [[f32; N]; N],
}

impl<const N: usize> Default for Dct<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> Dct<N> {
    pub fn new() -> Self {
        let mut table = [[0.0f32; N]; N];
        let scale = (2.0f64 / N as f64).sqrt();
        for (j, row) in table.iter_mut().enumerate() {
            for (i, t) in row.iter_mut().enumerate() {
                let mut v = (std::f64::consts::PI * (j as f64 + 0.5) * i as f64 / N as f64).cos();
                if i == 0 {
                    v *= std::f64::consts::FRAC_1_SQRT_2;
                }
                *t = (v * scale) as f32;
            }
        }
        Self { table }
    }

    /// Type-II DCT.
    pub fn forward(&self, out: &mut [f32; N], input: &[f32; N]) {
        for (i, o) in out.iter_mut().enumerate() {
            *o = input
                .iter()
                .zip(self.table.iter())
                .map(|(x, row)| x * row[i])
                .sum();
        }
    }

    /// Inverse of [`forward`](Dct::forward) (type-III DCT).
    pub fn inverse(&self, out: &mut [f32; N], input: &[f32; N]) {
        for (o, row) in out.iter_mut().zip(self.table.iter()) {
            *o = input.iter().zip(row.iter()).map(|(x, t)| x * t).sum();
        }
    }
}
