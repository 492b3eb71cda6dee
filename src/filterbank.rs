//! Trapezoidal filterbank projection of a one-sided magnitude spectrum.

use crate::config::{CLEAN_SPEC_NUM_BANDS, NOISY_SPEC_NUM_BANDS, SPEC_NUM_FREQS};
use crate::error::{FeatureError, Result};
use crate::tables::{BAND_WEIGHTS_CLEAN, BAND_WEIGHTS_NOISY, CENTER_BINS_CLEAN, CENTER_BINS_NOISY};

/// A bank of `N` overlapping triangular bands over the 161-bin spectrum.
///
/// Band `b` peaks at `center_bins[b]` and falls off linearly to zero at the
/// neighbouring centers, scaled by `weights[b]`.
#[derive(Clone, Debug, PartialEq)]
pub struct Filterbank<const N: usize> {
    center_bins: [usize; N],
    weights: [f32; N],
}

/// High resolution bank applied to the LPC envelope.
pub type CleanFilterbank = Filterbank<CLEAN_SPEC_NUM_BANDS>;
/// Coarse bank applied to the decoded signal.
pub type NoisyFilterbank = Filterbank<NOISY_SPEC_NUM_BANDS>;

impl<const N: usize> Filterbank<N> {
    /// Validates and wraps a filterbank definition.
    ///
    /// Center bins must be strictly increasing and inside the spectrum, and
    /// weights finite and non-negative.
    pub fn new(center_bins: [usize; N], weights: [f32; N]) -> Result<Self> {
        if N < 2 {
            return Err(FeatureError::InvalidFilterbank("fewer than two bands"));
        }
        if center_bins.windows(2).any(|w| w[0] >= w[1]) {
            return Err(FeatureError::InvalidFilterbank(
                "center bins not strictly increasing",
            ));
        }
        if center_bins[N - 1] >= SPEC_NUM_FREQS {
            return Err(FeatureError::InvalidFilterbank(
                "center bin outside spectrum",
            ));
        }
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(FeatureError::InvalidFilterbank("invalid band weight"));
        }
        Ok(Self {
            center_bins,
            weights,
        })
    }

    pub fn center_bins(&self) -> &[usize; N] {
        &self.center_bins
    }

    pub fn weights(&self) -> &[f32; N] {
        &self.weights
    }

    /// Projects `x_in` onto the bands, accumulating left to right.
    ///
    /// Upstream C: dnn/osce_features.c:apply_filterbank
    pub fn apply(&self, x_out: &mut [f32; N], x_in: &[f32; SPEC_NUM_FREQS]) {
        let c = &self.center_bins;
        let w = &self.weights;

        x_out[0] = 0.0;
        for b in 0..N - 1 {
            x_out[b + 1] = 0.0;
            let width = (c[b + 1] - c[b]) as f32;
            for i in c[b]..c[b + 1] {
                let frac = (c[b + 1] - i) as f32 / width;
                x_out[b] += w[b] * frac * x_in[i];
                x_out[b + 1] += w[b + 1] * (1.0 - frac) * x_in[i];
            }
        }
        x_out[N - 1] += w[N - 1] * x_in[c[N - 1]];
    }
}

impl CleanFilterbank {
    pub fn clean() -> Result<Self> {
        Self::new(CENTER_BINS_CLEAN, BAND_WEIGHTS_CLEAN)
    }
}

impl NoisyFilterbank {
    pub fn noisy() -> Result<Self> {
        Self::new(CENTER_BINS_NOISY, BAND_WEIGHTS_NOISY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Band sum for an all-ones spectrum, in closed form.
    ///
    /// A pair of centers `d` bins apart hands `(d + 1) / 2` of unit mass to
    /// the left band and `(d - 1) / 2` to the right band.
    fn unit_spectrum_mass<const N: usize>(fb: &Filterbank<N>) -> f64 {
        let c = fb.center_bins();
        let w = fb.weights();
        let mut total = w[N - 1] as f64;
        for b in 0..N - 1 {
            let d = (c[b + 1] - c[b]) as f64;
            total += w[b] as f64 * (d + 1.0) / 2.0 + w[b + 1] as f64 * (d - 1.0) / 2.0;
        }
        total
    }

    fn check_energy_conservation<const N: usize>(fb: &Filterbank<N>) {
        let ones = [1.0f32; SPEC_NUM_FREQS];
        let mut bands = [0.0f32; N];
        fb.apply(&mut bands, &ones);
        let sum: f64 = bands.iter().map(|&b| b as f64).sum();
        let expected = unit_spectrum_mass(fb);
        assert!(
            (sum - expected).abs() < 1e-4 * expected,
            "sum {sum}, expected {expected}"
        );
    }

    #[test]
    fn clean_energy_conservation() {
        check_energy_conservation(&CleanFilterbank::clean().unwrap());
    }

    #[test]
    fn noisy_energy_conservation() {
        check_energy_conservation(&NoisyFilterbank::noisy().unwrap());
    }

    #[test]
    fn impulse_at_center_hits_single_band() {
        let fb = NoisyFilterbank::noisy().unwrap();
        for b in 0..NOISY_SPEC_NUM_BANDS {
            let mut x = [0.0f32; SPEC_NUM_FREQS];
            x[fb.center_bins()[b]] = 1.0;
            let mut bands = [0.0f32; NOISY_SPEC_NUM_BANDS];
            fb.apply(&mut bands, &x);
            for (j, v) in bands.iter().enumerate() {
                let expected = if j == b { fb.weights()[b] } else { 0.0 };
                assert!((v - expected).abs() < 1e-7, "band {j} for center {b}: {v}");
            }
        }
    }

    #[test]
    fn bin_between_centers_is_split() {
        let fb = Filterbank::new([0, 4, 8], [1.0, 1.0, 1.0]).unwrap();
        let mut x = [0.0f32; SPEC_NUM_FREQS];
        x[1] = 1.0;
        let mut bands = [0.0f32; 3];
        fb.apply(&mut bands, &x);
        assert!((bands[0] - 0.75).abs() < 1e-7);
        assert!((bands[1] - 0.25).abs() < 1e-7);
        assert_eq!(bands[2], 0.0);
    }

    #[test]
    fn rejects_bad_definitions() {
        assert_eq!(
            Filterbank::new([0], [1.0]),
            Err(FeatureError::InvalidFilterbank("fewer than two bands"))
        );
        assert_eq!(
            Filterbank::new([0, 4, 4], [1.0; 3]),
            Err(FeatureError::InvalidFilterbank(
                "center bins not strictly increasing"
            ))
        );
        assert_eq!(
            Filterbank::new([0, 4, SPEC_NUM_FREQS], [1.0; 3]),
            Err(FeatureError::InvalidFilterbank("center bin outside spectrum"))
        );
        assert_eq!(
            Filterbank::new([0, 4, 8], [1.0, f32::NAN, 1.0]),
            Err(FeatureError::InvalidFilterbank("invalid band weight"))
        );
    }
}
