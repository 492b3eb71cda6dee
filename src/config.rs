//! Frame geometry, feature layout and runtime configuration.

use std::ops::Range;

use crate::enums::NumbitsMode;
use crate::error::{FeatureError, Result};

// ========== Geometry ==========

/// Samples per subframe (5 ms at 16 kHz).
pub const SUBFRAME_SIZE: usize = 80;
/// Maximum number of subframes in one decoded frame (20 ms).
pub const MAX_SUBFRAMES: usize = 4;
/// Spectral analysis window length.
pub const SPEC_WINDOW_SIZE: usize = 320;
/// One-sided spectrum length, including DC and Nyquist.
pub const SPEC_NUM_FREQS: usize = SPEC_WINDOW_SIZE / 2 + 1;
/// Samples of lookback kept between frames.
pub const FEATURES_MAX_HISTORY: usize = 350;
/// Maximum LPC order delivered by the decoder.
pub const MAX_LPC_ORDER: usize = 16;
/// Long-term prediction filter order.
pub const LTP_ORDER: usize = 5;

/// Lag published for subframes without a usable pitch.
pub const NO_PITCH_VALUE: i32 = 7;
/// Smallest raw pitch lag accepted on voiced subframes (2 ms at 8 kHz).
pub const MIN_PITCH_LAG: i32 = 16;
/// Largest raw pitch lag accepted on voiced subframes (18 ms at 16 kHz).
pub const MAX_PITCH_LAG: i32 = 288;
/// Upper bound for the configurable pitch hangover.
pub const MAX_PITCH_HANGOVER: usize = 8;

// ========== Feature layout ==========

pub const CLEAN_SPEC_NUM_BANDS: usize = 64;
pub const NOISY_SPEC_NUM_BANDS: usize = 18;

/// Autocorrelation taps around the pitch lag, offsets `-2..=2`.
pub const ACORR_LENGTH: usize = 5;
pub(crate) const ACORR_HALF_SPAN: usize = ACORR_LENGTH / 2;

pub const CLEAN_SPEC: Range<usize> = 0..CLEAN_SPEC_NUM_BANDS;
pub const NOISY_CEPSTRUM: Range<usize> =
    CLEAN_SPEC.end..CLEAN_SPEC.end + NOISY_SPEC_NUM_BANDS;
pub const ACORR: Range<usize> = NOISY_CEPSTRUM.end..NOISY_CEPSTRUM.end + ACORR_LENGTH;
pub const LTP: Range<usize> = ACORR.end..ACORR.end + LTP_ORDER;
pub const LOG_GAIN: usize = LTP.end;

/// Per-subframe feature dimension.
pub const FEATURE_DIM: usize = LOG_GAIN + 1;

const _: () = assert!(FEATURE_DIM == 93);
const _: () = assert!(FEATURES_MAX_HISTORY >= SPEC_WINDOW_SIZE / 2);
const _: () = assert!(MAX_PITCH_LAG as usize + ACORR_HALF_SPAN <= FEATURES_MAX_HISTORY);
const _: () = assert!(NO_PITCH_VALUE as usize > ACORR_HALF_SPAN);
const _: () = assert!(MIN_PITCH_LAG as usize > ACORR_HALF_SPAN);

// ========== Runtime configuration ==========

/// Runtime options of a [`FeatureExtractor`](crate::FeatureExtractor).
///
/// The defaults match the feature layout the released LACE and NoLACE
/// models were trained on.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct FeatureConfig {
    /// Number of unvoiced subframes following a voiced one that still
    /// publish the last voiced pitch lag. `0` disables the hangover.
    pub pitch_hangover: usize,
    /// Content of the second numbits slot.
    pub numbits: NumbitsMode,
}

impl FeatureConfig {
    pub fn with_pitch_hangover(mut self, pitch_hangover: usize) -> Self {
        self.pitch_hangover = pitch_hangover;
        self
    }

    pub fn with_numbits(mut self, numbits: NumbitsMode) -> Self {
        self.numbits = numbits;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.pitch_hangover > MAX_PITCH_HANGOVER {
            return Err(FeatureError::InvalidConfig("pitch hangover too long"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segments_are_contiguous() {
        let segments = [CLEAN_SPEC, NOISY_CEPSTRUM, ACORR, LTP, LOG_GAIN..LOG_GAIN + 1];
        assert_eq!(segments[0].start, 0);
        for pair in segments.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
        assert_eq!(segments[segments.len() - 1].end, FEATURE_DIM);
    }

    #[test]
    fn default_config_disables_hangover() {
        let config = FeatureConfig::default();
        assert_eq!(config.pitch_hangover, 0);
        assert_eq!(config.numbits, NumbitsMode::Smoothed);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_long_hangover() {
        let config = FeatureConfig::default().with_pitch_hangover(MAX_PITCH_HANGOVER + 1);
        assert_eq!(
            config.validate(),
            Err(FeatureError::InvalidConfig("pitch hangover too long"))
        );
        assert!(FeatureConfig::default()
            .with_pitch_hangover(MAX_PITCH_HANGOVER)
            .validate()
            .is_ok());
    }
}
