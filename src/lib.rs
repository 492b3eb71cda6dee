//! Feature extraction for Opus Speech Coding Enhancement (OSCE).
//!
//! The LACE and NoLACE enhancement models post-process SILK decoded speech
//! conditioned on a 93-dimensional feature vector per 5 ms subframe. This
//! crate computes those vectors from the decoded signal and the decoder's
//! side information, one frame at a time, without per-call heap allocation.
//!
//! ```no_run
//! use osce_features::{FeatureConfig, FeatureExtractor, FrameContext, FrameFeatures, SignalType};
//!
//! let mut extractor = FeatureExtractor::new(FeatureConfig::default())?;
//! let mut out = FrameFeatures::default();
//!
//! let pcm = [0i16; 320];
//! let frame = FrameContext {
//!     num_subframes: 4,
//!     lpc_order: 16,
//!     signal_type: SignalType::Voiced,
//!     pred_coef_q12: &[[0; 16]; 2],
//!     pitch_lags: &[100; 4],
//!     ltp_coef_q14: &[0; 20],
//!     gains_q16: &[1 << 16; 4],
//!     pcm: &pcm,
//!     num_bits: 320,
//! };
//! extractor.calculate(&frame, &mut out)?;
//! assert_eq!(out.features().len(), 4 * osce_features::FEATURE_DIM);
//! # Ok::<(), osce_features::FeatureError>(())
//! ```

mod config;
mod enums;
mod error;
mod features;
pub mod filterbank;
pub mod freq;
mod pitch;
pub mod sink;
mod tables;

pub use config::{
    FeatureConfig, ACORR, ACORR_LENGTH, CLEAN_SPEC, CLEAN_SPEC_NUM_BANDS, FEATURES_MAX_HISTORY,
    FEATURE_DIM, LOG_GAIN, LTP, LTP_ORDER, MAX_LPC_ORDER, MAX_PITCH_HANGOVER, MAX_PITCH_LAG,
    MAX_SUBFRAMES, MIN_PITCH_LAG, NOISY_CEPSTRUM, NOISY_SPEC_NUM_BANDS, NO_PITCH_VALUE,
    SPEC_NUM_FREQS, SPEC_WINDOW_SIZE, SUBFRAME_SIZE,
};
pub use enums::{NumbitsMode, SignalType};
pub use error::{FeatureError, Result};
pub use features::{
    FeatureExtractor, FeatureState, FrameContext, FrameFeatures, NumbitsSmoother, SignalView,
    SubframeFeatures,
};
pub use pitch::{pitch_acorr, PitchPostprocessor};
pub use sink::{F32Writer, FeatureSink};
