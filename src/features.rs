//! Per-subframe feature assembly for the OSCE enhancement models.
//!
//! [`FeatureExtractor::calculate`] runs once per decoded SILK frame and
//! produces one [`FEATURE_DIM`]-dimensional vector per 5 ms subframe:
//!
//! | segment | range |
//! |---|---|
//! | clean spectral envelope (from LPC) | [`CLEAN_SPEC`] |
//! | noisy cepstrum (from decoded signal) | [`NOISY_CEPSTRUM`] |
//! | autocorrelation around the pitch lag | [`ACORR`] |
//! | LTP coefficients | [`LTP`] |
//! | log gain | [`LOG_GAIN`] |
//!
//! The two spectral segments are recomputed on even subframes only and
//! copied verbatim into the following odd subframe.

use tracing::{debug, trace};

use crate::config::*;
use crate::enums::{NumbitsMode, SignalType};
use crate::error::{FeatureError, Result};
use crate::filterbank::{CleanFilterbank, NoisyFilterbank};
use crate::freq::{Dct, SpectralAnalyzer};
use crate::pitch::{pitch_acorr, PitchPostprocessor};
use crate::sink::FeatureSink;
use crate::tables::window;

const HALF_WINDOW: usize = SPEC_WINDOW_SIZE / 2;
const WORK_BUFFER_SIZE: usize = FEATURES_MAX_HISTORY + MAX_SUBFRAMES * SUBFRAME_SIZE;

// ========== Signal view ==========

/// A read-only window into the working buffer around a base index.
///
/// The window `base - lookback .. base + lookahead` is checked once on
/// construction; [`slice`](SignalView::slice) offsets are relative to `base`.
#[derive(Clone, Copy, Debug)]
pub struct SignalView<'a> {
    buf: &'a [f32],
    base: usize,
    lookback: usize,
    lookahead: usize,
}

impl<'a> SignalView<'a> {
    /// # Panics
    ///
    /// If the requested window does not fit into `buf`.
    pub fn new(buf: &'a [f32], base: usize, lookback: usize, lookahead: usize) -> Self {
        assert!(
            base >= lookback && base + lookahead <= buf.len(),
            "signal view [{}-{lookback}, {}+{lookahead}) outside buffer of {}",
            base,
            base,
            buf.len()
        );
        Self {
            buf,
            base,
            lookback,
            lookahead,
        }
    }

    /// `len` samples starting `offset` samples from the base.
    #[inline]
    pub fn slice(&self, offset: isize, len: usize) -> &'a [f32] {
        debug_assert!(
            offset >= -(self.lookback as isize)
                && offset + len as isize <= self.lookahead as isize,
            "signal view access at {offset}+{len} outside [-{}, {})",
            self.lookback,
            self.lookahead
        );
        let start = self.base.wrapping_add_signed(offset);
        &self.buf[start..start + len]
    }
}

// ========== Bit count smoothing ==========

/// Exponential moving average of the per-frame bit count.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NumbitsSmoother {
    smooth: f32,
    mode: NumbitsMode,
}

impl NumbitsSmoother {
    pub fn new(mode: NumbitsMode) -> Self {
        Self { smooth: 0.0, mode }
    }

    pub fn smoothed(&self) -> f32 {
        self.smooth
    }

    /// Folds in one frame and returns the published `[raw, second]` pair.
    pub fn update(&mut self, num_bits: i32) -> [f32; 2] {
        let raw = num_bits as f32;
        self.smooth = 0.9 * self.smooth + 0.1 * raw;
        match self.mode {
            NumbitsMode::Smoothed => [raw, self.smooth],
            NumbitsMode::Raw => [raw, raw],
        }
    }
}

// ========== Stream state ==========

/// State carried from one frame to the next within a decoding session.
///
/// Upstream C: dnn/osce_structs.h:OSCEFeatureState
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureState {
    signal_history: [f32; FEATURES_MAX_HISTORY],
    numbits: NumbitsSmoother,
    pitch: PitchPostprocessor,
}

impl FeatureState {
    pub fn new(config: &FeatureConfig) -> Self {
        Self {
            signal_history: [0.0; FEATURES_MAX_HISTORY],
            numbits: NumbitsSmoother::new(config.numbits),
            pitch: PitchPostprocessor::new(config.pitch_hangover),
        }
    }

    /// The last [`FEATURES_MAX_HISTORY`] normalized samples seen.
    pub fn signal_history(&self) -> &[f32; FEATURES_MAX_HISTORY] {
        &self.signal_history
    }

    pub fn numbits_smooth(&self) -> f32 {
        self.numbits.smoothed()
    }

    pub fn pitch(&self) -> &PitchPostprocessor {
        &self.pitch
    }
}

// ========== Frame input ==========

/// Decoder side information and output for one frame.
///
/// Fixed-point scales: PCM Q15, LPC Q12, LTP Q14, gains Q16.
#[derive(Clone, Copy, Debug)]
pub struct FrameContext<'a> {
    /// 2 (10 ms) or 4 (20 ms).
    pub num_subframes: usize,
    pub lpc_order: usize,
    pub signal_type: SignalType,
    /// Quantized LPC coefficients, one row per half frame.
    pub pred_coef_q12: &'a [[i16; MAX_LPC_ORDER]],
    /// Raw pitch lag per subframe.
    pub pitch_lags: &'a [i32],
    /// `LTP_ORDER` coefficients per subframe.
    pub ltp_coef_q14: &'a [i16],
    pub gains_q16: &'a [i32],
    /// Decoded speech, `num_subframes * SUBFRAME_SIZE` samples.
    pub pcm: &'a [i16],
    /// Size of the SILK payload in bits.
    pub num_bits: i32,
}

fn check_len(name: &'static str, actual: usize, expected: usize) -> Result<()> {
    if actual < expected {
        return Err(FeatureError::BufferLength {
            name,
            expected,
            actual,
        });
    }
    Ok(())
}

impl FrameContext<'_> {
    /// Checks the frame geometry against the slices it carries.
    pub fn validate(&self) -> Result<()> {
        let n = self.num_subframes;
        if n != 2 && n != MAX_SUBFRAMES {
            return Err(FeatureError::InvalidSubframeCount(n));
        }
        if self.lpc_order == 0 || self.lpc_order > MAX_LPC_ORDER {
            return Err(FeatureError::InvalidLpcOrder(self.lpc_order));
        }
        check_len("pred_coef_q12", self.pred_coef_q12.len(), n / 2)?;
        check_len("pitch_lags", self.pitch_lags.len(), n)?;
        check_len("ltp_coef_q14", self.ltp_coef_q14.len(), n * LTP_ORDER)?;
        check_len("gains_q16", self.gains_q16.len(), n)?;
        check_len("pcm", self.pcm.len(), n * SUBFRAME_SIZE)?;
        if self.signal_type.is_voiced() {
            if let Some(&lag) = self.pitch_lags[..n]
                .iter()
                .find(|&&lag| !(MIN_PITCH_LAG..=MAX_PITCH_LAG).contains(&lag))
            {
                return Err(FeatureError::PitchLagOutOfRange(lag));
            }
        }
        Ok(())
    }
}

// ========== Frame output ==========

/// Features, bit counts and pitch periods of one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameFeatures {
    num_subframes: usize,
    features: [f32; MAX_SUBFRAMES * FEATURE_DIM],
    numbits: [f32; 2],
    periods: [i32; MAX_SUBFRAMES],
}

impl Default for FrameFeatures {
    fn default() -> Self {
        Self {
            num_subframes: 0,
            features: [0.0; MAX_SUBFRAMES * FEATURE_DIM],
            numbits: [0.0; 2],
            periods: [0; MAX_SUBFRAMES],
        }
    }
}

impl FrameFeatures {
    pub fn num_subframes(&self) -> usize {
        self.num_subframes
    }

    /// All subframe vectors back to back, `num_subframes * FEATURE_DIM` values.
    pub fn features(&self) -> &[f32] {
        &self.features[..self.num_subframes * FEATURE_DIM]
    }

    /// `[raw, smoothed]` bit count (see [`NumbitsMode`]).
    pub fn numbits(&self) -> [f32; 2] {
        self.numbits
    }

    /// Postprocessed pitch lag per subframe.
    pub fn periods(&self) -> &[i32] {
        &self.periods[..self.num_subframes]
    }

    /// # Panics
    ///
    /// If `k >= num_subframes`.
    pub fn subframe(&self, k: usize) -> SubframeFeatures<'_> {
        assert!(k < self.num_subframes, "subframe {k} of {}", self.num_subframes);
        SubframeFeatures(&self.features[k * FEATURE_DIM..(k + 1) * FEATURE_DIM])
    }
}

/// Named segments of one subframe vector.
#[derive(Clone, Copy, Debug)]
pub struct SubframeFeatures<'a>(&'a [f32]);

impl<'a> SubframeFeatures<'a> {
    pub fn as_slice(&self) -> &'a [f32] {
        self.0
    }

    pub fn clean_spectrum(&self) -> &'a [f32] {
        &self.0[CLEAN_SPEC]
    }

    pub fn noisy_cepstrum(&self) -> &'a [f32] {
        &self.0[NOISY_CEPSTRUM]
    }

    pub fn acorr(&self) -> &'a [f32] {
        &self.0[ACORR]
    }

    pub fn ltp(&self) -> &'a [f32] {
        &self.0[LTP]
    }

    pub fn log_gain(&self) -> f32 {
        self.0[LOG_GAIN]
    }
}

// ========== Extractor ==========

/// Feature extractor for one decoding session.
///
/// Owns the analysis resources (FFT plan, DCT table, filterbanks) together
/// with the [`FeatureState`] of the stream. Concurrent sessions need their
/// own instances.
#[derive(Debug)]
pub struct FeatureExtractor {
    config: FeatureConfig,
    analyzer: SpectralAnalyzer,
    dct: Dct<NOISY_SPEC_NUM_BANDS>,
    clean: CleanFilterbank,
    noisy: NoisyFilterbank,
    state: FeatureState,
}

impl FeatureExtractor {
    pub fn new(config: FeatureConfig) -> Result<Self> {
        config.validate()?;
        debug!(
            pitch_hangover = config.pitch_hangover,
            numbits = ?config.numbits,
            "creating OSCE feature extractor"
        );
        Ok(Self {
            config,
            analyzer: SpectralAnalyzer::new(),
            dct: Dct::new(),
            clean: CleanFilterbank::clean()?,
            noisy: NoisyFilterbank::noisy()?,
            state: FeatureState::new(&config),
        })
    }

    pub fn config(&self) -> &FeatureConfig {
        &self.config
    }

    pub fn state(&self) -> &FeatureState {
        &self.state
    }

    pub fn dct(&self) -> &Dct<NOISY_SPEC_NUM_BANDS> {
        &self.dct
    }

    /// Drops all stream history, e.g. after a decoder reset.
    pub fn reset(&mut self) {
        debug!("resetting OSCE feature state");
        self.state = FeatureState::new(&self.config);
    }

    /// Log spectral envelope of the all-pole filter `1 / A(z)`.
    ///
    /// `a_q12` holds the sign-negated Q12 predictor coefficients, so the
    /// impulse response of `A(z)` is `[1, -a_q12[0] / 4096, ...]`.
    ///
    /// Upstream C: dnn/osce_features.c:calculate_log_spectrum_from_lpc
    pub fn lpc_log_spectrum(&mut self, spec: &mut [f32; CLEAN_SPEC_NUM_BANDS], a_q12: &[i16]) {
        debug_assert!(a_q12.len() < SPEC_WINDOW_SIZE);
        let mut buffer = [0.0f32; SPEC_WINDOW_SIZE];
        buffer[0] = 1.0;
        for (b, &a) in buffer[1..].iter_mut().zip(a_q12) {
            *b = -(a as f32) / (1 << 12) as f32;
        }

        let mut mag = [0.0f32; SPEC_NUM_FREQS];
        self.analyzer.magnitude(&mut mag, &buffer);
        for m in mag.iter_mut() {
            *m = 1.0 / (*m + 1e-9);
        }

        self.clean.apply(spec, &mag);
        for s in spec.iter_mut() {
            *s = (0.3f32 as f64 * ((*s + 1e-9) as f64).ln()) as f32;
        }
    }

    /// Log band energies of the windowed 320-sample block `signal`.
    pub fn log_bands(&mut self, bands: &mut [f32; NOISY_SPEC_NUM_BANDS], signal: &[f32]) {
        debug_assert_eq!(signal.len(), SPEC_WINDOW_SIZE);
        let mut buffer = [0.0f32; SPEC_WINDOW_SIZE];
        for (n, (b, &x)) in buffer.iter_mut().zip(signal).enumerate() {
            *b = window(n) * x;
        }

        let mut mag = [0.0f32; SPEC_NUM_FREQS];
        self.analyzer.magnitude(&mut mag, &buffer);

        self.noisy.apply(bands, &mag);
        for b in bands.iter_mut() {
            *b = ((*b + 1e-9) as f64).ln() as f32;
        }
    }

    /// Cepstrum of the 320-sample block `signal`: DCT-II of [`log_bands`].
    ///
    /// [`log_bands`]: FeatureExtractor::log_bands
    ///
    /// Upstream C: dnn/osce_features.c:calculate_cepstrum
    pub fn cepstrum(&mut self, cepstrum: &mut [f32; NOISY_SPEC_NUM_BANDS], signal: &[f32]) {
        let mut bands = [0.0f32; NOISY_SPEC_NUM_BANDS];
        self.log_bands(&mut bands, signal);
        self.dct.forward(cepstrum, &bands);
    }

    /// Computes the features of one frame into `out`.
    ///
    /// On error, neither `out` nor the stream state is modified.
    pub fn calculate(&mut self, frame: &FrameContext<'_>, out: &mut FrameFeatures) -> Result<()> {
        self.calculate_with_sink(frame, out, None)
    }

    /// Like [`calculate`](FeatureExtractor::calculate), additionally handing
    /// every finished subframe vector to `sink`.
    ///
    /// Upstream C: dnn/osce_features.c:osce_calculate_features
    pub fn calculate_with_sink(
        &mut self,
        frame: &FrameContext<'_>,
        out: &mut FrameFeatures,
        mut sink: Option<&mut dyn FeatureSink>,
    ) -> Result<()> {
        frame.validate()?;

        let num_subframes = frame.num_subframes;
        let num_samples = num_subframes * SUBFRAME_SIZE;
        trace!(
            num_subframes,
            signal_type = ?frame.signal_type,
            num_bits = frame.num_bits,
            "calculating OSCE features"
        );

        out.num_subframes = num_subframes;
        out.numbits = self.state.numbits.update(frame.num_bits);

        let mut work = [0.0f32; WORK_BUFFER_SIZE];
        work[..FEATURES_MAX_HISTORY].copy_from_slice(&self.state.signal_history);
        for (w, &x) in work[FEATURES_MAX_HISTORY..]
            .iter_mut()
            .zip(&frame.pcm[..num_samples])
        {
            *w = x as f32 / (1 << 15) as f32;
        }
        let buffer = &work[..FEATURES_MAX_HISTORY + num_samples];

        for k in 0..num_subframes {
            let base = FEATURES_MAX_HISTORY + k * SUBFRAME_SIZE;
            let (done, rest) = out.features.split_at_mut(k * FEATURE_DIM);
            let pfeatures = &mut rest[..FEATURE_DIM];
            pfeatures.fill(0.0);

            // spectral segments, updated every other subframe
            if k % 2 == 0 {
                let mut spec = [0.0f32; CLEAN_SPEC_NUM_BANDS];
                self.lpc_log_spectrum(&mut spec, &frame.pred_coef_q12[k / 2][..frame.lpc_order]);
                pfeatures[CLEAN_SPEC].copy_from_slice(&spec);

                let window_view = SignalView::new(buffer, base, HALF_WINDOW, HALF_WINDOW);
                let mut ceps = [0.0f32; NOISY_SPEC_NUM_BANDS];
                self.cepstrum(&mut ceps, window_view.slice(-(HALF_WINDOW as isize), SPEC_WINDOW_SIZE));
                pfeatures[NOISY_CEPSTRUM].copy_from_slice(&ceps);
            } else {
                let prev = &done[(k - 1) * FEATURE_DIM..];
                pfeatures[CLEAN_SPEC].copy_from_slice(&prev[CLEAN_SPEC]);
                pfeatures[NOISY_CEPSTRUM].copy_from_slice(&prev[NOISY_CEPSTRUM]);
            }

            let period = self
                .state
                .pitch
                .process(frame.pitch_lags[k], frame.signal_type);
            out.periods[k] = period;

            let view = SignalView::new(buffer, base, FEATURES_MAX_HISTORY, SUBFRAME_SIZE);
            let mut acorr = [0.0f32; ACORR_LENGTH];
            pitch_acorr(&mut acorr, &view, period as usize);
            pfeatures[ACORR].copy_from_slice(&acorr);

            let ltp = &frame.ltp_coef_q14[k * LTP_ORDER..(k + 1) * LTP_ORDER];
            for (f, &c) in pfeatures[LTP].iter_mut().zip(ltp) {
                *f = c as f32 / (1 << 14) as f32;
            }

            let gain = frame.gains_q16[k] as f32 / (1u32 << 16) as f32;
            pfeatures[LOG_GAIN] = ((gain + 1e-9) as f64).ln() as f32;

            if let Some(sink) = sink.as_mut() {
                sink.record(k, pfeatures);
            }
        }

        self.state
            .signal_history
            .copy_from_slice(&buffer[num_samples..num_samples + FEATURES_MAX_HISTORY]);
        Ok(())
    }
}
