//! Pitch lag postprocessing and normalized autocorrelation around the lag.

use crate::config::{ACORR_HALF_SPAN, ACORR_LENGTH, NO_PITCH_VALUE, SUBFRAME_SIZE};
use crate::enums::SignalType;
use crate::features::SignalView;

/// Per-stream pitch lag smoother.
///
/// On voiced subframes the raw lag is passed through and remembered. After a
/// voiced run, up to `hangover - 1` further unvoiced subframes keep the last
/// voiced lag before the stream falls back to [`NO_PITCH_VALUE`]. With a
/// hangover of 0 every unvoiced subframe gets [`NO_PITCH_VALUE`].
#[derive(Clone, Debug, PartialEq)]
pub struct PitchPostprocessor {
    hangover: usize,
    last_lag: i32,
    last_type: SignalType,
    hangover_count: usize,
}

impl PitchPostprocessor {
    pub fn new(hangover: usize) -> Self {
        Self {
            hangover,
            last_lag: 0,
            last_type: SignalType::NoVoiceActivity,
            hangover_count: 0,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.hangover);
    }

    pub fn hangover(&self) -> usize {
        self.hangover
    }

    /// Last lag seen on a voiced subframe, `0` before the first one.
    pub fn last_lag(&self) -> i32 {
        self.last_lag
    }

    pub fn last_type(&self) -> SignalType {
        self.last_type
    }

    pub fn hangover_count(&self) -> usize {
        self.hangover_count
    }

    /// Returns the lag to publish for a subframe with raw lag `lag`.
    ///
    /// Upstream C: dnn/osce_features.c:pitch_postprocessing
    ///
    /// # Panics
    ///
    /// If the resulting lag is 0, which can only happen when the stream state
    /// was corrupted.
    pub fn process(&mut self, lag: i32, signal_type: SignalType) -> i32 {
        let hangover_on = self.hangover > 0;
        let new_lag = if !signal_type.is_voiced() && hangover_on && self.last_type.is_voiced() {
            // enter hangover
            if self.hangover_count < self.hangover {
                self.hangover_count = (self.hangover_count + 1) % self.hangover;
                self.last_lag
            } else {
                NO_PITCH_VALUE
            }
        } else if !signal_type.is_voiced() && hangover_on && self.hangover_count > 0 {
            // continue hangover
            self.hangover_count = (self.hangover_count + 1) % self.hangover;
            self.last_lag
        } else if !signal_type.is_voiced() {
            self.hangover_count = 0;
            NO_PITCH_VALUE
        } else {
            self.last_lag = lag;
            self.hangover_count = 0;
            lag
        };

        self.last_type = signal_type;

        assert_ne!(new_lag, 0, "postprocessed pitch lag must not be zero");
        new_lag
    }
}

/// Normalized cross-correlation of the subframe at `view` with its copy
/// delayed by `lag + k`, for `k` in `-2..=2`.
///
/// Every tap lies in `[-1, 1]` up to rounding; the `1e-9` term keeps silent
/// subframes at zero instead of dividing by zero.
///
/// Upstream C: dnn/osce_features.c:calculate_acorr
pub fn pitch_acorr(acorr: &mut [f32; ACORR_LENGTH], view: &SignalView<'_>, lag: usize) {
    debug_assert!(lag > ACORR_HALF_SPAN);
    let x = view.slice(0, SUBFRAME_SIZE);
    let xx: f32 = x.iter().map(|v| v * v).sum();

    for (tap, a) in acorr.iter_mut().enumerate() {
        // y[n] = x[n - lag + k], k = tap - 2
        let delay = lag + ACORR_HALF_SPAN - tap;
        let y = view.slice(-(delay as isize), SUBFRAME_SIZE);
        let mut xy = 0.0f32;
        let mut yy = 0.0f32;
        for (&xn, &yn) in x.iter().zip(y.iter()) {
            xy += xn * yn;
            yy += yn * yn;
        }
        *a = (xy as f64 / ((xx * yy + 1e-9) as f64).sqrt()) as f32;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MAX_PITCH_HANGOVER;

    const V: SignalType = SignalType::Voiced;
    const U: SignalType = SignalType::Unvoiced;

    #[test]
    fn hangover_cycle() {
        let mut pp = PitchPostprocessor::new(2);
        let mut lags = Vec::new();
        let mut counts = Vec::new();
        for (lag, t) in [(50, V), (0, U), (0, U), (0, U)] {
            lags.push(pp.process(lag, t));
            counts.push(pp.hangover_count());
        }
        assert_eq!(lags, [50, 50, 50, NO_PITCH_VALUE]);
        assert_eq!(counts, [0, 1, 0, 0]);

        assert_eq!(pp.process(80, V), 80);
        assert_eq!(pp.last_lag(), 80);
        assert_eq!(pp.hangover_count(), 0);
    }

    #[test]
    fn hangover_holds_lag_for_limit_subframes() {
        for limit in 1..=MAX_PITCH_HANGOVER {
            let mut pp = PitchPostprocessor::new(limit);
            assert_eq!(pp.process(50, V), 50);
            for k in 0..limit {
                assert_eq!(pp.process(0, U), 50, "limit {limit}, unvoiced subframe {k}");
            }
            assert_eq!(pp.process(0, U), NO_PITCH_VALUE, "limit {limit}");
            assert_eq!(pp.hangover_count(), 0);
        }
    }

    #[test]
    fn disabled_hangover_drops_pitch_immediately() {
        let mut pp = PitchPostprocessor::new(0);
        assert_eq!(pp.process(120, V), 120);
        assert_eq!(pp.process(0, U), NO_PITCH_VALUE);
        assert_eq!(pp.process(0, SignalType::NoVoiceActivity), NO_PITCH_VALUE);
        assert_eq!(pp.hangover_count(), 0);
        assert_eq!(pp.last_lag(), 120);
        assert_eq!(pp.last_type(), SignalType::NoVoiceActivity);
    }

    #[test]
    fn voiced_after_hangover_resets_count() {
        let mut pp = PitchPostprocessor::new(4);
        pp.process(60, V);
        assert_eq!(pp.process(0, U), 60);
        assert_eq!(pp.process(0, U), 60);
        assert_eq!(pp.hangover_count(), 2);
        assert_eq!(pp.process(70, V), 70);
        assert_eq!(pp.hangover_count(), 0);
        assert_eq!(pp.process(0, U), 70);
    }

    #[test]
    fn unvoiced_start_has_no_pitch() {
        let mut pp = PitchPostprocessor::new(2);
        assert_eq!(pp.process(0, U), NO_PITCH_VALUE);
        assert_eq!(pp.hangover_count(), 0);
    }

    #[test]
    fn reset_keeps_hangover_setting() {
        let mut pp = PitchPostprocessor::new(3);
        pp.process(40, V);
        pp.process(0, U);
        pp.reset();
        assert_eq!(pp, PitchPostprocessor::new(3));
    }

    #[test]
    #[should_panic(expected = "must not be zero")]
    fn zero_voiced_lag_is_fatal() {
        let mut pp = PitchPostprocessor::new(0);
        pp.process(0, V);
    }

    fn periodic(period: usize, len: usize) -> Vec<f32> {
        (0..len)
            .map(|n| (2.0 * std::f32::consts::PI * n as f32 / period as f32).sin())
            .collect()
    }

    #[test]
    fn acorr_peaks_at_true_period() {
        let buf = periodic(40, 400);
        let view = SignalView::new(&buf, 300, 300, SUBFRAME_SIZE);
        let mut acorr = [0.0f32; ACORR_LENGTH];
        pitch_acorr(&mut acorr, &view, 40);
        assert!((acorr[2] - 1.0).abs() < 1e-3, "{acorr:?}");
        assert!(acorr[0] < acorr[1] && acorr[1] < acorr[2]);
        assert!(acorr[4] < acorr[3] && acorr[3] < acorr[2]);
    }

    #[test]
    fn acorr_of_silence_is_zero() {
        let buf = vec![0.0f32; 400];
        let view = SignalView::new(&buf, 300, 300, SUBFRAME_SIZE);
        let mut acorr = [1.0f32; ACORR_LENGTH];
        pitch_acorr(&mut acorr, &view, NO_PITCH_VALUE as usize);
        assert_eq!(acorr, [0.0; ACORR_LENGTH]);
    }
}
