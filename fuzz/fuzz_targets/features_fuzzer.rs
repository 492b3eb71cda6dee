//! OSCE feature extraction fuzzer.
//!
//! Byte 0 selects the configuration, the rest is a sequence of frames:
//!   byte 0     : bit 0 subframe count (2/4), bits 1..2 signal type
//!   byte 1     : LPC order
//!   bytes 2..3 : bit count (little-endian)
//!   then i16 pitch lags, LPC rows, LTP coefficients, i32 gains and PCM,
//!   all little-endian. Missing bytes read as zero.
//!
//! Run with: cargo +nightly fuzz run features_fuzzer
#![no_main]

use libfuzzer_sys::fuzz_target;
use osce_features::{
    FeatureConfig, FeatureExtractor, FrameContext, FrameFeatures, NumbitsMode, SignalType,
    FEATURE_DIM, LTP_ORDER, MAX_LPC_ORDER, MAX_PITCH_HANGOVER, SUBFRAME_SIZE,
};

/// Upper bound on frames per input to keep iterations fast.
const MAX_FRAMES: usize = 16;

struct Reader<'a> {
    data: &'a [u8],
}

impl Reader<'_> {
    fn u8(&mut self) -> u8 {
        match self.data.split_first() {
            Some((&b, rest)) => {
                self.data = rest;
                b
            }
            None => 0,
        }
    }

    fn i16(&mut self) -> i16 {
        i16::from_le_bytes([self.u8(), self.u8()])
    }

    fn i32(&mut self) -> i32 {
        i32::from_le_bytes([self.u8(), self.u8(), self.u8(), self.u8()])
    }
}

fuzz_target!(|data: &[u8]| {
    let mut reader = Reader { data };
    let setup = reader.u8();
    let config = FeatureConfig::default()
        .with_pitch_hangover(setup as usize % (MAX_PITCH_HANGOVER + 1))
        .with_numbits(if setup & 0x80 != 0 {
            NumbitsMode::Raw
        } else {
            NumbitsMode::Smoothed
        });
    let mut extractor = FeatureExtractor::new(config).unwrap();
    let mut out = FrameFeatures::default();

    for _ in 0..MAX_FRAMES {
        if reader.data.is_empty() {
            break;
        }
        let header = reader.u8();
        let num_subframes = if header & 1 != 0 { 4 } else { 2 };
        let signal_type =
            SignalType::try_from(((header >> 1) & 3) as i32).unwrap_or(SignalType::Voiced);
        let lpc_order = reader.u8() as usize;
        let num_bits = reader.i16() as i32;

        let pitch_lags: Vec<i32> = (0..num_subframes).map(|_| reader.i16() as i32).collect();
        let pred_coef_q12: Vec<[i16; MAX_LPC_ORDER]> = (0..num_subframes / 2)
            .map(|_| std::array::from_fn(|_| reader.i16()))
            .collect();
        let ltp_coef_q14: Vec<i16> = (0..num_subframes * LTP_ORDER).map(|_| reader.i16()).collect();
        let gains_q16: Vec<i32> = (0..num_subframes).map(|_| reader.i32() & 0x7FFF_FFFF).collect();
        let pcm: Vec<i16> = (0..num_subframes * SUBFRAME_SIZE).map(|_| reader.i16()).collect();

        let frame = FrameContext {
            num_subframes,
            lpc_order,
            signal_type,
            pred_coef_q12: &pred_coef_q12,
            pitch_lags: &pitch_lags,
            ltp_coef_q14: &ltp_coef_q14,
            gains_q16: &gains_q16,
            pcm: &pcm,
            num_bits,
        };

        let before = extractor.state().clone();
        match extractor.calculate(&frame, &mut out) {
            Ok(()) => {
                assert_eq!(out.features().len(), num_subframes * FEATURE_DIM);
                for k in 0..num_subframes {
                    for &a in out.subframe(k).acorr() {
                        assert!(a.abs() <= 1.0 + 1e-3, "acorr tap {a}");
                    }
                }
            }
            Err(_) => assert_eq!(extractor.state(), &before),
        }
    }
});
