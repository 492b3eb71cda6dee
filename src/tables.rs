//! Constant tables for the OSCE feature layout.
//!
//! The filterbank tables define the two band projections of the 161-bin
//! spectrum; the window is the 320-sample sine window
//! `sin(pi * (n + 0.5) / 320)`, stored as its rising half.

#![allow(clippy::excessive_precision)]

use crate::config::{
    CLEAN_SPEC_NUM_BANDS, NOISY_SPEC_NUM_BANDS, SPEC_NUM_FREQS, SPEC_WINDOW_SIZE,
};

#[rustfmt::skip]
pub(crate) static CENTER_BINS_CLEAN: [usize; CLEAN_SPEC_NUM_BANDS] = [
      0,   2,   5,   8,  10,  12,  15,  18,
     20,  22,  25,  28,  30,  33,  35,  38,
     40,  42,  45,  48,  50,  52,  55,  58,
     60,  62,  65,  68,  70,  73,  75,  78,
     80,  82,  85,  88,  90,  92,  95,  98,
    100, 102, 105, 108, 110, 112, 115, 118,
    120, 122, 125, 128, 130, 132, 135, 138,
    140, 142, 145, 148, 150, 152, 155, 160,
];

#[rustfmt::skip]
pub(crate) static CENTER_BINS_NOISY: [usize; NOISY_SPEC_NUM_BANDS] = [
      0,   4,   8,  12,  16,  20,  24,  28,
     32,  40,  48,  56,  64,  80,  96, 112,
    136, 160,
];

#[rustfmt::skip]
pub(crate) static BAND_WEIGHTS_CLEAN: [f32; CLEAN_SPEC_NUM_BANDS] = [
    0.666666666667, 0.400000000000, 0.333333333333, 0.400000000000,
    0.500000000000, 0.400000000000, 0.333333333333, 0.400000000000,
    0.500000000000, 0.400000000000, 0.333333333333, 0.400000000000,
    0.400000000000, 0.400000000000, 0.400000000000, 0.400000000000,
    0.500000000000, 0.400000000000, 0.333333333333, 0.400000000000,
    0.500000000000, 0.400000000000, 0.333333333333, 0.400000000000,
    0.500000000000, 0.400000000000, 0.333333333333, 0.400000000000,
    0.400000000000, 0.400000000000, 0.400000000000, 0.400000000000,
    0.500000000000, 0.400000000000, 0.333333333333, 0.400000000000,
    0.500000000000, 0.400000000000, 0.333333333333, 0.400000000000,
    0.500000000000, 0.400000000000, 0.333333333333, 0.400000000000,
    0.500000000000, 0.400000000000, 0.333333333333, 0.400000000000,
    0.500000000000, 0.400000000000, 0.333333333333, 0.400000000000,
    0.500000000000, 0.400000000000, 0.333333333333, 0.400000000000,
    0.500000000000, 0.400000000000, 0.333333333333, 0.400000000000,
    0.500000000000, 0.400000000000, 0.250000000000, 0.333333333333,
];

#[rustfmt::skip]
pub(crate) static BAND_WEIGHTS_NOISY: [f32; NOISY_SPEC_NUM_BANDS] = [
    0.400000000000, 0.250000000000, 0.250000000000, 0.250000000000,
    0.250000000000, 0.250000000000, 0.250000000000, 0.250000000000,
    0.166666666667, 0.125000000000, 0.125000000000, 0.125000000000,
    0.083333333333, 0.062500000000, 0.062500000000, 0.050000000000,
    0.041666666667, 0.080000000000,
];

const HALF_WINDOW_SIZE: usize = SPEC_WINDOW_SIZE / 2;

#[rustfmt::skip]
static HALF_WINDOW: [f32; HALF_WINDOW_SIZE] = [
    0.004908718808, 0.014725683311, 0.024541228523, 0.034354408400, 0.044164277127, 0.053969889210,
    0.063770299562, 0.073564563600, 0.083351737332, 0.093130877450, 0.102901041421, 0.112661287575,
    0.122410675199, 0.132148264628, 0.141873117332, 0.151584296010, 0.161280864678, 0.170961888760,
    0.180626435180, 0.190273572448, 0.199902370753, 0.209511902052, 0.219101240157, 0.228669460829,
    0.238215641862, 0.247738863176, 0.257238206902, 0.266712757475, 0.276161601717, 0.285583828929,
    0.294978530977, 0.304344802381, 0.313681740399, 0.322988445118, 0.332264019538, 0.341507569661,
    0.350718204573, 0.359895036535, 0.369037181064, 0.378143757022, 0.387213886697, 0.396246695891,
    0.405241314005, 0.414196874117, 0.423112513073, 0.431987371563, 0.440820594212, 0.449611329655,
    0.458358730621, 0.467061954019, 0.475720161014, 0.484332517110, 0.492898192230, 0.501416360796,
    0.509886201809, 0.518306898929, 0.526677640552, 0.534997619887, 0.543266035038, 0.551482089078,
    0.559644990127, 0.567753951426, 0.575808191418, 0.583806933818, 0.591749407690, 0.599634847523,
    0.607462493302, 0.615231590581, 0.622941390558, 0.630591150148, 0.638180132051, 0.645707604824,
    0.653172842954, 0.660575126926, 0.667913743292, 0.675187984742, 0.682397150168, 0.689540544737,
    0.696617479953, 0.703627273726, 0.710569250438, 0.717442741007, 0.724247082951, 0.730981620454,
    0.737645704427, 0.744238692572, 0.750759949443, 0.757208846506, 0.763584762206, 0.769887082016,
    0.776115198508, 0.782268511401, 0.788346427627, 0.794348361383, 0.800273734191, 0.806121974951,
    0.811892519997, 0.817584813152, 0.823198305781, 0.828732456844, 0.834186732948, 0.839560608398,
    0.844853565250, 0.850065093356, 0.855194690420, 0.860241862039, 0.865206121757, 0.870086991109,
    0.874883999665, 0.879596685080, 0.884224593137, 0.888767277786, 0.893224301196, 0.897595233788,
    0.901879654283, 0.906077149740, 0.910187315596, 0.914209755704, 0.918144082372, 0.921989916403,
    0.925746887127, 0.929414632439, 0.932992798835, 0.936481041442, 0.939879024058, 0.943186419177,
    0.946402908026, 0.949528180593, 0.952561935658, 0.955503880820, 0.958353732530, 0.961111216112,
    0.963776065795, 0.966348024735, 0.968826845041, 0.971212287799, 0.973504123096, 0.975702130039,
    0.977806096779, 0.979815820533, 0.981731107599, 0.983551773378, 0.985277642389, 0.986908548290,
    0.988444333892, 0.989884851171, 0.991229961288, 0.992479534599, 0.993633450666, 0.994691598273,
    0.995653875433, 0.996520189401, 0.997290456679, 0.997964603026, 0.998542563469, 0.999024282300,
    0.999409713092, 0.999698818696, 0.999891571247, 0.999987952167,
];

const _: () = assert!(SPEC_NUM_FREQS == HALF_WINDOW_SIZE + 1);

/// Analysis window coefficient `n` of the symmetric 320-sample window.
#[inline]
pub(crate) fn window(n: usize) -> f32 {
    debug_assert!(n < SPEC_WINDOW_SIZE);
    HALF_WINDOW[n.min(SPEC_WINDOW_SIZE - 1 - n)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_is_symmetric_sine() {
        for n in 0..SPEC_WINDOW_SIZE {
            let expected =
                (std::f64::consts::PI * (n as f64 + 0.5) / SPEC_WINDOW_SIZE as f64).sin();
            assert!(
                (window(n) as f64 - expected).abs() < 1e-6,
                "window[{n}] = {}, expected {expected}",
                window(n)
            );
            assert_eq!(window(n), window(SPEC_WINDOW_SIZE - 1 - n));
        }
    }

    #[test]
    fn center_bins_span_spectrum() {
        for bins in [&CENTER_BINS_CLEAN[..], &CENTER_BINS_NOISY[..]] {
            assert_eq!(bins[0], 0);
            assert_eq!(bins[bins.len() - 1], SPEC_NUM_FREQS - 1);
            assert!(bins.windows(2).all(|w| w[0] < w[1]));
        }
    }
}
