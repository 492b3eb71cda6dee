//! Optional consumers of the per-subframe feature vectors.
//!
//! A sink is passed explicitly to
//! [`FeatureExtractor::calculate_with_sink`](crate::FeatureExtractor::calculate_with_sink);
//! nothing is recorded unless one is injected.

use std::io::{self, Write};

use byteorder::{LittleEndian, WriteBytesExt};

use crate::config::FEATURE_DIM;

/// Receives every subframe feature vector as soon as it is assembled.
pub trait FeatureSink {
    /// `features` holds exactly [`FEATURE_DIM`] values; `subframe` is the
    /// index within the current frame.
    fn record(&mut self, subframe: usize, features: &[f32]);
}

impl FeatureSink for Vec<[f32; FEATURE_DIM]> {
    fn record(&mut self, _subframe: usize, features: &[f32]) {
        let mut v = [0.0f32; FEATURE_DIM];
        v.copy_from_slice(features);
        self.push(v);
    }
}

/// Writes feature vectors as raw little-endian `f32` records of
/// [`FEATURE_DIM`] values each, the layout read by the training tools.
///
/// The first I/O error stops all further writes and is reported by
/// [`finish`](F32Writer::finish).
#[derive(Debug)]
pub struct F32Writer<W: Write> {
    inner: W,
    records: usize,
    error: Option<io::Error>,
}

impl<W: Write> F32Writer<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            records: 0,
            error: None,
        }
    }

    /// Number of complete records written so far.
    pub fn records(&self) -> usize {
        self.records
    }

    /// Flushes the writer and hands it back, or returns the first error.
    pub fn finish(mut self) -> io::Result<W> {
        if let Some(err) = self.error.take() {
            return Err(err);
        }
        self.inner.flush()?;
        Ok(self.inner)
    }

    fn write_record(&mut self, features: &[f32]) -> io::Result<()> {
        for &v in features {
            self.inner.write_f32::<LittleEndian>(v)?;
        }
        Ok(())
    }
}

impl<W: Write> FeatureSink for F32Writer<W> {
    fn record(&mut self, _subframe: usize, features: &[f32]) {
        debug_assert_eq!(features.len(), FEATURE_DIM);
        if self.error.is_some() {
            return;
        }
        match self.write_record(features) {
            Ok(()) => self.records += 1,
            Err(err) => {
                tracing::warn!(%err, records = self.records, "feature dump failed");
                self.error = Some(err);
            }
        }
    }
}
