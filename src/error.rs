//! Error types for feature extraction.
//!
//! Only malformed inputs and configuration are reported through [`FeatureError`].
//! Internal invariant violations (an invalid postprocessed pitch lag, a signal
//! view read outside its validated window) are bugs and panic instead.

use thiserror::Error;

/// Feature extraction error codes.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Error)]
pub enum FeatureError {
    /// The frame does not consist of 2 or 4 subframes.
    #[error("invalid subframe count ({0})")]
    InvalidSubframeCount(usize),
    /// LPC order is zero or exceeds the maximum order.
    #[error("invalid LPC order ({0})")]
    InvalidLpcOrder(usize),
    /// An input slice is shorter than the frame geometry requires.
    #[error("{name} too short: expected at least {expected}, got {actual}")]
    BufferLength {
        name: &'static str,
        expected: usize,
        actual: usize,
    },
    /// A voiced subframe carries a pitch lag the analysis window cannot reach.
    #[error("pitch lag out of range ({0})")]
    PitchLagOutOfRange(i32),
    /// Unknown voicing classification code.
    #[error("invalid signal type ({0})")]
    InvalidSignalType(i32),
    /// A filterbank definition violates its layout constraints.
    #[error("invalid filterbank: {0}")]
    InvalidFilterbank(&'static str),
    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
}

/// A specialized [`Result`](std::result::Result) type for feature extraction.
pub type Result<T> = std::result::Result<T, FeatureError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        assert_eq!(
            format!("{}", FeatureError::InvalidSubframeCount(3)),
            "invalid subframe count (3)"
        );
        assert_eq!(
            format!(
                "{}",
                FeatureError::BufferLength {
                    name: "pcm",
                    expected: 320,
                    actual: 160
                }
            ),
            "pcm too short: expected at least 320, got 160"
        );
        assert_eq!(
            format!("{}", FeatureError::InvalidFilterbank("centers not increasing")),
            "invalid filterbank: centers not increasing"
        );
    }

    #[test]
    fn error_is_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<FeatureError>();
    }

    #[test]
    fn error_is_copy() {
        fn assert_copy<T: Copy>() {}
        assert_copy::<FeatureError>();
    }
}
