//! Typed enums replacing raw decoder integer codes.

use crate::error::FeatureError;

/// SILK voicing classification of a decoded frame.
///
/// The integer codes match the decoder's `signalType` index.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum SignalType {
    /// No voice activity detected.
    #[default]
    NoVoiceActivity,
    /// Active but unvoiced speech.
    Unvoiced,
    /// Voiced speech; the pitch lags of the frame are meaningful.
    Voiced,
}

impl SignalType {
    /// Returns `true` for [`SignalType::Voiced`].
    #[inline]
    pub fn is_voiced(self) -> bool {
        self == SignalType::Voiced
    }
}

impl TryFrom<i32> for SignalType {
    type Error = FeatureError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(SignalType::NoVoiceActivity),
            1 => Ok(SignalType::Unvoiced),
            2 => Ok(SignalType::Voiced),
            other => Err(FeatureError::InvalidSignalType(other)),
        }
    }
}

impl From<SignalType> for i32 {
    fn from(value: SignalType) -> Self {
        match value {
            SignalType::NoVoiceActivity => 0,
            SignalType::Unvoiced => 1,
            SignalType::Voiced => 2,
        }
    }
}

/// Which value is published in the second slot of the numbits output.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum NumbitsMode {
    /// `[raw, smoothed]`.
    #[default]
    Smoothed,
    /// `[raw, raw]`, as consumed by models trained before the bit count
    /// smoothing was wired through. The moving average is still updated.
    Raw,
}
