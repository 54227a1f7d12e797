use thiserror::Error;

use crate::audio::sample::AudioSampleType;

/// Errors surfaced by the rendering core and its boundaries.
///
/// Construction-time validation fails fast and names the offending field;
/// the numerical routines themselves never fail.
#[derive(Debug, Error)]
pub enum Error {
    /// A logical type was constructed with illegal values.
    #[error("invariant violation in {field}: {message}")]
    InvariantViolation {
        field: &'static str,
        message: String,
    },

    /// After trimming, an envelope's times and levels cannot be reconciled
    /// with the phase-defined duration.
    #[error("inconsistent envelope: {0}")]
    InconsistentEnvelope(String),

    /// The WAV writer has no data path for the requested sample type.
    #[error("sample type {0:?} is not supported by the WAV writer")]
    UnsupportedSampleType(AudioSampleType),

    /// Failure in an audio-fragment description.
    #[error("invalid audio fragment: {0}")]
    Fragment(#[from] serde_yaml::Error),

    /// I/O failure in the WAV writer.
    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: hound::Error,
    },
}

impl Error {
    pub(crate) fn invariant(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvariantViolation {
            field,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
