use thiserror::Error;
use voxgate_audio::AudioError;

/// Errors returned by voiceprint extraction.
///
/// Every variant means the audio could not be turned into an embedding.
/// Retrying with the same input gives the same result; the caller has to
/// record again.
#[derive(Debug, Error)]
pub enum VoiceprintError {
    #[error("audio is empty")]
    EmptyAudio,

    #[error("invalid sample rate: {0} Hz")]
    InvalidSampleRate(u32),

    #[error("audio too short: need at least {min_samples} samples after preprocessing, got {got_samples}")]
    AudioTooShort {
        min_samples: usize,
        got_samples: usize,
    },

    #[error("audio conversion: {0}")]
    Audio(#[from] AudioError),

    #[error("model error: {0}")]
    Model(String),
}
