use thiserror::Error;

/// Errors returned by audio decoding and conversion.
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("audio: invalid wav: {0}")]
    InvalidWav(String),

    #[error("audio: unsupported: {0}")]
    Unsupported(String),

    #[error("audio: resample: {0}")]
    Resample(String),

    #[error("audio: io: {0}")]
    Io(#[from] std::io::Error),
}

impl From<rubato::ResamplerConstructionError> for AudioError {
    fn from(e: rubato::ResamplerConstructionError) -> Self {
        AudioError::Resample(e.to_string())
    }
}

impl From<rubato::ResampleError> for AudioError {
    fn from(e: rubato::ResampleError) -> Self {
        AudioError::Resample(e.to_string())
    }
}
