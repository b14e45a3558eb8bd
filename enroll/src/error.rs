use std::path::PathBuf;

use thiserror::Error;
use voxgate_voiceprint::VoiceprintError;

/// Errors decoding a persisted embedding.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormatError {
    #[error("invalid magic {0:?}")]
    BadMagic([u8; 4]),

    #[error("unsupported version {0}")]
    UnsupportedVersion(u32),

    #[error("zero dimension")]
    ZeroDimension,

    #[error("length mismatch: expected {expected} bytes, got {got}")]
    Length { expected: usize, got: usize },

    #[error("non-finite value at index {0}")]
    NonFinite(usize),
}

/// Errors returned by enrollment store backends.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store: io error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("store: corrupt record {key:?}: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: FormatError,
    },

    #[error("store: invalid key {0:?}")]
    InvalidKey(String),

    #[error("store: {0}")]
    Backend(String),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Errors returned by [`Registry`](crate::Registry) operations.
///
/// A rejected identification is not an error: it is an
/// [`Identification`](crate::Identification) with `matched == false`.
#[derive(Debug, Error)]
pub enum EnrollError {
    #[error("invalid audio: {0}")]
    InvalidAudio(#[from] VoiceprintError),

    #[error("storage: {0}")]
    Storage(#[from] StoreError),

    #[error("invalid user id {user_id:?}: {reason}")]
    InvalidUserId {
        user_id: String,
        reason: &'static str,
    },

    #[error("threshold {0} outside [-1, 1]")]
    InvalidThreshold(f32),

    #[error("dimension mismatch for {user_id:?}: expected {expected}, got {got}")]
    DimensionMismatch {
        user_id: String,
        expected: usize,
        got: usize,
    },
}

impl EnrollError {
    /// Storage failures may succeed on retry. Everything else needs
    /// different input (for audio problems: a new recording).
    pub fn is_retryable(&self) -> bool {
        matches!(self, EnrollError::Storage(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_only_for_storage() {
        assert!(EnrollError::Storage(StoreError::Backend("busy".into())).is_retryable());
        assert!(!EnrollError::InvalidAudio(VoiceprintError::EmptyAudio).is_retryable());
        assert!(!EnrollError::InvalidThreshold(2.0).is_retryable());
    }

    #[test]
    fn display_carries_cause() {
        let err = EnrollError::Storage(StoreError::io(
            "/tmp/x.emb",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        ));
        assert_eq!(
            err.to_string(),
            "storage: store: io error at /tmp/x.emb: denied"
        );
    }
}
