use voxgate_audio::Pcm16;

use crate::embedding::Embedding;
use crate::VoiceprintError;

/// Extracts speaker embedding vectors from raw audio.
///
/// The input is mono PCM16 at any non-zero sample rate; implementations
/// resample to their native rate ([`VoiceprintModel::sample_rate`]) and run
/// their own preprocessing. The output is a unit-length vector whose
/// dimensionality is returned by [`VoiceprintModel::dimension`].
///
/// # Contract
///
/// - Empty audio fails with [`VoiceprintError::EmptyAudio`].
/// - Audio that is too short once silence is removed fails with
///   [`VoiceprintError::AudioTooShort`].
/// - Identical input yields an identical embedding.
///
/// # Thread Safety
///
/// Implementations must be safe for concurrent use. A single instance is
/// constructed at startup and shared by every enroll/identify call.
pub trait VoiceprintModel: Send + Sync {
    /// Computes a speaker embedding from mono PCM16 audio.
    fn extract(&self, audio: &Pcm16) -> Result<Embedding, VoiceprintError>;

    /// Returns the dimensionality of the embedding vectors (e.g., 160).
    fn dimension(&self) -> usize;

    /// Returns the sample rate the model operates at, in Hz.
    fn sample_rate(&self) -> u32;
}
