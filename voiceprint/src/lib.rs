//! Speaker embedding extraction.
//!
//! # Architecture
//!
//! The extractor is a boundary: everything downstream only sees
//! [`VoiceprintModel::extract`], which turns mono PCM16 audio into a
//! unit-length [`Embedding`]. Models are constructed once and injected
//! into their callers, so a real neural model and a test stub are
//! interchangeable.
//!
//! # Reference Model
//!
//! [`FbankModel`] is a deterministic extractor built from:
//!
//! 1. [`Preprocessor`]: resample to 16kHz, normalize volume, trim silence
//! 2. [`fbank`]: Kaldi-style log mel filterbank (Povey window,
//!    pre-emphasis 0.97, 80 mel bins)
//! 3. Statistics pooling: per-bin mean and standard deviation

mod embedding;
mod error;
pub mod fbank;
mod fbank_model;
mod model;
pub mod preprocess;

pub use embedding::{Embedding, l2_normalize};
pub use error::VoiceprintError;
pub use fbank::{Fbank, FbankConfig, cmvn, compute_fbank};
pub use fbank_model::{FbankModel, FbankModelConfig};
pub use model::VoiceprintModel;
pub use preprocess::{PreprocessConfig, Preprocessor};
pub use voxgate_audio::Pcm16;
