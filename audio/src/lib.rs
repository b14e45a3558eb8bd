//! Audio input utilities.
//!
//! This crate provides the audio types consumed by the voiceprint pipeline:
//!
//! - [`Pcm16`]: mono signed 16-bit PCM buffer with its sample rate
//! - [`wav`]: RIFF/WAVE PCM16 decoding (with downmix) and encoding
//! - [`resample`]: sample rate conversion backed by rubato
//!
//! # Example
//!
//! ```rust
//! use voxgate_audio::{wav, Pcm16};
//!
//! let pcm = Pcm16::new(16000, vec![0i16; 1600]); // 100ms at 16kHz
//! let bytes = wav::encode(&pcm);
//! let back = wav::decode(&bytes).unwrap();
//! assert_eq!(back, pcm);
//! ```

mod error;
mod pcm;
pub mod resample;
pub mod wav;

pub use error::AudioError;
pub use pcm::Pcm16;
pub use resample::resample;
