//! [`VoiceprintModel`] implementation using filterbank statistics pooling.
//!
//! This is a lightweight reference extractor with no learned weights: it
//! summarizes the long-term spectral envelope of an utterance. It is good
//! enough to tell clearly different voices apart in a small demo set and
//! is fully deterministic, but it is not a substitute for a trained
//! speaker model. Plug a real model in by implementing [`VoiceprintModel`].

use voxgate_audio::Pcm16;

use crate::embedding::Embedding;
use crate::error::VoiceprintError;
use crate::fbank::{Fbank, FbankConfig, mean_std};
use crate::model::VoiceprintModel;
use crate::preprocess::{PreprocessConfig, Preprocessor};

/// Configuration for [`FbankModel`].
#[derive(Debug, Clone, Default)]
pub struct FbankModelConfig {
    /// Preprocessing. `target_rate` also sets the filterbank sample rate.
    pub preprocess: PreprocessConfig,
    /// Filterbank configuration.
    pub fbank: FbankConfig,
}

/// [`VoiceprintModel`] built on log mel statistics.
///
/// # Pipeline
///
/// 1. [`Preprocessor`]: resample, normalize volume, trim silence
/// 2. [`Fbank`]: log mel energies per 10ms frame
/// 3. Per-bin mean and standard deviation over all frames
/// 4. Each half centered across bins, concatenated, L2 normalized
///
/// Centering the mean half removes any constant log-gain offset, so the
/// embedding does not depend on recording level.
///
/// The embedding dimension is `2 * num_mels` (160 by default).
#[derive(Debug, Clone)]
pub struct FbankModel {
    preprocessor: Preprocessor,
    fbank: Fbank,
}

impl FbankModel {
    /// Creates the model. Fails with [`VoiceprintError::Model`] when the
    /// filterbank configuration is degenerate.
    pub fn new(mut cfg: FbankModelConfig) -> Result<Self, VoiceprintError> {
        cfg.fbank.sample_rate = cfg.preprocess.target_rate as usize;
        let fbank = Fbank::new(cfg.fbank)
            .ok_or_else(|| VoiceprintError::Model("invalid filterbank configuration".into()))?;
        Ok(Self {
            preprocessor: Preprocessor::new(cfg.preprocess),
            fbank,
        })
    }
}


impl VoiceprintModel for FbankModel {
    fn extract(&self, audio: &Pcm16) -> Result<Embedding, VoiceprintError> {
        let samples = self.preprocessor.process(audio)?;

        let features = self
            .fbank
            .compute(&samples)
            .ok_or(VoiceprintError::AudioTooShort {
                min_samples: self.fbank.config().frame_length,
                got_samples: samples.len(),
            })?;

        let (mut mean, mut std) = mean_std(&features);
        center(&mut mean);
        center(&mut std);

        let values: Vec<f32> = mean.iter().chain(std.iter()).map(|&v| v as f32).collect();
        let embedding = Embedding::normalized(values);
        if embedding.norm() == 0.0 {
            return Err(VoiceprintError::Model("flat spectrum, no speaker information".into()));
        }

        tracing::debug!(
            frames = features.len(),
            dim = embedding.dim(),
            "voiceprint: extracted embedding"
        );
        Ok(embedding)
    }

    fn dimension(&self) -> usize {
        2 * self.fbank.config().num_mels
    }

    fn sample_rate(&self) -> u32 {
        self.fbank.config().sample_rate as u32
    }
}

fn center(v: &mut [f64]) {
    if v.is_empty() {
        return;
    }
    let mean = v.iter().sum::<f64>() / v.len() as f64;
    for x in v.iter_mut() {
        *x -= mean;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    /// Harmonic source with spectral tilt and a slow syllable envelope.
    fn voice(f0: f64, tilt: f64, rate: u32, seconds: f64, phase: f64, gain: f64) -> Pcm16 {
        let n = (rate as f64 * seconds) as usize;
        let harmonics = (7000.0 / f0) as usize;
        let mut samples = vec![0.0f64; n];
        for (i, s) in samples.iter_mut().enumerate() {
            let t = i as f64 / rate as f64;
            let mut v = 0.0;
            for k in 1..=harmonics {
                let amp = (k as f64).powf(-tilt);
                v += amp * (2.0 * PI * f0 * k as f64 * t + phase * k as f64).sin();
            }
            let envelope = 0.6 + 0.4 * (2.0 * PI * 3.0 * t + phase).sin();
            *s = v * envelope;
        }
        let peak = samples.iter().fold(0.0f64, |m, &v| m.max(v.abs()));
        let f: Vec<f32> = samples.iter().map(|&v| (gain * v / peak) as f32).collect();
        Pcm16::from_f32(rate, &f)
    }

    fn default_model() -> FbankModel {
        FbankModel::new(FbankModelConfig::default()).unwrap()
    }

    fn sim(a: &Embedding, b: &Embedding) -> f32 {
        a.similarity(b).unwrap()
    }

    #[test]
    fn dimension_and_rate() {
        let model = default_model();
        assert_eq!(model.dimension(), 160);
        assert_eq!(model.sample_rate(), 16000);
    }

    #[test]
    fn embedding_is_unit_length() {
        let model = default_model();
        let e = model.extract(&voice(120.0, 1.0, 16000, 1.5, 0.0, 0.5)).unwrap();
        assert_eq!(e.dim(), model.dimension());
        assert!(e.is_unit(1e-4), "norm {}", e.norm());
    }

    #[test]
    fn deterministic() {
        let model = default_model();
        let audio = voice(150.0, 1.2, 16000, 1.0, 0.3, 0.4);
        let a = model.extract(&audio).unwrap();
        let b = model.extract(&audio).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn same_voice_closer_than_other_voice() {
        let model = default_model();
        let a1 = model.extract(&voice(110.0, 1.8, 16000, 2.0, 0.0, 0.5)).unwrap();
        let a2 = model.extract(&voice(110.0, 1.8, 16000, 1.5, 1.1, 0.3)).unwrap();
        let b = model.extract(&voice(240.0, 0.6, 16000, 2.0, 0.0, 0.5)).unwrap();

        let same = sim(&a1, &a2);
        let other = sim(&a1, &b);
        assert!(same > other, "same {same} should exceed other {other}");
        assert!(same > 0.9, "same-voice similarity {same}");
    }

    #[test]
    fn level_does_not_matter() {
        let model = default_model();
        let loud = model.extract(&voice(130.0, 1.4, 16000, 1.5, 0.2, 0.8)).unwrap();
        let quiet = model.extract(&voice(130.0, 1.4, 16000, 1.5, 0.2, 0.1)).unwrap();
        let s = sim(&loud, &quiet);
        assert!(s > 0.98, "similarity across levels {s}");
    }

    #[test]
    fn accepts_other_sample_rates() {
        let model = default_model();
        let e = model.extract(&voice(130.0, 1.4, 48000, 1.0, 0.0, 0.5)).unwrap();
        assert_eq!(e.dim(), 160);
    }

    #[test]
    fn rejects_empty_and_silent_audio() {
        let model = default_model();
        assert!(matches!(
            model.extract(&Pcm16::new(16000, vec![])),
            Err(VoiceprintError::EmptyAudio)
        ));
        assert!(matches!(
            model.extract(&Pcm16::new(16000, vec![0; 16000])),
            Err(VoiceprintError::AudioTooShort { .. })
        ));
    }

    #[test]
    fn custom_rate_drives_filterbank() {
        let cfg = FbankModelConfig {
            preprocess: PreprocessConfig {
                target_rate: 8000,
                min_samples: 3200,
                ..PreprocessConfig::default()
            },
            fbank: FbankConfig {
                frame_length: 200,
                frame_shift: 80,
                num_mels: 40,
                ..FbankConfig::default()
            },
        };
        let model = FbankModel::new(cfg).unwrap();
        assert_eq!(model.sample_rate(), 8000);
        assert_eq!(model.dimension(), 80);
        let e = model.extract(&voice(120.0, 1.0, 16000, 1.0, 0.0, 0.5)).unwrap();
        assert_eq!(e.dim(), 80);
    }

    #[test]
    fn degenerate_config_rejected() {
        let cfg = FbankModelConfig {
            fbank: FbankConfig {
                num_mels: 0,
                ..FbankConfig::default()
            },
            ..FbankModelConfig::default()
        };
        assert!(matches!(FbankModel::new(cfg), Err(VoiceprintError::Model(_))));
    }
}
