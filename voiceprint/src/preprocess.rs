//! Utterance preprocessing ahead of feature extraction.
//!
//! 1. Resample to the model rate.
//! 2. Normalize the volume towards a target dBFS.
//! 3. Drop long silences using a windowed energy detector.

use voxgate_audio::{Pcm16, resample};

use crate::VoiceprintError;

/// Configures [`Preprocessor`].
#[derive(Debug, Clone)]
pub struct PreprocessConfig {
    /// Output sample rate in Hz (default: 16000).
    pub target_rate: u32,
    /// Target loudness in dBFS (default: -30).
    pub target_dbfs: f64,
    /// Only ever raise the level, never lower it (default: true).
    pub increase_only: bool,
    /// Remove silent stretches (default: true).
    pub trim_silence: bool,
    /// Detector window in milliseconds (default: 30).
    pub window_ms: u32,
    /// A window is voiced when within this many dB of the loudest
    /// window (default: 40).
    pub silence_range_db: f64,
    /// Windows quieter than this absolute level are never voiced
    /// (default: -70 dBFS).
    pub silence_floor_dbfs: f64,
    /// Moving average width over the voiced flags, in windows (default: 8).
    pub smoothing_width: usize,
    /// Size of the dilation applied to the voiced mask, in windows
    /// (default: 6, i.e. 3 windows on each side).
    pub dilation: usize,
    /// Minimum samples left after trimming (default: 6400 = 400ms @ 16kHz).
    pub min_samples: usize,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            target_rate: 16000,
            target_dbfs: -30.0,
            increase_only: true,
            trim_silence: true,
            window_ms: 30,
            silence_range_db: 40.0,
            silence_floor_dbfs: -70.0,
            smoothing_width: 8,
            dilation: 6,
            min_samples: 6400,
        }
    }
}

/// Turns captured PCM16 into normalized `f32` samples at the model rate.
#[derive(Debug, Clone, Default)]
pub struct Preprocessor {
    cfg: PreprocessConfig,
}

impl Preprocessor {
    pub fn new(cfg: PreprocessConfig) -> Self {
        Self { cfg }
    }

    pub fn config(&self) -> &PreprocessConfig {
        &self.cfg
    }

    /// Runs the full pipeline.
    ///
    /// Fails with [`VoiceprintError::EmptyAudio`] for an empty buffer,
    /// [`VoiceprintError::InvalidSampleRate`] for a zero rate and
    /// [`VoiceprintError::AudioTooShort`] when less than `min_samples`
    /// remain once silence is removed.
    pub fn process(&self, audio: &Pcm16) -> Result<Vec<f32>, VoiceprintError> {
        if audio.is_empty() {
            return Err(VoiceprintError::EmptyAudio);
        }
        if audio.sample_rate == 0 {
            return Err(VoiceprintError::InvalidSampleRate(0));
        }

        let mut samples = resample(&audio.to_f32(), audio.sample_rate, self.cfg.target_rate)?;
        normalize_volume(&mut samples, self.cfg.target_dbfs, self.cfg.increase_only);

        if self.cfg.trim_silence {
            samples = self.trim_silence(&samples);
        }

        if samples.len() < self.cfg.min_samples.max(1) {
            return Err(VoiceprintError::AudioTooShort {
                min_samples: self.cfg.min_samples.max(1),
                got_samples: samples.len(),
            });
        }

        tracing::trace!(
            input = audio.len(),
            input_rate = audio.sample_rate,
            output = samples.len(),
            "voiceprint: preprocessed"
        );
        Ok(samples)
    }

    /// Keeps only the windows marked voiced. A trailing partial window
    /// is dropped.
    fn trim_silence(&self, samples: &[f32]) -> Vec<f32> {
        let window = (self.cfg.target_rate as usize * self.cfg.window_ms as usize / 1000).max(1);
        let levels: Vec<f64> = samples.chunks_exact(window).map(rms_dbfs).collect();
        let Some(peak) = levels.iter().copied().reduce(f64::max) else {
            return Vec::new();
        };

        let voiced: Vec<bool> = levels
            .iter()
            .map(|&db| db >= self.cfg.silence_floor_dbfs && db >= peak - self.cfg.silence_range_db)
            .collect();
        let mask = dilate(&smooth(&voiced, self.cfg.smoothing_width), self.cfg.dilation / 2);

        samples
            .chunks_exact(window)
            .zip(mask)
            .filter(|(_, keep)| *keep)
            .flat_map(|(chunk, _)| chunk.iter().copied())
            .collect()
    }
}

/// Scales the samples so their mean power sits at `target_dbfs`.
/// Silent input is left untouched.
pub fn normalize_volume(samples: &mut [f32], target_dbfs: f64, increase_only: bool) {
    if samples.is_empty() {
        return;
    }
    let mean_power =
        samples.iter().map(|&s| (s as f64) * (s as f64)).sum::<f64>() / samples.len() as f64;
    if mean_power <= 0.0 {
        return;
    }
    let change_db = target_dbfs - 10.0 * mean_power.log10();
    if change_db < 0.0 && increase_only {
        return;
    }
    let gain = 10f64.powf(change_db / 20.0) as f32;
    for s in samples.iter_mut() {
        *s *= gain;
    }
}

fn rms_dbfs(window: &[f32]) -> f64 {
    let power = window.iter().map(|&s| (s as f64) * (s as f64)).sum::<f64>() / window.len() as f64;
    if power <= 0.0 {
        return f64::NEG_INFINITY;
    }
    10.0 * power.log10()
}

/// Moving average of the flags over `width` windows (zero padded),
/// rounded back to a flag. Exactly half rounds down.
fn smooth(flags: &[bool], width: usize) -> Vec<bool> {
    if width <= 1 {
        return flags.to_vec();
    }
    let before = (width - 1) / 2;
    (0..flags.len())
        .map(|i| {
            let lo = i.saturating_sub(before);
            let hi = (i + width - before).min(flags.len());
            let count = flags[lo..hi].iter().filter(|&&f| f).count();
            count * 2 > width
        })
        .collect()
}

/// Extends every set flag by `radius` windows on each side.
fn dilate(flags: &[bool], radius: usize) -> Vec<bool> {
    (0..flags.len())
        .map(|i| {
            let lo = i.saturating_sub(radius);
            let hi = (i + radius + 1).min(flags.len());
            flags[lo..hi].iter().any(|&f| f)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone_pcm(rate: u32, n: usize, amplitude: f32) -> Pcm16 {
        let samples: Vec<f32> = (0..n)
            .map(|i| {
                let t = i as f32 / rate as f32;
                amplitude * (2.0 * std::f32::consts::PI * 200.0 * t).sin()
            })
            .collect();
        Pcm16::from_f32(rate, &samples)
    }

    fn power_dbfs(samples: &[f32]) -> f64 {
        rms_dbfs(samples)
    }

    #[test]
    fn empty_audio() {
        let p = Preprocessor::default();
        assert!(matches!(
            p.process(&Pcm16::new(16000, vec![])),
            Err(VoiceprintError::EmptyAudio)
        ));
    }

    #[test]
    fn zero_sample_rate() {
        let p = Preprocessor::default();
        assert!(matches!(
            p.process(&Pcm16::new(0, vec![1, 2, 3])),
            Err(VoiceprintError::InvalidSampleRate(0))
        ));
    }

    #[test]
    fn silence_is_too_short() {
        let p = Preprocessor::default();
        let err = p.process(&Pcm16::new(16000, vec![0; 32000])).unwrap_err();
        assert!(matches!(
            err,
            VoiceprintError::AudioTooShort { min_samples: 6400, got_samples: 0 }
        ));
    }

    #[test]
    fn short_tone_is_too_short() {
        let p = Preprocessor::default();
        // 200ms at 16kHz.
        let err = p.process(&tone_pcm(16000, 3200, 0.3)).unwrap_err();
        assert!(matches!(err, VoiceprintError::AudioTooShort { .. }));
    }

    #[test]
    fn quiet_tone_is_raised() {
        let p = Preprocessor::default();
        let out = p.process(&tone_pcm(16000, 16000, 0.005)).unwrap();
        assert!((power_dbfs(&out) + 30.0).abs() < 0.5, "level {}", power_dbfs(&out));
    }

    #[test]
    fn loud_tone_is_kept() {
        let p = Preprocessor::default();
        let out = p.process(&tone_pcm(16000, 16000, 0.5)).unwrap();
        // 0.5 amplitude sine: mean power 0.125 = -9 dBFS.
        assert!((power_dbfs(&out) + 9.03).abs() < 0.2, "level {}", power_dbfs(&out));
    }

    #[test]
    fn resamples_to_target_rate() {
        let cfg = PreprocessConfig {
            trim_silence: false,
            ..PreprocessConfig::default()
        };
        let out = Preprocessor::new(cfg).process(&tone_pcm(48000, 48000, 0.3)).unwrap();
        assert_eq!(out.len(), 16000);
    }

    #[test]
    fn trims_leading_and_trailing_silence() {
        let rate = 16000;
        let mut samples = vec![0i16; rate as usize];
        samples.extend(tone_pcm(rate, rate as usize, 0.3).samples);
        samples.extend(vec![0i16; rate as usize]);

        let out = Preprocessor::default().process(&Pcm16::new(rate, samples)).unwrap();

        // 33 windows of 480 samples hold the tone; dilation adds up to
        // 3 windows on each side.
        assert!(out.len() >= 15840, "got {}", out.len());
        assert!(out.len() <= 16000 + 2 * 3 * 480 + 480, "got {}", out.len());
    }

    #[test]
    fn smooth_majority() {
        let flags = [false, true, true, true, false, false, false, false];
        let out = smooth(&flags, 3);
        assert_eq!(out, vec![false, true, true, true, false, false, false, false]);

        // A single voiced window is smoothed away.
        let out = smooth(&[false, false, true, false, false], 3);
        assert!(out.iter().all(|&f| !f));
    }

    #[test]
    fn dilate_radius() {
        let out = dilate(&[false, false, false, true, false, false, false], 2);
        assert_eq!(out, vec![false, true, true, true, true, true, false]);
    }

    #[test]
    fn normalize_volume_silence() {
        let mut v = vec![0.0f32; 10];
        normalize_volume(&mut v, -30.0, false);
        assert!(v.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn normalize_volume_can_lower() {
        let mut v = vec![0.5f32; 100];
        normalize_volume(&mut v, -30.0, false);
        assert!((power_dbfs(&v) + 30.0).abs() < 1e-6);
    }
}
