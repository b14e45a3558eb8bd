//! Kaldi-style log mel filterbank features.
//!
//! - Povey window (hamming^0.85)
//! - Per-frame DC removal and pre-emphasis 0.97
//! - Radix-2 Cooley-Tukey FFT
//! - Triangular mel filterbank
//! - Optional CMVN over the utterance

use std::f64::consts::PI;

/// Configures mel filterbank feature extraction.
///
/// Defaults: Povey window, 25ms frames, 10ms shift, 80 mel bins,
/// 20-7600 Hz range at 16kHz.
#[derive(Debug, Clone)]
pub struct FbankConfig {
    /// Input sample rate in Hz (default: 16000).
    pub sample_rate: usize,
    /// Number of mel filterbank channels (default: 80).
    pub num_mels: usize,
    /// Frame length in samples (default: 400 = 25ms @ 16kHz).
    pub frame_length: usize,
    /// Frame shift in samples (default: 160 = 10ms @ 16kHz).
    pub frame_shift: usize,
    /// Pre-emphasis coefficient (default: 0.97).
    pub pre_emphasis: f64,
    /// Floor for mel energies before the log (default: 1e-10).
    pub energy_floor: f64,
    /// Low cutoff frequency for mel bins (default: 20 Hz).
    pub low_freq: f64,
    /// High cutoff frequency, non-positive = offset from Nyquist (default: -400).
    pub high_freq: f64,
    /// Remove DC offset per frame (default: true).
    pub remove_dc: bool,
    /// Use Povey window instead of Hamming (default: true).
    pub povey_window: bool,
}

impl Default for FbankConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16000,
            num_mels: 80,
            frame_length: 400,
            frame_shift: 160,
            pre_emphasis: 0.97,
            energy_floor: 1e-10,
            low_freq: 20.0,
            high_freq: -400.0,
            remove_dc: true,
            povey_window: true,
        }
    }
}

/// Filterbank extractor with the window and mel weights precomputed.
///
/// Cheap to share: [`Fbank::compute`] takes `&self` and allocates its own
/// scratch buffers.
#[derive(Debug, Clone)]
pub struct Fbank {
    cfg: FbankConfig,
    fft_size: usize,
    window: Vec<f64>,
    /// `[num_mels]` sparse filters: first FFT bin and its weights.
    filters: Vec<(usize, Vec<f64>)>,
}

impl Fbank {
    /// Builds the extractor. Returns `None` for a degenerate configuration
    /// (zero frame length, shift, mel count or sample rate).
    pub fn new(cfg: FbankConfig) -> Option<Self> {
        if cfg.frame_shift == 0
            || cfg.frame_length < 2
            || cfg.num_mels == 0
            || cfg.sample_rate == 0
        {
            return None;
        }

        let fft_size = cfg.frame_length.next_power_of_two();
        let window = if cfg.povey_window {
            povey_window(cfg.frame_length)
        } else {
            hamming_window(cfg.frame_length)
        };
        let high_freq = if cfg.high_freq <= 0.0 {
            cfg.sample_rate as f64 / 2.0 + cfg.high_freq
        } else {
            cfg.high_freq
        };
        let filters = mel_filterbank(
            cfg.num_mels,
            fft_size,
            cfg.sample_rate,
            cfg.low_freq,
            high_freq,
        );

        Some(Self {
            cfg,
            fft_size,
            window,
            filters,
        })
    }

    pub fn config(&self) -> &FbankConfig {
        &self.cfg
    }

    /// Returns the number of frames `compute` produces for `n` samples.
    pub fn num_frames(&self, n: usize) -> usize {
        if n < self.cfg.frame_length {
            return 0;
        }
        (n - self.cfg.frame_length) / self.cfg.frame_shift + 1
    }

    /// Extracts log mel energies from samples normalized to `[-1, 1]`.
    ///
    /// Output: `[num_frames][num_mels]`. Returns `None` if the input is
    /// shorter than one frame.
    pub fn compute(&self, samples: &[f32]) -> Option<Vec<Vec<f32>>> {
        let cfg = &self.cfg;
        let num_frames = self.num_frames(samples.len());
        if num_frames == 0 {
            return None;
        }

        let half_fft = self.fft_size / 2 + 1;
        let mut result = Vec::with_capacity(num_frames);
        let mut frame = vec![0.0f64; cfg.frame_length];
        let mut fft_buf = vec![(0.0f64, 0.0f64); self.fft_size];
        let mut power = vec![0.0f64; half_fft];

        for f in 0..num_frames {
            let offset = f * cfg.frame_shift;
            for (dst, &s) in frame.iter_mut().zip(&samples[offset..offset + cfg.frame_length]) {
                *dst = s as f64;
            }

            if cfg.remove_dc {
                let mean = frame.iter().sum::<f64>() / cfg.frame_length as f64;
                for v in &mut frame {
                    *v -= mean;
                }
            }

            // Pre-emphasis runs backwards so each sample sees its
            // unmodified predecessor.
            if cfg.pre_emphasis > 0.0 {
                for i in (1..cfg.frame_length).rev() {
                    frame[i] -= cfg.pre_emphasis * frame[i - 1];
                }
                frame[0] *= 1.0 - cfg.pre_emphasis;
            }

            fft_buf.fill((0.0, 0.0));
            for (i, (&x, &w)) in frame.iter().zip(&self.window).enumerate() {
                fft_buf[i] = (x * w, 0.0);
            }
            fft(&mut fft_buf);

            for (p, &(re, im)) in power.iter_mut().zip(&fft_buf[..half_fft]) {
                *p = re * re + im * im;
            }

            let energies = self
                .filters
                .iter()
                .map(|(start, weights)| {
                    let energy: f64 = weights
                        .iter()
                        .zip(&power[*start..])
                        .map(|(w, p)| w * p)
                        .sum();
                    energy.max(cfg.energy_floor).ln() as f32
                })
                .collect();
            result.push(energies);
        }

        Some(result)
    }
}

/// Convenience wrapper: builds an [`Fbank`] and runs it once.
pub fn compute_fbank(samples: &[f32], cfg: &FbankConfig) -> Option<Vec<Vec<f32>>> {
    Fbank::new(cfg.clone())?.compute(samples)
}

/// CMVN: subtract mean and divide by std per mel bin.
/// Removes channel and environment effects.
pub fn cmvn(features: &mut [Vec<f32>]) {
    if features.is_empty() {
        return;
    }
    let (mean, std) = mean_std(features);
    for frame in features.iter_mut() {
        for (m, v) in frame.iter_mut().enumerate() {
            *v = ((*v as f64 - mean[m]) / std[m].max(1e-10)) as f32;
        }
    }
}

/// Per-bin mean and standard deviation over all frames.
/// Returns empty vectors for empty input.
pub fn mean_std(features: &[Vec<f32>]) -> (Vec<f64>, Vec<f64>) {
    let Some(first) = features.first() else {
        return (Vec::new(), Vec::new());
    };
    let num_mels = first.len();
    let t = features.len() as f64;

    let mut mean = vec![0.0f64; num_mels];
    for frame in features {
        for (m, &v) in frame.iter().enumerate().take(num_mels) {
            mean[m] += v as f64;
        }
    }
    for v in &mut mean {
        *v /= t;
    }

    let mut var = vec![0.0f64; num_mels];
    for frame in features {
        for (m, &v) in frame.iter().enumerate().take(num_mels) {
            let d = v as f64 - mean[m];
            var[m] += d * d;
        }
    }
    let std = var.into_iter().map(|v| (v / t).sqrt()).collect();

    (mean, std)
}

fn hamming_window(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| 0.54 - 0.46 * (2.0 * PI * i as f64 / (n - 1) as f64).cos())
        .collect()
}

fn povey_window(n: usize) -> Vec<f64> {
    hamming_window(n).into_iter().map(|w| w.powf(0.85)).collect()
}

fn hz_to_mel(hz: f64) -> f64 {
    2595.0 * (1.0 + hz / 700.0).log10()
}

fn mel_to_hz(mel: f64) -> f64 {
    700.0 * (10.0_f64.powf(mel / 2595.0) - 1.0)
}

/// Triangular filters on equally spaced mel points.
/// Each filter is stored as (first bin, weights from that bin on).
fn mel_filterbank(
    num_mels: usize,
    fft_size: usize,
    sample_rate: usize,
    low_freq: f64,
    high_freq: f64,
) -> Vec<(usize, Vec<f64>)> {
    let half_fft = fft_size / 2 + 1;
    let mel_low = hz_to_mel(low_freq);
    let mel_high = hz_to_mel(high_freq);

    let bins: Vec<usize> = (0..num_mels + 2)
        .map(|i| {
            let mel = mel_low + i as f64 * (mel_high - mel_low) / (num_mels + 1) as f64;
            let bin = (mel_to_hz(mel) * fft_size as f64 / sample_rate as f64).floor() as isize;
            bin.clamp(0, half_fft as isize - 1) as usize
        })
        .collect();

    (0..num_mels)
        .map(|m| {
            let (left, center, right) = (bins[m], bins[m + 1], bins[m + 2]);
            let weights = (left..=right)
                .map(|k| {
                    if k <= center {
                        if center > left {
                            (k - left) as f64 / (center - left) as f64
                        } else {
                            1.0
                        }
                    } else {
                        (right - k) as f64 / (right - center) as f64
                    }
                })
                .collect();
            (left, weights)
        })
        .collect()
}

/// In-place radix-2 FFT on (real, imag) pairs.
/// Input length must be a power of 2.
fn fft(x: &mut [(f64, f64)]) {
    let n = x.len();
    if n <= 1 {
        return;
    }

    // Bit-reversal permutation.
    let mut j = 0usize;
    for i in 1..n {
        let mut bit = n >> 1;
        while j & bit != 0 {
            j ^= bit;
            bit >>= 1;
        }
        j ^= bit;
        if i < j {
            x.swap(i, j);
        }
    }

    let mut size = 2;
    while size <= n {
        let half = size / 2;
        let angle = -2.0 * PI / size as f64;
        let wn = (angle.cos(), angle.sin());
        for start in (0..n).step_by(size) {
            let mut w = (1.0, 0.0);
            for k in 0..half {
                let u = x[start + k];
                let v = x[start + k + half];
                let t = (w.0 * v.0 - w.1 * v.1, w.0 * v.1 + w.1 * v.0);
                x[start + k] = (u.0 + t.0, u.1 + t.1);
                x[start + k + half] = (u.0 - t.0, u.1 - t.1);
                w = (w.0 * wn.0 - w.1 * wn.1, w.0 * wn.1 + w.1 * wn.0);
            }
        }
        size <<= 1;
    }
}
