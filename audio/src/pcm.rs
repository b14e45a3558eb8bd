use std::time::Duration;

/// Mono PCM audio with signed 16-bit samples.
///
/// This is the buffer handed from audio capture to the voiceprint
/// extractor. The sample rate travels with the samples so that the
/// extractor can resample when it differs from the model's native rate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pcm16 {
    /// Samples per second (e.g. 16000, 48000).
    pub sample_rate: u32,
    /// Mono samples.
    pub samples: Vec<i16>,
}

impl Pcm16 {
    pub fn new(sample_rate: u32, samples: Vec<i16>) -> Self {
        Self {
            sample_rate,
            samples,
        }
    }

    /// Builds a buffer from PCM16 signed little-endian bytes.
    /// A trailing odd byte is ignored.
    pub fn from_le_bytes(sample_rate: u32, data: &[u8]) -> Self {
        let samples = data
            .chunks_exact(2)
            .map(|b| i16::from_le_bytes([b[0], b[1]]))
            .collect();
        Self::new(sample_rate, samples)
    }

    /// Builds a buffer from float samples in `[-1, 1]`.
    /// Out-of-range values are clamped.
    pub fn from_f32(sample_rate: u32, samples: &[f32]) -> Self {
        let samples = samples
            .iter()
            .map(|&s| (s * 32767.0).clamp(-32768.0, 32767.0) as i16)
            .collect();
        Self::new(sample_rate, samples)
    }

    /// Returns the samples as PCM16 signed little-endian bytes.
    pub fn to_le_bytes(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(self.samples.len() * 2);
        for s in &self.samples {
            data.extend_from_slice(&s.to_le_bytes());
        }
        data
    }

    /// Returns the samples normalized to `[-1, 1)`.
    pub fn to_f32(&self) -> Vec<f32> {
        self.samples.iter().map(|&s| s as f32 / 32768.0).collect()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Returns the playback duration. Zero when the sample rate is zero.
    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.samples.len() as f64 / self.sample_rate as f64)
    }
}
