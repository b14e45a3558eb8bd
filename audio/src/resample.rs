//! Sample rate conversion for whole mono buffers.
//!
//! Uses rubato's FFT-based fixed-size resampler. The input is fed in
//! fixed chunks (the last one zero-padded) and the resampler's output
//! delay is trimmed so that the result is aligned with the input.

use rubato::{FftFixedInOut, Resampler};

use crate::error::AudioError;

/// Number of input frames per processing block.
const CHUNK_SIZE: usize = 1024;

/// Resamples mono `f32` samples from `from_rate` to `to_rate`.
///
/// The output holds `ceil(len * to_rate / from_rate)` samples.
/// Returns the input unchanged when the rates are equal.
pub fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>, AudioError> {
    if from_rate == 0 || to_rate == 0 {
        return Err(AudioError::Unsupported(format!(
            "sample rate conversion {from_rate} -> {to_rate}"
        )));
    }
    if from_rate == to_rate || samples.is_empty() {
        return Ok(samples.to_vec());
    }

    let mut resampler =
        FftFixedInOut::<f32>::new(from_rate as usize, to_rate as usize, CHUNK_SIZE, 1)?;

    let expected = (samples.len() as u64 * to_rate as u64).div_ceil(from_rate as u64) as usize;
    let delay = resampler.output_delay();

    let mut output: Vec<f32> = Vec::with_capacity(expected + delay);
    let mut chunk: Vec<f32> = Vec::with_capacity(resampler.input_frames_max());
    let mut pos = 0;

    while output.len() < expected + delay {
        let needed = resampler.input_frames_next();
        chunk.clear();
        if pos < samples.len() {
            let end = (pos + needed).min(samples.len());
            chunk.extend_from_slice(&samples[pos..end]);
            pos = end;
        }
        chunk.resize(needed, 0.0);

        let input = [chunk.as_slice()];
        let processed = resampler.process(&input[..], None)?;
        output.extend_from_slice(&processed[0]);
    }

    output.drain(..delay);
    output.truncate(expected);
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq_hz: f32, sample_rate: u32, n: usize) -> Vec<f32> {
        (0..n)
            .map(|i| {
                let t = i as f32 / sample_rate as f32;
                0.5 * (2.0 * std::f32::consts::PI * freq_hz * t).sin()
            })
            .collect()
    }

    fn rms(v: &[f32]) -> f32 {
        (v.iter().map(|x| x * x).sum::<f32>() / v.len() as f32).sqrt()
    }

    #[test]
    fn same_rate_passthrough() {
        let input = sine(440.0, 16000, 1000);
        assert_eq!(resample(&input, 16000, 16000).unwrap(), input);
    }

    #[test]
    fn downsample_length() {
        let input = sine(440.0, 48000, 48000);
        let out = resample(&input, 48000, 16000).unwrap();
        assert_eq!(out.len(), 16000);
    }

    #[test]
    fn upsample_length_rounds_up() {
        let input = sine(440.0, 8000, 1001);
        let out = resample(&input, 8000, 16000).unwrap();
        assert_eq!(out.len(), 2002);

        let input = vec![0.0f32; 3];
        assert_eq!(resample(&input, 48000, 16000).unwrap().len(), 1);
    }

    #[test]
    fn preserves_in_band_energy() {
        let input = sine(440.0, 48000, 48000);
        let out = resample(&input, 48000, 16000).unwrap();
        // Skip the edges, where the zero padding tapers the signal.
        let middle = &out[2000..14000];
        let ratio = rms(middle) / rms(&input);
        assert!((ratio - 1.0).abs() < 0.05, "rms ratio {ratio}");
    }

    #[test]
    fn zero_rate_rejected() {
        assert!(matches!(
            resample(&[0.0], 0, 16000),
            Err(AudioError::Unsupported(_))
        ));
    }

    #[test]
    fn empty_input() {
        assert!(resample(&[], 44100, 16000).unwrap().is_empty());
    }
}
