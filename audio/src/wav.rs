//! RIFF/WAVE container for PCM16 audio.
//!
//! Layout of the canonical file written by [`encode`]:
//!
//! ```text
//! "RIFF" [4B riff size] "WAVE"
//! "fmt " [4B 16] [2B format=1] [2B channels] [4B rate] [4B byte rate] [2B align] [2B bits]
//! "data" [4B data size] [samples...]
//! ```
//!
//! All multi-byte values are little-endian. [`decode`] also accepts
//! WAVE_FORMAT_EXTENSIBLE headers with a PCM subformat, skips unknown
//! chunks (LIST, fact, ...) and downmixes multi-channel audio to mono.

use std::path::Path;

use crate::error::AudioError;
use crate::pcm::Pcm16;

const FORMAT_PCM: u16 = 1;
const FORMAT_EXTENSIBLE: u16 = 0xFFFE;

struct FmtChunk {
    channels: u16,
    sample_rate: u32,
    bits_per_sample: u16,
}

/// Decodes a WAV file into mono PCM16.
///
/// Only 16-bit integer PCM is supported. Frames with more than one
/// channel are averaged into a single sample.
pub fn decode(data: &[u8]) -> Result<Pcm16, AudioError> {
    if data.len() < 12 || &data[0..4] != b"RIFF" || &data[8..12] != b"WAVE" {
        return Err(AudioError::InvalidWav("missing RIFF/WAVE header".into()));
    }

    let mut fmt: Option<FmtChunk> = None;
    let mut pos = 12;
    while pos + 8 <= data.len() {
        let id = &data[pos..pos + 4];
        let size = read_u32(data, pos + 4) as usize;
        let body_start = pos + 8;
        // Truncated data chunks are common in recordings that were not
        // finalized; take what is there.
        let body_end = body_start.saturating_add(size).min(data.len());
        let body = &data[body_start..body_end];

        match id {
            b"fmt " => fmt = Some(parse_fmt(body)?),
            b"data" => {
                let fmt = fmt
                    .as_ref()
                    .ok_or_else(|| AudioError::InvalidWav("data chunk before fmt chunk".into()))?;
                return Ok(decode_samples(body, fmt));
            }
            _ => {}
        }

        // Chunks are padded to an even size.
        pos = body_start.saturating_add(size + (size & 1));
    }

    Err(AudioError::InvalidWav("no data chunk".into()))
}

/// Reads and decodes a WAV file from disk.
pub fn read_file<P: AsRef<Path>>(path: P) -> Result<Pcm16, AudioError> {
    let data = std::fs::read(path)?;
    decode(&data)
}

/// Encodes mono PCM16 as a canonical 44-byte-header WAV file.
pub fn encode(pcm: &Pcm16) -> Vec<u8> {
    let channels: u16 = 1;
    let bits_per_sample: u16 = 16;
    let block_align = channels * bits_per_sample / 8;
    let byte_rate = pcm.sample_rate * block_align as u32;
    let data_size = (pcm.samples.len() * 2) as u32;

    let mut wav = Vec::with_capacity(44 + data_size as usize);

    wav.extend_from_slice(b"RIFF");
    wav.extend_from_slice(&(36 + data_size).to_le_bytes());
    wav.extend_from_slice(b"WAVE");

    wav.extend_from_slice(b"fmt ");
    wav.extend_from_slice(&16u32.to_le_bytes());
    wav.extend_from_slice(&FORMAT_PCM.to_le_bytes());
    wav.extend_from_slice(&channels.to_le_bytes());
    wav.extend_from_slice(&pcm.sample_rate.to_le_bytes());
    wav.extend_from_slice(&byte_rate.to_le_bytes());
    wav.extend_from_slice(&block_align.to_le_bytes());
    wav.extend_from_slice(&bits_per_sample.to_le_bytes());

    wav.extend_from_slice(b"data");
    wav.extend_from_slice(&data_size.to_le_bytes());
    wav.extend_from_slice(&pcm.to_le_bytes());

    wav
}

/// Encodes and writes a WAV file to disk.
pub fn write_file<P: AsRef<Path>>(path: P, pcm: &Pcm16) -> Result<(), AudioError> {
    std::fs::write(path, encode(pcm))?;
    Ok(())
}

fn parse_fmt(body: &[u8]) -> Result<FmtChunk, AudioError> {
    if body.len() < 16 {
        return Err(AudioError::InvalidWav(format!(
            "fmt chunk too short: {} bytes",
            body.len()
        )));
    }

    let mut format = read_u16(body, 0);
    let channels = read_u16(body, 2);
    let sample_rate = read_u32(body, 4);
    let bits_per_sample = read_u16(body, 14);

    if format == FORMAT_EXTENSIBLE {
        // cbSize(2) validBits(2) channelMask(4) subFormat GUID(16);
        // the first two GUID bytes carry the actual format tag.
        if body.len() < 26 {
            return Err(AudioError::InvalidWav("extensible fmt chunk too short".into()));
        }
        format = read_u16(body, 24);
    }

    if format != FORMAT_PCM {
        return Err(AudioError::Unsupported(format!("wav format tag {format}")));
    }
    if bits_per_sample != 16 {
        return Err(AudioError::Unsupported(format!(
            "{bits_per_sample}-bit samples"
        )));
    }
    if channels == 0 {
        return Err(AudioError::InvalidWav("zero channels".into()));
    }
    if sample_rate == 0 {
        return Err(AudioError::InvalidWav("zero sample rate".into()));
    }

    Ok(FmtChunk {
        channels,
        sample_rate,
        bits_per_sample,
    })
}

fn decode_samples(body: &[u8], fmt: &FmtChunk) -> Pcm16 {
    let channels = fmt.channels as usize;
    let frame_bytes = channels * fmt.bits_per_sample as usize / 8;

    let samples = body
        .chunks_exact(frame_bytes)
        .map(|frame| {
            if channels == 1 {
                return i16::from_le_bytes([frame[0], frame[1]]);
            }
            let sum: i32 = frame
                .chunks_exact(2)
                .map(|b| i16::from_le_bytes([b[0], b[1]]) as i32)
                .sum();
            (sum / channels as i32) as i16
        })
        .collect();

    Pcm16::new(fmt.sample_rate, samples)
}

fn read_u16(data: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([data[offset], data[offset + 1]])
}

fn read_u32(data: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stereo_wav(sample_rate: u32, frames: &[(i16, i16)]) -> Vec<u8> {
        let data_size = (frames.len() * 4) as u32;
        let mut wav = Vec::new();
        wav.extend_from_slice(b"RIFF");
        wav.extend_from_slice(&(36 + data_size).to_le_bytes());
        wav.extend_from_slice(b"WAVE");
        wav.extend_from_slice(b"fmt ");
        wav.extend_from_slice(&16u32.to_le_bytes());
        wav.extend_from_slice(&1u16.to_le_bytes());
        wav.extend_from_slice(&2u16.to_le_bytes());
        wav.extend_from_slice(&sample_rate.to_le_bytes());
        wav.extend_from_slice(&(sample_rate * 4).to_le_bytes());
        wav.extend_from_slice(&4u16.to_le_bytes());
        wav.extend_from_slice(&16u16.to_le_bytes());
        wav.extend_from_slice(b"data");
        wav.extend_from_slice(&data_size.to_le_bytes());
        for (l, r) in frames {
            wav.extend_from_slice(&l.to_le_bytes());
            wav.extend_from_slice(&r.to_le_bytes());
        }
        wav
    }

    #[test]
    fn encode_header() {
        let pcm = Pcm16::new(48000, vec![0; 10]);
        let wav = encode(&pcm);
        assert_eq!(wav.len(), 44 + 20);
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[8..12], b"WAVE");
        assert_eq!(read_u32(&wav, 24), 48000);
        assert_eq!(read_u32(&wav, 40), 20);
    }

    #[test]
    fn decode_encoded() {
        let pcm = Pcm16::new(16000, vec![0, 100, -100, i16::MAX, i16::MIN]);
        assert_eq!(decode(&encode(&pcm)).unwrap(), pcm);
    }

    #[test]
    fn decode_downmixes_stereo() {
        let wav = stereo_wav(44100, &[(100, 300), (-50, 50), (i16::MAX, i16::MAX)]);
        let pcm = decode(&wav).unwrap();
        assert_eq!(pcm.sample_rate, 44100);
        assert_eq!(pcm.samples, vec![200, 0, i16::MAX]);
    }

    #[test]
    fn decode_skips_unknown_chunks() {
        let pcm = Pcm16::new(8000, vec![1, 2, 3]);
        let plain = encode(&pcm);

        // Insert an odd-sized LIST chunk (padded) between fmt and data.
        let mut wav = plain[..36].to_vec();
        wav.extend_from_slice(b"LIST");
        wav.extend_from_slice(&3u32.to_le_bytes());
        wav.extend_from_slice(&[b'a', b'b', b'c', 0]);
        wav.extend_from_slice(&plain[36..]);

        assert_eq!(decode(&wav).unwrap(), pcm);
    }

    #[test]
    fn decode_truncated_data_chunk() {
        let pcm = Pcm16::new(16000, vec![7, 8, 9, 10]);
        let mut wav = encode(&pcm);
        wav.truncate(wav.len() - 3);
        assert_eq!(decode(&wav).unwrap().samples, vec![7, 8]);
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(matches!(decode(b"not a wav"), Err(AudioError::InvalidWav(_))));
        assert!(matches!(
            decode(b"RIFF\0\0\0\0WAVE"),
            Err(AudioError::InvalidWav(_))
        ));
    }

    #[test]
    fn decode_rejects_8bit() {
        let mut wav = encode(&Pcm16::new(16000, vec![0; 4]));
        wav[34] = 8;
        assert!(matches!(decode(&wav), Err(AudioError::Unsupported(_))));
    }

    #[test]
    fn decode_rejects_float_format() {
        let mut wav = encode(&Pcm16::new(16000, vec![0; 4]));
        wav[20] = 3;
        assert!(matches!(decode(&wav), Err(AudioError::Unsupported(_))));
    }

    #[test]
    fn file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.wav");
        let pcm = Pcm16::new(22050, (0..100).map(|i| i * 3).collect());
        write_file(&path, &pcm).unwrap();
        assert_eq!(read_file(&path).unwrap(), pcm);
    }
}
