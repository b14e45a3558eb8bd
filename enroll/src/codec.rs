//! Binary format for a persisted embedding.
//!
//! ```text
//! [4B magic "VXEM"] [4B version=1] [4B dim] [dim x 4B float32]
//! ```
//!
//! All multi-byte values are little-endian. Values round-trip bit-exactly.

use voxgate_voiceprint::Embedding;

use crate::error::FormatError;

const MAGIC: [u8; 4] = *b"VXEM";
const VERSION: u32 = 1;
const HEADER_LEN: usize = 12;

/// Serializes an embedding.
pub fn encode(embedding: &Embedding) -> Vec<u8> {
    let values = embedding.as_slice();
    let mut buf = Vec::with_capacity(HEADER_LEN + values.len() * 4);
    buf.extend_from_slice(&MAGIC);
    buf.extend_from_slice(&VERSION.to_le_bytes());
    buf.extend_from_slice(&(values.len() as u32).to_le_bytes());
    for v in values {
        buf.extend_from_slice(&v.to_le_bytes());
    }
    buf
}

/// Deserializes an embedding produced by [`encode`].
///
/// Rejects a wrong magic or version, a zero dimension, a length that does
/// not match the declared dimension and non-finite values.
pub fn decode(data: &[u8]) -> Result<Embedding, FormatError> {
    if data.len() < HEADER_LEN {
        return Err(FormatError::Length {
            expected: HEADER_LEN,
            got: data.len(),
        });
    }

    let magic = [data[0], data[1], data[2], data[3]];
    if magic != MAGIC {
        return Err(FormatError::BadMagic(magic));
    }
    let version = read_u32(data, 4);
    if version != VERSION {
        return Err(FormatError::UnsupportedVersion(version));
    }
    let dim = read_u32(data, 8) as usize;
    if dim == 0 {
        return Err(FormatError::ZeroDimension);
    }

    let expected = HEADER_LEN + dim * 4;
    if data.len() != expected {
        return Err(FormatError::Length {
            expected,
            got: data.len(),
        });
    }

    let values: Vec<f32> = data[HEADER_LEN..]
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect();
    if let Some(i) = values.iter().position(|v| !v.is_finite()) {
        return Err(FormatError::NonFinite(i));
    }

    Ok(Embedding::new(values))
}

fn read_u32(data: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}
