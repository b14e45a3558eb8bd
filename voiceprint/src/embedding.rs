use std::fmt;

use serde::{Deserialize, Serialize};

/// A fixed-length speaker embedding.
///
/// Immutable once built: the values live in a boxed slice and are only
/// exposed by shared reference. Extractors produce unit-length embeddings,
/// which makes [`Embedding::dot`] equal to cosine similarity.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Embedding(Box<[f32]>);

impl Embedding {
    /// Wraps the values as-is.
    pub fn new(values: Vec<f32>) -> Self {
        Self(values.into_boxed_slice())
    }

    /// L2-normalizes the values, then wraps them.
    /// A zero vector stays zero.
    pub fn normalized(mut values: Vec<f32>) -> Self {
        l2_normalize(&mut values);
        Self::new(values)
    }

    pub fn dim(&self) -> usize {
        self.0.len()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    /// Euclidean length.
    pub fn norm(&self) -> f32 {
        self.0
            .iter()
            .map(|&x| (x as f64) * (x as f64))
            .sum::<f64>()
            .sqrt() as f32
    }

    /// Reports whether the length is within `tolerance` of 1.
    pub fn is_unit(&self, tolerance: f32) -> bool {
        (self.norm() - 1.0).abs() <= tolerance
    }

    /// Inner product with f64 accumulation.
    /// Returns `None` when the dimensions differ.
    pub fn dot(&self, other: &Embedding) -> Option<f32> {
        if self.dim() != other.dim() {
            return None;
        }
        let dot: f64 = self
            .0
            .iter()
            .zip(other.0.iter())
            .map(|(&a, &b)| a as f64 * b as f64)
            .sum();
        Some(dot as f32)
    }

    /// Match score between two unit-length embeddings: the inner product
    /// clamped to `[-1, 1]` to absorb rounding.
    /// Returns `None` when the dimensions differ.
    pub fn similarity(&self, other: &Embedding) -> Option<f32> {
        self.dot(other).map(|d| d.clamp(-1.0, 1.0))
    }
}

impl From<Vec<f32>> for Embedding {
    fn from(values: Vec<f32>) -> Self {
        Self::new(values)
    }
}

impl AsRef<[f32]> for Embedding {
    fn as_ref(&self) -> &[f32] {
        &self.0
    }
}

impl fmt::Debug for Embedding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Embedding")
            .field("dim", &self.dim())
            .field("norm", &self.norm())
            .finish()
    }
}

/// L2-normalizes a vector to unit length in-place.
/// Uses f64 intermediate precision.
pub fn l2_normalize(v: &mut [f32]) {
    let mut norm: f64 = 0.0;
    for &x in v.iter() {
        norm += (x as f64) * (x as f64);
    }
    norm = norm.sqrt();
    if norm > 0.0 {
        let scale = (1.0 / norm) as f32;
        for x in v.iter_mut() {
            *x *= scale;
        }
    }
}
