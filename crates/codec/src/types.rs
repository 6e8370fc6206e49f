use serde::{Deserialize, Serialize};

use crate::error::CodecError;

/// Number of components in every face embedding handled by this engine.
///
/// The upstream embedder produces 512-dimension vectors; any other length is
/// a hard validation failure.
pub const EMBEDDING_DIM: usize = 512;

/// A raw face embedding: exactly [`EMBEDDING_DIM`] finite `f32` components.
///
/// Construction validates once so every downstream consumer can assume the
/// invariant instead of re-checking it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Embedding {
    values: Vec<f32>,
}

impl Embedding {
    /// Take ownership of a vector, validating dimension and finiteness.
    pub fn from_vec(values: Vec<f32>) -> Result<Self, CodecError> {
        if values.len() != EMBEDDING_DIM {
            return Err(CodecError::InvalidDimension {
                expected: EMBEDDING_DIM,
                actual: values.len(),
            });
        }
        if let Some(index) = values.iter().position(|v| !v.is_finite()) {
            return Err(CodecError::NonFiniteValue { index });
        }
        Ok(Self { values })
    }

    /// Validate a borrowed slice, copying it on success.
    pub fn from_slice(values: &[f32]) -> Result<Self, CodecError> {
        Self::from_vec(values.to_vec())
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }
}

/// A unit-length embedding produced by [`normalize`](crate::normalize).
///
/// The inner vector has been scaled by `1 / max(norm, epsilon)`, so the dot
/// product of two of these is their cosine similarity with no further norm
/// computation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NormalizedEmbedding {
    values: Vec<f32>,
}

impl NormalizedEmbedding {
    pub(crate) fn from_raw(values: Vec<f32>) -> Self {
        Self { values }
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    /// Cosine similarity against another pre-normalized vector: a plain dot
    /// product, in [-1, 1].
    pub fn dot(&self, other: &NormalizedEmbedding) -> f32 {
        self.values
            .iter()
            .zip(other.values.iter())
            .map(|(a, b)| a * b)
            .sum()
    }
}
